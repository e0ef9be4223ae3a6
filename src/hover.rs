//! Debounced visibility for the floating plus button and inline bar.
//!
//! The state here is timer-agnostic: requesting a show or hide hands back a
//! [`Pending`] ticket, the browser layer arms a timeout for it, and the
//! timeout reports back through [`DelayedVisibility::fire`]. Only the most
//! recently issued ticket is honoured, so overlapping timers resolve
//! last-timer-wins.

/// Class names Editor.js (and its tools) put on block-level elements.
pub const BLOCK_CLASSES: &[&str] = &[
    "ce-block",
    "cdx-block",
    "ce-paragraph",
    "ce-header",
    "cdx-list",
    "cdx-quote",
    "tc-table",
    "image-tool",
];

pub fn is_block_element(class_attr: &str, has_block_id: bool) -> bool {
    has_block_id
        || class_attr
            .split_ascii_whitespace()
            .any(|class| BLOCK_CLASSES.contains(&class))
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        let clamp = |v: f64, lo: f64, hi: f64| if hi < lo { lo } else { v.clamp(lo, hi) };
        (
            clamp(x, self.scroll_x, self.scroll_x + self.width),
            clamp(y, self.scroll_y, self.scroll_y + self.height),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToolbarPosition {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

/// Plus button anchor: left edge of the block, vertically centred.
pub fn plus_button_anchor(block: Rect, viewport: &Viewport) -> (f64, f64) {
    viewport.clamp(
        block.left + viewport.scroll_x,
        block.top + viewport.scroll_y + block.height / 2.0,
    )
}

/// Inline bar anchor: top-centre of the selection. `None` for the empty
/// rectangle browsers report for collapsed or detached ranges.
pub fn inline_toolbar_anchor(selection: Rect, viewport: &Viewport) -> Option<(f64, f64)> {
    if selection.width == 0.0 && selection.height == 0.0 {
        return None;
    }
    Some(viewport.clamp(
        selection.left + viewport.scroll_x + selection.width / 2.0,
        selection.top + viewport.scroll_y,
    ))
}

/// Slash menu anchor: just under the caret.
pub fn caret_menu_anchor(caret: Rect, viewport: &Viewport) -> (f64, f64) {
    viewport.clamp(caret.left, caret.top + caret.height + 4.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingKind {
    Show,
    Hide,
}

/// A timer the caller must arm for `delay_ms`, then report via `fire`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pending {
    pub generation: u64,
    pub delay_ms: u32,
    pub kind: PendingKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DelayedVisibility<K> {
    show_delay_ms: u32,
    hide_delay_ms: u32,
    generation: u64,
    pending: Option<(Pending, Option<(K, f64, f64)>)>,
    target: Option<K>,
    position: ToolbarPosition,
}

impl<K: Clone + PartialEq> DelayedVisibility<K> {
    pub fn new(show_delay_ms: u32, hide_delay_ms: u32) -> Self {
        Self {
            show_delay_ms,
            hide_delay_ms,
            generation: 0,
            pending: None,
            target: None,
            position: ToolbarPosition::default(),
        }
    }

    pub fn position(&self) -> ToolbarPosition {
        self.position
    }

    pub fn target(&self) -> Option<&K> {
        self.target.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.position.visible
    }

    fn issue(&mut self, kind: PendingKind, delay_ms: u32, show: Option<(K, f64, f64)>) -> Pending {
        self.generation += 1;
        let ticket = Pending {
            generation: self.generation,
            delay_ms,
            kind,
        };
        self.pending = Some((ticket, show));
        ticket
    }

    /// Pointer arrived over `target`. Re-hovering the target already shown
    /// only moves it; anything else (re)starts the show delay.
    pub fn request_show(&mut self, target: K, x: f64, y: f64) -> Option<Pending> {
        if self.position.visible && self.target.as_ref() == Some(&target) {
            if matches!(self.pending, Some((p, _)) if p.kind == PendingKind::Hide) {
                self.pending = None;
            }
            self.position.x = x;
            self.position.y = y;
            return None;
        }
        if let Some((p, Some((pending_target, _, _)))) = &self.pending {
            if p.kind == PendingKind::Show && *pending_target == target {
                return None;
            }
        }
        Some(self.issue(PendingKind::Show, self.show_delay_ms, Some((target, x, y))))
    }

    /// Pointer left. Cancels a pending show and schedules the hide.
    pub fn request_hide(&mut self) -> Option<Pending> {
        if !self.position.visible {
            self.pending = None;
            return None;
        }
        if matches!(self.pending, Some((p, _)) if p.kind == PendingKind::Hide) {
            return None;
        }
        Some(self.issue(PendingKind::Hide, self.hide_delay_ms, None))
    }

    /// Scroll, key press or explicit dismissal. No delay.
    pub fn hide_now(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.target = None;
        self.position.visible = false;
    }

    /// A timer elapsed. Stale generations are ignored. Returns whether the
    /// visible state changed.
    pub fn fire(&mut self, generation: u64) -> bool {
        let Some((ticket, show)) = self.pending.take() else {
            return false;
        };
        if ticket.generation != generation {
            self.pending = Some((ticket, show));
            return false;
        }
        match (ticket.kind, show) {
            (PendingKind::Show, Some((target, x, y))) => {
                self.target = Some(target);
                self.position = ToolbarPosition { x, y, visible: true };
                true
            }
            (PendingKind::Hide, _) => {
                let changed = self.position.visible;
                self.target = None;
                self.position.visible = false;
                changed
            }
            (PendingKind::Show, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            scroll_x: 0.0,
            scroll_y: 100.0,
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn matches_block_classes() {
        assert!(is_block_element("ce-block ce-block--focused", false));
        assert!(is_block_element("tc-table", false));
        assert!(is_block_element("", true));
        assert!(!is_block_element("ce-block__content-ish codex-editor", false));
        assert!(!is_block_element("", false));
    }

    #[test]
    fn shows_only_after_delay_fires() {
        let mut vis = DelayedVisibility::new(200, 150);
        let ticket = vis.request_show(1u32, 10.0, 20.0).unwrap();
        assert_eq!(ticket.delay_ms, 200);
        assert_eq!(ticket.kind, PendingKind::Show);
        assert!(!vis.is_visible());

        assert!(vis.fire(ticket.generation));
        assert!(vis.is_visible());
        assert_eq!(vis.target(), Some(&1));
        assert_eq!(
            vis.position(),
            ToolbarPosition { x: 10.0, y: 20.0, visible: true }
        );
    }

    #[test]
    fn leaving_before_delay_cancels_show() {
        let mut vis = DelayedVisibility::new(200, 150);
        let ticket = vis.request_show(1u32, 0.0, 0.0).unwrap();
        assert_eq!(vis.request_hide(), None);
        assert!(!vis.fire(ticket.generation));
        assert!(!vis.is_visible());
    }

    #[test]
    fn last_hovered_block_wins() {
        let mut vis = DelayedVisibility::new(200, 150);
        let first = vis.request_show(1u32, 0.0, 0.0).unwrap();
        let second = vis.request_show(2u32, 5.0, 5.0).unwrap();
        assert!(!vis.fire(first.generation));
        assert!(!vis.is_visible());
        assert!(vis.fire(second.generation));
        assert_eq!(vis.target(), Some(&2));
    }

    #[test]
    fn same_pending_target_does_not_restart_timer() {
        let mut vis = DelayedVisibility::new(200, 150);
        let ticket = vis.request_show(1u32, 0.0, 0.0).unwrap();
        assert_eq!(vis.request_show(1u32, 1.0, 1.0), None);
        assert!(vis.fire(ticket.generation));
    }

    #[test]
    fn hide_waits_and_reentry_cancels_it() {
        let mut vis = DelayedVisibility::new(200, 150);
        let show = vis.request_show(1u32, 0.0, 0.0).unwrap();
        vis.fire(show.generation);

        let hide = vis.request_hide().unwrap();
        assert_eq!(hide.delay_ms, 150);
        assert!(vis.is_visible());

        assert_eq!(vis.request_show(1u32, 3.0, 4.0), None);
        assert!(vis.pending.is_none());
        assert!(!vis.fire(hide.generation));
        assert!(vis.is_visible());
        assert_eq!(vis.position().x, 3.0);
    }

    #[test]
    fn hide_fires_after_delay() {
        let mut vis = DelayedVisibility::new(200, 150);
        let show = vis.request_show(1u32, 0.0, 0.0).unwrap();
        vis.fire(show.generation);
        let hide = vis.request_hide().unwrap();
        assert!(vis.fire(hide.generation));
        assert!(!vis.is_visible());
        assert_eq!(vis.target(), None);
    }

    #[test]
    fn scroll_hides_immediately_and_voids_timers() {
        let mut vis = DelayedVisibility::new(200, 150);
        let show = vis.request_show(1u32, 0.0, 0.0).unwrap();
        vis.fire(show.generation);
        let pending = vis.request_show(2u32, 0.0, 0.0).unwrap();

        vis.hide_now();
        assert!(!vis.is_visible());
        assert!(!vis.fire(pending.generation));
        assert!(!vis.is_visible());
    }

    #[test]
    fn anchors_follow_scroll_and_stay_in_viewport() {
        let vp = viewport();
        let block = Rect { left: 40.0, top: 10.0, width: 300.0, height: 30.0 };
        assert_eq!(plus_button_anchor(block, &vp), (40.0, 125.0));

        let off_screen = Rect { left: -50.0, top: 900.0, width: 10.0, height: 10.0 };
        assert_eq!(plus_button_anchor(off_screen, &vp), (0.0, 700.0));

        let selection = Rect { left: 100.0, top: 50.0, width: 60.0, height: 18.0 };
        assert_eq!(inline_toolbar_anchor(selection, &vp), Some((130.0, 150.0)));
        assert_eq!(inline_toolbar_anchor(Rect::default(), &vp), None);
    }

    #[test]
    fn caret_anchor_sits_below_caret() {
        let vp = Viewport { scroll_x: 0.0, scroll_y: 0.0, width: 800.0, height: 600.0 };
        let caret = Rect { left: 12.0, top: 40.0, width: 0.0, height: 16.0 };
        assert_eq!(caret_menu_anchor(caret, &vp), (12.0, 60.0));
    }
}
