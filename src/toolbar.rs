//! Browser side of the floating plus button and the inline formatting bar.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::config::EditorSettings;
use crate::hover::{
    inline_toolbar_anchor, is_block_element, plus_button_anchor, DelayedVisibility, Pending, Rect,
    ToolbarPosition, Viewport,
};

/// Overlay elements; pointer movement over them leaves state untouched.
const OVERLAY_SELECTOR: &str =
    ".plus-button, .block-handle, .block-actions-menu, .inline-toolbar, .slash-menu";

pub fn viewport() -> Viewport {
    let win = window();
    let num = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport {
        scroll_x: win.scroll_x().unwrap_or(0.0),
        scroll_y: win.scroll_y().unwrap_or(0.0),
        width: num(win.inner_width()),
        height: num(win.inner_height()),
    }
}

pub fn rect_of(rect: &web_sys::DomRect) -> Rect {
    Rect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    }
}

/// Nearest block element at or above `target`, stopping at `container`.
pub fn find_block_element(target: &Element, container: &Element) -> Option<Element> {
    let mut node = Some(target.clone());
    while let Some(el) = node {
        if &el == container {
            return None;
        }
        let class = el.get_attribute("class").unwrap_or_default();
        if is_block_element(&class, el.has_attribute("data-block-id")) {
            return Some(el);
        }
        node = el.parent_element();
    }
    None
}

/// Position of the Editor.js block wrapping `el`.
pub fn block_index(container: &Element, el: &Element) -> Option<u32> {
    let blocks = container.query_selector_all(".ce-block").ok()?;
    let node: &web_sys::Node = el;
    (0..blocks.length()).find(|&i| blocks.item(i).is_some_and(|b| b.contains(Some(node))))
}

/// What the plus button lines up with: the content column of the
/// Editor.js block around `el`, so every element matched inside one block
/// yields the same anchor.
pub fn anchor_element(el: &Element) -> Element {
    el.closest(".ce-block")
        .ok()
        .flatten()
        .and_then(|block| block.query_selector(".ce-block__content").ok().flatten())
        .unwrap_or_else(|| el.clone())
}

type Publish<K> = Box<dyn Fn(ToolbarPosition, Option<K>)>;

/// Visibility state plus the one live timer for it.
struct Debounced<K> {
    state: DelayedVisibility<K>,
    timer: Option<Timeout>,
    publish: Publish<K>,
}

#[derive(Clone)]
struct Shared<K>(Rc<RefCell<Debounced<K>>>);

impl<K: Clone + PartialEq + 'static> Shared<K> {
    fn new(
        show_ms: u32,
        hide_ms: u32,
        publish: impl Fn(ToolbarPosition, Option<K>) + 'static,
    ) -> Self {
        Self(Rc::new(RefCell::new(Debounced {
            state: DelayedVisibility::new(show_ms, hide_ms),
            timer: None,
            publish: Box::new(publish),
        })))
    }

    fn publish(&self) {
        let inner = self.0.borrow();
        (inner.publish)(inner.state.position(), inner.state.target().cloned());
    }

    fn arm(&self, ticket: Option<Pending>) {
        let Some(ticket) = ticket else {
            self.publish();
            return;
        };
        let weak: Weak<RefCell<Debounced<K>>> = Rc::downgrade(&self.0);
        let timer = Timeout::new(ticket.delay_ms, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let changed = inner.borrow_mut().state.fire(ticket.generation);
            if changed {
                Shared(inner).publish();
            }
        });
        // Replacing the handle drops (and cancels) the previous timeout.
        self.0.borrow_mut().timer = Some(timer);
    }

    fn show(&self, target: K, x: f64, y: f64) {
        let ticket = self.0.borrow_mut().state.request_show(target, x, y);
        self.arm(ticket);
    }

    fn hide(&self) {
        let ticket = self.0.borrow_mut().state.request_hide();
        self.arm(ticket);
    }

    fn hide_now(&self) {
        let was_visible = {
            let mut inner = self.0.borrow_mut();
            let was_visible = inner.state.is_visible();
            inner.state.hide_now();
            inner.timer = None;
            was_visible
        };
        if was_visible {
            self.publish();
        }
    }
}

/// Reactive outputs of the hover and selection tracking.
#[derive(Clone, Copy)]
pub struct ToolbarSignals {
    pub plus: RwSignal<ToolbarPosition>,
    pub hovered_block: RwSignal<Option<u32>>,
    pub inline: RwSignal<ToolbarPosition>,
}

impl ToolbarSignals {
    pub fn new() -> Self {
        Self {
            plus: RwSignal::new(ToolbarPosition::default()),
            hovered_block: RwSignal::new(None),
            inline: RwSignal::new(ToolbarPosition::default()),
        }
    }
}

impl Default for ToolbarSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Attaches `f` for the lifetime of the page.
pub(crate) fn listen<E>(
    target: &web_sys::EventTarget,
    event: &str,
    capture: bool,
    f: impl FnMut(E) + 'static,
) where
    E: wasm_bindgen::convert::FromWasmAbi + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(f);
    let result = target.add_event_listener_with_callback_and_bool(
        event,
        closure.as_ref().unchecked_ref(),
        capture,
    );
    if let Err(e) = result {
        tracing::warn!(event, "failed to attach listener: {}", crate::error::describe_js(&e));
    }
    closure.forget();
}

/// Wires pointer, scroll, key and selection listeners for `container`.
/// Listeners live for the rest of the page.
pub fn install_toolbars(
    container: &web_sys::HtmlElement,
    settings: &EditorSettings,
    signals: ToolbarSignals,
    read_only: Signal<bool>,
) {
    let plus = Shared::<u32>::new(
        settings.plus_button_delay_ms,
        settings.plus_button_hide_delay_ms,
        move |pos, target| {
            signals.plus.set(pos);
            signals.hovered_block.set(target);
        },
    );
    let inline = Shared::<()>::new(settings.inline_toolbar_delay_ms, 0, move |pos, _| {
        signals.inline.set(pos);
    });
    let container: Element = container.clone().into();

    {
        let plus = plus.clone();
        let container = container.clone();
        listen(&container.clone(), "mousemove", false, move |ev: web_sys::MouseEvent| {
            if read_only.get_untracked() {
                return;
            }
            let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if target.closest(OVERLAY_SELECTOR).ok().flatten().is_some() {
                return;
            }
            let hovered = find_block_element(&target, &container)
                .and_then(|block| block_index(&container, &block).map(|i| (i, block)));
            match hovered {
                Some((index, block)) => {
                    let rect = rect_of(&anchor_element(&block).get_bounding_client_rect());
                    let (x, y) = plus_button_anchor(rect, &viewport());
                    plus.show(index, x, y);
                }
                None => plus.hide(),
            }
        });
    }
    {
        let plus = plus.clone();
        listen(&container.clone(), "mouseleave", false, move |_: web_sys::MouseEvent| {
            plus.hide()
        });
    }
    {
        let inline = inline.clone();
        listen(&container.clone(), "keydown", false, move |_: web_sys::KeyboardEvent| {
            inline.hide_now()
        });
    }
    {
        let plus = plus.clone();
        let inline = inline.clone();
        listen(&window().into(), "scroll", true, move |_: web_sys::Event| {
            plus.hide_now();
            inline.hide_now();
        });
    }
    listen(&document().into(), "selectionchange", false, move |_: web_sys::Event| {
        if read_only.get_untracked() {
            inline.hide_now();
            return;
        }
        match selection_anchor(&container) {
            Some((x, y)) => inline.show((), x, y),
            None => inline.hide_now(),
        }
    });
    tracing::debug!("toolbar listeners installed");
}

/// Top-centre of a non-empty selection inside `container`.
fn selection_anchor(container: &Element) -> Option<(f64, f64)> {
    let selection = window().get_selection().ok().flatten()?;
    if selection.is_collapsed() || selection.range_count() == 0 {
        return None;
    }
    let range = selection.get_range_at(0).ok()?;
    let common = range.common_ancestor_container().ok()?;
    let node: &web_sys::Node = container;
    if !node.contains(Some(&common)) {
        return None;
    }
    inline_toolbar_anchor(rect_of(&range.get_bounding_client_rect()), &viewport())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Link,
}

impl InlineFormat {
    pub const ALL: [InlineFormat; 6] = [
        InlineFormat::Bold,
        InlineFormat::Italic,
        InlineFormat::Underline,
        InlineFormat::Strikethrough,
        InlineFormat::Code,
        InlineFormat::Link,
    ];

    fn label(self) -> &'static str {
        match self {
            InlineFormat::Bold => "B",
            InlineFormat::Italic => "I",
            InlineFormat::Underline => "U",
            InlineFormat::Strikethrough => "S",
            InlineFormat::Code => "</>",
            InlineFormat::Link => "🔗",
        }
    }

    fn title(self) -> &'static str {
        match self {
            InlineFormat::Bold => "Bold",
            InlineFormat::Italic => "Italic",
            InlineFormat::Underline => "Underline",
            InlineFormat::Strikethrough => "Strikethrough",
            InlineFormat::Code => "Inline code",
            InlineFormat::Link => "Link",
        }
    }

    /// `execCommand` name and value for this format.
    fn command(self, selected: &str, link: Option<&str>) -> Option<(&'static str, String)> {
        match self {
            InlineFormat::Bold => Some(("bold", String::new())),
            InlineFormat::Italic => Some(("italic", String::new())),
            InlineFormat::Underline => Some(("underline", String::new())),
            InlineFormat::Strikethrough => Some(("strikeThrough", String::new())),
            InlineFormat::Code => {
                let escaped = crate::export::escape_html(selected);
                Some(("insertHTML", format!("<code class=\"inline-code\">{escaped}</code>")))
            }
            InlineFormat::Link => link
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| ("createLink", url.to_string())),
        }
    }
}

fn apply_format(format: InlineFormat) {
    let selected = window()
        .get_selection()
        .ok()
        .flatten()
        .map(|s| String::from(s.to_string()))
        .unwrap_or_default();
    let link = match format {
        InlineFormat::Link => window().prompt_with_message("Link URL").ok().flatten(),
        _ => None,
    };
    let Some((command, value)) = format.command(&selected, link.as_deref()) else {
        return;
    };
    let Ok(doc) = document().dyn_into::<web_sys::HtmlDocument>() else {
        return;
    };
    if let Err(e) = doc.exec_command_with_show_ui_and_value(command, false, &value) {
        tracing::warn!(command, "formatting failed: {}", crate::error::describe_js(&e));
    }
}

#[component]
pub fn PlusButton(position: RwSignal<ToolbarPosition>, on_click: Callback<()>) -> impl IntoView {
    view! {
        <button
            class="plus-button"
            title="Insert block"
            style=move || {
                let p = position.get();
                format!(
                    "position: absolute; left: {}px; top: {}px; transform: translate(-36px, -50%); display: {};",
                    p.x, p.y, if p.visible { "flex" } else { "none" },
                )
            }
            on:mousedown=move |ev| ev.prevent_default()
            on:click=move |_| on_click.run(())
        >
            "+"
        </button>
    }
}

#[component]
pub fn InlineToolbar(position: RwSignal<ToolbarPosition>) -> impl IntoView {
    view! {
        <div
            class="inline-toolbar"
            style=move || {
                let p = position.get();
                format!(
                    "position: absolute; left: {}px; top: {}px; transform: translate(-50%, calc(-100% - 8px)); display: {};",
                    p.x, p.y, if p.visible { "flex" } else { "none" },
                )
            }
        >
            {InlineFormat::ALL.into_iter().map(|format| view! {
                <button
                    class="inline-toolbar-button"
                    title=format.title()
                    on:mousedown=move |ev| {
                        // Keep the selection alive.
                        ev.prevent_default();
                        apply_format(format);
                    }
                >
                    {format.label()}
                </button>
            }).collect::<Vec<_>>()}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_needs_a_url() {
        assert_eq!(InlineFormat::Link.command("x", None), None);
        assert_eq!(InlineFormat::Link.command("x", Some("  ")), None);
        assert_eq!(
            InlineFormat::Link.command("x", Some(" https://a.b ")),
            Some(("createLink", "https://a.b".to_string()))
        );
    }

    #[test]
    fn inline_code_escapes_selection() {
        let (cmd, html) = InlineFormat::Code.command("a<b", None).unwrap();
        assert_eq!(cmd, "insertHTML");
        assert_eq!(html, "<code class=\"inline-code\">a&lt;b</code>");
    }
}
