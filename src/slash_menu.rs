//! Slash command dropdown: caret tracking, keyboard handling and running
//! the chosen command against the editor.

use std::sync::OnceLock;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::editor_host::{EditorHost, HostSlot};
use crate::error::EditorError;
use crate::hover::{caret_menu_anchor, Rect, Viewport};
use crate::notify::Notifier;
use crate::slash::{
    catalog, detect_trigger, filter, filter_grouped, remove_trigger, utf16_to_byte, MenuKey,
    MenuOutcome, SlashCommand, SlashMenuState,
};
use crate::toolbar::{listen, rect_of};

pub fn commands() -> &'static [SlashCommand] {
    static CATALOG: OnceLock<Vec<SlashCommand>> = OnceLock::new();
    CATALOG.get_or_init(catalog)
}

/// Caret offset inside `element`, in UTF-16 units of its text content.
fn caret_offset(element: &web_sys::HtmlElement) -> Option<(u32, Rect)> {
    let selection = window().get_selection().ok().flatten()?;
    if selection.range_count() == 0 {
        return None;
    }
    let range = selection.get_range_at(0).ok()?;
    let end = range.end_container().ok()?;
    let node: &web_sys::Node = element;
    if !node.contains(Some(&end)) {
        return None;
    }
    let prefix = document().create_range().ok()?;
    prefix.select_node_contents(element).ok()?;
    prefix.set_end(&end, range.end_offset().ok()?).ok()?;
    let mut rect = rect_of(&range.get_bounding_client_rect());
    if rect == Rect::default() {
        // Collapsed ranges in empty blocks report no geometry.
        rect = rect_of(&element.get_bounding_client_rect());
        rect.width = 0.0;
    }
    Some((prefix.to_string().length(), rect))
}

/// Viewport for the fixed-position menu: client coordinates, no scroll.
fn client_viewport() -> Viewport {
    let win = window();
    let num = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport {
        scroll_x: 0.0,
        scroll_y: 0.0,
        width: num(win.inner_width()),
        height: num(win.inner_height()),
    }
}

/// Removes the typed trigger, drops a blank non-paragraph block, inserts
/// the command's block after it and moves the caret there.
pub fn run_command(
    host: &EditorHost,
    menu: &SlashMenuState,
    command: &SlashCommand,
) -> Result<u32, EditorError> {
    let index = match menu.block {
        Some(index) => index,
        None => host.current_block_index().ok_or(EditorError::NoBlock(0))?,
    };
    let (kind, element) = host.block_editable(index)?;
    let mut remaining = element.text_content().unwrap_or_default();
    if let Some(trigger) = menu.trigger.as_ref() {
        match remove_trigger(&remaining, trigger) {
            Some(text) => {
                host.set_block_text(index, &text)?;
                remaining = text;
            }
            None => tracing::debug!(term = %trigger.term, "trigger no longer in block"),
        }
    }

    let mut insert_at = index + 1;
    if remaining.trim().is_empty() && kind != "paragraph" {
        host.delete_block(index)?;
        insert_at = index;
    }
    let insert_at = insert_at.min(host.block_count());
    host.insert_block(&command.block, insert_at)?;
    host.set_caret_to_block(insert_at);
    tracing::debug!(command = command.id, index = insert_at, "slash command inserted block");
    Ok(insert_at)
}

/// Everything the menu's handlers need. All fields are handles, so this is
/// `Copy` and can move into any number of closures.
#[derive(Clone, Copy)]
pub struct SlashActions {
    pub host: HostSlot,
    pub menu: RwSignal<SlashMenuState>,
    pub notifier: Notifier,
    pub read_only: Signal<bool>,
}

impl SlashActions {
    fn host(&self) -> Option<EditorHost> {
        self.host.get_value()
    }

    pub fn pick(&self, command: &SlashCommand) {
        let state = self.menu.get_untracked();
        self.menu.update(SlashMenuState::close);
        let Some(host) = self.host() else {
            return;
        };
        if let Err(e) = run_command(&host, &state, command) {
            tracing::error!(command = command.id, error = %e, "slash command failed");
            self.notifier.error(format!("Could not insert {}", command.label));
        }
    }

    pub fn pick_index(&self, index: usize) {
        let term = self.menu.with_untracked(|m| m.term().to_string());
        if let Some(command) = filter(commands(), &term).get(index).copied() {
            self.pick(command);
        }
    }

    /// Opens from the plus button for block `index`, below `(x, y)`.
    pub fn open_for_block(&self, index: u32, x: f64, y: f64) {
        if let Some(host) = self.host() {
            host.set_caret_to_block(index);
        }
        let (x, y) = caret_menu_anchor(
            Rect { left: x, top: y, width: 0.0, height: 0.0 },
            &client_viewport(),
        );
        self.menu.update(|m| m.open_for_block(index, x, y));
    }

    /// Re-evaluates the trigger after the block text changed.
    pub fn on_input(&self) {
        if self.read_only.get_untracked() {
            return;
        }
        let Some(host) = self.host() else {
            return;
        };
        let Ok(block) = host.current_block() else {
            return;
        };
        let detected = caret_offset(&block.element).and_then(|(offset, rect)| {
            let caret = utf16_to_byte(&block.text, offset);
            detect_trigger(&block.text, caret).map(|trigger| (trigger, rect))
        });
        match detected {
            Some((trigger, rect)) => {
                let (x, y) = caret_menu_anchor(rect, &client_viewport());
                tracing::debug!(term = %trigger.term, "slash trigger");
                self.menu.update(|m| m.open(trigger, x, y));
            }
            None => {
                if self.menu.with_untracked(|m| m.visible && m.block.is_none()) {
                    self.menu.update(SlashMenuState::close);
                }
            }
        }
    }

    /// Returns true when the key was consumed by the menu.
    pub fn on_key(&self, key: &str) -> bool {
        let Some(key) = MenuKey::from_key(key) else {
            return false;
        };
        if !self.menu.with_untracked(|m| m.visible) {
            return false;
        }
        let term = self.menu.with_untracked(|m| m.term().to_string());
        let count = filter(commands(), &term).len();
        let mut outcome = MenuOutcome::Ignored;
        self.menu.update(|m| outcome = m.handle_key(key, count));
        match outcome {
            MenuOutcome::Invoke(index) => {
                self.pick_index(index);
                true
            }
            MenuOutcome::Moved | MenuOutcome::Close => true,
            MenuOutcome::Ignored => false,
        }
    }
}

/// Input, keyboard and outside-click listeners for the editor container.
pub fn install_slash_menu(container: &web_sys::HtmlElement, actions: SlashActions) {
    listen(container, "input", false, move |_: web_sys::Event| actions.on_input());
    // Capture phase, so the editor never sees keys the menu consumed.
    listen(container, "keydown", true, move |ev: web_sys::KeyboardEvent| {
        if actions.on_key(&ev.key()) {
            ev.prevent_default();
            ev.stop_propagation();
        }
    });
    listen(&document().into(), "mousedown", false, move |ev: web_sys::MouseEvent| {
        if !actions.menu.with_untracked(|m| m.visible) {
            return;
        }
        let inside = ev
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(".slash-menu, .plus-button").ok().flatten())
            .is_some();
        if !inside {
            actions.menu.update(SlashMenuState::close);
        }
    });
}

#[component]
pub fn SlashMenu(actions: SlashActions) -> impl IntoView {
    let menu = actions.menu;
    let items = move || {
        let state = menu.get();
        let groups = filter_grouped(commands(), state.term());
        if groups.is_empty() {
            return view! { <div class="slash-menu-empty">"No matching blocks"</div> }.into_any();
        }
        let mut flat = 0usize;
        groups
            .into_iter()
            .map(|(category, items)| {
                let rows = items
                    .into_iter()
                    .map(|command| {
                        let index = flat;
                        flat += 1;
                        let class = if index == state.selected {
                            "slash-menu-item selected"
                        } else {
                            "slash-menu-item"
                        };
                        view! {
                            <div
                                class=class
                                on:mouseenter=move |_| menu.update(|m| m.selected = index)
                                on:mousedown=move |ev| {
                                    ev.prevent_default();
                                    actions.pick(command);
                                }
                            >
                                <div class="slash-menu-item-text">
                                    <span class="slash-menu-item-label">{command.label}</span>
                                    <span class="slash-menu-item-description">{command.description}</span>
                                </div>
                                {command.shortcut.map(|s| view! { <kbd class="slash-menu-item-shortcut">{s}</kbd> })}
                            </div>
                        }
                    })
                    .collect::<Vec<_>>();
                view! {
                    <div class="slash-menu-group">
                        <div class="slash-menu-group-title">{category.title()}</div>
                        {rows}
                    </div>
                }
            })
            .collect::<Vec<_>>()
            .into_any()
    };

    view! {
        <div
            class="slash-menu"
            role="listbox"
            style=move || {
                let state = menu.get();
                format!(
                    "position: fixed; left: {}px; top: {}px; display: {};",
                    state.x, state.y, if state.visible { "block" } else { "none" },
                )
            }
        >
            {items}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_cached() {
        assert!(std::ptr::eq(commands(), commands()));
        assert_eq!(commands().len(), catalog().len());
    }
}
