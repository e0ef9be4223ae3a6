//! Actions on the hovered block: duplicate, move and delete, offered from
//! a handle next to the plus button.

use leptos::prelude::*;

use crate::editor_host::EditorHost;
use crate::error::EditorError;
use crate::hover::ToolbarPosition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockAction {
    Duplicate,
    MoveUp,
    MoveDown,
    Delete,
}

impl BlockAction {
    pub const ALL: [BlockAction; 4] = [
        BlockAction::Duplicate,
        BlockAction::MoveUp,
        BlockAction::MoveDown,
        BlockAction::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlockAction::Duplicate => "Duplicate",
            BlockAction::MoveUp => "Move up",
            BlockAction::MoveDown => "Move down",
            BlockAction::Delete => "Delete",
        }
    }

    /// Destination of a move among `count` blocks; `None` at the edges
    /// and for actions that do not move.
    pub fn move_target(self, index: u32, count: u32) -> Option<u32> {
        if index >= count {
            return None;
        }
        match self {
            BlockAction::MoveUp => index.checked_sub(1),
            BlockAction::MoveDown => (index + 1 < count).then_some(index + 1),
            BlockAction::Duplicate | BlockAction::Delete => None,
        }
    }
}

/// Runs `action` on block `index`. Returns the index the caret should go
/// to, if any. Moves at the document edges do nothing.
pub async fn apply_block_action(
    host: &EditorHost,
    action: BlockAction,
    index: u32,
) -> Result<Option<u32>, EditorError> {
    if !host.is_mounted() {
        return Err(EditorError::NotMounted);
    }
    let focus = match action {
        BlockAction::Duplicate => Some(host.duplicate_block(index).await?),
        BlockAction::Delete => {
            host.delete_block(index)?;
            None
        }
        BlockAction::MoveUp | BlockAction::MoveDown => {
            match action.move_target(index, host.block_count()) {
                Some(to) => {
                    host.move_block(index, to)?;
                    Some(to)
                }
                None => None,
            }
        }
    };
    if let Some(target) = focus {
        host.set_caret_to_block(target);
    }
    tracing::debug!(?action, index, "block action applied");
    Ok(focus)
}

/// Handle left of the plus button; opens the action list for the hovered
/// block.
#[component]
pub fn BlockHandle(
    position: RwSignal<ToolbarPosition>,
    hovered_block: RwSignal<Option<u32>>,
    on_action: Callback<(BlockAction, u32)>,
) -> impl IntoView {
    // Block and anchor captured when the list opened.
    let open = RwSignal::new(None::<(u32, ToolbarPosition)>);

    let toggle = move |_: leptos::ev::MouseEvent| {
        if open.get_untracked().is_some() {
            open.set(None);
            return;
        }
        if let Some(index) = hovered_block.get_untracked() {
            open.set(Some((index, position.get_untracked())));
        }
    };

    view! {
        <button
            class="block-handle"
            title="Block actions"
            style=move || {
                let p = position.get();
                format!(
                    "position: absolute; left: {}px; top: {}px; transform: translate(-64px, -50%); display: {};",
                    p.x, p.y, if p.visible { "flex" } else { "none" },
                )
            }
            on:mousedown=move |ev| ev.prevent_default()
            on:click=toggle
        >
            "⋮⋮"
        </button>
        {move || open.get().map(|(index, anchor)| view! {
            <div
                class="block-actions-menu"
                style=format!(
                    "position: absolute; left: {}px; top: {}px; transform: translate(-64px, 16px);",
                    anchor.x, anchor.y,
                )
                on:mouseleave=move |_| open.set(None)
            >
                {BlockAction::ALL.into_iter().map(|action| {
                    let class = if action == BlockAction::Delete {
                        "block-actions-item danger"
                    } else {
                        "block-actions-item"
                    };
                    view! {
                        <button
                            class=class
                            on:mousedown=move |ev| ev.prevent_default()
                            on:click=move |_| {
                                open.set(None);
                                on_action.run((action, index));
                            }
                        >
                            {action.label()}
                        </button>
                    }
                }).collect::<Vec<_>>()}
            </div>
        })}
    }
}
