use std::rc::Rc;

use chrono::Utc;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use serde_json::json;

use crate::config::EditorSettings;
use crate::document::{Block, DocumentRecord, OutputData};
use crate::error::SaveError;
use crate::notify::{Notifier, ToastHost};
use crate::shell::{DocumentShell, SaveFuture, SaveHandler};

fn sample_document() -> DocumentRecord {
    let blocks = vec![
        Block::new("header", json!({ "text": "Welcome to the block document editor", "level": 1 })),
        Block::new("paragraph", json!({
            "text": "A document page built on a block editor. Hover a block for the <b>+</b> button, select text for inline formatting, or type <code>/</code> to insert a block."
        })),
        Block::new("header", json!({ "text": "🎨 Design", "level": 2 })),
        Block::new("list", json!({
            "style": "unordered",
            "items": [
                "Clean, distraction-free layout",
                "Floating toolbars that appear only when needed",
                "Collaborator avatars and a side panel",
                "Exports to text, Markdown, HTML and JSON"
            ]
        })),
        Block::new("header", json!({ "text": "✨ Features", "level": 2 })),
        Block::new("checklist", json!({
            "items": [
                { "text": "Editor keeps focus while typing", "checked": true },
                { "text": "Slash commands with keyboard navigation", "checked": true },
                { "text": "Auto-save every thirty seconds", "checked": true },
                { "text": "Real-time collaboration", "checked": false }
            ]
        })),
        Block::new("quote", json!({
            "text": "Tools should get out of the way so people can focus on the writing.",
            "caption": "",
            "alignment": "left"
        })),
        Block::new("delimiter", json!({})),
        Block::new("paragraph", json!({
            "text": "Start editing anywhere. Type <code>/</code> to add a new block."
        })),
    ];
    DocumentRecord {
        document_id: "demo-doc".to_string(),
        title: "Block document demo".to_string(),
        content: OutputData::new(blocks),
        last_modified: Utc::now(),
        owner: "You".to_string(),
        collaborators: ["Alice Chen", "Bob Wang", "Carol Li", "David Zhang", "Eva Liu"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

/// Stand-in persistence: logs the record and waits out a fixed latency.
/// Fails while the browser reports itself offline.
fn simulated_save(latency_ms: u32) -> SaveHandler {
    Rc::new(move |record: DocumentRecord| -> SaveFuture {
        Box::pin(async move {
            tracing::info!(
                id = %record.document_id,
                title = %record.title,
                blocks = record.content.blocks.len(),
                "persisting document"
            );
            TimeoutFuture::new(latency_ms).await;
            if !window().navigator().on_line() {
                return Err(SaveError::Rejected("browser is offline".to_string()));
            }
            Ok(())
        })
    })
}

#[component]
pub fn App() -> impl IntoView {
    let settings = EditorSettings::load();
    let notifier = Notifier::new();
    provide_context(notifier);

    let read_only = RwSignal::new(false);
    let block_count = RwSignal::new(0usize);

    let on_title_change = Callback::new(move |title: String| {
        document().set_title(&format!("{title} · Blockdoc"));
    });
    let on_content_change = Callback::new(move |data: OutputData| {
        tracing::debug!(blocks = data.blocks.len(), "content changed");
        block_count.set(data.blocks.len());
    });

    let latency_ms = settings.simulated_save_latency_ms;
    let doc = sample_document();
    block_count.set(doc.content.blocks.len());

    view! {
        <main class="app-layout">
            <div class="demo-bar">
                <label class="demo-toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || read_only.get()
                        on:change=move |ev| read_only.set(event_target_checked(&ev))
                    />
                    " Read only"
                </label>
                <span class="demo-count">{move || format!("{} blocks", block_count.get())}</span>
            </div>
            <DocumentShell
                document=doc
                on_save=simulated_save(latency_ms)
                read_only=read_only
                settings=settings
                on_title_change=on_title_change
                on_content_change=on_content_change
            />
            <ToastHost notifier=notifier />
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_content_and_collaborators() {
        let doc = sample_document();
        assert!(!doc.content.is_empty());
        assert_eq!(doc.content.blocks[0].kind, "header");
        assert_eq!(doc.collaborators.len(), 5);
    }
}
