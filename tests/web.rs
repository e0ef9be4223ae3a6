//! Browser tests for the DOM-facing pieces.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use blockdoc_ui::block_actions::{apply_block_action, BlockAction};
use blockdoc_ui::config::{EditorSettings, SETTINGS_KEY};
use blockdoc_ui::document::{Block, DocumentRecord, OutputData};
use blockdoc_ui::editor_host::{EditorHost, HostConfig};
use blockdoc_ui::error::{EditorError, SaveError};
use blockdoc_ui::export::{download, import_json, read_file_text, ExportFormat};
use blockdoc_ui::notify::{Notifier, ToastHost};
use blockdoc_ui::shell::{DocumentShell, SaveFuture, SaveHandler};
use blockdoc_ui::toolbar::{anchor_element, block_index, find_block_element};
use gloo_storage::{LocalStorage, Storage};
use serde_json::json;

fn fixture() -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.create_element("div").unwrap();
    container.set_class_name("codex-editor");
    container.set_inner_html(
        r#"<div class="ce-block"><div class="ce-block__content"><div class="ce-paragraph" id="first"><span id="inner">one</span></div></div></div>
           <div class="ce-block"><div class="ce-block__content"><h2 class="ce-header" id="second">two</h2></div></div>
           <div class="toolbar-gap" id="gap"></div>"#,
    );
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn by_id(container: &web_sys::Element, id: &str) -> web_sys::Element {
    container.query_selector(&format!("#{id}")).unwrap().unwrap()
}

// === Block lookup ===

#[wasm_bindgen_test]
fn test_find_block_walks_up_to_block() {
    let container = fixture();
    let inner = by_id(&container, "inner");
    let block = find_block_element(&inner, &container).unwrap();
    assert_eq!(block.id(), "first");
    container.remove();
}

#[wasm_bindgen_test]
fn test_find_block_stops_at_container() {
    let container = fixture();
    let gap = by_id(&container, "gap");
    assert!(find_block_element(&gap, &container).is_none());
    container.remove();
}

#[wasm_bindgen_test]
fn test_data_block_id_counts_as_block() {
    let container = fixture();
    let gap = by_id(&container, "gap");
    gap.set_attribute("data-block-id", "x1").unwrap();
    assert_eq!(find_block_element(&gap, &container).unwrap().id(), "gap");
    container.remove();
}

#[wasm_bindgen_test]
fn test_block_index_follows_document_order() {
    let container = fixture();
    assert_eq!(block_index(&container, &by_id(&container, "first")), Some(0));
    assert_eq!(block_index(&container, &by_id(&container, "second")), Some(1));
    assert_eq!(block_index(&container, &by_id(&container, "gap")), None);
    container.remove();
}

#[wasm_bindgen_test]
fn test_nested_matches_share_one_anchor() {
    let container = fixture();
    let from_inner = find_block_element(&by_id(&container, "inner"), &container).unwrap();
    let paragraph = anchor_element(&from_inner);
    let outer = anchor_element(&container.query_selector(".ce-block").unwrap().unwrap());
    assert_eq!(paragraph.class_name(), "ce-block__content");
    assert_eq!(paragraph, outer);

    let gap = by_id(&container, "gap");
    assert_eq!(anchor_element(&gap), gap);
    container.remove();
}

// === Editor host without the library loaded ===

#[wasm_bindgen_test]
async fn test_host_reports_missing_library() {
    let document = web_sys::window().unwrap().document().unwrap();
    let holder: web_sys::HtmlElement = document.create_element("div").unwrap().unchecked_into();
    let host = EditorHost::new(holder, HostConfig::new("Type"), |_| {}, || {});

    assert!(matches!(host.mount(None), Err(EditorError::Js { .. })));
    assert!(!host.is_mounted());
    assert!(matches!(host.save().await, Err(EditorError::NotMounted)));
    assert_eq!(host.current_block_index(), None);
    host.destroy();
}

#[wasm_bindgen_test]
async fn test_block_actions_need_a_mounted_editor() {
    let document = web_sys::window().unwrap().document().unwrap();
    let holder: web_sys::HtmlElement = document.create_element("div").unwrap().unchecked_into();
    let host = EditorHost::new(holder, HostConfig::new("Type"), |_| {}, || {});

    assert!(matches!(host.move_block(0, 1), Err(EditorError::NotMounted)));
    assert!(matches!(host.duplicate_block(0).await, Err(EditorError::NotMounted)));
    for action in BlockAction::ALL {
        let result = apply_block_action(&host, action, 0).await;
        assert!(matches!(result, Err(EditorError::NotMounted)), "{action:?}");
    }
}

// === Settings persistence ===

#[wasm_bindgen_test]
fn test_settings_round_trip_through_local_storage() {
    LocalStorage::delete(SETTINGS_KEY);
    assert_eq!(EditorSettings::load(), EditorSettings::default());

    LocalStorage::set(SETTINGS_KEY, json!({ "plus_button_delay_ms": 320 })).unwrap();
    let settings = EditorSettings::load();
    assert_eq!(settings.plus_button_delay_ms, 320);
    assert_eq!(settings.inline_toolbar_delay_ms, 100);

    LocalStorage::set(SETTINGS_KEY, json!({ "font_size": "huge" })).unwrap();
    assert_eq!(EditorSettings::load(), EditorSettings::default());
    LocalStorage::delete(SETTINGS_KEY);
}

// === Export delivery ===

#[wasm_bindgen_test]
fn test_download_creates_and_revokes_url() {
    assert!(download("notes.txt", "text/plain", "hello").is_ok());
}

#[wasm_bindgen_test]
async fn test_opened_json_file_becomes_editor_data() {
    let exported = ExportFormat::Json
        .render(&DocumentRecord {
            content: OutputData::new(vec![Block::new("paragraph", json!({ "text": "Body" }))]),
            ..DocumentRecord::default()
        })
        .unwrap();
    let parts = js_sys::Array::of1(&JsValue::from_str(&exported));
    let file = web_sys::File::new_with_str_sequence(&parts, "doc.json").unwrap();

    let raw = read_file_text(&file).await.unwrap();
    let data = import_json(&raw).unwrap();
    assert_eq!(data.blocks.len(), 1);
    assert_eq!(data.blocks[0].text(), "Body");
}

#[wasm_bindgen_test]
fn test_every_format_renders_sample() {
    let doc = DocumentRecord {
        title: "Plan".into(),
        content: OutputData::new(vec![
            Block::new("header", json!({ "text": "Plan", "level": 2 })),
            Block::new("paragraph", json!({ "text": "Body" })),
        ]),
        ..DocumentRecord::default()
    };
    for format in ExportFormat::ALL {
        let rendered = format.render(&doc).unwrap();
        assert!(rendered.contains("Body"), "{format:?}");
    }
}

// === Save failures ===

fn text_of(root: &web_sys::Element, selector: &str) -> Vec<String> {
    let nodes = root.query_selector_all(selector).unwrap();
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.text_content())
        .collect()
}

#[wasm_bindgen_test]
async fn test_rejected_save_shows_error_and_clears_saving_state() {
    let document = web_sys::window().unwrap().document().unwrap();
    let parent: web_sys::HtmlElement = document.create_element("div").unwrap().unchecked_into();
    document.body().unwrap().append_child(&parent).unwrap();

    let handle = leptos::mount::mount_to(parent.clone(), || {
        let notifier = Notifier::new();
        provide_context(notifier);
        let settings = EditorSettings {
            auto_save_interval_ms: 100,
            ..EditorSettings::default()
        };
        let rejecting: SaveHandler = Rc::new(|_: DocumentRecord| -> SaveFuture {
            Box::pin(async { Err(SaveError::Rejected("backend down".into())) })
        });
        view! {
            <DocumentShell
                document=DocumentRecord::default()
                on_save=rejecting
                read_only=false
                settings=settings
            />
            <ToastHost notifier=notifier />
        }
    });

    // A fresh record counts as saved when it was last modified.
    assert_eq!(text_of(&parent, ".doc-status"), ["Saved just now"]);

    TimeoutFuture::new(250).await;
    let errors = text_of(&parent, ".toast-error");
    assert!(
        errors.iter().any(|m| m == "Save failed, please try again"),
        "{errors:?}"
    );
    assert_eq!(text_of(&parent, ".doc-status"), ["Saved just now"]);

    drop(handle);
    parent.remove();
}
