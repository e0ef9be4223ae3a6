//! The document page: header (title, save state, collaborators, actions),
//! the editor surface with its floating UI, and the collaboration panel.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use chrono::Utc;
use gloo_timers::callback::Interval;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::block_actions::{apply_block_action, BlockAction, BlockHandle};

use crate::config::EditorSettings;
use crate::document::{
    avatar_initials, format_last_saved, normalize_title, DocumentRecord, OutputData,
    MAX_TITLE_CHARS,
};
use crate::editor_host::{EditorHost, HostConfig, HostSlot};
use crate::error::{describe_js, SaveError};
use crate::export::{
    export_document, import_json, print_page, read_file_text, ExportFormat,
};
use crate::notify::use_notifier;
use crate::slash::SlashMenuState;
use crate::slash_menu::{install_slash_menu, SlashActions, SlashMenu};
use crate::toolbar::{install_toolbars, viewport, InlineToolbar, PlusButton, ToolbarSignals};

pub type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>>>>;

/// Persists a document snapshot. Awaited by the save button and auto-save.
pub type SaveHandler = Rc<dyn Fn(DocumentRecord) -> SaveFuture>;

const LABEL_REFRESH_MS: u32 = 30_000;
const AVATAR_LIMIT: usize = 3;

#[component]
pub fn DocumentShell(
    document: DocumentRecord,
    on_save: SaveHandler,
    #[prop(into)] read_only: Signal<bool>,
    #[prop(optional)] settings: Option<EditorSettings>,
    #[prop(optional)] on_title_change: Option<Callback<String>>,
    #[prop(optional)] on_content_change: Option<Callback<OutputData>>,
) -> impl IntoView {
    let notifier = use_notifier();
    let settings = settings.unwrap_or_default();

    let record = StoredValue::new(document.clone());
    let on_save = StoredValue::new_local(on_save);
    let title = RwSignal::new(document.title.clone());
    let draft_title = RwSignal::new(String::new());
    let editing_title = RwSignal::new(false);
    let content = RwSignal::new(document.content.clone());
    let saved_content = StoredValue::new(document.content.clone());
    let last_saved = RwSignal::new(Some(document.last_modified));
    let is_saving = RwSignal::new(false);
    let now = RwSignal::new(Utc::now());
    let more_open = RwSignal::new(false);
    let panel_open = RwSignal::new(false);
    let editor_ready = RwSignal::new(false);

    let host: HostSlot = StoredValue::new_local(None);
    let toolbar = ToolbarSignals::new();
    let menu = RwSignal::new(SlashMenuState::default());
    let actions = SlashActions {
        host,
        menu,
        notifier,
        read_only,
    };

    let container_ref = NodeRef::<html::Div>::new();
    let holder_ref = NodeRef::<html::Div>::new();
    let title_input = NodeRef::<html::Input>::new();

    let snapshot = move || DocumentRecord {
        title: title.get_untracked(),
        content: content.get_untracked(),
        last_modified: Utc::now(),
        ..record.get_value()
    };

    let save = move |silent: bool| {
        if read_only.get_untracked() {
            return;
        }
        is_saving.set(true);
        spawn_local(async move {
            if let Some(editor) = host.get_value() {
                match editor.save().await {
                    Ok(data) => content.set(data),
                    Err(e) => tracing::warn!(error = %e, "saving last known content"),
                }
            }
            let doc = snapshot();
            let saved = doc.content.clone();
            let pending = on_save.with_value(|handler| handler(doc));
            match pending.await {
                Ok(()) => {
                    saved_content.set_value(saved);
                    let saved_at = Utc::now();
                    last_saved.set(Some(saved_at));
                    now.set(saved_at);
                    tracing::info!(silent, "document saved");
                    if !silent {
                        notifier.success("Document saved");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "save failed");
                    notifier.error("Save failed, please try again");
                }
            }
            is_saving.set(false);
        });
    };

    let auto_save = Interval::new(settings.auto_save_interval_ms, move || save(true));
    let label_tick = Interval::new(LABEL_REFRESH_MS, move || now.set(Utc::now()));
    // Dropped (and cancelled) with the component.
    let _timers = StoredValue::new_local((auto_save, label_tick));

    let mut host_config = HostConfig::new(settings.placeholder.clone());
    host_config.min_height = settings.min_height;
    host_config.read_only = read_only.get_untracked();
    host_config.autofocus = !host_config.read_only;
    let initial_content = document.content.clone();
    let mount_settings = settings.clone();
    Effect::new(move |_| {
        let (Some(holder), Some(container)) = (holder_ref.get(), container_ref.get()) else {
            return;
        };
        if host.with_value(Option::is_some) {
            return;
        }
        let editor = EditorHost::new(
            holder.into(),
            host_config.clone(),
            move |data: OutputData| {
                content.set(data.clone());
                if let Some(callback) = on_content_change {
                    callback.run(data);
                }
            },
            move || editor_ready.set(true),
        );
        if let Err(e) = editor.mount(Some(&initial_content)) {
            tracing::error!(error = %e, "editor failed to mount");
            notifier.error("The editor could not be loaded");
            return;
        }
        host.set_value(Some(editor));
        let container: web_sys::HtmlElement = container.into();
        install_toolbars(&container, &mount_settings, toolbar, read_only);
        install_slash_menu(&container, actions);
    });

    Effect::new(move |previous: Option<bool>| {
        let locked = read_only.get();
        if previous.is_some_and(|p| p != locked) {
            editing_title.set(false);
            menu.update(SlashMenuState::close);
            if let Some(editor) = host.get_value() {
                spawn_local(async move {
                    if let Err(e) = editor.set_read_only(locked).await {
                        tracing::error!(error = %e, "switching editor mode failed");
                        notifier.error("Could not switch editing mode");
                    }
                });
            }
        }
        locked
    });

    Effect::new(move |_| {
        if editing_title.get() {
            if let Some(input) = title_input.get() {
                if let Err(e) = input.focus() {
                    tracing::warn!("could not focus title input: {}", describe_js(&e));
                }
                input.select();
            }
        }
    });

    let focus_editor = move || {
        if let Some(editor) = host.get_value() {
            if let Err(e) = editor.focus() {
                tracing::warn!(error = %e, "could not focus editor");
            }
        }
    };

    let start_title_edit = move |_: leptos::ev::MouseEvent| {
        if read_only.get_untracked() {
            return;
        }
        draft_title.set(title.get_untracked());
        editing_title.set(true);
    };
    let commit_title = move || {
        if !editing_title.get_untracked() {
            return;
        }
        editing_title.set(false);
        let next = normalize_title(&draft_title.get_untracked());
        if next != title.get_untracked() {
            title.set(next.clone());
            if let Some(callback) = on_title_change {
                callback.run(next);
            }
        }
    };

    let export = move |format: ExportFormat| {
        more_open.set(false);
        match export_document(&snapshot(), format) {
            Ok(()) => notifier.success(format!("Exported {}", format.label())),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                notifier.error("Export failed");
            }
        }
    };

    let revert = move || {
        more_open.set(false);
        let Some(editor) = host.get_value() else {
            return;
        };
        let data = saved_content.get_value();
        spawn_local(async move {
            match editor.render(&data).await {
                Ok(()) => {
                    content.set(data);
                    notifier.info("Reverted to the last saved version");
                }
                Err(e) => {
                    tracing::error!(error = %e, "revert failed");
                    notifier.error("Could not revert the document");
                }
            }
        });
    };

    let clear = move || {
        more_open.set(false);
        if !window().confirm_with_message("Clear the whole document?").unwrap_or(false) {
            return;
        }
        let Some(editor) = host.get_value() else {
            return;
        };
        spawn_local(async move {
            match editor.clear().await {
                Ok(()) => content.set(OutputData::default()),
                Err(e) => {
                    tracing::error!(error = %e, "clear failed");
                    notifier.error("Could not clear the document");
                }
            }
        });
    };

    let open_file = move || {
        more_open.set(false);
        // `document` here is the prop, not the DOM document.
        let Ok(input) = leptos::prelude::document().create_element("input") else {
            return;
        };
        let input: web_sys::HtmlInputElement = input.unchecked_into();
        input.set_type("file");
        input.set_accept(".json,application/json");
        let picked = input.clone();
        let on_pick = Closure::once_into_js(move || {
            let Some(file) = picked.files().and_then(|files| files.get(0)) else {
                return;
            };
            spawn_local(async move {
                let opened = match read_file_text(&file).await {
                    Ok(raw) => import_json(&raw),
                    Err(e) => Err(e),
                };
                let data = match opened {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::warn!(error = %e, file = %file.name(), "could not open file");
                        notifier.error("That file is not a saved document");
                        return;
                    }
                };
                let Some(editor) = host.get_value() else {
                    return;
                };
                match editor.render(&data).await {
                    Ok(()) => {
                        content.set(data);
                        notifier.success(format!("Opened {}", file.name()));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "loading opened file failed");
                        notifier.error("Could not load the document");
                    }
                }
            });
        });
        input.set_onchange(Some(on_pick.unchecked_ref()));
        input.click();
    };

    let on_block_action = Callback::new(move |(action, index): (BlockAction, u32)| {
        if read_only.get_untracked() {
            return;
        }
        let Some(editor) = host.get_value() else {
            return;
        };
        spawn_local(async move {
            if let Err(e) = apply_block_action(&editor, action, index).await {
                tracing::error!(?action, index, error = %e, "block action failed");
                notifier.error(format!("{} failed", action.label()));
            }
        });
    });

    let on_plus = Callback::new(move |_: ()| {
        let Some(index) = toolbar.hovered_block.get_untracked() else {
            return;
        };
        let anchor = toolbar.plus.get_untracked();
        let vp = viewport();
        actions.open_for_block(index, anchor.x - vp.scroll_x, anchor.y - vp.scroll_y);
    });

    let mut people = vec![document.owner.clone()];
    people.extend(document.collaborators.iter().cloned());
    let people = StoredValue::new(people);
    let (initials, overflow) = avatar_initials(&document.collaborators, AVATAR_LIMIT);

    let title_view = move || {
        if editing_title.get() {
            view! {
                <input
                    class="doc-title-input"
                    node_ref=title_input
                    maxlength=MAX_TITLE_CHARS.to_string()
                    prop:value=move || draft_title.get()
                    on:input=move |ev| draft_title.set(event_target_value(&ev))
                    on:keydown=move |ev| match ev.key().as_str() {
                        "Enter" => {
                            commit_title();
                            focus_editor();
                        }
                        "Escape" => editing_title.set(false),
                        _ => {}
                    }
                    on:blur=move |_| commit_title()
                />
            }
            .into_any()
        } else {
            view! {
                <h1
                    class="doc-title"
                    title=move || if read_only.get() { "" } else { "Click to rename" }
                    on:click=start_title_edit
                >
                    {move || title.get()}
                </h1>
            }
            .into_any()
        }
    };

    let status = move || {
        if is_saving.get() {
            "Saving...".to_string()
        } else {
            format_last_saved(last_saved.get(), now.get())
        }
    };

    let panel = move || {
        panel_open.get().then(|| {
            view! {
                <aside class="collab-panel">
                    <div class="collab-panel-header">
                        <span>"Collaborators"</span>
                        <button class="icon-button" title="Close" on:click=move |_| panel_open.set(false)>"×"</button>
                    </div>
                    <ul class="collab-list">
                        {people.get_value().into_iter().enumerate().map(|(i, name)| {
                            let initial = name.chars().next().map(String::from).unwrap_or_default();
                            view! {
                                <li class="collab-item">
                                    <span class="avatar">{initial}</span>
                                    <span class="collab-name">{name}</span>
                                    {(i == 0).then(|| view! { <span class="collab-role">"Owner"</span> })}
                                </li>
                            }
                        }).collect::<Vec<_>>()}
                    </ul>
                </aside>
            }
        })
    };

    view! {
        <div class="blockdoc-shell" style=settings.css_variables()>
            <header class="doc-header">
                <div class="doc-header-left">
                    {title_view}
                    <span class="doc-status">{status}</span>
                    {move || read_only.get().then(|| view! { <span class="doc-badge">"Read only"</span> })}
                </div>
                <div class="doc-header-right">
                    <div class="avatars" on:click=move |_| panel_open.update(|open| *open = !*open)>
                        {initials.into_iter().map(|initial| view! { <span class="avatar">{initial}</span> }).collect::<Vec<_>>()}
                        {(overflow > 0).then(|| view! { <span class="avatar avatar-more">{format!("+{overflow}")}</span> })}
                    </div>
                    <button class="header-button" on:click=move |_| notifier.info("Sharing is coming soon")>"Share"</button>
                    <button class="header-button" on:click=move |_| notifier.info("Comments are coming soon")>"Comments"</button>
                    {move || (!read_only.get()).then(|| view! {
                        <button
                            class="header-button primary"
                            disabled=move || is_saving.get() || !editor_ready.get()
                            on:click=move |_| save(false)
                        >
                            {move || if is_saving.get() { "Saving..." } else { "Save" }}
                        </button>
                    })}
                    <div class="more-menu-anchor">
                        <button class="icon-button" title="More" on:click=move |_| more_open.update(|open| *open = !*open)>"⋯"</button>
                        {move || more_open.get().then(|| view! {
                            <div class="more-menu">
                                {ExportFormat::ALL.into_iter().map(|format| view! {
                                    <button class="more-menu-item" on:click=move |_| export(format)>
                                        {format!("Export as {}", format.label())}
                                    </button>
                                }).collect::<Vec<_>>()}
                                <div class="more-menu-divider"></div>
                                <button class="more-menu-item" on:click=move |_| {
                                    more_open.set(false);
                                    print_page();
                                }>"Print"</button>
                                {move || (!read_only.get()).then(|| view! {
                                    <div class="more-menu-divider"></div>
                                    <button class="more-menu-item" on:click=move |_| open_file()>"Open JSON file..."</button>
                                    <button class="more-menu-item" on:click=move |_| revert()>"Revert to last saved"</button>
                                    <button class="more-menu-item danger" on:click=move |_| clear()>"Clear document"</button>
                                })}
                            </div>
                        })}
                    </div>
                </div>
            </header>
            <div class="doc-body">
                <div class="editor-wrapper" node_ref=container_ref>
                    <div
                        class="blockdoc-editor"
                        data-editor-js="true"
                        node_ref=holder_ref
                        style=format!("min-height: {}px;", settings.min_height)
                    ></div>
                    <PlusButton position=toolbar.plus on_click=on_plus />
                    <BlockHandle
                        position=toolbar.plus
                        hovered_block=toolbar.hovered_block
                        on_action=on_block_action
                    />
                    <InlineToolbar position=toolbar.inline />
                    <SlashMenu actions=actions />
                </div>
                {panel}
            </div>
        </div>
    }
}
