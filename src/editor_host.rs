//! Host for the Editor.js block editor.
//!
//! Editor.js and its tool plugins are loaded as browser globals (see
//! `index.html`); this module binds the slice of their API the page uses
//! and owns the single live instance. The instance is created once per
//! [`EditorHost::mount`] and never re-created from outside data: content
//! flows out through `on_change` only, and `render` is the one explicit
//! overwrite.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::document::OutputData;
use crate::error::{describe_js, EditorError};
use crate::slash::BlockTemplate;

/// Reactive slot for the live host. Local storage: the host holds JS handles.
pub type HostSlot = leptos::prelude::StoredValue<Option<EditorHost>, leptos::prelude::LocalStorage>;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = EditorJS)]
    #[derive(Clone)]
    pub type EditorJs;

    #[wasm_bindgen(constructor, catch, js_class = "EditorJS")]
    fn new(config: &JsValue) -> Result<EditorJs, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn save(this: &EditorJs) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn clear(this: &EditorJs) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn render(this: &EditorJs, data: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn focus(this: &EditorJs) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &EditorJs) -> Result<(), JsValue>;

    #[wasm_bindgen(method, getter)]
    fn blocks(this: &EditorJs) -> BlocksApi;

    #[wasm_bindgen(method, getter)]
    fn caret(this: &EditorJs) -> CaretApi;

    pub type BlocksApi;

    #[wasm_bindgen(method, js_name = getCurrentBlockIndex)]
    fn get_current_block_index(this: &BlocksApi) -> i32;

    #[wasm_bindgen(method, js_name = getBlocksCount)]
    fn get_blocks_count(this: &BlocksApi) -> u32;

    #[wasm_bindgen(method, js_name = getBlockByIndex)]
    fn get_block_by_index(this: &BlocksApi, index: u32) -> Option<BlockApi>;

    #[wasm_bindgen(method, catch)]
    fn insert(
        this: &BlocksApi,
        kind: &str,
        data: &JsValue,
        config: &JsValue,
        index: u32,
        need_to_focus: bool,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn delete(this: &BlocksApi, index: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = "move")]
    fn move_to(this: &BlocksApi, to_index: u32, from_index: u32) -> Result<(), JsValue>;

    pub type BlockApi;

    #[wasm_bindgen(method, getter)]
    fn name(this: &BlockApi) -> String;

    #[wasm_bindgen(method, getter)]
    fn holder(this: &BlockApi) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, catch, js_name = save)]
    fn save_block(this: &BlockApi) -> Result<js_sys::Promise, JsValue>;

    pub type CaretApi;

    #[wasm_bindgen(method, js_name = setToBlock)]
    fn set_to_block(this: &CaretApi, index: u32) -> bool;
}

/// A tool plugin, looked up on `window` by its global name.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub global: &'static str,
    pub inline_toolbar: bool,
    pub shortcut: Option<&'static str>,
    pub config: Value,
}

impl ToolSpec {
    fn new(name: &'static str, global: &'static str) -> Self {
        Self {
            name,
            global,
            inline_toolbar: false,
            shortcut: None,
            config: Value::Null,
        }
    }

    fn inline(mut self) -> Self {
        self.inline_toolbar = true;
        self
    }

    fn shortcut(mut self, keys: &'static str) -> Self {
        self.shortcut = Some(keys);
        self
    }

    fn config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}

pub fn default_tools(placeholder: &str) -> Vec<ToolSpec> {
    vec![
        ToolSpec::new("paragraph", "Paragraph")
            .inline()
            .config(json!({ "preserveBlank": true, "placeholder": placeholder })),
        ToolSpec::new("header", "Header")
            .config(json!({
                "placeholder": "Heading",
                "levels": [1, 2, 3, 4, 5, 6],
                "defaultLevel": 2
            })),
        ToolSpec::new("list", "EditorjsList")
            .inline()
            .config(json!({ "defaultStyle": "unordered" })),
        ToolSpec::new("checklist", "Checklist").inline(),
        ToolSpec::new("quote", "Quote").inline().config(json!({
            "quotePlaceholder": "Quote",
            "captionPlaceholder": "Source (optional)"
        })),
        ToolSpec::new("code", "CodeTool").config(json!({ "placeholder": "Enter code" })),
        ToolSpec::new("table", "Table").inline().config(json!({ "rows": 2, "cols": 3 })),
        ToolSpec::new("image", "ImageTool"),
        ToolSpec::new("embed", "Embed").config(json!({
            "services": { "youtube": true, "vimeo": true, "codepen": true, "figma": true }
        })),
        ToolSpec::new("linkTool", "LinkTool").config(json!({ "endpoint": "/api/link-preview" })),
        ToolSpec::new("delimiter", "Delimiter"),
        ToolSpec::new("warning", "Warning").inline().config(json!({
            "titlePlaceholder": "Title",
            "messagePlaceholder": "Message"
        })),
        ToolSpec::new("attaches", "AttachesTool"),
        ToolSpec::new("alert", "Alert").inline(),
        ToolSpec::new("toggle", "ToggleBlock").inline(),
        ToolSpec::new("marker", "Marker").shortcut("CMD+SHIFT+M"),
        ToolSpec::new("inlineCode", "InlineCode").shortcut("CMD+SHIFT+C"),
    ]
}

#[derive(Clone, Debug)]
pub struct HostConfig {
    pub placeholder: String,
    pub read_only: bool,
    pub autofocus: bool,
    pub min_height: u32,
    pub tools: Vec<ToolSpec>,
}

impl HostConfig {
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        Self {
            tools: default_tools(&placeholder),
            placeholder,
            read_only: false,
            autofocus: true,
            min_height: 300,
        }
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, EditorError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn set(target: &js_sys::Object, key: &str, value: &JsValue) -> Result<(), EditorError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| EditorError::js("Reflect.set", e))
}

fn resolve_tool(spec: &ToolSpec) -> Result<js_sys::Object, EditorError> {
    let window: JsValue = web_sys::window().ok_or(EditorError::NotMounted)?.into();
    let class = js_sys::Reflect::get(&window, &JsValue::from_str(spec.global))
        .map_err(|e| EditorError::js("window lookup", e))?;
    if class.is_undefined() || class.is_null() {
        return Err(EditorError::MissingTool {
            tool: spec.name.to_string(),
            global: spec.global.to_string(),
        });
    }
    let tool = js_sys::Object::new();
    set(&tool, "class", &class)?;
    if spec.inline_toolbar {
        set(&tool, "inlineToolbar", &JsValue::TRUE)?;
    }
    if let Some(shortcut) = spec.shortcut {
        set(&tool, "shortcut", &JsValue::from_str(shortcut))?;
    }
    if !spec.config.is_null() {
        set(&tool, "config", &to_js(&spec.config)?)?;
    }
    Ok(tool)
}

/// What `BlockAPI.save()` resolves to.
#[derive(Deserialize)]
struct SavedBlock {
    tool: String,
    #[serde(default)]
    data: Value,
}

/// Snapshot of the block under the caret.
#[derive(Clone, Debug)]
pub struct CurrentBlock {
    pub index: u32,
    pub kind: String,
    pub text: String,
    pub element: web_sys::HtmlElement,
}

type ChangeFn = dyn Fn(OutputData);
type ReadyFn = dyn Fn();

struct Mounted {
    editor: EditorJs,
    _on_change: Closure<dyn FnMut(JsValue, JsValue)>,
    _on_ready: Closure<dyn FnMut()>,
    _upload: Closure<dyn FnMut(web_sys::File) -> js_sys::Promise>,
}

/// Owner of the live editor instance. Cheap to clone; clones share the
/// instance.
#[derive(Clone)]
pub struct EditorHost {
    holder: web_sys::HtmlElement,
    config: Rc<RefCell<HostConfig>>,
    on_change: Rc<ChangeFn>,
    on_ready: Rc<ReadyFn>,
    inner: Rc<RefCell<Option<Mounted>>>,
}

impl EditorHost {
    pub fn new(
        holder: web_sys::HtmlElement,
        config: HostConfig,
        on_change: impl Fn(OutputData) + 'static,
        on_ready: impl Fn() + 'static,
    ) -> Self {
        Self {
            holder,
            config: Rc::new(RefCell::new(config)),
            on_change: Rc::new(on_change),
            on_ready: Rc::new(on_ready),
            inner: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().is_some()
    }

    pub fn read_only(&self) -> bool {
        self.config.borrow().read_only
    }

    /// Creates the editor with `data` as its initial content. A second call
    /// while mounted is a no-op.
    pub fn mount(&self, data: Option<&OutputData>) -> Result<(), EditorError> {
        if self.is_mounted() {
            tracing::debug!("editor already mounted; ignoring mount");
            return Ok(());
        }
        let config = self.config.borrow().clone();

        let tools = js_sys::Object::new();
        for spec in &config.tools {
            match resolve_tool(spec) {
                Ok(tool) => set(&tools, spec.name, &tool)?,
                Err(e) => tracing::warn!(error = %e, "skipping editor tool"),
            }
        }

        let upload = Closure::<dyn FnMut(web_sys::File) -> js_sys::Promise>::new(
            |file: web_sys::File| match upload_by_object_url(&file) {
                Ok(result) => js_sys::Promise::resolve(&result),
                Err(e) => js_sys::Promise::reject(&e),
            },
        );
        if let Ok(image) = js_sys::Reflect::get(&tools, &JsValue::from_str("image")) {
            if let Some(image) = image.dyn_ref::<js_sys::Object>() {
                let uploader = js_sys::Object::new();
                set(&uploader, "uploadByFile", upload.as_ref())?;
                let image_config = js_sys::Object::new();
                set(&image_config, "uploader", &uploader)?;
                set(image, "config", &image_config)?;
            }
        }

        let weak: Weak<RefCell<Option<Mounted>>> = Rc::downgrade(&self.inner);
        let on_change_cb = self.on_change.clone();
        let on_change = Closure::<dyn FnMut(JsValue, JsValue)>::new(
            move |_api: JsValue, _event: JsValue| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Some(editor) = inner.borrow().as_ref().map(|m| m.editor.clone()) else {
                    return;
                };
                let on_change_cb = on_change_cb.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match save_editor(&editor).await {
                        Ok(data) => on_change_cb(data),
                        Err(e) => tracing::error!(error = %e, "failed to read editor content"),
                    }
                });
            },
        );

        let on_ready_cb = self.on_ready.clone();
        let on_ready = Closure::<dyn FnMut()>::new(move || {
            tracing::info!("editor ready");
            on_ready_cb();
        });

        let js_config = js_sys::Object::new();
        set(&js_config, "holder", &self.holder)?;
        set(&js_config, "placeholder", &JsValue::from_str(&config.placeholder))?;
        set(&js_config, "readOnly", &JsValue::from_bool(config.read_only))?;
        set(&js_config, "autofocus", &JsValue::from_bool(config.autofocus))?;
        set(&js_config, "minHeight", &JsValue::from(config.min_height))?;
        set(&js_config, "tools", &tools)?;
        set(&js_config, "onChange", on_change.as_ref())?;
        set(&js_config, "onReady", on_ready.as_ref())?;
        if let Some(data) = data.filter(|d| !d.is_empty()) {
            set(&js_config, "data", &to_js(data)?)?;
        }

        let editor = EditorJs::new(&js_config).map_err(|e| EditorError::js("new EditorJS", e))?;
        *self.inner.borrow_mut() = Some(Mounted {
            editor,
            _on_change: on_change,
            _on_ready: on_ready,
            _upload: upload,
        });
        tracing::debug!(read_only = config.read_only, "editor mounted");
        Ok(())
    }

    fn editor(&self) -> Result<EditorJs, EditorError> {
        self.inner
            .borrow()
            .as_ref()
            .map(|m| m.editor.clone())
            .ok_or(EditorError::NotMounted)
    }

    /// Current content snapshot.
    pub async fn save(&self) -> Result<OutputData, EditorError> {
        save_editor(&self.editor()?).await
    }

    pub async fn clear(&self) -> Result<(), EditorError> {
        let result = self
            .editor()?
            .clear()
            .map_err(|e| EditorError::js("clear", e))?;
        if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
            JsFuture::from(promise)
                .await
                .map_err(|e| EditorError::js("clear", e))?;
        }
        Ok(())
    }

    /// Replaces the editor content with `data`.
    pub async fn render(&self, data: &OutputData) -> Result<(), EditorError> {
        let editor = self.editor()?;
        let promise = editor
            .render(&to_js(data)?)
            .map_err(|e| EditorError::js("render", e))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| EditorError::js("render", e))
    }

    pub fn focus(&self) -> Result<(), EditorError> {
        self.editor()?
            .focus()
            .map(|_| ())
            .map_err(|e| EditorError::js("focus", e))
    }

    /// Tears the instance down. Safe to call when not mounted.
    pub fn destroy(&self) {
        let Some(mounted) = self.inner.borrow_mut().take() else {
            return;
        };
        if let Err(e) = mounted.editor.destroy() {
            tracing::warn!("editor destroy failed: {}", describe_js(&e));
        }
        tracing::debug!("editor destroyed");
    }

    /// Editor.js cannot switch modes in place, so this snapshots the
    /// content, destroys the instance and mounts a fresh one.
    pub async fn set_read_only(&self, read_only: bool) -> Result<(), EditorError> {
        if self.read_only() == read_only && self.is_mounted() {
            return Ok(());
        }
        let snapshot = match self.save().await {
            Ok(data) => Some(data),
            Err(EditorError::NotMounted) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not snapshot before remount");
                None
            }
        };
        self.destroy();
        {
            let mut config = self.config.borrow_mut();
            config.read_only = read_only;
            config.autofocus = !read_only;
        }
        self.mount(snapshot.as_ref())
    }

    pub fn current_block_index(&self) -> Option<u32> {
        let index = self.editor().ok()?.blocks().get_current_block_index();
        u32::try_from(index).ok()
    }

    pub fn block_count(&self) -> u32 {
        self.editor()
            .map(|e| e.blocks().get_blocks_count())
            .unwrap_or(0)
    }

    /// Block type name and its editable element.
    pub fn block_editable(
        &self,
        index: u32,
    ) -> Result<(String, web_sys::HtmlElement), EditorError> {
        let block = self
            .editor()?
            .blocks()
            .get_block_by_index(index)
            .ok_or(EditorError::NoBlock(index))?;
        let holder = block.holder();
        let editable = holder
            .query_selector("[contenteditable=\"true\"]")
            .map_err(|e| EditorError::js("querySelector", e))?
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
            .unwrap_or(holder);
        Ok((block.name(), editable))
    }

    /// The block holding the caret.
    pub fn current_block(&self) -> Result<CurrentBlock, EditorError> {
        let index = self.current_block_index().ok_or(EditorError::NoBlock(0))?;
        let (kind, element) = self.block_editable(index)?;
        Ok(CurrentBlock {
            index,
            kind,
            text: element.text_content().unwrap_or_default(),
            element,
        })
    }

    /// Overwrites a block's visible text. Inline markup in it is lost.
    pub fn set_block_text(&self, index: u32, text: &str) -> Result<(), EditorError> {
        let (_, element) = self.block_editable(index)?;
        element.set_text_content(Some(text));
        Ok(())
    }

    pub fn insert_block(&self, template: &BlockTemplate, index: u32) -> Result<(), EditorError> {
        let editor = self.editor()?;
        editor
            .blocks()
            .insert(
                template.kind,
                &to_js(&template.data)?,
                &js_sys::Object::new(),
                index,
                true,
            )
            .map(|_| ())
            .map_err(|e| EditorError::js("blocks.insert", e))
    }

    pub fn delete_block(&self, index: u32) -> Result<(), EditorError> {
        self.editor()?
            .blocks()
            .delete(index)
            .map_err(|e| EditorError::js("blocks.delete", e))
    }

    /// Moves block `from` to position `to`; both must be existing indices.
    pub fn move_block(&self, from: u32, to: u32) -> Result<(), EditorError> {
        let blocks = self.editor()?.blocks();
        let count = blocks.get_blocks_count();
        if let Some(missing) = [from, to].into_iter().find(|&i| i >= count) {
            return Err(EditorError::NoBlock(missing));
        }
        blocks
            .move_to(to, from)
            .map_err(|e| EditorError::js("blocks.move", e))
    }

    /// Inserts a copy of block `index` right after it and returns the
    /// copy's index.
    pub async fn duplicate_block(&self, index: u32) -> Result<u32, EditorError> {
        let editor = self.editor()?;
        let block = editor
            .blocks()
            .get_block_by_index(index)
            .ok_or(EditorError::NoBlock(index))?;
        let promise = block
            .save_block()
            .map_err(|e| EditorError::js("block.save", e))?;
        let saved = JsFuture::from(promise)
            .await
            .map_err(|e| EditorError::js("block.save", e))?;
        if saved.is_undefined() || saved.is_null() {
            return Err(EditorError::NoBlock(index));
        }
        let saved: SavedBlock = serde_wasm_bindgen::from_value(saved)?;
        let copy = index + 1;
        editor
            .blocks()
            .insert(&saved.tool, &to_js(&saved.data)?, &js_sys::Object::new(), copy, false)
            .map_err(|e| EditorError::js("blocks.insert", e))?;
        Ok(copy)
    }

    pub fn set_caret_to_block(&self, index: u32) -> bool {
        self.editor()
            .map(|e| e.caret().set_to_block(index))
            .unwrap_or(false)
    }
}

async fn save_editor(editor: &EditorJs) -> Result<OutputData, EditorError> {
    let promise = editor.save().map_err(|e| EditorError::js("save", e))?;
    let value = JsFuture::from(promise)
        .await
        .map_err(|e| EditorError::js("save", e))?;
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Local-only image "upload": the file is served from an object URL.
fn upload_by_object_url(file: &web_sys::File) -> Result<JsValue, JsValue> {
    let url = web_sys::Url::create_object_url_with_blob(file)?;
    let response = json!({
        "success": 1,
        "file": { "url": url, "name": file.name(), "size": file.size() }
    });
    response
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}
