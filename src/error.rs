use wasm_bindgen::JsValue;

/// Failures coming out of the embedded block editor.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum EditorError {
    #[error("editor is not mounted")]
    NotMounted,

    #[error("editor call `{call}` failed: {message}")]
    Js { call: &'static str, message: String },

    #[error("editor tool `{tool}` expects global `{global}`, which is not loaded")]
    MissingTool { tool: String, global: String },

    #[error("no block at index {0}")]
    NoBlock(u32),

    #[error(transparent)]
    Wasm(#[from] serde_wasm_bindgen::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn js(call: &'static str, value: JsValue) -> Self {
        Self::Js {
            call,
            message: describe_js(&value),
        }
    }
}

/// Failures reported by a caller-supplied save handler.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("save rejected: {0}")]
    Rejected(String),
}

/// Failures producing or delivering an export.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("file does not contain editor blocks")]
    NotEditorData,
}

impl From<JsValue> for ExportError {
    fn from(value: JsValue) -> Self {
        Self::Download(describe_js(&value))
    }
}

/// Best-effort human readable form of a thrown JS value.
pub fn describe_js(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = wasm_bindgen::JsCast::dyn_ref::<js_sys::Error>(value) {
        return String::from(err.message());
    }
    format!("{value:?}")
}
