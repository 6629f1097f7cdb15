use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("no global `window` exists")]
    NoWindow,
    #[error("session storage unavailable")]
    StorageUnavailable,
    #[error("missing global function `{0}`")]
    MissingGlobal(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data layer query `{query}` failed: {reason}")]
    Query { query: String, reason: String },
    #[error("operation cancelled by navigation")]
    Cancelled,
    #[error("superseded by a newer refresh")]
    Superseded,
}

impl PortalError {
    pub fn from_js(value: JsValue) -> Self {
        PortalError::Js(js_error_text(&value))
    }
}

impl From<JsValue> for PortalError {
    fn from(value: JsValue) -> Self {
        PortalError::from_js(value)
    }
}

impl From<PortalError> for JsValue {
    fn from(err: PortalError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

pub fn js_error_text(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    let name = js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string());
    let message = js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|v| v.as_string());
    match (name, message) {
        (Some(n), Some(m)) => format!("{n}: {m}"),
        (None, Some(m)) => m,
        (Some(n), None) => n,
        (None, None) => format!("{value:?}"),
    }
}

pub type PortalResult<T> = Result<T, PortalError>;
