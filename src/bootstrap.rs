use std::cell::Cell;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::session::{
    BrowserSession, ImageResource, ModuleType, NavigationContext, SessionKey, SessionStore,
};

pub const GUEST_DEFAULT: (&str, &str) = ("Cannot continue with this", "module.");

thread_local! {
    static MODULE_LOADED: Cell<bool> = const { Cell::new(false) };
}

pub fn default_image_resources() -> Vec<ImageResource> {
    let img = |name: &str, file_src: &str, width, height| ImageResource {
        name: name.to_string(),
        file_src: file_src.to_string(),
        width,
        height,
    };
    vec![
        img("hourglass", "../images/hourglass.png", 128, 256),
        img("clipboardicon", "../images/clipboardicon.png", 200, 200),
        img("yellowarrow", "../images/yellow_arrow.png", 225, 299),
    ]
}

pub fn set_module_values<S: SessionStore>(nav: &NavigationContext<S>, config: &PortalConfig) -> PortalResult<()> {
    nav.set_image_resources(&default_image_resources())?;
    nav.set_module_path(&config.module_name);
    Ok(())
}

// The two lines of the "guest cannot continue" dialog for the active module type.
pub fn guest_dialog_message<S: SessionStore>(nav: &NavigationContext<S>) -> (String, String) {
    let Some(copy) = nav.guest_messages().and_then(|m| m.guest_no_access_message) else {
        return (GUEST_DEFAULT.0.to_string(), GUEST_DEFAULT.1.to_string());
    };
    let lines = match nav.module_type().unwrap_or(ModuleType::Exam) {
        ModuleType::Regular => copy.regular,
        ModuleType::Exam => copy.exam,
    };
    let line = |i: usize| lines.get(i).cloned().unwrap_or_default();
    (line(0), line(1))
}

pub trait ModulePlayer {
    fn load(&self, path: &str) -> PortalResult<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsModulePlayer;

impl ModulePlayer for JsModulePlayer {
    fn load(&self, path: &str) -> PortalResult<()> {
        let window = web_sys::window().ok_or(PortalError::NoWindow)?;
        let vm = Reflect::get(&window, &JsValue::from_str("vm"))?;
        if vm.is_undefined() || vm.is_null() {
            return Err(PortalError::MissingGlobal("vm".to_string()));
        }
        let load: Function = Reflect::get(&vm, &JsValue::from_str("load"))?
            .dyn_into()
            .map_err(|_| PortalError::MissingGlobal("vm.load".to_string()))?;
        load.call1(&vm, &JsValue::from_str(path))?;
        Ok(())
    }
}

pub fn load_module<M: ModulePlayer>(player: &M, config: &PortalConfig) -> PortalResult<()> {
    MODULE_LOADED.with(|f| f.set(false));
    tracing::info!(path = %config.module_init_path, "loading module");
    player.load(&config.module_init_path)
}

pub fn is_module_loaded() -> bool {
    MODULE_LOADED.with(Cell::get)
}

fn browser_nav() -> Option<NavigationContext<BrowserSession>> {
    match NavigationContext::browser() {
        Ok(nav) => Some(nav),
        Err(err) => {
            tracing::warn!(%err, "session storage unavailable");
            None
        }
    }
}

#[wasm_bindgen(js_name = afterFileLoad)]
pub fn after_file_load() {
    MODULE_LOADED.with(|f| f.set(true));
    tracing::info!("module loaded");
}

#[wasm_bindgen(js_name = isModuleLoaded)]
pub fn is_module_loaded_js() -> bool {
    is_module_loaded()
}

#[wasm_bindgen(js_name = getFilePath)]
pub fn get_file_path() -> Option<String> {
    browser_nav()?.module_path()
}

#[wasm_bindgen(js_name = getNdlinkFileName)]
pub fn get_ndlink_file_name() -> String {
    PortalConfig::load().ndlink_file_name
}

#[wasm_bindgen(js_name = getImageResourceDetails)]
pub fn get_image_resource_details() -> JsValue {
    browser_nav()
        .and_then(|nav| nav.get(SessionKey::ImgResources))
        .and_then(|raw| js_sys::JSON::parse(&raw).ok())
        .unwrap_or(JsValue::NULL)
}

// `{1: first line, 2: second line}`.
#[wasm_bindgen(js_name = getGuestDialogMessage)]
pub fn get_guest_dialog_message() -> JsValue {
    let (first, second) = match browser_nav() {
        Some(nav) => guest_dialog_message(&nav),
        None => (GUEST_DEFAULT.0.to_string(), GUEST_DEFAULT.1.to_string()),
    };
    let msg = Object::new();
    let _ = Reflect::set(&msg, &JsValue::from_str("1"), &JsValue::from_str(&first));
    let _ = Reflect::set(&msg, &JsValue::from_str("2"), &JsValue::from_str(&second));
    msg.into()
}

#[wasm_bindgen(js_name = copyToSystemClipboard)]
pub fn copy_to_system_clipboard_js(text: String, is_module_completion: Option<bool>) {
    crate::clipboard::copy_to_system_clipboard(text, is_module_completion.unwrap_or(false));
}
