// Copying module results: share sheet, manual-copy modal or system clipboard

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;

use gloo_events::EventListener;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::device::{Capabilities, Platform, UserAgent};
use crate::error::js_error_text;
use crate::surface::{Display, DomSurface, Surface};
use crate::view::View;

pub const FLY_MODULE_ID: &str = "7-21-4";
// stand-in for the fly emoji on systems whose fonts predate it
pub const DRAGON_EMOJI: &str = "\u{1F432}";
pub const COPIED_MESSAGE: &str = "Copied results to clipboard.";
pub const MODAL_ID: &str = "myModal";
pub const MODAL_CLOSE_CLASS: &str = "close";
pub const MODAL_TEXT_ID: &str = "clipboard-text";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPath {
    ShareSheet,
    ManualModal,
    SystemClipboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyFailure {
    // The user closed the share sheet without picking a target.
    Dismissed,
    Failed(String),
}

pub fn choose_copy_path(platform: Platform, caps: &Capabilities) -> CopyPath {
    match platform {
        Platform::IPad => CopyPath::ManualModal,
        Platform::IPhone if caps.share => CopyPath::ShareSheet,
        Platform::IPhone => CopyPath::ManualModal,
        Platform::Android | Platform::Desktop if caps.clipboard => CopyPath::SystemClipboard,
        Platform::Android | Platform::Desktop => CopyPath::ManualModal,
    }
}

pub fn completion_emoji(module_id: Option<&str>, emojis: &BTreeMap<String, String>, ua: &UserAgent) -> String {
    let Some(id) = module_id else {
        return String::new();
    };
    let Some(emoji) = emojis.get(id) else {
        return String::new();
    };
    if id == FLY_MODULE_ID {
        let old_ios = (ua.is_iphone() || ua.is_ipad()) && ua.ios_version().is_none_or(|v| v.0 < 14);
        let old_android = !ua.is_iphone() && !ua.is_ipad() && ua.is_android() && ua.android_major().is_some_and(|m| m < 11);
        if old_ios || old_android {
            return DRAGON_EMOJI.to_string();
        }
    }
    emoji.clone()
}

pub fn completion_banner(brand: &str, emoji: &str, text: &str, date: &str) -> String {
    format!("{brand}\n{emoji}\n{text}\n{date}")
}

pub trait CopyBackend {
    fn share(&self, text: &str) -> impl Future<Output = Result<(), CopyFailure>>;
    fn write_clipboard(&self, text: &str) -> impl Future<Output = Result<(), CopyFailure>>;
    fn show_manual_copy(&self, text: &str);
}

pub async fn copy_text<B: CopyBackend, S: Surface>(backend: &B, surface: &S, path: CopyPath, text: &str) {
    match path {
        CopyPath::ManualModal => backend.show_manual_copy(text),
        CopyPath::ShareSheet => match backend.share(text).await {
            Ok(()) => surface.alert(COPIED_MESSAGE),
            Err(CopyFailure::Dismissed) => tracing::debug!("share sheet dismissed"),
            Err(CopyFailure::Failed(err)) => surface.alert(&err),
        },
        CopyPath::SystemClipboard => match backend.write_clipboard(text).await {
            Ok(()) => surface.alert(COPIED_MESSAGE),
            Err(CopyFailure::Dismissed) => surface.alert("clipboard write failed"),
            Err(CopyFailure::Failed(err)) => {
                tracing::warn!(%err, "clipboard write failed");
                surface.alert(&format!("clipboard write failed {err}"));
            }
        },
    }
}

thread_local! {
    static MODAL_CLOSE: RefCell<Option<EventListener>> = const { RefCell::new(None) };
}

pub struct BrowserCopyBackend {
    surface: DomSurface,
}

impl BrowserCopyBackend {
    pub fn new(surface: DomSurface) -> Self {
        Self { surface }
    }
}

impl CopyBackend for BrowserCopyBackend {
    async fn share(&self, text: &str) -> Result<(), CopyFailure> {
        let nav = navigator().ok_or_else(|| CopyFailure::Failed("no navigator".into()))?;
        let data = Object::new();
        Reflect::set(&data, &JsValue::from_str("text"), &JsValue::from_str(text))
            .map_err(|e| CopyFailure::Failed(js_error_text(&e)))?;
        let promise = call_method(&nav, "share", &data)?;
        JsFuture::from(promise).await.map(|_| ()).map_err(|err| {
            if is_abort(&err) {
                CopyFailure::Dismissed
            } else {
                CopyFailure::Failed(js_error_text(&err))
            }
        })
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), CopyFailure> {
        let nav = navigator().ok_or_else(|| CopyFailure::Failed("no navigator".into()))?;
        let clipboard = Reflect::get(&nav, &JsValue::from_str("clipboard"))
            .ok()
            .filter(|c| c.is_object())
            .ok_or_else(|| CopyFailure::Failed("clipboard unavailable".into()))?;
        let promise = call_method(&clipboard, "writeText", &JsValue::from_str(text))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| CopyFailure::Failed(js_error_text(&err)))
    }

    fn show_manual_copy(&self, text: &str) {
        self.surface.render(MODAL_TEXT_ID, View::Text(text.to_string()));
        if !self.surface.set_display(MODAL_ID, Display::Block) {
            return;
        }
        let close = self
            .surface
            .document()
            .get_elements_by_class_name(MODAL_CLOSE_CLASS)
            .item(0);
        if let Some(close) = close {
            let surface = self.surface.clone();
            let listener = EventListener::new(&close, "click", move |_| {
                surface.set_display(MODAL_ID, Display::None);
            });
            // replacing the previous listener drops it
            MODAL_CLOSE.with(|slot| *slot.borrow_mut() = Some(listener));
        }
    }
}

fn navigator() -> Option<web_sys::Navigator> {
    web_sys::window().map(|w| w.navigator())
}

fn call_method(target: &JsValue, name: &str, arg: &JsValue) -> Result<Promise, CopyFailure> {
    let func = Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| CopyFailure::Failed(format!("{name} unavailable")))?;
    func.call1(target, arg)
        .map_err(|e| CopyFailure::Failed(js_error_text(&e)))?
        .dyn_into::<Promise>()
        .map_err(|_| CopyFailure::Failed(format!("{name} did not return a promise")))
}

// `AbortError` (legacy DOMException code 20) is what closing the share sheet raises.
fn is_abort(err: &JsValue) -> bool {
    let name = Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string());
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|v| v.as_f64());
    name.as_deref() == Some("AbortError") || code == Some(20.0)
}

pub fn copy_to_system_clipboard(text: String, is_module_completion: bool) {
    let Ok(surface) = DomSurface::current() else {
        return;
    };
    let config = crate::config::PortalConfig::load();
    let ua = UserAgent::detect().unwrap_or_default();
    let caps = Capabilities::detect();
    let text = if is_module_completion {
        let module_id = crate::session::NavigationContext::browser()
            .ok()
            .and_then(|nav| nav.module_id());
        let emoji = completion_emoji(module_id.as_deref(), &config.module_emojis, &ua);
        let date: String = js_sys::Date::new_0().to_date_string().into();
        completion_banner(&config.brand, &emoji, &text, &date)
    } else {
        text
    };
    let path = choose_copy_path(ua.platform_kind(), &caps);
    tracing::info!(?path, "copying results");
    wasm_bindgen_futures::spawn_local(async move {
        let backend = BrowserCopyBackend::new(surface.clone());
        copy_text(&backend, &surface, path, &text).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CopyCall, RecordingCopyBackend, RecordingSurface};
    use futures::executor::block_on;

    const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    fn emojis() -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        m.insert(FLY_MODULE_ID.to_string(), "\u{1FAB0}".to_string());
        m.insert("1-1-1".to_string(), "\u{1F680}".to_string());
        m
    }

    #[test]
    fn desktop_copy_uses_system_clipboard_only() {
        let ua = UserAgent::from_ua(DESKTOP_UA);
        let caps = Capabilities {
            share: true,
            clipboard: true,
        };
        let path = choose_copy_path(ua.platform_kind(), &caps);
        assert_eq!(path, CopyPath::SystemClipboard);

        let backend = RecordingCopyBackend::default();
        let surface = RecordingSurface::default();
        block_on(copy_text(&backend, &surface, path, "score 9/10"));
        assert_eq!(
            *backend.calls.borrow(),
            vec![CopyCall::Clipboard("score 9/10".into())]
        );
        assert_eq!(*surface.alerts.borrow(), vec![COPIED_MESSAGE.to_string()]);
    }

    #[test]
    fn path_per_device() {
        let all = Capabilities {
            share: true,
            clipboard: true,
        };
        let none = Capabilities::default();
        assert_eq!(choose_copy_path(Platform::IPad, &all), CopyPath::ManualModal);
        assert_eq!(choose_copy_path(Platform::IPhone, &all), CopyPath::ShareSheet);
        assert_eq!(choose_copy_path(Platform::IPhone, &none), CopyPath::ManualModal);
        assert_eq!(choose_copy_path(Platform::Android, &all), CopyPath::SystemClipboard);
        assert_eq!(choose_copy_path(Platform::Desktop, &all), CopyPath::SystemClipboard);
    }

    #[test]
    fn missing_clipboard_api_falls_back_to_modal() {
        let share_only = Capabilities {
            share: true,
            clipboard: false,
        };
        assert_eq!(choose_copy_path(Platform::Android, &share_only), CopyPath::ManualModal);
        assert_eq!(choose_copy_path(Platform::Desktop, &share_only), CopyPath::ManualModal);
    }

    #[test]
    fn dismissed_share_is_silent_but_errors_alert() {
        let backend = RecordingCopyBackend::default();
        backend
            .outcomes
            .borrow_mut()
            .extend([Err(CopyFailure::Dismissed), Err(CopyFailure::Failed("NotAllowedError".into()))]);
        let surface = RecordingSurface::default();
        block_on(copy_text(&backend, &surface, CopyPath::ShareSheet, "a"));
        assert!(surface.alerts.borrow().is_empty());
        block_on(copy_text(&backend, &surface, CopyPath::ShareSheet, "a"));
        assert_eq!(*surface.alerts.borrow(), vec!["NotAllowedError".to_string()]);
    }

    #[test]
    fn clipboard_failure_is_reported() {
        let backend = RecordingCopyBackend::default();
        backend
            .outcomes
            .borrow_mut()
            .push_back(Err(CopyFailure::Failed("denied".into())));
        let surface = RecordingSurface::default();
        block_on(copy_text(&backend, &surface, CopyPath::SystemClipboard, "a"));
        assert_eq!(*surface.alerts.borrow(), vec!["clipboard write failed denied".to_string()]);
    }

    #[test]
    fn modal_path_shows_text_without_alert() {
        let backend = RecordingCopyBackend::default();
        let surface = RecordingSurface::default();
        block_on(copy_text(&backend, &surface, CopyPath::ManualModal, "x"));
        assert_eq!(backend.paths(), vec![CopyPath::ManualModal]);
        assert!(surface.alerts.borrow().is_empty());
    }

    #[test]
    fn fly_emoji_falls_back_on_old_systems() {
        let table = emojis();
        let old_iphone = UserAgent {
            platform: "iPhone".into(),
            app_version: "5.0 (iPhone; CPU iPhone OS 13_5 like Mac OS X)".into(),
            ..UserAgent::from_ua("Mozilla/5.0 (iPhone; CPU iPhone OS 13_5 like Mac OS X)")
        };
        let new_iphone = UserAgent {
            platform: "iPhone".into(),
            app_version: "5.0 (iPhone; CPU iPhone OS 14_1 like Mac OS X)".into(),
            ..UserAgent::from_ua("Mozilla/5.0 (iPhone; CPU iPhone OS 14_1 like Mac OS X)")
        };
        let old_android = UserAgent::from_ua("Mozilla/5.0 (Linux; Android 10; Pixel 3)");
        let new_android = UserAgent::from_ua("Mozilla/5.0 (Linux; Android 12; Pixel 6)");
        let desktop = UserAgent::from_ua(DESKTOP_UA);

        assert_eq!(completion_emoji(Some(FLY_MODULE_ID), &table, &old_iphone), DRAGON_EMOJI);
        assert_eq!(completion_emoji(Some(FLY_MODULE_ID), &table, &new_iphone), "\u{1FAB0}");
        assert_eq!(completion_emoji(Some(FLY_MODULE_ID), &table, &old_android), DRAGON_EMOJI);
        assert_eq!(completion_emoji(Some(FLY_MODULE_ID), &table, &new_android), "\u{1FAB0}");
        assert_eq!(completion_emoji(Some(FLY_MODULE_ID), &table, &desktop), "\u{1FAB0}");
        // only the fly module is substituted
        assert_eq!(completion_emoji(Some("1-1-1"), &table, &old_iphone), "\u{1F680}");
        assert_eq!(completion_emoji(Some("9-9-9"), &table, &desktop), "");
        assert_eq!(completion_emoji(None, &table, &desktop), "");
    }

    #[test]
    fn banner_layout() {
        assert_eq!(
            completion_banner("Emerald Wave", "\u{1F680}", "5/5", "Sun Oct 18 2026"),
            "Emerald Wave\n\u{1F680}\n5/5\nSun Oct 18 2026"
        );
    }
}
