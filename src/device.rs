// Device and browser detection, recomputed on each call

use wasm_bindgen::JsValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    IPhone,
    IPad,
    Android,
    Desktop,
}

// portrait screen.width x screen.height reported by iPadOS Safari
const IPAD_SCREENS: [(u32, u32); 8] = [
    (744, 1133),
    (768, 1024),
    (810, 1080),
    (820, 1180),
    (834, 1112),
    (834, 1194),
    (1024, 1366),
    (1032, 1376),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserAgent {
    pub user_agent: String,
    pub platform: String,
    pub app_version: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub max_touch_points: u32,
}

impl UserAgent {
    pub fn from_ua(ua: &str) -> Self {
        Self {
            user_agent: ua.to_string(),
            ..Default::default()
        }
    }

    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let nav = window.navigator();
        let screen = window.screen().ok();
        let ua = nav.user_agent().unwrap_or_default();
        Some(Self {
            platform: nav.platform().unwrap_or_default(),
            app_version: nav.app_version().unwrap_or_default(),
            screen_width: screen
                .as_ref()
                .and_then(|s| s.width().ok())
                .unwrap_or(0)
                .max(0) as u32,
            screen_height: screen
                .as_ref()
                .and_then(|s| s.height().ok())
                .unwrap_or(0)
                .max(0) as u32,
            max_touch_points: number_prop(&nav, "maxTouchPoints") as u32,
            ..Self::from_ua(&ua)
        })
    }

    pub fn is_android(&self) -> bool {
        self.user_agent.contains("Android")
    }

    pub fn is_iphone(&self) -> bool {
        self.user_agent.contains("iPhone")
    }

    // iPads either say so in the UA, or (iPadOS 13+) pose as a Mac with a touch screen.
    pub fn is_ipad(&self) -> bool {
        if self.user_agent.contains("iPad") {
            return true;
        }
        self.user_agent.contains("Macintosh")
            && (self.max_touch_points > 1 || is_ipad_screen(self.screen_width, self.screen_height))
    }

    pub fn platform_kind(&self) -> Platform {
        if self.is_ipad() {
            Platform::IPad
        } else if self.is_iphone() {
            Platform::IPhone
        } else if self.is_android() {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }

    // `(major, minor, patch)` parsed from `OS x_y[_z]` in `appVersion`, only
    // when `navigator.platform` names an iPhone, iPod or iPad.
    pub fn ios_version(&self) -> Option<(u32, u32, u32)> {
        let p = &self.platform;
        if !(p.contains("iPhone") || p.contains("iPod") || p.contains("iPad")) {
            return None;
        }
        parse_ios_version(&self.app_version)
    }

    pub fn android_version(&self) -> Option<String> {
        android_version(&self.user_agent)
    }

    pub fn android_major(&self) -> Option<u32> {
        self.android_version()?.split('.').next()?.parse().ok()
    }
}

pub fn is_ipad_screen(width: u32, height: u32) -> bool {
    IPAD_SCREENS.contains(&(width, height))
}

fn parse_ios_version(app_version: &str) -> Option<(u32, u32, u32)> {
    let mut rest = app_version;
    while let Some(idx) = rest.find("OS ") {
        let candidate = &rest[idx + 3..];
        if let Some(v) = parse_underscored(candidate) {
            return Some(v);
        }
        rest = candidate;
    }
    None
}

fn parse_underscored(s: &str) -> Option<(u32, u32, u32)> {
    let (major, rest) = take_digits(s)?;
    let (minor, rest) = take_digits(rest.strip_prefix('_')?)?;
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    let patch = take_digits(rest).map(|(p, _)| p).unwrap_or(0);
    Some((major, minor, patch))
}

fn take_digits(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((s[..end].parse().ok()?, &s[end..]))
}

pub fn android_version(ua: &str) -> Option<String> {
    let lower = ua.to_lowercase();
    let idx = lower.find("android")?;
    let after = &lower[idx + "android".len()..];
    let mut chars = after.chars();
    if !chars.next()?.is_whitespace() {
        return None;
    }
    Some(
        chars
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect(),
    )
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub share: bool,
    pub clipboard: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let nav = window.navigator();
        Self {
            share: has_function(&nav, "share"),
            clipboard: js_sys::Reflect::get(&nav, &JsValue::from_str("clipboard"))
                .map(|v| !v.is_undefined() && !v.is_null())
                .unwrap_or(false),
        }
    }
}

// Media query matched by touch-enabled legacy browsers, plus Modernizr's `heartz` check.
pub fn touch_media_query() -> String {
    let prefixes = ["", "-webkit-", "-moz-", "-o-", "-ms-"];
    let mut parts: Vec<String> = prefixes
        .iter()
        .map(|p| format!("({p}touch-enabled)"))
        .collect();
    parts.push("(heartz)".to_string());
    parts.join(",")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchSignals {
    pub ontouchstart: bool,
    pub document_touch: bool,
    pub max_touch_points: u32,
    pub ms_max_touch_points: u32,
    pub media_query: bool,
}

impl TouchSignals {
    pub fn is_touch(&self) -> bool {
        self.ontouchstart
            || self.document_touch
            || self.max_touch_points > 0
            || self.ms_max_touch_points > 0
            || self.media_query
    }
}

pub fn is_touch_device() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let nav = window.navigator();
    let document_touch = js_sys::Reflect::has(&window, &JsValue::from_str("DocumentTouch"))
        .unwrap_or(false)
        && window.document().is_some();
    let signals = TouchSignals {
        ontouchstart: js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart"))
            .unwrap_or(false),
        document_touch,
        max_touch_points: number_prop(&nav, "maxTouchPoints") as u32,
        ms_max_touch_points: number_prop(&nav, "msMaxTouchPoints") as u32,
        media_query: match_media_query(&touch_media_query()),
    };
    signals.is_touch()
}

pub fn match_media_query(query: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false)
}

fn number_prop(target: &JsValue, name: &str) -> f64 {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
        .max(0.0)
}

fn has_function(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .map(|v| v.is_function())
        .unwrap_or(false)
}
