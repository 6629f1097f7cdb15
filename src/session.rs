// Navigation state handed between pages through the tab's session storage.
// A missing or undecodable value reads as None.

use serde::{Deserialize, Serialize};

use crate::error::{PortalError, PortalResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionKey {
    ModulePath,
    ModuleId,
    ModuleType,
    ImgResources,
    GuestMessage,
    Message,
    IsErrorMessage,
    SignOutFromLink,
    Curriculum,
    Units,
    CurriculumName,
    SectionsData,
    SectionIds,
    UnitIds,
    UnitsData,
    ModulesData,
}

impl SessionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::ModulePath => "modulePath",
            SessionKey::ModuleId => "moduleId",
            SessionKey::ModuleType => "moduleType",
            SessionKey::ImgResources => "imgResources",
            SessionKey::GuestMessage => "guestMessage",
            SessionKey::Message => "message",
            SessionKey::IsErrorMessage => "isErrorMessage",
            SessionKey::SignOutFromLink => "signOutFromLink",
            SessionKey::Curriculum => "curriculum",
            SessionKey::Units => "units",
            SessionKey::CurriculumName => "curriculumName",
            SessionKey::SectionsData => "sectionsData",
            SessionKey::SectionIds => "sectionIds",
            SessionKey::UnitIds => "unitIds",
            SessionKey::UnitsData => "unitsData",
            SessionKey::ModulesData => "modulesData",
        }
    }
}

pub const CURRICULUM_KEYS: [SessionKey; 6] = [
    SessionKey::CurriculumName,
    SessionKey::SectionsData,
    SessionKey::SectionIds,
    SessionKey::UnitIds,
    SessionKey::UnitsData,
    SessionKey::ModulesData,
];

pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Clone)]
pub struct BrowserSession {
    storage: web_sys::Storage,
}

impl BrowserSession {
    pub fn open() -> PortalResult<Self> {
        let window = web_sys::window().ok_or(PortalError::NoWindow)?;
        let storage = window
            .session_storage()
            .ok()
            .flatten()
            .ok_or(PortalError::StorageUnavailable)?;
        Ok(Self { storage })
    }
}

impl SessionStore for BrowserSession {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            tracing::warn!(key, "session storage write failed");
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageResource {
    pub name: String,
    #[serde(rename = "fileSrc")]
    pub file_src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleType {
    Regular,
    Exam,
}

impl ModuleType {
    // anything but `regular` is an exam
    pub fn parse(raw: &str) -> Self {
        if raw == "regular" {
            ModuleType::Regular
        } else {
            ModuleType::Exam
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestMessages {
    #[serde(rename = "guestNoAccessMessage")]
    pub guest_no_access_message: Option<GuestNoAccess>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestNoAccess {
    #[serde(default)]
    pub regular: Vec<String>,
    #[serde(default)]
    pub exam: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    pub signed_out_from_link: bool,
}

#[derive(Clone)]
pub struct NavigationContext<S: SessionStore> {
    store: S,
}

impl NavigationContext<BrowserSession> {
    pub fn browser() -> PortalResult<Self> {
        Ok(Self::new(BrowserSession::open()?))
    }
}

impl<S: SessionStore> NavigationContext<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get(&self, key: SessionKey) -> Option<String> {
        self.store.get(key.as_str())
    }

    pub fn set(&self, key: SessionKey, value: &str) {
        self.store.set(key.as_str(), value);
    }

    pub fn remove(&self, key: SessionKey) {
        self.store.remove(key.as_str());
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, key: SessionKey) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::debug!(key = key.as_str(), %err, "ignoring undecodable session value");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: SessionKey, value: &T) -> PortalResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw);
        Ok(())
    }

    pub fn module_path(&self) -> Option<String> {
        self.get(SessionKey::ModulePath)
    }

    pub fn set_module_path(&self, path: &str) {
        self.set(SessionKey::ModulePath, path);
    }

    pub fn module_id(&self) -> Option<String> {
        self.get(SessionKey::ModuleId)
    }

    pub fn set_module_id(&self, id: &str) {
        self.set(SessionKey::ModuleId, id);
    }

    pub fn module_type(&self) -> Option<ModuleType> {
        self.get(SessionKey::ModuleType).map(|raw| ModuleType::parse(&raw))
    }

    pub fn set_image_resources(&self, resources: &[ImageResource]) -> PortalResult<()> {
        self.set_json(SessionKey::ImgResources, &resources)
    }

    pub fn guest_messages(&self) -> Option<GuestMessages> {
        self.get_json(SessionKey::GuestMessage)
    }

    pub fn notice(&self) -> Option<Notice> {
        let text = self.get(SessionKey::Message)?;
        Some(Notice {
            text,
            is_error: self.flag(SessionKey::IsErrorMessage),
            signed_out_from_link: self.flag(SessionKey::SignOutFromLink),
        })
    }

    pub fn set_notice(&self, text: &str) {
        self.set(SessionKey::Message, text);
        self.set(SessionKey::IsErrorMessage, "n");
    }

    // Drops a notice that was only meant to survive one sign-out redirect.
    pub fn clear_sign_out_notice(&self) {
        self.remove(SessionKey::SignOutFromLink);
        self.remove(SessionKey::Message);
    }

    fn flag(&self, key: SessionKey) -> bool {
        self.get(key).as_deref() == Some("y")
    }

    pub fn curriculum(&self) -> Option<String> {
        self.get(SessionKey::Curriculum)
    }

    pub fn set_curriculum(&self, id: &str) {
        self.set(SessionKey::Curriculum, id);
    }

    pub fn units(&self) -> Option<String> {
        self.get(SessionKey::Units)
    }

    pub fn set_units(&self, id: &str) {
        self.set(SessionKey::Units, id);
    }

    pub fn remove_stored_curriculum_values(&self) {
        for key in CURRICULUM_KEYS {
            self.remove(key);
        }
    }
}
