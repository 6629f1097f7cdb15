// Page configuration, read from the `portal-config` JSON script block.
// Missing fields take their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PortalResult;

pub const CONFIG_ELEMENT_ID: &str = "portal-config";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    #[default]
    ModulePlayer,
    Curricula,
    Units,
    Modules,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub page: PageKind,
    pub brand: String,
    pub student_log_in_url: String,
    pub units_page: String,
    pub modules_page: String,
    pub module_page: String,
    pub module_init_path: String,
    pub module_name: String,
    pub ndlink_file_name: String,
    pub canvas_id: String,
    pub right_sidebar_id: String,
    pub video_id: String,
    pub list_container_id: String,
    pub tutorial_video_width: f64,
    pub tutorial_video_height: f64,
    pub module_emojis: BTreeMap<String, String>,
    // Breadcrumb trail as (label, href) pairs.
    pub breadcrumb: Vec<(String, String)>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        let mut module_emojis = BTreeMap::new();
        module_emojis.insert(crate::clipboard::FLY_MODULE_ID.to_string(), "\u{1FAB0}".to_string());
        Self {
            page: PageKind::ModulePlayer,
            brand: "Emerald Wave".to_string(),
            student_log_in_url: "login.html".to_string(),
            units_page: "units.html".to_string(),
            modules_page: "modules.html".to_string(),
            module_page: "module.html".to_string(),
            module_init_path: "./module_init.lua.json".to_string(),
            module_name: "EWFramework".to_string(),
            ndlink_file_name: "ndlink".to_string(),
            canvas_id: "myCanvas".to_string(),
            right_sidebar_id: "right_sidebar".to_string(),
            video_id: "video_tutorial".to_string(),
            list_container_id: "list-content".to_string(),
            tutorial_video_width: 320.0,
            tutorial_video_height: 240.0,
            module_emojis,
            breadcrumb: Vec::new(),
        }
    }
}

impl PortalConfig {
    pub fn from_json(raw: &str) -> PortalResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        match raw {
            Some(raw) if !raw.trim().is_empty() => match Self::from_json(&raw) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!(%err, "invalid portal config, using defaults");
                    Self::default()
                }
            },
            _ => {
                tracing::debug!("no portal config block, using defaults");
                Self::default()
            }
        }
    }
}
