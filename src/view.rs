// Render-ready records for everything the portal writes into a page

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    Units { curriculum_id: String },
    Modules { unit_id: String },
    Module { module_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub id: String,
    pub label: String,
    pub target: LinkTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub href: String,
    pub file_name: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleEntry {
    pub learn: NavLink,
    pub downloads: Vec<Download>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitCheckbox {
    pub unit_id: String,
    pub name: String,
    pub checked: bool,
}

impl UnitCheckbox {
    pub fn input_id(&self) -> String {
        format!("units_{}", self.unit_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Crumb {
    pub name: String,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Options(Vec<SelectOption>),
    Links(Vec<NavLink>),
    Modules(Vec<ModuleEntry>),
    UnitCheckboxes(Vec<UnitCheckbox>),
    Crumbs(Vec<Crumb>),
    Notice { text: String, is_error: bool },
    Text(String),
}

impl View {
    // Options, links, entries or boxes rendered; a notice or text counts as one.
    pub fn item_count(&self) -> usize {
        match self {
            View::Options(v) => v.len(),
            View::Links(v) => v.len(),
            View::Modules(v) => v.len(),
            View::UnitCheckboxes(v) => v.len(),
            View::Crumbs(v) => v.len(),
            View::Notice { .. } | View::Text(_) => 1,
        }
    }
}
