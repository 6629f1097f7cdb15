// <select> population from data-layer queries

use std::cell::RefCell;
use std::collections::HashMap;

use crate::data::{DataSource, Document, Query, Restriction};
use crate::error::{PortalError, PortalResult};
use crate::messages;
use crate::surface::Surface;
use crate::view::{SelectOption, View};

pub const CHOOSE: (&str, &str) = ("choose", "Choose...");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionLabel {
    Name,
    DisplayName,
    EmailAddress,
}

impl OptionLabel {
    pub fn field(self) -> &'static str {
        match self {
            OptionLabel::Name => "name",
            OptionLabel::DisplayName => "displayName",
            OptionLabel::EmailAddress => "email_address",
        }
    }

    pub fn option(self, doc: &Document) -> SelectOption {
        SelectOption::new(doc.id.clone(), doc.text(self.field()))
    }
}

pub fn choose_prefix() -> Vec<(String, String)> {
    vec![(CHOOSE.0.to_string(), CHOOSE.1.to_string())]
}

pub fn dropdown_options(extra: &[(String, String)], records: &[Document], label: OptionLabel) -> Vec<SelectOption> {
    extra
        .iter()
        .map(|(value, text)| SelectOption::new(value.clone(), text.clone()))
        .chain(records.iter().map(|doc| label.option(doc)))
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropdownRequest {
    pub target: String,
    pub extra: Vec<(String, String)>,
    pub label: OptionLabel,
    pub query: Query,
}

impl DropdownRequest {
    pub fn new(target: &str, extra: Vec<(String, String)>, label: OptionLabel, query: Query) -> Self {
        Self {
            target: target.to_string(),
            extra,
            label,
            query,
        }
    }

    pub fn files(target: &str, unit_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::Files {
            unit_id: unit_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::DisplayName, query)
    }

    pub fn worksheets(target: &str, unit_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::Worksheets {
            unit_id: unit_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::DisplayName, query)
    }

    pub fn teachers(target: &str, extra: Vec<(String, String)>) -> Self {
        Self::new(target, extra, OptionLabel::EmailAddress, Query::Teachers)
    }

    pub fn sections(target: &str, curriculum_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::Sections {
            curriculum_id: curriculum_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::Name, query)
    }

    pub fn modules_for_class(target: &str, class_id: &str, extra: Vec<(String, String)>) -> Self {
        let query = Query::ModulesForClass {
            class_id: class_id.to_string(),
        };
        Self::new(target, extra, OptionLabel::DisplayName, query)
    }

    pub fn modules_for_class_no_student(target: &str, class_id: &str, extra: Vec<(String, String)>) -> Self {
        let query = Query::ModulesForClassNoStudent {
            class_id: class_id.to_string(),
        };
        Self::new(target, extra, OptionLabel::DisplayName, query)
    }

    pub fn reset_student_modules(target: &str, class_id: &str) -> Self {
        let query = Query::ResetStudentProgress {
            class_id: class_id.to_string(),
        };
        Self::new(target, Vec::new(), OptionLabel::DisplayName, query)
    }

    pub fn students_in_class(target: &str, class_id: &str) -> Self {
        let query = Query::StudentsInClass {
            class_id: class_id.to_string(),
        };
        Self::new(target, Vec::new(), OptionLabel::Name, query)
    }

    pub fn curricula(target: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        Self::new(target, extra, OptionLabel::Name, Query::Curricula { restriction })
    }

    pub fn units(target: &str, curriculum_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::Units {
            curriculum_id: curriculum_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::Name, query)
    }

    pub fn units_by_section(target: &str, section_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::UnitsFromSection {
            section_id: section_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::Name, query)
    }

    pub fn all_units(target: &str, curriculum_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::AllUnits {
            curriculum_id: curriculum_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::Name, query)
    }

    pub fn modules(target: &str, unit_id: &str, restriction: Restriction, extra: Vec<(String, String)>) -> Self {
        let query = Query::Modules {
            unit_id: unit_id.to_string(),
            restriction,
        };
        Self::new(target, extra, OptionLabel::DisplayName, query)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Refreshes {
    started: u64,
    rendered: u64,
}

thread_local! {
    static REFRESHES: RefCell<HashMap<String, Refreshes>> = RefCell::new(HashMap::new());
}

pub fn begin_refresh(target: &str) -> u64 {
    REFRESHES.with(|r| {
        let mut r = r.borrow_mut();
        let slot = r.entry(target.to_string()).or_default();
        slot.started += 1;
        slot.started
    })
}

// A result may render unless a newer generation already has; failures never claim.
fn claim_render(target: &str, generation: u64) -> bool {
    REFRESHES.with(|r| {
        let mut r = r.borrow_mut();
        let slot = r.entry(target.to_string()).or_default();
        if slot.rendered > generation {
            return false;
        }
        slot.rendered = generation;
        true
    })
}

// A failed fetch leaves the target as it was. A result arriving after a newer
// refresh of the same target has rendered returns `PortalError::Superseded`.
pub async fn update_dropdown<D: DataSource, P: Surface>(data: &D, page: &P, req: &DropdownRequest) -> PortalResult<usize> {
    let generation = begin_refresh(&req.target);
    let records = data.query(&req.query).await.inspect_err(|err| {
        tracing::warn!(target_id = %req.target, %err, "dropdown fetch failed");
    })?;
    if !claim_render(&req.target, generation) {
        tracing::debug!(target_id = %req.target, generation, "dropping superseded dropdown refresh");
        return Err(PortalError::Superseded);
    }
    let options = dropdown_options(&req.extra, &records, req.label);
    let count = options.len();
    page.render(&req.target, View::Options(options));
    messages::hide_loader(page, None);
    Ok(count)
}
