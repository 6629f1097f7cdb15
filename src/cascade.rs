// Admin form chains where one record read drives the next selectors.
// A chain stops before its next read or write once its CancelToken trips.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::EventListener;

use crate::data::{DataSource, DocQuery, Document, Query, Restriction};
use crate::dropdown::{self, DropdownRequest, OptionLabel};
use crate::error::{PortalError, PortalResult};
use crate::messages;
use crate::surface::Surface;
use crate::view::{UnitCheckbox, View};

pub const ADMIN_CONTENT_ID: &str = "admin-content";

#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
    listener: Rc<RefCell<Option<EventListener>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pagehide() -> Self {
        let token = Self::new();
        if let Some(window) = web_sys::window() {
            let flag = token.cancelled.clone();
            let listener = EventListener::once(&window, "pagehide", move |_| flag.set(true));
            *token.listener.borrow_mut() = Some(listener);
        }
        token
    }

    #[cfg(test)]
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    pub fn check(&self) -> PortalResult<()> {
        if self.is_cancelled() {
            return Err(PortalError::Cancelled);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionOp {
    Add,
    Modify,
}

impl SectionOp {
    pub fn parse(raw: &str) -> Self {
        if raw == "modify" { SectionOp::Modify } else { SectionOp::Add }
    }
}

// Units a section may claim: those without a section, plus (when modifying)
// those already in `section_id`, which start checked.
pub fn unit_checkboxes(units: &[Document], op: SectionOp, section_id: Option<&str>) -> Vec<UnitCheckbox> {
    units
        .iter()
        .filter_map(|unit| {
            let current = unit.non_empty("sectionId");
            let in_section = current.is_some() && current.as_deref() == section_id;
            if current.is_some() && !(op == SectionOp::Modify && in_section) {
                return None;
            }
            Some(UnitCheckbox {
                unit_id: unit.id.clone(),
                name: unit.text("name"),
                checked: in_section,
            })
        })
        .collect()
}

pub struct Cascade<'a, D, P> {
    data: &'a D,
    page: &'a P,
    cancel: CancelToken,
}

impl<'a, D: DataSource, P: Surface> Cascade<'a, D, P> {
    pub fn new(data: &'a D, page: &'a P, cancel: CancelToken) -> Self {
        Self { data, page, cancel }
    }

    async fn document(&self, query: DocQuery) -> PortalResult<Option<Document>> {
        self.cancel.check()?;
        let doc = self.data.document(&query).await?;
        self.cancel.check()?;
        Ok(doc)
    }

    async fn records(&self, query: Query) -> PortalResult<Vec<Document>> {
        self.cancel.check()?;
        let records = self.data.query(&query).await?;
        self.cancel.check()?;
        Ok(records)
    }

    async fn dropdown(&self, req: DropdownRequest) -> PortalResult<usize> {
        self.cancel.check()?;
        let count = dropdown::update_dropdown(self.data, self.page, &req).await?;
        Ok(count)
    }

    // Both selectors refresh even when one of them fails.
    pub async fn update_units_from_class(&self, class_id: &str, restriction: Restriction) -> PortalResult<()> {
        let query = DocQuery::ClassCurriculum {
            class_id: class_id.to_string(),
        };
        let Some(class) = self.document(query).await? else {
            self.page.clear("add-module-unit-list");
            self.page.clear("add-module-list");
            return Ok(());
        };
        let curriculum_id = class.text("curriculumId");
        let units = self
            .dropdown(DropdownRequest::units(
                "add-module-unit-list",
                &curriculum_id,
                restriction.clone(),
                dropdown::choose_prefix(),
            ))
            .await;
        let sections = self
            .dropdown(DropdownRequest::sections(
                "add-module-section-list",
                &curriculum_id,
                restriction,
                dropdown::choose_prefix(),
            ))
            .await;
        units.and(sections).map(|_| ())
    }

    pub async fn update_modify_unit(&self, id: &str) -> PortalResult<()> {
        let Some(unit) = self.document(DocQuery::Unit { id: id.to_string() }).await? else {
            for field in ["modify-unit-name", "modify-unit-idx"] {
                self.page.set_value(field, "");
            }
            self.page.clear("modify-unit-curriculum");
            self.page.clear("modify-unit-section");
            return Ok(());
        };
        self.page.set_value("modify-unit-name", &unit.text("name"));

        let curriculum_id = unit.text("curriculumId");
        let curricula = self.records(Query::Curricula { restriction: Restriction::none() }).await?;
        self.page.render(
            "modify-unit-curriculum",
            View::Options(dropdown::dropdown_options(&[], &curricula, OptionLabel::Name)),
        );
        self.page.set_value("modify-unit-curriculum", &curriculum_id);

        let sections = self
            .records(Query::Sections {
                curriculum_id,
                restriction: Restriction::none(),
            })
            .await?;
        self.page.render(
            "modify-unit-section",
            View::Options(dropdown::dropdown_options(&dropdown::choose_prefix(), &sections, OptionLabel::Name)),
        );
        if let Some(section_id) = unit.non_empty("sectionId") {
            self.page.set_value("modify-unit-section", &section_id);
        }
        Ok(())
    }

    pub async fn update_modify_section_list(&self, id: &str) -> PortalResult<()> {
        let Some(section) = self.document(DocQuery::Section { id: id.to_string() }).await? else {
            tracing::debug!(id, "section not found");
            self.page.set_value("modify-section-name", "");
            self.page.clear("modify-section-curriculum");
            self.page.clear("modify-section-unitlist");
            return Ok(());
        };
        self.page.set_value("modify-section-name", &section.text("name"));

        let curriculum_id = section.text("curriculumId");
        let curricula = self.records(Query::Curricula { restriction: Restriction::none() }).await?;
        self.page.render(
            "modify-section-curriculum",
            View::Options(dropdown::dropdown_options(&[], &curricula, OptionLabel::Name)),
        );
        self.page.set_value("modify-section-curriculum", &curriculum_id);

        self.page.clear("modify-section-unitlist");
        self.create_units_for_sections("modify-section-unitlist", &curriculum_id, SectionOp::Modify, Some(id))
            .await
    }

    pub async fn update_modify_curriculum_list(&self, id: &str) -> PortalResult<()> {
        let doc = self.document(DocQuery::Curriculum { id: id.to_string() }).await?;
        let (name, idx) = doc
            .map(|d| (d.text("name"), d.text("idx")))
            .unwrap_or_default();
        self.page.set_value("modify-curriculum-name", &name);
        self.page.set_value("modify-curriculum-idx", &idx);
        Ok(())
    }

    pub async fn create_units_for_sections(
        &self,
        target: &str,
        curriculum_id: &str,
        op: SectionOp,
        section_id: Option<&str>,
    ) -> PortalResult<()> {
        let units = self
            .records(Query::UnitsForSectionEditor {
                curriculum_id: curriculum_id.to_string(),
                section_id: section_id.map(str::to_string),
            })
            .await?;
        self.page.append(target, View::UnitCheckboxes(unit_checkboxes(&units, op, section_id)));
        messages::hide_loader(self.page, None);
        self.page.set_hidden(ADMIN_CONTENT_ID, false);
        Ok(())
    }

    pub async fn update_reset_student_progress(&self) -> PortalResult<()> {
        let class_id = self.page.value("reset-student-class-list").unwrap_or_default();
        let students = self
            .dropdown(DropdownRequest::students_in_class("reset-student-student-list", &class_id))
            .await;
        self.page.clear("reset-student-module-list");
        let modules = self
            .dropdown(DropdownRequest::reset_student_modules("reset-student-module-list", &class_id))
            .await;
        students.and(modules).map(|_| ())
    }
}

pub fn spawn_chain<F>(name: &'static str, chain: F)
where
    F: std::future::Future<Output = PortalResult<()>> + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        match chain.await {
            Ok(()) => tracing::debug!(name, "chain finished"),
            Err(PortalError::Cancelled) => tracing::debug!(name, "chain cancelled"),
            Err(PortalError::Superseded) => tracing::debug!(name, "chain overtaken by a newer refresh"),
            Err(err) => tracing::warn!(name, %err, "chain failed"),
        }
    });
}
