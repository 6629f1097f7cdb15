// In-memory stand-ins for the page, session storage, data layer and browser share APIs

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use futures::channel::oneshot;

use crate::clipboard::{CopyBackend, CopyFailure, CopyPath};
use crate::data::{DataSource, DocQuery, Document, ModuleBundle, Query, Restriction};
use crate::error::{PortalError, PortalResult};
use crate::session::SessionStore;
use crate::surface::{Display, Surface};
use crate::view::View;

#[derive(Clone, Debug, Default)]
pub struct FakeElement {
    pub views: Vec<View>,
    pub value: String,
    pub display: Option<Display>,
    pub hidden: bool,
    pub classes: Vec<String>,
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
    pub elements: Rc<RefCell<BTreeMap<String, FakeElement>>>,
    pub alerts: Rc<RefCell<Vec<String>>>,
    pub navigations: Rc<RefCell<Vec<String>>>,
}

impl RecordingSurface {
    pub fn with_ids(ids: &[&str]) -> Self {
        let s = Self::default();
        for id in ids {
            s.elements
                .borrow_mut()
                .insert(id.to_string(), FakeElement::default());
        }
        s
    }

    pub fn add_classed(&self, id: &str, class: &str) {
        self.elements.borrow_mut().insert(
            id.to_string(),
            FakeElement {
                classes: vec![class.to_string()],
                ..Default::default()
            },
        );
    }

    pub fn get(&self, id: &str) -> FakeElement {
        self.elements.borrow().get(id).cloned().unwrap_or_default()
    }

    pub fn views(&self, id: &str) -> Vec<View> {
        self.get(id).views
    }

    pub fn view(&self, id: &str) -> Option<View> {
        self.get(id).views.last().cloned()
    }

    fn with_element(&self, id: &str, f: impl FnOnce(&mut FakeElement)) -> bool {
        match self.elements.borrow_mut().get_mut(id) {
            Some(e) => {
                f(e);
                true
            }
            None => false,
        }
    }
}

impl Surface for RecordingSurface {
    fn render(&self, id: &str, view: View) -> bool {
        self.with_element(id, |e| e.views = vec![view])
    }

    fn append(&self, id: &str, view: View) -> bool {
        self.with_element(id, |e| e.views.push(view))
    }

    fn render_by_class(&self, class: &str, view: View) -> bool {
        let mut elements = self.elements.borrow_mut();
        match elements
            .values_mut()
            .find(|e| e.classes.iter().any(|c| c == class))
        {
            Some(e) => {
                e.views = vec![view];
                true
            }
            None => false,
        }
    }

    fn clear(&self, id: &str) -> bool {
        self.with_element(id, |e| e.views.clear())
    }

    fn value(&self, id: &str) -> Option<String> {
        self.elements.borrow().get(id).map(|e| e.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        self.with_element(id, |e| e.value = value.to_string())
    }

    fn set_display(&self, id: &str, display: Display) -> bool {
        self.with_element(id, |e| e.display = Some(display))
    }

    fn set_hidden(&self, id: &str, hidden: bool) -> bool {
        self.with_element(id, |e| e.hidden = hidden)
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }
}

#[derive(Clone, Default)]
pub struct MemorySession {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

// Serves canned results and records every query in call order.
#[derive(Clone, Default)]
pub struct StaticDataSource {
    pub lists: Rc<RefCell<Vec<(Query, Vec<Document>)>>>,
    pub docs: Rc<RefCell<Vec<(DocQuery, Document)>>>,
    pub bundle: Rc<RefCell<ModuleBundle>>,
    pub failing: Rc<RefCell<Vec<Query>>>,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl StaticDataSource {
    pub fn list(self, query: Query, docs: Vec<Document>) -> Self {
        self.lists.borrow_mut().push((query, docs));
        self
    }

    pub fn doc(self, query: DocQuery, doc: Document) -> Self {
        self.docs.borrow_mut().push((query, doc));
        self
    }

    pub fn failing(self, query: Query) -> Self {
        self.failing.borrow_mut().push(query);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

fn offline(name: &str) -> PortalError {
    PortalError::Query {
        query: name.to_string(),
        reason: "offline".to_string(),
    }
}

impl DataSource for StaticDataSource {
    async fn query(&self, query: &Query) -> PortalResult<Vec<Document>> {
        let (name, _) = query.call();
        self.log.borrow_mut().push(name.to_string());
        if self.failing.borrow().contains(query) {
            return Err(offline(name));
        }
        Ok(self
            .lists
            .borrow()
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, d)| d.clone())
            .unwrap_or_default())
    }

    async fn document(&self, query: &DocQuery) -> PortalResult<Option<Document>> {
        let (name, _) = query.call();
        self.log.borrow_mut().push(name.to_string());
        Ok(self
            .docs
            .borrow()
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, d)| d.clone()))
    }

    async fn module_bundle(&self, unit_id: Option<&str>, _restriction: &Restriction) -> PortalResult<ModuleBundle> {
        self.log
            .borrow_mut()
            .push(format!("getModulesFilesWorksheets:{}", unit_id.unwrap_or("*")));
        Ok(self.bundle.borrow().clone())
    }
}

pub type QueryReply = PortalResult<Vec<Document>>;

// List queries park until the test releases them; each query takes the next gate in order.
#[derive(Clone, Default)]
pub struct GatedDataSource {
    gates: Rc<RefCell<VecDeque<oneshot::Receiver<QueryReply>>>>,
}

impl GatedDataSource {
    pub fn gate(&self) -> oneshot::Sender<QueryReply> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }
}

impl DataSource for GatedDataSource {
    async fn query(&self, query: &Query) -> PortalResult<Vec<Document>> {
        let (name, _) = query.call();
        let Some(gate) = self.gates.borrow_mut().pop_front() else {
            return Err(offline(name));
        };
        gate.await.unwrap_or_else(|_| Err(offline(name)))
    }

    async fn document(&self, _query: &DocQuery) -> PortalResult<Option<Document>> {
        Ok(None)
    }

    async fn module_bundle(&self, _unit_id: Option<&str>, _restriction: &Restriction) -> PortalResult<ModuleBundle> {
        Ok(ModuleBundle::default())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyCall {
    Share(String),
    Clipboard(String),
    Modal(String),
}

#[derive(Clone, Default)]
pub struct RecordingCopyBackend {
    pub calls: Rc<RefCell<Vec<CopyCall>>>,
    pub outcomes: Rc<RefCell<VecDeque<Result<(), CopyFailure>>>>,
}

impl RecordingCopyBackend {
    pub fn next_outcome(&self) -> Result<(), CopyFailure> {
        self.outcomes.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    pub fn paths(&self) -> Vec<CopyPath> {
        self.calls
            .borrow()
            .iter()
            .map(|c| match c {
                CopyCall::Share(_) => CopyPath::ShareSheet,
                CopyCall::Clipboard(_) => CopyPath::SystemClipboard,
                CopyCall::Modal(_) => CopyPath::ManualModal,
            })
            .collect()
    }
}

impl CopyBackend for RecordingCopyBackend {
    async fn share(&self, text: &str) -> Result<(), CopyFailure> {
        self.calls.borrow_mut().push(CopyCall::Share(text.to_string()));
        self.next_outcome()
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), CopyFailure> {
        self.calls
            .borrow_mut()
            .push(CopyCall::Clipboard(text.to_string()));
        self.next_outcome()
    }

    fn show_manual_copy(&self, text: &str) {
        self.calls.borrow_mut().push(CopyCall::Modal(text.to_string()));
    }
}
