// Bridge to the page's Firestore data layer: one global function per query, each taking a result callback

use std::collections::BTreeMap;
use std::future::Future;

use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::{Map, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::{PortalError, PortalResult};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { id: id.into(), data }
    }

    // String field, also accepting numbers (e.g. `idx`).
    pub fn field(&self, name: &str) -> Option<String> {
        match self.data.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> String {
        self.field(name).unwrap_or_default()
    }

    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.field(name).filter(|s| !s.is_empty())
    }
}

// Filter object from the page, handed to the data layer as the same JS value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Restriction(pub Option<JsValue>);

impl Restriction {
    pub fn none() -> Self {
        Self(None)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    Curricula { restriction: Restriction },
    Sections { curriculum_id: String, restriction: Restriction },
    Units { curriculum_id: String, restriction: Restriction },
    UnitsFromSection { section_id: String, restriction: Restriction },
    AllUnits { curriculum_id: String, restriction: Restriction },
    UnitsForSectionEditor { curriculum_id: String, section_id: Option<String> },
    Modules { unit_id: String, restriction: Restriction },
    Files { unit_id: String, restriction: Restriction },
    Worksheets { unit_id: String, restriction: Restriction },
    Teachers,
    ModulesForClass { class_id: String },
    ModulesForClassNoStudent { class_id: String },
    ResetStudentProgress { class_id: String },
    StudentsInClass { class_id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DocQuery {
    ClassCurriculum { class_id: String },
    Unit { id: String },
    Section { id: String },
    Curriculum { id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallArg {
    Callback,
    Text(Option<String>),
    Restriction(Restriction),
}

impl Query {
    // Global function name and argument order expected by the data layer.
    pub fn call(&self) -> (&'static str, Vec<CallArg>) {
        use CallArg::{Callback, Restriction as R, Text};
        let t = |s: &String| Text(Some(s.clone()));
        match self {
            Query::Curricula { restriction } => ("getCurriculumList", vec![Callback, R(restriction.clone())]),
            Query::Sections { curriculum_id, restriction } => {
                ("getSectionsList", vec![Callback, t(curriculum_id), R(restriction.clone())])
            }
            Query::Units { curriculum_id, restriction } => {
                ("getUnitsList", vec![Callback, t(curriculum_id), R(restriction.clone())])
            }
            Query::UnitsFromSection { section_id, restriction } => {
                ("getUnitsListFromSection", vec![Callback, t(section_id), R(restriction.clone())])
            }
            Query::AllUnits { curriculum_id, restriction } => {
                ("getAllUnits", vec![Callback, t(curriculum_id), R(restriction.clone())])
            }
            Query::UnitsForSectionEditor { curriculum_id, section_id } => (
                "getUnitsListFromCurriculumAndSections",
                vec![Callback, t(curriculum_id), Text(section_id.clone())],
            ),
            Query::Modules { unit_id, restriction } => {
                ("getModulesList", vec![Callback, t(unit_id), R(restriction.clone())])
            }
            // files and worksheets take the unit id before the callback
            Query::Files { unit_id, restriction } => ("getFiles", vec![t(unit_id), Callback, R(restriction.clone())]),
            Query::Worksheets { unit_id, restriction } => {
                ("getWorksheets", vec![t(unit_id), Callback, R(restriction.clone())])
            }
            Query::Teachers => ("getTeacherList", vec![Callback]),
            Query::ModulesForClass { class_id } => ("getModuleDropdownUsingClass", vec![Callback, t(class_id)]),
            Query::ModulesForClassNoStudent { class_id } => {
                ("getModuleDropdownUsingClassNoStudent", vec![Callback, t(class_id)])
            }
            Query::ResetStudentProgress { class_id } => ("getResetStudentProgress", vec![Callback, t(class_id)]),
            Query::StudentsInClass { class_id } => ("getStudentsInClassList", vec![Callback, t(class_id)]),
        }
    }
}

impl DocQuery {
    pub fn call(&self) -> (&'static str, Vec<CallArg>) {
        let (name, id) = match self {
            DocQuery::ClassCurriculum { class_id } => ("getUnitsFromClass", class_id),
            DocQuery::Unit { id } => ("getModifyUnit", id),
            DocQuery::Section { id } => ("getModifySectionList", id),
            DocQuery::Curriculum { id } => ("getModifyCurriculumList", id),
        };
        (name, vec![CallArg::Text(Some(id.clone())), CallArg::Callback])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleBundle {
    pub modules: Vec<Document>,
    pub worksheets: BTreeMap<String, Document>,
    pub files: BTreeMap<String, Document>,
}

pub trait DataSource {
    fn query(&self, query: &Query) -> impl Future<Output = PortalResult<Vec<Document>>>;

    fn document(&self, query: &DocQuery) -> impl Future<Output = PortalResult<Option<Document>>>;

    // `unit_id == None` means every unit.
    fn module_bundle(
        &self,
        unit_id: Option<&str>,
        restriction: &Restriction,
    ) -> impl Future<Output = PortalResult<ModuleBundle>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsDataSource;

impl JsDataSource {
    // resolves with the arguments the callback received
    async fn invoke(&self, name: &'static str, args: Vec<CallArg>) -> PortalResult<Array> {
        let window = web_sys::window().ok_or(PortalError::NoWindow)?;
        let func = Reflect::get(&window, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| PortalError::MissingGlobal(name.to_string()))?;
        let mut js_args = Vec::with_capacity(args.len());
        for arg in &args {
            js_args.push(match arg {
                CallArg::Callback => JsValue::UNDEFINED,
                CallArg::Text(Some(s)) => JsValue::from_str(s),
                CallArg::Text(None) => JsValue::NULL,
                CallArg::Restriction(Restriction(None)) => JsValue::UNDEFINED,
                CallArg::Restriction(Restriction(Some(v))) => v.clone(),
            });
        }
        let callback_at = args.iter().position(|a| matches!(a, CallArg::Callback));

        let promise = Promise::new(&mut |resolve: Function, reject: Function| {
            let call_args = Array::new();
            for (i, v) in js_args.iter().enumerate() {
                if Some(i) == callback_at {
                    let resolve = resolve.clone();
                    let cb = Closure::once_into_js(move |a: JsValue, b: JsValue, c: JsValue| {
                        let _ = resolve.call1(&JsValue::NULL, &Array::of3(&a, &b, &c));
                    });
                    call_args.push(&cb);
                } else {
                    call_args.push(v);
                }
            }
            if let Err(err) = func.apply(&JsValue::NULL, &call_args) {
                let _ = reject.call1(&JsValue::NULL, &err);
            }
        });
        let resolved = JsFuture::from(promise).await.map_err(|err| PortalError::Query {
            query: name.to_string(),
            reason: crate::error::js_error_text(&err),
        })?;
        Ok(resolved.unchecked_into::<Array>())
    }
}

impl DataSource for JsDataSource {
    async fn query(&self, query: &Query) -> PortalResult<Vec<Document>> {
        let (name, args) = query.call();
        tracing::debug!(name, "data layer query");
        let results = self.invoke(name, args).await?;
        snapshot_documents(&results.get(0))
    }

    async fn document(&self, query: &DocQuery) -> PortalResult<Option<Document>> {
        let (name, args) = query.call();
        tracing::debug!(name, "data layer document read");
        let results = self.invoke(name, args).await?;
        let doc = results.get(0);
        if doc.is_undefined() || doc.is_null() || !document_exists(&doc) {
            return Ok(None);
        }
        Ok(Some(to_document(&doc)?))
    }

    async fn module_bundle(&self, unit_id: Option<&str>, restriction: &Restriction) -> PortalResult<ModuleBundle> {
        let args = vec![
            CallArg::Callback,
            CallArg::Text(unit_id.map(str::to_string)),
            CallArg::Restriction(restriction.clone()),
        ];
        let results = self.invoke("getModulesFilesWorksheets", args).await?;
        Ok(ModuleBundle {
            modules: snapshot_documents(&results.get(0))?,
            worksheets: keyed_documents(&results.get(1))?,
            files: keyed_documents(&results.get(2))?,
        })
    }
}

// Accepts a Firestore `QuerySnapshot` (via `.docs`) or a plain array of docs.
fn snapshot_documents(snapshot: &JsValue) -> PortalResult<Vec<Document>> {
    if snapshot.is_undefined() || snapshot.is_null() {
        return Ok(Vec::new());
    }
    let docs = if Array::is_array(snapshot) {
        snapshot.clone()
    } else {
        Reflect::get(snapshot, &JsValue::from_str("docs"))?
    };
    if !Array::is_array(&docs) {
        return Ok(Vec::new());
    }
    docs.unchecked_into::<Array>()
        .iter()
        .map(|doc| to_document(&doc))
        .collect()
}

fn keyed_documents(map: &JsValue) -> PortalResult<BTreeMap<String, Document>> {
    let mut out = BTreeMap::new();
    if !map.is_object() {
        return Ok(out);
    }
    for key in Object::keys(map.unchecked_ref::<Object>()).iter() {
        let Some(k) = key.as_string() else { continue };
        let doc = Reflect::get(map, &key)?;
        out.insert(k, to_document(&doc)?);
    }
    Ok(out)
}

fn document_exists(doc: &JsValue) -> bool {
    match Reflect::get(doc, &JsValue::from_str("exists")) {
        Ok(v) if v.is_function() => v
            .unchecked_into::<Function>()
            .call0(doc)
            .map(|r| r.is_truthy())
            .unwrap_or(false),
        Ok(v) if v.is_undefined() => true,
        Ok(v) => v.is_truthy(),
        Err(_) => false,
    }
}

fn to_document(doc: &JsValue) -> PortalResult<Document> {
    let id = Reflect::get(doc, &JsValue::from_str("id"))?
        .as_string()
        .unwrap_or_default();
    let data_fn = Reflect::get(doc, &JsValue::from_str("data"))?;
    let data = if data_fn.is_function() {
        data_fn.unchecked_into::<Function>().call0(doc)?
    } else {
        data_fn
    };
    let json = js_sys::JSON::stringify(&data)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "null".to_string());
    Ok(Document::new(id, serde_json::from_str(&json)?))
}
