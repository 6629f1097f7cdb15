// Page-facing bindings: hand-written pages call these by their camelCase names

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::cascade::{self, CancelToken, Cascade, SectionOp};
use crate::config::PortalConfig;
use crate::data::{JsDataSource, Restriction};
use crate::device::{self, UserAgent};
use crate::dom;
use crate::dropdown::{self, DropdownRequest};
use crate::error::PortalError;
use crate::lists;
use crate::messages;
use crate::session::NavigationContext;
use crate::surface::DomSurface;
use crate::util;
use crate::viewport;

fn restriction(value: JsValue) -> Restriction {
    if value.is_undefined() || value.is_null() {
        return Restriction::none();
    }
    Restriction(Some(value))
}

// `[[value, label], ...]` from the page.
fn extra_options(value: JsValue) -> Vec<(String, String)> {
    if !Array::is_array(&value) {
        return Vec::new();
    }
    Array::from(&value)
        .iter()
        .filter(|pair| Array::is_array(pair))
        .map(|pair| {
            let pair = Array::from(&pair);
            let text = |v: JsValue| v.as_string().or_else(|| v.as_f64().map(|n| n.to_string()));
            (text(pair.get(0)).unwrap_or_default(), text(pair.get(1)).unwrap_or_default())
        })
        .collect()
}

fn attr_pairs(value: &JsValue) -> Vec<(String, String)> {
    if !value.is_object() {
        return Vec::new();
    }
    Object::entries(value.unchecked_ref())
        .iter()
        .filter_map(|entry| {
            let entry = Array::from(&entry);
            let key = entry.get(0).as_string()?;
            let v = entry.get(1);
            let v = v
                .as_string()
                .or_else(|| v.as_f64().map(|n| n.to_string()))
                .or_else(|| v.as_bool().map(|b| b.to_string()))?;
            Some((key, v))
        })
        .collect()
}

fn page() -> Option<DomSurface> {
    match DomSurface::current() {
        Ok(page) => Some(page),
        Err(err) => {
            tracing::warn!(%err, "no document");
            None
        }
    }
}

fn nav() -> Option<NavigationContext<crate::session::BrowserSession>> {
    match NavigationContext::browser() {
        Ok(nav) => Some(nav),
        Err(err) => {
            tracing::warn!(%err, "session storage unavailable");
            None
        }
    }
}

fn run_dropdown(req: DropdownRequest, done: Option<Function>) {
    let Some(page) = page() else { return };
    spawn_local(async move {
        let data = JsDataSource;
        match dropdown::update_dropdown(&data, &page, &req).await {
            Ok(count) => {
                tracing::debug!(target_id = %req.target, count, "dropdown refreshed");
                if let Some(done) = done {
                    let _ = done.call0(&JsValue::NULL);
                }
            }
            Err(PortalError::Superseded) => {
                tracing::debug!(target_id = %req.target, "dropdown refresh overtaken");
            }
            Err(err) => tracing::warn!(target_id = %req.target, %err, "dropdown refresh failed"),
        }
    });
}

// dropdowns

#[wasm_bindgen(js_name = updateFilesDropdown)]
pub fn update_files_dropdown(document_id: &str, units_id: &str, restriction_map: JsValue, extra: JsValue) {
    run_dropdown(
        DropdownRequest::files(document_id, units_id, restriction(restriction_map), extra_options(extra)),
        None,
    );
}

#[wasm_bindgen(js_name = updateWorksheetsDropdown)]
pub fn update_worksheets_dropdown(document_id: &str, units_id: &str, restriction_map: JsValue, extra: JsValue) {
    run_dropdown(
        DropdownRequest::worksheets(document_id, units_id, restriction(restriction_map), extra_options(extra)),
        None,
    );
}

#[wasm_bindgen(js_name = updateTeacherDropdown)]
pub fn update_teacher_dropdown(document_id: &str, extra: JsValue) {
    run_dropdown(DropdownRequest::teachers(document_id, extra_options(extra)), None);
}

#[wasm_bindgen(js_name = updateSectionsDropdown)]
pub fn update_sections_dropdown(
    document_id: &str,
    curriculum_id: &str,
    restriction_map: JsValue,
    extra: JsValue,
    done: Option<Function>,
) {
    run_dropdown(
        DropdownRequest::sections(document_id, curriculum_id, restriction(restriction_map), extra_options(extra)),
        done,
    );
}

#[wasm_bindgen(js_name = updateModuleDropdownUsingClass)]
pub fn update_module_dropdown_using_class(document_id: &str, class_id: &str, extra: JsValue) {
    run_dropdown(DropdownRequest::modules_for_class(document_id, class_id, extra_options(extra)), None);
}

#[wasm_bindgen(js_name = updateModuleDropdownUsingClassNoStudent)]
pub fn update_module_dropdown_using_class_no_student(document_id: &str, class_id: &str, extra: JsValue) {
    run_dropdown(
        DropdownRequest::modules_for_class_no_student(document_id, class_id, extra_options(extra)),
        None,
    );
}

#[wasm_bindgen(js_name = updateStudentsInClassList)]
pub fn update_students_in_class_list(document_id: &str, class_id: &str) {
    run_dropdown(DropdownRequest::students_in_class(document_id, class_id), None);
}

#[wasm_bindgen(js_name = updateCurriculumDropdown)]
pub fn update_curriculum_dropdown(document_id: &str, restriction_map: JsValue, extra: JsValue, done: Option<Function>) {
    run_dropdown(
        DropdownRequest::curricula(document_id, restriction(restriction_map), extra_options(extra)),
        done,
    );
}

#[wasm_bindgen(js_name = updateUnitsDropdown)]
pub fn update_units_dropdown(document_id: &str, curriculum_id: &str, restriction_map: JsValue, extra: JsValue) {
    run_dropdown(
        DropdownRequest::units(document_id, curriculum_id, restriction(restriction_map), extra_options(extra)),
        None,
    );
}

#[wasm_bindgen(js_name = updateUnitsDropdownUsingSection)]
pub fn update_units_dropdown_using_section(document_id: &str, section_id: &str, restriction_map: JsValue, extra: JsValue) {
    run_dropdown(
        DropdownRequest::units_by_section(document_id, section_id, restriction(restriction_map), extra_options(extra)),
        None,
    );
}

#[wasm_bindgen(js_name = updateUnitsDropdownAll)]
pub fn update_units_dropdown_all(document_id: &str, curriculum_id: &str, restriction_map: JsValue, extra: JsValue) {
    run_dropdown(
        DropdownRequest::all_units(document_id, curriculum_id, restriction(restriction_map), extra_options(extra)),
        None,
    );
}

#[wasm_bindgen(js_name = updateModuleDropdown)]
pub fn update_module_dropdown(document_id: &str, units_id: &str, restriction_map: JsValue, extra: JsValue) {
    run_dropdown(
        DropdownRequest::modules(document_id, units_id, restriction(restriction_map), extra_options(extra)),
        None,
    );
}

// cascades

macro_rules! chain {
    ($name:literal, |$cascade:ident| $body:expr) => {{
        let Some(page) = page() else { return };
        cascade::spawn_chain($name, async move {
            let data = JsDataSource;
            let $cascade = Cascade::new(&data, &page, CancelToken::on_pagehide());
            $body.await
        });
    }};
}

#[wasm_bindgen(js_name = updateUnitsFromClass)]
pub fn update_units_from_class(class_id: String, restriction_map: JsValue) {
    let restriction = restriction(restriction_map);
    chain!("updateUnitsFromClass", |c| c.update_units_from_class(&class_id, restriction));
}

#[wasm_bindgen(js_name = updateModifyUnit)]
pub fn update_modify_unit(id: String) {
    chain!("updateModifyUnit", |c| c.update_modify_unit(&id));
}

#[wasm_bindgen(js_name = updateModifySectionList)]
pub fn update_modify_section_list(id: String) {
    chain!("updateModifySectionList", |c| c.update_modify_section_list(&id));
}

#[wasm_bindgen(js_name = updateModifyCurriculumList)]
pub fn update_modify_curriculum_list(id: String) {
    chain!("updateModifyCurriculumList", |c| c.update_modify_curriculum_list(&id));
}

#[wasm_bindgen(js_name = createUnitsForSections)]
pub fn create_units_for_sections(document_id: String, curriculum_id: String, op: String, section_id: Option<String>) {
    let op = SectionOp::parse(&op);
    chain!("createUnitsForSections", |c| c.create_units_for_sections(
        &document_id,
        &curriculum_id,
        op,
        section_id.as_deref()
    ));
}

#[wasm_bindgen(js_name = updateResetStudentProgress)]
pub fn update_reset_student_progress() {
    chain!("updateResetStudentProgress", |c| c.update_reset_student_progress());
}

// lists

macro_rules! list {
    ($name:literal, |$data:ident, $page:ident| $body:expr) => {{
        let Some($page) = page() else { return };
        spawn_local(async move {
            let $data = JsDataSource;
            match $body.await {
                Ok(count) => tracing::debug!(name = $name, count, "list rendered"),
                Err(err) => tracing::warn!(name = $name, %err, "list failed"),
            }
        });
    }};
}

#[wasm_bindgen(js_name = updateCurriculumList)]
pub fn update_curriculum_list(document_id: String, restriction_map: JsValue) {
    let r = restriction(restriction_map);
    list!("updateCurriculumList", |data, page| lists::update_curriculum_list(
        &data,
        &page,
        &document_id,
        r
    ));
}

#[wasm_bindgen(js_name = updateUnitsList)]
pub fn update_units_list(document_id: String, curriculum_id: String, restriction_map: JsValue) {
    let r = restriction(restriction_map);
    list!("updateUnitsList", |data, page| lists::update_units_list(
        &data,
        &page,
        &document_id,
        &curriculum_id,
        r
    ));
}

#[wasm_bindgen(js_name = updateModuleList)]
pub fn update_module_list(document_id: String, units_id: String, restriction_map: JsValue) {
    let r = restriction(restriction_map);
    list!("updateModuleList", |data, page| lists::update_module_list(
        &data,
        &page,
        &document_id,
        &units_id,
        r
    ));
}

#[wasm_bindgen(js_name = updateModuleListDiv)]
pub fn update_module_list_div(document_id: String, value: String, restriction_map: JsValue) {
    let r = restriction(restriction_map);
    let Some(nav) = nav() else { return };
    list!("updateModuleListDiv", |data, page| lists::update_module_list_div(
        &data,
        &nav,
        &page,
        &document_id,
        &value,
        r
    ));
}

#[wasm_bindgen(js_name = goToModulePage)]
pub fn go_to_module_page(id: &str) {
    if let (Some(page), Some(nav)) = (page(), nav()) {
        lists::go_to_module_page(&nav, &page, &PortalConfig::load().module_page, id);
    }
}

// `path` is `[[name, href], ...]`; `names` optionally overrides names by position.
#[wasm_bindgen(js_name = updateBreadcrumbPath)]
pub fn update_breadcrumb_path(path: JsValue, names: JsValue) {
    let Some(page) = page() else { return };
    let replacement: Vec<String> = if Array::is_array(&names) {
        Array::from(&names)
            .iter()
            .map(|n| n.as_string().unwrap_or_default())
            .collect()
    } else {
        Vec::new()
    };
    lists::update_breadcrumb_path(&page, &extra_options(path), &replacement);
}

// notices and navigation

#[wasm_bindgen(js_name = updateMessage)]
pub fn update_message() {
    if let (Some(page), Some(nav)) = (page(), nav()) {
        messages::update_message(&nav, &page);
    }
}

#[wasm_bindgen(js_name = setMessage)]
pub fn set_message(msg: &str) {
    if let Some(nav) = nav() {
        messages::set_message(&nav, msg);
    }
}

#[wasm_bindgen(js_name = setErrorMessage)]
pub fn set_error_message(msg: &str) {
    if let Some(page) = page() {
        messages::set_error_message(&page, msg);
    }
}

#[wasm_bindgen(js_name = setMessageVisibility)]
pub fn set_message_visibility(msg_id: &str, visible: bool) {
    if let Some(page) = page() {
        messages::set_message_visibility(&page, msg_id, visible);
    }
}

#[wasm_bindgen(js_name = updateError)]
pub fn update_error(error_text: &str) {
    if let Some(page) = page() {
        messages::update_error(&page, error_text);
    }
}

#[wasm_bindgen(js_name = hideLoader)]
pub fn hide_loader(active: Option<String>) {
    if let Some(page) = page() {
        messages::hide_loader(&page, active.as_deref());
    }
}

#[wasm_bindgen(js_name = showLoader)]
pub fn show_loader(active: Option<String>) {
    if let Some(page) = page() {
        messages::show_loader(&page, active.as_deref());
    }
}

#[wasm_bindgen(js_name = goToPage)]
pub fn go_to_page(path: &str) {
    if let Some(page) = page() {
        messages::go_to_page(&page, path);
    }
}

#[wasm_bindgen(js_name = updateSelectedTopicTitle)]
pub fn update_selected_topic_title(topic: &str) {
    if let Some(page) = page() {
        messages::update_selected_topic_title(&page, topic);
    }
}

#[wasm_bindgen(js_name = requestLogIn)]
pub fn request_log_in() {
    if let (Some(page), Some(nav)) = (page(), nav()) {
        messages::request_log_in(&nav, &page, &PortalConfig::load().student_log_in_url);
    }
}

#[wasm_bindgen(js_name = proceedToLogIn)]
pub fn proceed_to_log_in() {
    if let Some(page) = page() {
        messages::proceed_to_log_in(&page, &PortalConfig::load().student_log_in_url);
    }
}

#[wasm_bindgen(js_name = removeStoredCurriculumValues)]
pub fn remove_stored_curriculum_values() {
    if let Some(nav) = nav() {
        nav.remove_stored_curriculum_values();
    }
}

// element factories

#[wasm_bindgen(js_name = createLinkTag)]
pub fn create_link_tag(
    elem: Option<web_sys::Element>,
    on_click: Function,
    link_name: &str,
    params: JsValue,
    link_id: Option<String>,
) -> Result<web_sys::Element, JsValue> {
    let handler = dom::bind_params(&on_click, &params)?;
    Ok(dom::create_link_tag(elem.as_ref(), &handler, link_name, link_id.as_deref())?)
}

#[wasm_bindgen(js_name = createButtonTag)]
pub fn create_button_tag(
    elem: Option<web_sys::Element>,
    on_click: Function,
    button_name: &str,
    params: JsValue,
    button_id: Option<String>,
) -> Result<web_sys::Element, JsValue> {
    let handler = dom::bind_params(&on_click, &params)?;
    Ok(dom::create_button_tag(elem.as_ref(), &handler, button_name, button_id.as_deref())?)
}

#[wasm_bindgen(js_name = createDivTag)]
pub fn create_div_tag(div_id: &str, attrs: JsValue) -> Result<web_sys::Element, JsValue> {
    let pairs = attr_pairs(&attrs);
    Ok(dom::create_div_tag(div_id, &pairs)?)
}

#[wasm_bindgen(js_name = createImgTag)]
pub fn create_img_tag(elem: Option<web_sys::Element>, attrs: JsValue) -> Result<web_sys::Element, JsValue> {
    let pairs = attr_pairs(&attrs);
    Ok(dom::create_img_tag(elem.as_ref(), &pairs)?)
}

const SELECT_MODULE: &str = "selectModule";

// Clicking the image calls the page's `selectModule(...params)`.
#[wasm_bindgen(js_name = createImageLink)]
pub fn create_image_link(
    div_id: &str,
    params: JsValue,
    link_name: &str,
    image_src: &str,
) -> Result<web_sys::Element, JsValue> {
    let select = web_sys::window()
        .and_then(|w| Reflect::get(&w, &JsValue::from_str(SELECT_MODULE)).ok())
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| PortalError::MissingGlobal(SELECT_MODULE.to_string()))?;
    let on_select = dom::bind_params(&select, &params)?;
    Ok(dom::create_image_link(div_id, &on_select, link_name, image_src)?)
}

#[wasm_bindgen(js_name = createScriptTag)]
pub fn create_script_tag(src: &str, callback: Option<Function>) -> Result<web_sys::Element, JsValue> {
    Ok(dom::create_script_tag(src, callback.as_ref())?)
}

#[wasm_bindgen(js_name = setAttributes)]
pub fn set_attributes(el: &web_sys::Element, attrs: JsValue) -> Result<(), JsValue> {
    Ok(dom::set_attributes(el, &attr_pairs(&attrs))?)
}

// viewport and device

#[wasm_bindgen(js_name = drawCanvas)]
pub fn draw_canvas(canvas_name: &str) -> Result<(), JsValue> {
    viewport::draw_canvas(canvas_name)?;
    Ok(())
}

#[wasm_bindgen(js_name = setupCanvas)]
pub fn setup_canvas() -> Result<(), JsValue> {
    let config = PortalConfig::load();
    Ok(viewport::setup_canvas(&viewport::get_canvas(&config.canvas_id)?)?)
}

#[wasm_bindgen(js_name = resizePage)]
pub fn resize_page(canvas_name: &str) -> Result<(), JsValue> {
    Ok(viewport::resize_page(&viewport::get_canvas(canvas_name)?)?)
}

#[wasm_bindgen(js_name = resizeVideo)]
pub fn resize_video() -> Result<(), JsValue> {
    Ok(viewport::resize_video(&PortalConfig::load())?)
}

#[wasm_bindgen(js_name = playPause)]
pub fn play_pause() -> Result<(), JsValue> {
    Ok(viewport::play_pause(&PortalConfig::load().video_id)?)
}

#[wasm_bindgen(js_name = getBaseWidth)]
pub fn get_base_width() -> Result<f64, JsValue> {
    Ok(viewport::base_width()?)
}

#[wasm_bindgen(js_name = getBaseHeight)]
pub fn get_base_height() -> Result<f64, JsValue> {
    Ok(viewport::base_height()?)
}

#[wasm_bindgen(js_name = isAndroid)]
pub fn is_android() -> bool {
    UserAgent::detect().is_some_and(|ua| ua.is_android())
}

#[wasm_bindgen(js_name = isIphone)]
pub fn is_iphone() -> bool {
    UserAgent::detect().is_some_and(|ua| ua.is_iphone())
}

#[wasm_bindgen(js_name = isTouchDevice)]
pub fn is_touch_device() -> bool {
    device::is_touch_device()
}

#[wasm_bindgen(js_name = titleCase)]
pub fn title_case(s: &str) -> String {
    util::title_case(s)
}

// `NaN` when no number can be read, like `parseInt`.
#[wasm_bindgen(js_name = removeAlphaAndConvertToNumber)]
pub fn remove_alpha_and_convert_to_number(s: &str) -> f64 {
    util::remove_alpha_and_convert_to_number(s).map_or(f64::NAN, |n| n as f64)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn extra_options_read_value_label_pairs() {
        let pairs = js_sys::JSON::parse(r#"[["choose","Choose..."],["all","All"],[1,"One"]]"#).unwrap();
        assert_eq!(
            extra_options(pairs),
            vec![
                ("choose".to_string(), "Choose...".to_string()),
                ("all".to_string(), "All".to_string()),
                ("1".to_string(), "One".to_string()),
            ]
        );
        assert!(extra_options(JsValue::NULL).is_empty());
    }

    #[wasm_bindgen_test]
    fn restriction_is_the_page_object_itself() {
        let date = js_sys::Date::new_0();
        let map = Object::new();
        Reflect::set(&map, &JsValue::from_str("since"), &date).unwrap();
        let Restriction(Some(passed)) = restriction(map.clone().into()) else {
            panic!("restriction dropped");
        };
        assert!(Object::is(&passed, &map));
        let since = Reflect::get(&passed, &JsValue::from_str("since")).unwrap();
        assert!(since.is_instance_of::<js_sys::Date>());
        assert_eq!(restriction(JsValue::UNDEFINED), Restriction::none());
        assert_eq!(restriction(JsValue::NULL), Restriction::none());
    }

    #[wasm_bindgen_test]
    fn attribute_maps_become_pairs() {
        let attrs = js_sys::JSON::parse(r#"{"class":"wp-caption","width":300}"#).unwrap();
        assert_eq!(
            attr_pairs(&attrs),
            vec![("class".to_string(), "wp-caption".to_string()), ("width".to_string(), "300".to_string())]
        );
    }
}
