// Element factories for hand-written pages, and the web-sys builder behind DomSurface

use gloo_events::EventListener;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::error::{PortalError, PortalResult};
use crate::lists;
use crate::view::{LinkTarget, NavLink, View};

pub const BREADCRUMB_SEPARATOR: &str = " > ";

// Page handlers receive at most five positional parameters.
const HANDLER_ARITY: u32 = 5;

pub fn document() -> PortalResult<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(PortalError::NoWindow)
}

fn element(document: &Document, tag: &str, attrs: &[(&str, &str)], text: Option<&str>) -> PortalResult<Element> {
    let el = document.create_element(tag)?;
    for (k, v) in attrs {
        el.set_attribute(k, v)?;
    }
    if let Some(text) = text {
        el.append_child(&document.create_text_node(text))?;
    }
    Ok(el)
}

fn set_onclick(el: &Element, handler: &Function) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        el.set_onclick(Some(handler));
    }
}

// `func` with the first five entries of `params` bound as its arguments.
pub fn bind_params(func: &Function, params: &JsValue) -> PortalResult<Function> {
    let params = if Array::is_array(params) { Array::from(params) } else { Array::new() };
    let args = Array::of1(&JsValue::NULL);
    for i in 0..HANDLER_ARITY {
        args.push(&params.get(i));
    }
    let bind: Function = Reflect::get(func, &JsValue::from_str("bind"))?
        .dyn_into()
        .map_err(|_| PortalError::Js("handler is not a function".to_string()))?;
    Ok(bind.apply(func, &args)?.unchecked_into())
}

pub fn set_attributes(el: &Element, attrs: &[(String, String)]) -> PortalResult<()> {
    for (k, v) in attrs {
        el.set_attribute(k, v)?;
    }
    Ok(())
}

fn append_to(parent: Option<&Element>, el: &Element) -> PortalResult<()> {
    if let Some(parent) = parent {
        parent.append_child(el)?;
    }
    Ok(())
}

pub fn create_link_tag(
    parent: Option<&Element>,
    on_click: &Function,
    link_name: &str,
    link_id: Option<&str>,
) -> PortalResult<Element> {
    let document = document()?;
    let a = match link_id.filter(|id| !id.is_empty()) {
        Some(id) => element(&document, "a", &[("href", "#"), ("id", id)], Some(link_name))?,
        None => element(&document, "a", &[("href", "#")], Some(link_name))?,
    };
    set_onclick(&a, on_click);
    append_to(parent, &a)?;
    Ok(a)
}

pub fn create_button_tag(
    parent: Option<&Element>,
    on_click: &Function,
    button_name: &str,
    button_id: Option<&str>,
) -> PortalResult<Element> {
    let document = document()?;
    let button = match button_id.filter(|id| !id.is_empty()) {
        Some(id) => element(&document, "button", &[("id", id)], Some(button_name))?,
        None => element(&document, "button", &[], Some(button_name))?,
    };
    set_onclick(&button, on_click);
    append_to(parent, &button)?;
    Ok(button)
}

pub fn create_div_tag(div_id: &str, attrs: &[(String, String)]) -> PortalResult<Element> {
    let div = element(&document()?, "div", &[("id", div_id)], None)?;
    set_attributes(&div, attrs)?;
    Ok(div)
}

pub fn create_img_tag(parent: Option<&Element>, attrs: &[(String, String)]) -> PortalResult<Element> {
    let img = element(&document()?, "img", &[], None)?;
    set_attributes(&img, attrs)?;
    append_to(parent, &img)?;
    Ok(img)
}

pub fn create_image_link(div_id: &str, on_select: &Function, link_name: &str, image_src: &str) -> PortalResult<Element> {
    let document = document()?;
    let div = element(
        &document,
        "div",
        &[("id", div_id), ("class", "wp-caption alignnone image_link_div")],
        None,
    )?;
    let link_id = format!("{div_id}-link");
    let a = create_link_tag(Some(&div), on_select, "", Some(link_id.as_str()))?;
    let img_class = format!("wp-image-{div_id} size-medium");
    let img = element(
        &document,
        "img",
        &[
            ("aria-describedby", "caption-attachment"),
            ("src", image_src),
            ("alt", link_name),
            ("class", img_class.as_str()),
            ("width", "auto"),
            ("height", "auto"),
            ("sizes", "(max-width: 300px) 100vw, 300px"),
        ],
        None,
    )?;
    a.append_child(&img)?;
    let caption = element(
        &document,
        "p",
        &[("id", "caption-attachment"), ("class", "wp-caption-text")],
        Some(link_name),
    )?;
    div.append_child(&caption)?;
    Ok(div)
}

// The script is returned detached; the caller decides where it goes (usually `<head>`).
pub fn create_script_tag(src: &str, on_load: Option<&Function>) -> PortalResult<Element> {
    let script = element(&document()?, "script", &[("src", src)], None)?;
    if let (Some(cb), Some(el)) = (on_load, script.dyn_ref::<HtmlElement>()) {
        el.set_onload(Some(cb));
    }
    Ok(script)
}

pub struct Built {
    pub nodes: Vec<web_sys::Node>,
    pub listeners: Vec<EventListener>,
}

fn nav_link(document: &Document, link: &NavLink, listeners: &mut Vec<EventListener>) -> PortalResult<Element> {
    let a = element(document, "a", &[("href", "#"), ("id", link.id.as_str())], Some(link.label.as_str()))?;
    let target: LinkTarget = link.target.clone();
    listeners.push(EventListener::new(&a, "click", move |e| {
        e.prevent_default();
        lists::follow_in_browser(&target);
    }));
    Ok(a)
}

pub fn build_view(document: &Document, view: &View) -> PortalResult<Built> {
    let mut nodes: Vec<web_sys::Node> = Vec::new();
    let mut listeners = Vec::new();
    let br = || -> PortalResult<web_sys::Node> { Ok(document.create_element("br")?.into()) };
    match view {
        View::Options(options) => {
            for o in options {
                nodes.push(element(document, "option", &[("value", o.value.as_str())], Some(o.label.as_str()))?.into());
            }
        }
        View::Links(links) => {
            for link in links {
                nodes.push(nav_link(document, link, &mut listeners)?.into());
                nodes.push(br()?);
            }
        }
        View::Modules(entries) => {
            for entry in entries {
                nodes.push(nav_link(document, &entry.learn, &mut listeners)?.into());
                for d in &entry.downloads {
                    let attrs = [("href", d.href.as_str()), ("download", d.file_name.as_str())];
                    nodes.push(element(document, "a", &attrs, Some(d.label.as_str()))?.into());
                }
                nodes.push(br()?);
            }
        }
        View::UnitCheckboxes(boxes) => {
            for cb in boxes {
                let id = cb.input_id();
                let mut attrs = vec![("id", id.as_str()), ("type", "checkbox"), ("value", cb.unit_id.as_str())];
                if cb.checked {
                    attrs.push(("checked", "true"));
                }
                nodes.push(element(document, "input", &attrs, None)?.into());
                nodes.push(element(document, "label", &[("for", id.as_str())], Some(cb.name.as_str()))?.into());
            }
        }
        View::Crumbs(crumbs) => {
            for (i, c) in crumbs.iter().enumerate() {
                if i > 0 {
                    nodes.push(document.create_text_node(BREADCRUMB_SEPARATOR).into());
                }
                nodes.push(element(document, "a", &[("href", c.href.as_str())], Some(c.name.as_str()))?.into());
            }
        }
        View::Notice { text, is_error: true } => {
            nodes.push(element(document, "font", &[("style", "color:red;")], Some(text.as_str()))?.into());
        }
        View::Notice { text, is_error: false } | View::Text(text) => {
            nodes.push(document.create_text_node(text).into());
        }
    }
    Ok(Built { nodes, listeners })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use crate::view::{Crumb, SelectOption};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn noop() -> Function {
        Function::new_no_args("")
    }

    #[wasm_bindgen_test]
    fn creates_link_inside_parent() {
        let parent = create_div_tag("factory-parent", &[("class".into(), "holder".into())]).unwrap();
        let a = create_link_tag(Some(&parent), &noop(), "Open", Some("open-link")).unwrap();
        assert_eq!(a.get_attribute("href").as_deref(), Some("#"));
        assert_eq!(a.id(), "open-link");
        assert_eq!(parent.child_element_count(), 1);
        assert_eq!(parent.get_attribute("class").as_deref(), Some("holder"));

        let bare = create_link_tag(None, &noop(), "Units", Some("")).unwrap();
        assert!(!bare.has_attribute("id"));
    }

    #[wasm_bindgen_test]
    fn image_link_layout() {
        let div = create_image_link("m7", &noop(), "Fractions", "img/m7.png").unwrap();
        assert_eq!(
            div.outer_html(),
            "<div id=\"m7\" class=\"wp-caption alignnone image_link_div\">\
<a href=\"#\" id=\"m7-link\"><img aria-describedby=\"caption-attachment\" src=\"img/m7.png\" alt=\"Fractions\" \
class=\"wp-image-m7 size-medium\" width=\"auto\" height=\"auto\" sizes=\"(max-width: 300px) 100vw, 300px\"></a>\
<p id=\"caption-attachment\" class=\"wp-caption-text\">Fractions</p></div>"
        );
    }

    #[wasm_bindgen_test]
    fn bound_handler_gets_params_in_order() {
        let record = Function::new_with_args("a, b", "window.__boundArgs = [a, b];");
        let params = js_sys::JSON::parse(r#"["m1", 3]"#).unwrap();
        let bound = bind_params(&record, &params).unwrap();
        bound.call0(&JsValue::NULL).unwrap();
        let seen = js_sys::Reflect::get(&web_sys::window().unwrap(), &JsValue::from_str("__boundArgs")).unwrap();
        assert_eq!(js_sys::JSON::stringify(&seen).unwrap(), "[\"m1\",3]");
    }

    #[wasm_bindgen_test]
    fn text_is_never_parsed_as_markup() {
        let document = document().unwrap();
        let built = build_view(&document, &View::Options(vec![SelectOption::new("u3", "Data & <Chance>")])).unwrap();
        let option: Element = built.nodes[0].clone().unchecked_into();
        assert_eq!(option.outer_html(), "<option value=\"u3\">Data &amp; &lt;Chance&gt;</option>");

        let crumbs = View::Crumbs(vec![
            Crumb { name: "Home".into(), href: "index.html".into() },
            Crumb { name: "Units".into(), href: "units.html".into() },
        ]);
        let built = build_view(&document, &crumbs).unwrap();
        assert_eq!(built.nodes.len(), 3);
        assert_eq!(built.nodes[1].text_content().as_deref(), Some(" > "));
        assert!(built.listeners.is_empty());
    }
}
