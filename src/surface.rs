// The host page as seen by the pipelines: elements addressed by id.
// An operation whose target id is missing from the page is dropped, never an error.

use std::cell::RefCell;
use std::collections::HashMap;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlInputElement, HtmlSelectElement};

use crate::dom;
use crate::error::{PortalError, PortalResult};
use crate::view::View;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
}

impl Display {
    pub fn as_css(self) -> &'static str {
        match self {
            Display::None => "none",
            Display::Block => "block",
        }
    }
}

pub trait Surface {
    fn render(&self, id: &str, view: View) -> bool;
    fn append(&self, id: &str, view: View) -> bool;
    fn render_by_class(&self, class: &str, view: View) -> bool;
    fn clear(&self, id: &str) -> bool;
    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str) -> bool;
    fn set_display(&self, id: &str, display: Display) -> bool;
    fn set_hidden(&self, id: &str, hidden: bool) -> bool;
    fn alert(&self, message: &str);
    fn navigate(&self, url: &str);
}

// Listeners owned per render target; replacing a target's content drops its old ones.
#[derive(Debug)]
pub struct ListenerSlots<L> {
    slots: HashMap<String, Vec<L>>,
}

impl<L> Default for ListenerSlots<L> {
    fn default() -> Self {
        Self { slots: HashMap::new() }
    }
}

impl<L> ListenerSlots<L> {
    pub fn replace(&mut self, key: &str, listeners: Vec<L>) {
        if listeners.is_empty() {
            self.slots.remove(key);
        } else {
            self.slots.insert(key.to_string(), listeners);
        }
    }

    pub fn extend(&mut self, key: &str, listeners: Vec<L>) {
        if !listeners.is_empty() {
            self.slots.entry(key.to_string()).or_default().extend(listeners);
        }
    }

    #[cfg(test)]
    pub fn count(&self, key: &str) -> usize {
        self.slots.get(key).map_or(0, Vec::len)
    }
}

thread_local! {
    static LISTENERS: RefCell<ListenerSlots<EventListener>> = RefCell::new(ListenerSlots::default());
}

#[cfg(all(test, target_arch = "wasm32"))]
fn listener_count(key: &str) -> usize {
    LISTENERS.with(|l| l.borrow().count(key))
}

#[derive(Clone)]
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn current() -> PortalResult<Self> {
        Ok(Self::new(dom::document()?))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Option<web_sys::Element> {
        let el = self.document.get_element_by_id(id);
        if el.is_none() {
            tracing::debug!(id, "element not on page, skipping");
        }
        el
    }

    fn fill(&self, parent: &web_sys::Element, key: &str, view: &View, replace: bool) {
        if replace {
            parent.set_text_content(None);
        }
        let built = match dom::build_view(&self.document, view) {
            Ok(built) => built,
            Err(err) => {
                tracing::warn!(%err, "could not build view");
                return;
            }
        };
        for node in &built.nodes {
            if let Err(err) = parent.append_child(node) {
                tracing::warn!(err = %PortalError::from_js(err), "append failed");
            }
        }
        LISTENERS.with(|l| {
            let mut l = l.borrow_mut();
            if replace {
                l.replace(key, built.listeners);
            } else {
                l.extend(key, built.listeners);
            }
        });
    }
}

impl Surface for DomSurface {
    fn render(&self, id: &str, view: View) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        self.fill(&el, id, &view, true);
        true
    }

    fn append(&self, id: &str, view: View) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        self.fill(&el, id, &view, false);
        true
    }

    fn render_by_class(&self, class: &str, view: View) -> bool {
        let Some(el) = self.document.get_elements_by_class_name(class).item(0) else {
            return false;
        };
        self.fill(&el, &format!(".{class}"), &view, true);
        true
    }

    fn clear(&self, id: &str) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        el.set_text_content(None);
        LISTENERS.with(|l| l.borrow_mut().replace(id, Vec::new()));
        true
    }

    fn value(&self, id: &str) -> Option<String> {
        let el = self.element(id)?;
        if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            return Some(select.value());
        }
        el.dyn_ref::<HtmlInputElement>().map(|input| input.value())
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
            true
        } else if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
            true
        } else {
            false
        }
    }

    fn set_display(&self, id: &str, display: Display) -> bool {
        let Some(el) = self.element(id).and_then(|e| e.dyn_into::<HtmlElement>().ok()) else {
            return false;
        };
        el.style().set_property("display", display.as_css()).is_ok()
    }

    fn set_hidden(&self, id: &str, hidden: bool) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if hidden {
            el.set_attribute("hidden", "true").is_ok()
        } else {
            el.remove_attribute("hidden").is_ok()
        }
    }

    fn alert(&self, message: &str) {
        if let Some(w) = web_sys::window() {
            let _ = w.alert_with_message(message);
        }
    }

    fn navigate(&self, url: &str) {
        if let Some(w) = web_sys::window() {
            if w.location().set_href(url).is_err() {
                tracing::warn!(url, "navigation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Tracked(Rc<Cell<u32>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn rerendering_a_target_drops_its_old_listeners() {
        let dropped = Rc::new(Cell::new(0));
        let tracked = |n: usize| (0..n).map(|_| Tracked(dropped.clone())).collect::<Vec<_>>();
        let mut slots = ListenerSlots::default();

        slots.replace("curriculum-list", tracked(3));
        slots.replace("curriculum-list", tracked(2));
        assert_eq!(dropped.get(), 3);
        assert_eq!(slots.count("curriculum-list"), 2);

        slots.extend("curriculum-list", tracked(1));
        assert_eq!(slots.count("curriculum-list"), 3);

        slots.replace("curriculum-list", Vec::new());
        assert_eq!(dropped.get(), 6);
        assert_eq!(slots.count("curriculum-list"), 0);
    }

    #[test]
    fn targets_keep_separate_slots() {
        let dropped = Rc::new(Cell::new(0));
        let mut slots = ListenerSlots::default();
        slots.replace("units", vec![Tracked(dropped.clone())]);
        slots.replace("modules", vec![Tracked(dropped.clone())]);
        slots.replace("units", Vec::new());
        assert_eq!(dropped.get(), 1);
        assert_eq!(slots.count("modules"), 1);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use crate::view::{LinkTarget, NavLink};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn link(id: &str) -> NavLink {
        NavLink {
            id: format!("unit_{id}"),
            label: id.to_string(),
            target: LinkTarget::Modules { unit_id: id.to_string() },
        }
    }

    #[wasm_bindgen_test]
    fn rerender_keeps_only_current_listeners() {
        let page = DomSurface::current().unwrap();
        let host = page.document().create_element("div").unwrap();
        host.set_id("surface-rerender");
        page.document().body().unwrap().append_child(&host).unwrap();

        page.render("surface-rerender", View::Links(vec![link("a"), link("b")]));
        page.render("surface-rerender", View::Links(vec![link("c")]));

        assert_eq!(listener_count("surface-rerender"), 1);
        // one anchor and its line break
        assert_eq!(host.child_element_count(), 2);
        page.clear("surface-rerender");
        assert_eq!(listener_count("surface-rerender"), 0);
    }
}
