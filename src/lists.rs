// Link lists for the curriculum -> unit -> module drill-down, and the breadcrumb trail

use crate::config::PortalConfig;
use crate::data::{DataSource, Document, ModuleBundle, Query, Restriction};
use crate::error::PortalResult;
use crate::messages;
use crate::session::{NavigationContext, SessionStore};
use crate::surface::{DomSurface, Surface};
use crate::view::{Crumb, Download, LinkTarget, ModuleEntry, NavLink, View};

pub const BREADCRUMB_ID: &str = "div-bread-crumb";

pub fn go_to_module_page<S: SessionStore, P: Surface>(nav: &NavigationContext<S>, page: &P, module_page: &str, id: &str) {
    nav.set_module_id(id);
    messages::go_to_page(page, module_page);
}

// Records the choice a drill-down link stands for, then opens the next page.
pub fn follow<S: SessionStore, P: Surface>(
    nav: &NavigationContext<S>,
    page: &P,
    config: &PortalConfig,
    target: &LinkTarget,
) {
    match target {
        LinkTarget::Units { curriculum_id } => {
            nav.set_curriculum(curriculum_id);
            messages::go_to_page(page, &config.units_page);
        }
        LinkTarget::Modules { unit_id } => {
            nav.set_units(unit_id);
            messages::go_to_page(page, &config.modules_page);
        }
        LinkTarget::Module { module_id } => go_to_module_page(nav, page, &config.module_page, module_id),
    }
}

pub fn follow_in_browser(target: &LinkTarget) {
    match (NavigationContext::browser(), DomSurface::current()) {
        (Ok(nav), Ok(page)) => follow(&nav, &page, &PortalConfig::load(), target),
        (Err(err), _) | (_, Err(err)) => tracing::warn!(%err, "cannot follow link"),
    }
}

fn links(docs: &[Document], prefix: &str, label_field: &str, target: impl Fn(String) -> LinkTarget) -> Vec<NavLink> {
    docs.iter()
        .map(|doc| NavLink {
            id: format!("{prefix}_{}", doc.id),
            label: doc.text(label_field),
            target: target(doc.id.clone()),
        })
        .collect()
}

pub fn curriculum_links(docs: &[Document]) -> Vec<NavLink> {
    links(docs, "curriculum", "name", |curriculum_id| LinkTarget::Units { curriculum_id })
}

pub fn unit_links(docs: &[Document]) -> Vec<NavLink> {
    links(docs, "unit", "name", |unit_id| LinkTarget::Modules { unit_id })
}

pub fn module_links(docs: &[Document]) -> Vec<NavLink> {
    links(docs, "module", "displayName", |module_id| LinkTarget::Module { module_id })
}

// "Learn X" entries with their downloads. The last module listed becomes the player default.
pub fn module_entries<S: SessionStore>(bundle: &ModuleBundle, nav: &NavigationContext<S>) -> Vec<ModuleEntry> {
    bundle
        .modules
        .iter()
        .map(|module| {
            nav.set_module_path(&module.text("pathToModule"));
            let mut downloads = Vec::new();
            if let Some(file) = bundle.files.get(&module.id) {
                downloads.push(Download {
                    href: file.text("pathToFile"),
                    file_name: file.text("fileName"),
                    label: "Download TNS File".to_string(),
                });
            }
            if let Some(sheet) = bundle.worksheets.get(&module.id) {
                downloads.push(Download {
                    href: sheet.text("pathToWorksheet"),
                    file_name: sheet.text("worksheetName"),
                    label: "Download worksheet".to_string(),
                });
            }
            ModuleEntry {
                learn: NavLink {
                    id: format!("learn_{}", module.id),
                    label: format!("Learn {}", module.text("displayName")),
                    target: LinkTarget::Module {
                        module_id: module.id.clone(),
                    },
                },
                downloads,
            }
        })
        .collect()
}

pub async fn curriculum_list<D: DataSource>(data: &D, restriction: Restriction) -> PortalResult<View> {
    let docs = data.query(&Query::Curricula { restriction }).await?;
    Ok(View::Links(curriculum_links(&docs)))
}

pub async fn units_list<D: DataSource>(data: &D, curriculum_id: &str, restriction: Restriction) -> PortalResult<View> {
    let query = Query::Units {
        curriculum_id: curriculum_id.to_string(),
        restriction,
    };
    Ok(View::Links(unit_links(&data.query(&query).await?)))
}

pub async fn module_list<D: DataSource>(data: &D, unit_id: &str, restriction: Restriction) -> PortalResult<View> {
    let query = Query::Modules {
        unit_id: unit_id.to_string(),
        restriction,
    };
    Ok(View::Links(module_links(&data.query(&query).await?)))
}

// `unit_id == "all"` lists modules from every unit.
pub async fn module_list_div<D: DataSource, S: SessionStore>(
    data: &D,
    nav: &NavigationContext<S>,
    unit_id: &str,
    restriction: Restriction,
) -> PortalResult<View> {
    let unit = (unit_id != "all").then_some(unit_id);
    let bundle = data.module_bundle(unit, &restriction).await?;
    Ok(View::Modules(module_entries(&bundle, nav)))
}

fn render_counted<P: Surface>(page: &P, target: &str, view: View) -> usize {
    let count = view.item_count();
    page.render(target, view);
    count
}

pub async fn update_curriculum_list<D: DataSource, P: Surface>(
    data: &D,
    page: &P,
    target: &str,
    restriction: Restriction,
) -> PortalResult<usize> {
    Ok(render_counted(page, target, curriculum_list(data, restriction).await?))
}

pub async fn update_units_list<D: DataSource, P: Surface>(
    data: &D,
    page: &P,
    target: &str,
    curriculum_id: &str,
    restriction: Restriction,
) -> PortalResult<usize> {
    Ok(render_counted(page, target, units_list(data, curriculum_id, restriction).await?))
}

pub async fn update_module_list<D: DataSource, P: Surface>(
    data: &D,
    page: &P,
    target: &str,
    unit_id: &str,
    restriction: Restriction,
) -> PortalResult<usize> {
    Ok(render_counted(page, target, module_list(data, unit_id, restriction).await?))
}

pub async fn update_module_list_div<D: DataSource, S: SessionStore, P: Surface>(
    data: &D,
    nav: &NavigationContext<S>,
    page: &P,
    target: &str,
    unit_id: &str,
    restriction: Restriction,
) -> PortalResult<usize> {
    let view = module_list_div(data, nav, unit_id, restriction).await?;
    let count = render_counted(page, target, view);
    messages::hide_loader(page, None);
    Ok(count)
}

// One crumb per `(name, href)` step; a non-empty entry in `replacement_names`
// overrides the step's name at the same position.
pub fn breadcrumb(path: &[(String, String)], replacement_names: &[String]) -> Vec<Crumb> {
    path.iter()
        .enumerate()
        .map(|(i, (name, href))| {
            let name = replacement_names
                .get(i)
                .filter(|n| !n.is_empty())
                .unwrap_or(name);
            Crumb {
                name: name.clone(),
                href: href.clone(),
            }
        })
        .collect()
}

pub fn update_breadcrumb_path<P: Surface>(page: &P, path: &[(String, String)], replacement_names: &[String]) {
    page.render(BREADCRUMB_ID, View::Crumbs(breadcrumb(path, replacement_names)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::LOADER_ID;
    use crate::session::SessionKey;
    use crate::surface::Display;
    use crate::testing::{MemorySession, RecordingSurface, StaticDataSource};
    use futures::executor::block_on;
    use serde_json::json;

    fn setup() -> (NavigationContext<MemorySession>, RecordingSurface, PortalConfig) {
        let nav = NavigationContext::new(MemorySession::new());
        let page = RecordingSurface::with_ids(&["list", LOADER_ID, BREADCRUMB_ID]);
        (nav, page, PortalConfig::default())
    }

    fn only_links(view: Option<View>) -> Vec<NavLink> {
        match view {
            Some(View::Links(links)) => links,
            other => panic!("expected links, got {other:?}"),
        }
    }

    #[test]
    fn curriculum_link_stores_choice_and_opens_units() {
        let (nav, page, config) = setup();
        let data = StaticDataSource::default().list(
            Query::Curricula { restriction: Restriction::none() },
            vec![
                Document::new("c1", json!({ "name": "Grade 6" })),
                Document::new("c2", json!({ "name": "Grade 7" })),
            ],
        );

        let n = block_on(update_curriculum_list(&data, &page, "list", Restriction::none())).unwrap();
        assert_eq!(n, 2);
        let links = only_links(page.view("list"));
        assert_eq!(
            links.iter().map(|l| (l.id.as_str(), l.label.as_str())).collect::<Vec<_>>(),
            vec![("curriculum_c1", "Grade 6"), ("curriculum_c2", "Grade 7")]
        );

        follow(&nav, &page, &config, &links[1].target);
        assert_eq!(nav.curriculum().as_deref(), Some("c2"));
        assert_eq!(*page.navigations.borrow(), vec![config.units_page.clone()]);
    }

    #[test]
    fn unit_link_stores_choice_and_opens_modules() {
        let (nav, page, config) = setup();
        let data = StaticDataSource::default().list(
            Query::Units {
                curriculum_id: "c1".into(),
                restriction: Restriction::none(),
            },
            vec![Document::new("u1", json!({ "name": "Ratios" }))],
        );

        block_on(update_units_list(&data, &page, "list", "c1", Restriction::none())).unwrap();
        let links = only_links(page.view("list"));
        assert_eq!(links[0].id, "unit_u1");
        follow(&nav, &page, &config, &links[0].target);

        assert_eq!(nav.units().as_deref(), Some("u1"));
        assert_eq!(*page.navigations.borrow(), vec![config.modules_page.clone()]);
    }

    #[test]
    fn module_link_opens_player_with_module_id() {
        let (nav, page, config) = setup();
        let data = StaticDataSource::default().list(
            Query::Modules {
                unit_id: "u1".into(),
                restriction: Restriction::none(),
            },
            vec![Document::new("7-21-4", json!({ "displayName": "Fly" }))],
        );

        block_on(update_module_list(&data, &page, "list", "u1", Restriction::none())).unwrap();
        let links = only_links(page.view("list"));
        assert_eq!((links[0].id.as_str(), links[0].label.as_str()), ("module_7-21-4", "Fly"));
        follow(&nav, &page, &config, &links[0].target);

        assert_eq!(nav.module_id().as_deref(), Some("7-21-4"));
        assert_eq!(*page.navigations.borrow(), vec![config.module_page.clone()]);
    }

    #[test]
    fn module_div_adds_downloads_and_hides_loader() {
        let (nav, page, _) = setup();
        let data = StaticDataSource::default();
        {
            let mut bundle = data.bundle.borrow_mut();
            bundle.modules = vec![
                Document::new("m1", json!({ "displayName": "Fractions", "pathToModule": "mods/frac" })),
                Document::new("m2", json!({ "displayName": "Angles", "pathToModule": "mods/angles" })),
            ];
            bundle.files.insert(
                "m1".into(),
                Document::new("f1", json!({ "pathToFile": "files/frac.tns", "fileName": "frac.tns" })),
            );
            bundle.worksheets.insert(
                "m2".into(),
                Document::new("w1", json!({ "pathToWorksheet": "ws/angles.pdf", "worksheetName": "angles.pdf" })),
            );
        }

        let n = block_on(update_module_list_div(&data, &nav, &page, "list", "all", Restriction::none())).unwrap();

        assert_eq!(n, 2);
        assert_eq!(data.calls(), vec!["getModulesFilesWorksheets:*"]);
        let Some(View::Modules(entries)) = page.view("list") else {
            panic!("expected module entries");
        };
        assert_eq!(entries[0].learn.id, "learn_m1");
        assert_eq!(entries[0].learn.label, "Learn Fractions");
        assert_eq!(
            entries[0].downloads,
            vec![Download {
                href: "files/frac.tns".into(),
                file_name: "frac.tns".into(),
                label: "Download TNS File".into(),
            }]
        );
        assert_eq!(entries[1].downloads[0].label, "Download worksheet");
        assert_eq!(entries[1].learn.target, LinkTarget::Module { module_id: "m2".into() });
        assert_eq!(nav.get(SessionKey::ModulePath).as_deref(), Some("mods/angles"));
        assert_eq!(page.get(LOADER_ID).display, Some(Display::None));
    }

    #[test]
    fn single_unit_bundle_asks_for_that_unit() {
        let (nav, _, _) = setup();
        let data = StaticDataSource::default();
        block_on(module_list_div(&data, &nav, "u4", Restriction::none())).unwrap();
        assert_eq!(data.calls(), vec!["getModulesFilesWorksheets:u4"]);
    }

    #[test]
    fn breadcrumb_takes_optional_names() {
        let (_, page, _) = setup();
        let path = vec![
            ("Home".to_string(), "index.html".to_string()),
            ("Curriculum".to_string(), "curriculum.html".to_string()),
            ("Units".to_string(), "units.html".to_string()),
        ];
        update_breadcrumb_path(&page, &path, &[String::new(), "Grade 6".to_string()]);
        let crumb = |name: &str, href: &str| Crumb {
            name: name.into(),
            href: href.into(),
        };
        assert_eq!(
            page.view(BREADCRUMB_ID),
            Some(View::Crumbs(vec![
                crumb("Home", "index.html"),
                crumb("Grade 6", "curriculum.html"),
                crumb("Units", "units.html"),
            ]))
        );
    }
}
