use yew::prelude::*;

use super::page_view::PageView;
use crate::lists::{self, BREADCRUMB_ID};
use crate::view::View;

#[derive(Properties, PartialEq, Clone)]
pub struct BreadcrumbProps {
    pub path: Vec<(String, String)>,
    #[prop_or_default]
    pub names: Vec<String>,
}

#[function_component(Breadcrumb)]
pub fn breadcrumb(props: &BreadcrumbProps) -> Html {
    let crumbs = View::Crumbs(lists::breadcrumb(&props.path, &props.names));
    html! {
        <div id={BREADCRUMB_ID} style="margin:4px 0 12px 0;">
            <PageView view={crumbs} />
        </div>
    }
}
