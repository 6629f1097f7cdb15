use yew::prelude::*;

use super::{breadcrumb::Breadcrumb, message_banner::MessageBanner, page_view::PageView};
use crate::config::{PageKind, PortalConfig};
use crate::data::{JsDataSource, Restriction};
use crate::error::PortalResult;
use crate::lists;
use crate::messages::LOADER_ID;
use crate::session::{BrowserSession, NavigationContext};
use crate::view::View;

#[derive(Properties, PartialEq, Clone)]
pub struct ListPageProps {
    pub config: PortalConfig,
}

async fn fetch_list(config: &PortalConfig, nav: &NavigationContext<BrowserSession>) -> PortalResult<View> {
    let data = JsDataSource;
    match config.page {
        PageKind::Units => {
            let curriculum = nav.curriculum().unwrap_or_default();
            lists::units_list(&data, &curriculum, Restriction::none()).await
        }
        // an unset unit lists everything
        PageKind::Modules => {
            let unit = nav.units().unwrap_or_else(|| "all".to_string());
            lists::module_list_div(&data, nav, &unit, Restriction::none()).await
        }
        PageKind::Curricula | PageKind::ModulePlayer => lists::curriculum_list(&data, Restriction::none()).await,
    }
}

#[function_component(ListPage)]
pub fn list_page(props: &ListPageProps) -> Html {
    let list = use_state(|| None::<View>);

    {
        let list = list.clone();
        let config = props.config.clone();
        use_effect_with(config.page, move |_| {
            match NavigationContext::browser() {
                Ok(nav) => wasm_bindgen_futures::spawn_local(async move {
                    match fetch_list(&config, &nav).await {
                        Ok(view) => {
                            tracing::info!(count = view.item_count(), page = ?config.page, "list rendered");
                            list.set(Some(view));
                        }
                        Err(err) => tracing::warn!(%err, "list failed to load"),
                    }
                }),
                Err(err) => tracing::warn!(%err, "cannot render list"),
            }
            || ()
        });
    }

    html! {
        <div style="padding:12px; font-family:sans-serif;">
            <MessageBanner />
            <Breadcrumb path={props.config.breadcrumb.clone()} />
            { if let Some(view) = (*list).clone() {
                html! {
                    <div id={props.config.list_container_id.clone()}>
                        <PageView {view} />
                    </div>
                }
            } else {
                html! { <div id={LOADER_ID} style="display:block;">{"Loading..."}</div> }
            }}
        </div>
    }
}
