use yew::prelude::*;

use super::{copy_modal::CopyModal, loading_canvas::LoadingCanvas};
use crate::bootstrap::{self, JsModulePlayer};
use crate::config::PortalConfig;
use crate::session::NavigationContext;

#[derive(Properties, PartialEq, Clone)]
pub struct PlayerPageProps {
    pub config: PortalConfig,
}

#[function_component(PlayerPage)]
pub fn player_page(props: &PlayerPageProps) -> Html {
    {
        let config = props.config.clone();
        use_effect_with((), move |_| {
            match NavigationContext::browser() {
                Ok(nav) => {
                    if let Err(err) = bootstrap::set_module_values(&nav, &config) {
                        tracing::warn!(%err, "could not stage module values");
                    }
                }
                Err(err) => tracing::warn!(%err, "session storage unavailable"),
            }
            if let Err(err) = bootstrap::load_module(&JsModulePlayer, &config) {
                tracing::error!(%err, "module player did not start");
            }
            || ()
        });
    }

    html! {
        <div id="module-player" style="margin:0; padding:0;">
            <LoadingCanvas config={props.config.clone()} />
            <CopyModal />
        </div>
    }
}
