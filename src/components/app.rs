use super::{list_page::ListPage, player_page::PlayerPage};
use crate::config::{PageKind, PortalConfig};
use yew::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    // read once; the config block is static for the page's lifetime
    let config = use_memo((), |_| PortalConfig::load());

    match config.page {
        PageKind::ModulePlayer => html! { <PlayerPage config={(*config).clone()} /> },
        PageKind::Curricula | PageKind::Units | PageKind::Modules => {
            html! { <ListPage config={(*config).clone()} /> }
        }
    }
}
