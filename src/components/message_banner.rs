use yew::prelude::*;

use super::page_view::PageView;
use crate::messages::{self, ERROR_MESSAGE_ID, MESSAGE_ID};
use crate::session::NavigationContext;

#[function_component(MessageBanner)]
pub fn message_banner() -> Html {
    // read once on mount; a sign-out notice is consumed here
    let notice = use_state(|| match NavigationContext::browser() {
        Ok(nav) => messages::take_notice(&nav),
        Err(err) => {
            tracing::warn!(%err, "cannot show pending notice");
            None
        }
    });

    html! {
        <div style="margin:8px 0;">
            <p id={MESSAGE_ID}>
                { if let Some(notice) = notice.as_ref() {
                    html! { <PageView view={messages::notice_view(notice)} /> }
                } else {
                    html! {}
                }}
            </p>
            <p id={ERROR_MESSAGE_ID} hidden={true} style="color:red;"></p>
        </div>
    }
}
