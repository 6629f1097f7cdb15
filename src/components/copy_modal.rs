use yew::prelude::*;

use crate::clipboard::{MODAL_CLOSE_CLASS, MODAL_ID, MODAL_TEXT_ID};

// Hidden until the copy pipeline fills #clipboard-text and shows it
#[function_component(CopyModal)]
pub fn copy_modal() -> Html {
    html! {
        <div id={MODAL_ID} style="display:none; position:fixed; inset:0; z-index:50; background:rgba(0,0,0,0.55);">
            <div style="background:#fefefe; margin:15% auto; padding:16px 20px; border:1px solid #888; border-radius:8px; width:80%; max-width:480px;">
                <span class={MODAL_CLOSE_CLASS} style="float:right; font-size:28px; font-weight:bold; cursor:pointer;">{"\u{00D7}"}</span>
                <p style="margin:0 0 8px 0;">{"Select the text below and copy it."}</p>
                <pre id={MODAL_TEXT_ID} style="white-space:pre-wrap; user-select:all; -webkit-user-select:all;"></pre>
            </div>
        </div>
    }
}
