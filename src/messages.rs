// User-facing notices, the loading indicator and page navigation

use crate::session::{NavigationContext, Notice, SessionStore};
use crate::surface::{Display, Surface};
use crate::view::View;

pub const MESSAGE_ID: &str = "message";
pub const ERROR_MESSAGE_ID: &str = "errorMessage";
pub const ERROR_CONTENT_ID: &str = "error-content";
pub const LOADER_ID: &str = "loader";
pub const TOPIC_TITLE_CLASS: &str = "header-post-title-class";
pub const LOG_IN_REQUIRED: &str = "You don't have access to Practice/Quiz mode. Please subscribe to continue.";

// The pending session notice; a sign-out notice is consumed by reading it.
pub fn take_notice<S: SessionStore>(nav: &NavigationContext<S>) -> Option<Notice> {
    let notice = nav.notice()?;
    if notice.signed_out_from_link {
        nav.clear_sign_out_notice();
    }
    Some(notice)
}

pub fn notice_view(notice: &Notice) -> View {
    View::Notice {
        text: notice.text.clone(),
        is_error: notice.is_error,
    }
}

pub fn update_message<S: SessionStore, P: Surface>(nav: &NavigationContext<S>, page: &P) {
    if let Some(notice) = take_notice(nav) {
        page.render(MESSAGE_ID, notice_view(&notice));
    }
}

pub fn set_message<S: SessionStore>(nav: &NavigationContext<S>, msg: &str) {
    nav.set_notice(msg);
}

pub fn set_error_message<P: Surface>(page: &P, msg: &str) {
    if msg.is_empty() {
        return;
    }
    if page.render(ERROR_MESSAGE_ID, View::Text(msg.to_string())) {
        page.set_hidden(ERROR_MESSAGE_ID, false);
    }
    page.set_hidden(MESSAGE_ID, true);
}

pub fn set_message_visibility<P: Surface>(page: &P, msg_id: &str, visible: bool) {
    page.set_hidden(msg_id, !visible);
}

pub fn update_error<P: Surface>(page: &P, error_text: &str) {
    page.render(ERROR_CONTENT_ID, View::Text(error_text.to_string()));
}

pub fn hide_loader<P: Surface>(page: &P, active: Option<&str>) {
    page.set_display(LOADER_ID, Display::None);
    if let Some(id) = active {
        page.set_display(id, Display::Block);
    }
}

pub fn show_loader<P: Surface>(page: &P, active: Option<&str>) {
    page.set_display(LOADER_ID, Display::Block);
    if let Some(id) = active {
        page.set_display(id, Display::None);
    }
}

pub fn go_to_page<P: Surface>(page: &P, path: &str) {
    tracing::info!(path, "navigating");
    page.navigate(path);
}

pub fn update_selected_topic_title<P: Surface>(page: &P, topic: &str) {
    page.render_by_class(TOPIC_TITLE_CLASS, View::Text(topic.to_string()));
}

pub fn request_log_in<S: SessionStore, P: Surface>(nav: &NavigationContext<S>, page: &P, log_in_url: &str) {
    go_to_page(page, log_in_url);
    set_message(nav, LOG_IN_REQUIRED);
}

pub fn proceed_to_log_in<P: Surface>(page: &P, log_in_url: &str) {
    go_to_page(page, log_in_url);
}
