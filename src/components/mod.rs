pub mod app;
pub mod breadcrumb;
pub mod copy_modal;
pub mod list_page;
pub mod loading_canvas;
pub mod message_banner;
pub mod page_view;
pub mod player_page;
