mod bootstrap;
mod cascade;
mod clipboard;
mod components;
mod config;
mod data;
mod device;
mod dom;
mod dropdown;
mod error;
mod exports;
mod lists;
mod messages;
mod session;
mod surface;
#[cfg(test)]
mod testing;
mod util;
mod view;
mod viewport;

use components::app::App;

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    yew::Renderer::<App>::new().render();
}
