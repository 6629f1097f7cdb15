use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use crate::config::PortalConfig;
use crate::viewport;

#[derive(Properties, PartialEq, Clone)]
pub struct LoadingCanvasProps {
    pub config: PortalConfig,
}

#[function_component(LoadingCanvas)]
pub fn loading_canvas(props: &LoadingCanvasProps) -> Html {
    let canvas_ref = use_node_ref();

    {
        let canvas_ref = canvas_ref.clone();
        let config = props.config.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let canvas = canvas_ref.cast::<HtmlCanvasElement>();

            if let Some(canvas) = &canvas {
                if let Err(err) = viewport::setup_canvas(canvas) {
                    tracing::warn!(%err, "canvas setup failed");
                }
            }

            // Resize keeps the canvas at the viewport and refits the tutorial video
            let resize_cb = {
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    let Some(canvas) = &canvas else { return };
                    let resized = viewport::resize_page(canvas)
                        .and_then(|_| viewport::draw_loading(canvas))
                        .and_then(|_| viewport::resize_video(&config));
                    if let Err(err) = resized {
                        tracing::debug!(%err, "resize skipped");
                    }
                }) as Box<dyn FnMut(_)>)
            };
            if let Some(window) = &window {
                let _ = window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
            }

            move || {
                if let Some(window) = &window {
                    let _ = window.remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
                }
                drop(resize_cb);
            }
        });
    }

    html! {
        <canvas id={props.config.canvas_id.clone()} ref={canvas_ref} style={viewport::CANVAS_STYLE}></canvas>
    }
}
