use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlMediaElement, Window};

use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::util::remove_alpha_and_convert_to_number;

pub const LOADING_TEXT: &str = "Loading...";
pub const CANVAS_STYLE: &str = "touch-action: none;";
const CANVAS_FILL: f64 = 0.99;

// Picks the first usable measurement: the window's inner size, then the
// root element's client size when non-zero, then the body's.
pub fn pick_base(inner: Option<f64>, root_client: Option<f64>, body_client: f64) -> f64 {
    inner
        .or(root_client.filter(|v| *v != 0.0))
        .unwrap_or(body_client)
}

pub fn canvas_size(base_width: f64, base_height: f64) -> (f64, f64) {
    (base_width * CANVAS_FILL, base_height * CANVAS_FILL)
}

pub fn loading_font(base_width: f64) -> String {
    format!("{}px Verdana", base_width * 0.05)
}

// Where "Loading..." is drawn; the text ends at the canvas centre.
pub fn loading_origin(canvas_width: f64, canvas_height: f64, text_width: f64) -> (f64, f64) {
    (canvas_width * 0.5 - text_width, canvas_height * 0.5)
}

pub fn fit_video(sidebar: (f64, f64), video: (f64, f64)) -> (f64, f64) {
    let scale = (sidebar.0 / video.0).min(sidebar.1 / video.1);
    (video.0 * scale, video.1 * scale)
}

fn window() -> PortalResult<Window> {
    web_sys::window().ok_or(PortalError::NoWindow)
}

fn document() -> PortalResult<Document> {
    window()?.document().ok_or(PortalError::NoWindow)
}

pub fn base_width() -> PortalResult<f64> {
    let window = window()?;
    let doc = window.document().ok_or(PortalError::NoWindow)?;
    let inner = window.inner_width().ok().and_then(|v| v.as_f64());
    let root = doc.document_element().map(|e| e.client_width() as f64);
    let body = doc.body().map(|b| b.client_width() as f64).unwrap_or(0.0);
    Ok(pick_base(inner, root, body))
}

pub fn base_height() -> PortalResult<f64> {
    let window = window()?;
    let doc = window.document().ok_or(PortalError::NoWindow)?;
    let inner = window.inner_height().ok().and_then(|v| v.as_f64());
    let root = doc.document_element().map(|e| e.client_height() as f64);
    let body = doc.body().map(|b| b.client_height() as f64).unwrap_or(0.0);
    Ok(pick_base(inner, root, body))
}

pub fn draw_canvas(canvas_id: &str) -> PortalResult<HtmlCanvasElement> {
    let doc = document()?;
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into().map_err(JsValue::from)?;
    canvas.set_id(canvas_id);
    canvas.set_attribute("style", CANVAS_STYLE)?;
    doc.body().ok_or(PortalError::NoWindow)?.append_child(&canvas)?;
    Ok(canvas)
}

pub fn get_canvas(canvas_id: &str) -> PortalResult<HtmlCanvasElement> {
    document()?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| PortalError::MissingGlobal(canvas_id.to_string()))?
        .dyn_into()
        .map_err(|_| PortalError::Js(format!("#{canvas_id} is not a canvas")))
}

pub fn set_canvas_size(canvas: &HtmlCanvasElement, width: f64, height: f64) {
    canvas.set_width(width.max(0.0) as u32);
    canvas.set_height(height.max(0.0) as u32);
}

pub fn resize_canvas(canvas: &HtmlCanvasElement) -> PortalResult<()> {
    let (w, h) = canvas_size(base_width()?, base_height()?);
    set_canvas_size(canvas, w, h);
    Ok(())
}

pub fn resize_page(canvas: &HtmlCanvasElement) -> PortalResult<()> {
    resize_canvas(canvas)?;
    window()?.scroll_to_with_x_and_y(0.0, 1.0);
    Ok(())
}

pub fn draw_loading(canvas: &HtmlCanvasElement) -> PortalResult<()> {
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| PortalError::Js("no 2d context".to_string()))?
        .dyn_into()
        .map_err(JsValue::from)?;
    ctx.set_font(&loading_font(base_width()?));

    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let gradient = ctx.create_linear_gradient(0.0, 0.0, w, 0.0);
    gradient.add_color_stop(0.0, "blue")?;
    gradient.add_color_stop(0.5, "green")?;
    gradient.add_color_stop(1.0, "red")?;
    ctx.set_fill_style_canvas_gradient(&gradient);

    let text_width = ctx.measure_text(LOADING_TEXT)?.width();
    let (x, y) = loading_origin(w, h, text_width);
    ctx.fill_text(LOADING_TEXT, x, y)?;
    Ok(())
}

pub fn setup_canvas(canvas: &HtmlCanvasElement) -> PortalResult<()> {
    let style = canvas.style();
    style.set_property("margin-top", "0")?;
    style.set_property("margin-left", "0")?;
    set_canvas_size(canvas, base_width()?, base_height()?);
    resize_page(canvas)?;
    draw_loading(canvas)
}

// The sidebar counts as active when it is on the page and not `display: none`.
pub fn is_sidebar_active(sidebar_id: &str) -> bool {
    let Ok(doc) = document() else {
        return false;
    };
    doc.get_element_by_id(sidebar_id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|el| el.style().get_property_value("display").unwrap_or_default() != "none")
        .unwrap_or(false)
}

pub fn resize_video(config: &PortalConfig) -> PortalResult<()> {
    if !is_sidebar_active(&config.right_sidebar_id) {
        return Ok(());
    }
    let doc = document()?;
    let Some(sidebar) = doc
        .get_element_by_id(&config.right_sidebar_id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(());
    };
    let style = sidebar.style();
    let dim = |prop: &str| {
        style
            .get_property_value(prop)
            .ok()
            .and_then(|v| remove_alpha_and_convert_to_number(&v))
    };
    let (Some(sw), Some(sh)) = (dim("width"), dim("height")) else {
        tracing::debug!("sidebar has no inline size, leaving video alone");
        return Ok(());
    };
    let (w, h) = fit_video(
        (sw as f64, sh as f64),
        (config.tutorial_video_width, config.tutorial_video_height),
    );
    let Some(video) = doc
        .get_element_by_id(&config.video_id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(());
    };
    video.style().set_property("width", &format!("{w}px"))?;
    video.style().set_property("height", &format!("{h}px"))?;
    Ok(())
}

pub fn play_pause(video_id: &str) -> PortalResult<()> {
    let Some(video) = document()?
        .get_element_by_id(video_id)
        .and_then(|el| el.dyn_into::<HtmlMediaElement>().ok())
    else {
        return Ok(());
    };
    if video.paused() {
        // the returned promise only rejects on autoplay policy; nothing to do then
        let _ = video.play()?;
    } else {
        video.pause()?;
    }
    Ok(())
}
