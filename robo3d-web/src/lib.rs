/// Robo3D Web - WASM/WebGL2 host for the hierarchical robot
///
/// Wires browser events into the scene and drives one traversal per
/// animation frame.

use std::cell::RefCell;
use std::rc::Rc;

use robo3d_core::{CubeMesh, FrameStats, InputEvent, Scene, SceneConfig, SetupError};
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

pub mod gl;
pub mod logging;

pub use gl::WebGlBackend;

#[wasm_bindgen]
pub struct WebRenderer {
    scene: Scene,
    backend: Option<WebGlBackend>,
}

#[wasm_bindgen]
impl WebRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebRenderer, JsValue> {
        Ok(WebRenderer {
            scene: Scene::new(SceneConfig::default()),
            backend: None,
        })
    }

    /// Initialize the renderer with a canvas element
    pub fn init(&mut self, canvas_id: &str) -> Result<(), JsValue> {
        let canvas = find_canvas(canvas_id)
            .map_err(setup_failed)
            .map_err(to_js)?;
        self.attach(&canvas).map_err(setup_failed).map_err(to_js)
    }

    /// Render a frame. Fails only when `init` has not succeeded.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let backend = self
            .backend
            .as_mut()
            .ok_or_else(|| JsValue::from_str("renderer is not initialized"))?;
        let stats = self.scene.render_frame(backend);
        report(&stats);
        Ok(())
    }

    /// Handle a `keypress`; `key` is the event's `key` string.
    pub fn key_press(&mut self, key: &str) -> bool {
        match single_char(key) {
            Some(c) => self.scene.handle(InputEvent::Key(c)),
            None => false,
        }
    }

    pub fn mouse_down(&mut self, x: f32, y: f32) {
        self.scene.handle(InputEvent::MouseDown { x, y });
    }

    pub fn mouse_up(&mut self) {
        self.scene.handle(InputEvent::MouseUp);
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) -> bool {
        self.scene.handle(InputEvent::MouseMove { x, y })
    }
}

impl WebRenderer {
    fn attach(&mut self, canvas: &HtmlCanvasElement) -> Result<(), SetupError> {
        let backend = WebGlBackend::new(canvas, &CubeMesh::unit())?;
        self.scene.set_viewport(canvas.width(), canvas.height());
        self.backend = Some(backend);
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

/// Set up the canvas, bind input listeners and start the animation loop.
///
/// Any setup failure is logged and returned; the loop never starts then.
#[wasm_bindgen]
pub fn start(canvas_id: &str) -> Result<(), JsValue> {
    let canvas = find_canvas(canvas_id)
        .map_err(setup_failed)
        .map_err(to_js)?;
    let mut renderer = WebRenderer::new()?;
    renderer
        .attach(&canvas)
        .map_err(setup_failed)
        .map_err(to_js)?;
    let renderer = Rc::new(RefCell::new(renderer));
    let window = web_sys::window().ok_or("no window")?;

    // keypress
    {
        let renderer = renderer.clone();
        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            renderer.borrow_mut().key_press(&event.key());
        }) as Box<dyn FnMut(KeyboardEvent)>);
        window.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // mouse buttons on the window so a release outside the canvas ends the drag
    {
        let renderer = renderer.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            if !is_primary(event.button()) {
                return;
            }
            renderer
                .borrow_mut()
                .mouse_down(event.client_x() as f32, event.client_y() as f32);
        }) as Box<dyn FnMut(MouseEvent)>);
        window.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let renderer = renderer.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            if is_primary(event.button()) {
                renderer.borrow_mut().mouse_up();
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let renderer = renderer.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            renderer
                .borrow_mut()
                .mouse_move(event.client_x() as f32, event.client_y() as f32);
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Animation loop: one traversal per display refresh
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Err(e) = renderer.borrow_mut().render() {
            error!("frame failed: {:?}", e);
            return;
        }
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(e) = request_animation_frame(callback) {
                error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = tick.borrow().as_ref() {
        request_animation_frame(callback)?;
    }
    info!(canvas = canvas_id, "animation loop started");
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init();
    Ok(())
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or("no window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, SetupError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| SetupError::Context("no document".to_string()))?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| SetupError::Context(format!("canvas #{canvas_id} not found")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| SetupError::Context(format!("#{canvas_id} is not a canvas")))
}

/// Only the primary button drags; `MouseEvent.button` is 0 for it.
fn is_primary(button: i16) -> bool {
    button == 0
}

fn setup_failed(e: SetupError) -> SetupError {
    error!("setup failed: {}", e);
    e
}

fn to_js(e: SetupError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Only log a frame's problems, a clean frame is the normal case.
fn report(stats: &FrameStats) {
    if !stats.is_balanced() {
        warn!(?stats, "pops do not match pushes");
    }
}

/// The character of a single-character `key` string.
fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robo3d_core::JointId;

    #[test]
    fn test_single_char() {
        assert_eq!(single_char("t"), Some('t'));
        assert_eq!(single_char("T"), Some('T'));
        assert_eq!(single_char("Enter"), None);
        assert_eq!(single_char(""), None);
    }

    #[test]
    fn test_only_primary_button_drags() {
        assert!(is_primary(0));
        assert!(!is_primary(1));
        assert!(!is_primary(2));
    }

    #[test]
    fn test_setup_failure_passes_through() {
        let e = setup_failed(SetupError::Context("canvas #robot not found".to_string()));
        assert_eq!(
            e.to_string(),
            "failed to get the rendering context: canvas #robot not found"
        );
    }

    #[test]
    fn test_input_without_canvas() {
        let mut renderer = WebRenderer::new().unwrap();
        assert!(renderer.key_press("l"));
        assert!(!renderer.key_press("Shift"));
        assert_eq!(renderer.scene().pose().angle(JointId::Head), 15.0);

        renderer.mouse_down(100.0, 100.0);
        assert!(renderer.mouse_move(150.0, 100.0));
        renderer.mouse_up();
        assert!(!renderer.mouse_move(10.0, 10.0));
    }
}
