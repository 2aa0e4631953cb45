//! Browser host
//!
//! Mounts the components on `<canvas>` elements, wires DOM events into
//! their state and drives them with `requestAnimationFrame`. Every listener
//! and the pending frame are owned by the returned handle and released when
//! it is unmounted or garbage collected.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use snafu::{OptionExt, ResultExt};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use super::fps::FpsCounter;
use super::scheduler::{FrameCallback, FrameHandle, FrameLoop, FrameScheduler, FrameSlot};
use crate::consts::FALLBACK_FRAME_MS;
use crate::error::{
    MissingCanvasSnafu, MissingContextSnafu, MissingWindowSnafu, MountError, SettingsSnafu,
};
use crate::renderer::Canvas2dSurface;
use crate::settings::{FieldSettings, ShotBallSettings};
use crate::sim::{ParticleField, ShotBall, TickInput, tick};

/// Log the frame rate this often (frames)
const FPS_LOG_INTERVAL: u64 = 600;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (several modules on one page) is harmless
    let _ = console_log::init_with_level(log::Level::Info);
}

/// `requestAnimationFrame`, or a ~60 Hz timer when it is missing
///
/// One trampoline closure lives as long as the scheduler and runs whatever
/// the slot holds, so a cancelled frame frees its callback immediately.
struct BrowserScheduler {
    window: Window,
    has_raf: bool,
    slot: FrameSlot,
    trampoline: Closure<dyn FnMut(Option<f64>)>,
}

impl BrowserScheduler {
    fn new(window: Window) -> Self {
        let has_raf = js_sys::Reflect::get(&window, &JsValue::from_str("requestAnimationFrame"))
            .map(|f| f.is_function())
            .unwrap_or(false);
        if !has_raf {
            log::warn!("requestAnimationFrame unavailable, using {FALLBACK_FRAME_MS} ms timer");
        }

        let slot = FrameSlot::new();
        let trampoline = {
            let slot = slot.clone();
            // rAF passes a timestamp, the timer fallback passes nothing
            Closure::<dyn FnMut(Option<f64>)>::new(move |time: Option<f64>| {
                slot.fire(time, js_sys::Date::now);
            })
        };

        Self {
            window,
            has_raf,
            slot,
            trampoline,
        }
    }
}

impl FrameScheduler for BrowserScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
        self.slot.arm(callback);
        let function = self.trampoline.as_ref().unchecked_ref::<js_sys::Function>();

        let handle = if self.has_raf {
            self.window
                .request_animation_frame(function)
                .ok()
                .map(FrameHandle::Animation)
        } else {
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(function, FALLBACK_FRAME_MS)
                .ok()
                .map(FrameHandle::Timeout)
        };
        if handle.is_none() {
            self.slot.disarm();
        }
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        match handle {
            FrameHandle::Animation(id) => {
                let _ = self.window.cancel_animation_frame(id);
            }
            FrameHandle::Timeout(id) => self.window.clear_timeout_with_handle(id),
        }
        self.slot.disarm();
    }
}

/// DOM event listener removed on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(target: &EventTarget, kind: &'static str, handler: impl FnMut(Event) + 'static) -> Self {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("Could not listen for '{kind}'");
        }
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Pause the loop while the tab is hidden
fn visibility_listener(window: &Window, frame_loop: &FrameLoop) -> Option<Listener> {
    let document = window.document()?;
    let control = frame_loop.control();
    let doc = document.clone();
    Some(Listener::new(&document, "visibilitychange", move |_| {
        if doc.hidden() {
            control.pause();
        } else {
            control.resume();
        }
    }))
}

fn find_canvas(id: &str) -> Result<(Window, HtmlCanvasElement), MountError> {
    let window = web_sys::window().context(MissingWindowSnafu)?;
    let canvas = window
        .document()
        .and_then(|d| d.get_element_by_id(id))
        .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        .context(MissingCanvasSnafu { id })?;
    Ok((window, canvas))
}

/// CSS size of the canvas, falling back to the viewport
fn layout_size(window: &Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let (w, h) = (canvas.client_width(), canvas.client_height());
    if w > 0 && h > 0 {
        return (w as u32, h as u32);
    }
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
    (dim(window.inner_width()), dim(window.inner_height()))
}

fn fit_surface(window: &Window, surface: &Canvas2dSurface) -> Vec2 {
    let (w, h) = layout_size(window, surface.canvas());
    surface.resize(w, h);
    Vec2::new(w as f32, h as f32)
}

/// Pointer position relative to the canvas, `None` when outside it
fn pointer_in(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Option<Vec2> {
    let rect = canvas.get_bounding_client_rect();
    let x = event.client_x() as f64 - rect.left();
    let y = event.client_y() as f64 - rect.top();
    if x < 0.0 || y < 0.0 || x > rect.width() || y > rect.height() {
        return None;
    }
    Some(Vec2::new(x as f32, y as f32))
}

fn seed() -> u64 {
    js_sys::Date::now() as u64
}

// ---------------------------------------------------------------------------
// Particle field
// ---------------------------------------------------------------------------

struct FieldState {
    field: ParticleField,
    surface: Canvas2dSurface,
    fps: FpsCounter,
    frames: u64,
}

struct FieldMount {
    frame_loop: FrameLoop,
    state: Rc<RefCell<FieldState>>,
    _listeners: Vec<Listener>,
}

fn mount_field(canvas_id: &str, settings: FieldSettings) -> Result<FieldMount, MountError> {
    let (window, canvas) = find_canvas(canvas_id)?;
    let surface = Canvas2dSurface::new(canvas.clone()).context(MissingContextSnafu { id: canvas_id })?;
    let size = fit_surface(&window, &surface);

    let state = Rc::new(RefCell::new(FieldState {
        field: ParticleField::new(settings, size, seed()),
        surface,
        fps: FpsCounter::new(),
        frames: 0,
    }));

    let frame_loop = {
        let state = state.clone();
        FrameLoop::new(BrowserScheduler::new(window.clone()), move |time| {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            s.field.frame(&mut s.surface);
            s.fps.record(time);
            s.frames += 1;
            if s.frames % FPS_LOG_INTERVAL == 0 {
                log::debug!("Particle field at {} fps", s.fps.fps());
            }
        })
    };

    let mut listeners = Vec::new();

    {
        let state = state.clone();
        let win = window.clone();
        listeners.push(Listener::new(&window, "resize", move |_| {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            let size = fit_surface(&win, &s.surface);
            s.field.resize(size);
        }));
    }

    {
        let state = state.clone();
        let canvas = canvas.clone();
        listeners.push(Listener::new(&window, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                state.borrow_mut().field.set_pointer(pointer_in(&canvas, event));
            }
        }));
    }

    {
        let state = state.clone();
        listeners.push(Listener::new(&window, "mouseout", move |event| {
            // relatedTarget is null once the pointer has left the window
            let left_window = event
                .dyn_ref::<MouseEvent>()
                .is_some_and(|e| e.related_target().is_none());
            if left_window {
                state.borrow_mut().field.set_pointer(None);
            }
        }));
    }

    listeners.extend(visibility_listener(&window, &frame_loop));

    frame_loop.start();
    Ok(FieldMount {
        frame_loop,
        state,
        _listeners: listeners,
    })
}

/// Mounted particle field; inert when the canvas could not be used
#[wasm_bindgen]
pub struct ParticleFieldHandle {
    mount: Option<FieldMount>,
}

/// Start the particle field on `canvas_id`. Never throws: without a usable
/// canvas the returned handle simply does nothing.
#[wasm_bindgen]
pub fn mount_particle_field(canvas_id: &str, settings_json: Option<String>) -> ParticleFieldHandle {
    let settings = settings_json
        .as_deref()
        .map(FieldSettings::from_json_or_default)
        .unwrap_or_default();

    match mount_field(canvas_id, settings) {
        Ok(mount) => {
            log::info!(
                "Particle field mounted on '{canvas_id}' ({} dots)",
                mount.state.borrow().field.dots().len()
            );
            ParticleFieldHandle { mount: Some(mount) }
        }
        Err(e) => {
            log::warn!("Particle field disabled: {e}");
            ParticleFieldHandle { mount: None }
        }
    }
}

#[wasm_bindgen]
impl ParticleFieldHandle {
    pub fn is_active(&self) -> bool {
        self.mount.is_some()
    }

    /// Apply new settings in place
    pub fn set_settings(&self, settings_json: &str) {
        if let Some(mount) = &self.mount {
            let settings = FieldSettings::from_json_or_default(settings_json);
            mount.state.borrow_mut().field.reconfigure(settings);
        }
    }

    pub fn unmount(&mut self) {
        if let Some(mount) = self.mount.take() {
            log::info!(
                "Particle field unmounted after {} frames",
                mount.frame_loop.frames()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// ShotBall
// ---------------------------------------------------------------------------

struct ShotBallState {
    world: ShotBall,
    surface: Canvas2dSurface,
    input: TickInput,
    fps: FpsCounter,
}

/// Mounted ShotBall demo
#[wasm_bindgen]
pub struct ShotBallHandle {
    frame_loop: Option<FrameLoop>,
    listeners: Vec<Listener>,
}

fn mount_shotball_inner(canvas_id: &str, settings_json: &str) -> Result<ShotBallHandle, MountError> {
    let settings = ShotBallSettings::from_json(settings_json).context(SettingsSnafu)?;
    let (window, canvas) = find_canvas(canvas_id)?;
    let surface = Canvas2dSurface::new(canvas.clone()).context(MissingContextSnafu { id: canvas_id })?;
    let size = fit_surface(&window, &surface);

    let state = Rc::new(RefCell::new(ShotBallState {
        world: ShotBall::new(settings, size, seed()),
        surface,
        input: TickInput::default(),
        fps: FpsCounter::new(),
    }));

    let frame_loop = {
        let state = state.clone();
        FrameLoop::new(BrowserScheduler::new(window.clone()), move |time| {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            let input = std::mem::take(&mut s.input);
            let dt = s.world.settings().time_step;
            tick(&mut s.world, &input, dt);
            s.world.draw(&mut s.surface);

            s.fps.record(time);
            if s.world.frame % FPS_LOG_INTERVAL == 0 {
                log::debug!(
                    "ShotBall frame {}: {} fps, {} contacts, {} wall hits",
                    s.world.frame,
                    s.fps.fps(),
                    s.world.contacts,
                    s.world.wall_hits
                );
            }
        })
    };

    let mut listeners = Vec::new();

    {
        let state = state.clone();
        listeners.push(Listener::new(&canvas, "click", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let target = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                state.borrow_mut().input.click = Some(target);
            }
        }));
    }

    listeners.push(Listener::new(&canvas, "contextmenu", |event| {
        event.prevent_default();
    }));

    {
        let state = state.clone();
        let win = window.clone();
        listeners.push(Listener::new(&window, "resize", move |_| {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            s.input.resize = Some(fit_surface(&win, &s.surface));
        }));
    }

    listeners.extend(visibility_listener(&window, &frame_loop));

    frame_loop.start();
    log::info!(
        "ShotBall mounted on '{canvas_id}' ({} bodies)",
        state.borrow().world.bodies.len()
    );

    Ok(ShotBallHandle {
        frame_loop: Some(frame_loop),
        listeners,
    })
}

/// Start ShotBall on `canvas_id`; throws if the canvas or its 2D context is
/// missing, or the settings are malformed
#[wasm_bindgen]
pub fn mount_shotball(canvas_id: &str, settings_json: Option<String>) -> Result<ShotBallHandle, JsValue> {
    mount_shotball_inner(canvas_id, settings_json.as_deref().unwrap_or("")).map_err(|e| {
        log::error!("ShotBall failed to start: {e}");
        js_sys::Error::new(&e.to_string()).into()
    })
}

#[wasm_bindgen]
impl ShotBallHandle {
    pub fn unmount(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            log::info!("ShotBall unmounted after {} frames", frame_loop.frames());
        }
        self.listeners.clear();
    }
}
