use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, ScreenPoint, WorldPoint, ZoomDirection};
use crate::canvas2d;
use crate::consts::{DEFAULT_SCALE, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::extract::{ExtractError, Extraction};
use crate::frame_loop::{self, Host, Tick};
use crate::input::{Button, InputEvent, InputState, Key, UiCommand};
use crate::map_index::MapRecord;
use crate::mesh::{InlineMeshProvider, MeshLoadError, MeshProvider, MeshView};
use crate::render::{self, Frame, RenderOptions};
use crate::tools::{ToolError, ToolKind, ToolState};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State visible in the next frame changed.
    RenderNeeded,
    /// A UI command referenced a waypoint that does not exist.
    Rejected(ToolError),
    /// The host asked to close the viewer.
    Quit,
}

/// Initial viewport and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { width: DEFAULT_VIEWPORT_WIDTH, height: DEFAULT_VIEWPORT_HEIGHT, scale: DEFAULT_SCALE }
    }
}

/// Ruler readout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RulerInfo {
    pub start: WorldPoint,
    pub end: WorldPoint,
    pub distance: f64,
}

/// Snapshot of the values a host info panel displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewInfo {
    /// World position under the last known pointer.
    pub cursor: Option<WorldPoint>,
    pub translate: WorldPoint,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub aspect: f64,
    pub file_id: Option<u32>,
    pub regions: usize,
    pub max_plane: i32,
    pub tool: ToolKind,
    pub waypoints: usize,
    pub waypoint_distance: f64,
    pub selected_waypoint: Option<usize>,
    pub ruler: RulerInfo,
    pub wireframe: bool,
    pub range_rings: bool,
    pub extracting: bool,
}

/// Core engine state: the single session context for one viewer.
///
/// Everything the frame loop mutates lives here and is passed explicitly.
/// Separated from `Engine` so it can be tested without a browser.
#[derive(Debug)]
pub struct EngineCore {
    pub camera: Camera,
    pub mesh: MeshView,
    pub tools: ToolState,
    pub input: InputState,
    pub options: RenderOptions,
    pointer: Option<ScreenPoint>,
    file_id: Option<u32>,
    extraction: Option<Extraction>,
    dirty: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            camera: Camera::new(config.width, config.height, config.scale),
            mesh: MeshView::new(),
            tools: ToolState::new(),
            input: InputState::default(),
            options: RenderOptions::default(),
            pointer: None,
            file_id: None,
            extraction: None,
            dirty: true,
        }
    }

    // --- Data inputs ---

    /// Load the mesh for `file_id` from `provider`, replacing the current map.
    ///
    /// Waypoints and the waypoint selection are cleared; ruler points are kept.
    /// On failure the mesh view is emptied and the viewer stays usable.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`MeshLoadError`] so the caller can surface it.
    pub fn select_map<P>(&mut self, provider: &P, file_id: u32) -> Result<usize, MeshLoadError>
    where
        P: MeshProvider + ?Sized,
    {
        let loaded = provider.load(file_id);
        self.tools.clear_waypoints();
        self.file_id = Some(file_id);
        self.dirty = true;

        match loaded {
            Ok(regions) => {
                let count = regions.len();
                self.mesh.load(regions);
                tracing::info!(file_id, regions = count, max_plane = self.mesh.max_plane(), "map loaded");
                Ok(count)
            }
            Err(e) => {
                self.mesh.load(Vec::new());
                tracing::warn!(file_id, error = %e, "map load failed");
                Err(e)
            }
        }
    }

    /// Select `record`'s mesh and centre the view on its spawn point.
    ///
    /// The view is centred even when the mesh fails to load.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`MeshLoadError`], as [`Self::select_map`].
    pub fn select_map_record<P>(&mut self, provider: &P, record: &MapRecord) -> Result<usize, MeshLoadError>
    where
        P: MeshProvider + ?Sized,
    {
        self.centre_on(record.spawn);
        tracing::debug!(map_id = record.map_id, name = %record.name, "map selected from index");
        self.select_map(provider, record.file_id)
    }

    /// Pan so that `world` sits at the viewport centre. Scale is unchanged.
    pub fn centre_on(&mut self, world: WorldPoint) {
        self.camera.set_translate(WorldPoint::new(-world.x, -world.y));
        self.dirty = true;
    }

    /// Start tracking a background extraction. Input is ignored until it finishes.
    pub fn begin_extraction(&mut self, extraction: Extraction) {
        self.extraction = Some(extraction);
        self.input = InputState::Idle;
        self.dirty = true;
    }

    /// Whether an extraction is still running.
    #[must_use]
    pub fn is_extracting(&self) -> bool {
        self.extraction.as_ref().is_some_and(|e| !e.is_finished())
    }

    /// Collect a finished extraction, if any. Never blocks on a running one.
    pub fn poll_extraction(&mut self) -> Option<Result<(), ExtractError>> {
        if !self.extraction.as_ref().is_some_and(Extraction::is_finished) {
            return None;
        }
        let extraction = self.extraction.take()?;
        self.dirty = true;
        Some(extraction.join())
    }

    // --- Input ---

    /// Apply one host event.
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Action> {
        if self.is_extracting() && !matches!(event, InputEvent::Resize { .. } | InputEvent::Quit) {
            return Vec::new();
        }

        let changed = match event {
            InputEvent::PointerDown { at, button } => self.on_pointer_down(at, button),
            InputEvent::PointerMove { at } => self.on_pointer_move(at),
            InputEvent::PointerUp { at, button } => self.on_pointer_up(at, button),
            InputEvent::Wheel { dy } => self.on_wheel(dy),
            InputEvent::Resize { width, height } => self.on_resize(width, height),
            InputEvent::KeyDown { .. } => false,
            InputEvent::KeyUp { key } => self.on_key_up(&key),
            InputEvent::Ui(command) => return self.apply_command(command),
            InputEvent::Quit => return vec![Action::Quit],
        };
        self.changed(changed)
    }

    /// Apply a UI command.
    pub fn apply_command(&mut self, command: UiCommand) -> Vec<Action> {
        let result = match command {
            UiCommand::SelectTool { tool } => {
                self.set_tool(tool);
                Ok(true)
            }
            UiCommand::ClearWaypoints => {
                self.tools.clear_waypoints();
                Ok(true)
            }
            UiCommand::SelectWaypoint { index } => self.tools.select_waypoint(index).map(|()| true),
            UiCommand::DeleteWaypoint { index } => self.tools.delete_waypoint(index).map(|_| true),
            UiCommand::ToggleWireframe => {
                self.options.wireframe = !self.options.wireframe;
                Ok(true)
            }
            UiCommand::ToggleRangeRings => {
                self.options.range_rings = !self.options.range_rings;
                Ok(true)
            }
        };

        match result {
            Ok(changed) => self.changed(changed),
            Err(e) => {
                tracing::warn!(error = %e, ?command, "ui command rejected");
                vec![Action::Rejected(e)]
            }
        }
    }

    /// Switch the active tool. Tool data is kept.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.input == InputState::Measuring {
            self.input = InputState::Idle;
        }
        self.tools.set_active(tool);
        tracing::debug!(?tool, "tool selected");
    }

    fn on_pointer_down(&mut self, at: ScreenPoint, button: Button) -> bool {
        self.pointer = Some(at);
        match button {
            Button::Primary => {
                self.input = InputState::Panning { last_screen: at };
                false
            }
            Button::Secondary => {
                let world = self.camera.screen_to_world(at);
                let changed = self.tools.pointer_down(world, button);
                if self.tools.active() == ToolKind::Ruler && self.input == InputState::Idle {
                    self.input = InputState::Measuring;
                }
                changed
            }
            Button::Middle => false,
        }
    }

    fn on_pointer_move(&mut self, at: ScreenPoint) -> bool {
        self.pointer = Some(at);
        let changed = match self.input {
            InputState::Idle => false,
            InputState::Panning { last_screen } => {
                self.camera.pan(at - last_screen);
                self.input = InputState::Panning { last_screen: at };
                true
            }
            InputState::Measuring => {
                let world = self.camera.screen_to_world(at);
                self.tools.measure_to(world)
            }
        };
        changed || self.options.range_rings
    }

    fn on_pointer_up(&mut self, at: ScreenPoint, button: Button) -> bool {
        self.pointer = Some(at);
        match button {
            Button::Primary => {
                if matches!(self.input, InputState::Panning { .. }) {
                    self.input = InputState::Idle;
                }
                false
            }
            Button::Secondary => {
                let world = self.camera.screen_to_world(at);
                if self.input == InputState::Measuring {
                    self.input = InputState::Idle;
                }
                self.tools.pointer_up(world, button)
            }
            Button::Middle => false,
        }
    }

    fn on_wheel(&mut self, dy: f64) -> bool {
        let Some(direction) = ZoomDirection::from_wheel(dy) else {
            return false;
        };
        self.camera.zoom(direction);
        true
    }

    fn on_resize(&mut self, width: f64, height: f64) -> bool {
        if width <= 0.0 || height <= 0.0 {
            tracing::warn!(width, height, "ignoring degenerate viewport");
            return false;
        }
        self.camera.resize(width, height);
        tracing::debug!(width, height, aspect = self.camera.aspect(), "viewport resized");
        true
    }

    fn on_key_up(&mut self, key: &Key) -> bool {
        if key.is_space() {
            self.options.wireframe = !self.options.wireframe;
            true
        } else if key.is_c() {
            self.options.range_rings = !self.options.range_rings;
            true
        } else {
            false
        }
    }

    fn changed(&mut self, changed: bool) -> Vec<Action> {
        if changed {
            self.dirty = true;
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Render ---

    /// Whether a redraw is pending.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Build the frame for the current state.
    #[must_use]
    pub fn render(&self) -> Frame {
        if self.is_extracting() {
            return Frame::status_only(crate::consts::EXTRACTION_STATUS);
        }
        render::build_frame(&self.camera, &self.mesh, &self.tools, self.options, self.pointer_world())
    }

    // --- Queries ---

    /// World position under the last known pointer, through the current camera.
    #[must_use]
    pub fn pointer_world(&self) -> Option<WorldPoint> {
        self.pointer.map(|p| self.camera.screen_to_world(p))
    }

    /// Waypoints as clipboard text, one `X, Y` line each.
    #[must_use]
    pub fn waypoints_clipboard_text(&self) -> String {
        self.tools.waypoints().to_clipboard_text()
    }

    /// Mesh file id of the selected map.
    #[must_use]
    pub fn file_id(&self) -> Option<u32> {
        self.file_id
    }

    #[must_use]
    pub fn info(&self) -> ViewInfo {
        let ruler = self.tools.ruler();
        ViewInfo {
            cursor: self.pointer_world(),
            translate: self.camera.translate(),
            width: self.camera.width(),
            height: self.camera.height(),
            scale: self.camera.scale(),
            aspect: self.camera.aspect(),
            file_id: self.file_id,
            regions: self.mesh.len(),
            max_plane: self.mesh.max_plane(),
            tool: self.tools.active(),
            waypoints: self.tools.waypoints().len(),
            waypoint_distance: self.tools.waypoints().length(),
            selected_waypoint: self.tools.selected(),
            ruler: RulerInfo { start: ruler.start, end: ruler.end, distance: ruler.distance() },
            wireframe: self.options.wireframe,
            range_rings: self.options.range_rings,
            extracting: self.is_extracting(),
        }
    }
}

// =============================================================
// Browser engine
// =============================================================

/// Canvas-backed [`Host`]: queues DOM events and paints frames.
struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    queue: Vec<InputEvent>,
}

impl Host for CanvasSurface {
    type Error = JsValue;

    fn poll_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.queue)
    }

    fn present(&mut self, frame: &Frame) -> Result<(), JsValue> {
        canvas2d::paint(&self.ctx, frame, f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The full viewer engine. Wraps `EngineCore` and owns the browser canvas element.
///
/// JavaScript drives it: DOM handlers call `pushEvent` with the JSON form of
/// an [`InputEvent`], and `requestAnimationFrame` calls `onAnimationFrame`.
#[wasm_bindgen]
pub struct Engine {
    surface: CanvasSurface,
    #[wasm_bindgen(skip)]
    pub core: EngineCore,
}

#[wasm_bindgen]
impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<Engine, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let config = ViewerConfig {
            width: f64::from(canvas.width().max(1)),
            height: f64::from(canvas.height().max(1)),
            ..ViewerConfig::default()
        };
        Ok(Self { surface: CanvasSurface { canvas, ctx, queue: Vec::new() }, core: EngineCore::new(config) })
    }

    /// Queue a JSON-encoded [`InputEvent`] for the next animation frame.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `json` is not a valid event.
    #[wasm_bindgen(js_name = pushEvent)]
    pub fn push_event(&mut self, json: &str) -> Result<(), JsValue> {
        let event: InputEvent = serde_json::from_str(json).map_err(js_error)?;
        self.queue_event(event);
        Ok(())
    }

    /// Resize the backing store and queue the matching resize event.
    #[wasm_bindgen(js_name = setViewport)]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.surface.canvas.set_width(width.round() as u32);
            self.surface.canvas.set_height(height.round() as u32);
        }
        self.queue_event(InputEvent::Resize { width, height });
    }

    /// Run one frame-loop iteration. Call from `requestAnimationFrame`.
    ///
    /// Returns `false` once the viewer has been asked to quit.
    ///
    /// # Errors
    ///
    /// Returns `Err` if painting the canvas fails.
    #[wasm_bindgen(js_name = onAnimationFrame)]
    pub fn on_animation_frame(&mut self) -> Result<bool, JsValue> {
        let tick = frame_loop::tick(&mut self.core, &mut self.surface)?;
        Ok(!matches!(tick, Tick::Quit))
    }

    /// Load map `file_id` from a JSON array of trapezoid records fetched by the page.
    ///
    /// # Errors
    ///
    /// Returns `Err` with the load error; the scene is left empty.
    #[wasm_bindgen(js_name = loadMap)]
    pub fn load_map(&mut self, file_id: u32, json: &str) -> Result<usize, JsValue> {
        self.core.select_map(&InlineMeshProvider::new(file_id, json), file_id).map_err(js_error)
    }

    #[wasm_bindgen(js_name = waypointsClipboardText)]
    pub fn waypoints_clipboard_text(&self) -> String {
        self.core.waypoints_clipboard_text()
    }

    /// The [`ViewInfo`] snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails.
    #[wasm_bindgen(js_name = infoJson)]
    pub fn info_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.core.info()).map_err(js_error)
    }
}

impl Engine {
    /// Queue an event for the next animation frame.
    pub fn queue_event(&mut self, event: InputEvent) {
        self.surface.queue.push(event);
    }
}
