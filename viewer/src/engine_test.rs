#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;
use crate::mesh::{Trapezoid, TrapezoidRecord};
use crate::render::DrawCommand;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

/// In-memory provider. Ids not in the map are `NotFound`.
struct MemProvider {
    maps: HashMap<u32, Vec<Trapezoid>>,
}

impl MemProvider {
    fn with(file_id: u32, planes: &[i32]) -> Self {
        let regions = planes
            .iter()
            .map(|&plane| {
                Trapezoid::from(TrapezoidRecord { xtl: 0.0, xtr: 10.0, yt: 10.0, xbl: 0.0, xbr: 10.0, yb: 0.0, plane })
            })
            .collect();
        Self { maps: HashMap::from([(file_id, regions)]) }
    }
}

impl MeshProvider for MemProvider {
    fn load(&self, file_id: u32) -> Result<Vec<Trapezoid>, MeshLoadError> {
        self.maps.get(&file_id).cloned().ok_or(MeshLoadError::NotFound(file_id))
    }
}

fn sp(x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

fn down(at: ScreenPoint, button: Button) -> InputEvent {
    InputEvent::PointerDown { at, button }
}

fn up(at: ScreenPoint, button: Button) -> InputEvent {
    InputEvent::PointerUp { at, button }
}

fn mv(at: ScreenPoint) -> InputEvent {
    InputEvent::PointerMove { at }
}

fn key_up(name: &str) -> InputEvent {
    InputEvent::KeyUp { key: Key(name.to_owned()) }
}

fn ui(command: UiCommand) -> InputEvent {
    InputEvent::Ui(command)
}

/// Unit-scale square viewport so world and screen are easy to relate.
fn unit_core() -> EngineCore {
    EngineCore::new(ViewerConfig { width: 800.0, height: 800.0, scale: 1.0 })
}

fn with_tool(tool: ToolKind) -> EngineCore {
    let mut core = unit_core();
    core.set_tool(tool);
    core
}

/// Right-click at the screen position of world point `p`.
fn right_click_world(core: &mut EngineCore, p: WorldPoint) {
    let at = core.camera.world_to_screen(p);
    core.handle_event(down(at, Button::Secondary));
    core.handle_event(up(at, Button::Secondary));
}

fn renders(actions: &[Action]) -> bool {
    actions.contains(&Action::RenderNeeded)
}

fn near(a: WorldPoint, b: WorldPoint) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_core_defaults() {
    let core = EngineCore::default();
    assert_eq!(core.camera, Camera::default());
    assert_eq!(core.tools.active(), ToolKind::None);
    assert_eq!(core.input, InputState::Idle);
    assert!(core.mesh.is_empty());
    assert!(core.is_dirty());
    assert!(core.file_id().is_none());
    assert!(!core.is_extracting());
}

#[test]
fn take_dirty_clears_flag() {
    let mut core = unit_core();
    assert!(core.take_dirty());
    assert!(!core.take_dirty());
    assert!(!core.is_dirty());
}

// =============================================================
// Ruler
// =============================================================

#[test]
fn ruler_click_at_screen_centre_hits_world_origin() {
    let mut core = EngineCore::new(ViewerConfig { width: 800.0, height: 500.0, scale: 0.0001 });
    core.set_tool(ToolKind::Ruler);
    core.handle_event(down(sp(400.0, 250.0), Button::Secondary));
    core.handle_event(up(sp(400.0, 250.0), Button::Secondary));
    assert!(near(core.tools.ruler().start, WorldPoint::new(0.0, 0.0)));
}

#[test]
fn ruler_drag_measures_between_press_and_release() {
    let mut core = with_tool(ToolKind::Ruler);
    let a = core.camera.world_to_screen(WorldPoint::new(0.0, 0.0));
    let mid = core.camera.world_to_screen(WorldPoint::new(1.0, 1.0));
    let b = core.camera.world_to_screen(WorldPoint::new(3.0, 4.0));

    assert!(renders(&core.handle_event(down(a, Button::Secondary))));
    assert_eq!(core.input, InputState::Measuring);

    assert!(renders(&core.handle_event(mv(mid))));
    assert!(near(core.tools.ruler().end, WorldPoint::new(1.0, 1.0)));

    core.handle_event(up(b, Button::Secondary));
    assert_eq!(core.input, InputState::Idle);
    assert!((core.tools.ruler().distance() - 5.0).abs() < EPSILON);
}

#[test]
fn secondary_click_without_tool_changes_nothing() {
    let mut core = unit_core();
    core.take_dirty();
    assert!(core.handle_event(down(sp(10.0, 10.0), Button::Secondary)).is_empty());
    assert!(core.handle_event(up(sp(10.0, 10.0), Button::Secondary)).is_empty());
    assert!(core.tools.waypoints().is_empty());
    assert!(!core.is_dirty());
}

// =============================================================
// Waypoints
// =============================================================

#[test]
fn waypoint_clicks_accumulate_length() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    right_click_world(&mut core, WorldPoint::new(0.0, 0.0));
    right_click_world(&mut core, WorldPoint::new(3.0, 4.0));

    let path = core.tools.waypoints();
    assert_eq!(path.len(), 2);
    assert!((path.length() - 5.0).abs() < EPSILON);
    assert!(near(path.points()[1], WorldPoint::new(3.0, 4.0)));
}

#[test]
fn waypoint_appended_on_release_not_press() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    core.handle_event(down(sp(100.0, 100.0), Button::Secondary));
    assert!(core.tools.waypoints().is_empty());
    core.handle_event(up(sp(100.0, 100.0), Button::Secondary));
    assert_eq!(core.tools.waypoints().len(), 1);
}

#[test]
fn waypoint_lands_at_clicked_world_position_after_pan_and_zoom() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    core.handle_event(InputEvent::Wheel { dy: 1.0 });
    core.handle_event(down(sp(100.0, 100.0), Button::Primary));
    core.handle_event(mv(sp(160.0, 70.0)));
    core.handle_event(up(sp(160.0, 70.0), Button::Primary));
    core.handle_event(InputEvent::Resize { width: 1024.0, height: 600.0 });

    let target = WorldPoint::new(-0.75, 0.4);
    right_click_world(&mut core, target);
    assert!(near(core.tools.waypoints().points()[0], target));
}

#[test]
fn clear_and_delete_commands() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    for i in 0..5 {
        right_click_world(&mut core, WorldPoint::new(f64::from(i), 0.0));
    }
    assert!(renders(&core.handle_event(ui(UiCommand::SelectWaypoint { index: 3 }))));
    core.handle_event(ui(UiCommand::DeleteWaypoint { index: 1 }));
    assert_eq!(core.tools.selected(), Some(2));
    assert!((core.tools.waypoints().length() - core.tools.waypoints().recomputed_length()).abs() < EPSILON);

    core.handle_event(ui(UiCommand::ClearWaypoints));
    assert!(core.tools.waypoints().is_empty());
    assert_eq!(core.tools.waypoints().length(), 0.0);
    assert_eq!(core.tools.selected(), None);
}

#[test]
fn out_of_range_commands_are_rejected() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    right_click_world(&mut core, WorldPoint::new(0.0, 0.0));
    core.take_dirty();

    let actions = core.handle_event(ui(UiCommand::DeleteWaypoint { index: 4 }));
    assert_eq!(actions, vec![Action::Rejected(ToolError::IndexOutOfRange { index: 4, len: 1 })]);
    let actions = core.handle_event(ui(UiCommand::SelectWaypoint { index: 1 }));
    assert!(matches!(actions[0], Action::Rejected(_)));

    assert_eq!(core.tools.waypoints().len(), 1);
    assert!(!core.is_dirty());
}

#[test]
fn clipboard_text_comes_from_waypoints() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    right_click_world(&mut core, WorldPoint::new(0.0, 0.0));
    assert_eq!(core.waypoints_clipboard_text(), "000.00, 000.00\n");
}

// =============================================================
// Tool switching
// =============================================================

#[test]
fn tool_switch_keeps_waypoints_and_ruler() {
    let mut core = with_tool(ToolKind::WaypointBuilder);
    right_click_world(&mut core, WorldPoint::new(1.0, 1.0));
    core.handle_event(ui(UiCommand::SelectTool { tool: ToolKind::Ruler }));
    right_click_world(&mut core, WorldPoint::new(2.0, 2.0));
    core.handle_event(ui(UiCommand::SelectTool { tool: ToolKind::WaypointBuilder }));

    assert_eq!(core.tools.waypoints().len(), 1);
    assert!(near(core.tools.ruler().start, WorldPoint::new(2.0, 2.0)));
}

#[test]
fn switching_tool_mid_measurement_ends_it() {
    let mut core = with_tool(ToolKind::Ruler);
    core.handle_event(down(sp(10.0, 10.0), Button::Secondary));
    assert_eq!(core.input, InputState::Measuring);
    core.set_tool(ToolKind::None);
    assert_eq!(core.input, InputState::Idle);
}

// =============================================================
// Pan / zoom / resize
// =============================================================

#[test]
fn primary_drag_pans_under_every_tool() {
    for tool in [ToolKind::None, ToolKind::WaypointBuilder, ToolKind::Ruler] {
        let mut core = with_tool(tool);
        let grab = sp(300.0, 500.0);
        let grabbed = core.camera.screen_to_world(grab);

        core.handle_event(down(grab, Button::Primary));
        assert!(renders(&core.handle_event(mv(sp(320.0, 480.0)))));
        assert!(renders(&core.handle_event(mv(sp(350.0, 450.0)))));
        core.handle_event(up(sp(350.0, 450.0), Button::Primary));

        assert!(near(core.camera.screen_to_world(sp(350.0, 450.0)), grabbed), "{tool:?}");
        assert_eq!(core.input, InputState::Idle);
        assert!(core.tools.waypoints().is_empty());
    }
}

#[test]
fn move_without_button_does_not_pan() {
    let mut core = unit_core();
    core.take_dirty();
    assert!(core.handle_event(mv(sp(50.0, 50.0))).is_empty());
    assert_eq!(core.camera.translate(), WorldPoint::default());
}

#[test]
fn wheel_zooms() {
    let mut core = unit_core();
    core.handle_event(InputEvent::Wheel { dy: 1.0 });
    assert_eq!(core.camera.scale(), 1.25);
    core.handle_event(InputEvent::Wheel { dy: -1.0 });
    assert!((core.camera.scale() - 1.0).abs() < EPSILON);
}

#[test]
fn horizontal_only_wheel_is_ignored() {
    let mut core = unit_core();
    assert!(core.handle_event(InputEvent::Wheel { dy: 0.0 }).is_empty());
    assert_eq!(core.camera.scale(), 1.0);
}

#[test]
fn resize_updates_camera() {
    let mut core = unit_core();
    assert!(renders(&core.handle_event(InputEvent::Resize { width: 1200.0, height: 600.0 })));
    assert_eq!(core.camera.width(), 1200.0);
    assert_eq!(core.camera.aspect(), 2.0);
}

#[test]
fn degenerate_resize_is_ignored() {
    let mut core = unit_core();
    core.take_dirty();
    assert!(core.handle_event(InputEvent::Resize { width: 800.0, height: 0.0 }).is_empty());
    assert!(core.handle_event(InputEvent::Resize { width: -5.0, height: 100.0 }).is_empty());
    assert_eq!(core.camera.height(), 800.0);
    assert_eq!(core.camera.aspect(), 1.0);
}

// =============================================================
// Keys and options
// =============================================================

#[test]
fn space_toggles_wireframe_on_key_up() {
    let mut core = unit_core();
    assert!(core.handle_event(InputEvent::KeyDown { key: Key("Space".to_owned()) }).is_empty());
    assert!(!core.options.wireframe);
    assert!(renders(&core.handle_event(key_up("Space"))));
    assert!(core.options.wireframe);
    core.handle_event(key_up(" "));
    assert!(!core.options.wireframe);
}

#[test]
fn c_toggles_range_rings() {
    let mut core = unit_core();
    core.handle_event(key_up("c"));
    assert!(core.options.range_rings);
    core.handle_event(ui(UiCommand::ToggleRangeRings));
    assert!(!core.options.range_rings);
}

#[test]
fn other_keys_do_nothing() {
    let mut core = unit_core();
    assert!(core.handle_event(key_up("q")).is_empty());
}

#[test]
fn pointer_move_redraws_only_when_rings_visible() {
    let mut core = unit_core();
    assert!(core.handle_event(mv(sp(10.0, 10.0))).is_empty());
    core.handle_event(ui(UiCommand::ToggleRangeRings));
    assert!(renders(&core.handle_event(mv(sp(20.0, 20.0)))));
}

#[test]
fn range_rings_follow_pointer_world_position() {
    let mut core = unit_core();
    core.handle_event(ui(UiCommand::ToggleRangeRings));
    core.handle_event(mv(sp(600.0, 200.0)));

    let expected = core.camera.screen_to_world(sp(600.0, 200.0));
    assert!(near(core.pointer_world().unwrap(), expected));

    let frame = core.render();
    let dot = frame.commands.iter().find_map(|c| match c {
        DrawCommand::Point { at, .. } => Some(*at),
        _ => None,
    });
    assert_eq!(dot, Some(core.camera.world_to_clip(expected)));
}

// =============================================================
// Map selection
// =============================================================

#[test]
fn select_map_loads_regions_and_clears_waypoints_only() {
    let provider = MemProvider::with(42, &[0, 1, 3, 0]);
    let mut core = with_tool(ToolKind::WaypointBuilder);
    right_click_world(&mut core, WorldPoint::new(1.0, 1.0));
    core.handle_event(ui(UiCommand::SelectWaypoint { index: 0 }));
    core.set_tool(ToolKind::Ruler);
    right_click_world(&mut core, WorldPoint::new(5.0, 5.0));
    core.take_dirty();

    assert_eq!(core.select_map(&provider, 42).unwrap(), 4);
    assert_eq!(core.mesh.len(), 4);
    assert_eq!(core.mesh.max_plane(), 3);
    assert_eq!(core.file_id(), Some(42));
    assert!(core.tools.waypoints().is_empty());
    assert_eq!(core.tools.selected(), None);
    assert!(near(core.tools.ruler().start, WorldPoint::new(5.0, 5.0)));
    assert!(core.is_dirty());
}

#[test]
fn failed_map_load_leaves_usable_empty_scene() {
    let provider = MemProvider::with(42, &[0, 2]);
    let mut core = unit_core();
    core.select_map(&provider, 42).unwrap();

    let err = core.select_map(&provider, 7).unwrap_err();
    assert!(matches!(err, MeshLoadError::NotFound(7)));
    assert!(core.mesh.is_empty());
    assert_eq!(core.mesh.max_plane(), 1);

    core.handle_event(down(sp(0.0, 0.0), Button::Primary));
    core.handle_event(mv(sp(80.0, 0.0)));
    assert!(core.camera.translate().x > 0.0);
    assert!(core.render().commands.is_empty());
}

#[test]
fn select_map_through_trait_object() {
    let provider: Box<dyn MeshProvider> = Box::new(MemProvider::with(1, &[0]));
    let mut core = unit_core();
    assert_eq!(core.select_map(provider.as_ref(), 1).unwrap(), 1);
}

// =============================================================
// Rendering and info
// =============================================================

#[test]
fn render_draws_loaded_mesh() {
    let provider = MemProvider::with(1, &[0, 1]);
    let mut core = unit_core();
    core.select_map(&provider, 1).unwrap();
    let frame = core.render();
    assert_eq!(frame.commands.len(), 2);
    assert!(frame.status.is_none());
}

#[test]
fn info_reports_session_state() {
    let provider = MemProvider::with(9, &[0, 2]);
    let mut core = with_tool(ToolKind::WaypointBuilder);
    core.select_map(&provider, 9).unwrap();
    right_click_world(&mut core, WorldPoint::new(0.0, 0.0));
    right_click_world(&mut core, WorldPoint::new(3.0, 4.0));

    let info = core.info();
    assert_eq!(info.file_id, Some(9));
    assert_eq!(info.regions, 2);
    assert_eq!(info.max_plane, 2);
    assert_eq!(info.tool, ToolKind::WaypointBuilder);
    assert_eq!(info.waypoints, 2);
    assert!((info.waypoint_distance - 5.0).abs() < EPSILON);
    assert_eq!(info.scale, 1.0);
    assert_eq!(info.aspect, 1.0);
    assert!(info.cursor.is_some());
    assert!(!info.extracting);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["tool"], "waypoint_builder");
}

// =============================================================
// Extraction
// =============================================================

#[cfg(unix)]
#[test]
fn extraction_blocks_input_and_rendering_until_finished() {
    use std::process::Command;
    use std::time::{Duration, Instant};

    let mut core = with_tool(ToolKind::WaypointBuilder);
    let mut command = Command::new("sleep");
    command.arg("0.3");
    core.begin_extraction(Extraction::spawn(command));

    assert!(core.is_extracting());
    assert!(core.info().extracting);
    assert!(core.handle_event(up(sp(10.0, 10.0), Button::Secondary)).is_empty());
    assert!(core.tools.waypoints().is_empty());
    assert!(renders(&core.handle_event(InputEvent::Resize { width: 640.0, height: 480.0 })));
    assert_eq!(core.render().status.as_deref(), Some(crate::consts::EXTRACTION_STATUS));
    assert!(core.poll_extraction().is_none());

    let deadline = Instant::now() + Duration::from_secs(10);
    while core.is_extracting() {
        assert!(Instant::now() < deadline, "extraction did not finish");
        std::thread::sleep(Duration::from_millis(10));
    }
    core.poll_extraction().unwrap().unwrap();
    assert!(core.poll_extraction().is_none());

    core.handle_event(up(sp(10.0, 10.0), Button::Secondary));
    assert_eq!(core.tools.waypoints().len(), 1);
    assert!(core.render().status.is_none());
}

#[test]
fn panicked_extraction_is_collected_and_unblocks_input() {
    use std::time::{Duration, Instant};

    let mut core = with_tool(ToolKind::WaypointBuilder);
    core.begin_extraction(Extraction::start(|| panic!("extractor worker blew up")));

    let deadline = Instant::now() + Duration::from_secs(10);
    while core.is_extracting() {
        assert!(Instant::now() < deadline, "extraction never reported completion");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(matches!(core.poll_extraction(), Some(Err(ExtractError::ThreadPanicked))));

    core.handle_event(up(sp(10.0, 10.0), Button::Secondary));
    assert_eq!(core.tools.waypoints().len(), 1);
}

// =============================================================
// Spawn centring
// =============================================================

#[test]
fn centre_on_puts_point_at_viewport_centre() {
    let mut core = EngineCore::new(ViewerConfig { width: 800.0, height: 500.0, scale: 0.0001 });
    core.take_dirty();
    core.centre_on(WorldPoint::new(1200.0, -350.0));
    assert!(core.is_dirty());
    assert!(near(core.camera.screen_to_world(sp(400.0, 250.0)), WorldPoint::new(1200.0, -350.0)));
    assert_eq!(core.camera.scale(), 0.0001);
}

#[test]
fn select_map_record_loads_mesh_and_centres_on_spawn() {
    let provider = MemProvider::with(42, &[0, 1]);
    let record = MapRecord { map_id: 3, name: "Harbor".to_owned(), file_id: 42, spawn: WorldPoint::new(10.0, 20.0) };
    let mut core = unit_core();

    assert_eq!(core.select_map_record(&provider, &record).unwrap(), 2);
    assert_eq!(core.file_id(), Some(42));
    assert!(near(core.camera.screen_to_world(sp(400.0, 400.0)), record.spawn));
}

#[test]
fn select_map_record_centres_even_when_mesh_is_missing() {
    let provider = MemProvider::with(42, &[0]);
    let record = MapRecord { map_id: 4, name: "Void".to_owned(), file_id: 9, spawn: WorldPoint::new(-5.0, 5.0) };
    let mut core = unit_core();

    assert!(matches!(core.select_map_record(&provider, &record), Err(MeshLoadError::NotFound(9))));
    assert!(core.mesh.is_empty());
    assert!(near(core.camera.screen_to_world(sp(400.0, 400.0)), record.spawn));
}
