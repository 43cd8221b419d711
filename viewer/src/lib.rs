//! Camera, tool and rendering core for the pathing mesh viewer.
//!
//! The crate owns everything between raw host input and a finished draw list:
//! converting pointer positions from screen to world space, maintaining the
//! pan/zoom camera, running the waypoint and ruler tools, and projecting the
//! loaded trapezoid mesh into clip space. Hosts (the native replay binary, or
//! the browser through [`engine::Engine`]) only translate events in and
//! present frames out.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Session context [`engine::EngineCore`] and the browser [`engine::Engine`] |
//! | [`frame_loop`] | Event pump / dirty-gated redraw and the [`frame_loop::Host`] trait |
//! | [`camera`] | Screen, world and clip point types; pan/zoom camera |
//! | [`mesh`] | Trapezoid regions, the mesh view and mesh providers |
//! | [`map_index`] | Selectable maps and their mesh file ids |
//! | [`input`] | Host event types and the gesture state |
//! | [`tools`] | Waypoint path, ruler and the tool state machine |
//! | [`render`] | Pure draw-list construction |
//! | [`canvas2d`] | Paints a frame onto a browser canvas |
//! | [`extract`] | Background archive extraction |
//! | [`consts`] | Shared numeric constants (zoom factors, marker sizes, ring radii) |

pub mod camera;
pub mod canvas2d;
pub mod consts;
pub mod engine;
pub mod extract;
pub mod frame_loop;
pub mod input;
pub mod map_index;
pub mod mesh;
pub mod render;
pub mod tools;
