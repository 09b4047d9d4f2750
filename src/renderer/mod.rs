//! Rendering boundary
//!
//! The simulation is drawn from a snapshot taken after each tick. This crate
//! builds the snapshot and GPU-ready instance records; driving a graphics API
//! is left to the frontend.

pub mod instance;
pub mod snapshot;

pub use instance::{Instance, Palette, Scene, as_bytes, build_instances, build_scene};
pub use snapshot::{Camera, CraftView, Hud, ObstacleView, RenderSnapshot};
