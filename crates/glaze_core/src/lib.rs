//! Glaze Core
//!
//! Shared vocabulary for the Glaze liquid-glass rendering engine:
//!
//! - **Geometry**: points, sizes, rectangles in logical and physical pixels
//! - **Control Parameters**: the flat knob set driving blur, refraction,
//!   lighting and tint, clamped into valid ranges on every mutation
//! - **Shapes**: the rounded / circle / pill alpha-mask variants
//! - **Liveness**: cancellation tokens guarding async continuations
//! - **Configuration**: engine-wide tuning (scale factor, settle delays)

pub mod color;
pub mod config;
pub mod geometry;
pub mod liveness;
pub mod params;
pub mod shape;

pub use color::Color;
pub use config::EngineConfig;
pub use geometry::{PhysicalSize, Point, Rect, Size, Vec2};
pub use liveness::{Liveness, LivenessToken};
pub use params::ControlParams;
pub use shape::Shape;
