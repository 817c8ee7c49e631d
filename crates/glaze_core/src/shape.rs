//! Glass surface shapes.
//!
//! Every glass element is masked by one of three outlines. The mask is
//! evaluated in the fragment shader as a rounded-rect SDF, so circle and
//! pill are expressed as corner-radius choices rather than separate
//! distance fields. The rounded variant takes its radius from
//! [`ControlParams::corner_radius`](crate::params::ControlParams).

use crate::geometry::Size;

/// Outline of a glass surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shape {
    /// Rounded rectangle, radius supplied by the control parameters
    #[default]
    Rounded,
    /// Circle (radius = half the smaller side)
    Circle,
    /// Pill / capsule (radius = half the height)
    Pill,
}

impl Shape {
    /// Shader-side shape id. Must match the `SHAPE_*` constants in the
    /// WGSL sources.
    pub fn kind_id(self) -> u32 {
        match self {
            Shape::Rounded => 0,
            Shape::Circle => 1,
            Shape::Pill => 2,
        }
    }

    /// Resolve the effective corner radius against the element's size.
    ///
    /// A radius can never exceed half the smaller side; circle and pill
    /// derive their radius from the size alone and ignore `radius`.
    pub fn corner_radius(self, size: Size, radius: f32) -> f32 {
        let cap = size.min_side() * 0.5;
        match self {
            Shape::Rounded => radius.max(0.0).min(cap),
            Shape::Circle => cap,
            Shape::Pill => (size.height * 0.5).min(cap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_resolution() {
        let size = Size::new(400.0, 200.0);
        assert_eq!(Shape::Rounded.corner_radius(size, 24.0), 24.0);
        // Radius caps at half the smaller side
        assert_eq!(Shape::Rounded.corner_radius(size, 500.0), 100.0);
        assert_eq!(Shape::Circle.corner_radius(size, 0.0), 100.0);
        assert_eq!(Shape::Pill.corner_radius(size, 0.0), 100.0);
        // Pill on a tall element rounds by height, capped by width
        assert_eq!(Shape::Pill.corner_radius(Size::new(40.0, 200.0), 0.0), 20.0);
    }

    #[test]
    fn negative_radius_clamps_to_zero() {
        assert_eq!(Shape::Rounded.corner_radius(Size::new(100.0, 100.0), -10.0), 0.0);
    }
}
