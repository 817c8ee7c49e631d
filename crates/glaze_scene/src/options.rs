//! Construction options for containers and buttons.

use std::sync::Arc;

use glaze_core::{Color, ControlParams, Rect, Shape};

use crate::element::ElementId;
use crate::error::SceneError;

/// Invoked synchronously with the button label on pointer activation.
pub type ClickCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Invoked once after the element's first frame has rendered, so hosts
/// can avoid flashing an empty surface.
pub type ReadyCallback = Arc<dyn Fn(ElementId) + Send + Sync>;

/// Options for [`Scene::create_container`](crate::Scene::create_container).
#[derive(Clone)]
pub struct ContainerOptions {
    pub shape: Shape,
    /// Corner radius for the rounded shape, logical pixels
    pub border_radius: f32,
    /// Tint blend factor [0, 1]
    pub tint_opacity: f32,
    pub tint: Color,
    /// Base control parameters; border radius and tint fold in on top
    pub params: ControlParams,
    /// Fallback fill rendered by the host when no snapshot is available
    pub background: Option<Color>,
    /// Restrict the snapshot capture to this page region
    pub capture_region: Option<Rect>,
    pub on_ready: Option<ReadyCallback>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            shape: Shape::Rounded,
            border_radius: 24.0,
            tint_opacity: 0.2,
            tint: Color::WHITE,
            params: ControlParams::default(),
            background: None,
            capture_region: None,
            on_ready: None,
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn border_radius(mut self, radius: f32) -> Self {
        self.border_radius = radius;
        self
    }

    pub fn tint_opacity(mut self, opacity: f32) -> Self {
        self.tint_opacity = opacity;
        self
    }

    pub fn params(mut self, params: ControlParams) -> Self {
        self.params = params;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn capture_region(mut self, region: Rect) -> Self {
        self.capture_region = Some(region);
        self
    }

    pub fn on_ready(mut self, callback: ReadyCallback) -> Self {
        self.on_ready = Some(callback);
        self
    }

    /// Fold shape/tint shorthands into the final control parameters.
    pub(crate) fn resolved_params(&self) -> ControlParams {
        self.params
            .radius(self.border_radius)
            .tinted(self.tint, self.tint_opacity)
    }
}

/// Options for [`Scene::create_button`](crate::Scene::create_button).
#[derive(Clone)]
pub struct ButtonOptions {
    /// Label text; required
    pub text: String,
    /// Label font size in logical pixels
    pub size: f32,
    pub shape: Shape,
    pub tint_opacity: f32,
    pub tint: Color,
    pub params: ControlParams,
    /// Enable the press-warp interaction
    pub warp: bool,
    pub on_click: Option<ClickCallback>,
    pub on_ready: Option<ReadyCallback>,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: 16.0,
            shape: Shape::Pill,
            tint_opacity: 0.25,
            tint: Color::WHITE,
            params: ControlParams::default(),
            warp: true,
            on_click: None,
            on_ready: None,
        }
    }
}

impl ButtonOptions {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn tint_opacity(mut self, opacity: f32) -> Self {
        self.tint_opacity = opacity;
        self
    }

    pub fn params(mut self, params: ControlParams) -> Self {
        self.params = params;
        self
    }

    pub fn warp(mut self, warp: bool) -> Self {
        self.warp = warp;
        self
    }

    pub fn on_click(mut self, callback: ClickCallback) -> Self {
        self.on_click = Some(callback);
        self
    }

    pub fn on_ready(mut self, callback: ReadyCallback) -> Self {
        self.on_ready = Some(callback);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SceneError> {
        if self.text.trim().is_empty() {
            return Err(SceneError::InvalidOptions("button text must not be empty"));
        }
        if self.size <= 0.0 {
            return Err(SceneError::InvalidOptions("button size must be positive"));
        }
        Ok(())
    }

    pub(crate) fn resolved_params(&self) -> ControlParams {
        self.params.tinted(self.tint, self.tint_opacity)
    }
}
