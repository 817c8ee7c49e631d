//! Glaze Scene Graph
//!
//! The renderable side of the engine: glass elements (containers and
//! buttons), the nesting graph that lets a child sample its parent's
//! rendered output, and the per-frame scheduling that keeps geometry,
//! snapshot sub-rectangles, and uniforms in sync.
//!
//! Hosts create elements through [`Scene`], hand them a
//! [`ContentProbe`] so the engine can re-measure on layout changes,
//! mount them asynchronously (snapshot capture is the only suspension
//! point), and composite each element's render target into their own
//! layout once the ready notification fires.

pub mod element;
pub mod error;
pub mod options;
pub mod probe;
pub mod scene;

pub use element::{ElementId, ElementKind, GlassElement};
pub use error::SceneError;
pub use options::{ButtonOptions, ClickCallback, ContainerOptions, ReadyCallback};
pub use probe::{ContentProbe, FixedProbe};
pub use scene::{MountOutcome, MountTicket, Scene};

pub use glaze_gpu::FrameInfo;
