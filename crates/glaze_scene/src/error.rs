//! Scene error taxonomy.
//!
//! Only programmer-facing misconfiguration surfaces as an error at
//! construction time; everything runtime (capture failures, shader
//! failures, detached probes) degrades inside the engine per the
//! error-handling contract.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SceneError {
    /// The element id does not (or no longer) refer to a live element
    #[error("unknown element")]
    UnknownElement,

    /// Required option missing or invalid at construction
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),

    /// The scene's element cap was reached
    #[error("element limit reached ({cap})")]
    TooManyElements { cap: usize },
}
