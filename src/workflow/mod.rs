//! Request-scoped workflow orchestration.
//!
//! One [`WorkflowSession`] is created per processing run and owns every
//! temporary file the run creates; removal is guaranteed on every exit
//! path. The [`SlicePipeline`] drives the stage machine
//! `Received -> Validated -> Parsed -> Sliced -> Published -> Rendered ->
//! Packaged -> Completed`, failing over to the terminal `Failed` state
//! with the stage reached and a human-readable reason.

mod archive;
mod pipeline;
mod session;
mod stage;

pub use archive::build_archive;
pub use pipeline::{PipelineOutput, SlicePipeline, WarningReport};
pub use session::WorkflowSession;
pub use stage::Stage;
