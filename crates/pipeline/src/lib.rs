//! Batch runner: discover rule documents, then validate, render, execute and
//! persist each one, isolating failures per document.

mod error;
mod options;
mod outcome;
pub mod persist;
mod runner;
pub mod variables;

pub use error::{PipelineError, StageError};
pub use options::PipelineOptions;
pub use outcome::{RunOutcome, RunSummary};
pub use persist::PersistError;
pub use runner::PipelineRunner;
