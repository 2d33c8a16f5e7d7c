//! Upload pipeline: admit → persist original → render thumbnail → persist thumbnail.

pub mod pipeline;
pub mod types;

pub use pipeline::UploadPipeline;
pub use types::{IncomingFile, IngestError, IngestReport};
