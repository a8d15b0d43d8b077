mod pipeline;

pub use pipeline::{IngestionPipeline, UploadOutcome};
