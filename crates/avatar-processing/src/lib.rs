//! Avatar Processing Library
//!
//! Image format detection and PNG normalization, payload admission checks,
//! and the ingestion pipeline that ties verification, conversion and storage
//! together.

pub mod codec;
pub mod upload;
pub mod validator;

pub use codec::{CanonicalAsset, CodecError, ImageCodec, ImageFormat, RawAsset};
pub use upload::{IngestionPipeline, UploadOutcome};
pub use validator::{PayloadValidator, ValidationError};
