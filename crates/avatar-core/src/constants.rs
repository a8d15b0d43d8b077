//! Constants shared across crates.

/// File name every principal's canonical avatar is stored under.
pub const AVATAR_FILE_NAME: &str = "avatar.png";

/// Content type of every persisted avatar.
pub const CANONICAL_CONTENT_TYPE: &str = "image/png";

/// Longest principal name accepted, in bytes.
pub const MAX_PRINCIPAL_NAME_LEN: usize = 256;

/// Plain-text body returned for a successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Image uploaded successfully";
