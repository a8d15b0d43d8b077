pub mod avatar_upload;
pub mod health;
