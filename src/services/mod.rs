pub mod age;

pub mod upload;
pub use upload::{UploadError, UploadService, UploadedFile};
