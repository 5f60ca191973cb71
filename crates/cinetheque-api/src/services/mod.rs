pub mod media_uploader;

pub use media_uploader::{MediaUploader, StoredFile, UploadedFile};
