pub mod encoding;
pub mod file;
pub mod validation;

pub use encoding::{encode_png, to_data_uri};
pub use file::*;
pub use validation::{validate_upload, UploadInfo};
