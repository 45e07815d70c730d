pub mod upload;

pub use upload::{FieldSpec, UploadOutcome, UploadService};
