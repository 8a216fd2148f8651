pub mod artifact_writer;
pub mod job_import;

pub use artifact_writer::{ArtifactWriter, WrittenDocument};
pub use job_import::{ImportMode, JobImporter};
