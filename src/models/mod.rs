pub mod input;
pub mod job;
pub mod loaders;
pub mod outreach;
pub mod reports;
pub mod tracker;

pub use input::{InputField, MessageFormat, OutreachType, WorkflowInput};
pub use job::JobSpec;
pub use loaders::{load_all_job_specs, load_job_spec};
pub use outreach::{OutreachEmail, OutreachResult, OutreachVariants};
pub use reports::{pdf_file_name, AiDetectionReport, AtsBand, AtsReport, FlaggedPhrase, RenderedDocument};
pub use tracker::{sanitize_version_name, ApplicationRecord, ApplicationStatus, ResumeVersion};
