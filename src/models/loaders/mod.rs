pub mod toml_loader;

pub use toml_loader::{load_all_job_specs, load_job_spec};
