pub mod backend_client;
pub mod http_executor;
pub mod response;

pub use backend_client::BackendClient;
pub use http_executor::HttpStageExecutor;
