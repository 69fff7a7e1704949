pub mod response;
pub mod routes;
pub mod service;

pub use response::{ApiError, ApiResponse};
pub use routes::{build_router, AppState};
pub use service::{dispatch, ActionRequest};
