pub mod auth;
pub mod response;

pub use auth::{protect, CurrentUser};
pub use response::{ApiResponse, ApiResult};
