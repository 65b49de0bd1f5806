//! API middleware.

mod admin;
mod session;

pub use admin::admin_middleware;
pub use session::{session_middleware, CurrentUser};
