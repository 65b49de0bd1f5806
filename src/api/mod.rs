//! HTTP surface: public catalog, session-gated customer routes under
//! `/api`, and the key-gated back office under `/api/admin`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
