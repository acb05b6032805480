//! Axum web server adapter for the channel adapter.
//!
//! - [`bootstrap`]: composition root that wires transport, engines and services
//! - [`routes`]: router construction, CORS and body limits
//! - [`handlers`]: thin request handlers, one per endpoint
//! - [`form`]: multipart / urlencoded form extractor shared by all handlers
//! - [`error`]: mapping of service errors to HTTP responses

pub mod bootstrap;
pub mod error;
pub mod form;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, bootstrap, start_server};
pub use error::HttpError;
pub use form::FormData;
pub use routes::create_router;
pub use state::AppState;
