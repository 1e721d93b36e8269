//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, layer stack)
//!     → cors.rs (OPTIONS short-circuit, CORS headers on every response)
//!     → request.rs (x-request-id set and echoed)
//!     → extract.rs (signed writes: raw bytes → auth → JSON)
//!     → blogs.rs / suggest.rs (handlers)
//!     → error.rs (ApiError → status + JSON body)
//! ```

pub mod blogs;
pub mod cors;
pub mod error;
pub mod extract;
pub mod request;
pub mod server;
pub mod suggest;

pub use error::ApiError;
pub use extract::SignedJson;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer, ServerError};
