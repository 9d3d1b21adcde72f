//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, CORS/trace/timeout layers, static /images)
//!     → handlers.rs (one canonical handler per operation)
//!     → error.rs (taxonomy → status + JSON error body)
//! ```
//!
//! # Design Decisions
//! - One canonical handler per CRUD operation; path-parameter routes are
//!   thin adapters over the same implementation
//! - Every data-layer or formatting failure is converted to an `ApiError`
//!   at the handler boundary; nothing propagates to the transport layer

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
