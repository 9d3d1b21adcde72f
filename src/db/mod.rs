//! Document-store access subsystem.
//!
//! # Data Flow
//! ```text
//! handler needs menu documents
//!     → connection.rs (cached handle, or connect with retry/backoff)
//!     → collection auto-discovery (configured name → common names → first)
//!     → Collection<Document> handle shared with the request
//!
//! mutation targets an item
//!     → id.rs (ObjectId parse, plain-string fallback)
//!     → filter document for the driver
//! ```
//!
//! # Design Decisions
//! - The cached handle is process-wide state behind an async mutex; the
//!   mutex is held across connection establishment so concurrent cold-start
//!   requests share one in-flight attempt instead of dialing in parallel
//! - Connection failures never escape as panics; callers receive a
//!   `ConnectionError` and map it to an HTTP status

pub mod connection;
pub mod id;

pub use connection::{ConnectionError, MenuStore, ResolvedCollection};
pub use id::ItemId;
