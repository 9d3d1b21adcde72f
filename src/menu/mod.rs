//! Menu domain logic.
//!
//! # Data Flow
//! ```text
//! raw documents from the store
//!     → model.rs (classify: flat item list vs wrapper documents)
//!     → normalize.rs (flatten wrappers into one item sequence)
//!     → format.rs (defaulting, price coercion, image URL resolution)
//!     → JSON array to the client
//!
//! no database configured
//!     → fallback.rs (static JSON file, returned verbatim)
//! ```
//!
//! # Design Decisions
//! - Everything in this module is pure (no I/O except the fallback file
//!   read) and unit-tested in isolation
//! - The fallback path skips normalization and formatting entirely; the
//!   file is assumed pre-formatted

pub mod fallback;
pub mod format;
pub mod model;
pub mod normalize;

pub use fallback::load_fallback_menu;
pub use format::{format_item, RequestContext};
pub use model::DocShape;
pub use normalize::normalize;
