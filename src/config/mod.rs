//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (read & coerce variables, log fallbacks to defaults)
//!     → Config (immutable for the process lifetime)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Configuration is environment-driven; an absent `MONGODB_URI` switches
//!   the whole service into file-fallback mode rather than failing startup
//! - All fields have defaults so a bare environment still boots
//! - Invalid values fall back to defaults with a warning instead of panicking

pub mod env;
pub mod schema;

pub use schema::Config;
pub use schema::TlsMode;
