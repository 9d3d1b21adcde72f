//! Restaurant Menu Backend Library

pub mod config;
pub mod db;
pub mod http;
pub mod menu;
pub mod observability;

pub use config::Config;
pub use http::HttpServer;
