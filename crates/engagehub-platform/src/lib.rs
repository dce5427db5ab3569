//! # engagehub-platform
//!
//! Outward-facing adapters: the HTTP client for the platform API gateway,
//! the candidate content source, and the file-based connected-account
//! snapshot exported by the auth subsystem.

pub mod client;
pub mod connections;
pub mod content;

pub use client::HttpPlatformClient;
pub use connections::FileConnectionProvider;
pub use content::HttpContentSource;
