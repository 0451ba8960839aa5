//! # Platform Server
//!
//! This crate provides the server-side enforcement point for the
//! Pathway platform: session verification, request handling for
//! content and moderation, storage and signal abstractions, and the
//! transport error taxonomy.
//!
//! ## Overview
//!
//! The platform-server crate handles:
//! - **Identity**: JWT session tokens carrying identity only; roles are
//!   re-read from storage on every request
//! - **Services**: Content submission, editing, withdrawal, and listing;
//!   moderation decisions and role administration
//! - **Storage**: The datastore trait plus an in-memory implementation
//! - **Signals**: Fire-and-forget notifications for downstream consumers
//! - **Errors**: Six stable error categories with HTTP status mapping
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use platform_server::{ContentService, IdentityVerifier, MemorySignalBus, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let bus = Arc::new(MemorySignalBus::new());
//! let verifier = Arc::new(IdentityVerifier::with_secret("dev-secret"));
//! let content = ContentService::new(store, bus, verifier);
//! ```

pub mod error;
pub mod events;
pub mod identity;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use error::{require, ApiError, ApiResult};
pub use events::{MemorySignalBus, Signal, SignalBus};
pub use identity::{IdentityError, IdentityVerifier, SessionClaims};
pub use service::{AdminService, ContentService};
pub use store::{MemoryStore, PlatformStore, StoreError, StoreResult};
