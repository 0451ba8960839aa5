//! # Platform Moderation
//!
//! This crate provides the content model and moderation state machine
//! for the Pathway platform, uniform across reviews, roadmaps, and
//! comments.
//!
//! ## Overview
//!
//! The platform-moderation crate handles:
//! - **Content Kinds**: Review, roadmap, and comment variants sharing
//!   one shape
//! - **Moderation Status**: The PENDING → APPROVED/REJECTED lifecycle
//! - **Transitions**: The legal moves between statuses, keyed on who is
//!   acting
//! - **Soft Deletion**: Items are withdrawn, never physically removed
//!
//! ## Lifecycle
//!
//! ```text
//!            submit                approve
//!   (new) ──────────▶ PENDING ───────────────▶ APPROVED
//!                        ▲  │ reject               │
//!                        │  ▼                      │ edit (owner)
//!                     REJECTED ◀───────────────────┘
//!                        ▲        delete (owner or admin, any state)
//!                        └──────────────────────────────
//! ```
//!
//! REJECTED is terminal for moderation: there is no un-reject path, and
//! a rejected item cannot be edited back to PENDING.
//!
//! ## Usage
//!
//! ```rust
//! use uuid::Uuid;
//! use platform_moderation::{ContentItem, ContentKind, ModerationStatus};
//!
//! let author = Uuid::now_v7();
//! let moderator = Uuid::now_v7();
//!
//! let mut review = ContentItem::new(ContentKind::Review, author);
//! assert_eq!(review.status, ModerationStatus::Pending);
//!
//! review.approve(moderator).unwrap();
//! assert!(review.is_visible());
//!
//! // Owner edits send the item back through moderation
//! review.edit().unwrap();
//! assert_eq!(review.status, ModerationStatus::Pending);
//! ```

pub mod content;
pub mod status;

// Re-export main types for convenience
pub use content::{ContentItem, ContentKind};
pub use status::{transition, ModerationAction, ModerationStatus, TransitionError};
