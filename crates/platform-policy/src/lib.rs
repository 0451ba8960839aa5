//! # Platform Policy
//!
//! This crate provides access policy evaluation for the Pathway
//! platform. It is the **single encoding** of the rules deciding, for
//! any (user, content item) pair, whether an operation is permitted.
//!
//! ## Overview
//!
//! The platform-policy crate handles:
//! - **Evaluation**: Pure decision functions mapping
//!   (actor, operation, item) to an allow/deny verdict
//! - **Decision Table**: An exhaustive enumeration of verdicts, used to
//!   compile the storage rules and to cross-check every enforcement
//!   surface against the same fixtures
//! - **Quotas**: Configurable listing caps for low-rank users
//! - **Permissions Hook**: The presentation-tier permission object
//!   derived from a (possibly corrupted) cached session
//!
//! ## Three Enforcement Surfaces
//!
//! The same policy is enforced three times and must never disagree:
//!
//! 1. The storage rules (`platform-rules`), compiled from
//!    [`evaluator::decision_table`] — the source-of-truth boundary
//! 2. The server handlers (`platform-server`), which call
//!    [`evaluator::evaluate`] directly
//! 3. The client permission hook ([`permissions::Permissions`]),
//!    derived from the same evaluation functions
//!
//! Only the client surface applies the listing quota; the storage rules
//! deliberately do not (it is product policy, not a security boundary).
//!
//! ## Usage
//!
//! ```rust
//! use uuid::Uuid;
//! use platform_moderation::ModerationStatus;
//! use platform_policy::{evaluate, Actor, ItemView, Operation, Verdict};
//! use platform_roles::UserRole;
//!
//! let owner = Uuid::now_v7();
//! let item = ItemView {
//!     author_id: owner,
//!     status: ModerationStatus::Pending,
//!     withdrawn: false,
//! };
//!
//! // Owners read their own pending items
//! let actor = Actor::new(owner, UserRole::parse_lenient("member"));
//! assert_eq!(evaluate(&actor, Operation::Read, Some(&item)), Verdict::Allow);
//!
//! // Strangers get a masked denial
//! let stranger = Actor::anonymous();
//! assert!(!evaluate(&stranger, Operation::Read, Some(&item)).is_allow());
//! ```

pub mod evaluator;
pub mod permissions;
pub mod quota;

// Re-export main types for convenience
pub use evaluator::{
    decision_table, evaluate, Actor, DecisionRow, DenyReason, ItemView, Operation, Verdict,
};
pub use permissions::{truncate_listing, ListingAccess, Permissions, SessionSnapshot};
pub use quota::QuotaPolicy;
