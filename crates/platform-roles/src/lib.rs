//! # Platform Roles
//!
//! This crate provides the user role model for the Pathway platform,
//! shared by the web app, the admin console, and the storage rule layer.
//!
//! ## Overview
//!
//! The platform-roles crate handles:
//! - **Ladder Ranks**: The ordered capability ladder for regular users
//! - **User Roles**: Ladder, blocked, and admin role variants
//! - **Accounts**: The user record and its role transitions
//!
//! ## Role Model
//!
//! Regular users sit on an ordered capability ladder:
//!
//! ```text
//! Visitor < Member < Contributor < Premium
//! ```
//!
//! - **Visitor**: No session; may only browse approved content
//! - **Member**: Signed in but not yet vouched; limited browsing
//! - **Contributor**: Vouched (first submission approved); full browsing
//! - **Premium**: Paid upgrade; full browsing without ads
//!
//! Two roles live outside the ladder and are never subject to its rules:
//!
//! - **Blocked**: Suspended account; remembers the rank it will return to
//! - **Admin**: Moderator/superuser with unconditional access
//!
//! ## Role Transitions
//!
//! - Member → Contributor happens when a user's first submission is
//!   approved by a moderator (not at submission time)
//! - Contributor ↔ Premium is an explicit admin action
//! - Any ladder rank → Blocked snapshots the prior rank; unblocking
//!   restores it (falling back to Member)
//! - Admin is immutable through these transitions
//!
//! ## Usage
//!
//! ```rust
//! use platform_roles::{LadderRank, UserAccount, UserRole};
//!
//! let mut account = UserAccount::new("mina@example.com");
//! assert_eq!(account.role, UserRole::Ladder { rank: LadderRank::Member });
//!
//! // First approved submission vouches the user
//! assert!(account.promote_to_contributor().unwrap());
//! assert_eq!(account.role.ladder_rank(), Some(LadderRank::Contributor));
//!
//! // Suspension remembers where the user was
//! account.block().unwrap();
//! assert!(account.role.is_blocked());
//! account.unblock().unwrap();
//! assert_eq!(account.role.ladder_rank(), Some(LadderRank::Contributor));
//! ```

pub mod account;
pub mod ladder;
pub mod role;

// Re-export main types for convenience
pub use account::UserAccount;
pub use ladder::LadderRank;
pub use role::{RoleError, UserRole};
