//! # Platform Rules
//!
//! This crate provides the storage-adjacent enforcement point for the
//! Pathway platform: a declarative, deny-by-default ruleset evaluated
//! against the persisted shape of each collection, keyed on the
//! requester's authenticated role claim and the document's own fields.
//!
//! ## Overview
//!
//! The platform-rules crate handles:
//! - **Requests**: The restricted request shape the datastore hands the
//!   guard (auth claim, operation, collection, document fields)
//! - **Rulesets**: Per-item allow rules compiled from the policy
//!   decision table, plus write-shape validation
//!
//! ## Position in the Stack
//!
//! This is the last line of defense. It re-checks what the server
//! handlers already checked, directly against stored fields, so a buggy
//! or bypassed handler still cannot:
//! - read another user's hidden content
//! - create content under another user's id
//! - self-assign an elevated role
//! - touch moderation fields without the admin claim
//! - physically delete anything (soft deletes arrive as updates)
//!
//! Denials carry no reason: a storage boundary does not explain itself.
//!
//! The listing quota is deliberately **not** enforced here — it is
//! product policy applied by the presentation tier, and a direct query
//! with valid per-item permission will return more than the quota.
//!
//! ## Usage
//!
//! ```rust
//! use platform_rules::{Collection, RuleOp, RuleRequest, RuleSet};
//!
//! let rules = RuleSet::compile();
//!
//! // Anonymous write: denied
//! let request = RuleRequest::anonymous(RuleOp::Create, Collection::Reviews);
//! assert!(!rules.evaluate(&request).is_allow());
//! ```

pub mod request;
pub mod ruleset;

// Re-export main types for convenience
pub use request::{Collection, RuleAuth, RuleDocument, RuleOp, RuleRequest};
pub use ruleset::{RuleSet, RuleVerdict};
