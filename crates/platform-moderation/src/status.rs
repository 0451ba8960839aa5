//! Moderation status and transitions
//!
//! This module defines the per-item moderation lifecycle and the single
//! transition function every enforcement surface agrees on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Moderation status of a content item.
///
/// Every item starts at `Pending`. Only a moderator moves an item to
/// `Approved` or `Rejected`; only the owner moves it back to `Pending`
/// by editing. `Rejected` doubles as the soft-delete state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Awaiting moderation (initial state)
    Pending,

    /// Approved by a moderator; publicly visible
    Approved,

    /// Rejected by a moderator or withdrawn by the owner; hidden
    Rejected,
}

impl ModerationStatus {
    /// Parse status from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(ModerationStatus)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Get all statuses.
    pub fn all() -> Vec<Self> {
        vec![Self::Pending, Self::Approved, Self::Rejected]
    }
}

impl Default for ModerationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// An action attempted against a content item's moderation status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    /// Create a new item
    Submit,

    /// Owner edits the content payload
    Edit,

    /// Moderator approves a pending item
    Approve,

    /// Moderator rejects a pending item
    Reject,

    /// Owner or moderator soft-deletes the item
    Delete,
}

impl ModerationAction {
    /// Get string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Edit => "edit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Delete => "delete",
        }
    }
}

/// Errors from illegal moderation transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The action is legal for this actor but not from the current status
    #[error("Cannot {action} an item that is {status}")]
    Conflict {
        /// The attempted action
        action: &'static str,
        /// The status the item was in
        status: &'static str,
    },

    /// Approve/reject attempted by a non-moderator
    #[error("Only moderators may {action} content")]
    NotModerator {
        /// The attempted action
        action: &'static str,
    },

    /// Edit/delete attempted by someone who is neither owner nor moderator
    #[error("Only the owner may {action} this item")]
    NotOwner {
        /// The attempted action
        action: &'static str,
    },
}

/// Compute the status an action would move an item to.
///
/// This is the moderation state machine, shared verbatim by the policy
/// evaluator, the server handlers, and the storage rules:
///
/// - `Submit` always yields `Pending`
/// - `Edit` (owner only) yields `Pending` from `Pending` or `Approved`;
///   rejected items cannot be edited back to life
/// - `Approve`/`Reject` (moderator only) act on `Pending` items only;
///   anything else is a conflict
/// - `Delete` (owner or moderator) yields `Rejected` from any state
///
/// # Arguments
///
/// * `current` - The item's current status
/// * `action` - The attempted action
/// * `is_owner` - Whether the actor owns the item
/// * `is_moderator` - Whether the actor is an admin/moderator
///
/// # Returns
///
/// The next status, or a [`TransitionError`] describing why the move is
/// illegal
///
/// # Examples
///
/// ```
/// use platform_moderation::{transition, ModerationAction, ModerationStatus};
///
/// let next = transition(
///     ModerationStatus::Pending,
///     ModerationAction::Approve,
///     false,
///     true,
/// )
/// .unwrap();
/// assert_eq!(next, ModerationStatus::Approved);
/// ```
pub fn transition(
    current: ModerationStatus,
    action: ModerationAction,
    is_owner: bool,
    is_moderator: bool,
) -> Result<ModerationStatus, TransitionError> {
    match action {
        ModerationAction::Submit => Ok(ModerationStatus::Pending),

        ModerationAction::Edit => {
            if !is_owner && !is_moderator {
                return Err(TransitionError::NotOwner { action: "edit" });
            }
            match current {
                ModerationStatus::Pending | ModerationStatus::Approved => {
                    Ok(ModerationStatus::Pending)
                }
                ModerationStatus::Rejected => Err(TransitionError::Conflict {
                    action: "edit",
                    status: current.as_str(),
                }),
            }
        }

        ModerationAction::Approve => {
            if !is_moderator {
                return Err(TransitionError::NotModerator { action: "approve" });
            }
            match current {
                ModerationStatus::Pending => Ok(ModerationStatus::Approved),
                _ => Err(TransitionError::Conflict {
                    action: "approve",
                    status: current.as_str(),
                }),
            }
        }

        ModerationAction::Reject => {
            if !is_moderator {
                return Err(TransitionError::NotModerator { action: "reject" });
            }
            match current {
                ModerationStatus::Pending => Ok(ModerationStatus::Rejected),
                _ => Err(TransitionError::Conflict {
                    action: "reject",
                    status: current.as_str(),
                }),
            }
        }

        ModerationAction::Delete => {
            if !is_owner && !is_moderator {
                return Err(TransitionError::NotOwner { action: "delete" });
            }
            Ok(ModerationStatus::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_always_pending() {
        for status in ModerationStatus::all() {
            let next = transition(status, ModerationAction::Submit, true, false).unwrap();
            assert_eq!(next, ModerationStatus::Pending);
        }
    }

    #[test]
    fn test_approve_requires_moderator() {
        let err = transition(
            ModerationStatus::Pending,
            ModerationAction::Approve,
            true,
            false,
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::NotModerator { action: "approve" });
    }

    #[test]
    fn test_approve_only_from_pending() {
        assert_eq!(
            transition(
                ModerationStatus::Pending,
                ModerationAction::Approve,
                false,
                true,
            ),
            Ok(ModerationStatus::Approved)
        );

        for status in [ModerationStatus::Approved, ModerationStatus::Rejected] {
            let err =
                transition(status, ModerationAction::Approve, false, true).unwrap_err();
            assert!(matches!(err, TransitionError::Conflict { .. }));
        }
    }

    #[test]
    fn test_reject_then_approve_is_conflict() {
        let rejected = transition(
            ModerationStatus::Pending,
            ModerationAction::Reject,
            false,
            true,
        )
        .unwrap();
        assert_eq!(rejected, ModerationStatus::Rejected);

        let err =
            transition(rejected, ModerationAction::Approve, false, true).unwrap_err();
        assert!(matches!(err, TransitionError::Conflict { .. }));
    }

    #[test]
    fn test_edit_resets_to_pending() {
        assert_eq!(
            transition(
                ModerationStatus::Approved,
                ModerationAction::Edit,
                true,
                false,
            ),
            Ok(ModerationStatus::Pending)
        );
        assert_eq!(
            transition(
                ModerationStatus::Pending,
                ModerationAction::Edit,
                true,
                false,
            ),
            Ok(ModerationStatus::Pending)
        );
    }

    #[test]
    fn test_edit_denied_on_rejected() {
        let err = transition(
            ModerationStatus::Rejected,
            ModerationAction::Edit,
            true,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::Conflict { .. }));
    }

    #[test]
    fn test_edit_denied_for_strangers() {
        let err = transition(
            ModerationStatus::Pending,
            ModerationAction::Edit,
            false,
            false,
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::NotOwner { action: "edit" });
    }

    #[test]
    fn test_delete_from_any_state() {
        for status in ModerationStatus::all() {
            assert_eq!(
                transition(status, ModerationAction::Delete, true, false),
                Ok(ModerationStatus::Rejected)
            );
            assert_eq!(
                transition(status, ModerationAction::Delete, false, true),
                Ok(ModerationStatus::Rejected)
            );
        }
    }

    #[test]
    fn test_delete_denied_for_strangers() {
        let err = transition(
            ModerationStatus::Approved,
            ModerationAction::Delete,
            false,
            false,
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::NotOwner { action: "delete" });
    }

    #[test]
    fn test_status_round_trip() {
        for status in ModerationStatus::all() {
            assert_eq!(ModerationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ModerationStatus::parse("APPROVED"), Some(ModerationStatus::Approved));
        assert_eq!(ModerationStatus::parse("invalid"), None);
    }
}
