//! User role variants
//!
//! This module defines the full role a user account holds: a position on
//! the capability ladder, a suspended (blocked) state that remembers the
//! prior position, or the admin role.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ladder::LadderRank;

/// The role a user account holds.
///
/// Most users sit on the capability ladder. Two variants live outside it:
///
/// - `Blocked` is an orthogonal suspended state reachable from any ladder
///   rank and reversible; it carries the rank the user returns to on
///   unblock.
/// - `Admin` is the moderator/superuser role with unconditional access.
///
/// Modeling these as separate variants (rather than extra ladder ranks)
/// means callers cannot forget to exclude them from ladder comparisons:
/// [`UserRole::ladder_rank`] simply returns `None` for both.
///
/// # Examples
///
/// ```
/// use platform_roles::{LadderRank, UserRole};
///
/// let role = UserRole::Ladder { rank: LadderRank::Member };
/// assert_eq!(role.ladder_rank(), Some(LadderRank::Member));
/// assert!(!role.is_admin());
///
/// let blocked = UserRole::Blocked { previous: LadderRank::Premium };
/// assert!(blocked.is_blocked());
/// assert_eq!(blocked.ladder_rank(), None);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserRole {
    /// A position on the capability ladder
    Ladder {
        /// The rank held
        rank: LadderRank,
    },

    /// Suspended account; remembers the rank restored on unblock
    Blocked {
        /// Rank held before the suspension
        previous: LadderRank,
    },

    /// Moderator/superuser with unconditional access
    Admin,
}

impl UserRole {
    /// The role of a caller with no session.
    pub fn anonymous() -> Self {
        Self::Ladder {
            rank: LadderRank::Visitor,
        }
    }

    /// Check if this is the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Check if this account is suspended.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Get the ladder rank, if this role is on the ladder.
    ///
    /// Blocked and admin roles are never subject to ladder rules, so
    /// they return `None` here and must be handled explicitly.
    ///
    /// # Returns
    ///
    /// `Some(LadderRank)` for ladder roles, `None` otherwise
    pub fn ladder_rank(&self) -> Option<LadderRank> {
        match self {
            Self::Ladder { rank } => Some(*rank),
            Self::Blocked { .. } | Self::Admin => None,
        }
    }

    /// Check if this role represents a signed-in user.
    ///
    /// Blocked users still hold a session; they are authenticated but
    /// suspended.
    ///
    /// # Returns
    ///
    /// `true` for everything except an anonymous visitor
    pub fn is_authenticated(&self) -> bool {
        match self {
            Self::Ladder { rank } => rank.is_authenticated(),
            Self::Blocked { .. } | Self::Admin => true,
        }
    }

    /// Parse a role from a stored string, degrading safely.
    ///
    /// Used where role data may be stale or corrupted (e.g. a cached
    /// client session). Anything unrecognized falls back to the
    /// anonymous visitor role, never to an elevated one.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_roles::{LadderRank, UserRole};
    ///
    /// assert_eq!(
    ///     UserRole::parse_lenient("premium"),
    ///     UserRole::Ladder { rank: LadderRank::Premium },
    /// );
    /// assert_eq!(UserRole::parse_lenient("garbage"), UserRole::anonymous());
    /// assert_eq!(UserRole::parse_lenient("admin"), UserRole::Admin);
    /// ```
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            "blocked" => Self::Blocked {
                previous: LadderRank::Member,
            },
            other => match LadderRank::parse(other) {
                Some(rank) => Self::Ladder { rank },
                None => Self::anonymous(),
            },
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ladder { rank } => rank.as_str(),
            Self::Blocked { .. } => "blocked",
            Self::Admin => "admin",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Errors from role transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// Admin roles are never changed through the ladder transitions
    #[error("Admin roles cannot be changed through role transitions")]
    AdminImmutable,

    /// The account is already blocked
    #[error("Account is already blocked")]
    AlreadyBlocked,

    /// The account is not blocked
    #[error("Account is not blocked")]
    NotBlocked,

    /// The account's current rank does not permit this transition
    #[error("Account rank {current} is not eligible for this transition")]
    NotEligible {
        /// The rank the account currently holds
        current: &'static str,
    },
}
