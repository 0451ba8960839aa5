//! User account records
//!
//! This module provides the user account entity and the role transitions
//! performed on it: first-approval promotion, premium upgrades, and
//! block/unblock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ladder::LadderRank;
use crate::role::{RoleError, UserRole};

/// A user account.
///
/// Accounts always hold exactly one role. The rank held before a
/// suspension is carried inside [`UserRole::Blocked`], so the blocked
/// state and its restore target cannot drift apart.
///
/// # Examples
///
/// ```
/// use platform_roles::{LadderRank, UserAccount, UserRole};
///
/// let account = UserAccount::new("jo@example.com");
/// assert_eq!(account.role, UserRole::Ladder { rank: LadderRank::Member });
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    /// Unique user ID
    pub id: Uuid,

    /// User email address
    pub email: String,

    /// Current role
    pub role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Last role or profile change
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a new account for a freshly signed-up user.
    ///
    /// New accounts start at the Member rank: signed in, not yet vouched.
    ///
    /// # Arguments
    ///
    /// * `email` - The user's email address
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            role: UserRole::Ladder {
                rank: LadderRank::Member,
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new admin account.
    pub fn new_admin(email: impl Into<String>) -> Self {
        let mut account = Self::new(email);
        account.role = UserRole::Admin;
        account
    }

    /// Get the rank restored when this account is unblocked, if blocked.
    pub fn previous_rank(&self) -> Option<LadderRank> {
        match self.role {
            UserRole::Blocked { previous } => Some(previous),
            _ => None,
        }
    }

    /// Promote a Member to Contributor after their first approved
    /// submission.
    ///
    /// This is the only automatic promotion on the ladder and it is
    /// idempotent: accounts already at or above Contributor, blocked
    /// accounts, and admins are left untouched.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the account was promoted, `Ok(false)` if there was
    /// nothing to do
    pub fn promote_to_contributor(&mut self) -> Result<bool, RoleError> {
        match self.role {
            UserRole::Ladder {
                rank: LadderRank::Member,
            } => {
                self.set_role(UserRole::Ladder {
                    rank: LadderRank::Contributor,
                });
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Upgrade a Contributor to Premium.
    ///
    /// This is an explicit admin action, valid only along the
    /// Contributor → Premium edge.
    ///
    /// # Errors
    ///
    /// [`RoleError::AdminImmutable`] for admin accounts,
    /// [`RoleError::NotEligible`] for any other rank or a blocked account
    pub fn promote_to_premium(&mut self) -> Result<(), RoleError> {
        match self.role {
            UserRole::Ladder {
                rank: LadderRank::Contributor,
            } => {
                self.set_role(UserRole::Ladder {
                    rank: LadderRank::Premium,
                });
                Ok(())
            }
            UserRole::Admin => Err(RoleError::AdminImmutable),
            _ => Err(RoleError::NotEligible {
                current: self.role.as_str(),
            }),
        }
    }

    /// Downgrade a Premium account back to Contributor.
    ///
    /// This is an explicit admin action, valid only along the
    /// Premium → Contributor edge.
    ///
    /// # Errors
    ///
    /// [`RoleError::AdminImmutable`] for admin accounts,
    /// [`RoleError::NotEligible`] for any other rank or a blocked account
    pub fn demote_to_contributor(&mut self) -> Result<(), RoleError> {
        match self.role {
            UserRole::Ladder {
                rank: LadderRank::Premium,
            } => {
                self.set_role(UserRole::Ladder {
                    rank: LadderRank::Contributor,
                });
                Ok(())
            }
            UserRole::Admin => Err(RoleError::AdminImmutable),
            _ => Err(RoleError::NotEligible {
                current: self.role.as_str(),
            }),
        }
    }

    /// Suspend the account, snapshotting the current rank.
    ///
    /// # Errors
    ///
    /// [`RoleError::AdminImmutable`] for admin accounts,
    /// [`RoleError::AlreadyBlocked`] if already suspended
    pub fn block(&mut self) -> Result<(), RoleError> {
        match self.role {
            UserRole::Ladder { rank } => {
                self.set_role(UserRole::Blocked { previous: rank });
                Ok(())
            }
            UserRole::Blocked { .. } => Err(RoleError::AlreadyBlocked),
            UserRole::Admin => Err(RoleError::AdminImmutable),
        }
    }

    /// Lift a suspension, restoring the snapshotted rank.
    ///
    /// A blocked account with no meaningful snapshot (a visitor rank
    /// should never have been blockable) is restored to Member.
    ///
    /// # Errors
    ///
    /// [`RoleError::NotBlocked`] if the account is not suspended
    pub fn unblock(&mut self) -> Result<(), RoleError> {
        match self.role {
            UserRole::Blocked { previous } => {
                let restored = if previous.is_authenticated() {
                    previous
                } else {
                    LadderRank::Member
                };
                self.set_role(UserRole::Ladder { rank: restored });
                Ok(())
            }
            _ => Err(RoleError::NotBlocked),
        }
    }

    fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}
