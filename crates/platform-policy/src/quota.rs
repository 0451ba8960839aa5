//! Listing visibility quotas
//!
//! This module defines the configurable caps on how many approved items
//! a low-rank user sees in one listing. The quota is product policy,
//! not a security boundary: it is applied only by the presentation
//! tier, and the storage rules deliberately do not mirror it.

use serde::{Deserialize, Serialize};

use platform_moderation::ContentKind;
use platform_roles::UserRole;

/// Configurable listing caps per content kind.
///
/// Only ladder ranks below Contributor are capped. Blocked accounts and
/// admins sit outside the ladder and are never subject to the quota;
/// comments are never capped for anyone.
///
/// # Examples
///
/// ```
/// use platform_moderation::ContentKind;
/// use platform_policy::QuotaPolicy;
/// use platform_roles::{LadderRank, UserRole};
///
/// let quotas = QuotaPolicy::default();
/// let member = UserRole::Ladder { rank: LadderRank::Member };
///
/// assert_eq!(quotas.listing_limit(&member, ContentKind::Review), Some(1));
/// assert_eq!(quotas.listing_limit(&member, ContentKind::Roadmap), Some(3));
/// assert_eq!(quotas.listing_limit(&member, ContentKind::Comment), None);
/// assert_eq!(quotas.listing_limit(&UserRole::Admin, ContentKind::Review), None);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Approved reviews shown to a capped user in one listing
    pub review_limit: usize,

    /// Approved roadmaps shown to a capped user in one listing
    pub roadmap_limit: usize,
}

impl QuotaPolicy {
    /// Create a quota policy with explicit limits.
    ///
    /// # Arguments
    ///
    /// * `review_limit` - Cap for review listings
    /// * `roadmap_limit` - Cap for roadmap listings
    pub fn new(review_limit: usize, roadmap_limit: usize) -> Self {
        Self {
            review_limit,
            roadmap_limit,
        }
    }

    /// Get the listing cap for a role and content kind.
    ///
    /// # Returns
    ///
    /// `Some(limit)` when the listing should be truncated, `None` for
    /// unlimited access
    pub fn listing_limit(&self, role: &UserRole, kind: ContentKind) -> Option<usize> {
        let rank = match role.ladder_rank() {
            // Blocked and admin roles are outside the ladder and never
            // subject to its view limits.
            None => return None,
            Some(rank) => rank,
        };
        if rank.has_full_visibility() {
            return None;
        }
        match kind {
            ContentKind::Review => Some(self.review_limit),
            ContentKind::Roadmap => Some(self.roadmap_limit),
            ContentKind::Comment => None,
        }
    }
}

impl Default for QuotaPolicy {
    /// The reference policy: one review, three roadmaps.
    fn default() -> Self {
        Self {
            review_limit: 1,
            roadmap_limit: 3,
        }
    }
}
