//! The capability ladder
//!
//! This module defines the ordered ranks regular users move through,
//! from anonymous visitors to paying premium members.

use serde::{Deserialize, Serialize};

/// A rank on the user capability ladder.
///
/// Ranks are strictly ordered: `Visitor < Member < Contributor < Premium`.
/// The ladder gates how much content a user may see in listings and
/// whether they may create content at all. Blocked and admin users are
/// not on the ladder; see [`crate::UserRole`].
///
/// # Examples
///
/// ```
/// use platform_roles::LadderRank;
///
/// assert!(LadderRank::Member < LadderRank::Contributor);
/// assert!(LadderRank::Contributor.has_full_visibility());
/// assert!(!LadderRank::Member.has_full_visibility());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LadderRank {
    /// No session; anonymous browsing only
    Visitor = 0,

    /// Signed in but not yet vouched by an approved submission
    Member = 1,

    /// Vouched user (first submission approved); full visibility
    Contributor = 2,

    /// Paid upgrade; full visibility, no ads
    Premium = 3,
}

impl LadderRank {
    /// Get the numeric rank used for ladder comparisons.
    ///
    /// # Returns
    ///
    /// `0` for Visitor up to `3` for Premium
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Check if this rank represents a signed-in user.
    ///
    /// # Returns
    ///
    /// `true` for every rank except Visitor
    pub fn is_authenticated(&self) -> bool {
        *self >= LadderRank::Member
    }

    /// Check if this rank sees full content listings.
    ///
    /// Ranks below Contributor are shown a truncated listing with an
    /// upgrade prompt instead of the full approved set.
    ///
    /// # Returns
    ///
    /// `true` for Contributor and Premium
    pub fn has_full_visibility(&self) -> bool {
        *self >= LadderRank::Contributor
    }

    /// Check if this rank is shown ads.
    ///
    /// # Returns
    ///
    /// `true` for every rank below Premium
    pub fn sees_ads(&self) -> bool {
        *self < LadderRank::Premium
    }

    /// Parse rank from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(LadderRank)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_roles::LadderRank;
    ///
    /// assert_eq!(LadderRank::parse("member"), Some(LadderRank::Member));
    /// assert_eq!(LadderRank::parse("PREMIUM"), Some(LadderRank::Premium));
    /// assert_eq!(LadderRank::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "visitor" => Some(Self::Visitor),
            "member" => Some(Self::Member),
            "contributor" => Some(Self::Contributor),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Get string representation of the rank.
    ///
    /// # Returns
    ///
    /// Lowercase string representation
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_roles::LadderRank;
    ///
    /// assert_eq!(LadderRank::Contributor.as_str(), "contributor");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Member => "member",
            Self::Contributor => "contributor",
            Self::Premium => "premium",
        }
    }

    /// Get a human-readable display name for the rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_roles::LadderRank;
    ///
    /// assert_eq!(LadderRank::Premium.display_name(), "Premium");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Visitor => "Visitor",
            Self::Member => "Member",
            Self::Contributor => "Contributor",
            Self::Premium => "Premium",
        }
    }

    /// Get all ladder ranks in ascending order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Visitor,
            Self::Member,
            Self::Contributor,
            Self::Premium,
        ]
    }
}

impl Default for LadderRank {
    fn default() -> Self {
        Self::Visitor
    }
}
