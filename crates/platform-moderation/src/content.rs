//! Content item records
//!
//! This module provides the shared shape for reviews, roadmaps, and
//! comments, plus the moderation helpers that keep the status field and
//! the moderation audit trail consistent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{transition, ModerationAction, ModerationStatus, TransitionError};

/// The kind of a content item.
///
/// All three kinds share one shape and one moderation lifecycle; the
/// kind only matters for listing quotas and the comment parent check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A course review
    Review,

    /// A learning roadmap
    Roadmap,

    /// A comment attached to a review
    Comment,
}

impl ContentKind {
    /// Parse kind from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "review" => Some(Self::Review),
            "roadmap" => Some(Self::Roadmap),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    /// Get string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Roadmap => "roadmap",
            Self::Comment => "comment",
        }
    }

    /// Get all content kinds.
    pub fn all() -> Vec<Self> {
        vec![Self::Review, Self::Roadmap, Self::Comment]
    }
}

/// A content item: review, roadmap, or comment.
///
/// Items are exclusively owned by their author; ownership never
/// transfers, and a moderator acting on an item does not become its
/// owner. Items are never physically removed: owner deletion marks them
/// `withdrawn` and moderator rejection leaves `withdrawn` false, so the
/// two stay distinguishable for audit while both render the item hidden.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use platform_moderation::{ContentItem, ContentKind, ModerationStatus};
///
/// let author = Uuid::now_v7();
/// let item = ContentItem::new(ContentKind::Roadmap, author);
/// assert_eq!(item.status, ModerationStatus::Pending);
/// assert!(!item.is_visible());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    /// Unique item ID
    pub id: Uuid,

    /// What kind of item this is
    pub kind: ContentKind,

    /// Owning user ID (never changes)
    pub author_id: Uuid,

    /// Moderation status
    pub status: ModerationStatus,

    /// Parent review for comments; `None` for reviews and roadmaps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,

    /// Content payload, opaque to the moderation engine
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Moderator who last approved or rejected this item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_by: Option<Uuid>,

    /// When the last moderation decision was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<DateTime<Utc>>,

    /// Whether the owner withdrew the item (soft delete)
    #[serde(default)]
    pub withdrawn: bool,

    /// When the item was submitted
    pub created_at: DateTime<Utc>,

    /// Last change to content or status
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Creates a new item awaiting moderation.
    ///
    /// # Arguments
    ///
    /// * `kind` - The content kind
    /// * `author_id` - The owning user
    pub fn new(kind: ContentKind, author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            kind,
            author_id,
            status: ModerationStatus::Pending,
            parent_id: None,
            payload: serde_json::Value::Null,
            moderated_by: None,
            moderated_at: None,
            withdrawn: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new comment attached to a review.
    ///
    /// The caller is responsible for checking that the parent review
    /// exists and is visible before persisting the comment.
    ///
    /// # Arguments
    ///
    /// * `author_id` - The owning user
    /// * `parent_id` - The review this comment attaches to
    pub fn new_comment(author_id: Uuid, parent_id: Uuid) -> Self {
        let mut item = Self::new(ContentKind::Comment, author_id);
        item.parent_id = Some(parent_id);
        item
    }

    /// Set the content payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Check if this item is publicly visible.
    ///
    /// # Returns
    ///
    /// `true` when approved and not withdrawn
    pub fn is_visible(&self) -> bool {
        self.status == ModerationStatus::Approved && !self.withdrawn
    }

    /// Approve this item.
    ///
    /// Records who moderated and when. Only legal from `Pending`.
    ///
    /// # Arguments
    ///
    /// * `moderator_id` - The admin performing the approval
    pub fn approve(&mut self, moderator_id: Uuid) -> Result<(), TransitionError> {
        self.status = transition(self.status, ModerationAction::Approve, false, true)?;
        self.record_moderation(moderator_id);
        Ok(())
    }

    /// Reject this item.
    ///
    /// Records who moderated and when. Only legal from `Pending`.
    ///
    /// # Arguments
    ///
    /// * `moderator_id` - The admin performing the rejection
    pub fn reject(&mut self, moderator_id: Uuid) -> Result<(), TransitionError> {
        self.status = transition(self.status, ModerationAction::Reject, false, true)?;
        self.record_moderation(moderator_id);
        Ok(())
    }

    /// Apply an owner edit, sending the item back through moderation.
    ///
    /// The previous moderation audit fields are kept; the status alone
    /// returns to `Pending`. Illegal on rejected items.
    pub fn edit(&mut self) -> Result<(), TransitionError> {
        self.status = transition(self.status, ModerationAction::Edit, true, false)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Withdraw this item (soft delete).
    ///
    /// Legal from any state for the owner or a moderator; withdrawing an
    /// already-withdrawn item is a no-op.
    pub fn withdraw(&mut self) -> Result<(), TransitionError> {
        if self.withdrawn {
            return Ok(());
        }
        self.status = transition(self.status, ModerationAction::Delete, true, false)?;
        self.withdrawn = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn record_moderation(&mut self, moderator_id: Uuid) {
        let now = Utc::now();
        self.moderated_by = Some(moderator_id);
        self.moderated_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_item_is_pending_and_hidden() {
        let item = ContentItem::new(ContentKind::Review, Uuid::now_v7());
        assert_eq!(item.status, ModerationStatus::Pending);
        assert!(!item.is_visible());
        assert!(item.moderated_by.is_none());
    }

    #[test]
    fn test_comment_carries_parent() {
        let parent = Uuid::now_v7();
        let comment = ContentItem::new_comment(Uuid::now_v7(), parent);
        assert_eq!(comment.kind, ContentKind::Comment);
        assert_eq!(comment.parent_id, Some(parent));
    }

    #[test]
    fn test_approve_records_audit_trail() {
        let moderator = Uuid::now_v7();
        let mut item = ContentItem::new(ContentKind::Review, Uuid::now_v7());

        item.approve(moderator).unwrap();
        assert!(item.is_visible());
        assert_eq!(item.moderated_by, Some(moderator));
        assert!(item.moderated_at.is_some());
    }

    #[test]
    fn test_edit_resets_status_but_keeps_audit() {
        let moderator = Uuid::now_v7();
        let mut item = ContentItem::new(ContentKind::Review, Uuid::now_v7())
            .with_payload(json!({"title": "Rust 101"}));

        item.approve(moderator).unwrap();
        item.edit().unwrap();
        assert_eq!(item.status, ModerationStatus::Pending);
        assert_eq!(item.moderated_by, Some(moderator));
    }

    #[test]
    fn test_withdraw_is_idempotent_and_distinguishable() {
        let moderator = Uuid::now_v7();
        let mut withdrawn = ContentItem::new(ContentKind::Roadmap, Uuid::now_v7());
        withdrawn.withdraw().unwrap();
        withdrawn.withdraw().unwrap();
        assert_eq!(withdrawn.status, ModerationStatus::Rejected);
        assert!(withdrawn.withdrawn);

        let mut rejected = ContentItem::new(ContentKind::Roadmap, Uuid::now_v7());
        rejected.reject(moderator).unwrap();
        assert_eq!(rejected.status, ModerationStatus::Rejected);
        assert!(!rejected.withdrawn);
    }

    #[test]
    fn test_rejected_item_cannot_be_edited() {
        let moderator = Uuid::now_v7();
        let mut item = ContentItem::new(ContentKind::Review, Uuid::now_v7());
        item.reject(moderator).unwrap();
        assert!(matches!(
            item.edit(),
            Err(TransitionError::Conflict { .. })
        ));
    }

    #[test]
    fn test_double_approve_is_conflict_at_this_layer() {
        let moderator = Uuid::now_v7();
        let mut item = ContentItem::new(ContentKind::Review, Uuid::now_v7());
        item.approve(moderator).unwrap();
        assert!(matches!(
            item.approve(moderator),
            Err(TransitionError::Conflict { .. })
        ));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in ContentKind::all() {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ContentKind::parse("invalid"), None);
    }
}
