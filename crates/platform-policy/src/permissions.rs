//! Client-side permission derivation
//!
//! This module is the presentation-tier enforcement point: it turns a
//! (possibly stale or corrupted) cached session into a single
//! permissions object the UI renders from. It never throws for a denied
//! render decision; it downgrades instead.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use platform_moderation::ContentKind;
use platform_roles::UserRole;

use crate::evaluator::{evaluate, Actor, Operation};
use crate::quota::QuotaPolicy;

/// The locally-cached session the client tier holds.
///
/// The role here is a hint for rendering only; the server re-derives
/// the real role from the datastore on every privileged request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The signed-in user's ID
    pub user_id: Uuid,

    /// The role as last seen by the client
    pub role: UserRole,
}

impl SessionSnapshot {
    /// Create a snapshot for a signed-in user.
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Parse a snapshot from a cached JSON blob.
    ///
    /// Corrupted or unparseable data yields `None`, which callers must
    /// treat as "no session" — degrading to anonymous permissions,
    /// never to elevated ones.
    ///
    /// # Arguments
    ///
    /// * `raw` - The raw cached string
    pub fn from_cached_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Listing access for one content kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum ListingAccess {
    /// The full approved set is shown
    Full,

    /// The listing is truncated with an upgrade prompt
    Limited {
        /// Maximum items to show
        limit: usize,
        /// Prompt shown in place of the hidden items
        upgrade_message: String,
    },
}

impl ListingAccess {
    /// Check if this grants the full listing.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// The permissions object driving UI gating.
///
/// Derived once per session change and passed down explicitly; there is
/// no ambient "current user" global.
///
/// # Examples
///
/// ```
/// use platform_policy::{Permissions, QuotaPolicy};
///
/// // No session: most restrictive interpretation
/// let perms = Permissions::derive(None, &QuotaPolicy::default());
/// assert!(!perms.can_create);
/// assert!(!perms.can_moderate);
/// assert!(!perms.reviews.is_full());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    /// The signed-in user, if any
    pub user_id: Option<Uuid>,

    /// The role permissions were derived from
    pub role: UserRole,

    /// May submit reviews and roadmaps
    pub can_create: bool,

    /// May comment on reviews
    pub can_comment: bool,

    /// May approve/reject content (shows the moderation UI)
    pub can_moderate: bool,

    /// May promote/demote/block users (shows the user admin UI)
    pub can_manage_users: bool,

    /// Whether ads are rendered for this user
    pub show_ads: bool,

    /// Listing access for reviews
    pub reviews: ListingAccess,

    /// Listing access for roadmaps
    pub roadmaps: ListingAccess,

    /// Listing access for comments
    pub comments: ListingAccess,
}

impl Permissions {
    /// Derive permissions from the current session.
    ///
    /// All verdicts come from [`evaluate`], so this surface cannot
    /// drift from the server or the storage rules.
    ///
    /// # Arguments
    ///
    /// * `session` - The cached session, or `None` when signed out
    /// * `quotas` - The active quota policy
    pub fn derive(session: Option<&SessionSnapshot>, quotas: &QuotaPolicy) -> Self {
        let actor = match session {
            Some(session) => Actor::new(session.user_id, session.role),
            None => Actor::anonymous(),
        };

        let can_create = evaluate(&actor, Operation::Create, None).is_allow();

        Self {
            user_id: actor.id,
            role: actor.role,
            can_create,
            can_comment: can_create,
            can_moderate: evaluate(&actor, Operation::Moderate, None).is_allow(),
            can_manage_users: evaluate(&actor, Operation::ManageUsers, None).is_allow(),
            show_ads: show_ads(&actor.role),
            reviews: listing_access(&actor.role, ContentKind::Review, quotas),
            roadmaps: listing_access(&actor.role, ContentKind::Roadmap, quotas),
            comments: listing_access(&actor.role, ContentKind::Comment, quotas),
        }
    }

    /// Derive permissions from a raw cached session blob.
    ///
    /// The tolerant entry point for client code: `None` or malformed
    /// input falls back to fully-unauthenticated permissions.
    ///
    /// # Arguments
    ///
    /// * `raw` - The raw cached string, if any
    /// * `quotas` - The active quota policy
    pub fn from_cached_session(raw: Option<&str>, quotas: &QuotaPolicy) -> Self {
        let session = raw.and_then(SessionSnapshot::from_cached_json);
        Self::derive(session.as_ref(), quotas)
    }

    /// Get the listing access for a content kind.
    pub fn listing(&self, kind: ContentKind) -> &ListingAccess {
        match kind {
            ContentKind::Review => &self.reviews,
            ContentKind::Roadmap => &self.roadmaps,
            ContentKind::Comment => &self.comments,
        }
    }
}

/// Truncate a fetched listing to what this access level shows.
///
/// The server returns the full permitted set; this is where the quota
/// actually bites. Returns the items to render and whether an upgrade
/// prompt should follow them.
///
/// # Arguments
///
/// * `items` - The fetched items, already filtered by per-item policy
/// * `access` - The listing access for this content kind
///
/// # Returns
///
/// The (possibly truncated) items and an upgrade-prompt flag
///
/// # Examples
///
/// ```
/// use platform_policy::{truncate_listing, ListingAccess};
///
/// let access = ListingAccess::Limited {
///     limit: 1,
///     upgrade_message: "Sign in to see more".into(),
/// };
/// let (shown, upgrade) = truncate_listing(vec!["a", "b", "c"], &access);
/// assert_eq!(shown, vec!["a"]);
/// assert!(upgrade);
/// ```
pub fn truncate_listing<T>(mut items: Vec<T>, access: &ListingAccess) -> (Vec<T>, bool) {
    match access {
        ListingAccess::Full => (items, false),
        ListingAccess::Limited { limit, .. } => {
            // The prompt shows whenever the cap is reached: the client
            // fetched a bounded page and cannot know the true total.
            let upgrade = items.len() >= *limit;
            items.truncate(*limit);
            (items, upgrade)
        }
    }
}

fn show_ads(role: &UserRole) -> bool {
    match role {
        UserRole::Admin => false,
        UserRole::Blocked { .. } => true,
        UserRole::Ladder { rank } => rank.sees_ads(),
    }
}

fn listing_access(role: &UserRole, kind: ContentKind, quotas: &QuotaPolicy) -> ListingAccess {
    match quotas.listing_limit(role, kind) {
        None => ListingAccess::Full,
        Some(limit) => ListingAccess::Limited {
            limit,
            upgrade_message: upgrade_message(role, kind),
        },
    }
}

fn upgrade_message(role: &UserRole, kind: ContentKind) -> String {
    let noun = match kind {
        ContentKind::Review => "reviews",
        ContentKind::Roadmap => "roadmaps",
        ContentKind::Comment => "comments",
    };
    if role.is_authenticated() {
        format!("Get your first submission approved to unlock all {noun}")
    } else {
        format!("Sign in to see more {noun}")
    }
}
