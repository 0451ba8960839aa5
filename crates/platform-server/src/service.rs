//! Request handling services
//!
//! This module provides the server-side enforcement point. Every
//! handler follows the same sequence: verify the session token, re-read
//! the caller's role from the stored account, evaluate the policy, then
//! commit. The role in play is always the stored one, never a claim the
//! client supplied.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use platform_moderation::{ContentItem, ContentKind, ModerationStatus};
use platform_policy::{evaluate, Actor, ItemView, Operation};
use platform_roles::{LadderRank, UserAccount, UserRole};

use crate::error::{require, ApiError, ApiResult};
use crate::events::{Signal, SignalBus};
use crate::identity::IdentityVerifier;
use crate::store::PlatformStore;

/// Upper bound on items returned from one listing request.
///
/// This is a transport page size, not the visibility quota; the quota
/// is applied by the presentation tier.
const MAX_LISTING: usize = 100;

/// Resolve a session token into an acting caller.
///
/// The role comes from the stored account, so a token minted before a
/// block or promotion acts under the current role, not the stale one.
async fn resolve_actor(
    store: &dyn PlatformStore,
    verifier: &IdentityVerifier,
    token: Option<&str>,
) -> ApiResult<Actor> {
    let Some(token) = token else {
        return Ok(Actor::anonymous());
    };
    let claims = verifier.verify(token)?;
    let account = store
        .get_user(claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Actor::new(account.id, account.role))
}

/// Commit a mutated item, compare-and-set on the stamp read before the
/// mutation.
///
/// A lost race means another handler committed between our read and
/// this write; the caller gets a conflict and retries against the fresh
/// state instead of silently overwriting it.
async fn commit_content(
    store: &dyn PlatformStore,
    expected: DateTime<Utc>,
    item: &ContentItem,
) -> ApiResult<()> {
    if store.update_content(item.id, expected, item.clone()).await? {
        Ok(())
    } else {
        Err(ApiError::Conflict("content changed concurrently".into()))
    }
}

/// Handles reading, submitting, editing, and withdrawing content.
pub struct ContentService {
    store: Arc<dyn PlatformStore>,
    bus: Arc<dyn SignalBus>,
    verifier: Arc<IdentityVerifier>,
}

impl ContentService {
    /// Create a content service.
    ///
    /// # Arguments
    ///
    /// * `store` - The backing datastore
    /// * `bus` - The signal bus for downstream notifications
    /// * `verifier` - The session token verifier
    pub fn new(
        store: Arc<dyn PlatformStore>,
        bus: Arc<dyn SignalBus>,
        verifier: Arc<IdentityVerifier>,
    ) -> Self {
        Self {
            store,
            bus,
            verifier,
        }
    }

    /// Fetch a single item.
    ///
    /// # Returns
    ///
    /// The item, or [`ApiError::NotFound`] both when it does not exist
    /// and when the caller may not see it
    pub async fn get(&self, token: Option<&str>, item_id: Uuid) -> ApiResult<ContentItem> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        let item = self
            .store
            .get_content(item_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        require(evaluate(&actor, Operation::Read, Some(&ItemView::of(&item))))?;
        Ok(item)
    }

    /// List items of a kind the caller may see.
    ///
    /// Returns the approved set plus the caller's own non-visible
    /// items (admins see everything), bounded by the transport page
    /// size. The presentation-tier quota is deliberately not applied
    /// here.
    pub async fn list(&self, token: Option<&str>, kind: ContentKind) -> ApiResult<Vec<ContentItem>> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        require(evaluate(&actor, Operation::Read, None))?;

        let mut items = self.store.list_content(kind).await?;
        items.retain(|item| {
            evaluate(&actor, Operation::Read, Some(&ItemView::of(item))).is_allow()
        });
        items.truncate(MAX_LISTING);
        Ok(items)
    }

    /// Submit a new item into the moderation queue.
    ///
    /// # Arguments
    ///
    /// * `token` - The caller's session token
    /// * `kind` - What to submit
    /// * `parent_id` - The parent review, required for comments and
    ///   rejected for everything else
    /// * `payload` - The item content
    pub async fn create(
        &self,
        token: Option<&str>,
        kind: ContentKind,
        parent_id: Option<Uuid>,
        payload: Value,
    ) -> ApiResult<ContentItem> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        require(evaluate(&actor, Operation::Create, None))?;
        let author_id = actor.id.ok_or(ApiError::Unauthenticated)?;

        let item = match kind {
            ContentKind::Comment => {
                let parent_id = parent_id.ok_or_else(|| {
                    ApiError::ValidationFailed("comments require a parent review".into())
                })?;
                self.check_comment_parent(&actor, parent_id).await?;
                ContentItem::new_comment(author_id, parent_id)
            }
            ContentKind::Review | ContentKind::Roadmap => {
                if parent_id.is_some() {
                    return Err(ApiError::ValidationFailed(format!(
                        "a {} cannot have a parent",
                        kind.as_str()
                    )));
                }
                ContentItem::new(kind, author_id)
            }
        };
        let item = item.with_payload(payload);

        self.store.put_content(item.clone()).await?;
        tracing::info!(item_id = %item.id, kind = kind.as_str(), "content submitted");
        self.bus
            .publish(Signal::Submitted {
                item_id: item.id,
                kind,
                author_id,
            })
            .await;
        Ok(item)
    }

    /// Apply an owner edit, sending the item back through moderation.
    ///
    /// Only the payload is writable here; status and moderation fields
    /// are reserved for the moderation endpoints.
    pub async fn update(
        &self,
        token: Option<&str>,
        item_id: Uuid,
        payload: Value,
    ) -> ApiResult<ContentItem> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        let mut item = self
            .store
            .get_content(item_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        require(evaluate(&actor, Operation::Update, Some(&ItemView::of(&item))))?;

        // Payload edits take the owner edit transition for admins too:
        // a rejected item's payload stays frozen, and status moves only
        // through the moderation endpoints.
        let expected = item.updated_at;
        item.edit()?;
        item.payload = payload;
        commit_content(self.store.as_ref(), expected, &item).await?;

        // An edit re-enters the queue like a fresh submission.
        self.bus
            .publish(Signal::Submitted {
                item_id: item.id,
                kind: item.kind,
                author_id: item.author_id,
            })
            .await;
        Ok(item)
    }

    /// Withdraw an item (soft delete).
    ///
    /// The record is kept for audit; withdrawing an already-withdrawn
    /// item succeeds without change.
    pub async fn withdraw(&self, token: Option<&str>, item_id: Uuid) -> ApiResult<ContentItem> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        let mut item = self
            .store
            .get_content(item_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        require(evaluate(&actor, Operation::Delete, Some(&ItemView::of(&item))))?;

        let already = item.withdrawn;
        let expected = item.updated_at;
        item.withdraw()?;
        if already {
            return Ok(item);
        }
        commit_content(self.store.as_ref(), expected, &item).await?;
        tracing::info!(item_id = %item.id, "content withdrawn");
        self.bus
            .publish(Signal::Withdrawn {
                item_id: item.id,
                kind: item.kind,
                author_id: item.author_id,
            })
            .await;
        Ok(item)
    }

    async fn check_comment_parent(&self, actor: &Actor, parent_id: Uuid) -> ApiResult<()> {
        let parent = self.store.get_content(parent_id).await?;
        let valid = parent.as_ref().is_some_and(|p| {
            p.kind == ContentKind::Review
                && evaluate(actor, Operation::Read, Some(&ItemView::of(p))).is_allow()
                && p.is_visible()
        });
        if valid {
            Ok(())
        } else {
            Err(ApiError::ValidationFailed(
                "parent review not found or not visible".into(),
            ))
        }
    }
}

/// Handles moderation decisions and role administration.
pub struct AdminService {
    store: Arc<dyn PlatformStore>,
    bus: Arc<dyn SignalBus>,
    verifier: Arc<IdentityVerifier>,
}

impl AdminService {
    /// Create an admin service.
    ///
    /// # Arguments
    ///
    /// * `store` - The backing datastore
    /// * `bus` - The signal bus for downstream notifications
    /// * `verifier` - The session token verifier
    pub fn new(
        store: Arc<dyn PlatformStore>,
        bus: Arc<dyn SignalBus>,
        verifier: Arc<IdentityVerifier>,
    ) -> Self {
        Self {
            store,
            bus,
            verifier,
        }
    }

    /// Approve a pending item.
    ///
    /// Idempotent: approving an already-approved item returns it
    /// unchanged. On the author's first approval their account is
    /// promoted Member → Contributor; the promotion is best-effort and
    /// never rolls the approval back.
    pub async fn approve(&self, token: Option<&str>, item_id: Uuid) -> ApiResult<ContentItem> {
        let moderator_id = self.require_moderator(token).await?;
        let mut item = self
            .store
            .get_content(item_id)
            .await?
            .ok_or(ApiError::NotFound)?;

        if item.status == ModerationStatus::Approved && !item.withdrawn {
            return Ok(item);
        }
        let expected = item.updated_at;
        item.approve(moderator_id)?;
        commit_content(self.store.as_ref(), expected, &item).await?;
        tracing::info!(item_id = %item.id, moderator_id = %moderator_id, "content approved");
        self.bus
            .publish(Signal::Approved {
                item_id: item.id,
                kind: item.kind,
                author_id: item.author_id,
                moderator_id,
            })
            .await;

        self.promote_author_once(item.author_id).await;
        Ok(item)
    }

    /// Reject a pending item.
    pub async fn reject(&self, token: Option<&str>, item_id: Uuid) -> ApiResult<ContentItem> {
        let moderator_id = self.require_moderator(token).await?;
        let mut item = self
            .store
            .get_content(item_id)
            .await?
            .ok_or(ApiError::NotFound)?;

        let expected = item.updated_at;
        item.reject(moderator_id)?;
        commit_content(self.store.as_ref(), expected, &item).await?;
        tracing::info!(item_id = %item.id, moderator_id = %moderator_id, "content rejected");
        self.bus
            .publish(Signal::Rejected {
                item_id: item.id,
                kind: item.kind,
                author_id: item.author_id,
                moderator_id,
            })
            .await;
        Ok(item)
    }

    /// Upgrade a Contributor to Premium.
    pub async fn promote_to_premium(
        &self,
        token: Option<&str>,
        user_id: Uuid,
    ) -> ApiResult<UserAccount> {
        let account = self.load_managed_account(token, user_id).await?;
        let expected = account.role;
        let mut next = account;
        next.promote_to_premium()?;
        self.commit_role(user_id, expected, &next).await?;
        self.bus
            .publish(Signal::RankChanged {
                user_id,
                rank: LadderRank::Premium,
            })
            .await;
        Ok(next)
    }

    /// Downgrade a Premium account back to Contributor.
    pub async fn demote_to_contributor(
        &self,
        token: Option<&str>,
        user_id: Uuid,
    ) -> ApiResult<UserAccount> {
        let account = self.load_managed_account(token, user_id).await?;
        let expected = account.role;
        let mut next = account;
        next.demote_to_contributor()?;
        self.commit_role(user_id, expected, &next).await?;
        self.bus
            .publish(Signal::RankChanged {
                user_id,
                rank: LadderRank::Contributor,
            })
            .await;
        Ok(next)
    }

    /// Suspend a user, snapshotting their current rank.
    pub async fn block(&self, token: Option<&str>, user_id: Uuid) -> ApiResult<UserAccount> {
        let account = self.load_managed_account(token, user_id).await?;
        let expected = account.role;
        let mut next = account;
        next.block()?;
        self.commit_role(user_id, expected, &next).await?;
        tracing::info!(user_id = %user_id, "user blocked");
        self.bus.publish(Signal::UserBlocked { user_id }).await;
        Ok(next)
    }

    /// Lift a suspension, restoring the snapshotted rank.
    pub async fn unblock(&self, token: Option<&str>, user_id: Uuid) -> ApiResult<UserAccount> {
        let account = self.load_managed_account(token, user_id).await?;
        let expected = account.role;
        let mut next = account;
        next.unblock()?;
        self.commit_role(user_id, expected, &next).await?;
        tracing::info!(user_id = %user_id, "user unblocked");
        self.bus.publish(Signal::UserUnblocked { user_id }).await;
        Ok(next)
    }

    /// Authenticate and authorize a moderation caller.
    async fn require_moderator(&self, token: Option<&str>) -> ApiResult<Uuid> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        require(evaluate(&actor, Operation::Moderate, None))?;
        actor.id.ok_or(ApiError::Forbidden)
    }

    /// Authenticate a role-administration caller and load the target.
    ///
    /// Admin accounts cannot be managed, and admins cannot act on their
    /// own account.
    async fn load_managed_account(
        &self,
        token: Option<&str>,
        user_id: Uuid,
    ) -> ApiResult<UserAccount> {
        let actor = resolve_actor(self.store.as_ref(), &self.verifier, token).await?;
        require(evaluate(&actor, Operation::ManageUsers, None))?;
        if actor.id == Some(user_id) {
            return Err(ApiError::Forbidden);
        }
        let account = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if account.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(account)
    }

    async fn commit_role(
        &self,
        user_id: Uuid,
        expected: UserRole,
        next: &UserAccount,
    ) -> ApiResult<()> {
        if self
            .store
            .update_user_role(user_id, expected, next.role)
            .await?
        {
            Ok(())
        } else {
            Err(ApiError::Conflict("role changed concurrently".into()))
        }
    }

    /// Promote the author Member → Contributor after a first approval.
    ///
    /// At most once: the compare-and-set loses any race with a
    /// concurrent role change and re-checks eligibility before
    /// retrying. Failures are logged and swallowed; the approval that
    /// triggered this has already been committed and stands.
    async fn promote_author_once(&self, author_id: Uuid) {
        for _ in 0..3 {
            let account = match self.store.get_user(author_id).await {
                Ok(Some(account)) => account,
                Ok(None) => return,
                Err(err) => {
                    tracing::warn!(
                        user_id = %author_id,
                        error = %err,
                        "first-approval promotion failed; approval stands",
                    );
                    return;
                }
            };
            let expected = account.role;
            let mut next = account;
            match next.promote_to_contributor() {
                Ok(true) => {}
                // Already at or above Contributor, blocked, or admin.
                _ => return,
            }
            match self
                .store
                .update_user_role(author_id, expected, next.role)
                .await
            {
                Ok(true) => {
                    tracing::info!(user_id = %author_id, "author promoted on first approval");
                    self.bus
                        .publish(Signal::RankChanged {
                            user_id: author_id,
                            rank: LadderRank::Contributor,
                        })
                        .await;
                    return;
                }
                Ok(false) => continue,
                Err(err) => {
                    tracing::warn!(
                        user_id = %author_id,
                        error = %err,
                        "first-approval promotion failed; approval stands",
                    );
                    return;
                }
            }
        }
        tracing::warn!(user_id = %author_id, "first-approval promotion abandoned after races");
    }
}
