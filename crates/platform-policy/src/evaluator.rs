//! Policy evaluation
//!
//! This module is the single function family every enforcement point
//! calls (or compiles from). It is pure and stateless: the same inputs
//! always produce the same verdict, with no I/O and no clock.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use platform_moderation::{ContentItem, ModerationStatus};
use platform_roles::{LadderRank, UserRole};

/// An operation a caller may request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Read a single item or list approved content
    Read,

    /// Create a new content item
    Create,

    /// Update an existing item's payload or moderation fields
    Update,

    /// Soft-delete an item
    Delete,

    /// Approve or reject pending items
    Moderate,

    /// Promote, demote, block, or unblock users
    ManageUsers,
}

impl Operation {
    /// Get string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Moderate => "moderate",
            Self::ManageUsers => "manage_users",
        }
    }

    /// Get all operations.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Read,
            Self::Create,
            Self::Update,
            Self::Delete,
            Self::Moderate,
            Self::ManageUsers,
        ]
    }

    /// Check if this operation targets an existing item.
    pub fn targets_item(&self) -> bool {
        matches!(self, Self::Read | Self::Update | Self::Delete)
    }
}

/// The acting caller: a verified identity (or none) plus the role read
/// from their stored account (never from client-supplied claims).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Verified user ID; `None` for anonymous callers
    pub id: Option<Uuid>,

    /// Role as stored on the user record
    pub role: UserRole,
}

impl Actor {
    /// An authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The verified user ID
    /// * `role` - The role read from the user's stored account
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self {
            id: Some(id),
            role,
        }
    }

    /// An anonymous caller with no session.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: UserRole::anonymous(),
        }
    }

    /// Check if this actor owns the given item.
    pub fn owns(&self, item: &ItemView) -> bool {
        self.id == Some(item.author_id)
    }
}

/// The minimal projection of a content item the evaluator needs.
///
/// This mirrors the persisted shape contract: any richer payload is
/// opaque to the policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemView {
    /// Owning user ID
    pub author_id: Uuid,

    /// Moderation status
    pub status: ModerationStatus,

    /// Whether the owner withdrew the item
    pub withdrawn: bool,
}

impl ItemView {
    /// Project a full content item down to its policy-relevant fields.
    pub fn of(item: &ContentItem) -> Self {
        Self {
            author_id: item.author_id,
            status: item.status,
            withdrawn: item.withdrawn,
        }
    }

    /// Check if this item is publicly visible.
    pub fn is_visible(&self) -> bool {
        self.status == ModerationStatus::Approved && !self.withdrawn
    }
}

/// Why an operation was denied.
///
/// The three reasons map onto distinguishable transport errors: missing
/// credential, insufficient role/ownership, and a masked denial that
/// must not reveal whether the item exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No valid credential was presented
    Unauthenticated,

    /// Valid credential, insufficient role or ownership
    Forbidden,

    /// Denied, and the item's existence must not leak; surfaces as
    /// not-found
    Hidden,
}

/// The outcome of a policy evaluation.
///
/// Verdicts are data, not errors: a denial is an ordinary value the
/// caller maps to its own error surface (transport status, silent rule
/// denial, or a downgraded UI).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The operation is permitted
    Allow,

    /// The operation is denied
    Deny(DenyReason),
}

impl Verdict {
    /// Check if this verdict permits the operation.
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluate whether an actor may perform an operation.
///
/// The complete rule set:
///
/// - **Read**: visible items are readable by anyone, anonymous
///   included; non-visible items only by the owner or an admin, and a
///   denial is always [`DenyReason::Hidden`] so strangers cannot probe
///   for hidden items. Passing no item means listing approved content,
///   which is always allowed (the listing quota is applied by the
///   presentation tier, not here).
/// - **Create**: denied for visitors (no session) and blocked accounts;
///   allowed for every signed-in ladder rank and admins.
/// - **Update**: admins always (they alone touch moderation fields);
///   owners while the item is pending or approved, never once rejected.
/// - **Delete**: the owner or an admin, from any state.
/// - **Moderate** / **ManageUsers**: admins only.
///
/// # Arguments
///
/// * `actor` - The acting caller
/// * `operation` - The requested operation
/// * `item` - The target item, for operations that have one
///
/// # Returns
///
/// [`Verdict::Allow`] or a typed denial; never panics
pub fn evaluate(actor: &Actor, operation: Operation, item: Option<&ItemView>) -> Verdict {
    match operation {
        Operation::Read => match item {
            None => Verdict::Allow,
            Some(item) => {
                if item.is_visible() || actor.role.is_admin() || actor.owns(item) {
                    Verdict::Allow
                } else {
                    Verdict::Deny(DenyReason::Hidden)
                }
            }
        },

        Operation::Create => match actor.role {
            UserRole::Admin => Verdict::Allow,
            UserRole::Blocked { .. } => Verdict::Deny(DenyReason::Forbidden),
            UserRole::Ladder { rank } => {
                if rank.is_authenticated() {
                    Verdict::Allow
                } else {
                    Verdict::Deny(DenyReason::Unauthenticated)
                }
            }
        },

        Operation::Update => {
            let Some(item) = item else {
                return Verdict::Deny(DenyReason::Forbidden);
            };
            if actor.role.is_admin() {
                return Verdict::Allow;
            }
            if actor.id.is_none() {
                return Verdict::Deny(DenyReason::Unauthenticated);
            }
            if actor.role.is_blocked() {
                return Verdict::Deny(DenyReason::Forbidden);
            }
            if actor.owns(item) {
                if item.status == ModerationStatus::Rejected {
                    Verdict::Deny(DenyReason::Forbidden)
                } else {
                    Verdict::Allow
                }
            } else if item.is_visible() {
                Verdict::Deny(DenyReason::Forbidden)
            } else {
                Verdict::Deny(DenyReason::Hidden)
            }
        }

        Operation::Delete => {
            let Some(item) = item else {
                return Verdict::Deny(DenyReason::Forbidden);
            };
            if actor.role.is_admin() {
                return Verdict::Allow;
            }
            if actor.id.is_none() {
                return Verdict::Deny(DenyReason::Unauthenticated);
            }
            if actor.role.is_blocked() {
                return Verdict::Deny(DenyReason::Forbidden);
            }
            if actor.owns(item) {
                Verdict::Allow
            } else if item.is_visible() {
                Verdict::Deny(DenyReason::Forbidden)
            } else {
                Verdict::Deny(DenyReason::Hidden)
            }
        }

        Operation::Moderate | Operation::ManageUsers => {
            if actor.role.is_admin() {
                Verdict::Allow
            } else if actor.id.is_none() {
                Verdict::Deny(DenyReason::Unauthenticated)
            } else {
                Verdict::Deny(DenyReason::Forbidden)
            }
        }
    }
}

/// One row of the exhaustive policy decision table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionRow {
    /// The actor's role
    pub role: UserRole,

    /// Whether the actor is the item's owner (meaningless without an
    /// item, always `false` for anonymous actors)
    pub is_owner: bool,

    /// The requested operation
    pub operation: Operation,

    /// The target item projection, for operations that have one
    pub item: Option<ItemView>,

    /// The verdict the policy produces for this combination
    pub verdict: Verdict,
}

/// Enumerate the full policy decision table.
///
/// Every combination of role class, moderation status, withdrawal flag,
/// ownership, and operation is evaluated through [`evaluate`], so the
/// table cannot drift from the evaluator. The storage ruleset compiles
/// from this table, and the cross-surface consistency tests replay it
/// against every enforcement point.
pub fn decision_table() -> Vec<DecisionRow> {
    let owner_id = Uuid::from_u128(1);
    let stranger_id = Uuid::from_u128(2);

    let roles = [
        UserRole::Ladder {
            rank: LadderRank::Visitor,
        },
        UserRole::Ladder {
            rank: LadderRank::Member,
        },
        UserRole::Ladder {
            rank: LadderRank::Contributor,
        },
        UserRole::Ladder {
            rank: LadderRank::Premium,
        },
        UserRole::Blocked {
            previous: LadderRank::Member,
        },
        UserRole::Admin,
    ];

    let item_shapes = [
        (ModerationStatus::Pending, false),
        (ModerationStatus::Approved, false),
        (ModerationStatus::Rejected, false),
        (ModerationStatus::Rejected, true),
    ];

    let mut rows = Vec::new();

    for role in roles {
        // Visitors have no identity, so they can never be owners.
        let anonymous = matches!(
            role,
            UserRole::Ladder {
                rank: LadderRank::Visitor
            }
        );

        let ownerships: &[bool] = if anonymous { &[false] } else { &[false, true] };

        for operation in Operation::all() {
            if operation.targets_item() {
                for (status, withdrawn) in item_shapes {
                    let item = ItemView {
                        author_id: owner_id,
                        status,
                        withdrawn,
                    };
                    for &is_owner in ownerships {
                        let actor = if anonymous {
                            Actor::anonymous()
                        } else {
                            Actor::new(if is_owner { owner_id } else { stranger_id }, role)
                        };
                        rows.push(DecisionRow {
                            role,
                            is_owner,
                            operation,
                            item: Some(item),
                            verdict: evaluate(&actor, operation, Some(&item)),
                        });
                    }
                }
            } else {
                let actor = if anonymous {
                    Actor::anonymous()
                } else {
                    Actor::new(stranger_id, role)
                };
                rows.push(DecisionRow {
                    role,
                    is_owner: false,
                    operation,
                    item: None,
                    verdict: evaluate(&actor, operation, None),
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ModerationStatus, withdrawn: bool, author: Uuid) -> ItemView {
        ItemView {
            author_id: author,
            status,
            withdrawn,
        }
    }

    fn ladder(rank: LadderRank) -> UserRole {
        UserRole::Ladder { rank }
    }

    #[test]
    fn test_read_matrix() {
        // canRead(role, status, ownership) == approved-or-owner-or-admin
        // across the full role x status x ownership matrix.
        let owner_id = Uuid::now_v7();
        let stranger_id = Uuid::now_v7();

        let roles = [
            ladder(LadderRank::Member),
            ladder(LadderRank::Contributor),
            ladder(LadderRank::Premium),
            UserRole::Blocked {
                previous: LadderRank::Member,
            },
            UserRole::Admin,
        ];

        for role in roles {
            for status in ModerationStatus::all() {
                for is_owner in [false, true] {
                    let actor = Actor::new(if is_owner { owner_id } else { stranger_id }, role);
                    let view = item(status, false, owner_id);
                    let expected = status == ModerationStatus::Approved
                        || is_owner
                        || role.is_admin();
                    assert_eq!(
                        evaluate(&actor, Operation::Read, Some(&view)).is_allow(),
                        expected,
                        "role={role:?} status={status:?} owner={is_owner}",
                    );
                }
            }
        }

        // Anonymous covers the remaining role, never an owner.
        for status in ModerationStatus::all() {
            let view = item(status, false, owner_id);
            let expected = status == ModerationStatus::Approved;
            assert_eq!(
                evaluate(&Actor::anonymous(), Operation::Read, Some(&view)).is_allow(),
                expected,
            );
        }
    }

    #[test]
    fn test_hidden_reads_are_masked() {
        let owner_id = Uuid::now_v7();
        let view = item(ModerationStatus::Pending, false, owner_id);

        let stranger = Actor::new(Uuid::now_v7(), ladder(LadderRank::Premium));
        assert_eq!(
            evaluate(&stranger, Operation::Read, Some(&view)),
            Verdict::Deny(DenyReason::Hidden)
        );
        assert_eq!(
            evaluate(&Actor::anonymous(), Operation::Read, Some(&view)),
            Verdict::Deny(DenyReason::Hidden)
        );
    }

    #[test]
    fn test_withdrawn_items_are_hidden_even_when_previously_approved() {
        let owner_id = Uuid::now_v7();
        let view = item(ModerationStatus::Rejected, true, owner_id);
        assert!(!evaluate(&Actor::anonymous(), Operation::Read, Some(&view)).is_allow());
        assert!(evaluate(
            &Actor::new(owner_id, ladder(LadderRank::Member)),
            Operation::Read,
            Some(&view)
        )
        .is_allow());
    }

    #[test]
    fn test_create_rule() {
        assert_eq!(
            evaluate(&Actor::anonymous(), Operation::Create, None),
            Verdict::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            evaluate(
                &Actor::new(
                    Uuid::now_v7(),
                    UserRole::Blocked {
                        previous: LadderRank::Premium
                    }
                ),
                Operation::Create,
                None
            ),
            Verdict::Deny(DenyReason::Forbidden)
        );
        for rank in [LadderRank::Member, LadderRank::Contributor, LadderRank::Premium] {
            assert!(evaluate(
                &Actor::new(Uuid::now_v7(), ladder(rank)),
                Operation::Create,
                None
            )
            .is_allow());
        }
        assert!(evaluate(&Actor::new(Uuid::now_v7(), UserRole::Admin), Operation::Create, None)
            .is_allow());
    }

    #[test]
    fn test_update_rule() {
        let owner_id = Uuid::now_v7();
        let owner = Actor::new(owner_id, ladder(LadderRank::Member));

        for status in [ModerationStatus::Pending, ModerationStatus::Approved] {
            let view = item(status, false, owner_id);
            assert!(evaluate(&owner, Operation::Update, Some(&view)).is_allow());
        }

        // No editing a rejected item back to life.
        let rejected = item(ModerationStatus::Rejected, false, owner_id);
        assert_eq!(
            evaluate(&owner, Operation::Update, Some(&rejected)),
            Verdict::Deny(DenyReason::Forbidden)
        );

        // Admins may always update (moderation fields).
        let admin = Actor::new(Uuid::now_v7(), UserRole::Admin);
        assert!(evaluate(&admin, Operation::Update, Some(&rejected)).is_allow());

        // Strangers are masked on hidden items, plainly forbidden on
        // visible ones.
        let stranger = Actor::new(Uuid::now_v7(), ladder(LadderRank::Premium));
        let pending = item(ModerationStatus::Pending, false, owner_id);
        assert_eq!(
            evaluate(&stranger, Operation::Update, Some(&pending)),
            Verdict::Deny(DenyReason::Hidden)
        );
        let approved = item(ModerationStatus::Approved, false, owner_id);
        assert_eq!(
            evaluate(&stranger, Operation::Update, Some(&approved)),
            Verdict::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_delete_rule() {
        let owner_id = Uuid::now_v7();
        let owner = Actor::new(owner_id, ladder(LadderRank::Member));
        let admin = Actor::new(Uuid::now_v7(), UserRole::Admin);
        let stranger = Actor::new(Uuid::now_v7(), ladder(LadderRank::Premium));

        for status in ModerationStatus::all() {
            let view = item(status, false, owner_id);
            assert!(evaluate(&owner, Operation::Delete, Some(&view)).is_allow());
            assert!(evaluate(&admin, Operation::Delete, Some(&view)).is_allow());
            assert!(!evaluate(&stranger, Operation::Delete, Some(&view)).is_allow());
        }
        assert_eq!(
            evaluate(&Actor::anonymous(), Operation::Delete, Some(&item(
                ModerationStatus::Approved,
                false,
                owner_id
            ))),
            Verdict::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_moderate_and_manage_users_are_admin_only() {
        for operation in [Operation::Moderate, Operation::ManageUsers] {
            assert!(evaluate(&Actor::new(Uuid::now_v7(), UserRole::Admin), operation, None)
                .is_allow());
            assert_eq!(
                evaluate(&Actor::anonymous(), operation, None),
                Verdict::Deny(DenyReason::Unauthenticated)
            );
            assert_eq!(
                evaluate(
                    &Actor::new(Uuid::now_v7(), ladder(LadderRank::Premium)),
                    operation,
                    None
                ),
                Verdict::Deny(DenyReason::Forbidden)
            );
            assert_eq!(
                evaluate(
                    &Actor::new(
                        Uuid::now_v7(),
                        UserRole::Blocked {
                            previous: LadderRank::Member
                        }
                    ),
                    operation,
                    None
                ),
                Verdict::Deny(DenyReason::Forbidden)
            );
        }
    }

    #[test]
    fn test_blocked_owner_cannot_update_or_delete() {
        let owner_id = Uuid::now_v7();
        let blocked_owner = Actor::new(
            owner_id,
            UserRole::Blocked {
                previous: LadderRank::Contributor,
            },
        );
        let view = item(ModerationStatus::Pending, false, owner_id);
        assert!(!evaluate(&blocked_owner, Operation::Update, Some(&view)).is_allow());
        assert!(!evaluate(&blocked_owner, Operation::Delete, Some(&view)).is_allow());
        // But they may still read their own item.
        assert!(evaluate(&blocked_owner, Operation::Read, Some(&view)).is_allow());
    }

    #[test]
    fn test_decision_table_matches_evaluator() {
        for row in decision_table() {
            let actor = match row.role.ladder_rank() {
                Some(LadderRank::Visitor) => Actor::anonymous(),
                _ => {
                    let id = if row.is_owner {
                        row.item.map(|i| i.author_id).unwrap_or(Uuid::from_u128(2))
                    } else {
                        Uuid::from_u128(2)
                    };
                    Actor::new(id, row.role)
                }
            };
            assert_eq!(
                evaluate(&actor, row.operation, row.item.as_ref()),
                row.verdict,
                "table row diverged: {row:?}",
            );
        }
    }

    #[test]
    fn test_decision_table_is_exhaustive() {
        let rows = decision_table();
        // 6 roles; item ops: 3 ops x 4 shapes x (1 or 2 ownerships);
        // item-less ops: 3 per role.
        let item_rows = 3 * 4 * (1 + 2 * 5);
        let bare_rows = 3 * 6;
        assert_eq!(rows.len(), item_rows + bare_rows);
    }
}
