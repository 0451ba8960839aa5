//! Cross-surface consistency tests
//!
//! The policy decision table is the single source of truth. These tests
//! replay every row against the compiled storage ruleset (mapped through
//! the request shapes the datastore actually sees) and against the
//! client permission hook, so the three enforcement points cannot
//! silently disagree.

use serde_json::Value;
use uuid::Uuid;

use platform_moderation::ModerationStatus;
use platform_policy::{
    decision_table, truncate_listing, DecisionRow, ItemView, ListingAccess, Operation,
    Permissions, QuotaPolicy, SessionSnapshot,
};
use platform_roles::{LadderRank, UserRole};
use platform_rules::{Collection, RuleAuth, RuleDocument, RuleOp, RuleRequest, RuleSet};

/// The identity a table row acts under, in storage-request form.
///
/// Visitors carry no credential at all; every other role carries its
/// actor id (the item's owner for owner rows, a fixed stranger
/// otherwise).
fn auth_for(row: &DecisionRow) -> Option<RuleAuth> {
    if row.role.ladder_rank() == Some(LadderRank::Visitor) {
        return None;
    }
    let uid = match (&row.item, row.is_owner) {
        (Some(item), true) => item.author_id,
        _ => Uuid::from_u128(2),
    };
    Some(RuleAuth {
        uid,
        role: row.role,
    })
}

fn stored_doc(item: &ItemView) -> RuleDocument {
    RuleDocument::content(item.author_id, item.status, item.withdrawn)
}

fn request(row: &DecisionRow, operation: RuleOp, collection: Collection) -> RuleRequest {
    match auth_for(row) {
        Some(auth) => RuleRequest::new(auth, operation, collection),
        None => RuleRequest::anonymous(operation, collection),
    }
}

#[test]
fn reads_match_the_decision_table() {
    let rules = RuleSet::compile();
    for row in decision_table() {
        if row.operation != Operation::Read {
            continue;
        }
        let Some(item) = row.item else {
            // Item-less read is the listing primitive; per-document
            // rules do not apply.
            continue;
        };
        let req = request(&row, RuleOp::Get, Collection::Reviews).with_document(stored_doc(&item));
        assert_eq!(
            rules.evaluate(&req).is_allow(),
            row.verdict.is_allow(),
            "read diverged from table: {row:?}",
        );
    }
}

#[test]
fn creates_match_the_decision_table() {
    let rules = RuleSet::compile();
    for row in decision_table() {
        if row.operation != Operation::Create {
            continue;
        }
        let auth = auth_for(&row);
        // A compliant create: authored by the requester, entering
        // moderation as pending.
        let author = auth.map(|a| a.uid).unwrap_or_else(Uuid::now_v7);
        let new_doc = RuleDocument::content(author, ModerationStatus::Pending, false);
        let req =
            request(&row, RuleOp::Create, Collection::Reviews).with_new_document(new_doc);
        assert_eq!(
            rules.evaluate(&req).is_allow(),
            row.verdict.is_allow(),
            "create diverged from table: {row:?}",
        );
    }
}

#[test]
fn owner_edits_match_the_decision_table() {
    let rules = RuleSet::compile();
    for row in decision_table() {
        if row.operation != Operation::Update {
            continue;
        }
        let Some(item) = row.item else { continue };
        // A compliant edit: same author, reset to pending, moderation
        // fields untouched.
        let new_doc = RuleDocument::content(item.author_id, ModerationStatus::Pending, false);
        let req = request(&row, RuleOp::Update, Collection::Reviews)
            .with_document(stored_doc(&item))
            .with_new_document(new_doc);
        assert_eq!(
            rules.evaluate(&req).is_allow(),
            row.verdict.is_allow(),
            "update diverged from table: {row:?}",
        );
    }
}

#[test]
fn withdrawals_match_the_delete_rows() {
    let rules = RuleSet::compile();
    for row in decision_table() {
        if row.operation != Operation::Delete {
            continue;
        }
        let Some(item) = row.item else { continue };
        // Soft deletes reach storage as updates writing the withdraw
        // shape; the ruleset judges them by the table's delete rows.
        let new_doc = RuleDocument::content(item.author_id, ModerationStatus::Rejected, true);
        let req = request(&row, RuleOp::Update, Collection::Reviews)
            .with_document(stored_doc(&item))
            .with_new_document(new_doc);
        assert_eq!(
            rules.evaluate(&req).is_allow(),
            row.verdict.is_allow(),
            "withdrawal diverged from table: {row:?}",
        );
    }
}

#[test]
fn moderation_writes_match_the_moderate_rows() {
    let rules = RuleSet::compile();
    let author = Uuid::from_u128(1);
    for row in decision_table() {
        if row.operation != Operation::Moderate {
            continue;
        }
        // Moderation at the storage level is an update stamping the
        // decision onto someone else's pending item.
        let doc = RuleDocument::content(author, ModerationStatus::Pending, false);
        let new_doc = RuleDocument::content(author, ModerationStatus::Approved, false)
            .with_field("moderated_by", Value::String(Uuid::from_u128(2).to_string()));
        let req = request(&row, RuleOp::Update, Collection::Reviews)
            .with_document(doc)
            .with_new_document(new_doc);
        assert_eq!(
            rules.evaluate(&req).is_allow(),
            row.verdict.is_allow(),
            "moderation diverged from table: {row:?}",
        );
    }
}

#[test]
fn role_writes_match_the_manage_users_rows() {
    let rules = RuleSet::compile();
    let target = Uuid::from_u128(7);
    for row in decision_table() {
        if row.operation != Operation::ManageUsers {
            continue;
        }
        // Managing users at the storage level is an update changing the
        // role field on someone else's account document.
        let doc = RuleDocument::user(
            target,
            UserRole::Ladder {
                rank: LadderRank::Member,
            },
        );
        let new_doc = RuleDocument::user(
            target,
            UserRole::Ladder {
                rank: LadderRank::Contributor,
            },
        );
        let req = request(&row, RuleOp::Update, Collection::Users)
            .with_document(doc)
            .with_new_document(new_doc);
        assert_eq!(
            rules.evaluate(&req).is_allow(),
            row.verdict.is_allow(),
            "role write diverged from table: {row:?}",
        );
    }
}

#[test]
fn client_hook_agrees_with_the_table() {
    let quotas = QuotaPolicy::default();
    for row in decision_table() {
        if row.item.is_some() {
            continue;
        }
        let session = auth_for(&row).map(|auth| SessionSnapshot::new(auth.uid, auth.role));
        let perms = Permissions::derive(session.as_ref(), &quotas);
        let shown = match row.operation {
            Operation::Create => perms.can_create,
            Operation::Moderate => perms.can_moderate,
            Operation::ManageUsers => perms.can_manage_users,
            _ => continue,
        };
        assert_eq!(
            shown,
            row.verdict.is_allow(),
            "client hook diverged from table: {row:?}",
        );
    }
}

/// The quota is asymmetric on purpose: the storage rules grant a member
/// per-item read access to every approved review, while the client hook
/// truncates the listing to the quota. A direct query returning more
/// than the quota is correct behavior, not a bypass.
#[test]
fn quota_lives_only_in_the_client_tier() {
    let rules = RuleSet::compile();
    let member = RuleAuth {
        uid: Uuid::now_v7(),
        role: UserRole::Ladder {
            rank: LadderRank::Member,
        },
    };

    // Storage: ten distinct approved reviews, all readable.
    let docs: Vec<RuleDocument> = (0..10)
        .map(|_| RuleDocument::content(Uuid::now_v7(), ModerationStatus::Approved, false))
        .collect();
    for doc in &docs {
        let req = RuleRequest::new(member, RuleOp::Get, Collection::Reviews)
            .with_document(doc.clone());
        assert!(rules.evaluate(&req).is_allow());
    }

    // Client: the same member renders one of them plus an upgrade
    // prompt.
    let session = SessionSnapshot::new(member.uid, member.role);
    let perms = Permissions::derive(Some(&session), &QuotaPolicy::default());
    match &perms.reviews {
        ListingAccess::Limited { limit, .. } => assert_eq!(*limit, 1),
        ListingAccess::Full => panic!("member reviews should be quota-limited"),
    }
    let (shown, upgrade) = truncate_listing(docs, &perms.reviews);
    assert_eq!(shown.len(), 1);
    assert!(upgrade);
}
