//! Compiled rulesets
//!
//! This module compiles the policy decision table into a flat
//! allow-list keyed on (role class, operation, document shape,
//! ownership), then layers the write-shape validation the table cannot
//! express: author spoofing, role self-assignment, and moderation-field
//! tampering. Anything not explicitly allowed is denied.

use std::collections::HashSet;

use platform_moderation::ModerationStatus;
use platform_policy::{decision_table, Operation};
use platform_roles::{LadderRank, UserRole};

use crate::request::{Collection, RuleDocument, RuleOp, RuleRequest};

/// The outcome of a rule evaluation.
///
/// Deliberately carries no reason: the storage boundary fails closed
/// and silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    /// The request may proceed
    Allow,

    /// The request is rejected
    Deny,
}

impl RuleVerdict {
    /// Check if this verdict permits the request.
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    fn from_bool(allow: bool) -> Self {
        if allow {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}

/// A compiled, deny-by-default ruleset.
///
/// Per-item verdicts come straight from
/// [`platform_policy::decision_table`], so this surface cannot drift
/// from the evaluator the server handlers call. Soft deletes arrive
/// here as updates writing the withdraw shape; those are judged by the
/// table's delete rows. Physical deletes are never allowed.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use platform_moderation::ModerationStatus;
/// use platform_rules::{Collection, RuleDocument, RuleOp, RuleRequest, RuleSet};
///
/// let rules = RuleSet::compile();
///
/// // Anyone may read approved content.
/// let doc = RuleDocument::content(Uuid::now_v7(), ModerationStatus::Approved, false);
/// let request = RuleRequest::anonymous(RuleOp::Get, Collection::Reviews).with_document(doc);
/// assert!(rules.evaluate(&request).is_allow());
/// ```
#[derive(Debug, Clone)]
pub struct RuleSet {
    allow: HashSet<String>,
}

impl RuleSet {
    /// Compile the ruleset from the policy decision table.
    pub fn compile() -> Self {
        let mut allow = HashSet::new();

        for row in decision_table() {
            if !row.verdict.is_allow() {
                continue;
            }
            match row.operation {
                Operation::Read | Operation::Update | Operation::Delete => {
                    if let Some(item) = row.item {
                        allow.insert(Self::item_key(
                            &row.role,
                            row.operation,
                            item.status,
                            item.withdrawn,
                            row.is_owner,
                        ));
                    }
                }
                Operation::Create => {
                    allow.insert(Self::create_key(&row.role));
                }
                // Moderate and ManageUsers have no per-document rows;
                // they surface below as admin-claim field rules.
                Operation::Moderate | Operation::ManageUsers => {}
            }
        }

        Self { allow }
    }

    /// Judge a storage request.
    ///
    /// # Arguments
    ///
    /// * `request` - The request the datastore is about to serve
    ///
    /// # Returns
    ///
    /// [`RuleVerdict::Allow`] only when an explicit rule permits the
    /// request; everything else, including malformed documents, denies
    pub fn evaluate(&self, request: &RuleRequest) -> RuleVerdict {
        match request.collection {
            Collection::Users => self.evaluate_users(request),
            Collection::Reviews | Collection::Roadmaps | Collection::Comments => {
                self.evaluate_content(request)
            }
        }
    }

    fn evaluate_content(&self, request: &RuleRequest) -> RuleVerdict {
        let role = request
            .auth
            .map(|auth| auth.role)
            .unwrap_or_else(UserRole::anonymous);

        match request.operation {
            RuleOp::Get | RuleOp::List => {
                let Some(doc) = &request.document else {
                    return RuleVerdict::Deny;
                };
                let (Some(author), Some(status)) = (doc.author_id(), doc.status()) else {
                    return RuleVerdict::Deny;
                };
                let owner = request.auth.is_some_and(|auth| auth.uid == author);
                self.check(Self::item_key(
                    &role,
                    Operation::Read,
                    status,
                    doc.withdrawn(),
                    owner,
                ))
            }

            RuleOp::Create => {
                let Some(auth) = request.auth else {
                    return RuleVerdict::Deny;
                };
                let Some(new_doc) = &request.new_document else {
                    return RuleVerdict::Deny;
                };
                if !self.allow.contains(&Self::create_key(&auth.role)) {
                    return RuleVerdict::Deny;
                }
                // No creating content under another user's id.
                if new_doc.author_id() != Some(auth.uid) {
                    return RuleVerdict::Deny;
                }
                // New content always enters moderation as pending, with
                // a clean audit trail.
                if new_doc.status() != Some(ModerationStatus::Pending) || new_doc.withdrawn() {
                    return RuleVerdict::Deny;
                }
                if has_value(new_doc, "moderated_by") || has_value(new_doc, "moderated_at") {
                    return RuleVerdict::Deny;
                }
                if request.collection == Collection::Comments && new_doc.parent_id().is_none() {
                    return RuleVerdict::Deny;
                }
                RuleVerdict::Allow
            }

            RuleOp::Update => {
                let Some(auth) = request.auth else {
                    return RuleVerdict::Deny;
                };
                let (Some(doc), Some(new_doc)) = (&request.document, &request.new_document)
                else {
                    return RuleVerdict::Deny;
                };
                let (Some(author), Some(status)) = (doc.author_id(), doc.status()) else {
                    return RuleVerdict::Deny;
                };
                // Ownership never transfers.
                if new_doc.author_id() != Some(author) {
                    return RuleVerdict::Deny;
                }
                let owner = auth.uid == author;

                if auth.role.is_admin() {
                    return self.check(Self::item_key(
                        &auth.role,
                        Operation::Update,
                        status,
                        doc.withdrawn(),
                        owner,
                    ));
                }

                // Moderation metadata is admin-only.
                if !doc.field_unchanged(new_doc, "moderated_by")
                    || !doc.field_unchanged(new_doc, "moderated_at")
                {
                    return RuleVerdict::Deny;
                }

                if is_withdraw_shape(new_doc) {
                    // Owner soft delete; judged by the delete rows.
                    return self.check(Self::item_key(
                        &auth.role,
                        Operation::Delete,
                        status,
                        doc.withdrawn(),
                        owner,
                    ));
                }

                // Owner edits go back through moderation.
                if new_doc.status() != Some(ModerationStatus::Pending) || new_doc.withdrawn() {
                    return RuleVerdict::Deny;
                }
                self.check(Self::item_key(
                    &auth.role,
                    Operation::Update,
                    status,
                    doc.withdrawn(),
                    owner,
                ))
            }

            // Records are retained for audit; soft deletes arrive as
            // updates.
            RuleOp::Delete => RuleVerdict::Deny,
        }
    }

    fn evaluate_users(&self, request: &RuleRequest) -> RuleVerdict {
        match request.operation {
            RuleOp::Get => {
                let Some(auth) = request.auth else {
                    return RuleVerdict::Deny;
                };
                let Some(id) = request.document.as_ref().and_then(RuleDocument::id) else {
                    return RuleVerdict::Deny;
                };
                RuleVerdict::from_bool(auth.role.is_admin() || auth.uid == id)
            }

            RuleOp::List => {
                let Some(auth) = request.auth else {
                    return RuleVerdict::Deny;
                };
                RuleVerdict::from_bool(auth.role.is_admin())
            }

            RuleOp::Create => {
                let Some(auth) = request.auth else {
                    return RuleVerdict::Deny;
                };
                let Some(new_doc) = &request.new_document else {
                    return RuleVerdict::Deny;
                };
                if auth.role.is_admin() {
                    return RuleVerdict::Allow;
                }
                // Users create their own profile, and it starts on the
                // bottom of the ladder: no self-assigned elevation.
                if new_doc.id() != Some(auth.uid) {
                    return RuleVerdict::Deny;
                }
                match new_doc.role() {
                    None => RuleVerdict::Allow,
                    Some(UserRole::Ladder {
                        rank: LadderRank::Member,
                    }) => RuleVerdict::Allow,
                    Some(_) => RuleVerdict::Deny,
                }
            }

            RuleOp::Update => {
                let Some(auth) = request.auth else {
                    return RuleVerdict::Deny;
                };
                let (Some(doc), Some(new_doc)) = (&request.document, &request.new_document)
                else {
                    return RuleVerdict::Deny;
                };
                let Some(id) = doc.id() else {
                    return RuleVerdict::Deny;
                };
                if auth.role.is_admin() {
                    return RuleVerdict::Allow;
                }
                if auth.uid != id {
                    return RuleVerdict::Deny;
                }
                // Roles change only through the admin surface.
                RuleVerdict::from_bool(doc.field_unchanged(new_doc, "role"))
            }

            RuleOp::Delete => RuleVerdict::Deny,
        }
    }

    fn check(&self, key: String) -> RuleVerdict {
        RuleVerdict::from_bool(self.allow.contains(&key))
    }

    fn item_key(
        role: &UserRole,
        operation: Operation,
        status: ModerationStatus,
        withdrawn: bool,
        owner: bool,
    ) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            role.as_str(),
            operation.as_str(),
            status.as_str(),
            withdrawn,
            if owner { "owner" } else { "stranger" },
        )
    }

    fn create_key(role: &UserRole) -> String {
        format!("{}:create", role.as_str())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::compile()
    }
}

fn is_withdraw_shape(new_doc: &RuleDocument) -> bool {
    new_doc.status() == Some(ModerationStatus::Rejected) && new_doc.withdrawn()
}

fn has_value(doc: &RuleDocument, key: &str) -> bool {
    doc.field(key).is_some_and(|value| !value.is_null())
}
