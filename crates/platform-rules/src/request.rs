//! Rule requests
//!
//! This module defines the restricted request shape the storage layer
//! hands the ruleset: who is asking (an authenticated claim, or
//! nothing), what operation, which collection, and the raw fields of
//! the documents involved.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use platform_moderation::{ContentKind, ModerationStatus};
use platform_roles::UserRole;

/// A storage-level operation.
///
/// Note there is no "edit" or "approve" here: everything arriving at
/// the datastore is one of these five primitives, and the ruleset
/// reconstructs intent from the field deltas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleOp {
    /// Read a single document
    Get,

    /// Read documents matching a query
    List,

    /// Create a new document
    Create,

    /// Update an existing document
    Update,

    /// Physically delete a document
    Delete,
}

impl RuleOp {
    /// Get string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A persisted collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// User account documents
    Users,

    /// Course review documents
    Reviews,

    /// Learning roadmap documents
    Roadmaps,

    /// Comment documents
    Comments,
}

impl Collection {
    /// Get the content kind stored in this collection, if it holds
    /// content at all.
    pub fn content_kind(&self) -> Option<ContentKind> {
        match self {
            Self::Users => None,
            Self::Reviews => Some(ContentKind::Review),
            Self::Roadmaps => Some(ContentKind::Roadmap),
            Self::Comments => Some(ContentKind::Comment),
        }
    }

    /// Get string representation of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Reviews => "reviews",
            Self::Roadmaps => "roadmaps",
            Self::Comments => "comments",
        }
    }
}

/// The authenticated claim attached to a storage request.
///
/// The role claim is stamped by the identity layer from the stored user
/// record; the ruleset trusts it the way it trusts the document fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleAuth {
    /// Verified user ID
    pub uid: Uuid,

    /// Role claim
    pub role: UserRole,
}

/// The raw field map of a persisted document.
///
/// Accessors parse the handful of fields the rules depend on; anything
/// else is opaque payload. Missing or malformed fields parse to `None`
/// and the ruleset fails closed on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDocument(pub serde_json::Map<String, Value>);

impl RuleDocument {
    /// Wrap a JSON object as a rule document.
    ///
    /// # Returns
    ///
    /// `None` if the value is not an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Build a content document for rule evaluation.
    ///
    /// # Arguments
    ///
    /// * `author_id` - The owning user
    /// * `status` - Moderation status
    /// * `withdrawn` - Soft-delete flag
    pub fn content(author_id: Uuid, status: ModerationStatus, withdrawn: bool) -> Self {
        let mut map = serde_json::Map::new();
        map.insert("author_id".into(), Value::String(author_id.to_string()));
        map.insert("status".into(), Value::String(status.as_str().into()));
        map.insert("withdrawn".into(), Value::Bool(withdrawn));
        Self(map)
    }

    /// Build a user document for rule evaluation.
    ///
    /// # Arguments
    ///
    /// * `id` - The user ID
    /// * `role` - The stored role
    pub fn user(id: Uuid, role: UserRole) -> Self {
        let mut map = serde_json::Map::new();
        map.insert("id".into(), Value::String(id.to_string()));
        map.insert(
            "role".into(),
            serde_json::to_value(role).unwrap_or(Value::Null),
        );
        Self(map)
    }

    /// Set a field, consuming and returning the document.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Get a raw field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The document id, if present and well-formed.
    pub fn id(&self) -> Option<Uuid> {
        self.uuid_field("id")
    }

    /// The owning user id, if present and well-formed.
    pub fn author_id(&self) -> Option<Uuid> {
        self.uuid_field("author_id")
    }

    /// The parent review id, if present and well-formed.
    pub fn parent_id(&self) -> Option<Uuid> {
        self.uuid_field("parent_id")
    }

    /// The moderation status, if present and well-formed.
    pub fn status(&self) -> Option<ModerationStatus> {
        self.field("status")
            .and_then(Value::as_str)
            .and_then(ModerationStatus::parse)
    }

    /// The soft-delete flag; absent means not withdrawn.
    pub fn withdrawn(&self) -> bool {
        self.field("withdrawn")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The stored role, if present and well-formed.
    pub fn role(&self) -> Option<UserRole> {
        self.field("role")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Check if a field is byte-identical between this document and
    /// another (both absent also counts as unchanged).
    pub fn field_unchanged(&self, other: &RuleDocument, key: &str) -> bool {
        self.field(key) == other.field(key)
    }

    fn uuid_field(&self, key: &str) -> Option<Uuid> {
        self.field(key)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// A storage request for the ruleset to judge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleRequest {
    /// The authenticated claim, or `None` for anonymous access
    pub auth: Option<RuleAuth>,

    /// The attempted operation
    pub operation: RuleOp,

    /// The target collection
    pub collection: Collection,

    /// The stored document, for get/list/update/delete
    pub document: Option<RuleDocument>,

    /// The incoming document, for create/update
    pub new_document: Option<RuleDocument>,
}

impl RuleRequest {
    /// A request with an authenticated claim.
    pub fn new(auth: RuleAuth, operation: RuleOp, collection: Collection) -> Self {
        Self {
            auth: Some(auth),
            operation,
            collection,
            document: None,
            new_document: None,
        }
    }

    /// A request with no credential.
    pub fn anonymous(operation: RuleOp, collection: Collection) -> Self {
        Self {
            auth: None,
            operation,
            collection,
            document: None,
            new_document: None,
        }
    }

    /// Attach the stored document.
    pub fn with_document(mut self, document: RuleDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Attach the incoming document.
    pub fn with_new_document(mut self, document: RuleDocument) -> Self {
        self.new_document = Some(document);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_document_accessors() {
        let author = Uuid::now_v7();
        let doc = RuleDocument::content(author, ModerationStatus::Pending, false);
        assert_eq!(doc.author_id(), Some(author));
        assert_eq!(doc.status(), Some(ModerationStatus::Pending));
        assert!(!doc.withdrawn());
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn test_malformed_fields_parse_to_none() {
        let doc = RuleDocument::from_value(json!({
            "author_id": 42,
            "status": "weird",
            "withdrawn": "yes",
        }))
        .unwrap();
        assert_eq!(doc.author_id(), None);
        assert_eq!(doc.status(), None);
        assert!(!doc.withdrawn());
    }

    #[test]
    fn test_user_document_role_round_trip() {
        let id = Uuid::now_v7();
        let doc = RuleDocument::user(id, UserRole::Admin);
        assert_eq!(doc.id(), Some(id));
        assert_eq!(doc.role(), Some(UserRole::Admin));
    }

    #[test]
    fn test_field_unchanged() {
        let author = Uuid::now_v7();
        let a = RuleDocument::content(author, ModerationStatus::Pending, false);
        let b = RuleDocument::content(author, ModerationStatus::Approved, false);
        assert!(a.field_unchanged(&b, "author_id"));
        assert!(!a.field_unchanged(&b, "status"));
        assert!(a.field_unchanged(&b, "moderated_by"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(RuleDocument::from_value(json!("just a string")).is_none());
        assert!(RuleDocument::from_value(json!([1, 2, 3])).is_none());
    }
}
