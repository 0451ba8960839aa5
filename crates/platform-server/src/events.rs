//! Moderation and role-change signals
//!
//! This module provides fire-and-forget notifications for the side
//! effects downstream consumers care about (mail, feeds, search
//! indexing). Signals never gate policy: a full or disconnected bus
//! must not block a moderation decision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use platform_moderation::ContentKind;
use platform_roles::LadderRank;

/// A platform signal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Signal {
    /// New content entered the moderation queue
    Submitted {
        /// The submitted item
        item_id: Uuid,
        /// What kind of item it is
        kind: ContentKind,
        /// Who submitted it
        author_id: Uuid,
    },

    /// A moderator approved an item
    Approved {
        /// The approved item
        item_id: Uuid,
        /// What kind of item it is
        kind: ContentKind,
        /// The item's author
        author_id: Uuid,
        /// The moderator who approved it
        moderator_id: Uuid,
    },

    /// A moderator rejected an item
    Rejected {
        /// The rejected item
        item_id: Uuid,
        /// What kind of item it is
        kind: ContentKind,
        /// The item's author
        author_id: Uuid,
        /// The moderator who rejected it
        moderator_id: Uuid,
    },

    /// The owner withdrew an item
    Withdrawn {
        /// The withdrawn item
        item_id: Uuid,
        /// What kind of item it is
        kind: ContentKind,
        /// The item's author
        author_id: Uuid,
    },

    /// A user's ladder rank changed
    RankChanged {
        /// The affected user
        user_id: Uuid,
        /// The rank now held
        rank: LadderRank,
    },

    /// A user was suspended
    UserBlocked {
        /// The affected user
        user_id: Uuid,
    },

    /// A suspension was lifted
    UserUnblocked {
        /// The affected user
        user_id: Uuid,
    },
}

impl Signal {
    /// Get the topic this signal publishes under.
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use platform_moderation::ContentKind;
    /// use platform_server::Signal;
    ///
    /// let signal = Signal::Submitted {
    ///     item_id: Uuid::now_v7(),
    ///     kind: ContentKind::Review,
    ///     author_id: Uuid::now_v7(),
    /// };
    /// assert_eq!(signal.topic(), "pathway.review.submitted");
    /// ```
    pub fn topic(&self) -> String {
        match self {
            Self::Submitted { kind, .. } => format!("pathway.{}.submitted", kind.as_str()),
            Self::Approved { kind, .. } => format!("pathway.{}.approved", kind.as_str()),
            Self::Rejected { kind, .. } => format!("pathway.{}.rejected", kind.as_str()),
            Self::Withdrawn { kind, .. } => format!("pathway.{}.withdrawn", kind.as_str()),
            Self::RankChanged { .. } => "pathway.user.rank_changed".to_string(),
            Self::UserBlocked { .. } => "pathway.user.blocked".to_string(),
            Self::UserUnblocked { .. } => "pathway.user.unblocked".to_string(),
        }
    }
}

/// Signal bus trait for fire-and-forget publication.
#[async_trait]
pub trait SignalBus: Send + Sync {
    /// Publish a signal.
    ///
    /// Infallible by contract: implementations swallow delivery
    /// failures and log them.
    async fn publish(&self, signal: Signal);
}

/// In-memory signal bus implementation.
///
/// Suitable for single-process deployments and testing. Signals
/// published with no subscribers are dropped.
#[derive(Debug)]
pub struct MemorySignalBus {
    sender: broadcast::Sender<Signal>,
}

impl MemorySignalBus {
    /// Create a new in-memory bus.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all signals.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.sender.subscribe()
    }
}

impl Default for MemorySignalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalBus for MemorySignalBus {
    async fn publish(&self, signal: Signal) {
        // A send error only means nobody is listening.
        if self.sender.send(signal).is_err() {
            tracing::debug!("signal published with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        let author_id = Uuid::now_v7();
        let signal = Signal::Approved {
            item_id: Uuid::now_v7(),
            kind: ContentKind::Roadmap,
            author_id,
            moderator_id: Uuid::now_v7(),
        };
        assert_eq!(signal.topic(), "pathway.roadmap.approved");

        let signal = Signal::RankChanged {
            user_id: author_id,
            rank: LadderRank::Contributor,
        };
        assert_eq!(signal.topic(), "pathway.user.rank_changed");
    }

    #[tokio::test]
    async fn test_subscribers_receive_signals() {
        let bus = MemorySignalBus::new();
        let mut rx = bus.subscribe();

        let signal = Signal::UserBlocked {
            user_id: Uuid::now_v7(),
        };
        bus.publish(signal.clone()).await;
        assert_eq!(rx.recv().await.unwrap(), signal);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_fail() {
        let bus = MemorySignalBus::new();
        bus.publish(Signal::UserUnblocked {
            user_id: Uuid::now_v7(),
        })
        .await;
    }
}
