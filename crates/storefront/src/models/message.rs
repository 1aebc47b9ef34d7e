//! Chat messages and threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{MessageId, ProductId, ThreadId, UserId};

use crate::store::Validate;

/// A single chat message. Immutable apart from `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Validate for Message {
    fn validate(&self) -> Result<(), String> {
        if self.sender_id == self.receiver_id {
            return Err(format!("message {} is addressed to its sender", self.id));
        }
        Ok(())
    }
}

/// A two-party conversation, optionally about one product.
///
/// Identified by the unordered participant pair plus `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: ThreadId,
    pub participants: [UserId; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    /// Cached count of unread messages in the thread.
    pub unread_count: u32,
}

impl ChatThread {
    /// Whether `user` takes part in the thread.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    /// The participant who is not `user`, if `user` takes part.
    #[must_use]
    pub fn other_participant(&self, user: &UserId) -> Option<&UserId> {
        let [a, b] = &self.participants;
        if a == user {
            Some(b)
        } else if b == user {
            Some(a)
        } else {
            None
        }
    }

    /// Whether the thread is the conversation between `a` and `b` about `product`,
    /// regardless of participant order.
    #[must_use]
    pub fn matches(&self, a: &UserId, b: &UserId, product: Option<&ProductId>) -> bool {
        self.involves(a) && self.involves(b) && self.product_id.as_ref() == product
    }
}

impl Validate for ChatThread {
    fn validate(&self) -> Result<(), String> {
        let [a, b] = &self.participants;
        if a == b {
            return Err(format!("thread {} has a single participant", self.id));
        }
        if let Some(last) = &self.last_message {
            if last.thread_id != self.id {
                return Err(format!("thread {} last message belongs elsewhere", self.id));
            }
        }
        Ok(())
    }
}
