//! Buyer/seller messaging.
//!
//! Threads are keyed by their unordered participant pair plus an optional
//! product. A thread's cached `unread_count` is always recounted from the
//! message store after a write, never incremented in place.
//!
//! Replying to a thread marks the replier's incoming messages in it as read,
//! so at any time every unread message in a thread is addressed to the same
//! participant.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use campus_market_core::{MessageId, NotificationKind, ProductId, ThreadId, UserId};

use crate::error::{Entity, MarketError, Result};
use crate::models::{ChatThread, Message};
use crate::notify::{Notification, NotificationScheduler};
use crate::persistence::{KeyValuePersistence, MESSAGES_KEY, StorageError, THREADS_KEY};
use crate::store::PersistentStore;

/// Input for [`Messaging::send_message`].
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub thread_id: ThreadId,
    pub receiver_id: UserId,
    pub content: String,
    pub product_id: Option<ProductId>,
    /// Attached image as a data URI.
    pub image: Option<String>,
}

impl NewMessage {
    /// A plain text message.
    #[must_use]
    pub fn text(thread_id: ThreadId, receiver_id: UserId, content: impl Into<String>) -> Self {
        Self {
            thread_id,
            receiver_id,
            content: content.into(),
            product_id: None,
            image: None,
        }
    }
}

fn count_unread(messages: &[Message], thread: &ThreadId, receiver: Option<&UserId>) -> u32 {
    let count = messages
        .iter()
        .filter(|m| &m.thread_id == thread && !m.read)
        .filter(|m| receiver.is_none_or(|r| &m.receiver_id == r))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Thread and message stores.
pub struct Messaging {
    messages: PersistentStore<Message>,
    threads: PersistentStore<ChatThread>,
    scheduler: Arc<NotificationScheduler>,
    notify_delay: Duration,
}

impl Messaging {
    /// Load persisted messages and threads, falling back to the seeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(
        persistence: Arc<dyn KeyValuePersistence>,
        seed_messages: Vec<Message>,
        seed_threads: Vec<ChatThread>,
        scheduler: Arc<NotificationScheduler>,
        notify_delay: Duration,
    ) -> std::result::Result<Self, StorageError> {
        let mut messaging = Self {
            messages: PersistentStore::load(Arc::clone(&persistence), MESSAGES_KEY, seed_messages)?,
            threads: PersistentStore::load(persistence, THREADS_KEY, seed_threads)?,
            scheduler,
            notify_delay,
        };
        messaging.recount_all()?;
        Ok(messaging)
    }

    /// Replace stale cached unread counts with the count from the message store.
    fn recount_all(&mut self) -> std::result::Result<(), StorageError> {
        let stale: Vec<(ThreadId, u32)> = self
            .threads
            .items()
            .iter()
            .filter_map(|t| {
                let unread = count_unread(self.messages.items(), &t.id, None);
                (t.unread_count != unread).then(|| (t.id.clone(), unread))
            })
            .collect();
        if stale.is_empty() {
            return Ok(());
        }

        warn!(threads = stale.len(), "Recounting stale unread counts");
        self.threads.mutate(|threads| {
            for thread in threads.iter_mut() {
                if let Some((_, unread)) = stale.iter().find(|(id, _)| id == &thread.id) {
                    thread.unread_count = *unread;
                }
            }
        })
    }

    /// Return the thread between `current` and `other` about `product`,
    /// creating it if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` when `current == other`, or
    /// `MarketError::Storage` if persisting a new thread fails.
    #[instrument(skip(self), fields(current = %current, other = %other))]
    pub fn create_thread(
        &mut self,
        current: &UserId,
        other: &UserId,
        product: Option<&ProductId>,
    ) -> Result<ChatThread> {
        if current == other {
            return Err(MarketError::Validation(
                "cannot start a conversation with yourself".to_string(),
            ));
        }
        if let Some(existing) = self.threads.find(|t| t.matches(current, other, product)) {
            debug!(thread_id = %existing.id, "Reusing existing thread");
            return Ok(existing.clone());
        }

        let thread = ChatThread {
            id: ThreadId::generate(),
            participants: [current.clone(), other.clone()],
            product_id: product.cloned(),
            last_message: None,
            unread_count: 0,
        };
        self.threads.mutate(|threads| threads.push(thread.clone()))?;

        info!(thread_id = %thread.id, "Thread created");
        Ok(thread)
    }

    /// Append a message from `sender` and notify the receiver.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown thread,
    /// `MarketError::Validation` if sender and receiver are not the thread's
    /// two participants or the message is empty, or `MarketError::Storage`
    /// if persisting fails.
    #[instrument(skip(self, new), fields(sender = %sender, thread_id = %new.thread_id))]
    pub fn send_message(&mut self, sender: &UserId, new: NewMessage) -> Result<Message> {
        let thread = self
            .get_thread_by_id(&new.thread_id)
            .ok_or_else(|| MarketError::not_found(Entity::Thread, &new.thread_id))?;
        if thread.other_participant(sender) != Some(&new.receiver_id) {
            return Err(MarketError::Validation(format!(
                "{sender} and {} are not the participants of thread {}",
                new.receiver_id, new.thread_id
            )));
        }
        if new.content.trim().is_empty() && new.image.is_none() {
            return Err(MarketError::Validation("message is empty".to_string()));
        }

        let message = Message {
            id: MessageId::generate(),
            thread_id: new.thread_id,
            sender_id: sender.clone(),
            receiver_id: new.receiver_id,
            content: new.content,
            product_id: new.product_id,
            image: new.image,
            timestamp: Utc::now(),
            read: false,
        };

        self.messages.mutate(|messages| {
            for m in messages
                .iter_mut()
                .filter(|m| m.thread_id == message.thread_id && &m.receiver_id == sender)
            {
                m.read = true;
            }
            messages.push(message.clone());
        })?;
        self.sync_thread(&message.thread_id, Some(message.clone()))?;

        info!(message_id = %message.id, "Message sent");
        let body = if message.content.trim().is_empty() {
            "Sent you an image".to_string()
        } else {
            message.content.clone()
        };
        self.scheduler.schedule(
            Notification {
                recipient: message.receiver_id.clone(),
                kind: NotificationKind::Message,
                title: "New message".to_string(),
                body,
                tag: Some(message.thread_id.to_string()),
            },
            self.notify_delay,
        );

        Ok(message)
    }

    /// Mark every message in the thread addressed to `user` as read.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` for an unknown thread or
    /// `MarketError::Storage` if persisting fails.
    #[instrument(skip(self), fields(thread_id = %thread_id, user = %user))]
    pub fn mark_as_read(&mut self, thread_id: &ThreadId, user: &UserId) -> Result<()> {
        if self.get_thread_by_id(thread_id).is_none() {
            return Err(MarketError::not_found(Entity::Thread, thread_id));
        }

        let pending = count_unread(self.messages.items(), thread_id, Some(user));
        if pending > 0 {
            self.messages.mutate(|messages| {
                for m in messages
                    .iter_mut()
                    .filter(|m| &m.thread_id == thread_id && &m.receiver_id == user)
                {
                    m.read = true;
                }
            })?;
            debug!(pending, "Marked messages read");
        }
        self.sync_thread(thread_id, None)
    }

    /// Threads `user` takes part in.
    #[must_use]
    pub fn get_user_threads(&self, user: &UserId) -> Vec<ChatThread> {
        self.threads.filter(|t| t.involves(user))
    }

    /// Messages in a thread, oldest first.
    #[must_use]
    pub fn get_thread_messages(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.messages.filter(|m| &m.thread_id == thread_id)
    }

    /// Look up a thread.
    #[must_use]
    pub fn get_thread_by_id(&self, thread_id: &ThreadId) -> Option<&ChatThread> {
        self.threads.find(|t| &t.id == thread_id)
    }

    /// Unread messages in the thread addressed to `user`.
    #[must_use]
    pub fn unread_count_for(&self, thread_id: &ThreadId, user: &UserId) -> u32 {
        count_unread(self.messages.items(), thread_id, Some(user))
    }

    /// Unread messages addressed to `user` across all threads.
    #[must_use]
    pub fn total_unread_for(&self, user: &UserId) -> u32 {
        self.threads
            .items()
            .iter()
            .filter(|t| t.involves(user))
            .map(|t| self.unread_count_for(&t.id, user))
            .sum()
    }

    /// Recount the thread's unread messages and optionally move its last-message pointer.
    fn sync_thread(&mut self, thread_id: &ThreadId, last: Option<Message>) -> Result<()> {
        let unread = count_unread(self.messages.items(), thread_id, None);
        // keep the cached copy of the last message in step with its read flag
        let last = last.or_else(|| {
            self.get_thread_by_id(thread_id)
                .and_then(|t| t.last_message.as_ref())
                .and_then(|lm| self.messages.find(|m| m.id == lm.id).cloned())
        });

        self.threads.mutate(|threads| {
            if let Some(thread) = threads.iter_mut().find(|t| &t.id == thread_id) {
                thread.unread_count = unread;
                if last.is_some() {
                    thread.last_message = last;
                }
            }
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for Messaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messaging")
            .field("messages", &self.messages)
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}
