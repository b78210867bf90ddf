use crate::{
    error::{AppError, Result},
    models::message::*,
    models::user::PublicProfile,
    services::{Database, TypingStatusStore},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageService {
    db: Arc<Database>,
    typing: TypingStatusStore,
}

impl MessageService {
    pub async fn new(db: Arc<Database>, typing: TypingStatusStore) -> Result<Self> {
        Ok(Self { db, typing })
    }

    pub async fn send_message(
        &self,
        sender_id: &str,
        receiver_id: &str,
        body: &str,
    ) -> Result<Message> {
        let body = body.trim();
        if receiver_id.trim().is_empty() || body.is_empty() {
            return Err(AppError::Validation(
                "Receiver and message are required".to_string(),
            ));
        }

        debug!("User {} sending message to {}", sender_id, receiver_id);

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message: body.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        let created: Message = self.db.create("message", message).await?;
        Ok(created)
    }

    /// The full thread with one counterpart, oldest first. Fetching the
    /// thread marks every message addressed to the requester as read; the
    /// returned rows reflect the new state. The listing and the read-state
    /// transition are two separate steps with one net observable effect.
    pub async fn list_messages(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Vec<MessageView>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT * FROM message
                    WHERE (sender_id = $user_a AND receiver_id = $user_b)
                       OR (sender_id = $user_b AND receiver_id = $user_a)
                    ORDER BY created_at ASC
                "#,
                json!({ "user_a": user_id, "user_b": other_user_id }),
            )
            .await?;
        let mut messages: Vec<Message> = response.take(0)?;

        self.db
            .query_with_params(
                r#"
                    UPDATE message SET is_read = true
                    WHERE receiver_id = $reader AND sender_id = $sender AND is_read = false
                "#,
                json!({ "reader": user_id, "sender": other_user_id }),
            )
            .await?;
        let flipped = apply_read_receipts(&mut messages, user_id, other_user_id);
        if flipped > 0 {
            debug!("Marked {} messages as read for user {}", flipped, user_id);
        }

        let profiles = self.fetch_profiles(&[user_id, other_user_id]).await?;
        if !profiles.contains_key(other_user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(messages
            .into_iter()
            .map(|message| {
                let sender = profiles.get(&message.sender_id).cloned();
                MessageView { message, sender }
            })
            .collect())
    }

    /// One summary per counterpart, most recent activity first. A store
    /// failure surfaces to the caller: this feeds a primary view, not a
    /// badge.
    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT * FROM message
                    WHERE sender_id = $user_id OR receiver_id = $user_id
                    ORDER BY created_at DESC
                "#,
                json!({ "user_id": user_id }),
            )
            .await?;
        let messages: Vec<Message> = response.take(0)?;

        let threads = summarize_conversations(user_id, &messages);
        let counterpart_ids: Vec<&str> = threads.iter().map(|t| t.counterpart_id.as_str()).collect();
        let profiles = self.fetch_profiles(&counterpart_ids).await?;

        Ok(threads
            .into_iter()
            .filter_map(|thread| match profiles.get(&thread.counterpart_id) {
                Some(user) => Some(ConversationSummary {
                    user: user.clone(),
                    last_message: thread.last_message,
                    last_message_time: thread.last_message_time,
                    unread_count: thread.unread_count,
                }),
                None => {
                    warn!("Dropping conversation with unknown user {}", thread.counterpart_id);
                    None
                }
            })
            .collect())
    }

    /// Unread badge count. Never fails the caller: a store error degrades to
    /// zero.
    pub async fn count_unread(&self, user_id: &str) -> i64 {
        match self
            .db
            .count(
                "SELECT count() FROM message WHERE receiver_id = $user_id AND is_read = false GROUP ALL",
                json!({ "user_id": user_id }),
            )
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count unread messages for {}: {}", user_id, e);
                0
            }
        }
    }

    pub fn set_typing(&self, sender_id: &str, receiver_id: &str) {
        self.typing.set(sender_id, receiver_id);
    }

    pub fn is_typing(&self, sender_id: &str, receiver_id: &str) -> bool {
        self.typing.is_typing(sender_id, receiver_id)
    }

    async fn fetch_profiles(&self, user_ids: &[&str]) -> Result<HashMap<String, PublicProfile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT meta::id(id) AS id, name, username, role, profile_pic, bio
                    FROM user WHERE meta::id(id) IN $user_ids
                "#,
                json!({ "user_ids": user_ids }),
            )
            .await?;
        let profiles: Vec<PublicProfile> = response.take(0)?;
        Ok(profiles.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

pub(crate) struct ConversationThread {
    pub counterpart_id: String,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: i64,
}

/// Groups a newest-first message scan into one thread per counterpart. The
/// first message seen for a counterpart is the most recent one, and thread
/// order follows first encounter, so the busiest conversations come first.
pub(crate) fn summarize_conversations(user_id: &str, messages: &[Message]) -> Vec<ConversationThread> {
    let mut order: Vec<String> = Vec::new();
    let mut threads: HashMap<String, ConversationThread> = HashMap::new();

    for msg in messages {
        let counterpart = if msg.sender_id == user_id {
            &msg.receiver_id
        } else {
            &msg.sender_id
        };

        let thread = threads.entry(counterpart.clone()).or_insert_with(|| {
            order.push(counterpart.clone());
            ConversationThread {
                counterpart_id: counterpart.clone(),
                last_message: msg.message.clone(),
                last_message_time: msg.created_at,
                unread_count: 0,
            }
        });

        if !msg.is_read && msg.receiver_id == user_id {
            thread.unread_count += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|id| threads.remove(&id))
        .collect()
}

/// Mirrors the bulk read-flag update on the rows already in memory, so the
/// response shows the post-transition state without a second fetch.
pub(crate) fn apply_read_receipts(messages: &mut [Message], reader_id: &str, sender_id: &str) -> usize {
    let mut flipped = 0;
    for msg in messages.iter_mut() {
        if msg.receiver_id == reader_id && msg.sender_id == sender_id && !msg.is_read {
            msg.is_read = true;
            flipped += 1;
        }
    }
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn msg(id: &str, sender: &str, receiver: &str, body: &str, is_read: bool, age_secs: i64) -> Message {
        Message {
            id: id.to_string(),
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            message: body.to_string(),
            is_read,
            created_at: Utc::now() - chrono::Duration::seconds(age_secs),
        }
    }

    #[test]
    fn one_summary_per_counterpart_with_unread_count() {
        // newest first, as the store returns them
        let messages = vec![
            msg("m1", "alice", "u", "third", false, 1),
            msg("m2", "alice", "u", "second", false, 2),
            msg("m3", "u", "alice", "reply", true, 3),
            msg("m4", "alice", "u", "first", false, 4),
        ];

        let threads = summarize_conversations("u", &messages);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].counterpart_id, "alice");
        assert_eq!(threads[0].last_message, "third");
        assert_eq!(threads[0].unread_count, 3);
    }

    #[test]
    fn threads_follow_most_recent_activity() {
        let messages = vec![
            msg("m1", "bob", "u", "newest", false, 1),
            msg("m2", "u", "alice", "older", true, 5),
            msg("m3", "bob", "u", "oldest", true, 9),
        ];

        let threads = summarize_conversations("u", &messages);
        let order: Vec<&str> = threads.iter().map(|t| t.counterpart_id.as_str()).collect();
        assert_eq!(order, vec!["bob", "alice"]);
        assert_eq!(threads[0].last_message, "newest");
        assert_eq!(threads[1].last_message, "older");
    }

    #[test]
    fn own_unread_messages_do_not_count() {
        // a message the user sent is never "unread" from their side
        let messages = vec![msg("m1", "u", "alice", "hi", false, 1)];

        let threads = summarize_conversations("u", &messages);
        assert_eq!(threads[0].unread_count, 0);
    }

    #[test]
    fn messaging_oneself_forms_a_single_thread() {
        // sender == receiver is not rejected anywhere; the aggregator treats
        // the self-pair like any other counterpart
        let messages = vec![msg("m1", "u", "u", "note", false, 1)];

        let threads = summarize_conversations("u", &messages);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].counterpart_id, "u");
        assert_eq!(threads[0].unread_count, 1);
    }

    #[test]
    fn read_receipts_only_flip_inbound_unread_rows() {
        let mut messages = vec![
            msg("m1", "alice", "u", "in, unread", false, 1),
            msg("m2", "alice", "u", "in, read", true, 2),
            msg("m3", "u", "alice", "out", false, 3),
        ];

        let flipped = apply_read_receipts(&mut messages, "u", "alice");
        assert_eq!(flipped, 1);
        assert!(messages[0].is_read);
        assert!(messages[1].is_read);
        assert!(!messages[2].is_read);

        // second pass is a no-op
        assert_eq!(apply_read_receipts(&mut messages, "u", "alice"), 0);
    }

    proptest! {
        #[test]
        fn summaries_are_unique_and_account_for_every_inbound_unread(
            raw in prop::collection::vec((0usize..4, 0usize..4, any::<bool>()), 0..40)
        ) {
            const IDS: [&str; 4] = ["u", "a", "b", "c"];
            let messages: Vec<Message> = raw
                .iter()
                .enumerate()
                .map(|(i, (s, r, read))| {
                    msg(&format!("m{}", i), IDS[*s], IDS[*r], "hello", *read, i as i64)
                })
                .filter(|m| m.sender_id == "u" || m.receiver_id == "u")
                .collect();

            let threads = summarize_conversations("u", &messages);

            let mut seen = std::collections::HashSet::new();
            for thread in &threads {
                prop_assert!(seen.insert(thread.counterpart_id.clone()));
            }

            let inbound_unread = messages
                .iter()
                .filter(|m| m.receiver_id == "u" && !m.is_read)
                .count() as i64;
            prop_assert_eq!(threads.iter().map(|t| t.unread_count).sum::<i64>(), inbound_unread);
        }
    }
}
