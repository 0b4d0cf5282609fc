// 12.0 notify.rs: notification dispatch. the saga treats this as
// fire-and-forget: a failed notification is logged and audited, never
// surfaced to the caller. real transport (email/SMS/push) lives in its own
// service; the in-process implementation records what would have been sent.

use crate::types::{Timestamp, UserId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "EMAIL"),
            Channel::Sms => write!(f, "SMS"),
            Channel::Push => write!(f, "PUSH"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub channel: Channel,
    pub sent_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("empty notification message")]
    EmptyMessage,

    #[error("{0} channel unavailable")]
    ChannelDown(Channel),
}

pub trait NotificationDispatcher: Send + Sync {
    fn notify(
        &self,
        user_id: UserId,
        message: &str,
        channel: Channel,
    ) -> Result<NotificationId, NotifyError>;
}

/// Records every dispatched notification instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, user_id: UserId) -> Vec<Notification> {
        self.sent
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify(
        &self,
        user_id: UserId,
        message: &str,
        channel: Channel,
    ) -> Result<NotificationId, NotifyError> {
        if message.is_empty() {
            return Err(NotifyError::EmptyMessage);
        }
        let notification = Notification {
            id: NotificationId::new(),
            user_id,
            message: message.to_string(),
            channel,
            sent_at: Timestamp::now(),
        };
        let id = notification.id;
        self.sent.lock().push(notification);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_dispatched_notifications() {
        let dispatcher = RecordingDispatcher::new();
        dispatcher
            .notify(UserId(1), "Your BUY order is executed", Channel::Email)
            .unwrap();
        dispatcher.notify(UserId(2), "hello", Channel::Sms).unwrap();

        assert_eq!(dispatcher.sent().len(), 2);
        let mine = dispatcher.sent_to(UserId(1));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].channel, Channel::Email);
        assert_eq!(mine[0].message, "Your BUY order is executed");
    }

    #[test]
    fn empty_message_is_rejected() {
        let dispatcher = RecordingDispatcher::new();
        let err = dispatcher.notify(UserId(1), "", Channel::Push).unwrap_err();
        assert_eq!(err, NotifyError::EmptyMessage);
        assert!(dispatcher.sent().is_empty());
    }
}
