use chrono::{DateTime, Utc};
use tracing::debug;

use super::chat::{ChatHandle, ChatResources};

/// What a channel carries, depending on its type.
#[derive(Debug)]
pub enum ChannelKind {
    /// A text channel rendered as a chat in the IM core.
    Text(ChatHandle),
    /// Metadata-only channel (voice, category, direct-message handle).
    Other { name: String },
}

/// In-memory state for a single channel, owned either by a server or by the
/// directory's private channel list.
#[derive(Debug)]
pub struct Channel {
    id: String,
    kind: ChannelKind,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    pub fn new(id: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn text(id: impl Into<String>, chat: ChatHandle) -> Self {
        Self::new(id, ChannelKind::Text(chat))
    }

    pub fn other(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, ChannelKind::Other { name: name.into() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &ChannelKind {
        &self.kind
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ChannelKind::Text(_))
    }

    /// The open chat, for text channels.
    pub fn chat(&self) -> Option<&ChatHandle> {
        match &self.kind {
            ChannelKind::Text(chat) => Some(chat),
            ChannelKind::Other { .. } => None,
        }
    }

    /// The display name, for non-text channels.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ChannelKind::Text(_) => None,
            ChannelKind::Other { name } => Some(name),
        }
    }

    /// Tear down the channel. Text channels hand their chat back to the IM
    /// core; this is the only place a chat gets closed.
    pub fn destroy(self, chats: &mut dyn ChatResources) {
        let Channel {
            id,
            kind,
            created_at,
        } = self;
        match kind {
            ChannelKind::Text(chat) => {
                debug!(
                    channel_id = %id,
                    chat = chat.raw(),
                    known_since = %created_at,
                    "text channel destroyed"
                );
                chats.close_chat(chat);
            }
            ChannelKind::Other { name } => {
                debug!(channel_id = %id, %name, known_since = %created_at, "channel destroyed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::chat::testing::RecordingChats;

    #[test]
    fn test_text_channel_accessors() {
        let mut chats = RecordingChats::new();
        let ch = Channel::text("c1", chats.handle("c1"));
        assert_eq!(ch.id(), "c1");
        assert!(ch.is_text());
        assert_eq!(ch.chat().map(ChatHandle::raw), Some(1));
        assert_eq!(ch.name(), None);
    }

    #[test]
    fn test_other_channel_accessors() {
        let ch = Channel::other("p1", "dm");
        assert!(!ch.is_text());
        assert!(ch.chat().is_none());
        assert_eq!(ch.name(), Some("dm"));
    }

    #[test]
    fn test_destroy_text_channel_closes_chat() {
        let mut chats = RecordingChats::new();
        let ch = Channel::text("c1", chats.handle("c1"));
        ch.destroy(&mut chats);
        assert_eq!(chats.closed, vec![1]);
        assert!(chats.leaked().is_empty());
    }

    #[test]
    fn test_destroy_other_channel_closes_nothing() {
        let mut chats = RecordingChats::new();
        Channel::other("v1", "voice").destroy(&mut chats);
        assert_eq!(chats.close_count(), 0);
    }
}
