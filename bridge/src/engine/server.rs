use chrono::{DateTime, Utc};
use tracing::debug;

use super::channel::Channel;
use super::chat::ChatResources;
use super::user::User;
use super::validation;
use crate::error::DirectoryError;

/// In-memory state for a server (guild) and everything it owns.
///
/// Channels and users are kept in arrival order. They can only be added
/// through [`Directory`](super::directory::Directory), which checks id
/// uniqueness across the whole session.
#[derive(Debug)]
pub struct Server {
    id: String,
    name: String,
    channels: Vec<Channel>,
    users: Vec<User>,
    pub created_at: DateTime<Utc>,
}

impl Server {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            channels: Vec::new(),
            users: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the server name. A blank or overlong name leaves the old one.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DirectoryError> {
        let name = name.into();
        validation::validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id() == channel_id)
    }

    pub fn find_channel_mut(&mut self, channel_id: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id() == channel_id)
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id() == user_id)
    }

    pub fn find_user_mut(&mut self, user_id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id() == user_id)
    }

    pub(crate) fn push_channel(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    pub(crate) fn push_user(&mut self, user: User) {
        self.users.push(user);
    }

    /// Detach a channel, keeping the order of the rest.
    #[must_use = "a removed channel must be destroyed or re-inserted"]
    pub fn remove_channel(&mut self, channel_id: &str) -> Option<Channel> {
        let pos = self.channels.iter().position(|c| c.id() == channel_id)?;
        Some(self.channels.remove(pos))
    }

    /// Detach a user, keeping the order of the rest.
    #[must_use = "a removed user must be destroyed or re-inserted"]
    pub fn remove_user(&mut self, user_id: &str) -> Option<User> {
        let pos = self.users.iter().position(|u| u.id() == user_id)?;
        Some(self.users.remove(pos))
    }

    /// Tear down the server: every channel, then every user, in order.
    pub fn destroy(self, chats: &mut dyn ChatResources) {
        let Server {
            id,
            name,
            channels,
            users,
            created_at,
        } = self;
        let (channel_count, user_count) = (channels.len(), users.len());

        for channel in channels {
            channel.destroy(chats);
        }
        for user in users {
            user.destroy();
        }

        debug!(
            server_id = %id,
            %name,
            channel_count,
            user_count,
            known_since = %created_at,
            "server destroyed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::chat::testing::RecordingChats;

    fn sample_server(chats: &mut RecordingChats) -> Server {
        let mut server = Server::new("s1", "Rustaceans");
        server.push_channel(Channel::text("c1", chats.handle("c1")));
        server.push_channel(Channel::other("v1", "voice"));
        server.push_channel(Channel::text("c2", chats.handle("c2")));
        server.push_user(User::new("u1", "alice"));
        server.push_user(User::new("u2", "bob"));
        server
    }

    #[test]
    fn test_find_channel_and_user() {
        let mut chats = RecordingChats::new();
        let server = sample_server(&mut chats);

        assert_eq!(server.find_channel("v1").and_then(Channel::name), Some("voice"));
        assert!(server.find_channel("nope").is_none());
        assert_eq!(server.find_user("u2").map(User::name), Some("bob"));
        assert!(server.find_user("u3").is_none());

        server.destroy(&mut chats);
    }

    #[test]
    fn test_children_added_after_server() {
        let mut chats = RecordingChats::new();
        let server = sample_server(&mut chats);

        assert!(server.channels().iter().all(|c| c.created_at >= server.created_at));
        assert!(server.users().iter().all(|u| u.created_at >= server.created_at));

        server.destroy(&mut chats);
    }

    #[test]
    fn test_rename_user_through_mut_lookup() {
        let mut chats = RecordingChats::new();
        let mut server = sample_server(&mut chats);

        server.find_user_mut("u1").unwrap().rename("alice2").unwrap();
        assert_eq!(server.find_user("u1").unwrap().name(), "alice2");

        server.destroy(&mut chats);
    }

    #[test]
    fn test_rename_server_keeps_old_name_on_error() {
        let mut server = Server::new("s1", "Rustaceans");

        let err = server.rename("   ").unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidName { .. }));
        assert_eq!(server.name(), "Rustaceans");

        server.rename("Crabs").unwrap();
        assert_eq!(server.name(), "Crabs");
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut chats = RecordingChats::new();
        let mut server = sample_server(&mut chats);

        let removed = server.remove_channel("v1").unwrap();
        assert_eq!(removed.id(), "v1");
        let ids: Vec<&str> = server.channels().iter().map(Channel::id).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        removed.destroy(&mut chats);

        assert!(server.remove_user("missing").is_none());
        server.remove_user("u1").unwrap().destroy();
        assert_eq!(server.users().len(), 1);

        server.destroy(&mut chats);
    }

    #[test]
    fn test_destroy_closes_only_text_chats() {
        let mut chats = RecordingChats::new();
        let server = sample_server(&mut chats);

        server.destroy(&mut chats);

        // Two text channels, one voice channel.
        assert_eq!(chats.closed, vec![1, 2]);
        assert!(chats.leaked().is_empty());
    }

    #[test]
    fn test_destroy_empty_server() {
        let mut chats = RecordingChats::new();
        Server::new("s2", "empty").destroy(&mut chats);
        assert_eq!(chats.close_count(), 0);
    }
}
