use std::fmt;

use tracing::{debug, info, warn};

use super::channel::{Channel, ChannelKind};
use super::chat::ChatResources;
use super::server::Server;
use super::user::User;
use super::validation;
use crate::error::{DirectoryError, Rejected};

/// Everything one gateway session knows about: its servers (each with its
/// channels and users) and the private channels that belong to no server.
///
/// The directory owns the whole tree. Lookups hand out borrows; removal
/// hands back ownership; destroying consumes.
pub struct Directory {
    gateway: String,
    token: String,
    uname: Option<String>,
    id: Option<String>,
    private_channels: Vec<Channel>,
    servers: Vec<Server>,
}

impl Directory {
    pub fn new(gateway: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            gateway: gateway.into(),
            token: token.into(),
            uname: None,
            id: None,
            private_channels: Vec::new(),
            servers: Vec::new(),
        }
    }

    // ── Session identity ────────────────────────────────────────────

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn uname(&self) -> Option<&str> {
        self.uname.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Record who we are logged in as, once the gateway says so.
    pub fn set_identity(&mut self, uname: impl Into<String>, id: impl Into<String>) {
        let (uname, id) = (uname.into(), id.into());
        info!(%uname, user_id = %id, "session identity set");
        self.uname = Some(uname);
        self.id = Some(id);
    }

    // ── Lookup ──────────────────────────────────────────────────────

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn private_channels(&self) -> &[Channel] {
        &self.private_channels
    }

    pub fn find_server(&self, server_id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id() == server_id)
    }

    pub fn find_server_mut(&mut self, server_id: &str) -> Option<&mut Server> {
        self.servers.iter_mut().find(|s| s.id() == server_id)
    }

    /// Find a channel. Private channels are always searched first. After
    /// that, only `server_id`'s channels if given (an unknown server finds
    /// nothing), otherwise every server's channels in order.
    pub fn find_channel(&self, channel_id: &str, server_id: Option<&str>) -> Option<&Channel> {
        if let Some(ch) = self.private_channels.iter().find(|c| c.id() == channel_id) {
            return Some(ch);
        }

        match server_id {
            Some(server_id) => self.find_server(server_id)?.find_channel(channel_id),
            None => self.servers.iter().find_map(|s| s.find_channel(channel_id)),
        }
    }

    pub fn find_channel_mut(
        &mut self,
        channel_id: &str,
        server_id: Option<&str>,
    ) -> Option<&mut Channel> {
        if let Some(pos) = self
            .private_channels
            .iter()
            .position(|c| c.id() == channel_id)
        {
            return Some(&mut self.private_channels[pos]);
        }

        match server_id {
            Some(server_id) => self.find_server_mut(server_id)?.find_channel_mut(channel_id),
            None => self
                .servers
                .iter_mut()
                .find_map(|s| s.find_channel_mut(channel_id)),
        }
    }

    /// Find a user. User ids are only unique within a server, so without a
    /// server id there is nothing to search.
    pub fn find_user(&self, user_id: &str, server_id: Option<&str>) -> Option<&User> {
        self.find_server(server_id?)?.find_user(user_id)
    }

    pub fn find_user_mut(&mut self, user_id: &str, server_id: Option<&str>) -> Option<&mut User> {
        self.find_server_mut(server_id?)?.find_user_mut(user_id)
    }

    /// Whether a channel id is taken anywhere in the directory.
    pub fn contains_channel(&self, channel_id: &str) -> bool {
        self.find_channel(channel_id, None).is_some()
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn private_channel_count(&self) -> usize {
        self.private_channels.len()
    }

    /// All channels, private and per-server.
    pub fn channel_count(&self) -> usize {
        self.private_channels.len()
            + self
                .servers
                .iter()
                .map(|s| s.channels().len())
                .sum::<usize>()
    }

    pub fn user_count(&self) -> usize {
        self.servers.iter().map(|s| s.users().len()).sum()
    }

    // ── Insertion ───────────────────────────────────────────────────

    /// Add a server. Rejected if its id is taken, or if any channel it
    /// already carries collides with a channel in the directory.
    pub fn insert_server(&mut self, server: Server) -> Result<(), Rejected<Server>> {
        if let Err(reason) = self.check_server(&server) {
            warn!(server_id = %server.id(), %reason, "server rejected");
            return Err(Rejected::new(server, reason));
        }

        info!(server_id = %server.id(), name = %server.name(), "server added");
        self.servers.push(server);
        Ok(())
    }

    /// Add a channel that belongs to no server.
    pub fn insert_private_channel(&mut self, channel: Channel) -> Result<(), Rejected<Channel>> {
        if let Err(reason) = self.check_channel(&channel) {
            warn!(channel_id = %channel.id(), %reason, "private channel rejected");
            return Err(Rejected::new(channel, reason));
        }

        debug!(channel_id = %channel.id(), "private channel added");
        self.private_channels.push(channel);
        Ok(())
    }

    pub fn insert_channel(
        &mut self,
        server_id: &str,
        channel: Channel,
    ) -> Result<(), Rejected<Channel>> {
        if let Err(reason) = self.check_channel(&channel) {
            warn!(%server_id, channel_id = %channel.id(), %reason, "channel rejected");
            return Err(Rejected::new(channel, reason));
        }

        let Some(server) = self.find_server_mut(server_id) else {
            warn!(%server_id, channel_id = %channel.id(), "channel for unknown server");
            return Err(Rejected::new(
                channel,
                DirectoryError::UnknownServer(server_id.to_string()),
            ));
        };

        debug!(%server_id, channel_id = %channel.id(), "channel added");
        server.push_channel(channel);
        Ok(())
    }

    pub fn insert_user(&mut self, server_id: &str, user: User) -> Result<(), Rejected<User>> {
        let checked = validation::validate_id(user.id())
            .and_then(|_| validation::validate_user_name(user.name()));
        if let Err(reason) = checked {
            warn!(%server_id, user_id = %user.id(), %reason, "user rejected");
            return Err(Rejected::new(user, reason));
        }

        let Some(server) = self.find_server_mut(server_id) else {
            warn!(%server_id, user_id = %user.id(), "user for unknown server");
            return Err(Rejected::new(
                user,
                DirectoryError::UnknownServer(server_id.to_string()),
            ));
        };

        if server.find_user(user.id()).is_some() {
            let reason = DirectoryError::DuplicateUser {
                server_id: server_id.to_string(),
                user_id: user.id().to_string(),
            };
            warn!(%server_id, user_id = %user.id(), "duplicate user rejected");
            return Err(Rejected::new(user, reason));
        }

        debug!(%server_id, user_id = %user.id(), "user added");
        server.push_user(user);
        Ok(())
    }

    fn check_server(&self, server: &Server) -> Result<(), DirectoryError> {
        validation::validate_id(server.id())?;
        validation::validate_name(server.name())?;

        if self.find_server(server.id()).is_some() {
            return Err(DirectoryError::DuplicateServer(server.id().to_string()));
        }
        for channel in server.channels() {
            if self.contains_channel(channel.id()) {
                return Err(DirectoryError::DuplicateChannel(channel.id().to_string()));
            }
        }
        Ok(())
    }

    fn check_channel(&self, channel: &Channel) -> Result<(), DirectoryError> {
        validation::validate_id(channel.id())?;
        if let ChannelKind::Other { name } = channel.kind() {
            validation::validate_name(name)?;
        }

        if self.contains_channel(channel.id()) {
            return Err(DirectoryError::DuplicateChannel(channel.id().to_string()));
        }
        Ok(())
    }

    // ── Removal ─────────────────────────────────────────────────────

    /// Detach a server with everything it owns.
    #[must_use = "a removed server must be destroyed or re-inserted"]
    pub fn remove_server(&mut self, server_id: &str) -> Option<Server> {
        let pos = self.servers.iter().position(|s| s.id() == server_id)?;
        info!(%server_id, "server removed");
        Some(self.servers.remove(pos))
    }

    #[must_use = "a removed channel must be destroyed or re-inserted"]
    pub fn remove_private_channel(&mut self, channel_id: &str) -> Option<Channel> {
        let pos = self
            .private_channels
            .iter()
            .position(|c| c.id() == channel_id)?;
        Some(self.private_channels.remove(pos))
    }

    /// Detach a channel wherever it lives, searching in the same order as
    /// [`find_channel`](Self::find_channel).
    #[must_use = "a removed channel must be destroyed or re-inserted"]
    pub fn remove_channel(&mut self, channel_id: &str, server_id: Option<&str>) -> Option<Channel> {
        if let Some(ch) = self.remove_private_channel(channel_id) {
            return Some(ch);
        }

        match server_id {
            Some(server_id) => self.find_server_mut(server_id)?.remove_channel(channel_id),
            None => self
                .servers
                .iter_mut()
                .find_map(|s| s.remove_channel(channel_id)),
        }
    }

    #[must_use = "a removed user must be destroyed or re-inserted"]
    pub fn remove_user(&mut self, user_id: &str, server_id: &str) -> Option<User> {
        self.find_server_mut(server_id)?.remove_user(user_id)
    }

    // ── Teardown ────────────────────────────────────────────────────

    /// End-of-session cleanup: private channels first, then every server
    /// with its children. Consumes the directory.
    pub fn destroy(self, chats: &mut dyn ChatResources) {
        let (server_count, channel_count, user_count) =
            (self.server_count(), self.channel_count(), self.user_count());

        let Directory {
            gateway,
            private_channels,
            servers,
            ..
        } = self;

        for channel in private_channels {
            channel.destroy(chats);
        }
        for server in servers {
            server.destroy(chats);
        }

        info!(
            %gateway,
            server_count, channel_count, user_count, "directory destroyed"
        );
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("gateway", &self.gateway)
            .field("token", &"[REDACTED]")
            .field("uname", &self.uname)
            .field("id", &self.id)
            .field("private_channels", &self.private_channels)
            .field("servers", &self.servers)
            .finish()
    }
}
