//! Serializable picture of a [`Directory`], used to seed one (tests, the
//! `inspect` command) and to dump its current contents.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::channel::{Channel, ChannelKind};
use super::chat::ChatResources;
use super::directory::Directory;
use super::server::Server;
use super::user::User;
use crate::error::{Rejected, SnapshotError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub gateway: String,
    /// Never written back out by [`Directory::snapshot`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub private_channels: Vec<ChannelSnapshot>,
    #[serde(default)]
    pub servers: Vec<ServerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub channels: Vec<ChannelSnapshot>,
    #[serde(default)]
    pub users: Vec<UserSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelSnapshot {
    Text {
        id: String,
        /// Chat title shown in the IM core. Defaults to the channel id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Other {
        id: String,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl DirectorySnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ChannelSnapshot {
    pub fn id(&self) -> &str {
        match self {
            ChannelSnapshot::Text { id, .. } | ChannelSnapshot::Other { id, .. } => id,
        }
    }

    /// Build the channel, opening a chat for text channels.
    fn build(self, chats: &mut dyn ChatResources) -> Channel {
        match self {
            ChannelSnapshot::Text { id, title } => {
                let chat = chats.open_chat(&id, title.as_deref().unwrap_or(&id));
                Channel::text(id, chat)
            }
            ChannelSnapshot::Other { id, name } => Channel::other(id, name),
        }
    }

    fn of(channel: &Channel) -> Self {
        match channel.kind() {
            ChannelKind::Text(_) => ChannelSnapshot::Text {
                id: channel.id().to_string(),
                title: None,
            },
            ChannelKind::Other { name } => ChannelSnapshot::Other {
                id: channel.id().to_string(),
                name: name.clone(),
            },
        }
    }
}

impl Directory {
    /// Build a directory from a snapshot through the normal insert paths, so
    /// every invariant is checked. On failure everything built so far is
    /// destroyed, including chats already opened.
    pub fn from_snapshot(
        snapshot: DirectorySnapshot,
        chats: &mut dyn ChatResources,
    ) -> Result<Self, SnapshotError> {
        let mut directory = Directory::new(snapshot.gateway, snapshot.token);
        match (snapshot.uname, snapshot.id) {
            (Some(uname), Some(id)) => directory.set_identity(uname, id),
            (None, None) => {}
            (uname, id) => warn!(
                ?uname,
                ?id,
                "snapshot carries half a session identity, ignoring it"
            ),
        }

        if let Err(e) = populate(
            &mut directory,
            snapshot.private_channels,
            snapshot.servers,
            chats,
        ) {
            warn!(error = %e, "snapshot rejected, tearing down partial directory");
            directory.destroy(chats);
            return Err(e);
        }

        info!(
            servers = directory.server_count(),
            channels = directory.channel_count(),
            users = directory.user_count(),
            "directory loaded from snapshot"
        );
        Ok(directory)
    }

    /// Current contents, without the token or chat handles.
    pub fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            gateway: self.gateway().to_string(),
            token: String::new(),
            uname: self.uname().map(str::to_string),
            id: self.id().map(str::to_string),
            private_channels: self
                .private_channels()
                .iter()
                .map(ChannelSnapshot::of)
                .collect(),
            servers: self
                .servers()
                .iter()
                .map(|s| ServerSnapshot {
                    id: s.id().to_string(),
                    name: s.name().to_string(),
                    channels: s.channels().iter().map(ChannelSnapshot::of).collect(),
                    users: s
                        .users()
                        .iter()
                        .map(|u| UserSnapshot {
                            id: u.id().to_string(),
                            name: u.name().to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn populate(
    directory: &mut Directory,
    private_channels: Vec<ChannelSnapshot>,
    servers: Vec<ServerSnapshot>,
    chats: &mut dyn ChatResources,
) -> Result<(), SnapshotError> {
    for ch in private_channels {
        let channel = ch.build(chats);
        directory
            .insert_private_channel(channel)
            .map_err(|rejected| discard_channel(rejected, chats))?;
    }

    for srv in servers {
        directory
            .insert_server(Server::new(srv.id.clone(), srv.name))
            .map_err(|rejected| rejected.reason)?;

        for ch in srv.channels {
            let channel = ch.build(chats);
            directory
                .insert_channel(&srv.id, channel)
                .map_err(|rejected| discard_channel(rejected, chats))?;
        }
        for user in srv.users {
            directory
                .insert_user(&srv.id, User::new(user.id, user.name))
                .map_err(|rejected| rejected.reason)?;
        }
    }

    Ok(())
}

fn discard_channel(rejected: Rejected<Channel>, chats: &mut dyn ChatResources) -> SnapshotError {
    let Rejected { entity, reason } = rejected;
    entity.destroy(chats);
    reason.into()
}
