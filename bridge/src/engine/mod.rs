pub mod channel;
pub mod chat;
pub mod directory;
pub mod server;
pub mod shared;
pub mod snapshot;
pub mod user;
pub mod validation;

pub use channel::{Channel, ChannelKind};
pub use chat::{ChatHandle, ChatResources, TracingChats};
pub use directory::Directory;
pub use server::Server;
pub use shared::SharedDirectory;
pub use snapshot::DirectorySnapshot;
pub use user::User;
