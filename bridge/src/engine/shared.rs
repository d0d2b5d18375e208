use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::chat::ChatResources;
use super::directory::Directory;

/// A directory shared between tasks (event loop, heartbeat timer, ...).
///
/// Every operation runs under one lock, so directory access stays
/// serialised exactly as it is on a single event loop. After
/// [`shutdown`](Self::shutdown) the directory is gone and every accessor
/// returns `None`.
#[derive(Clone)]
pub struct SharedDirectory {
    inner: Arc<Mutex<Option<Directory>>>,
}

impl SharedDirectory {
    pub fn new(directory: Directory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(directory))),
        }
    }

    /// Run a read-only operation against the directory.
    pub async fn with<R>(&self, f: impl FnOnce(&Directory) -> R) -> Option<R> {
        let guard = self.inner.lock().await;
        guard.as_ref().map(f)
    }

    /// Run a mutating operation against the directory.
    pub async fn with_mut<R>(&self, f: impl FnOnce(&mut Directory) -> R) -> Option<R> {
        let mut guard = self.inner.lock().await;
        guard.as_mut().map(f)
    }

    /// Run a last read-only operation, then shut down whatever it returned.
    pub async fn finish<R>(
        &self,
        chats: &mut (dyn ChatResources + Send),
        f: impl FnOnce(&Directory) -> R,
    ) -> Option<R> {
        let result = self.with(f).await;
        self.shutdown(chats).await;
        result
    }

    pub async fn is_shut_down(&self) -> bool {
        self.inner.lock().await.is_none()
    }

    /// Tear the directory down. Only the first call destroys anything;
    /// returns whether this call did.
    pub async fn shutdown(&self, chats: &mut (dyn ChatResources + Send)) -> bool {
        let taken = self.inner.lock().await.take();
        match taken {
            Some(directory) => {
                info!(gateway = %directory.gateway(), "shutting down session directory");
                directory.destroy(chats);
                true
            }
            None => {
                warn!("session directory already shut down");
                false
            }
        }
    }
}
