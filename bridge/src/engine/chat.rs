use tracing::{debug, warn};

/// Opaque handle to a chat the IM core opened for a text channel.
///
/// Deliberately not `Clone`: [`ChatResources::close_chat`] consumes it, so a
/// chat can only be closed once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ChatHandle(u64);

impl ChatHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Chat rendering resources managed by the IM core.
///
/// Closing a chat may have side effects on the IM side (the chat window goes
/// away), so every text channel must be torn down through
/// [`Channel::destroy`](super::channel::Channel::destroy).
pub trait ChatResources {
    /// Open a chat for a text channel.
    fn open_chat(&mut self, channel_id: &str, title: &str) -> ChatHandle;

    /// Release a chat. Called exactly once per handle.
    fn close_chat(&mut self, handle: ChatHandle);
}

/// Chat resources that only log. Used when no IM core is attached (CLI).
#[derive(Debug, Default)]
pub struct TracingChats {
    next_handle: u64,
    open: usize,
}

impl TracingChats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats opened and not yet closed.
    pub fn open_count(&self) -> usize {
        self.open
    }
}

impl ChatResources for TracingChats {
    fn open_chat(&mut self, channel_id: &str, title: &str) -> ChatHandle {
        self.next_handle += 1;
        self.open += 1;
        debug!(handle = self.next_handle, %channel_id, %title, "chat opened");
        ChatHandle::new(self.next_handle)
    }

    fn close_chat(&mut self, handle: ChatHandle) {
        match self.open.checked_sub(1) {
            Some(open) => self.open = open,
            None => warn!(handle = handle.raw(), "closing a chat that was never opened"),
        }
        debug!(handle = handle.raw(), "chat closed");
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_chats_tracks_open_count() {
        let mut chats = TracingChats::new();
        let a = chats.open_chat("c1", "general");
        let b = chats.open_chat("c2", "random");
        assert_ne!(a, b);
        assert_eq!(chats.open_count(), 2);

        chats.close_chat(a);
        assert_eq!(chats.open_count(), 1);
        chats.close_chat(b);
        assert_eq!(chats.open_count(), 0);
    }

    #[test]
    fn test_tracing_chats_close_unknown_does_not_underflow() {
        let mut chats = TracingChats::new();
        chats.close_chat(ChatHandle::new(42));
        assert_eq!(chats.open_count(), 0);
    }

    #[test]
    fn test_handle_raw_roundtrip() {
        assert_eq!(ChatHandle::new(7).raw(), 7);
    }
}
