use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How long a signal stays in the map before the eviction timer may drop it.
const EXPIRE_AFTER: Duration = Duration::from_secs(3);
/// How recent a signal must be to count as "typing". This shorter window is
/// authoritative; the longer one above only bounds memory.
const ACTIVE_WINDOW: Duration = Duration::from_secs(2);

/// Directed "is typing" signals, keyed by (sender, receiver). Entirely
/// in-process and non-durable: a restart loses all typing state, which is
/// fine for a best-effort indicator. Constructed once in `main` and injected
/// into the message service.
#[derive(Clone)]
pub struct TypingStatusStore {
    signals: Arc<DashMap<(String, String), Instant>>,
}

impl TypingStatusStore {
    pub fn new() -> Self {
        Self {
            signals: Arc::new(DashMap::new()),
        }
    }

    /// Records (or refreshes) a signal and schedules its eviction. The timer
    /// only removes entries that are genuinely stale, so a refresh survives
    /// timers scheduled by earlier calls.
    pub fn set(&self, sender_id: &str, receiver_id: &str) {
        let key = (sender_id.to_string(), receiver_id.to_string());
        self.signals.insert(key.clone(), Instant::now());
        debug!("Typing signal {} -> {}", sender_id, receiver_id);

        let signals = Arc::clone(&self.signals);
        tokio::spawn(async move {
            tokio::time::sleep(EXPIRE_AFTER).await;
            signals.remove_if(&key, |_, last| last.elapsed() >= EXPIRE_AFTER);
        });
    }

    /// True iff a signal exists for this exact directed pair and is younger
    /// than the active window.
    pub fn is_typing(&self, sender_id: &str, receiver_id: &str) -> bool {
        self.signals
            .get(&(sender_id.to_string(), receiver_id.to_string()))
            .map(|last| last.elapsed() < ACTIVE_WINDOW)
            .unwrap_or(false)
    }
}

impl Default for TypingStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn signal_is_visible_immediately_and_only_in_its_direction() {
        let store = TypingStatusStore::new();
        store.set("alice", "bob");

        assert!(store.is_typing("alice", "bob"));
        assert!(!store.is_typing("bob", "alice"));
        assert!(!store.is_typing("alice", "carol"));
    }

    #[tokio::test(start_paused = true)]
    async fn signal_goes_stale_after_the_active_window() {
        let store = TypingStatusStore::new();
        store.set("alice", "bob");

        advance(Duration::from_millis(1900)).await;
        assert!(store.is_typing("alice", "bob"));

        advance(Duration::from_millis(200)).await;
        assert!(!store.is_typing("alice", "bob"));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_survives_the_original_eviction_timer() {
        let store = TypingStatusStore::new();
        store.set("alice", "bob");
        tokio::task::yield_now().await;

        advance(Duration::from_millis(2500)).await;
        store.set("alice", "bob");
        tokio::task::yield_now().await;

        // the first call's 3s timer fires here; the refreshed entry must stay
        advance(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        assert!(store.is_typing("alice", "bob"));
    }
}
