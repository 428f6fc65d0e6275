use crate::ID;
use crate::client::ClientId;
use crate::game::Game;
use std::time::Duration;
use tokio::sync::oneshot;

/// Cancellable timer for one prompt, keyed by (game, client, prompt).
///
/// Arming spawns a task that sleeps for the timeout and then runs the
/// expiry callback. Dropping the deadline cancels the task.
#[derive(Debug)]
pub struct Deadline {
    game: ID<Game>,
    client: ClientId,
    seq: u64,
    cancel: oneshot::Sender<()>,
}

impl Deadline {
    pub fn arm<F>(game: ID<Game>, client: ClientId, seq: u64, timeout: Duration, expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, cancelled) = oneshot::channel::<()>();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => expire(),
                _ = cancelled => log::trace!("[game {}] deadline {} for {} cancelled", game, seq, client),
            }
        });
        Self {
            game,
            client,
            seq,
            cancel,
        }
    }
    pub fn key(&self) -> (ID<Game>, ClientId, u64) {
        (self.game, self.client, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    #[tokio::test(start_paused = true)]
    async fn fires_after_timeout() {
        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        let _deadline = Deadline::arm(ID::new(1), ID::new(2), 1, Duration::from_secs(5), move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        let deadline = Deadline::arm(ID::new(1), ID::new(2), 1, Duration::from_secs(5), move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(deadline.key().2, 1);
        drop(deadline);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
