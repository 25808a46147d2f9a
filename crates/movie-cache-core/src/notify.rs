use movie_cache_models::FavoriteChange;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

const DEFAULT_CAPACITY: usize = 64;

/// Fire-and-forget fan-out of favorite flips.
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// dropped. There is no replay, so a subscriber that was not listening (or
/// fell too far behind) must re-read the store for the truth.
pub struct FavoriteNotifier {
    sender: broadcast::Sender<FavoriteChange>,
}

impl FavoriteNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns how many subscribers the event was handed to.
    pub fn publish(&self, change: FavoriteChange) -> usize {
        match self.sender.send(change) {
            Ok(receivers) => {
                trace!("Published {:?} to {} subscriber(s)", change, receivers);
                receivers
            }
            Err(_) => {
                trace!("Published {:?} with no subscribers", change);
                0
            }
        }
    }

    pub fn subscribe(&self) -> FavoriteSubscription {
        FavoriteSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for FavoriteNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration on the favorite channel. Dropping it unregisters.
pub struct FavoriteSubscription {
    receiver: broadcast::Receiver<FavoriteChange>,
}

impl FavoriteSubscription {
    /// Wait for the next change. `None` once the repository is gone.
    /// Events lost to lag are skipped with a warning.
    pub async fn recv(&mut self) -> Option<FavoriteChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(missed)) => {
                    warn!("Favorite subscriber lagged, {} change(s) dropped", missed);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of `recv`; `None` when nothing is pending.
    pub fn try_recv(&mut self) -> Option<FavoriteChange> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Favorite subscriber lagged, {} change(s) dropped", missed);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
