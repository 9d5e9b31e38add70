//! Where sampling ticks come from: a tokio interval, or a manual handle that
//! lets a caller decide exactly when each cycle happens.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, Mutex, OwnedMutexGuard},
    time::{self, Instant, Interval, MissedTickBehavior},
};

#[derive(Clone)]
pub enum TickSource {
    /// First tick one full period after start.
    Interval(Duration),
    Manual(Arc<Mutex<mpsc::UnboundedReceiver<()>>>),
}

/// Sender half of [`TickSource::Manual`].
#[derive(Clone)]
pub struct ManualTicks {
    sender: mpsc::UnboundedSender<()>,
}

impl ManualTicks {
    /// Requests one cycle. Ticks sent while sampling is stopped are dropped
    /// at the next start.
    pub fn tick(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

impl TickSource {
    pub fn manual() -> (Self, ManualTicks) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            TickSource::Manual(Arc::new(Mutex::new(receiver))),
            ManualTicks { sender },
        )
    }

    pub(crate) async fn ticker(&self) -> Ticker {
        match self {
            TickSource::Interval(period) => {
                let mut interval = time::interval_at(Instant::now() + *period, *period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Ticker::Interval(interval)
            }
            TickSource::Manual(receiver) => {
                let mut guard = Arc::clone(receiver).lock_owned().await;
                while guard.try_recv().is_ok() {}
                Ticker::Manual(guard)
            }
        }
    }
}

pub(crate) enum Ticker {
    Interval(Interval),
    Manual(OwnedMutexGuard<mpsc::UnboundedReceiver<()>>),
}

impl Ticker {
    /// `false` once the source can never tick again.
    pub(crate) async fn tick(&mut self) -> bool {
        match self {
            Ticker::Interval(interval) => {
                interval.tick().await;
                true
            }
            Ticker::Manual(receiver) => receiver.recv().await.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_ticks_before_start_are_dropped() {
        let (source, ticks) = TickSource::manual();
        assert!(ticks.tick());
        assert!(ticks.tick());

        let mut ticker = source.ticker().await;
        ticks.tick();
        assert!(ticker.tick().await);

        let pending = tokio::time::timeout(Duration::from_millis(50), ticker.tick()).await;
        assert!(pending.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_waits_one_period_first() {
        let source = TickSource::Interval(Duration::from_secs(30));
        let mut ticker = source.ticker().await;
        let began = Instant::now();
        ticker.tick().await;
        assert!(began.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn closed_manual_source_stops() {
        let (source, ticks) = TickSource::manual();
        let mut ticker = source.ticker().await;
        drop(ticks);
        assert!(!ticker.tick().await);
    }
}
