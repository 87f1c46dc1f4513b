//! Periodic phase-transition watcher: the one component that wakes up on a
//! wall-clock cadence rather than reacting to an incoming item. It fires the
//! one-shot opening auction and the close-time cleanup that the venue never
//! initiates on its own, since `ExchangeVenue` only reacts to requests.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use crossbeam::channel::{bounded, RecvTimeoutError, Sender};

use crate::phase::PhaseSource;
use crate::venue::ExchangeVenue;

pub struct PhasePoller {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

impl PhasePoller {
    pub fn spawn(venue: Arc<ExchangeVenue>, phase_source: Arc<dyn PhaseSource>, check_interval: Duration) -> Self {
        let (shutdown, shutdown_rx) = bounded::<()>(1);

        let handle = std::thread::spawn(move || {
            let mut last_open_second: Option<DateTime<Utc>> = None;
            let mut last_close_second: Option<DateTime<Utc>> = None;

            loop {
                match shutdown_rx.recv_timeout(check_interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let raw_now = Utc::now();
                let now = raw_now.with_nanosecond(0).unwrap_or(raw_now);

                if phase_source.is_open_instant(now) && last_open_second != Some(now) {
                    last_open_second = Some(now);
                    for instrument_id in venue.instrument_ids() {
                        match venue.execute_opening_auction(&instrument_id, None, now.timestamp()) {
                            Ok(trades) => tracing::info!(instrument_id = %instrument_id, trade_count = trades.len(), "opening auction executed"),
                            Err(err) => tracing::warn!(instrument_id = %instrument_id, error = %err, "opening auction failed"),
                        }
                    }
                }

                if phase_source.is_close_instant(now) && last_close_second != Some(now) {
                    last_close_second = Some(now);
                    venue.cancel_all_orders();
                    tracing::info!("market close: all resting orders cancelled");
                }
            }
            tracing::info!("phase poller shutting down");
        });

        PhasePoller { shutdown, handle }
    }

    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.join();
    }
}
