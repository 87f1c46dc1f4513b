//! Bounded queue with an explicit shutdown sentinel.
//!
//! `None` is the sentinel: every stage's receive loop treats it as a
//! request to stop, never as a malformed item. This mirrors the pattern a
//! dedicated worker thread uses elsewhere in this codebase to shut down
//! cleanly without relying on a channel's sender being dropped (multiple
//! producers may still be alive when a stage should stop).

use crossbeam::channel::{bounded, Receiver, SendError, Sender};

pub struct QueueSender<T> {
    inner: Sender<Option<T>>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        QueueSender {
            inner: self.inner.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    pub fn send(&self, item: T) -> Result<(), SendError<Option<T>>> {
        self.inner.send(Some(item))
    }

    pub fn shutdown(&self) {
        let _ = self.inner.send(None);
    }
}

pub type QueueReceiver<T> = Receiver<Option<T>>;

pub fn bounded_queue<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (sender, receiver) = bounded(capacity);
    (QueueSender { inner: sender }, receiver)
}

/// Receive items until either the channel is closed or the shutdown
/// sentinel arrives; both are graceful termination, not an error.
pub fn recv_until_shutdown<T>(receiver: &QueueReceiver<T>) -> Option<T> {
    match receiver.recv() {
        Ok(Some(item)) => Some(item),
        Ok(None) | Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_sentinel_stops_the_receive_loop() {
        let (sender, receiver) = bounded_queue::<u32>(4);
        sender.send(1).unwrap();
        sender.send(2).unwrap();
        sender.shutdown();

        let mut received = Vec::new();
        while let Some(item) = recv_until_shutdown(&receiver) {
            received.push(item);
        }
        assert_eq!(received, vec![1, 2]);
    }
}
