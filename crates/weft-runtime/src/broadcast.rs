#![forbid(unsafe_code)]

//! Multi-consumer event fan-out.
//!
//! A [`Broadcast`] clones each published value to every live subscriber.
//! Late subscribers receive only values published after they subscribed —
//! broadcast semantics, not replay. Subscribers whose receiver has been
//! dropped are pruned on the next publish.

use std::sync::mpsc::{self, Receiver, Sender};

/// A multi-consumer channel with fan-out.
#[derive(Debug)]
pub struct Broadcast<T: Clone> {
    senders: Vec<Sender<T>>,
}

impl<T: Clone> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Broadcast<T> {
    /// Create a broadcast with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Subscribe; the receiver sees values published from now on.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    /// Publish a value to every live subscriber.
    pub fn publish(&mut self, value: &T) {
        self.senders.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Number of live subscribers as of the last publish.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Broadcast;

    #[test]
    fn every_subscriber_sees_each_publish() {
        let mut broadcast = Broadcast::new();
        let a = broadcast.subscribe();
        let b = broadcast.subscribe();

        broadcast.publish(&1);
        broadcast.publish(&2);

        assert_eq!(a.try_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(b.try_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn late_subscribers_miss_past_events() {
        let mut broadcast = Broadcast::new();
        broadcast.publish(&1);

        let late = broadcast.subscribe();
        broadcast.publish(&2);

        assert_eq!(late.try_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut broadcast = Broadcast::new();
        let keep = broadcast.subscribe();
        drop(broadcast.subscribe());

        broadcast.publish(&7);
        assert_eq!(broadcast.subscriber_count(), 1);
        assert_eq!(keep.try_iter().collect::<Vec<_>>(), vec![7]);
    }
}
