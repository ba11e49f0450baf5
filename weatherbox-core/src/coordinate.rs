//! Shared holder for the map's current center.
//!
//! One value, many readers. Every write replaces the previous coordinate and
//! notifies subscribers synchronously, in the order they subscribed. Writes
//! from different threads are serialized together with their notifications,
//! so the last notification always carries the stored value.

use parking_lot::{Mutex, ReentrantMutex};
use std::sync::Arc;

use crate::model::Coordinate;

type Subscriber = Arc<dyn Fn(Coordinate) + Send + Sync>;

/// Handle returned by [`CoordinateHolder::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    value: Coordinate,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

struct Shared {
    inner: Mutex<Inner>,
    // Held across store and notify. Reentrant so a subscriber may call `set`.
    writer: ReentrantMutex<()>,
}

/// Cloneable handle; all clones share the same coordinate.
#[derive(Clone)]
pub struct CoordinateHolder {
    shared: Arc<Shared>,
}

impl CoordinateHolder {
    pub fn new(initial: Coordinate) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    value: initial,
                    next_id: 0,
                    subscribers: Vec::new(),
                }),
                writer: ReentrantMutex::new(()),
            }),
        }
    }

    pub fn get(&self) -> Coordinate {
        self.shared.inner.lock().value
    }

    /// Last write wins.
    pub fn set(&self, value: Coordinate) {
        let _writer = self.shared.writer.lock();

        let subscribers: Vec<Subscriber> = {
            let mut inner = self.shared.inner.lock();
            inner.value = value;
            inner.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect()
        };

        // State lock released so a subscriber may read or write the holder.
        for subscriber in subscribers {
            subscriber(value);
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Coordinate) + Send + Sync + 'static,
    {
        let mut inner = self.shared.inner.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.shared.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.inner.lock().subscribers.len()
    }
}

impl Default for CoordinateHolder {
    fn default() -> Self {
        Self::new(Coordinate::default())
    }
}

impl std::fmt::Debug for CoordinateHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("CoordinateHolder")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_CENTER;

    #[test]
    fn starts_with_initial_value() {
        let holder = CoordinateHolder::default();
        assert_eq!(holder.get(), DEFAULT_CENTER);
    }

    #[test]
    fn last_write_wins_across_clones() {
        let holder = CoordinateHolder::default();
        let other = holder.clone();

        holder.set(Coordinate::new(1.0, 2.0));
        other.set(Coordinate::new(3.0, 4.0));

        assert_eq!(holder.get(), Coordinate::new(3.0, 4.0));
    }

    #[test]
    fn subscribers_are_notified_in_order() {
        let holder = CoordinateHolder::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        holder.subscribe(move |c| first.lock().push(("first", c)));
        let second = Arc::clone(&seen);
        holder.subscribe(move |c| second.lock().push(("second", c)));

        let target = Coordinate::new(10.0, 20.0);
        holder.set(target);

        assert_eq!(*seen.lock(), vec![("first", target), ("second", target)]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let holder = CoordinateHolder::default();
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let id = holder.subscribe(move |_| *counter.lock() += 1);

        holder.set(Coordinate::new(0.0, 0.0));
        assert!(holder.unsubscribe(id));
        assert!(!holder.unsubscribe(id));
        holder.set(Coordinate::new(1.0, 1.0));

        assert_eq!(*count.lock(), 1);
        assert_eq!(holder.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_may_read_holder_during_notification() {
        let holder = CoordinateHolder::default();
        let observed = Arc::new(Mutex::new(None));

        let reader = holder.clone();
        let slot = Arc::clone(&observed);
        holder.subscribe(move |_| *slot.lock() = Some(reader.get()));

        holder.set(Coordinate::new(5.0, 6.0));
        assert_eq!(*observed.lock(), Some(Coordinate::new(5.0, 6.0)));
    }

    #[test]
    fn subscriber_may_write_holder_during_notification() {
        let holder = CoordinateHolder::default();
        let writer = holder.clone();
        holder.subscribe(move |c| {
            if c.longitude > 0.0 {
                writer.set(Coordinate::new(-c.longitude, c.latitude));
            }
        });

        holder.set(Coordinate::new(7.0, 8.0));
        assert_eq!(holder.get(), Coordinate::new(-7.0, 8.0));
    }

    #[test]
    fn concurrent_writers_notify_in_store_order() {
        let holder = CoordinateHolder::default();
        let last_seen = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&last_seen);
        holder.subscribe(move |c| *slot.lock() = Some(c));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let holder = holder.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        holder.set(Coordinate::new(f64::from(t), f64::from(i)));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(*last_seen.lock(), Some(holder.get()));
    }
}
