//! In-process notification bus.
//!
//! Components publish typed events and subscribe handlers for the event
//! types they care about. Handlers run synchronously on the publishing
//! thread, in subscription order.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Marker for types that can travel over [`Signals`].
pub trait Event: Any + Send + Sync {}

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Handle returned by [`Signals::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    id: u64,
    event: TypeId,
}

impl SubscriptionToken {
    /// Numeric subscription id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

struct Subscription {
    token: SubscriptionToken,
    handler: Handler,
}

/// Publish/subscribe hub keyed by event type.
#[derive(Default)]
pub struct Signals {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl Signals {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of type `E`.
    pub fn subscribe<E, F>(&self, handler: F) -> SubscriptionToken
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let token = SubscriptionToken {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            event: TypeId::of::<E>(),
        };

        let handler: Handler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });

        self.subscriptions
            .write()
            .push(Subscription { token, handler });
        token
    }

    /// Remove a subscription.
    ///
    /// Returns false if the token was already removed.
    pub fn unsubscribe(&self, token: &SubscriptionToken) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.token != *token);
        subscriptions.len() != before
    }

    /// Deliver `event` to every handler subscribed to its type.
    pub fn publish<E: Event>(&self, event: &E) {
        // Handlers are collected first so they may publish or unsubscribe.
        let handlers: Vec<Handler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.token.event == TypeId::of::<E>())
            .map(|s| Arc::clone(&s.handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }
}

impl std::fmt::Debug for Signals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signals")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Ping(usize);
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    #[test]
    fn test_publish_reaches_matching_handlers() {
        let signals = Signals::new();
        let total = Arc::new(AtomicUsize::new(0));

        let t = Arc::clone(&total);
        signals.subscribe::<Ping, _>(move |p| {
            t.fetch_add(p.0, Ordering::SeqCst);
        });

        let pongs = Arc::new(AtomicUsize::new(0));
        let p = Arc::clone(&pongs);
        signals.subscribe::<Pong, _>(move |_| {
            p.fetch_add(1, Ordering::SeqCst);
        });

        signals.publish(&Ping(3));
        signals.publish(&Ping(4));

        assert_eq!(total.load(Ordering::SeqCst), 7);
        assert_eq!(pongs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let signals = Signals::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let token = signals.subscribe::<Pong, _>(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(signals.unsubscribe(&token));
        assert!(!signals.unsubscribe(&token));
        assert_eq!(signals.subscription_count(), 0);

        signals.publish(&Pong);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_may_publish() {
        let signals = Arc::new(Signals::new());
        let pongs = Arc::new(AtomicUsize::new(0));

        let bus = Arc::clone(&signals);
        signals.subscribe::<Ping, _>(move |_| bus.publish(&Pong));

        let p = Arc::clone(&pongs);
        signals.subscribe::<Pong, _>(move |_| {
            p.fetch_add(1, Ordering::SeqCst);
        });

        signals.publish(&Ping(0));
        assert_eq!(pongs.load(Ordering::SeqCst), 1);
    }
}
