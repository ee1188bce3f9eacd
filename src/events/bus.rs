//! Synchronous publish/subscribe.
//!
//! The bus is host wiring, not content execution: handlers run on the
//! emitting call, in subscription order, and the first failing handler stops
//! delivery and hands its error back to the emitter. Compare with
//! [`Registry`](crate::registry::Registry), which contains plugin failures.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BusError, HandlerError};

/// Subscriber callback.
pub type Handler = Box<dyn FnMut(&Value) -> Result<(), HandlerError>>;

/// Identifies one subscription, for [`EventBus::off`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId(pub u64);

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handler({})", self.0)
    }
}

/// Topic-keyed, ordered, multi-subscriber event bus.
#[derive(Default)]
pub struct EventBus {
    topics: FxHashMap<String, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic. Handlers run in subscription order.
    pub fn on<F>(&mut self, topic: impl Into<String>, handler: F) -> HandlerId
    where
        F: FnMut(&Value) -> Result<(), HandlerError> + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.topics
            .entry(topic.into())
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe. Returns false if the handler was not subscribed to `topic`.
    pub fn off(&mut self, topic: &str, id: HandlerId) -> bool {
        let Some(handlers) = self.topics.get_mut(topic) else {
            return false;
        };
        let Some(index) = handlers.iter().position(|(hid, _)| *hid == id) else {
            return false;
        };
        handlers.remove(index);
        if handlers.is_empty() {
            self.topics.remove(topic);
        }
        true
    }

    /// Deliver `payload` to every subscriber of `topic`.
    ///
    /// Returns how many handlers ran. A failing handler aborts delivery to
    /// the remaining subscribers.
    pub fn emit(&mut self, topic: &str, payload: &Value) -> Result<usize, BusError> {
        let Some(handlers) = self.topics.get_mut(topic) else {
            return Ok(0);
        };
        let mut delivered = 0;
        for (_, handler) in handlers.iter_mut() {
            handler(payload).map_err(|source| BusError::Subscriber {
                topic: topic.to_string(),
                source,
            })?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Number of subscribers on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut topics: Vec<_> = self
            .topics
            .iter()
            .map(|(topic, handlers)| (topic.as_str(), handlers.len()))
            .collect();
        topics.sort_unstable();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Handler) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| -> Handler {
            let sink = Rc::clone(&sink);
            Box::new(move |_payload: &Value| -> Result<(), HandlerError> {
                sink.borrow_mut().push(name.to_string());
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn test_emit_in_subscription_order() {
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        let mut first = make("first");
        let mut second = make("second");
        bus.on("move", move |p| first(p));
        bus.on("move", move |p| second(p));

        let delivered = bus.emit("move", &json!(null)).unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let mut bus = EventBus::new();
        assert_eq!(bus.emit("nobody", &json!({})).unwrap(), 0);
    }

    #[test]
    fn test_off_removes_only_that_handler() {
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        let mut a = make("a");
        let mut b = make("b");
        let id_a = bus.on("t", move |p| a(p));
        bus.on("t", move |p| b(p));

        assert!(bus.off("t", id_a));
        assert!(!bus.off("t", id_a));
        assert_eq!(bus.subscriber_count("t"), 1);

        bus.emit("t", &json!(1)).unwrap();
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn test_failing_handler_propagates_and_stops_delivery() {
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        bus.on("t", |_| Err(HandlerError::new("boom")));
        let mut after = make("after");
        bus.on("t", move |p| after(p));

        let err = bus.emit("t", &json!(null)).unwrap_err();
        assert_eq!(
            err,
            BusError::Subscriber {
                topic: "t".to_string(),
                source: HandlerError::new("boom"),
            }
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_payload_is_delivered() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let mut bus = EventBus::new();
        bus.on("t", move |p| {
            *sink.borrow_mut() = Some(p.clone());
            Ok(())
        });

        bus.emit("t", &json!({ "tile": "e4" })).unwrap();
        assert_eq!(*seen.borrow(), Some(json!({ "tile": "e4" })));
    }
}
