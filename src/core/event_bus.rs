//! Controller notifications: immediate subscribers plus a deferred queue.
//!
//! The controller emits; the app drains the queue once per frame with
//! `poll()`. Subscribers run synchronously inside `emit()`, in
//! subscription order for a given event type.
//!
//! Emitting never feeds back into the controller. Notifications describe
//! what already happened.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use super::timeline::TimelinePhase;
use crate::input::TriggerSource;

/// Oldest half of the queue is dropped once this many events are waiting.
const MAX_QUEUE_SIZE: usize = 256;

/// Marker trait for anything that can travel on the bus.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

pub type BoxedEvent = Box<dyn Event>;

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// The latch was set by `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggeredEvent {
    pub source: TriggerSource,
}

/// A phase timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChangedEvent {
    pub from: TimelinePhase,
    pub to: TimelinePhase,
}

/// The audio cue could not start. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFailedEvent {
    pub reason: String,
}

#[derive(Default)]
struct Shared {
    subscribers: RwLock<HashMap<TypeId, Vec<Callback>>>,
    queue: Mutex<Vec<BoxedEvent>>,
}

impl Shared {
    fn emit<E: Event>(&self, event: E) {
        let subscribers = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
        if let Some(callbacks) = subscribers.get(&TypeId::of::<E>()) {
            for cb in callbacks {
                cb(&event);
            }
        }
        drop(subscribers);

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict = queue.len() / 2;
            warn!("Event queue full ({} events), dropping oldest {}", queue.len(), evict);
            queue.drain(0..evict);
        }
        queue.push(Box::new(event));
    }
}

/// Owner side of the bus. Cheap to clone.
#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for events of type `E`.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.shared
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event>(&self, event: E) {
        self.shared.emit(event);
    }

    /// Drain everything emitted since the last poll.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.shared.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Handle for the controller.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            shared: Some(Arc::clone(&self.shared)),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.shared.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Emit-only handle. A detached emitter drops everything.
#[derive(Clone, Default)]
pub struct EventEmitter {
    shared: Option<Arc<Shared>>,
}

impl EventEmitter {
    /// Emitter connected to nothing.
    pub fn detached() -> Self {
        Self { shared: None }
    }

    pub fn emit<E: Event>(&self, event: E) {
        if let Some(shared) = &self.shared {
            shared.emit(event);
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("attached", &self.shared.is_some())
            .finish()
    }
}

/// Downcast a queued event.
///
/// The explicit `**` matters: `Box<dyn Event>` itself satisfies the blanket
/// `Event` impl, and calling `as_any()` on the box would yield the box's
/// `TypeId` and every downcast would fail.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
