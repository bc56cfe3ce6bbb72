//! Publish/subscribe bus for playback events.
//!
//! Sources are either the playback manager itself or an individual player.
//! Handlers are called synchronously from `emit`, outside the bus lock, so a
//! handler may subscribe or unsubscribe without deadlocking.

use crate::playback::{PlayerState, Ticks};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Manager,
    Player(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    TimeUpdate,
    Seek,
    PlaybackStart,
    Pause,
    PlayerChange,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::TimeUpdate => "timeupdate",
            EventName::Seek => "seek",
            EventName::PlaybackStart => "playbackstart",
            EventName::Pause => "pause",
            EventName::PlayerChange => "playerchange",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    TimeUpdate,
    Seek { ticks: Ticks },
    PlaybackStart { state: PlayerState },
    Pause { paused: bool },
    PlayerChange,
}

impl PlaybackEvent {
    pub fn name(&self) -> EventName {
        match self {
            PlaybackEvent::TimeUpdate => EventName::TimeUpdate,
            PlaybackEvent::Seek { .. } => EventName::Seek,
            PlaybackEvent::PlaybackStart { .. } => EventName::PlaybackStart,
            PlaybackEvent::Pause { .. } => EventName::Pause,
            PlaybackEvent::PlayerChange => EventName::PlayerChange,
        }
    }
}

pub type Handler = Arc<dyn Fn(&PlaybackEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registration {
    id: SubscriptionId,
    source: Source,
    event: EventName,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, source: Source, event: EventName, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(?source, event = event.as_str(), "subscribe");
        self.registrations.lock().push(Registration {
            id,
            source,
            event,
            handler,
        });
        id
    }

    /// Remove a registration. Returns false if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut regs = self.registrations.lock();
        let before = regs.len();
        regs.retain(|r| r.id != id);
        regs.len() != before
    }

    pub fn emit(&self, source: &Source, event: &PlaybackEvent) {
        let name = event.name();
        let handlers: Vec<Handler> = self
            .registrations
            .lock()
            .iter()
            .filter(|r| &r.source == source && r.event == name)
            .map(|r| Arc::clone(&r.handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscription_count(&self, source: &Source) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|r| &r.source == source)
            .count()
    }

    #[cfg(test)]
    pub fn is_subscribed(&self, source: &Source, event: EventName) -> bool {
        self.registrations
            .lock()
            .iter()
            .any(|r| &r.source == source && r.event == event)
    }
}

/// Owned set of registrations on a single source, released on `release` or drop.
pub struct Subscriptions {
    bus: Arc<EventBus>,
    source: Source,
    ids: Vec<SubscriptionId>,
}

impl Subscriptions {
    pub fn new(bus: Arc<EventBus>, source: Source) -> Self {
        Self {
            bus,
            source,
            ids: Vec::new(),
        }
    }

    pub fn on(&mut self, event: EventName, handler: Handler) {
        let id = self.bus.on(self.source.clone(), event, handler);
        self.ids.push(id);
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn release(&mut self) {
        for id in self.ids.drain(..) {
            self.bus.off(id);
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release();
    }
}
