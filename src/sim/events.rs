//! Ship notifications and world events
//!
//! Ships own an explicit listener list. Emitting appends one notification per
//! matching listener to the world outbox; the lifecycle phase routes them.
//! World events are requests to external collaborators (explosion effects,
//! announcements, level completion) and are drained by the host.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ai::AiId;
use super::body::BodyId;

/// Why a ship was targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetAction {
    Attack,
    Enter,
}

/// Lifecycle notifications a ship emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipEvent {
    Targeted { by: BodyId, action: TargetAction },
    Hit,
    Destroyed,
    Deleted,
}

/// Event discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipEventKind {
    Targeted,
    Hit,
    Destroyed,
    Deleted,
}

impl ShipEvent {
    pub fn kind(&self) -> ShipEventKind {
        match self {
            ShipEvent::Targeted { .. } => ShipEventKind::Targeted,
            ShipEvent::Hit => ShipEventKind::Hit,
            ShipEvent::Destroyed => ShipEventKind::Destroyed,
            ShipEvent::Deleted => ShipEventKind::Deleted,
        }
    }
}

/// Who receives a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subscriber {
    /// The steering AI driving the ship
    Ai(AiId),
    /// Host-side listener (UI, audio cues, stats)
    Observer(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub subscriber: Subscriber,
    pub kind: ShipEventKind,
}

/// A delivered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub source: BodyId,
    pub subscriber: Subscriber,
    pub event: ShipEvent,
}

/// Per-ship listener list
#[derive(Debug, Clone, Default)]
pub struct EventChannel {
    listeners: Vec<Listener>,
}

impl EventChannel {
    pub fn subscribe(&mut self, subscriber: Subscriber, kind: ShipEventKind) {
        let listener = Listener { subscriber, kind };
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    /// Drop every subscription held by `subscriber`
    pub fn unsubscribe(&mut self, subscriber: Subscriber) {
        self.listeners.retain(|l| l.subscriber != subscriber);
    }

    /// Detach all listeners
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&self, source: BodyId, event: ShipEvent, outbox: &mut Outbox) {
        let kind = event.kind();
        for listener in self.listeners.iter().filter(|l| l.kind == kind) {
            outbox.notifications.push(Notification {
                source,
                subscriber: listener.subscriber,
                event,
            });
        }
    }
}

/// Requests for the external collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Spawn an explosion effect
    Explosion {
        pos: DVec2,
        vel: DVec2,
        animation: String,
    },
    /// A ship was destroyed and is worth `bounty`
    ShipDestroyed { ship: BodyId, bounty: u32 },
    /// A ship moved into a portal
    ShipEnteredPortal { ship: BodyId, portal: BodyId },
    /// Message for the player
    Announcement(String),
    /// A portal was activated with these ships inside
    LevelFinished { ships: Vec<BodyId> },
}

/// Everything emitted during a frame, awaiting dispatch
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pub notifications: Vec<Notification>,
    pub events: Vec<WorldEvent>,
}

impl Outbox {
    pub fn push_event(&mut self, event: WorldEvent) {
        self.events.push(event);
    }
}
