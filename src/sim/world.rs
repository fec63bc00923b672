//! World state: body arena, AI registry, teams and entity lifecycle
//!
//! The world is the only thing that adds or removes bodies and AIs.
//! Anything created or destroyed while a phase is iterating goes through
//! `pending` or the `deleted` flag and is applied in `process_lifecycle`.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ai::{AiId, RosterEntry, ShipAi};
use super::body::{Body, BodyId, BodyKind, BodyTag, DamageOutcome};
use super::collision::{Impulse, can_collide, resolve_collision, shields_interact};
use super::events::{Notification, Outbox, ShipEvent, ShipEventKind, Subscriber, TargetAction, WorldEvent};
use super::markers::Markers;
use super::portal::Portal;
use super::shield::Shield;
use super::ship::Ship;
use super::team::{TeamId, Teams};
use crate::audio::{AudioBackend, SilentAudio, SoundEffect};
use crate::consts::*;
use crate::settings::{ShieldTuning, ShipTuning, SimConfig};

/// Bodies sorted by id
#[derive(Debug, Default)]
pub struct Bodies {
    items: Vec<Body>,
}

impl Bodies {
    pub fn insert(&mut self, body: Body) {
        match self.items.binary_search_by_key(&body.id, |b| b.id) {
            Ok(idx) => self.items[idx] = body,
            Err(idx) => self.items.insert(idx, body),
        }
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.index_of(id)?;
        Some(self.items.remove(idx))
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.items.binary_search_by_key(&id, |b| b.id).ok()
    }

    /// Any body with this id, deleted or not
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|idx| &self.items[idx])
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(|idx| &mut self.items[idx])
    }

    /// Body with this id that has not been deleted
    pub fn live(&self, id: BodyId) -> Option<&Body> {
        self.get(id).filter(|b| !b.is_deleted())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<BodyId> {
        self.items.iter().map(|b| b.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn retain_live(&mut self) {
        self.items.retain(|b| !b.is_deleted());
    }

    /// Where `body`'s impulses go: its collision target while that is live, else itself
    pub fn live_target(&self, body: &Body) -> BodyId {
        if self.live(body.collision_target).is_some() {
            body.collision_target
        } else {
            body.id
        }
    }

    /// Resolve one contact and push the impulse into both collision targets
    pub fn collide(&mut self, a: BodyId, b: BodyId) -> Option<Impulse> {
        let (body_a, body_b) = (self.get(a)?, self.get(b)?);
        let impulse = resolve_collision(body_a, body_b)?;
        let (target_a, target_b) = (self.live_target(body_a), self.live_target(body_b));
        if let Some(t) = self.get_mut(target_a) {
            t.vel += impulse.delta_a;
        }
        if let Some(t) = self.get_mut(target_b) {
            t.vel += impulse.delta_b;
        }
        Some(impulse)
    }

    /// Pairwise sweep over every unordered pair of live bodies
    fn sweep(&mut self, eligible: fn(&Body, &Body) -> bool) -> usize {
        let mut resolved = 0;
        for i in 0..self.items.len() {
            for j in (i + 1)..self.items.len() {
                let (a, b) = (&self.items[i], &self.items[j]);
                if a.is_deleted() || b.is_deleted() || !eligible(a, b) || !a.overlaps(b) {
                    continue;
                }
                let (a, b) = (a.id, b.id);
                if self.collide(a, b).is_some() {
                    resolved += 1;
                }
            }
        }
        resolved
    }

    /// General collisions between bodies that cause and can be struck
    pub fn sweep_collisions(&mut self) -> usize {
        self.sweep(can_collide)
    }

    /// Enemy shields bounce off each other
    pub fn sweep_shields(&mut self) -> usize {
        self.sweep(shields_interact)
    }
}

/// Mutations deferred to the lifecycle phase
#[derive(Debug)]
pub(super) enum Pending {
    /// Move a ship that entered a portal into it
    Transfer { ship: BodyId, portal: BodyId },
    /// Add a body created mid-frame
    Spawn(Body),
}

/// Complete simulation state
#[derive(Debug)]
pub struct World {
    pub map_size: DVec2,
    pub bodies: Bodies,
    /// Sorted by id
    pub ais: Vec<ShipAi>,
    pub teams: Teams,
    pub markers: Markers,
    /// Frames simulated so far
    pub frame: u64,
    pub ship_tuning: ShipTuning,
    pub shield_tuning: ShieldTuning,
    pub collision_damping: f64,
    pub(super) outbox: Outbox,
    pub(super) pending: Vec<Pending>,
    pub(super) audio: Box<dyn AudioBackend>,
    pub(super) rng: Pcg32,
    observed: Vec<Notification>,
    next_body_id: u32,
    next_ai_id: u32,
}

impl World {
    pub fn new(map_size: DVec2, seed: u64) -> Self {
        Self {
            map_size,
            bodies: Bodies::default(),
            ais: Vec::new(),
            teams: Teams::default(),
            markers: Markers::default(),
            frame: 0,
            ship_tuning: ShipTuning::default(),
            shield_tuning: ShieldTuning::default(),
            collision_damping: DEFAULT_COLLISION_DAMPING,
            outbox: Outbox::default(),
            pending: Vec::new(),
            audio: Box::new(SilentAudio::new()),
            rng: Pcg32::seed_from_u64(seed),
            observed: Vec::new(),
            next_body_id: 1,
            next_ai_id: 1,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        let mut world = Self::new(config.map_size, config.seed);
        world.ship_tuning = config.ship.clone();
        world.shield_tuning = config.shield.clone();
        world.collision_damping = config.collision_damping;
        world
    }

    /// Swap the audio backend
    pub fn with_audio(mut self, audio: Box<dyn AudioBackend>) -> Self {
        self.audio = audio;
        self
    }

    pub fn add_team(&mut self, name: &str, color: [f32; 4]) -> TeamId {
        self.teams.add(name, color)
    }

    pub fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        id
    }

    fn next_ai_id(&mut self) -> AiId {
        let id = AiId(self.next_ai_id);
        self.next_ai_id += 1;
        id
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    /// Insert a body as is. Not for use while a phase is iterating.
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        // keep the id counter ahead of externally built bodies
        self.next_body_id = self.next_body_id.max(body.id.0 + 1);
        body.collision_damping = body.collision_damping.clamp(0.0, 1.0);
        let id = body.id;
        self.bodies.insert(body);
        id
    }

    /// Queue a body for insertion in the lifecycle phase
    pub(super) fn spawn_deferred(&mut self, body: Body) {
        self.pending.push(Pending::Spawn(body));
    }

    /// Register a ship: audio resources, a steering AI and (if configured) a shield
    pub fn add_ship(&mut self, mut body: Body) -> BodyId {
        let ai_id = self.next_ai_id();
        let ship_id = body.id;
        let Some(ship) = body.as_ship_mut() else {
            log::warn!("add_ship called with a {}", body.name());
            return self.add_body(body);
        };
        if !ship.has_resources() {
            ship.init_resources(self.audio.as_mut());
        }
        ship.events.subscribe(Subscriber::Ai(ai_id), ShipEventKind::Deleted);
        let needs_shield = ship.shield.is_none() && self.shield_tuning.enabled;

        self.add_body(body);
        self.ais.push(ShipAi::new(ai_id, ship_id));
        if needs_shield {
            self.spawn_shield_for(ship_id);
        }
        log::info!("Added ship {:?} with AI {:?}", ship_id, ai_id);
        ship_id
    }

    /// Build a ship from the world's tuning and add it
    pub fn spawn_ship(&mut self, team: TeamId, pos: DVec2, rotation: f64) -> BodyId {
        let id = self.next_body_id();
        let mut body = Body::new(id, BodyKind::Ship(Ship::from_tuning("Ship", &self.ship_tuning)))
            .with_pos(pos)
            .with_rotation(rotation)
            .with_team(team);
        body.collision_damping = self.collision_damping;
        self.add_ship(body)
    }

    /// Wrap a ship in a shield that follows it
    pub fn spawn_shield_for(&mut self, ship_id: BodyId) -> Option<BodyId> {
        let (pos, vel, team) = {
            let ship = self.bodies.live(ship_id)?;
            ship.as_ship()?;
            (ship.pos, ship.vel, ship.team)
        };
        let id = self.next_body_id();
        let mut shield = Shield::from_tuning(&self.shield_tuning);
        shield.anchor = Some(ship_id);
        let mut body = Body::new(id, BodyKind::Shield(shield))
            .with_pos(pos)
            .with_vel(vel)
            .with_radius(self.shield_tuning.radius)
            .with_collision_target(ship_id);
        body.defense = self.shield_tuning.defense;
        body.team = team;
        self.add_body(body);
        if let Some(ship) = self.bodies.get_mut(ship_id).and_then(Body::as_ship_mut) {
            ship.shield = Some(id);
        }
        Some(id)
    }

    pub fn spawn_portal(&mut self, pos: DVec2, require_flagship: bool, auto_activate: bool) -> BodyId {
        let id = self.next_body_id();
        let body = Body::new(id, BodyKind::Portal(Portal::new(require_flagship, auto_activate))).with_pos(pos);
        log::info!("Spawned portal {:?} at {:?}", id, pos);
        self.add_body(body)
    }

    /// Delete a body; it leaves the arena in the lifecycle phase
    pub fn delete_physics_object(&mut self, id: BodyId) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => body.delete(&mut self.outbox),
            None => false,
        }
    }

    pub fn damage(&mut self, id: BodyId, amount: f64, explosion: &str) -> DamageOutcome {
        let Some(body) = self.bodies.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = body.damage(amount, explosion, &mut self.outbox);
        if outcome == DamageOutcome::Destroyed {
            self.audio.play(SoundEffect::Explosion);
            log::info!("Ship {:?} destroyed", id);
        }
        outcome
    }

    pub fn announce(&mut self, message: &str) {
        log::info!("{message}");
        self.outbox.push_event(WorldEvent::Announcement(message.to_string()));
    }

    pub fn ai_for_ship(&self, ship: BodyId) -> Option<&ShipAi> {
        self.ais.iter().find(|ai| ai.alive && ai.ship == ship)
    }

    fn ai_and_ship_mut(&mut self, ship: BodyId) -> Option<(&mut ShipAi, &mut Ship, &mut Markers)> {
        let ai = self.ais.iter_mut().find(|ai| ai.alive && ai.ship == ship)?;
        let body = self.bodies.get_mut(ship).filter(|b| !b.is_deleted())?;
        Some((ai, body.as_ship_mut()?, &mut self.markers))
    }

    pub fn command_to_move(&mut self, ship: BodyId, dest: DVec2, queue: bool) -> bool {
        let Some((ai, ship, markers)) = self.ai_and_ship_mut(ship) else {
            return false;
        };
        ai.command_to_move(ship, dest, queue, markers);
        true
    }

    pub fn command_to_point(&mut self, ship: BodyId, dir: DVec2, queue: bool) -> bool {
        let Some((ai, ship, markers)) = self.ai_and_ship_mut(ship) else {
            return false;
        };
        ai.command_to_point(ship, dir, queue, markers);
        true
    }

    /// Fly to an enterable body and go inside once touching it
    pub fn command_to_enter(&mut self, ship: BodyId, target: BodyId) -> bool {
        let Some(dest) = self.bodies.live(target).filter(|b| b.can_be_entered()).map(|b| b.pos) else {
            return false;
        };
        if !self.command_to_move(ship, dest, false) {
            return false;
        }
        if let Some(s) = self.bodies.get_mut(ship).and_then(Body::as_ship_mut) {
            s.enter_input = Some(target);
        }
        if let Some(t) = self.bodies.get(target) {
            t.on_targeted(ship, TargetAction::Enter, &mut self.outbox);
        }
        true
    }

    pub fn set_selected(&mut self, id: BodyId, selected: bool) {
        if let Some(body) = self.bodies.get_mut(id).filter(|b| b.caps.can_be_selected) {
            body.selected = selected;
        }
        if let Some(ai) = self.ais.iter_mut().find(|ai| ai.alive && ai.ship == id) {
            if selected {
                ai.select();
            } else {
                ai.deselect();
            }
        }
    }

    /// Listen to a ship's events from the host side
    pub fn subscribe(&mut self, ship: BodyId, observer: u32, kind: ShipEventKind) -> bool {
        match self.bodies.get_mut(ship).and_then(Body::as_ship_mut) {
            Some(s) => {
                s.events.subscribe(Subscriber::Observer(observer), kind);
                true
            }
            None => false,
        }
    }

    /// Every AI with its ship's current position and liveness
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.ais
            .iter()
            .filter_map(|ai| {
                let body = self.bodies.get(ai.ship)?;
                Some(RosterEntry {
                    ai: ai.id,
                    ship: ai.ship,
                    team: body.team,
                    pos: body.pos,
                    alive: ai.alive && !body.is_deleted(),
                })
            })
            .collect()
    }

    pub(super) fn update_ais(&mut self) {
        let roster = self.roster();
        for ai in self.ais.iter_mut().filter(|ai| ai.alive) {
            let Some(body) = self.bodies.get_mut(ai.ship).filter(|b| !b.is_deleted()) else {
                continue;
            };
            let Some(target_ship) = ai.update(body, &roster, &mut self.markers) else {
                continue;
            };
            if let Some(target) = self.bodies.live(target_ship) {
                target.on_targeted(ai.ship, TargetAction::Attack, &mut self.outbox);
            }
        }
    }

    /// Shields follow their ship; a shield whose ship is gone goes with it
    pub(super) fn sync_shield_anchors(&mut self) {
        let anchored: Vec<(BodyId, BodyId)> = self
            .bodies
            .iter()
            .filter(|b| !b.is_deleted())
            .filter_map(|b| Some((b.id, b.as_shield()?.anchor?)))
            .collect();
        for (shield, anchor) in anchored {
            match self.bodies.live(anchor).map(|a| (a.pos, a.vel)) {
                Some((pos, vel)) => {
                    if let Some(body) = self.bodies.get_mut(shield) {
                        body.pos = pos;
                        body.vel = vel;
                    }
                }
                None => {
                    self.delete_physics_object(shield);
                }
            }
        }
    }

    fn delete_ai(&mut self, id: AiId) {
        if let Some(ai) = self.ais.iter_mut().find(|ai| ai.id == id) {
            if ai.alive {
                ai.terminate(&mut self.markers);
                log::debug!("AI {:?} terminated", id);
            }
        }
    }

    /// Route notifications, apply deferred mutations, drop deleted entries
    pub(super) fn process_lifecycle(&mut self) {
        for notification in std::mem::take(&mut self.outbox.notifications) {
            match notification.subscriber {
                Subscriber::Ai(ai) if notification.event == ShipEvent::Deleted => self.delete_ai(ai),
                Subscriber::Ai(_) => {}
                Subscriber::Observer(_) => self.observed.push(notification),
            }
        }

        for pending in std::mem::take(&mut self.pending) {
            match pending {
                Pending::Transfer { ship, portal } => self.transfer_into_portal(ship, portal),
                Pending::Spawn(body) => {
                    self.add_body(body);
                }
            }
        }

        self.bodies.retain_live();
        self.ais.retain(|ai| ai.alive);
    }

    /// World events since the last drain
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.outbox.events)
    }

    /// Notifications for host-side observers since the last drain
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.observed)
    }

    pub fn ships(&self) -> impl Iterator<Item = &Body> {
        self.bodies
            .iter()
            .filter(|b| !b.is_deleted() && b.tag() == BodyTag::Ship)
    }

    pub fn count_tag(&self, tag: BodyTag) -> usize {
        self.bodies.iter().filter(|b| !b.is_deleted() && b.tag() == tag).count()
    }
}
