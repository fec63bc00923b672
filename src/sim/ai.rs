//! Steering AI
//!
//! One `ShipAi` drives one ship. With commands queued it executes the head
//! of the queue and nothing else; with an empty queue it seeks the nearest
//! enemy, turns toward it with a proportional controller and fires once the
//! angular error is small.
//!
//! The AI only writes the ship's control inputs. Motion happens in the
//! ship's own update on the next frame.

use std::collections::VecDeque;
use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use super::markers::{MarkerId, Markers};
use super::ship::Ship;
use super::team::TeamId;
use crate::consts::*;
use crate::{angle_subtract, unit_vector, vector_angle};

/// Stable AI id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AiId(pub u32);

/// What one AI can see of another, captured at the start of the AI phase
#[derive(Debug, Clone, Copy)]
pub struct RosterEntry {
    pub ai: AiId,
    pub ship: BodyId,
    pub team: Option<TeamId>,
    pub pos: DVec2,
    pub alive: bool,
}

/// Motion state a command steers from
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub pos: DVec2,
    pub vel: DVec2,
    pub rotation: f64,
}

impl Pose {
    pub fn of(body: &Body) -> Self {
        Self {
            pos: body.pos,
            vel: body.vel,
            rotation: body.rotation,
        }
    }
}

/// Turn to face a fixed direction
#[derive(Debug, Clone)]
pub struct PointCommand {
    pub dir: DVec2,
    pub done: bool,
}

impl PointCommand {
    pub fn new(dir: DVec2) -> Self {
        Self { dir, done: false }
    }

    fn execute(&mut self, pose: &Pose, ship: &mut Ship) {
        let delta = angle_subtract(vector_angle(self.dir), pose.rotation);
        ship.set_rotate_input(delta / ship.rotation_speed);
        self.done = delta.abs() < POINT_TOLERANCE;
    }
}

/// Fly to a point and come to a full stop there
#[derive(Debug, Clone)]
pub struct MoveCommand {
    pub dest: DVec2,
    pub done: bool,
    /// Squared distance that counts as arrived
    pub threshold: f64,
    marker: Option<MarkerId>,
}

impl MoveCommand {
    pub fn new(dest: DVec2, marker: Option<MarkerId>) -> Self {
        Self {
            dest,
            done: false,
            threshold: MOVE_ARRIVAL_DIST_SQRD,
            marker,
        }
    }

    fn execute(&mut self, pose: &Pose, ship: &mut Ship) {
        let rel_target = self.dest - pose.pos;
        let close_enough = rel_target.length_squared() < self.threshold;

        // aim at where we'd come to rest if we started braking now
        let mut target_dir = rel_target.normalize_or_zero();
        let stop_distance = braking_distance(pose.vel, ship);
        if stop_distance > 0.0 {
            let rel_stop = pose.vel.normalize_or_zero() * stop_distance;
            target_dir = (rel_target - rel_stop).normalize_or_zero();
        }

        if close_enough {
            decelerate(pose, ship);
        } else if unit_vector(pose.rotation).dot(target_dir) > MOVE_ALIGN_DOT {
            // thrusting would get us closer to our target
            ship.set_thrust_input(1.0, false);
            point_toward_direction(pose.rotation, ship, target_dir);
        } else {
            ship.set_thrust_input(0.0, false);
            point_toward_direction(pose.rotation, ship, target_dir);
        }

        // the brake snap in the ship update makes this exact
        self.done = pose.vel == DVec2::ZERO && close_enough;
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Point(PointCommand),
    Move(MoveCommand),
}

impl Command {
    fn execute(&mut self, pose: &Pose, ship: &mut Ship) {
        match self {
            Command::Point(cmd) => cmd.execute(pose, ship),
            Command::Move(cmd) => cmd.execute(pose, ship),
        }
    }

    pub fn is_done(&self) -> bool {
        match self {
            Command::Point(cmd) => cmd.done,
            Command::Move(cmd) => cmd.done,
        }
    }

    pub fn marker(&self) -> Option<MarkerId> {
        match self {
            Command::Point(_) => None,
            Command::Move(cmd) => cmd.marker,
        }
    }

    /// Give back any display resource the command holds
    fn release(&mut self, markers: &mut Markers) {
        if let Command::Move(cmd) = self {
            if let Some(marker) = cmd.marker.take() {
                markers.release(marker);
            }
        }
    }
}

#[derive(Debug)]
pub struct ShipAi {
    pub id: AiId,
    pub ship: BodyId,
    /// Weak reference, re-validated against the roster every frame
    pub target: Option<AiId>,
    pub alive: bool,
    pub selected: bool,
    pub commands: VecDeque<Command>,
}

impl ShipAi {
    pub fn new(id: AiId, ship: BodyId) -> Self {
        Self {
            id,
            ship,
            target: None,
            alive: true,
            selected: false,
            commands: VecDeque::new(),
        }
    }

    /// Drive the ship for one frame. Returns the ship of a newly acquired
    /// target so the caller can notify it.
    pub fn update(&mut self, body: &mut Body, roster: &[RosterEntry], markers: &mut Markers) -> Option<BodyId> {
        let pose = Pose::of(body);
        let team = body.team;
        let ship = body.as_ship_mut()?;

        if let Some(cmd) = self.commands.front_mut() {
            cmd.execute(&pose, ship);
            if cmd.is_done() {
                if let Some(mut cmd) = self.commands.pop_front() {
                    log::debug!("AI {:?} finished {:?}", self.id, cmd);
                    cmd.release(markers);
                }
            }
            return None;
        }

        // un-target dead ships
        if let Some(target) = self.target {
            if !roster.iter().any(|e| e.ai == target && e.alive) {
                self.target = None;
            }
        }

        let mut acquired = None;
        if self.target.is_none() {
            self.target = choose_target(self.id, team, pose.pos, roster);
            acquired = self
                .target
                .and_then(|t| roster.iter().find(|e| e.ai == t))
                .map(|e| e.ship);
            if let Some(ship_id) = acquired {
                log::debug!("AI {:?} targeting ship {:?}", self.id, ship_id);
            }
        }

        let Some(target) = self.target.and_then(|t| roster.iter().find(|e| e.ai == t)) else {
            ship.shoot_input = 0.0;
            ship.set_rotate_input(0.0);
            return None;
        };

        let delta = angle_subtract(vector_angle(target.pos - pose.pos), pose.rotation);
        ship.shoot_input = if delta.abs() < SHOT_TOLERANCE { 1.0 } else { 0.0 };
        ship.set_rotate_input(delta / ship.rotation_speed);
        acquired
    }

    pub fn command_to_point(&mut self, ship: &mut Ship, dir: DVec2, queue: bool, markers: &mut Markers) {
        ship.clear_input();
        if !queue {
            self.cancel_where(markers, |cmd| matches!(cmd, Command::Point(_)));
        }
        self.commands.push_back(Command::Point(PointCommand::new(dir)));
    }

    pub fn command_to_move(&mut self, ship: &mut Ship, dest: DVec2, queue: bool, markers: &mut Markers) {
        ship.clear_input();
        if !queue {
            self.cancel_where(markers, |cmd| matches!(cmd, Command::Move(_)));
        }
        let marker = markers.place(self.id, dest);
        self.commands.push_back(Command::Move(MoveCommand::new(dest, Some(marker))));
    }

    fn cancel_where(&mut self, markers: &mut Markers, pred: impl Fn(&Command) -> bool) {
        let mut kept = VecDeque::with_capacity(self.commands.len());
        for mut cmd in self.commands.drain(..) {
            if pred(&cmd) {
                cmd.release(markers);
            } else {
                kept.push_back(cmd);
            }
        }
        self.commands = kept;
    }

    /// Drop every command and stop for good. Safe to call twice.
    pub fn terminate(&mut self, markers: &mut Markers) {
        while let Some(mut cmd) = self.commands.pop_front() {
            cmd.release(markers);
        }
        self.target = None;
        self.alive = false;
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }
}

/// Nearest live enemy by squared distance; first seen wins ties
pub fn choose_target(me: AiId, team: Option<TeamId>, pos: DVec2, roster: &[RosterEntry]) -> Option<AiId> {
    let mut best: Option<(AiId, f64)> = None;
    for entry in roster {
        if entry.ai == me || !entry.alive || entry.team == team {
            continue;
        }
        let dist = entry.pos.distance_squared(pos);
        if best.is_none_or(|(_, closest)| dist < closest) {
            best = Some((entry.ai, dist));
        }
    }
    best.map(|(ai, _)| ai)
}

/// Time spent turning around before braking can start
fn time_to_180(ship: &Ship) -> f64 {
    if ship.has_backward_thrusters {
        0.0
    } else {
        PI / ship.rotation_speed
    }
}

/// Time to come to rest if braking began now
pub fn calc_time_to_stop(vel: DVec2, ship: &Ship) -> f64 {
    time_to_180(ship) + vel.length() / ship.thrust_amt
}

/// Distance travelled before coming to rest if braking began now
pub fn calc_stop_distance(vel: DVec2, ship: &Ship) -> f64 {
    let speed_sqrd = vel.length_squared();
    if speed_sqrd == 0.0 {
        return 0.0;
    }
    time_to_180(ship) * speed_sqrd.sqrt() + speed_sqrd / (2.0 * ship.thrust_amt)
}

/// Stop distance the move controller steers by. Braking always turns the
/// nose against the velocity first, so the turn is counted even for ships
/// that carry backward thrusters.
fn braking_distance(vel: DVec2, ship: &Ship) -> f64 {
    let stop_distance = calc_stop_distance(vel, ship);
    if ship.has_backward_thrusters {
        stop_distance + PI / ship.rotation_speed * vel.length()
    } else {
        stop_distance
    }
}

pub fn point_toward_direction(rotation: f64, ship: &mut Ship, dir: DVec2) {
    let delta = angle_subtract(vector_angle(dir), rotation);
    ship.set_rotate_input(delta / ship.rotation_speed);
}

/// Brake: line up against the velocity, then thrust just enough to cancel it
pub fn decelerate(pose: &Pose, ship: &mut Ship) {
    ship.set_thrust_input(0.0, true);
    let speed = pose.vel.length();
    if speed == 0.0 {
        return;
    }

    let delta = angle_subtract(vector_angle(-pose.vel), pose.rotation);
    ship.set_rotate_input(delta / ship.rotation_speed);
    if delta.abs() > DECEL_ALIGN_TOLERANCE {
        return;
    }

    ship.set_thrust_input((speed / ship.thrust_amt).min(1.0), true);
}
