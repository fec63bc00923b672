//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod body;
pub mod bullet;
pub mod collision;
pub mod events;
pub mod markers;
pub mod portal;
pub mod shield;
pub mod ship;
pub mod snapshot;
pub mod team;
pub mod tick;
pub mod world;

pub use ai::{AiId, Command, MoveCommand, PointCommand, ShipAi};
pub use body::{Body, BodyId, BodyKind, BodyTag, Capabilities, DamageOutcome};
pub use bullet::Bullet;
pub use collision::{Impulse, resolve_collision};
pub use events::{Notification, ShipEvent, ShipEventKind, WorldEvent};
pub use markers::{Marker, MarkerId, Markers};
pub use portal::Portal;
pub use shield::Shield;
pub use ship::{Gun, Ship, ThrustAnimation};
pub use snapshot::ShipSnapshot;
pub use team::{Team, TeamId, Teams};
pub use tick::{Order, TickInput, tick};
pub use world::{Bodies, World};
