//! Read-only draw interface
//!
//! `draw_world` walks the world in body-id order and emits primitives for a
//! host to rasterize. Nothing here mutates simulation state.

pub mod shapes;

use crate::sim::{AiId, Body, BodyKind, World};
pub use shapes::{Bar, Primitive};

/// Primitives for one frame, in paint order
#[derive(Debug, Default)]
pub struct DrawList {
    pub primitives: Vec<Primitive>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }
}

/// Append the primitives for every live body and visible waypoint
pub fn draw_world(world: &World, list: &mut DrawList) {
    for body in world.bodies.iter().filter(|b| !b.is_deleted()) {
        match &body.kind {
            BodyKind::Ship(ship) => {
                let selected = world
                    .ai_for_ship(body.id)
                    .map_or(body.selected, |ai| ai.selected);
                draw_status(body, selected, list);

                let (pos, rotation) = body.sprite_transform();
                list.push(Primitive::ShipSprite {
                    ship_type: ship.ship_type.clone(),
                    pos: pos.as_vec2(),
                    rotation: rotation as f32,
                    animation: ship.animation,
                });
                list.push(Primitive::TeamDot {
                    center: pos.as_vec2(),
                    color: world.teams.color(body.team),
                });
            }
            BodyKind::Shield(_) => {
                let color = world.teams.color(body.team);
                list.push(shapes::shield_ring(body.pos, body.radius(), body.health, color));
                list.push(shapes::shield_bar(body.pos, body.radius(), body.health, color));
            }
            BodyKind::Portal(_) | BodyKind::Bullet(_) => draw_status(body, body.selected, list),
        }
    }

    for marker in world.markers.iter() {
        if owner_selected(world, marker.owner) {
            list.push(Primitive::Waypoint {
                pos: marker.pos.as_vec2(),
                owner: marker.owner,
            });
        }
    }
}

fn draw_status(body: &Body, selected: bool, list: &mut DrawList) {
    if body.health < 1.0 || selected {
        list.push(shapes::health_bar(body.pos, body.radius(), body.health));
    }
    if selected {
        list.push(Primitive::SelectionRing {
            center: body.pos.as_vec2(),
            radius: body.radius() as f32,
        });
    }
}

fn owner_selected(world: &World, owner: AiId) -> bool {
    world.ais.iter().any(|ai| ai.id == owner && ai.alive && ai.selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec2, Vec2};

    fn world() -> World {
        let mut world = World::new(DVec2::new(800.0, 600.0), 1);
        world.add_team("Red", [1.0, 0.0, 0.0, 1.0]);
        world
    }

    fn count(list: &DrawList, pred: impl Fn(&Primitive) -> bool) -> usize {
        list.iter().filter(|p| pred(p)).count()
    }

    #[test]
    fn test_healthy_unselected_ship_has_no_bar() {
        let mut world = world();
        world.shield_tuning.enabled = false;
        let team = world.teams.iter().next().map(|t| t.id).unwrap();
        world.spawn_ship(team, DVec2::new(100.0, 100.0), 0.0);

        let mut list = DrawList::new();
        draw_world(&world, &mut list);
        assert_eq!(count(&list, |p| matches!(p, Primitive::HealthBar(_))), 0);
        assert_eq!(count(&list, |p| matches!(p, Primitive::ShipSprite { .. })), 1);
        assert_eq!(count(&list, |p| matches!(p, Primitive::TeamDot { color, .. } if color[0] == 1.0)), 1);
    }

    #[test]
    fn test_selection_shows_bar_ring_and_waypoint() {
        let mut world = world();
        world.shield_tuning.enabled = false;
        let team = world.teams.iter().next().map(|t| t.id).unwrap();
        let ship = world.spawn_ship(team, DVec2::new(100.0, 100.0), 0.0);
        world.command_to_move(ship, DVec2::new(400.0, 300.0), false);

        let mut list = DrawList::new();
        draw_world(&world, &mut list);
        assert_eq!(count(&list, |p| matches!(p, Primitive::Waypoint { .. })), 0);

        world.set_selected(ship, true);
        list.clear();
        draw_world(&world, &mut list);
        assert_eq!(count(&list, |p| matches!(p, Primitive::HealthBar(_))), 1);
        assert_eq!(count(&list, |p| matches!(p, Primitive::SelectionRing { .. })), 1);
        assert_eq!(
            count(&list, |p| matches!(p, Primitive::Waypoint { pos, .. } if *pos == Vec2::new(400.0, 300.0))),
            1
        );
    }

    #[test]
    fn test_damaged_shield_ring_fades() {
        let mut world = world();
        let team = world.teams.iter().next().map(|t| t.id).unwrap();
        let ship = world.spawn_ship(team, DVec2::new(100.0, 100.0), 0.0);
        let shield = world.body(ship).and_then(|b| b.as_ship()?.shield).unwrap();
        world.body_mut(shield).unwrap().health = 0.15;

        let mut list = DrawList::new();
        draw_world(&world, &mut list);
        let alpha = list.iter().find_map(|p| match p {
            Primitive::ShieldRing { color, .. } => Some(color[3]),
            _ => None,
        });
        assert!((alpha.unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(count(&list, |p| matches!(p, Primitive::ShieldBar(_))), 1);
    }
}
