//! Fixed-order frame driver
//!
//! One call to `tick` runs a whole frame: orders, bodies, shield anchors,
//! AIs, collisions and combat, then lifecycle cleanup. AIs read positions
//! after integration and before collisions, so impulses resolved this frame
//! take effect in the next frame's integration.

use glam::DVec2;

use super::body::{Body, BodyId, BodyKind, EnterTarget, FrameContext, UpdateOutcome};
use super::bullet::Bullet;
use super::world::World;

/// Player or host order applied at the start of a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Move { ship: BodyId, dest: DVec2, queue: bool },
    Point { ship: BodyId, dir: DVec2, queue: bool },
    Select(BodyId),
    Deselect(BodyId),
    /// Fly to `target` and go inside it
    Enter { ship: BodyId, target: BodyId },
    ActivatePortal(BodyId),
    SendShipsOut(BodyId),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub orders: Vec<Order>,
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, dt: f64, dx: f64) {
    for order in &input.orders {
        apply_order(world, order);
    }

    let ctx = FrameContext {
        dt,
        dx,
        map_size: world.map_size,
    };
    update_bodies(world, &ctx);
    world.sync_shield_anchors();
    world.update_ais();

    world.bodies.sweep_collisions();
    world.bodies.sweep_shields();
    world.resolve_bullet_hits();

    world.process_lifecycle();
    world.frame += 1;
}

fn apply_order(world: &mut World, order: &Order) {
    let applied = match *order {
        Order::Move { ship, dest, queue } => world.command_to_move(ship, dest, queue),
        Order::Point { ship, dir, queue } => world.command_to_point(ship, dir, queue),
        Order::Select(id) => {
            world.set_selected(id, true);
            true
        }
        Order::Deselect(id) => {
            world.set_selected(id, false);
            true
        }
        Order::Enter { ship, target } => world.command_to_enter(ship, target),
        Order::ActivatePortal(portal) => world.activate_portal(portal),
        Order::SendShipsOut(portal) => {
            world.send_ships_out(portal);
            true
        }
    };
    if !applied {
        log::debug!("Order {:?} had no effect", order);
    }
}

fn update_bodies(world: &mut World, ctx: &FrameContext) {
    for id in world.bodies.ids() {
        let Some(body) = world.bodies.live(id) else {
            continue;
        };
        let entry = body
            .as_ship()
            .and_then(|s| s.enter_input)
            .and_then(|target| {
                let t = world.bodies.live(target).filter(|t| t.can_be_entered())?;
                Some(EnterTarget {
                    target,
                    pos: t.pos,
                    radius: t.radius(),
                })
            });

        let Some(body) = world.bodies.get_mut(id) else {
            continue;
        };
        let team = body.team;
        match body.update(ctx, entry) {
            UpdateOutcome::Moved => {}
            UpdateOutcome::Entered(target) => world.enter_portal(id, target),
            UpdateOutcome::Fired(shot) => {
                let bullet_id = world.next_body_id();
                let mut bullet = Body::new(
                    bullet_id,
                    BodyKind::Bullet(Bullet::new(shot.damage, shot.ttl, &shot.explosion)),
                )
                .with_pos(shot.pos)
                .with_vel(shot.vel)
                .with_rotation(crate::vector_angle(shot.vel));
                bullet.team = team;
                world.spawn_deferred(bullet);
            }
            UpdateOutcome::Expired => {
                world.delete_physics_object(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::body::BodyTag;
    use crate::sim::events::WorldEvent;
    use crate::sim::team::TeamId;

    fn quiet_world() -> World {
        let mut world = World::new(DVec2::new(1000.0, 800.0), 42);
        world.shield_tuning.enabled = false;
        world.ship_tuning.armed = false;
        world
    }

    fn step(world: &mut World, input: &TickInput) {
        tick(world, input, FRAME_DT, 1.0);
    }

    fn two_teams(world: &mut World) -> (TeamId, TeamId) {
        (
            world.add_team("Red", [1.0, 0.0, 0.0, 1.0]),
            world.add_team("Blue", [0.0, 0.0, 1.0, 1.0]),
        )
    }

    #[test]
    fn test_move_command_converges_to_full_stop() {
        let mut world = quiet_world();
        let (red, _) = two_teams(&mut world);
        let ship = world.spawn_ship(red, DVec2::ZERO, std::f64::consts::FRAC_PI_2);
        world.body_mut(ship).unwrap().caps.can_go_offscreen = true;

        let dest = DVec2::new(100.0, 0.0);
        let orders = TickInput {
            orders: vec![Order::Move {
                ship,
                dest,
                queue: false,
            }],
        };
        step(&mut world, &orders);

        let mut prev = f64::INFINITY;
        let mut frames = 1;
        while !world.ai_for_ship(ship).unwrap().commands.is_empty() {
            let dist_sqrd = world.body(ship).unwrap().pos.distance_squared(dest);
            if dist_sqrd >= MOVE_ARRIVAL_DIST_SQRD {
                assert!(dist_sqrd <= prev + 1e-9, "distance grew at frame {frames}");
            }
            prev = dist_sqrd;
            step(&mut world, &TickInput::default());
            frames += 1;
            assert!(frames < 600, "move command never finished");
        }

        let body = world.body(ship).unwrap();
        assert_eq!(body.vel, DVec2::ZERO);
        assert!(body.pos.distance_squared(dest) < MOVE_ARRIVAL_DIST_SQRD);
        assert!(world.markers.is_empty());
    }

    #[test]
    fn test_forward_only_ship_also_arrives() {
        let mut world = quiet_world();
        world.ship_tuning.has_backward_thrusters = false;
        let (red, _) = two_teams(&mut world);
        let ship = world.spawn_ship(red, DVec2::new(200.0, 200.0), 0.0);
        let dest = DVec2::new(450.0, 320.0);
        world.command_to_move(ship, dest, false);

        for _ in 0..2000 {
            if world.ai_for_ship(ship).unwrap().commands.is_empty() {
                break;
            }
            step(&mut world, &TickInput::default());
        }
        let body = world.body(ship).unwrap();
        assert!(world.ai_for_ship(ship).unwrap().commands.is_empty());
        assert_eq!(body.vel, DVec2::ZERO);
        assert!(body.pos.distance_squared(dest) < MOVE_ARRIVAL_DIST_SQRD);
    }

    #[test]
    fn test_ship_facing_away_turns_before_flying() {
        let mut world = quiet_world();
        let (red, _) = two_teams(&mut world);
        let ship = world.spawn_ship(red, DVec2::new(300.0, 300.0), std::f64::consts::PI);
        assert!(world.body(ship).unwrap().as_ship().unwrap().has_backward_thrusters);
        let dest = DVec2::new(400.0, 300.0);
        world.command_to_move(ship, dest, false);

        for _ in 0..600 {
            if world.ai_for_ship(ship).unwrap().commands.is_empty() {
                break;
            }
            step(&mut world, &TickInput::default());
            let body = world.body(ship).unwrap();
            assert!(body.as_ship().unwrap().thrust_input() >= 0.0);
            assert!(body.pos.x >= 300.0 - 1e-9, "flew away from the destination");
        }
        let body = world.body(ship).unwrap();
        assert!(world.ai_for_ship(ship).unwrap().commands.is_empty());
        assert_eq!(body.vel, DVec2::ZERO);
        assert!(body.pos.distance_squared(dest) < MOVE_ARRIVAL_DIST_SQRD);
    }

    #[test]
    fn test_target_reacquired_after_destruction() {
        let mut world = quiet_world();
        let (red, blue) = two_teams(&mut world);
        let hunter = world.spawn_ship(red, DVec2::new(100.0, 100.0), 0.0);
        let near = world.spawn_ship(blue, DVec2::new(200.0, 100.0), 0.0);
        let far = world.spawn_ship(blue, DVec2::new(600.0, 100.0), 0.0);
        let near_ai = world.ai_for_ship(near).unwrap().id;
        let far_ai = world.ai_for_ship(far).unwrap().id;

        step(&mut world, &TickInput::default());
        assert_eq!(world.ai_for_ship(hunter).unwrap().target, Some(near_ai));

        world.damage(near, 5.0, "boom");
        step(&mut world, &TickInput::default());
        assert_eq!(world.ai_for_ship(hunter).unwrap().target, Some(far_ai));
        assert!(world.ai_for_ship(near).is_none());

        world.damage(far, 5.0, "boom");
        step(&mut world, &TickInput::default());
        let hunter_ai = world.ai_for_ship(hunter).unwrap();
        assert_eq!(hunter_ai.target, None);
        assert_eq!(world.body(hunter).unwrap().as_ship().unwrap().shoot_input, 0.0);
    }

    #[test]
    fn test_head_on_collision_then_separating() {
        let mut world = quiet_world();
        let (red, blue) = two_teams(&mut world);
        let a = world.spawn_ship(red, DVec2::new(100.0, 100.0), 0.0);
        let b = world.spawn_ship(blue, DVec2::new(131.0, 100.0), 0.0);
        world.body_mut(a).unwrap().vel = DVec2::new(2.0, 0.0);
        world.body_mut(b).unwrap().vel = DVec2::new(-2.0, 0.0);

        step(&mut world, &TickInput::default());
        let (va, vb) = (world.body(a).unwrap().vel, world.body(b).unwrap().vel);
        assert!((va.x + 2.0 * DEFAULT_COLLISION_DAMPING).abs() < 1e-9);
        assert!((vb.x - 2.0 * DEFAULT_COLLISION_DAMPING).abs() < 1e-9);

        // still overlapping but separating: no second impulse
        step(&mut world, &TickInput::default());
        assert_eq!(world.body(a).unwrap().vel, va);
        assert_eq!(world.body(b).unwrap().vel, vb);
    }

    fn shielded_pair(same_team: bool) -> (World, BodyId, BodyId) {
        let mut world = World::new(DVec2::new(1000.0, 800.0), 11);
        world.ship_tuning.armed = false;
        let (red, blue) = two_teams(&mut world);
        let a = world.spawn_ship(red, DVec2::new(300.0, 300.0), 0.0);
        let b = world.spawn_ship(if same_team { red } else { blue }, DVec2::new(500.0, 300.0), 0.0);
        world.body_mut(a).unwrap().vel = DVec2::new(1.0, 0.0);
        world.body_mut(b).unwrap().vel = DVec2::new(-1.0, 0.0);
        (world, a, b)
    }

    #[test]
    fn test_enemy_shields_bounce_their_ships() {
        let (mut world, a, b) = shielded_pair(false);
        let reach = 2.0 * world.shield_tuning.radius;
        step(&mut world, &TickInput::default());

        let (ship_a, ship_b) = (world.body(a).unwrap(), world.body(b).unwrap());
        // bubbles overlap, hulls are far apart
        let gap = ship_a.pos.distance(ship_b.pos);
        assert!(gap < reach);
        assert!(gap > 2.0 * SHIP_RADIUS);
        assert!((ship_a.vel.x + DEFAULT_COLLISION_DAMPING).abs() < 1e-9);
        assert!((ship_b.vel.x - DEFAULT_COLLISION_DAMPING).abs() < 1e-9);
        assert_eq!(ship_a.vel.y, 0.0);

        // the shields only follow their ships, the impulse is not kept on them
        let shield_a = ship_a.as_ship().and_then(|s| s.shield).unwrap();
        assert_eq!(world.body(shield_a).unwrap().vel, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_friendly_shields_pass_through() {
        let (mut world, a, b) = shielded_pair(true);
        step(&mut world, &TickInput::default());
        assert_eq!(world.body(a).unwrap().vel, DVec2::new(1.0, 0.0));
        assert_eq!(world.body(b).unwrap().vel, DVec2::new(-1.0, 0.0));
        assert_eq!(world.bodies.sweep_shields(), 0);
    }

    #[test]
    fn test_enemy_shield_absorbs_gunfire() {
        let mut world = World::new(DVec2::new(1000.0, 800.0), 7);
        let (red, blue) = two_teams(&mut world);
        let shooter = world.spawn_ship(red, DVec2::new(100.0, 300.0), 0.0);
        let victim = world.spawn_ship(blue, DVec2::new(500.0, 300.0), 0.0);
        world.body_mut(victim).unwrap().as_ship_mut().unwrap().gun = None;
        let shield = world.body(victim).and_then(|b| b.as_ship()?.shield).unwrap();

        let mut min_shield = 1.0f64;
        for _ in 0..90 {
            step(&mut world, &TickInput::default());
            min_shield = min_shield.min(world.body(shield).unwrap().health);
            assert_eq!(world.body(victim).unwrap().health, 1.0);
        }
        assert!(min_shield < 1.0);
        assert!(world.body(shooter).is_some());
        assert!(!world
            .drain_events()
            .iter()
            .any(|e| matches!(e, WorldEvent::ShipDestroyed { .. })));
    }

    #[test]
    fn test_enter_portal_and_send_out() {
        let mut world = quiet_world();
        let (red, _) = two_teams(&mut world);
        let ship = world.spawn_ship(red, DVec2::new(400.0, 300.0), 0.0);
        let portal = world.spawn_portal(DVec2::new(500.0, 300.0), false, false);

        step(
            &mut world,
            &TickInput {
                orders: vec![Order::Enter { ship, target: portal }],
            },
        );
        for _ in 0..300 {
            if world.body(ship).is_none() {
                break;
            }
            step(&mut world, &TickInput::default());
        }
        assert!(world.body(ship).is_none());
        assert!(world.ai_for_ship(ship).is_none());
        assert_eq!(world.count_tag(BodyTag::Ship), 0);

        step(
            &mut world,
            &TickInput {
                orders: vec![Order::SendShipsOut(portal)],
            },
        );
        assert!(world.body(ship).is_some());
        assert!(world.ai_for_ship(ship).is_some());
    }

    #[test]
    fn test_determinism() {
        fn run() -> Vec<(BodyId, DVec2, DVec2)> {
            let mut world = World::new(DVec2::new(1000.0, 800.0), 99);
            let (red, blue) = two_teams(&mut world);
            for i in 0..3 {
                world.spawn_ship(red, DVec2::new(100.0, 100.0 + 150.0 * i as f64), 0.0);
                world.spawn_ship(blue, DVec2::new(800.0, 120.0 + 150.0 * i as f64), std::f64::consts::PI);
            }
            for _ in 0..240 {
                step(&mut world, &TickInput::default());
            }
            world.bodies.iter().map(|b| (b.id, b.pos, b.vel)).collect()
        }
        assert_eq!(run(), run());
    }
}
