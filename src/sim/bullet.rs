//! Projectiles fired by ship guns

use super::body::{Body, BodyId, BodyTag, FrameContext, UpdateOutcome};
use super::shield;
use super::world::World;

#[derive(Debug, Clone)]
pub struct Bullet {
    pub damage_amount: f64,
    /// Shields may reflect it
    pub can_hit_shield: bool,
    /// Explosion animation the victim plays if this kills it
    pub explosion: String,
    /// Remaining lifetime in dx units
    pub ttl: f64,
    /// Shields that already bounced this bullet
    pub deflected_by: Vec<BodyId>,
}

impl Bullet {
    pub fn new(damage_amount: f64, ttl: f64, explosion: &str) -> Self {
        Self {
            damage_amount,
            can_hit_shield: true,
            explosion: explosion.to_string(),
            ttl,
            deflected_by: Vec::new(),
        }
    }
}

impl Body {
    pub(super) fn age_bullet(&mut self, ctx: &FrameContext) -> UpdateOutcome {
        let pos = self.pos;
        let outside = pos.x < 0.0 || pos.y < 0.0 || pos.x > ctx.map_size.x || pos.y > ctx.map_size.y;
        let Some(bullet) = self.as_bullet_mut() else {
            return UpdateOutcome::Moved;
        };
        bullet.ttl -= ctx.dx;
        if bullet.ttl <= 0.0 || outside {
            UpdateOutcome::Expired
        } else {
            UpdateOutcome::Moved
        }
    }
}

impl World {
    /// Bullet combat: enemy shields get first chance to reflect, then the
    /// first overlapping enemy that can be shot takes the damage.
    pub(super) fn resolve_bullet_hits(&mut self) {
        let bullets: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|b| !b.is_deleted() && b.tag() == BodyTag::Bullet)
            .map(|b| b.id)
            .collect();

        for bullet_id in bullets {
            let Some(bullet) = self.bodies.live(bullet_id) else {
                continue;
            };
            let team = bullet.team;
            let Some(payload) = bullet.as_bullet() else {
                continue;
            };
            let shields: Vec<BodyId> = self
                .bodies
                .iter()
                .filter(|b| {
                    !b.is_deleted()
                        && b.caps.reflect_bullets
                        && b.team != team
                        && !payload.deflected_by.contains(&b.id)
                })
                .map(|b| b.id)
                .collect();

            if shields
                .into_iter()
                .any(|s| shield::reflect(&mut self.bodies, s, bullet_id))
            {
                continue;
            }

            let Some(bullet) = self.bodies.live(bullet_id) else {
                continue;
            };
            let victim = self
                .bodies
                .iter()
                .find(|b| !b.is_deleted() && b.caps.can_be_shot && b.team != team && b.overlaps(bullet))
                .map(|b| b.id);
            let Some(victim) = victim else {
                continue;
            };
            let Some((damage, explosion)) = bullet
                .as_bullet()
                .map(|p| (p.damage_amount, p.explosion.clone()))
            else {
                continue;
            };
            self.damage(victim, damage, &explosion);
            self.delete_physics_object(bullet_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyKind;
    use crate::sim::shield::Shield;
    use crate::sim::ship::Ship;
    use glam::DVec2;

    fn ctx() -> FrameContext {
        FrameContext {
            dt: crate::consts::FRAME_DT,
            dx: 1.0,
            map_size: DVec2::new(200.0, 200.0),
        }
    }

    #[test]
    fn test_bullet_expires_after_ttl() {
        let mut body = Body::new(BodyId(1), BodyKind::Bullet(Bullet::new(1.0, 2.0, "boom")))
            .with_pos(DVec2::new(50.0, 50.0));
        assert!(matches!(body.update(&ctx(), None), UpdateOutcome::Moved));
        assert!(matches!(body.update(&ctx(), None), UpdateOutcome::Expired));
    }

    #[test]
    fn test_bullet_expires_off_map() {
        let mut body = Body::new(BodyId(1), BodyKind::Bullet(Bullet::new(1.0, 50.0, "boom")))
            .with_pos(DVec2::new(198.0, 50.0))
            .with_vel(DVec2::new(5.0, 0.0));
        assert!(matches!(body.update(&ctx(), None), UpdateOutcome::Expired));
    }

    #[test]
    fn test_hull_hit_damages_and_consumes_bullet() {
        let mut world = World::new(DVec2::new(500.0, 500.0), 1);
        let red = world.add_team("Red", [1.0, 0.0, 0.0, 1.0]);
        let blue = world.add_team("Blue", [0.0, 0.0, 1.0, 1.0]);
        let target_id = world.next_body_id();
        world.add_body(
            Body::new(target_id, BodyKind::Ship(Ship::default()))
                .with_pos(DVec2::new(100.0, 100.0))
                .with_team(blue),
        );
        let bullet_id = world.next_body_id();
        world.add_body(
            Body::new(bullet_id, BodyKind::Bullet(Bullet::new(0.25, 60.0, "boom")))
                .with_pos(DVec2::new(110.0, 100.0))
                .with_team(red),
        );

        world.resolve_bullet_hits();
        assert!((world.body(target_id).unwrap().health - 0.75).abs() < 1e-12);
        assert!(world.body(bullet_id).unwrap().is_deleted());
    }

    #[test]
    fn test_friendly_bullet_passes_through() {
        let mut world = World::new(DVec2::new(500.0, 500.0), 1);
        let red = world.add_team("Red", [1.0, 0.0, 0.0, 1.0]);
        let ship_id = world.next_body_id();
        world.add_body(
            Body::new(ship_id, BodyKind::Ship(Ship::default()))
                .with_pos(DVec2::new(100.0, 100.0))
                .with_team(red),
        );
        let bullet_id = world.next_body_id();
        world.add_body(
            Body::new(bullet_id, BodyKind::Bullet(Bullet::new(0.25, 60.0, "boom")))
                .with_pos(DVec2::new(105.0, 100.0))
                .with_team(red),
        );
        world.resolve_bullet_hits();
        assert_eq!(world.body(ship_id).unwrap().health, 1.0);
        assert!(!world.body(bullet_id).unwrap().is_deleted());
    }

    #[test]
    fn test_enemy_shield_blocks_hull_hit() {
        let mut world = World::new(DVec2::new(500.0, 500.0), 1);
        let red = world.add_team("Red", [1.0, 0.0, 0.0, 1.0]);
        let blue = world.add_team("Blue", [0.0, 0.0, 1.0, 1.0]);
        let ship_id = world.next_body_id();
        world.add_body(
            Body::new(ship_id, BodyKind::Ship(Ship::default()))
                .with_pos(DVec2::new(100.0, 100.0))
                .with_team(blue),
        );
        let shield_id = world.next_body_id();
        world.add_body(
            Body::new(shield_id, BodyKind::Shield(Shield::default()))
                .with_pos(DVec2::new(100.0, 100.0))
                .with_radius(20.0)
                .with_team(blue)
                .with_collision_target(ship_id),
        );
        let bullet_id = world.next_body_id();
        world.add_body(
            Body::new(bullet_id, BodyKind::Bullet(Bullet::new(2.0, 60.0, "boom")))
                .with_pos(DVec2::new(118.0, 100.0))
                .with_vel(DVec2::new(-4.0, 0.0))
                .with_team(red),
        );

        world.resolve_bullet_hits();
        assert_eq!(world.body(ship_id).unwrap().health, 1.0);
        assert!((world.body(shield_id).unwrap().health - 0.9).abs() < 1e-12);
        let bullet = world.body(bullet_id).unwrap();
        assert!(!bullet.is_deleted());
        assert!(bullet.vel.x > 0.0);
    }
}
