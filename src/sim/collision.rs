//! Collision detection and response for circular bodies
//!
//! Resolution is an elastic impulse along the contact normal. The math is a
//! pure function of the two bodies; the caller applies the resulting velocity
//! deltas to each body's collision target.

use glam::DVec2;

use super::body::Body;

/// Velocity changes produced by one resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    /// Unit normal from A toward B
    pub normal: DVec2,
    /// Impulse magnitude
    pub j: f64,
    /// Added to A's collision target velocity
    pub delta_a: DVec2,
    /// Added to B's collision target velocity
    pub delta_b: DVec2,
}

/// Elastic impulse between two touching bodies
///
/// Returns `None` when the centres coincide (no usable normal) or when the
/// bodies are already separating.
pub fn resolve_collision(a: &Body, b: &Body) -> Option<Impulse> {
    let normal = (b.pos - a.pos).try_normalize()?;
    let relative_vel = b.vel - a.vel;
    let vel_along_normal = relative_vel.dot(normal);

    // do not resolve if velocities are separating
    if vel_along_normal > 0.0 {
        return None;
    }

    let e = a.collision_damping.min(b.collision_damping);
    let inv_mass_a = 1.0 / a.mass();
    let inv_mass_b = 1.0 / b.mass();
    let j = -(1.0 + e) * vel_along_normal / (inv_mass_a + inv_mass_b);
    let impulse = normal * j;

    Some(Impulse {
        normal,
        j,
        delta_a: -impulse * inv_mass_a,
        delta_b: impulse * inv_mass_b,
    })
}

/// Capability pairing for the general sweep: one side causes, the other is struck
pub fn can_collide(a: &Body, b: &Body) -> bool {
    (a.caps.can_cause_collision && b.caps.can_be_struck)
        || (b.caps.can_cause_collision && a.caps.can_be_struck)
}

/// Two bullet-reflecting bodies of different teams bounce off each other
pub fn shields_interact(a: &Body, b: &Body) -> bool {
    a.caps.reflect_bullets && b.caps.reflect_bullets && a.team != b.team
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_COLLISION_DAMPING;
    use crate::sim::body::{BodyId, BodyKind};
    use crate::sim::shield::Shield;
    use crate::sim::ship::Ship;
    use crate::sim::team::TeamId;
    use proptest::prelude::*;

    fn ship(id: u32, pos: DVec2, vel: DVec2) -> Body {
        Body::new(BodyId(id), BodyKind::Ship(Ship::default()))
            .with_pos(pos)
            .with_vel(vel)
    }

    #[test]
    fn test_head_on_elastic_swaps_velocities() {
        let mut a = ship(1, DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0));
        let mut b = ship(2, DVec2::new(30.0, 0.0), DVec2::new(-1.0, 0.0));
        a.collision_damping = 1.0;
        b.collision_damping = 1.0;

        let impulse = resolve_collision(&a, &b).expect("approaching bodies resolve");
        a.vel += impulse.delta_a;
        b.vel += impulse.delta_b;
        assert!((a.vel.x + 1.0).abs() < 1e-9);
        assert!((b.vel.x - 1.0).abs() < 1e-9);

        // now separating: a second pass is a no-op
        assert!(resolve_collision(&a, &b).is_none());
    }

    #[test]
    fn test_restitution_uses_lower_damping() {
        let mut a = ship(1, DVec2::ZERO, DVec2::new(1.0, 0.0));
        let b = ship(2, DVec2::new(30.0, 0.0), DVec2::new(-1.0, 0.0));
        a.collision_damping = 1.0;
        let impulse = resolve_collision(&a, &b).expect("resolves");
        let rel_before = (b.vel - a.vel).dot(impulse.normal);
        let rel_after = (b.vel + impulse.delta_b - a.vel - impulse.delta_a).dot(impulse.normal);
        assert!((rel_after + DEFAULT_COLLISION_DAMPING * rel_before).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_centres_skip() {
        let a = ship(1, DVec2::new(5.0, 5.0), DVec2::new(1.0, 0.0));
        let b = ship(2, DVec2::new(5.0, 5.0), DVec2::new(-1.0, 0.0));
        assert!(resolve_collision(&a, &b).is_none());
    }

    #[test]
    fn test_pairing_rules() {
        let a = ship(1, DVec2::ZERO, DVec2::ZERO);
        let b = ship(2, DVec2::ZERO, DVec2::ZERO);
        // ships both cause and take collisions, so two of them bump directly
        assert!(a.caps.can_cause_collision && a.caps.can_be_struck);
        assert!(can_collide(&a, &b));

        let s1 = Body::new(BodyId(3), BodyKind::Shield(Shield::default())).with_team(TeamId(0));
        let s2 = Body::new(BodyId(4), BodyKind::Shield(Shield::default())).with_team(TeamId(1));
        let s3 = Body::new(BodyId(5), BodyKind::Shield(Shield::default())).with_team(TeamId(0));
        assert!(!can_collide(&a, &s1));
        assert!(shields_interact(&s1, &s2));
        assert!(!shields_interact(&s1, &s3));
    }

    proptest! {
        #[test]
        fn prop_momentum_conserved(
            ax in -50.0f64..50.0, ay in -50.0f64..50.0,
            bx in -50.0f64..50.0, by in -50.0f64..50.0,
            avx in -5.0f64..5.0, avy in -5.0f64..5.0,
            bvx in -5.0f64..5.0, bvy in -5.0f64..5.0,
        ) {
            let a = ship(1, DVec2::new(ax, ay), DVec2::new(avx, avy));
            let b = ship(2, DVec2::new(bx, by), DVec2::new(bvx, bvy));
            if let Some(impulse) = resolve_collision(&a, &b) {
                let before = a.vel * a.mass() + b.vel * b.mass();
                let after = (a.vel + impulse.delta_a) * a.mass() + (b.vel + impulse.delta_b) * b.mass();
                prop_assert!((before - after).length() < 1e-6);
                // never leaves them approaching
                let rel_after = (b.vel + impulse.delta_b - a.vel - impulse.delta_a).dot(impulse.normal);
                prop_assert!(rel_after >= -1e-9);
            }
        }
    }
}
