use glam::DVec2;

use crate::body::{Body, Motion, StepContext};
use crate::ecs::components::Trail;
use crate::geometry::Field;

/// Current position of a body, if the entity has one.
pub fn position_of(world: &hecs::World, entity: hecs::Entity) -> Option<DVec2> {
    world.get::<&Motion>(entity).ok().map(|m| m.position())
}

/// Advance one body by one tick. Returns its new position.
///
/// The partner's position is read before the body is borrowed mutably, so a
/// body may follow anything, itself included.
pub fn step_body(
    world: &mut hecs::World,
    entity: hecs::Entity,
    field: Field,
    rng: &mut fastrand::Rng,
) -> Option<DVec2> {
    let partner = world.get::<&Motion>(entity).ok()?.partner();
    let partner_pos = partner.and_then(|p| position_of(world, p));

    let pos = {
        let mut motion = world.get::<&mut Motion>(entity).ok()?;
        let mut ctx = StepContext {
            field,
            partner: partner_pos,
            rng,
        };
        motion.step(&mut ctx);
        motion.position()
    };

    if let Ok(mut trail) = world.get::<&mut Trail>(entity) {
        trail.0.push(pos);
    }
    Some(pos)
}

/// How many orbit hops separate `entity` from a body that orbits nothing.
///
/// Stops counting after `limit` hops, which only happens on a cycle.
pub fn orbit_depth(world: &hecs::World, entity: hecs::Entity, limit: usize) -> usize {
    let mut depth = 0;
    let mut cursor = entity;
    while depth < limit {
        let Some(center) = world
            .get::<&Motion>(cursor)
            .ok()
            .and_then(|m| m.orbit_center())
        else {
            break;
        };
        cursor = center;
        depth += 1;
    }
    depth
}

/// Does following orbit centers from `start` ever reach `needle`?
pub fn orbit_chain_reaches(
    world: &hecs::World,
    start: hecs::Entity,
    needle: hecs::Entity,
    limit: usize,
) -> bool {
    let mut cursor = start;
    for _ in 0..=limit {
        if cursor == needle {
            return true;
        }
        match world
            .get::<&Motion>(cursor)
            .ok()
            .and_then(|m| m.orbit_center())
        {
            Some(center) => cursor = center,
            None => return false,
        }
    }
    // Longer than the body count: there is a loop somewhere on the chain.
    true
}

/// Re-place every orbiter around its center's current position, centers first.
pub fn settle_orbits(world: &mut hecs::World, order: &[hecs::Entity]) {
    let limit = order.len();
    let mut orbiters: Vec<(usize, hecs::Entity)> = order
        .iter()
        .filter(|&&e| {
            world
                .get::<&Motion>(e)
                .is_ok_and(|m| m.orbit_center().is_some())
        })
        .map(|&e| (orbit_depth(world, e, limit), e))
        .collect();
    orbiters.sort_by_key(|&(depth, _)| depth);

    for (_, entity) in orbiters {
        let center = world
            .get::<&Motion>(entity)
            .ok()
            .and_then(|m| m.orbit_center());
        let center_pos = center.and_then(|c| position_of(world, c));
        if let Ok(mut motion) = world.get::<&mut Motion>(entity) {
            motion.settle(center_pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Anchor, Orbiter, Pursuer};
    use crate::util::ring::RingBuffer;

    #[test]
    fn pursuer_reads_its_target() {
        let mut world = hecs::World::new();
        let mouse = world.spawn((Motion::from(Anchor::new(DVec2::new(10.0, 0.0))),));
        let cat = world.spawn((
            Motion::from(Pursuer::new(DVec2::ZERO, mouse)),
            Trail(RingBuffer::new(4)),
        ));
        let mut rng = fastrand::Rng::with_seed(1);
        let field = Field::new(100.0, 100.0).unwrap();
        for _ in 0..3 {
            step_body(&mut world, cat, field, &mut rng);
        }
        assert_eq!(position_of(&world, cat), Some(DVec2::new(3.0, 0.0)));
        let trail = world.get::<&Trail>(cat).unwrap();
        assert_eq!(trail.0.to_vec().len(), 3);
    }

    #[test]
    fn missing_entity_is_a_no_op() {
        let mut world = hecs::World::new();
        let ghost = world.spawn(());
        let mut rng = fastrand::Rng::with_seed(1);
        let field = Field::new(100.0, 100.0).unwrap();
        assert_eq!(step_body(&mut world, ghost, field, &mut rng), None);
    }

    #[test]
    fn moons_settle_after_planets() {
        let mut world = hecs::World::new();
        let sun = world.spawn((Motion::from(Anchor::new(DVec2::new(375.0, 375.0))),));
        let earth = world.reserve_entity();
        // Moon declared before earth and built against a stale center.
        let moon = world.spawn((Motion::from(Orbiter::new(earth, DVec2::ZERO, 25.0, 1.0, 0.0)),));
        world
            .insert(
                earth,
                (Motion::from(Orbiter::new(sun, DVec2::new(375.0, 375.0), 185.0, 0.58, 0.0)),),
            )
            .unwrap();

        let order = [sun, moon, earth];
        assert_eq!(orbit_depth(&world, moon, order.len()), 2);
        assert!(orbit_chain_reaches(&world, moon, sun, order.len()));
        assert!(!orbit_chain_reaches(&world, earth, moon, order.len()));

        settle_orbits(&mut world, &order);
        assert!((position_of(&world, earth).unwrap() - DVec2::new(560.0, 375.0)).length() < 1e-9);
        assert!((position_of(&world, moon).unwrap() - DVec2::new(585.0, 375.0)).length() < 1e-9);
    }
}
