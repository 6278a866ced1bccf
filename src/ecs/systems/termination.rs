use crate::body::Motion;
use crate::collision::{distance, has_collided, StopReason, Termination};

use super::movement::position_of;

/// Check the rules touched by a tick of `entity`; first one that holds wins.
pub fn evaluate(
    world: &hecs::World,
    rules: &[Termination],
    entity: hecs::Entity,
    threshold: f64,
) -> Option<StopReason> {
    rules
        .iter()
        .filter(|rule| rule.involves(entity))
        .find_map(|rule| check(world, rule, threshold))
}

fn check(world: &hecs::World, rule: &Termination, threshold: f64) -> Option<StopReason> {
    match *rule {
        Termination::Collision { a, b } => {
            let d = distance(position_of(world, a)?, position_of(world, b)?);
            has_collided(d, threshold).then_some(StopReason::Collision { a, b, distance: d })
        }
        Termination::Laps { walker, laps } => {
            let done = world.get::<&Motion>(walker).ok()?.laps()?;
            (done >= laps).then_some(StopReason::LapsCompleted { walker, laps: done })
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::body::{Anchor, Pursuer};

    #[test]
    fn collision_within_threshold() {
        let mut world = hecs::World::new();
        let mouse = world.spawn((Motion::from(Anchor::new(DVec2::new(500.0, 375.0))),));
        let cat = world.spawn((Motion::from(Pursuer::new(DVec2::new(540.0, 375.0), mouse)),));
        let rules = [Termination::Collision { a: cat, b: mouse }];

        assert_eq!(evaluate(&world, &rules, cat, 10.0), None);
        match evaluate(&world, &rules, mouse, 50.0) {
            Some(StopReason::Collision { distance, .. }) => assert_eq!(distance, 40.0),
            other => panic!("expected a collision, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_ticks_skip_the_rule() {
        let mut world = hecs::World::new();
        let mouse = world.spawn((Motion::from(Anchor::new(DVec2::ZERO)),));
        let cat = world.spawn((Motion::from(Pursuer::new(DVec2::ZERO, mouse)),));
        let bystander = world.spawn((Motion::from(Anchor::new(DVec2::ONE)),));
        let rules = [Termination::Collision { a: cat, b: mouse }];
        assert_eq!(evaluate(&world, &rules, bystander, 50.0), None);
    }

    #[test]
    fn lap_rule_ignores_non_walkers() {
        let mut world = hecs::World::new();
        let rock = world.spawn((Motion::from(Anchor::new(DVec2::ZERO)),));
        let rules = [Termination::Laps {
            walker: rock,
            laps: 0,
        }];
        assert_eq!(evaluate(&world, &rules, rock, 1.0), None);
    }
}
