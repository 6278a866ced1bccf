pub mod movement;
pub mod snapshot;
pub mod termination;

use crate::collision::{StopReason, Termination};
use crate::geometry::Field;

/// Run everything one body timer tick does.
pub fn tick_body(
    world: &mut hecs::World,
    entity: hecs::Entity,
    field: Field,
    rules: &[Termination],
    collision_threshold: f64,
    rng: &mut fastrand::Rng,
) -> Option<StopReason> {
    // 1. Move the body (reads its partner's position)
    movement::step_body(world, entity, field, rng)?;

    // 2. Re-check the termination rules this body takes part in
    termination::evaluate(world, rules, entity, collision_threshold)
}
