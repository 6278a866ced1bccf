use crate::body::{Body, Motion};
use crate::ecs::components::{Label, Trail};
use crate::render::BodySnapshot;

use super::movement::position_of;

/// Rebuild the snapshot list from current components, in spawn order.
pub fn rebuild(world: &hecs::World, order: &[hecs::Entity], snapshots: &mut Vec<BodySnapshot>) {
    snapshots.clear();
    for &entity in order {
        let Ok(mut query) = world.query_one::<(&Motion, Option<&Label>, Option<&Trail>)>(entity) else {
            continue;
        };
        let Some((motion, label, trail)) = query.get() else {
            continue;
        };
        let partner_pos = motion.partner().and_then(|p| position_of(world, p));
        snapshots.push(BodySnapshot::from_components(
            entity,
            motion,
            label,
            trail,
            partner_pos,
        ));
    }
}
