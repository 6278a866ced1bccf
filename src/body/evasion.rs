use std::ops::RangeInclusive;

use glam::DVec2;

/// Ticks a mover must travel before it considers turning again.
pub const TURN_COOLDOWN_TICKS: u32 = 25;
/// Chance per tick, once the cooldown has passed, of picking a new heading.
pub const TURN_CHANCE: f64 = 0.2;

/// Biased random walk away from a threat.
///
/// Not pathfinding: every so often the mover picks a random heading from the
/// 270° range that excludes the quadrant the threat sits in.
#[derive(Debug, Clone)]
pub struct Evasion {
    threat: hecs::Entity,
    ticks_since_turn: u32,
}

impl Evasion {
    pub fn new(threat: hecs::Entity) -> Self {
        Self {
            threat,
            ticks_since_turn: 0,
        }
    }

    pub fn threat(&self) -> hecs::Entity {
        self.threat
    }

    pub fn ticks_since_turn(&self) -> u32 {
        self.ticks_since_turn
    }

    /// Roll for a new heading. Returns `Some` when the mover should turn.
    pub fn maybe_turn(
        &mut self,
        mover: DVec2,
        threat: Option<DVec2>,
        rng: &mut fastrand::Rng,
    ) -> Option<f64> {
        let threat = threat?;
        if self.ticks_since_turn <= TURN_COOLDOWN_TICKS || rng.f64() > TURN_CHANCE {
            return None;
        }
        self.ticks_since_turn = 0;
        Some(f64::from(rng.i32(evasive_heading_range(mover, threat))))
    }

    /// Count one tick of travel.
    pub fn travelled(&mut self) {
        self.ticks_since_turn = self.ticks_since_turn.saturating_add(1);
    }

    pub fn restart(&mut self) {
        self.ticks_since_turn = 0;
    }
}

/// Headings (inclusive, degrees) that steer away from `threat`.
pub fn evasive_heading_range(mover: DVec2, threat: DVec2) -> RangeInclusive<i32> {
    match (mover.x < threat.x, mover.y < threat.y) {
        // Threat up and to the right.
        (true, true) => 90..=360,
        // Threat down and to the right.
        (true, false) => 0..=270,
        // Threat up and to the left.
        (false, true) => -180..=90,
        // Threat down and to the left.
        (false, false) => -90..=180,
    }
}

/// A fresh heading in `[0, 360)` for the start of an evasive run.
pub fn opening_heading(rng: &mut fastrand::Rng) -> f64 {
    f64::from(rng.i32(0..360))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threat_entity() -> hecs::Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn quadrant_ranges_hold_for_every_sample() {
        let mut rng = fastrand::Rng::with_seed(42);
        let mouse = DVec2::new(500.0, 375.0);
        let cases = [
            (DVec2::new(600.0, 400.0), 90..=360),
            (DVec2::new(600.0, 300.0), 0..=270),
            (DVec2::new(400.0, 400.0), -180..=90),
            (DVec2::new(400.0, 300.0), -90..=180),
            // Ties fall to the "not less than" side.
            (DVec2::new(500.0, 375.0), -90..=180),
        ];
        for (cat, expected) in cases {
            assert_eq!(evasive_heading_range(mouse, cat), expected);
            let mut evasion = Evasion::new(threat_entity());
            let mut turns = 0;
            while turns < 100 {
                for _ in 0..=TURN_COOLDOWN_TICKS {
                    evasion.travelled();
                }
                if let Some(h) = evasion.maybe_turn(mouse, Some(cat), &mut rng) {
                    assert!(expected.contains(&(h as i32)), "{h} outside {expected:?}");
                    assert_eq!(evasion.ticks_since_turn(), 0);
                    turns += 1;
                }
            }
        }
    }

    #[test]
    fn cooldown_blocks_turns() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut evasion = Evasion::new(threat_entity());
        for _ in 0..TURN_COOLDOWN_TICKS {
            evasion.travelled();
            let turn = evasion.maybe_turn(DVec2::ZERO, Some(DVec2::ONE), &mut rng);
            assert!(turn.is_none());
        }
    }

    #[test]
    fn turn_rate_is_roughly_one_in_five() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut evasion = Evasion::new(threat_entity());
        let mut turns = 0;
        let rolls = 10_000;
        for _ in 0..rolls {
            for _ in 0..=TURN_COOLDOWN_TICKS {
                evasion.travelled();
            }
            if evasion
                .maybe_turn(DVec2::ZERO, Some(DVec2::ONE), &mut rng)
                .is_some()
            {
                turns += 1;
            }
            evasion.restart();
        }
        let rate = f64::from(turns) / f64::from(rolls);
        assert!((0.17..0.23).contains(&rate), "rate {rate}");
    }

    #[test]
    fn no_threat_no_turn() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut evasion = Evasion::new(threat_entity());
        for _ in 0..100 {
            evasion.travelled();
        }
        assert!(evasion.maybe_turn(DVec2::ZERO, None, &mut rng).is_none());
    }

    #[test]
    fn opening_heading_range() {
        let mut rng = fastrand::Rng::with_seed(9);
        for _ in 0..500 {
            let h = opening_heading(&mut rng);
            assert!((0.0..360.0).contains(&h));
        }
    }
}
