use glam::DVec2;

use super::evasion::{opening_heading, Evasion};
use super::{Body, StepContext};
use crate::geometry::{heading_vector, Field};

/// Moves one unit per tick along its heading and ricochets off the walls.
///
/// With an [`Evasion`] attached it also re-rolls its heading now and then to
/// run away from a threat body (the mouse in cat-and-mouse).
#[derive(Debug, Clone)]
pub struct FreeMover {
    pos: DVec2,
    heading: f64,
    start: DVec2,
    start_heading: f64,
    evasion: Option<Evasion>,
}

impl FreeMover {
    pub fn new(pos: DVec2, heading: f64) -> Self {
        Self {
            pos,
            heading,
            start: pos,
            start_heading: heading,
            evasion: None,
        }
    }

    pub fn evading(mut self, threat: hecs::Entity) -> Self {
        self.evasion = Some(Evasion::new(threat));
        self
    }

    pub fn evasion(&self) -> Option<&Evasion> {
        self.evasion.as_ref()
    }

    pub fn set_evasion(&mut self, evasion: Option<Evasion>) {
        self.evasion = evasion;
    }

    /// Point the mover somewhere else; also becomes the heading restored on reset.
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
        self.start_heading = heading;
    }

    pub fn place(&mut self, pos: DVec2) {
        self.pos = pos;
        self.start = pos;
    }
}

/// New heading after touching a wall at `pos`.
///
/// The vertical walls are checked first and the horizontal ones only when the
/// vertical check misses, so a body in a corner reflects on x alone.
pub fn reflect(pos: DVec2, heading: f64, field: &Field) -> f64 {
    if pos.x <= 0.0 || pos.x >= field.width {
        180.0 - heading
    } else if pos.y <= 0.0 || pos.y >= field.height {
        360.0 - heading
    } else {
        heading
    }
}

impl Body for FreeMover {
    fn step(&mut self, ctx: &mut StepContext<'_>) {
        if let Some(evasion) = &mut self.evasion {
            if let Some(heading) = evasion.maybe_turn(self.pos, ctx.partner, ctx.rng) {
                log::debug!("evasive turn to {heading}°");
                self.heading = heading;
            }
        }

        self.pos += heading_vector(self.heading);
        self.heading = reflect(self.pos, self.heading, &ctx.field);

        if let Some(evasion) = &mut self.evasion {
            evasion.travelled();
        }
    }

    fn position(&self) -> DVec2 {
        self.pos
    }

    fn reset(&mut self) {
        self.pos = self.start;
        self.heading = self.start_heading;
        if let Some(evasion) = &mut self.evasion {
            evasion.restart();
        }
    }

    fn heading(&self) -> Option<f64> {
        Some(self.heading)
    }

    fn partner(&self) -> Option<hecs::Entity> {
        self.evasion.as_ref().map(Evasion::threat)
    }

    fn on_start(&mut self, rng: &mut fastrand::Rng) {
        if let Some(evasion) = &mut self.evasion {
            evasion.restart();
            self.heading = opening_heading(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        Field::new(1000.0, 800.0).unwrap()
    }

    fn step_n(mover: &mut FreeMover, n: usize) {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut ctx = StepContext {
            field: field(),
            partner: None,
            rng: &mut rng,
        };
        for _ in 0..n {
            mover.step(&mut ctx);
        }
    }

    #[test]
    fn reflection_law() {
        let f = field();
        for theta in [0.0, 30.0, 135.0, 200.0, -45.0] {
            assert_eq!(reflect(DVec2::new(0.0, 400.0), theta, &f), 180.0 - theta);
            assert_eq!(reflect(DVec2::new(1000.0, 400.0), theta, &f), 180.0 - theta);
            assert_eq!(reflect(DVec2::new(500.0, 0.0), theta, &f), 360.0 - theta);
            assert_eq!(reflect(DVec2::new(500.0, 800.0), theta, &f), 360.0 - theta);
            assert_eq!(reflect(DVec2::new(500.0, 400.0), theta, &f), theta);
        }
    }

    #[test]
    fn corner_reflects_on_x_only() {
        // Both walls touched in one tick: only the x rule applies.
        let f = field();
        assert_eq!(reflect(DVec2::new(0.0, 0.0), 225.0, &f), -45.0);
        assert_eq!(reflect(DVec2::new(1000.0, 800.0), 45.0, &f), 135.0);
    }

    #[test]
    fn leaving_the_left_wall_does_not_oscillate() {
        let mut mover = FreeMover::new(DVec2::new(0.0, 400.0), 0.0);
        for _ in 0..10 {
            step_n(&mut mover, 1);
            assert_eq!(mover.heading(), Some(0.0));
        }
        assert!((mover.position().x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn bounces_back_from_the_right_wall() {
        let mut mover = FreeMover::new(DVec2::new(997.0, 400.0), 0.0);
        step_n(&mut mover, 3);
        assert!((mover.position().x - 1000.0).abs() < 1e-9);
        assert_eq!(mover.heading(), Some(180.0));
        step_n(&mut mover, 5);
        assert!((mover.position().x - 995.0).abs() < 1e-9);
        assert!((mover.position().y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn bounces_off_the_floor() {
        let mut mover = FreeMover::new(DVec2::new(500.0, 1.0), 270.0);
        step_n(&mut mover, 1);
        assert!(mover.position().y.abs() < 1e-9);
        assert_eq!(mover.heading(), Some(90.0));
    }

    #[test]
    fn reset_restores_start() {
        let mut mover = FreeMover::new(DVec2::new(500.0, 400.0), 30.0);
        step_n(&mut mover, 50);
        mover.reset();
        assert_eq!(mover.position(), DVec2::new(500.0, 400.0));
        assert_eq!(mover.heading(), Some(30.0));
    }

    #[test]
    fn evasive_start_rolls_a_heading() {
        let mut world = hecs::World::new();
        let cat = world.spawn(());
        let mut mover = FreeMover::new(DVec2::new(500.0, 375.0), 0.0).evading(cat);
        assert_eq!(mover.partner(), Some(cat));
        let mut rng = fastrand::Rng::with_seed(99);
        mover.on_start(&mut rng);
        let heading = mover.heading().unwrap();
        assert!((0.0..360.0).contains(&heading));
        assert_eq!(heading.fract(), 0.0);
    }
}
