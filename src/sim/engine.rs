use super::launcher::Launcher;
use super::rocket::Rocket;
use super::spark::Spark;
use crate::color::Rgba;
use crate::config::{Backdrop, ShowConfig, SparkConfig};
use crate::surface::{CompositeMode, Surface};
use log::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub launched: bool,
    pub detonations: usize,
    pub sparks_spawned: usize,
    pub sparks_faded: usize,
    pub rockets: usize, // in flight after the tick
    pub sparks: usize,
}

/// Owns every live rocket and spark and runs the per-frame pipeline:
/// backdrop, launch, rockets (with same-tick bursts), sparks, prune.
pub struct Engine {
    rockets: Vec<Rocket>,
    sparks: Vec<Spark>,
    launcher: Launcher,
    rng: fastrand::Rng,
    backdrop: Backdrop,
    background: (u8, u8, u8),
    rocket_radius: f32,
    spark: SparkConfig,
}

impl Engine {
    pub fn new(config: &ShowConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &ShowConfig, rng: fastrand::Rng) -> Self {
        Self {
            rockets: Vec::new(),
            sparks: Vec::new(),
            launcher: Launcher::new(config.launcher.clone(), config.rocket.clone()),
            rng,
            backdrop: config.backdrop,
            background: config.background_rgb(),
            rocket_radius: config.rocket.radius,
            spark: config.spark.clone(),
        }
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    // Bypasses the launcher
    pub fn push_rocket(&mut self, rocket: Rocket) {
        self.rockets.push(rocket);
    }

    pub fn tick(&mut self, now_ms: u64, surface: &mut dyn Surface) -> TickReport {
        let width = surface.width();
        let height = surface.height();
        let mut report = TickReport::default();

        surface.set_composite(CompositeMode::SourceOver);
        match self.backdrop {
            Backdrop::Clear => surface.clear(),
            Backdrop::Trail { alpha } => {
                let (r, g, b) = self.background;
                surface.fill_rect(0.0, 0.0, width, height, Rgba::new(r, g, b, alpha));
            }
        }
        surface.set_composite(CompositeMode::Lighter);

        if let Some(rocket) = self
            .launcher
            .maybe_launch(now_ms, self.rockets.len(), width, height, &mut self.rng)
        {
            debug!(
                "launch at {:?} towards {:?} (hue {})",
                rocket.origin(),
                rocket.target(),
                rocket.hue()
            );
            self.rockets.push(rocket);
            report.launched = true;
        }

        let Self {
            rockets,
            sparks,
            rng,
            spark,
            rocket_radius,
            ..
        } = self;

        for rocket in rockets.iter_mut() {
            if let Some(det) = rocket.update() {
                debug!("detonation at ({:.1}, {:.1}) hue {}", det.x, det.y, det.hue);
                let before = sparks.len();
                sparks.extend(Spark::burst(rng, det, spark));
                report.detonations += 1;
                report.sparks_spawned += sparks.len() - before;
            }
            rocket.draw(surface, *rocket_radius);
        }

        let (gravity, style) = (spark.gravity, spark.style);
        let mut faded = 0;
        sparks.retain_mut(|s| {
            if s.update(gravity, style) {
                faded += 1;
                false
            } else {
                s.draw(&mut *surface, style);
                true
            }
        });
        rockets.retain(|r| !r.is_exploded());

        report.sparks_faded = faded;
        report.rockets = rockets.len();
        report.sparks = sparks.len();
        report
    }
}
