use super::rocket::{Rocket, lerp};
use crate::config::{LauncherConfig, RocketConfig};

// Refused launches are not queued
#[derive(Debug, Clone)]
pub struct Launcher {
    config: LauncherConfig,
    rocket: RocketConfig,
    last_launch_ms: Option<u64>,
}

impl Launcher {
    pub fn new(config: LauncherConfig, rocket: RocketConfig) -> Self {
        Self {
            config,
            rocket,
            last_launch_ms: None,
        }
    }

    pub fn max_rockets(&self) -> usize {
        self.config.max_rockets
    }

    pub fn last_launch_ms(&self) -> Option<u64> {
        self.last_launch_ms
    }

    fn is_due(&self, now_ms: u64) -> bool {
        match self.last_launch_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.config.interval_ms,
        }
    }

    pub fn maybe_launch(
        &mut self,
        now_ms: u64,
        active_rockets: usize,
        width: f32,
        height: f32,
        rng: &mut fastrand::Rng,
    ) -> Option<Rocket> {
        if !self.is_due(now_ms) || active_rockets >= self.config.max_rockets {
            return None;
        }

        let [x_lo, x_hi] = self.config.target_x;
        let [y_lo, y_hi] = self.config.target_y;

        let origin = (rng.f32() * width, height);
        let target = (
            width * lerp(x_lo, x_hi, rng.f32()),
            height * lerp(y_lo, y_hi, rng.f32()),
        );

        self.last_launch_ms = Some(now_ms);
        Some(Rocket::launch(rng, origin, target, &self.rocket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> Launcher {
        Launcher::new(LauncherConfig::default(), RocketConfig::default())
    }

    #[test]
    fn first_call_launches_immediately() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut launcher = launcher();
        assert!(launcher.maybe_launch(0, 0, 800.0, 600.0, &mut rng).is_some());
        assert_eq!(launcher.last_launch_ms(), Some(0));
    }

    #[test]
    fn waits_strictly_longer_than_interval() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut launcher = launcher();
        launcher.maybe_launch(1_000, 0, 800.0, 600.0, &mut rng).unwrap();

        assert!(launcher.maybe_launch(1_500, 1, 800.0, 600.0, &mut rng).is_none());
        assert!(launcher.maybe_launch(2_200, 1, 800.0, 600.0, &mut rng).is_none());
        assert!(launcher.maybe_launch(2_201, 1, 800.0, 600.0, &mut rng).is_some());
        assert_eq!(launcher.last_launch_ms(), Some(2_201));
    }

    #[test]
    fn full_sky_refuses_regardless_of_elapsed_time() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut launcher = launcher();
        assert_eq!(launcher.max_rockets(), 5);
        assert!(launcher.maybe_launch(u64::MAX / 2, 5, 800.0, 600.0, &mut rng).is_none());
        assert_eq!(launcher.last_launch_ms(), None);
        assert!(launcher.maybe_launch(u64::MAX / 2, 4, 800.0, 600.0, &mut rng).is_some());
    }

    #[test]
    fn origin_on_bottom_edge_and_target_in_band() {
        let mut rng = fastrand::Rng::with_seed(9);
        let mut launcher = launcher();
        for i in 0..500u64 {
            let rocket = launcher
                .maybe_launch(i * 10_000, 0, 800.0, 600.0, &mut rng)
                .unwrap();
            let (ox, oy) = rocket.origin();
            let (tx, ty) = rocket.target();
            assert!((0.0..=800.0).contains(&ox));
            assert_eq!(oy, 600.0);
            assert!((80.0..=720.0).contains(&tx), "target x {tx}");
            assert!((120.0..=480.0).contains(&ty), "target y {ty}");
        }
    }
}
