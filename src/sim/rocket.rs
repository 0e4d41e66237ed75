use crate::color::Hsla;
use crate::config::RocketConfig;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub x: f32,
    pub y: f32,
    pub hue: f32,
}

/// A shell climbing from its launch point to its target. Arrival is decided
/// by accumulated travel, so overshooting cannot miss it.
#[derive(Debug, Clone)]
pub struct Rocket {
    pub x: f32,
    pub y: f32,
    origin: (f32, f32),
    target: (f32, f32),
    vx: f32,
    vy: f32,
    speed: f32,
    distance_to_target: f32,
    distance_traveled: f32,
    hue: f32,
    brightness: f32,
    alpha: f32,
    exploded: bool,
}

impl Rocket {
    pub fn new(origin: (f32, f32), target: (f32, f32), speed: f32, hue: f32, brightness: f32) -> Self {
        let dx = target.0 - origin.0;
        let dy = target.1 - origin.1;
        let distance_to_target = dx.hypot(dy);

        // No direction to head in when origin and target coincide
        let (vx, vy) = if distance_to_target > 0.0 {
            let angle = dy.atan2(dx);
            (angle.cos() * speed, angle.sin() * speed)
        } else {
            (0.0, 0.0)
        };

        Self {
            x: origin.0,
            y: origin.1,
            origin,
            target,
            vx,
            vy,
            speed,
            distance_to_target,
            distance_traveled: 0.0,
            hue,
            brightness,
            alpha: 1.0,
            exploded: false,
        }
    }

    pub fn launch(rng: &mut fastrand::Rng, origin: (f32, f32), target: (f32, f32), config: &RocketConfig) -> Self {
        let speed = lerp(config.min_speed, config.max_speed, rng.f32());
        let hue = rng.u16(0..360) as f32;
        let brightness = lerp(config.min_lightness, config.max_lightness, rng.f32());
        Self::new(origin, target, speed, hue, brightness)
    }

    // Some exactly once, on the arrival tick
    pub fn update(&mut self) -> Option<Detonation> {
        if self.exploded {
            return None;
        }

        self.distance_traveled += self.speed;
        self.x += self.vx;
        self.y += self.vy;

        if self.distance_traveled >= self.distance_to_target {
            self.exploded = true;
            return Some(Detonation {
                x: self.x,
                y: self.y,
                hue: self.hue,
            });
        }
        None
    }

    pub fn draw(&self, surface: &mut dyn Surface, radius: f32) {
        if self.exploded {
            return;
        }
        surface.fill_circle(
            self.x,
            self.y,
            radius,
            Hsla::new(self.hue, 100.0, self.brightness, self.alpha),
        );
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn distance_to_target(&self) -> f32 {
        self.distance_to_target
    }

    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }
}

pub(crate) fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}
