use super::rocket::{Detonation, lerp};
use crate::color::Hsla;
use crate::config::{SparkConfig, SparkStyle};
use crate::surface::Surface;
use std::f32::consts::TAU;

/// A spark counts as faded once its alpha is within this fraction of one
/// decay step from zero. With decay `d` a spark lives `round(1 / d)` ticks,
/// and float drift in the running alpha cannot add or drop a tick.
/// A plain `alpha <= decay` cutoff would remove a spark one tick earlier
/// (49 ticks at decay 0.02, 3 at 0.25).
const FADE_STEP_FRACTION: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    vx: f32,
    vy: f32,
    hue: f32,
    lightness: f32,
    alpha: f32,
    decay: f32,
    initial_size: f32,
    size: f32,
}

impl Spark {
    pub fn new(x: f32, y: f32, hue: f32, angle: f32, speed: f32, decay: f32, lightness: f32, style: SparkStyle) -> Self {
        let initial_size = match style {
            SparkStyle::Dot { radius } => radius,
            SparkStyle::Glyph { size, .. } => size,
        };
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            hue,
            lightness,
            alpha: 1.0,
            decay,
            initial_size,
            size: initial_size,
        }
    }

    pub fn burst(rng: &mut fastrand::Rng, det: Detonation, config: &SparkConfig) -> impl Iterator<Item = Spark> + use<> {
        let config = config.clone();
        let mut rng = fastrand::Rng::with_seed(rng.u64(..));
        (0..config.burst_size).map(move |_| {
            let angle = rng.f32() * TAU;
            let speed = lerp(config.min_speed, config.max_speed, rng.f32());
            let decay = lerp(config.min_decay, config.max_decay, rng.f32());
            Spark::new(det.x, det.y, det.hue, angle, speed, decay, config.lightness, config.style)
        })
    }

    // true once faded; the caller drops it undrawn
    pub fn update(&mut self, gravity: f32, style: SparkStyle) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
        self.alpha -= self.decay;
        if let SparkStyle::Glyph { .. } = style {
            self.size = self.initial_size * self.alpha.max(0.0);
        }
        self.alpha <= self.decay * FADE_STEP_FRACTION
    }

    pub fn draw(&self, surface: &mut dyn Surface, style: SparkStyle) {
        if self.alpha <= 0.0 {
            return;
        }
        let color = Hsla::new(self.hue, 100.0, self.lightness, self.alpha);
        match style {
            SparkStyle::Dot { .. } => surface.fill_circle(self.x, self.y, self.size, color),
            SparkStyle::Glyph { glyph, .. } => surface.fill_glyph(self.x, self.y, self.size, glyph, color),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};

    const DOT: SparkStyle = SparkStyle::Dot { radius: 1.5 };
    const HEART: SparkStyle = SparkStyle::Glyph { glyph: '♥', size: 18.0 };

    fn ticks_until_faded(mut spark: Spark, gravity: f32, style: SparkStyle) -> usize {
        let mut ticks = 0;
        loop {
            ticks += 1;
            if spark.update(gravity, style) {
                return ticks;
            }
            assert!(ticks < 10_000);
        }
    }

    #[test]
    fn decay_of_two_percent_lives_fifty_ticks() {
        let spark = Spark::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.02, 50.0, DOT);
        assert_eq!(ticks_until_faded(spark, 0.05, DOT), 50);
    }

    #[test]
    fn lifetime_matches_decay_for_other_rates() {
        for (decay, expected) in [(0.1, 10), (0.04, 25), (0.015, 67), (0.01, 100), (0.25, 4)] {
            let spark = Spark::new(0.0, 0.0, 0.0, 0.0, 1.0, decay, 50.0, DOT);
            assert_eq!(ticks_until_faded(spark, 0.0, DOT), expected, "decay {decay}");
        }
    }

    #[test]
    fn quarter_decay_fades_on_the_fourth_tick() {
        let mut spark = Spark::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.25, 50.0, DOT);
        for _ in 0..3 {
            assert!(!spark.update(0.0, DOT));
        }
        assert!((spark.alpha() - 0.25).abs() < 1e-6);

        let mut surface = RecordingSurface::new(100.0, 100.0);
        spark.draw(&mut surface, DOT);
        assert_eq!(surface.calls().len(), 1);

        assert!(spark.update(0.0, DOT));
        assert!(spark.alpha() <= 0.0);
    }

    #[test]
    fn alpha_never_increases_and_stays_positive_while_alive() {
        let mut spark = Spark::new(5.0, 5.0, 10.0, 1.0, 3.0, 0.033, 70.0, HEART);
        let mut last = spark.alpha();
        while !spark.update(0.05, HEART) {
            assert!(spark.alpha() <= last);
            assert!(spark.alpha() > 0.0);
            last = spark.alpha();
        }
    }

    #[test]
    fn gravity_accelerates_downwards() {
        let mut spark = Spark::new(0.0, 0.0, 0.0, 0.0, 2.0, 0.01, 50.0, DOT);
        spark.update(0.05, DOT);
        spark.update(0.05, DOT);
        let (vx, vy) = spark.velocity();
        assert!((vx - 2.0).abs() < 1e-6);
        assert!((vy - 0.1).abs() < 1e-6);
        assert!((spark.y - 0.05).abs() < 1e-6);
    }

    #[test]
    fn glyph_shrinks_with_alpha_but_dot_does_not() {
        let mut heart = Spark::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.25, 70.0, HEART);
        heart.update(0.0, HEART);
        assert!((heart.size() - 13.5).abs() < 1e-4);

        let mut dot = Spark::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.25, 70.0, DOT);
        dot.update(0.0, DOT);
        assert_eq!(dot.size(), 1.5);
    }

    #[test]
    fn draw_uses_style_and_skips_transparent() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let heart = Spark::new(1.0, 2.0, 300.0, 0.0, 1.0, 0.02, 70.0, HEART);
        heart.draw(&mut surface, HEART);
        assert!(matches!(
            surface.calls(),
            [DrawCall::Glyph { glyph: '♥', size, color, .. }] if *size == 18.0 && color.h == 300.0 && color.l == 70.0
        ));

        let mut spent = Spark::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.5, 70.0, DOT);
        spent.update(0.0, DOT);
        assert!(spent.alpha() < 0.0);
        spent.draw(&mut surface, DOT);
        assert_eq!(surface.calls().len(), 1);
    }

    #[test]
    fn burst_spawns_configured_count_at_detonation() {
        let mut rng = fastrand::Rng::with_seed(11);
        let config = SparkConfig::default();
        let det = Detonation { x: 120.0, y: 80.0, hue: 33.0 };

        let sparks: Vec<_> = Spark::burst(&mut rng, det, &config).collect();
        assert_eq!(sparks.len(), config.burst_size);
        for spark in &sparks {
            assert_eq!((spark.x, spark.y, spark.hue()), (120.0, 80.0, 33.0));
            assert_eq!(spark.alpha(), 1.0);
            assert!((config.min_decay..=config.max_decay).contains(&spark.decay()));
            let (vx, vy) = spark.velocity();
            let speed = vx.hypot(vy);
            assert!(speed >= config.min_speed - 1e-4 && speed <= config.max_speed + 1e-4);
        }
    }
}
