//! Show configuration, loaded from TOML.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! seed = 7
//! background = "1a1b26"
//!
//! [backdrop]
//! mode = "trail"
//! alpha = 0.08
//!
//! [launcher]
//! interval_ms = 800
//! max_rockets = 8
//!
//! [spark]
//! burst_size = 80
//! style = { kind = "glyph", glyph = "♥", size = 18.0 }
//! ```
//!
//! Speeds are in logical surface units per tick; decay is alpha lost per tick.

use crate::color::parse_hex_color;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// How the surface is prepared before particles are drawn each tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Backdrop {
    /// Wipe to the background colour.
    Clear,
    /// Translucent background fill; leaves fading trails behind particles.
    Trail { alpha: f32 },
}

/// How sparks are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SparkStyle {
    Dot { radius: f32 },
    /// Glyph whose size is `size * alpha`, so it shrinks as it fades.
    Glyph { glyph: char, size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Classic,
    Hearts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub interval_ms: u64,
    pub max_rockets: usize,
    /// Horizontal target band as fractions of the surface width.
    pub target_x: [f32; 2],
    /// Vertical target band as fractions of the surface height.
    pub target_y: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_lightness: f32,
    pub max_lightness: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SparkConfig {
    pub burst_size: usize,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_decay: f32,
    pub max_decay: f32,
    pub gravity: f32,
    pub lightness: f32,
    pub style: SparkStyle,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Caption typed out before the first rocket. Empty starts immediately.
    pub text: String,
    pub char_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    pub seed: Option<u64>,
    pub fps: u32,
    pub background: String,
    /// Logical units per terminal pixel.
    pub scale: f32,
    pub backdrop: Backdrop,
    pub launcher: LauncherConfig,
    pub rocket: RocketConfig,
    pub spark: SparkConfig,
    pub intro: IntroConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1200,
            max_rockets: 5,
            target_x: [0.1, 0.9],
            target_y: [0.2, 0.8],
        }
    }
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            min_speed: 3.0,
            max_speed: 4.0,
            min_lightness: 50.0,
            max_lightness: 70.0,
            radius: 2.0,
        }
    }
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            burst_size: 60,
            min_speed: 1.0,
            max_speed: 8.0,
            min_decay: 0.015,
            max_decay: 0.04,
            gravity: 0.05,
            lightness: 70.0,
            style: SparkStyle::Dot { radius: 1.5 },
        }
    }
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            char_interval_ms: 100,
        }
    }
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fps: 60,
            background: "000000".to_string(),
            scale: 4.0,
            backdrop: Backdrop::Trail { alpha: 0.08 },
            launcher: LauncherConfig::default(),
            rocket: RocketConfig::default(),
            spark: SparkConfig::default(),
            intro: IntroConfig::default(),
        }
    }
}

impl ShowConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            // Hard clear, plain dots, no gravity
            Preset::Classic => Self {
                backdrop: Backdrop::Clear,
                launcher: LauncherConfig {
                    interval_ms: 1000,
                    target_x: [0.0, 1.0],
                    ..LauncherConfig::default()
                },
                rocket: RocketConfig {
                    min_speed: 3.0,
                    max_speed: 3.0,
                    ..RocketConfig::default()
                },
                spark: SparkConfig {
                    min_speed: 1.0,
                    max_speed: 9.0,
                    min_decay: 0.01,
                    max_decay: 0.03,
                    gravity: 0.0,
                    lightness: 50.0,
                    style: SparkStyle::Dot { radius: 1.5 },
                    ..SparkConfig::default()
                },
                ..Self::default()
            },
            // Afterglow trails, falling heart glyphs, a caption first
            Preset::Hearts => Self {
                backdrop: Backdrop::Trail { alpha: 0.08 },
                launcher: LauncherConfig {
                    target_y: [0.2, 0.6],
                    ..LauncherConfig::default()
                },
                spark: SparkConfig {
                    style: SparkStyle::Glyph {
                        glyph: '♥',
                        size: 18.0,
                    },
                    ..SparkConfig::default()
                },
                intro: IntroConfig {
                    text: "Happy Birthday!".to_string(),
                    char_interval_ms: 100,
                },
                ..Self::default()
            },
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Background colour as RGB. Call [`validate`](Self::validate) first.
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.background).unwrap_or((0, 0, 0))
    }

    pub fn validate(&self) -> Result<()> {
        if parse_hex_color(&self.background).is_none() {
            return invalid(format!("background {:?} is not RRGGBB", self.background));
        }
        if !(1..=MAX_FPS).contains(&self.fps) {
            return invalid(format!("fps must be in 1..={MAX_FPS}"));
        }
        if !(self.scale > 0.0) {
            return invalid("scale must be positive");
        }
        if let Backdrop::Trail { alpha } = self.backdrop {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return invalid("trail alpha must be in (0, 1]");
            }
        }

        let l = &self.launcher;
        if !(1..=MAX_ROCKETS).contains(&l.max_rockets) {
            return invalid(format!("launcher.max_rockets must be in 1..={MAX_ROCKETS}"));
        }
        check_band("launcher.target_x", l.target_x)?;
        check_band("launcher.target_y", l.target_y)?;

        let r = &self.rocket;
        check_range("rocket speed", r.min_speed, r.max_speed)?;
        if r.min_speed <= 0.0 {
            return invalid("rocket speed must be positive");
        }
        check_range("rocket lightness", r.min_lightness, r.max_lightness)?;

        let s = &self.spark;
        if !(1..=MAX_BURST_SIZE).contains(&s.burst_size) {
            return invalid(format!("spark.burst_size must be in 1..={MAX_BURST_SIZE}"));
        }
        check_range("spark speed", s.min_speed, s.max_speed)?;
        check_range("spark decay", s.min_decay, s.max_decay)?;
        if s.min_decay <= 0.0 {
            return invalid("spark decay must be positive");
        }
        match s.style {
            SparkStyle::Dot { radius } if radius <= 0.0 => invalid("spark dot radius must be positive"),
            SparkStyle::Glyph { size, .. } if size <= 0.0 => invalid("spark glyph size must be positive"),
            _ => Ok(()),
        }
    }
}

const MAX_FPS: u32 = 1000;
const MAX_ROCKETS: usize = 1000;
const MAX_BURST_SIZE: usize = 10_000;

fn invalid(msg: impl Into<String>) -> Result<()> {
    Err(Error::InvalidConfig(msg.into()))
}

fn check_range(name: &str, min: f32, max: f32) -> Result<()> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return invalid(format!("{name}: min {min} exceeds max {max}"));
    }
    Ok(())
}

fn check_band(name: &str, [lo, hi]: [f32; 2]) -> Result<()> {
    check_range(name, lo, hi)?;
    if lo < 0.0 || hi > 1.0 {
        return invalid(format!("{name} must lie within [0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_presets_are_valid() {
        ShowConfig::default().validate().unwrap();
        ShowConfig::preset(Preset::Classic).validate().unwrap();
        ShowConfig::preset(Preset::Hearts).validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ShowConfig::from_toml(
            r#"
            seed = 42
            [launcher]
            max_rockets = 9
            [spark]
            style = { kind = "glyph", glyph = "*", size = 12.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.launcher.max_rockets, 9);
        assert_eq!(config.launcher.interval_ms, 1200);
        assert_eq!(config.spark.burst_size, 60);
        assert_eq!(config.spark.style, SparkStyle::Glyph { glyph: '*', size: 12.0 });
    }

    #[test]
    fn backdrop_modes_parse() {
        let clear = ShowConfig::from_toml("backdrop = { mode = \"clear\" }").unwrap();
        assert_eq!(clear.backdrop, Backdrop::Clear);

        let trail = ShowConfig::from_toml("[backdrop]\nmode = \"trail\"\nalpha = 0.2").unwrap();
        assert_eq!(trail.backdrop, Backdrop::Trail { alpha: 0.2 });
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = ShowConfig::default();
        config.spark.min_decay = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = ShowConfig::default();
        config.launcher.target_y = [0.8, 0.2];
        assert!(config.validate().is_err());

        let mut config = ShowConfig::default();
        config.launcher.target_x = [0.0, 1.5];
        assert!(config.validate().is_err());

        let mut config = ShowConfig::default();
        config.background = "nope".into();
        assert!(config.validate().is_err());

        let mut config = ShowConfig::default();
        config.launcher.max_rockets = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_bounds_sizes() {
        let mut config = ShowConfig::default();
        config.fps = 2_000_000_000;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        config.fps = 1000;
        config.validate().unwrap();

        let mut config = ShowConfig::default();
        config.spark.burst_size = usize::MAX;
        assert!(config.validate().is_err());

        let mut config = ShowConfig::default();
        config.launcher.max_rockets = 1_000_000;
        assert!(config.validate().is_err());

        assert!(ShowConfig::from_toml("fps = 5000").is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ShowConfig::from_toml("launcher = 3"),
            Err(Error::ConfigParse(_))
        ));
    }
}
