//! Fireworks for the terminal.
//!
//! Rockets climb from the bottom edge towards a random target, burst into a
//! ring of sparks, and the sparks drift, fall and fade. The simulation is
//! independent of any terminal: it draws through the [`surface::Surface`]
//! trait, reads time from a [`clock::Clock`] and is driven by [`run`].

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod intro;
pub mod runner;
pub mod sim;
pub mod surface;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{Preset, ShowConfig};
pub use error::{Error, Result};
pub use runner::{CancelToken, FramePacer, Host, HostEvent, Show, ShowState, ShowStats, run};
