//! Firework simulation: rockets, sparks, the launcher and the engine that
//! ties them together each frame.

pub mod engine;
pub mod launcher;
pub mod rocket;
pub mod spark;

pub use engine::{Engine, TickReport};
pub use launcher::Launcher;
pub use rocket::{Detonation, Rocket};
pub use spark::Spark;
