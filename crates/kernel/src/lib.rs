//! World Kernel: the application state and its per-frame animation step.
//!
//! # Invariants
//! - `World::step` is pure with respect to the seed and the pointer sequence.
//! - All randomness flows from one seeded generator.
//! - Hosts feed input through `Action`s, never by poking node transforms.

pub mod airplane;
pub mod clock;
pub mod config;
pub mod environment;
pub mod pilot;
pub mod rng;
pub mod sea;
pub mod sky;
pub mod world;

pub use airplane::Airplane;
pub use clock::FixedStep;
pub use config::{ConfigError, SimConfig};
pub use pilot::Pilot;
pub use rng::SplitMix64;
pub use sea::{Sea, Wave};
pub use sky::Sky;
pub use world::World;
