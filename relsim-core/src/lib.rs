//! # Relativistic Empire Simulation Core
//!
//! Turn-based simulation of players spread through a 3D grid, moving at
//! relativistic speeds. A moving player's clock runs slow, so its economy,
//! population and science advance only on its proper-time action turns.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌───────────────────────┐
//! │ pre_process   │────▶│ AI (rayon)   │────▶│ post_process          │
//! │ clocks +      │     │ view → plan  │     │ commands → mechanisms │
//! │ snapshot      │     │ → commands   │     │ → cleanup, turn += 1  │
//! └───────────────┘     └──────────────┘     └───────────────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Universe`] | Turn controller owning the live state |
//! | [`UniverseData`] | Complete serializable state |
//! | [`UniverseView`] | One player's read-only view of the pre-turn snapshot |
//! | [`Command`] | The only way players affect each other |
//! | [`Mechanism`] | Per-player steps of the turn pipeline |
//! | [`Reasoner`] | Dual-utility AI building block |
//! | [`Registry`] | Name lookups for AIs, mechanism collections and generators |
//!
//! ## Determinism
//!
//! Every cross-player read goes through the frozen snapshot and every
//! parallel task owns one player and its own RNG stream, so equal seeds and
//! equal inputs give equal universes regardless of thread count.

pub mod ai;
pub mod command;
pub mod config;
pub mod diplomacy;
pub mod generate;
pub mod mechanism;
pub mod metrics;
pub mod persistence;
pub mod profiling;
pub mod registry;
pub mod relativity;
pub mod state;
pub mod testing;
pub mod universe;
pub mod view;

pub use ai::{Ai, Reasoner};
pub use command::{Command, CommandError, CommandKind};
pub use config::{GenerateSettings, SettingsError, UniverseSettings};
pub use generate::GenerateUniverseMethod;
pub use mechanism::{Mechanism, MechanismLists};
pub use metrics::TurnMetrics;
pub use persistence::{load_universe, save_universe, LoadError};
pub use registry::Registry;
pub use state::{PlayerData, PlayerId, UniverseData};
pub use universe::{CommandMap, Universe};
pub use view::UniverseView;
