//! # Narrative Core (The Cortex)
//!
//! The engine side of the branching-narrative system. This crate drives a
//! player through the story graph defined in `story_rules`, persists progress,
//! and provides the timed effects a presentation layer needs.
//!
//! ## Core Components
//!
//! - **engine**: Session lifecycle and the single choice transition
//! - **persistence**: Atomic single-slot save/load of session snapshots
//! - **effects**: Cooperative timer queue with debounce and text reveal
//! - **config**: Engine settings, loadable from TOML
//! - **logging**: `tracing` subscriber setup for hosts
//!
//! ## Design Philosophy
//!
//! - **Single-Threaded**: All state lives on the caller's thread; timers are pumped by the host
//! - **Fail Safe**: A missing or broken save never disturbs the live session
//! - **Content-Driven**: Story text, stats and endings come from data files, not code

pub mod config;
pub mod effects;
pub mod engine;
pub mod logging;
pub mod persistence;

pub use config::*;
pub use effects::*;
pub use engine::*;
pub use logging::*;
pub use persistence::*;

pub use story_rules;
