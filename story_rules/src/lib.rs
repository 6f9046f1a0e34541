//! # Story Rules
//!
//! The "Story Bible" crate - contains the story graph, content loading, and the
//! player state model. This crate is the single source of truth for what a
//! story is and what a player holds; it has no timers and no save logic.

pub mod mechanics;
pub mod player;
pub mod story_graph;

pub use mechanics::*;
pub use player::*;
pub use story_graph::*;
