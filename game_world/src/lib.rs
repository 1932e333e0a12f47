//! # Game World
//!
//! World-side state that scripted events read and mutate: story flags, the
//! party roster, persistent per-NPC records, map markers and the live NPC
//! units walking around the current map.
//!
//! This crate holds no scripting logic. The event engine reaches it through a
//! narrow interface and never reads its internals directly.

pub mod entities;
pub mod world_state;

pub use entities::*;
pub use world_state::*;
