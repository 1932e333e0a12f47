//! # Event Script
//!
//! Scripted-event engine for the overworld. Events are JSON documents made
//! of steps (dialogues, role assignments, flags, NPC placement) that the
//! [`EventInterpreter`] runs against a [`World`].
//!
//! ## Core Components
//!
//! - **document**: Event documents and their steps, parsed once at load time
//! - **interpreter**: Runs a document, suspending whenever the player must act
//! - **dialogue**: The modal dialogue box with pages and options
//! - **roles**: Role assignment, role outcomes and role-based NPC placement
//! - **world**: The boundary to the running game
//! - **config**: Texts, recruit stats and key bindings, loaded from TOML
//!
//! ## Design Philosophy
//!
//! - **Explicit suspension**: Waiting is a state, never a blocking call
//! - **No callbacks**: Closing a dialogue returns what to resume
//! - **Forgiving scripts**: Malformed steps are logged and skipped, never fatal

pub mod config;
pub mod dialogue;
pub mod document;
pub mod interpreter;
pub mod roles;
pub mod world;

pub use config::*;
pub use dialogue::*;
pub use document::*;
pub use interpreter::*;
pub use roles::*;
pub use world::*;
