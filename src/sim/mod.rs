//! Game simulation
//!
//! Everything that decides what happens in a game lives here:
//! - Stack model and move rules are plain data and pure functions
//! - The interaction machine turns pointer targets into commands
//! - The session applies commands, drives the animator and checks for a win
//!
//! Nothing in this module touches the DOM or a GPU.

pub mod interaction;
pub mod rules;
pub mod session;
pub mod solver;
pub mod stack;

pub use interaction::{Command, Cursor, InteractionMachine, InteractionState};
pub use rules::{can_place, can_place_on, placement_for};
pub use session::{GameEvent, GameResult, Session};
pub use solver::{Move, next_move, solution};
pub use stack::{Disc, DiscId, DiscLocation, Pillar, PillarTag, StackModel};
