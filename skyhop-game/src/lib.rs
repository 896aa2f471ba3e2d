//! Doodle-jump style game logic for Skyhop.
//!
//! This crate is pure simulation: a frontend drives one [`logic::process_tick`]
//! per frame and renders from the resulting state. All mutable state lives in a
//! single [`JumpGame`] owned by the loop driver; nothing here performs I/O.

pub mod logic;
pub mod types;

pub use logic::process_tick;
pub use types::{
    Cloud, GamePhase, InputState, JumpGame, Platform, PlatformKind, Player,
};
