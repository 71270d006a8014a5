//! Input: raw keys mapped to actions, and the movement vector derived from them.
//!
//! # Invariants
//! - World code consumes actions and the movement vector, never raw keys.
//! - The movement vector is zero or unit length; diagonals are not faster.

pub mod action;

pub use action::{Action, InputState, KeyBindings, UnknownAction};
