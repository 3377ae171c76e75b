//! Falling-block puzzle engine.
//!
//! [`core`] holds the value types: [`Position`], [`Piece`] and the
//! [`Board`]. [`engine`] sequences them into a game driven by commands and
//! a gravity timer.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
