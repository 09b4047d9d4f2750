//! Platform abstraction layer
//!
//! Translates device events into the simulation's input vocabulary.

pub mod input;

pub use input::{InputAdapter, Key, command_for_key};
