//! # cavis-view — CAVIS terminal viewer
//!
//! The composition root. Connects a `cavis_core::Channel` to a
//! `cavis_core::FrameStore`, reads operator commands from stdin, and
//! blits rendered frames to the terminal. Watch the run live, then
//! scrub back through every frame once it finishes.

pub mod config;
pub mod console;
pub mod controls;
pub mod dispatcher;
pub mod display;
