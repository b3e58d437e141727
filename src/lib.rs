//! # ML Connect N
//!
//! A decision engine for N-in-a-row connection games on configurable grids.
//! Combines heuristic minimax search with tabular Q-learning trained through
//! replay-buffer self-play against scripted opponents.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, sides, streak detection, state machine
//! - [`ai`] — Agent trait, heuristic, minimax, Q-learning, state encoding
//! - [`training`] — Game orchestration, trainer, replay buffer, metrics
//! - [`checkpoint`] — Value-table persistence
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
