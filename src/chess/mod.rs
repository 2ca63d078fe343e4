//! Implementation of the four-piece chess variant: the board, movement rules,
//! the turn protocol and save files.

pub mod board;
pub mod core;
pub mod game;
pub mod rules;
pub mod save;
