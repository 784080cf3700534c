//! Pokedex (ko) - terminal catalog viewer for PokeAPI with Korean names
//!
//! The library holds the store pieces (state, actions, reducer), the remote
//! catalog client and the screens; `main.rs` wires them into a terminal app.

pub mod action;
pub mod api;
pub mod catalog;
pub mod config;
pub mod effect;
pub mod error;
pub mod hangul;
pub mod logging;
pub mod reducer;
pub mod scroll;
pub mod search;
pub mod sprite;
pub mod state;
pub mod ui;
