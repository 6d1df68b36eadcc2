//! Tartil - verse-by-verse Quran reader and recitation player
//!
//! The core is the playback [`Sequencer`](playback::Sequencer): continuous
//! play, verse and chapter looping, and fencing of overlapping audio loads.
//! Around it sit the content gateway, the preference and bookmark stores,
//! and a rodio audio backend. Front ends drive an [`AppContext`] and observe
//! it through a [`Renderer`](renderer::Renderer).

pub mod api;
pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod playback;
pub mod renderer;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use app::AppContext;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
