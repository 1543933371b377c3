//! speech-atlas
//!
//! Terminal choropleth world map: countries colored by a per-year speech
//! metric (sentiment score or spoken word count) fetched from an HTTP
//! endpoint. A year slider drives re-fetch and re-render; terminal resize
//! re-derives the projection and redraws geometry without re-fetching.
//! Countries without a metric entry render a fixed grey fill.
//!
//! The binary wires these modules into a ratatui event loop; the library
//! target exists so tests and benches can reach them.

pub mod app;
pub mod client;
pub mod data;
pub mod halfblock;
pub mod map;
pub mod models;
pub mod scale;
pub mod slider;
pub mod ui;
