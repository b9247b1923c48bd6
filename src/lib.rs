//! HeatAtlas - data core for an urban heat-vulnerability map explorer
//!
//! This library provides the data acquisition, correlation, caching and
//! navigation logic behind a 3D map that drills down from a capital region
//! to postal-code areas to individual buildings, joining municipal building
//! registries with heat-exposure analytics, vegetation and sensor feeds.
//!
//! # High-Level Flow
//!
//! ```ignore
//! use heatatlas::navigation::{Navigator, ViewToggles};
//!
//! // A pick on the map resolves to a postal code; the navigator clears
//! // stale layers, loads and correlates the area datasets, and returns
//! // the aggregate summary for chart consumers.
//! let summary = navigator.select_postal_code("00100", ViewToggles::default()).await;
//! ```
//!
//! Rendering, charts and UI wiring are external collaborators: the map is
//! reached only through the [`layers::MapSurface`] seam, and chart widgets
//! receive plain [`aggregate::AggregateSummary`] values.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod correlate;
pub mod feature;
pub mod layers;
pub mod loader;
pub mod logging;
pub mod navigation;
pub mod source;
pub mod style;

/// Version of the HeatAtlas library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
