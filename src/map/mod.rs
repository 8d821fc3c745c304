//! Map rendering.
//!
//! This module provides the templated tile source and the marker layer drawn
//! on top of the `walkers` map widget.

pub mod layer;
pub mod tiles;

pub use layer::{MarkerLayer, MarkerLayerOutput};
pub use tiles::TemplateTileSource;
