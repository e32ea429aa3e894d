//! Fetches OpenStreetMap features around a point from the Overpass API,
//! clips them to a square bounding box and renders a styled map.
//!
//! The steps are usable on their own: [`bbox::bounding_box`],
//! [`overpass::build_query`], [`overpass::Fetcher`],
//! [`features::convert_response`], [`features::clip_collection`] and
//! [`render::Renderer`]. [`pipeline::run`] chains them.

pub mod bbox;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod overpass;
pub mod pipeline;
pub mod render;
pub mod types;

pub use error::{MapError, Result};
