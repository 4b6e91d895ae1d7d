//! chart-svg: SVG chart components with shared highlight, disable and
//! color state.
//!
//! Charts derive scales and geometry from their dataset plus a shared
//! [`ChartContext`], emit an [`render::SvgElement`] tree, and report a
//! [`api::ChartMetadata`] summary only when it changes.

pub mod api;
pub mod charts;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartContext, ChartRuntime};
pub use error::{ChartError, ChartResult};
