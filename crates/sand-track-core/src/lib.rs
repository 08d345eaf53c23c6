//! Edge-grid to single-stroke track conversion.
//!
//! This crate is the pure core of the pipeline: it takes a binary edge
//! grid and produces one continuous ordered coordinate track a plotter
//! can draw without lifting its implement. It does *not* load images,
//! detect edges or write files; those collaborators live in the
//! `sand-track` facade and CLI crates.

mod error;
mod grid;
mod label;
mod link;
mod logger;
mod path;
mod pipeline;
mod raster;

pub use error::{IndexError, TraceError};
pub use grid::{EdgeGrid, Pixel};
pub use label::{component_table, label, LabelGrid, UnionFind};
pub use link::{build_indexes, closest_links, spanning_tree, Adjacency, ComponentIndex, Link};
pub use path::{build_tree, find_start, linearize, sort_by_farthest_leaf, PixelTree, TreeNode};
pub use pipeline::{trace, TraceResult, TraceSummary};
pub use raster::draw_links;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
