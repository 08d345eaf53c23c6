//! Error types for the tracing pipeline.

/// Failures of the nearest-neighbor index collaborator.
///
/// The index is a blocking, in-memory dependency: any failure is fatal to
/// the run and is never retried.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("cannot build a spatial index over an empty component")]
    EmptyComponent,
    #[error("spatial index returned no neighbor for a non-empty query")]
    NoNeighbor,
}

/// Errors surfaced by the grid-to-track pipeline.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    /// The grid holds no edge pixels; there is nothing to draw.
    #[error("grid has no edge pixels")]
    NoEdgePixels,

    /// Linking and rasterization left the grid in more than one region.
    ///
    /// Detected by comparing the traversal's visited count against the
    /// grid's edge-pixel count; surfaced instead of silently truncating
    /// the track.
    #[error("grid is not fully connected after linking ({visited} of {total} pixels reachable)")]
    Disconnected { visited: usize, total: usize },

    #[error(transparent)]
    Index(#[from] IndexError),
}
