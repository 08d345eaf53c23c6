//! End-to-end composition: edge grid in, ordered track out.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::grid::{EdgeGrid, Pixel};
use crate::label::{component_table, label};
use crate::link::{build_indexes, closest_links, spanning_tree};
use crate::path::{build_tree, find_start, linearize, sort_by_farthest_leaf};
use crate::raster::draw_links;

/// Stage counters for reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Connected components before linking.
    pub component_count: usize,
    /// Spanning-tree links drawn; component_count − 1, or 0 when a single
    /// component needs no linking.
    pub link_count: usize,
    /// Sum of link lengths (new visible line added to the drawing).
    pub total_link_length: f32,
    /// Longest single link.
    pub max_link_length: f32,
    /// Edge pixels after rasterization.
    pub edge_pixels: usize,
    /// Coordinates in the emitted track.
    pub track_points: usize,
    /// Maximum depth of the traversal tree.
    pub tree_depth: u32,
}

/// Result of a full trace: the ordered track plus its stage counters.
#[derive(Clone, Debug)]
pub struct TraceResult {
    pub track: Vec<Pixel>,
    pub summary: TraceSummary,
}

/// Convert a binary edge grid into one continuous ordered track.
///
/// Stages: connected-component labeling, closest-point linking over a
/// spanning tree, link rasterization (the single in-place mutation of
/// `grid`), then spiral start selection, breadth-first tree construction
/// and depth-ordered linearization. A single component skips the linking
/// and rasterization stages entirely.
pub fn trace(grid: &mut EdgeGrid) -> Result<TraceResult, TraceError> {
    let (labels, mut classes) = label(grid);
    classes.compress();
    let components = component_table(&labels, &classes);
    if components.is_empty() {
        return Err(TraceError::NoEdgePixels);
    }
    info!("{} connected components", components.len());

    let mut link_count = 0;
    let mut total_link_length = 0.0f32;
    let mut max_link_length = 0.0f32;

    if components.len() > 1 {
        let indexes = build_indexes(&components)?;
        let adjacency = closest_links(&components, &indexes)?;
        let links = spanning_tree(&adjacency);

        link_count = links.len();
        total_link_length = links.iter().map(|l| l.distance).sum();
        max_link_length = links
            .iter()
            .map(|l| l.distance)
            .fold(0.0f32, f32::max);

        draw_links(grid, &links);
        info!("drew {link_count} links, total length {total_link_length:.2}");
    }

    let edge_pixels = grid.count_on();
    let start = find_start(grid).ok_or(TraceError::NoEdgePixels)?;

    let mut tree = build_tree(grid, start);
    if tree.len() != edge_pixels {
        return Err(TraceError::Disconnected {
            visited: tree.len(),
            total: edge_pixels,
        });
    }

    sort_by_farthest_leaf(&mut tree);
    let tree_depth = tree.max_depth();
    let track = linearize(&tree);
    info!(
        "track: {} points over {edge_pixels} edge pixels, tree depth {tree_depth}",
        track.len()
    );

    let summary = TraceSummary {
        component_count: components.len(),
        link_count,
        total_link_length,
        max_link_length,
        edge_pixels,
        track_points: track.len(),
        tree_depth,
    };

    Ok(TraceResult { track, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid_from_ascii(rows: &[&str]) -> EdgeGrid {
        EdgeGrid::from_fn(rows.len(), rows[0].len(), |r, c| {
            rows[r].as_bytes()[c] != b'.'
        })
    }

    #[test]
    fn empty_grid_is_a_degenerate_input() {
        let mut grid = EdgeGrid::new(5, 5);
        assert_eq!(Err(TraceError::NoEdgePixels), trace(&mut grid).map(|_| ()));
    }

    #[test]
    fn single_component_skips_linking() {
        let mut grid = grid_from_ascii(&[
            ".....",
            ".###.",
            ".....",
        ]);
        let result = trace(&mut grid).unwrap();
        assert_eq!(1, result.summary.component_count);
        assert_eq!(0, result.summary.link_count);
        assert_eq!(3, result.track.len());
        // Grid untouched: no links were drawn.
        assert_eq!(3, grid.count_on());
    }

    #[test]
    fn two_components_get_one_link() {
        let mut grid = grid_from_ascii(&[
            ".........",
            ".##...##.",
            ".........",
        ]);
        let result = trace(&mut grid).unwrap();
        assert_eq!(2, result.summary.component_count);
        assert_eq!(1, result.summary.link_count);
        assert!(result.summary.edge_pixels > 4);
        assert_eq!(result.summary.edge_pixels, result.track.len());
    }

    // Two disjoint 3-pixel diagonals two pixels apart in a 7x7 grid must
    // come back as one track: all originals covered, nothing visited
    // twice.
    #[test]
    fn two_diagonals_become_one_complete_track() {
        let mut grid = grid_from_ascii(&[
            ".......",
            "...#...",
            "..#....",
            ".#...#.",
            "....#..",
            "...#...",
            ".......",
        ]);

        let originals: HashSet<Pixel> = [(1, 3), (2, 2), (3, 1), (3, 5), (4, 4), (5, 3)]
            .iter()
            .map(|&(r, c)| Pixel::new(r, c))
            .collect();

        let result = trace(&mut grid).unwrap();
        assert_eq!(2, result.summary.component_count);
        assert_eq!(1, result.summary.link_count);

        let emitted: HashSet<Pixel> = result.track.iter().copied().collect();
        assert_eq!(emitted.len(), result.track.len(), "coordinate repeated");
        for p in &originals {
            assert!(emitted.contains(p), "original pixel {p:?} missing");
        }
        // The connecting pixel is covered too.
        assert_eq!(result.summary.edge_pixels, result.track.len());
        assert!(result.track.len() > originals.len());
    }

    #[test]
    fn summary_serializes() {
        let mut grid = grid_from_ascii(&[
            ".....",
            ".#.#.",
            ".....",
        ]);
        let result = trace(&mut grid).unwrap();
        let json = serde_json::to_string(&result.summary).unwrap();
        assert!(json.contains("\"component_count\":2"));
    }
}
