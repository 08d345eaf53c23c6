//! Closest-point links between components and their minimum spanning tree.
//!
//! Every unordered component pair gets one candidate link: the closest
//! point pair between the two pixel sets, found by querying the target
//! component's kd-tree with every pixel of the source component. Prim's
//! algorithm then reduces the complete link graph to a spanning skeleton.

use kiddo::{KdTree, SquaredEuclidean};
use log::debug;
use rayon::prelude::*;

use crate::error::IndexError;
use crate::grid::Pixel;

/// Nearest-neighbor index over one component's pixels.
///
/// The pipeline only relies on the query contract: nearest indexed pixel
/// to a query point, with its distance. An empty answer for a non-empty
/// query is a fatal [`IndexError`].
pub struct ComponentIndex {
    pixels: Vec<Pixel>,
    tree: KdTree<f32, 2>,
}

impl ComponentIndex {
    /// Index a component's pixel list.
    pub fn build(pixels: &[Pixel]) -> Result<Self, IndexError> {
        if pixels.is_empty() {
            return Err(IndexError::EmptyComponent);
        }
        let coords = pixels
            .iter()
            .map(|p| [p.row as f32, p.col as f32])
            .collect::<Vec<_>>();
        let tree: KdTree<f32, 2> = (&coords).into();
        Ok(Self {
            pixels: pixels.to_vec(),
            tree,
        })
    }

    /// Closest indexed pixel to `query` and its Euclidean distance.
    pub fn nearest(&self, query: Pixel) -> Result<(Pixel, f32), IndexError> {
        let nn = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.row as f32, query.col as f32]);
        let found = self
            .pixels
            .get(nn.item as usize)
            .copied()
            .ok_or(IndexError::NoNeighbor)?;
        Ok((found, nn.distance.sqrt()))
    }
}

/// A closest-point connection between two components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    /// Closest pixel in the source component.
    pub a: Pixel,
    /// Closest pixel in the target component.
    pub b: Pixel,
    /// Euclidean distance between the two.
    pub distance: f32,
}

impl Link {
    fn reversed(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            distance: self.distance,
        }
    }
}

/// Symmetric matrix of candidate links; `adjacency[i][j].a` lies in
/// component `i`, `.b` in component `j`.
pub type Adjacency = Vec<Vec<Option<Link>>>;

/// Build one index per component.
pub fn build_indexes(components: &[Vec<Pixel>]) -> Result<Vec<ComponentIndex>, IndexError> {
    components
        .iter()
        .map(|pixels| ComponentIndex::build(pixels))
        .collect()
}

/// Closest point pair from `from`'s pixels into `index`.
///
/// Pixels are tried in component order and only a strictly smaller
/// distance replaces the running best, so the first-encountered minimum
/// wins ties.
fn closest_pair(from: &[Pixel], index: &ComponentIndex) -> Result<Link, IndexError> {
    let mut best: Option<Link> = None;
    for &p in from {
        let (q, distance) = index.nearest(p)?;
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Link { a: p, b: q, distance });
        }
    }
    best.ok_or(IndexError::NoNeighbor)
}

/// Closest links for every unordered component pair.
///
/// Pair queries are independent and run in parallel; results are written
/// into the matrix in ascending (i, j) order so downstream tie-breaks see
/// a deterministic structure regardless of completion order.
pub fn closest_links(
    components: &[Vec<Pixel>],
    indexes: &[ComponentIndex],
) -> Result<Adjacency, IndexError> {
    let n = components.len();
    let pairs = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect::<Vec<_>>();

    let found: Vec<Result<Link, IndexError>> = pairs
        .par_iter()
        .map(|&(i, j)| closest_pair(&components[i], &indexes[j]))
        .collect();

    let mut adjacency: Adjacency = vec![vec![None; n]; n];
    for (&(i, j), link) in pairs.iter().zip(found) {
        let link = link?;
        adjacency[i][j] = Some(link);
        adjacency[j][i] = Some(link.reversed());
    }
    Ok(adjacency)
}

/// Prim's minimum spanning tree over the candidate links, rooted at
/// component 0.
///
/// Each round scans visited components in ascending order and, inside,
/// unvisited components in ascending order; only a strictly smaller
/// distance replaces the candidate. The first-encountered minimum winning
/// ties makes the output reproducible, though not globally optimal when
/// ties exist; downstream output depends on this exact scan order.
pub fn spanning_tree(adjacency: &Adjacency) -> Vec<Link> {
    let n = adjacency.len();
    if n < 2 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    visited[0] = true;
    let mut edges: Vec<Link> = Vec::with_capacity(n - 1);

    while edges.len() < n - 1 {
        let mut best: Option<(usize, Link)> = None;
        for i in 0..n {
            if !visited[i] {
                continue;
            }
            for j in 0..n {
                if visited[j] {
                    continue;
                }
                let Some(link) = adjacency[i][j] else { continue };
                if best.is_none_or(|(_, b)| link.distance < b.distance) {
                    best = Some((j, link));
                }
            }
        }

        // A complete link graph always exposes a crossing edge.
        let (next, link) = best.expect("spanning-tree cut has no candidate link");
        edges.push(link);
        visited[next] = true;
    }

    let total: f32 = edges.iter().map(|e| e.distance).sum();
    debug!("spanning tree: {} edges, total length {total:.2}", edges.len());
    edges
}
