//! Connected-component labeling over the edge grid.
//!
//! Classic two-pass scheme: a causal-neighborhood scan assigns provisional
//! ids and records equivalences in a union-find arena, a second scan
//! resolves every pixel to its canonical id and collects per-component
//! pixel lists.

use log::debug;

use crate::grid::{EdgeGrid, Pixel};

/// Provisional component ids per pixel; 0 is background.
#[derive(Clone, Debug)]
pub struct LabelGrid {
    width: usize,
    height: usize,
    ids: Vec<u32>,
}

impl LabelGrid {
    fn new(height: usize, width: usize) -> Self {
        Self {
            width,
            height,
            ids: vec![0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.ids[row * self.width + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, id: u32) {
        self.ids[row * self.width + col] = id;
    }
}

/// Equivalence classes over component ids, rooted at the smallest id.
///
/// Index 0 is the background sentinel and never participates in a merge.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self { parent: vec![0] }
    }

    /// Mint the next id, its own root.
    fn push(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    /// Number of ids minted (excluding the background sentinel).
    pub fn len(&self) -> usize {
        self.parent.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root of `id`'s class, compressing the walked path.
    pub fn find(&mut self, id: u32) -> u32 {
        let mut root = id;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = id;
        while cur != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Merge the classes of `a` and `b`; the smaller root wins.
    pub fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else {
            self.parent[ra as usize] = rb;
        }
    }

    /// Re-point every id directly at its root.
    ///
    /// Afterwards every lookup is a single hop: roots are self-parented
    /// and each non-root holds a strictly smaller root. Idempotent.
    pub fn compress(&mut self) {
        for id in 1..self.parent.len() as u32 {
            let root = self.find(id);
            self.parent[id as usize] = root;
        }
    }

    /// One-hop canonical id. Only valid after [`UnionFind::compress`];
    /// a deeper chain indicates a labeling defect.
    #[inline]
    pub fn canonical(&self, id: u32) -> u32 {
        let parent = self.parent[id as usize];
        debug_assert_eq!(
            self.parent[parent as usize], parent,
            "id {id} resolves through more than one hop"
        );
        parent
    }

    /// True if `id` is the representative of its class.
    #[inline]
    pub fn is_root(&self, id: u32) -> bool {
        self.parent[id as usize] == id
    }

    #[cfg(test)]
    fn parent_of(&self, id: u32) -> u32 {
        self.parent[id as usize]
    }
}

impl Default for UnionFind {
    fn default() -> Self {
        Self::new()
    }
}

/// First pass: assign provisional ids and record equivalences.
///
/// Row-major scan over the interior (the outer ring is guaranteed
/// background). For each edge pixel the causal 4-neighborhood is
/// inspected:
///
/// ```text
/// NW N NE
///  W X .
///  .  . .
/// ```
///
/// No labeled neighbor mints a fresh id; the first labeled neighbor is
/// inherited and any further distinct neighbor ids are merged with it.
pub fn label(grid: &EdgeGrid) -> (LabelGrid, UnionFind) {
    let mut labels = LabelGrid::new(grid.height(), grid.width());
    let mut classes = UnionFind::new();

    if grid.height() < 3 || grid.width() < 3 {
        return (labels, classes);
    }

    for row in 1..grid.height() - 1 {
        for col in 1..grid.width() - 1 {
            if !grid.get(row, col) {
                continue;
            }

            let neighbors = [
                labels.get(row - 1, col - 1),
                labels.get(row - 1, col),
                labels.get(row - 1, col + 1),
                labels.get(row, col - 1),
            ];

            let mut id = 0;
            for n in neighbors {
                if n == 0 {
                    continue;
                }
                if id == 0 {
                    id = n;
                } else if n != id {
                    classes.union(id, n);
                }
            }

            if id == 0 {
                id = classes.push();
            }
            labels.set(row, col, id);
        }
    }

    debug!("labeling minted {} provisional ids", classes.len());
    (labels, classes)
}

/// Second pass: canonicalize every labeled pixel and collect components.
///
/// Components come back ordered by ascending canonical id, which equals
/// the order each component first appears in the row-major scan; pixel
/// lists keep scan order.
pub fn component_table(labels: &LabelGrid, classes: &UnionFind) -> Vec<Vec<Pixel>> {
    let mut slot = vec![usize::MAX; classes.len() + 1];
    let mut components: Vec<Vec<Pixel>> = Vec::new();

    for row in 0..labels.height {
        for col in 0..labels.width {
            let id = labels.get(row, col);
            if id == 0 {
                continue;
            }
            let root = classes.canonical(id) as usize;
            if slot[root] == usize::MAX {
                slot[root] = components.len();
                components.push(Vec::new());
            }
            components[slot[root]].push(Pixel::new(row, col));
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_ascii(rows: &[&str]) -> EdgeGrid {
        let height = rows.len();
        let width = rows[0].len();
        EdgeGrid::from_fn(height, width, |r, c| {
            rows[r].as_bytes()[c] != b'.'
        })
    }

    #[test]
    fn single_pixel_single_component() {
        let grid = grid_from_ascii(&[
            ".....",
            "..#..",
            ".....",
        ]);
        let (labels, mut classes) = label(&grid);
        classes.compress();
        assert_eq!(1, classes.len());
        let components = component_table(&labels, &classes);
        assert_eq!(1, components.len());
        assert_eq!(vec![Pixel::new(1, 2)], components[0]);
    }

    #[test]
    fn diagonal_neighbors_share_a_component() {
        let grid = grid_from_ascii(&[
            ".....",
            ".#...",
            "..#..",
            "...#.",
            ".....",
        ]);
        let (labels, mut classes) = label(&grid);
        classes.compress();
        let components = component_table(&labels, &classes);
        assert_eq!(1, components.len());
        assert_eq!(3, components[0].len());
    }

    #[test]
    fn disjoint_segments_get_distinct_components() {
        let grid = grid_from_ascii(&[
            ".......",
            ".##....",
            ".......",
            "....##.",
            ".......",
        ]);
        let (labels, mut classes) = label(&grid);
        classes.compress();
        let components = component_table(&labels, &classes);
        assert_eq!(2, components.len());
        // First-appearance order.
        assert_eq!(Pixel::new(1, 1), components[0][0]);
        assert_eq!(Pixel::new(3, 4), components[1][0]);
    }

    // A V shape labels its two arms separately before the apex merges
    // them; the merge must collapse to the smaller id.
    #[test]
    fn v_shape_merges_to_smallest_id() {
        let grid = grid_from_ascii(&[
            ".......",
            ".#...#.",
            "..#.#..",
            "...#...",
            ".......",
        ]);
        let (labels, mut classes) = label(&grid);
        classes.compress();
        let components = component_table(&labels, &classes);
        assert_eq!(1, components.len());
        assert_eq!(5, components[0].len());
        // Every labeled pixel resolves to id 1.
        for p in &components[0] {
            assert_eq!(1, classes.canonical(labels.get(p.row, p.col)));
        }
    }

    // Indirect equivalence: 1~3 and 2~4 recorded first, 1~2 later. All
    // four ids must land in one class rooted at 1.
    #[test]
    fn transitive_merges_propagate() {
        let mut classes = UnionFind::new();
        for _ in 0..4 {
            classes.push();
        }
        classes.union(1, 3);
        classes.union(2, 4);
        classes.union(1, 2);
        classes.compress();
        for id in 1..=4 {
            assert_eq!(1, classes.canonical(id));
        }
    }

    #[test]
    fn compress_is_idempotent() {
        let mut classes = UnionFind::new();
        for _ in 0..6 {
            classes.push();
        }
        classes.union(5, 6);
        classes.union(3, 5);
        classes.union(1, 3);
        classes.compress();
        let once = classes.clone();
        classes.compress();
        for id in 1..=6 {
            assert_eq!(once.canonical(id), classes.canonical(id));
            assert_eq!(once.parent_of(id), classes.parent_of(id));
        }
    }

    #[test]
    fn compressed_forest_has_one_hop_links() {
        let mut classes = UnionFind::new();
        for _ in 0..5 {
            classes.push();
        }
        classes.union(2, 4);
        classes.union(4, 5);
        classes.compress();
        for id in 1..=5 {
            let parent = classes.parent_of(id);
            if classes.is_root(id) {
                assert_eq!(id, parent);
            } else {
                assert!(parent < id, "non-root {id} must point to a smaller root");
                assert!(classes.is_root(parent));
            }
        }
    }

    #[test]
    fn empty_grid_yields_no_components() {
        let grid = EdgeGrid::new(4, 4);
        let (labels, mut classes) = label(&grid);
        classes.compress();
        assert!(classes.is_empty());
        assert!(component_table(&labels, &classes).is_empty());
    }
}
