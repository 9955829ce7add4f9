//! Triangle indices for drawing a grid as a surface.
//!
//! Presentation layers upload [`ClothGrid::positions`](crate::ClothGrid::positions)
//! as a vertex buffer each frame; the index buffer only depends on the grid
//! dimensions and can be built once.

use alloc::vec::Vec as AllocVec;

/// Number of triangles covering a `width` x `height` grid (two per cell).
pub fn triangle_count(width: usize, height: usize) -> usize {
    2 * width.saturating_sub(1) * height.saturating_sub(1)
}

/// Index list, three entries per triangle, into `x + y * width` node order.
///
/// Each cell with top-left node `i` is split along its `i`..`i + width + 1`
/// diagonal into `(i, i+width+1, i+width)` and `(i, i+1, i+width+1)`.
pub fn triangle_indices(width: usize, height: usize) -> AllocVec<u32> {
    let mut indices = AllocVec::with_capacity(3 * triangle_count(width, height));
    for x in 0..width.saturating_sub(1) {
        for y in 0..height.saturating_sub(1) {
            let i = (x + y * width) as u32;
            let below = i + width as u32;
            indices.extend_from_slice(&[i, below + 1, below, i, i + 1, below + 1]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell() {
        assert_eq!(triangle_indices(2, 2), [0u32, 3, 2, 0, 1, 3]);
    }

    #[test]
    fn degenerate_grids_have_no_triangles() {
        assert!(triangle_indices(1, 5).is_empty());
        assert!(triangle_indices(4, 1).is_empty());
        assert_eq!(triangle_count(0, 0), 0);
    }

    #[test]
    fn indices_stay_in_range() {
        let (w, h) = (5, 4);
        let indices = triangle_indices(w, h);
        assert_eq!(indices.len(), 3 * triangle_count(w, h));
        assert!(indices.iter().all(|&i| (i as usize) < w * h));
    }
}
