//! Map grid geometry - offset hex rows with optional wrap-around
//!
//! Cells are stored row-major. Odd rows are shifted half a cell to the right,
//! so distances are computed in axial hex space after converting the offset
//! coordinates.

use serde::{Deserialize, Serialize};

use crate::core::types::CellIndex;

/// Column/row coordinate of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to axial coordinates (q, r)
    pub fn to_axial(&self) -> (i32, i32) {
        (self.x - self.y.div_euclid(2), self.y)
    }

    /// Convert back from axial coordinates
    pub fn from_axial(q: i32, r: i32) -> Self {
        Self::new(q + r.div_euclid(2), r)
    }
}

/// Dimensions and topology of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDims {
    pub width: i32,
    pub height: i32,
    pub wrap_x: bool,
    pub wrap_y: bool,
}

impl MapDims {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            wrap_x: false,
            wrap_y: false,
        }
    }

    pub fn with_wrap(mut self, wrap_x: bool, wrap_y: bool) -> Self {
        self.wrap_x = wrap_x;
        self.wrap_y = wrap_y;
        self
    }

    pub fn num_cells(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Normalize a coordinate, wrapping where the topology allows it
    pub fn normalize(&self, coord: GridCoord) -> Option<GridCoord> {
        let x = if self.wrap_x && self.width > 0 {
            coord.x.rem_euclid(self.width)
        } else {
            coord.x
        };
        let y = if self.wrap_y && self.height > 0 {
            coord.y.rem_euclid(self.height)
        } else {
            coord.y
        };

        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            None
        } else {
            Some(GridCoord::new(x, y))
        }
    }

    /// Cell index for a coordinate (wrap-aware)
    pub fn index_of(&self, coord: GridCoord) -> Option<CellIndex> {
        self.normalize(coord)
            .map(|c| (c.y as usize) * (self.width as usize) + c.x as usize)
    }

    /// Coordinate of a cell index
    pub fn coord_of(&self, index: CellIndex) -> Option<GridCoord> {
        if index >= self.num_cells() {
            return None;
        }
        let w = self.width as usize;
        Some(GridCoord::new((index % w) as i32, (index / w) as i32))
    }

    /// Shortest signed delta along x, honouring wrap
    pub fn wrap_dx(&self, dx: i32) -> i32 {
        wrap_delta(dx, self.width, self.wrap_x)
    }

    /// Shortest signed delta along y, honouring wrap
    pub fn wrap_dy(&self, dy: i32) -> i32 {
        wrap_delta(dy, self.height, self.wrap_y)
    }

    /// Distance in hex steps between two cells
    pub fn plot_distance(&self, a: GridCoord, b: GridCoord) -> i32 {
        let (aq, ar) = a.to_axial();
        let (bq, br) = b.to_axial();

        let dr = self.wrap_dy(br - ar);
        let dq = self.wrap_dx(bq - aq);

        if (dq >= 0) == (dr >= 0) {
            dq.abs() + dr.abs()
        } else {
            dq.abs().max(dr.abs())
        }
    }

    /// The up to 6 adjacent cells that exist on this map
    pub fn neighbors(&self, coord: GridCoord) -> Vec<GridCoord> {
        let (q, r) = coord.to_axial();
        [
            (q + 1, r),
            (q + 1, r - 1),
            (q, r - 1),
            (q - 1, r),
            (q - 1, r + 1),
            (q, r + 1),
        ]
        .into_iter()
        .filter_map(|(nq, nr)| self.normalize(GridCoord::from_axial(nq, nr)))
        .collect()
    }
}

fn wrap_delta(delta: i32, size: i32, wrap: bool) -> i32 {
    if !wrap || size <= 0 {
        return delta;
    }
    let mut d = delta.rem_euclid(size);
    if d > size / 2 {
        d -= size;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axial_round_trip() {
        for y in -3..4 {
            for x in -3..4 {
                let c = GridCoord::new(x, y);
                let (q, r) = c.to_axial();
                assert_eq!(GridCoord::from_axial(q, r), c);
            }
        }
    }

    #[test]
    fn test_plot_distance_straight_lines() {
        let dims = MapDims::new(20, 20);
        assert_eq!(dims.plot_distance(GridCoord::new(2, 2), GridCoord::new(2, 2)), 0);
        assert_eq!(dims.plot_distance(GridCoord::new(0, 0), GridCoord::new(5, 0)), 5);
        assert_eq!(dims.plot_distance(GridCoord::new(0, 0), GridCoord::new(0, 4)), 4);
        // diagonal steps along the shifted rows are free in x
        assert_eq!(dims.plot_distance(GridCoord::new(0, 0), GridCoord::new(1, 2)), 2);
    }

    #[test]
    fn test_neighbors_are_one_step_away() {
        let dims = MapDims::new(10, 10);
        for y in 1..9 {
            let c = GridCoord::new(4, y);
            let n = dims.neighbors(c);
            assert_eq!(n.len(), 6);
            for nc in n {
                assert_eq!(dims.plot_distance(c, nc), 1);
            }
        }
    }

    #[test]
    fn test_wrap_x_shortens_distance() {
        let flat = MapDims::new(20, 10);
        let wrapped = MapDims::new(20, 10).with_wrap(true, false);
        let a = GridCoord::new(0, 4);
        let b = GridCoord::new(19, 4);
        assert_eq!(flat.plot_distance(a, b), 19);
        assert_eq!(wrapped.plot_distance(a, b), 1);
        assert_eq!(wrapped.index_of(GridCoord::new(20, 4)), wrapped.index_of(a));
        assert_eq!(flat.index_of(GridCoord::new(20, 4)), None);
    }

    #[test]
    fn test_corner_has_fewer_neighbors() {
        let dims = MapDims::new(10, 10);
        assert!(dims.neighbors(GridCoord::new(0, 0)).len() < 6);
    }
}
