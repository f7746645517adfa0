//! Rectangular grid layouts: rows × cols square rooms, doors on shared walls.

use wayfinder_logic::cognitive::CognitiveMap;
use wayfinder_logic::error::NavError;
use wayfinder_logic::geometry::{ConvexPolygon, Segment, Vec2};
use wayfinder_logic::graph::{NavGraph, PassageId, RoomId};

/// Cell coordinates `(col, row)`.
pub type Cell = (u32, u32);

/// Grid of square rooms. Room ids are assigned row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
    /// Side length of every room.
    pub cell: f64,
    /// Width of each door opening, centred on the shared wall.
    pub door_width: f64,
}

impl GridLayout {
    pub fn new(cols: u32, rows: u32, cell: f64) -> Self {
        Self {
            cols,
            rows,
            cell,
            door_width: cell * 0.2,
        }
    }

    pub fn room(&self, (col, row): Cell) -> RoomId {
        RoomId(row * self.cols + col)
    }

    pub fn centre(&self, (col, row): Cell) -> Vec2 {
        Vec2::new(
            (col as f64 + 0.5) * self.cell,
            (row as f64 + 0.5) * self.cell,
        )
    }

    fn region(&self, (col, row): Cell) -> Option<ConvexPolygon> {
        ConvexPolygon::rect(
            col as f64 * self.cell,
            row as f64 * self.cell,
            self.cell,
            self.cell,
        )
    }

    /// All rooms, no doors.
    pub fn rooms(&self) -> Result<NavGraph, NavError> {
        let mut g = NavGraph::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                g.add_rect_room(
                    col as f64 * self.cell,
                    row as f64 * self.cell,
                    self.cell,
                    self.cell,
                )?;
            }
        }
        Ok(g)
    }

    /// Two-way door between orthogonally adjacent cells.
    pub fn open(
        &self,
        g: &mut NavGraph,
        a: Cell,
        b: Cell,
    ) -> Result<(PassageId, PassageId), NavError> {
        let (lo, hi) = if (a.1, a.0) <= (b.1, b.0) { (a, b) } else { (b, a) };
        let half = self.door_width / 2.0;
        let seg = if lo.1 == hi.1 && hi.0 == lo.0 + 1 {
            let x = hi.0 as f64 * self.cell;
            let mid = (lo.1 as f64 + 0.5) * self.cell;
            Segment::new(Vec2::new(x, mid - half), Vec2::new(x, mid + half))
        } else if lo.0 == hi.0 && hi.1 == lo.1 + 1 {
            let y = hi.1 as f64 * self.cell;
            let mid = (lo.0 as f64 + 0.5) * self.cell;
            Segment::new(Vec2::new(mid - half, y), Vec2::new(mid + half, y))
        } else {
            return Err(NavError::InvalidConfig(format!(
                "cells {:?} and {:?} are not adjacent",
                a, b
            )));
        };
        g.connect_both(self.room(a), self.room(b), seg)
    }

    /// Every neighbouring pair connected.
    pub fn open_grid(&self) -> Result<NavGraph, NavError> {
        let mut g = self.rooms()?;
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col + 1 < self.cols {
                    self.open(&mut g, (col, row), (col + 1, row))?;
                }
                if row + 1 < self.rows {
                    self.open(&mut g, (col, row), (col, row + 1))?;
                }
            }
        }
        Ok(g)
    }

    /// Boustrophedon order: left to right on even rows, back on odd ones.
    pub fn serpentine_order(&self) -> Vec<Cell> {
        (0..self.rows)
            .flat_map(|row| {
                let cols: Vec<u32> = if row % 2 == 0 {
                    (0..self.cols).collect()
                } else {
                    (0..self.cols).rev().collect()
                };
                cols.into_iter().map(move |col| (col, row))
            })
            .collect()
    }

    /// A single corridor snaking through every cell.
    pub fn serpentine(&self) -> Result<NavGraph, NavError> {
        let mut g = self.rooms()?;
        for pair in self.serpentine_order().windows(2) {
            self.open(&mut g, pair[0], pair[1])?;
        }
        Ok(g)
    }

    /// Cognitive map with one landmark per cell of `cells`, linked in order.
    pub fn chain_map(&self, cells: &[Cell]) -> Result<CognitiveMap, NavError> {
        let mut map = CognitiveMap::new();
        let mut prev = None;
        for &cell in cells {
            let region = self
                .region(cell)
                .ok_or_else(|| NavError::InvalidConfig(format!("empty cell {:?}", cell)))?;
            let id = map.add_landmark(region);
            if let Some(p) = prev {
                map.connect(p, id)?;
            }
            prev = Some(id);
        }
        Ok(map)
    }
}
