//! Edge Clipping and Cell Closure
//!
//! After the sweep, edges can be unbounded (missing an endpoint) or run
//! outside the bounding box. Connection extends unbounded edges to the box,
//! Liang-Barsky clipping trims the rest, and closure walks each cell's
//! boundary inserting border edges along the box sides until the polygon
//! is a closed ring.

use crate::error::{Result, VoronoiError};
use crate::geometry::{EdgeId, EdgeKind, HalfEdge, PointId};

use super::sweep::Sweep;
use super::{equal_with_epsilon, greater_than_with_epsilon, less_than_with_epsilon, EPSILON};

impl Sweep {
    /// Connect and clip every edge against the bounding box
    ///
    /// Edges that end up fully outside the box, or collapse to a point, are
    /// removed by clearing both endpoints. They stay in the arena so edge
    /// IDs held by half-edges remain valid.
    pub(super) fn clip_edges(&mut self) {
        for index in (0..self.diagram.edges.len()).rev() {
            let edge = EdgeId(index as u32);
            let keep =
                self.connect_edge(edge) && self.clip_edge(edge) && !self.is_point_like(edge);
            if !keep {
                self.diagram.set_vertex_a(edge, None);
                self.diagram.set_vertex_b(edge, None);
            }
        }
    }

    /// Extend an unbounded edge until it leaves the bounding box
    ///
    /// Returns false when the edge cannot intersect the box at all.
    fn connect_edge(&mut self, id: EdgeId) -> bool {
        let (vertex_a, left, right) = {
            let e = self.diagram.edge(id);
            if e.vertex_b().is_some() {
                return true;
            }
            let Some(right) = e.site_right() else {
                return false;
            };
            (e.vertex_a(), e.site_left(), right)
        };
        let l = self.diagram.point(left).position();
        let r = self.diagram.point(right).position();
        let (xl, xr, yt, yb) = (self.xl, self.xr, self.yt, self.yb);

        // the edge lies on the perpendicular bisector of the two sites,
        // through the midpoint
        let fx = (l.x + r.x) / 2.0;
        let fy = (l.y + r.y) / 2.0;

        let va_pos = vertex_a.map(|a| self.diagram.point(a).position());

        if r.y - l.y != 0.0 {
            let fm = (l.x - r.x) / (r.y - l.y);
            let fb = fy - fm * fx;

            if !(-1.0..=1.0).contains(&fm) {
                // steeper than 45 degrees: leaves through top or bottom
                if l.x > r.x {
                    // pointing downward
                    match va_pos {
                        None => {
                            let v = self.create_vertex((yt - fb) / fm, yt);
                            self.diagram.set_vertex_a(id, Some(v));
                        }
                        Some(a) if a.y >= yb => return false,
                        Some(_) => {}
                    }
                    let v = self.create_vertex((yb - fb) / fm, yb);
                    self.diagram.set_vertex_b(id, Some(v));
                } else {
                    // pointing upward
                    match va_pos {
                        None => {
                            let v = self.create_vertex((yb - fb) / fm, yb);
                            self.diagram.set_vertex_a(id, Some(v));
                        }
                        Some(a) if a.y < yt => return false,
                        Some(_) => {}
                    }
                    let v = self.create_vertex((yt - fb) / fm, yt);
                    self.diagram.set_vertex_b(id, Some(v));
                }
            } else {
                // shallow: leaves through left or right
                if l.y < r.y {
                    // pointing rightward
                    match va_pos {
                        None => {
                            let v = self.create_vertex(xl, fm * xl + fb);
                            self.diagram.set_vertex_a(id, Some(v));
                        }
                        Some(a) if a.x >= xr => return false,
                        Some(_) => {}
                    }
                    let v = self.create_vertex(xr, fm * xr + fb);
                    self.diagram.set_vertex_b(id, Some(v));
                } else {
                    // pointing leftward
                    match va_pos {
                        None => {
                            let v = self.create_vertex(xr, fm * xr + fb);
                            self.diagram.set_vertex_a(id, Some(v));
                        }
                        Some(a) if a.x < xl => return false,
                        Some(_) => {}
                    }
                    let v = self.create_vertex(xl, fm * xl + fb);
                    self.diagram.set_vertex_b(id, Some(v));
                }
            }
        } else {
            // sites share a y: the bisector is vertical
            if fx < xl || fx >= xr {
                return false;
            }
            if l.x > r.x {
                match va_pos {
                    None => {
                        let v = self.create_vertex(fx, yt);
                        self.diagram.set_vertex_a(id, Some(v));
                    }
                    Some(a) if a.y >= yb => return false,
                    Some(_) => {}
                }
                let v = self.create_vertex(fx, yb);
                self.diagram.set_vertex_b(id, Some(v));
            } else {
                match va_pos {
                    None => {
                        let v = self.create_vertex(fx, yb);
                        self.diagram.set_vertex_a(id, Some(v));
                    }
                    Some(a) if a.y < yt => return false,
                    Some(_) => {}
                }
                let v = self.create_vertex(fx, yt);
                self.diagram.set_vertex_b(id, Some(v));
            }
        }

        // at least one endpoint now sits on the box
        self.diagram.set_edge_kind(id, EdgeKind::Outer);
        true
    }

    /// Liang-Barsky clip of a finite edge against the bounding box
    ///
    /// Returns false when the edge lies entirely outside.
    fn clip_edge(&mut self, id: EdgeId) -> bool {
        let (a, b) = {
            let e = self.diagram.edge(id);
            let (Some(va), Some(vb)) = (e.vertex_a(), e.vertex_b()) else {
                return false;
            };
            (
                self.diagram.point(va).position(),
                self.diagram.point(vb).position(),
            )
        };

        let mut t0 = 0.0;
        let mut t1 = 1.0;
        let dx = b.x - a.x;
        let dy = b.y - a.y;

        // left
        let q = a.x - self.xl;
        if dx == 0.0 && q < 0.0 {
            return false;
        }
        if dx != 0.0 {
            let r = -q / dx;
            if dx < 0.0 {
                if r < t0 {
                    return false;
                } else if r < t1 {
                    t1 = r;
                }
            } else if r > t1 {
                return false;
            } else if r > t0 {
                t0 = r;
            }
        }

        // right
        let q = self.xr - a.x;
        if dx == 0.0 && q < 0.0 {
            return false;
        }
        if dx != 0.0 {
            let r = q / dx;
            if dx < 0.0 {
                if r > t1 {
                    return false;
                } else if r > t0 {
                    t0 = r;
                }
            } else if r < t0 {
                return false;
            } else if r < t1 {
                t1 = r;
            }
        }

        // top
        let q = a.y - self.yt;
        if dy == 0.0 && q < 0.0 {
            return false;
        }
        if dy != 0.0 {
            let r = -q / dy;
            if dy < 0.0 {
                if r < t0 {
                    return false;
                } else if r < t1 {
                    t1 = r;
                }
            } else if r > t1 {
                return false;
            } else if r > t0 {
                t0 = r;
            }
        }

        // bottom
        let q = self.yb - a.y;
        if dy == 0.0 && q < 0.0 {
            return false;
        }
        if dy != 0.0 {
            let r = q / dy;
            if dy < 0.0 {
                if r > t1 {
                    return false;
                } else if r > t0 {
                    t0 = r;
                }
            } else if r < t0 {
                return false;
            } else if r < t1 {
                t1 = r;
            }
        }

        if t0 > 0.0 {
            let v = self.create_vertex(a.x + t0 * dx, a.y + t0 * dy);
            self.diagram.set_vertex_a(id, Some(v));
            self.diagram.set_edge_kind(id, EdgeKind::Outer);
        }
        if t1 < 1.0 {
            let v = self.create_vertex(a.x + t1 * dx, a.y + t1 * dy);
            self.diagram.set_vertex_b(id, Some(v));
            self.diagram.set_edge_kind(id, EdgeKind::Outer);
        }
        true
    }

    /// Whether clipping left the edge shorter than the epsilon in both axes
    fn is_point_like(&self, id: EdgeId) -> bool {
        let e = self.diagram.edge(id);
        let (Some(va), Some(vb)) = (e.vertex_a(), e.vertex_b()) else {
            return true;
        };
        let a = self.diagram.point(va).position();
        let b = self.diagram.point(vb).position();
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    /// Close every cell's boundary along the bounding box
    ///
    /// Walks each cell's angle-sorted half-edges; wherever one half-edge's
    /// end does not meet the next one's start, the gap lies on the box and
    /// gets filled with border edges, corner by corner, walking the sides
    /// counterclockwise.
    pub(super) fn close_cells(&mut self) -> Result<()> {
        let (xl, xr, yt, yb) = (self.xl, self.xr, self.yt, self.yb);
        let ids: Vec<u32> = self.diagram.cells.keys().rev().copied().collect();

        for id in ids {
            // prune and sort, then take the walk list out of the cell so
            // border edges and vertices can be created while walking
            let (site, mut half_edges) = {
                let diagram = &mut self.diagram;
                let Some(cell) = diagram.cells.get_mut(&id) else {
                    continue;
                };
                cell.prepare_half_edges(&diagram.edges);
                (cell.site(), std::mem::take(&mut cell.half_edges))
            };

            // a lone cell has no interior edges at all and owns the whole box
            if half_edges.is_empty() && self.diagram.cells.len() == 1 {
                self.close_single_cell(site, &mut half_edges)?;
            }

            let mut n = half_edges.len();
            let mut left = 0;
            while left < n {
                let right = (left + 1) % n;
                let end = half_edges[left]
                    .end_point(&self.diagram.edges)
                    .ok_or_else(|| missing_endpoint(id))?;
                let start = half_edges[right]
                    .start_point(&self.diagram.edges)
                    .ok_or_else(|| missing_endpoint(id))?;
                let end_pos = self.diagram.point(end).position();
                let start_pos = self.diagram.point(start).position();

                if (end_pos.x - start_pos.x).abs() >= EPSILON
                    || (end_pos.y - start_pos.y).abs() >= EPSILON
                {
                    // walk one box side toward the gap's start, stopping at
                    // the corner if the start lies on another side
                    let vertex_b = if equal_with_epsilon(end_pos.x, xl)
                        && less_than_with_epsilon(end_pos.y, yb)
                    {
                        // down the left side
                        let y = if equal_with_epsilon(start_pos.x, xl) {
                            start_pos.y
                        } else {
                            yb
                        };
                        Some(self.create_vertex(xl, y))
                    } else if equal_with_epsilon(end_pos.y, yb)
                        && less_than_with_epsilon(end_pos.x, xr)
                    {
                        // across the bottom side
                        let x = if equal_with_epsilon(start_pos.y, yb) {
                            start_pos.x
                        } else {
                            xr
                        };
                        Some(self.create_vertex(x, yb))
                    } else if equal_with_epsilon(end_pos.x, xr)
                        && greater_than_with_epsilon(end_pos.y, yt)
                    {
                        // up the right side
                        let y = if equal_with_epsilon(start_pos.x, xr) {
                            start_pos.y
                        } else {
                            yt
                        };
                        Some(self.create_vertex(xr, y))
                    } else if equal_with_epsilon(end_pos.y, yt)
                        && greater_than_with_epsilon(end_pos.x, xl)
                    {
                        // back across the top side
                        let x = if equal_with_epsilon(start_pos.y, yt) {
                            start_pos.x
                        } else {
                            xl
                        };
                        Some(self.create_vertex(x, yt))
                    } else {
                        None
                    };

                    let vertex_b = vertex_b.ok_or_else(|| {
                        VoronoiError::GenerationFailed(format!(
                            "cannot close cell {}: boundary gap off the bounding box",
                            id
                        ))
                    })?;

                    let edge = self.diagram.create_border_edge(site, end, vertex_b);
                    let he =
                        HalfEdge::border(edge, site, &self.diagram.points, &self.diagram.edges)
                            .ok_or_else(|| missing_endpoint(id))?;
                    half_edges.insert(left + 1, he);
                    n = half_edges.len();
                }

                if left > 100 {
                    let pos = self.diagram.point(site).position();
                    return Err(VoronoiError::GenerationFailed(format!(
                        "cannot close cell {} (seed {}, site at ({}, {}))",
                        id, self.seed, pos.x, pos.y
                    )));
                }
                left += 1;
            }

            if let Some(cell) = self.diagram.cells.get_mut(&id) {
                cell.half_edges = half_edges;
            }
        }
        Ok(())
    }

    /// Hand the whole bounding box to the only cell of the diagram
    fn close_single_cell(
        &mut self,
        site: PointId,
        half_edges: &mut Vec<HalfEdge>,
    ) -> Result<()> {
        let corners = [
            (self.xl, self.yt),
            (self.xl, self.yb),
            (self.xr, self.yb),
            (self.xr, self.yt),
        ];
        for i in 0..4 {
            let (ax, ay) = corners[i];
            let (bx, by) = corners[(i + 1) % 4];
            let va = self.create_vertex(ax, ay);
            let vb = self.create_vertex(bx, by);
            let edge = self.diagram.create_border_edge(site, va, vb);
            let he = HalfEdge::border(edge, site, &self.diagram.points, &self.diagram.edges)
                .ok_or_else(|| missing_endpoint(self.diagram.point(site).id))?;
            half_edges.push(he);
        }
        Ok(())
    }
}

fn missing_endpoint(cell: u32) -> VoronoiError {
    VoronoiError::GenerationFailed(format!(
        "half-edge of cell {} lost an endpoint during closure",
        cell
    ))
}
