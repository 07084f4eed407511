//! Fortune's Sweep
//!
//! Event-driven construction of the Voronoi diagram. The beachline is kept
//! in one red-black tree, pending circle events in another; `first_circle`
//! tracks the queue minimum so the event loop peeks in O(1).
//!
//! Site events are processed bottom-up (ascending y, then x). Ties between
//! a site event and a circle event go to the site when it is strictly
//! smaller, matching the ordering the circle queue itself uses.

use std::collections::{HashMap, VecDeque};

use glam::DVec2;

use crate::diagram::Diagram;
use crate::error::{Result, VoronoiError};
use crate::geometry::{EdgeId, PointId};
use crate::rbtree::{NodeId, RedBlackTree};

use super::{EPSILON, INFINITY};

/// One parabolic arc of the beachline
///
/// `edge` is the diagram edge being traced by this arc's left transition;
/// `circle` is the pending collapse event, when one is scheduled.
#[derive(Debug, Clone, Copy)]
pub(super) struct BeachArc {
    site: PointId,
    edge: Option<EdgeId>,
    circle: Option<NodeId>,
}

/// A scheduled beachline collapse
///
/// `y` is the bottom of the circumcircle (the sweep position at which the
/// event fires), `(x, y_center)` its center, which becomes a diagram vertex.
#[derive(Debug, Clone, Copy)]
pub(super) struct CircleEvent {
    arc: NodeId,
    x: f64,
    y: f64,
    y_center: f64,
}

pub(super) struct Sweep {
    pub(super) diagram: Diagram,
    beach: RedBlackTree<BeachArc>,
    circles: RedBlackTree<CircleEvent>,
    first_circle: Option<NodeId>,
    /// Vertices merged by exact coordinates, so edges meeting at one corner
    /// share a single point
    vertices: HashMap<(u64, u64), PointId>,
    pub(super) xl: f64,
    pub(super) xr: f64,
    pub(super) yt: f64,
    pub(super) yb: f64,
    pub(super) seed: u32,
}

impl Sweep {
    pub(super) fn run(sites: &[DVec2], width: u32, height: u32, seed: u32) -> Result<Diagram> {
        if sites.is_empty() {
            return Err(VoronoiError::NoSites);
        }

        let mut sweep = Sweep {
            diagram: Diagram::new(width, height),
            beach: RedBlackTree::new(),
            circles: RedBlackTree::new(),
            first_circle: None,
            vertices: HashMap::new(),
            xl: 0.0,
            xr: width as f64,
            yt: 0.0,
            yb: height as f64,
            seed,
        };

        // sort descending so taking from the back processes sites bottom-up
        let mut pending = sites.to_vec();
        pending.sort_by(|a, b| b.y.total_cmp(&a.y).then(b.x.total_cmp(&a.x)));

        let mut order = vec![0u32; pending.len()];
        let mut index = pending.len() - 1;
        let mut next_site = Some(pending[index]);
        let mut last = DVec2::new(-INFINITY, -INFINITY);
        let mut site_count: u32 = 0;

        loop {
            let circle = sweep.first_circle.map(|id| *sweep.circles.get(id));
            match (next_site, circle) {
                (Some(site), circle)
                    if circle.map_or(true, |c| {
                        site.y < c.y || (site.y == c.y && site.x < c.x)
                    }) =>
                {
                    // coincident with the previously processed site: skip it
                    if site.x != last.x || site.y != last.y {
                        site_count += 1;
                        let pid = sweep.diagram.new_site(site, site_count);
                        order[index] = site_count;
                        sweep.add_beach(pid)?;
                        last = site;
                    }
                    next_site = if index == 0 {
                        None
                    } else {
                        index -= 1;
                        Some(pending[index])
                    };
                }
                (_, Some(event)) => sweep.remove_beach(&event)?,
                // a site with no circle event always takes the first arm,
                // so only (None, None) reaches here
                _ => break,
            }
        }

        sweep.clip_edges();
        sweep.close_cells()?;

        let mut diagram = sweep.diagram;
        diagram.collect_polygons();
        diagram.determine_neighbours();
        diagram.site_order = order;
        Ok(diagram)
    }

    /// Insert the arc for a new site, splitting or splicing the beachline
    fn add_beach(&mut self, site: PointId) -> Result<()> {
        let site_pos = self.diagram.point(site).position();
        let mut node = self.beach.root();
        let mut left_arc: Option<NodeId> = None;
        let mut right_arc: Option<NodeId> = None;

        while let Some(n) = node {
            let dxl = self.left_break_point(n, site_pos.y) - site_pos.x;
            if dxl > EPSILON {
                // falls left of the arc's left edge
                node = self.beach.left(n);
            } else {
                let dxr = site_pos.x - self.right_break_point(n, site_pos.y);
                if dxr > EPSILON {
                    // falls right of the arc's right edge
                    match self.beach.right(n) {
                        Some(right) => node = Some(right),
                        None => {
                            left_arc = Some(n);
                            break;
                        }
                    }
                } else {
                    if dxl > -EPSILON {
                        // exactly on the left edge of the arc
                        left_arc = self.beach.prev(n);
                        right_arc = Some(n);
                    } else if dxr > -EPSILON {
                        // exactly on the right edge of the arc
                        left_arc = Some(n);
                        right_arc = self.beach.next(n);
                    } else {
                        // somewhere in the middle of the arc
                        left_arc = Some(n);
                        right_arc = Some(n);
                    }
                    break;
                }
            }
        }

        let new_arc = self.beach.insert_successor(
            left_arc,
            BeachArc {
                site,
                edge: None,
                circle: None,
            },
        );

        match (left_arc, right_arc) {
            // first arc on the beachline
            (None, None) => Ok(()),

            // the new arc splits an existing one in two
            (Some(l), Some(r)) if l == r => {
                self.detach_circle(l);

                let l_site = self.beach.get(l).site;
                let split = self.beach.insert_successor(
                    Some(new_arc),
                    BeachArc {
                        site: l_site,
                        edge: None,
                        circle: None,
                    },
                );

                let edge = self.diagram.create_edge(l_site, site, None, None)?;
                self.beach.get_mut(new_arc).edge = Some(edge);
                self.beach.get_mut(split).edge = Some(edge);

                self.attach_circle(l);
                self.attach_circle(split);
                Ok(())
            }

            // new right-most arc: only happens while all arcs share one y
            (Some(l), None) => {
                let l_site = self.beach.get(l).site;
                let edge = self.diagram.create_edge(l_site, site, None, None)?;
                self.beach.get_mut(new_arc).edge = Some(edge);
                Ok(())
            }

            // sites are processed top to bottom and left to right, so an arc
            // with a right neighbour always has a left one
            (None, Some(_)) => Err(VoronoiError::GenerationFailed(
                "beach section with a right neighbour but no left one".to_string(),
            )),

            // the new arc lands exactly on the transition between two arcs;
            // that transition ends here, at the circumcenter of the three sites
            (Some(l), Some(r)) => {
                self.detach_circle(l);
                self.detach_circle(r);

                let l_site = self.beach.get(l).site;
                let r_site = self.beach.get(r).site;
                let a = self.diagram.point(l_site).position();
                let b = site_pos - a;
                let c = self.diagram.point(r_site).position() - a;
                let d = 2.0 * (b.x * c.y - b.y * c.x);
                let hb = b.length_squared();
                let hc = c.length_squared();
                let vertex = self.create_vertex(
                    (c.y * hb - b.y * hc) / d + a.x,
                    (b.x * hc - c.x * hb) / d + a.y,
                );

                let r_edge = self.beach.get(r).edge.ok_or_else(|| {
                    VoronoiError::GenerationFailed(
                        "beach transition without an edge".to_string(),
                    )
                })?;
                self.diagram.set_edge_start(r_edge, l_site, r_site, vertex);

                let left_edge = self.diagram.create_edge(l_site, site, None, Some(vertex))?;
                self.beach.get_mut(new_arc).edge = Some(left_edge);
                let right_edge = self.diagram.create_edge(site, r_site, None, Some(vertex))?;
                self.beach.get_mut(r).edge = Some(right_edge);

                self.attach_circle(l);
                self.attach_circle(r);
                Ok(())
            }
        }
    }

    /// Remove the arc whose circle event fired, plus any arcs collapsing at
    /// the same vertex, and stitch the surviving neighbours together
    fn remove_beach(&mut self, event: &CircleEvent) -> Result<()> {
        let x = event.x;
        let y = event.y_center;
        let vertex = self.create_vertex(x, y);
        let mut previous = self.beach.prev(event.arc);
        let mut next = self.beach.next(event.arc);

        let missing_neighbour = || {
            VoronoiError::GenerationFailed(
                "collapsed beach section without both neighbours".to_string(),
            )
        };

        let mut transitions: VecDeque<(NodeId, BeachArc)> = VecDeque::new();
        transitions.push_back((event.arc, *self.beach.get(event.arc)));
        self.detach_beach(event.arc);

        // more than one arc can collapse onto the same vertex; gather them
        // by walking left, then right, from the deletion point
        let mut left_arc = previous.ok_or_else(missing_neighbour)?;
        loop {
            let arc = *self.beach.get(left_arc);
            let collapsing = arc.circle.map_or(false, |cid| {
                let c = self.circles.get(cid);
                (x - c.x).abs() < EPSILON && (y - c.y_center).abs() < EPSILON
            });
            if !collapsing {
                break;
            }
            previous = self.beach.prev(left_arc);
            transitions.push_front((left_arc, arc));
            self.detach_beach(left_arc);
            left_arc = previous.ok_or_else(missing_neighbour)?;
        }
        // the surviving left neighbour is the left site of the first edge
        // getting a start point below
        transitions.push_front((left_arc, *self.beach.get(left_arc)));
        self.detach_circle(left_arc);

        let mut right_arc = next.ok_or_else(missing_neighbour)?;
        loop {
            let arc = *self.beach.get(right_arc);
            let collapsing = arc.circle.map_or(false, |cid| {
                let c = self.circles.get(cid);
                (x - c.x).abs() < EPSILON && (y - c.y_center).abs() < EPSILON
            });
            if !collapsing {
                break;
            }
            next = self.beach.next(right_arc);
            transitions.push_back((right_arc, arc));
            self.detach_beach(right_arc);
            right_arc = next.ok_or_else(missing_neighbour)?;
        }
        transitions.push_back((right_arc, *self.beach.get(right_arc)));
        self.detach_circle(right_arc);

        // every disappearing transition pins its edge to the new vertex
        for i in 1..transitions.len() {
            let (_, right) = transitions[i];
            let (_, left) = transitions[i - 1];
            if let Some(edge) = right.edge {
                self.diagram.set_edge_start(edge, left.site, right.site, vertex);
            }
        }

        // the survivors are now adjacent: a fresh transition and edge appear,
        // ending at the vertex
        let (_, first) = transitions[0];
        let (last_node, last) = transitions[transitions.len() - 1];
        let edge = self
            .diagram
            .create_edge(first.site, last.site, None, Some(vertex))?;
        self.beach.get_mut(last_node).edge = Some(edge);

        self.attach_circle(transitions[0].0);
        self.attach_circle(last_node);
        Ok(())
    }

    /// Schedule a collapse event for an arc if its neighbouring transitions
    /// converge (the three sites turn counterclockwise)
    fn attach_circle(&mut self, arc: NodeId) {
        let (Some(left), Some(right)) = (self.beach.prev(arc), self.beach.next(arc)) else {
            return;
        };

        let l_site = self.beach.get(left).site;
        let site = self.beach.get(arc).site;
        let r_site = self.beach.get(right).site;
        if l_site == r_site {
            return;
        }

        // circumcircle with the origin moved to the middle site
        let b = self.diagram.point(site).position();
        let a = self.diagram.point(l_site).position() - b;
        let c = self.diagram.point(r_site).position() - b;

        // clockwise triples never converge; the small negative threshold
        // absorbs finite-precision noise that made circumcircles blow up
        let d = 2.0 * (a.x * c.y - a.y * c.x);
        if d >= -2e-12 {
            return;
        }

        let ha = a.length_squared();
        let hc = c.length_squared();
        let x = (c.y * ha - a.y * hc) / d;
        let y = (a.x * hc - c.x * ha) / d;
        let y_center = y + b.y;

        let event = CircleEvent {
            arc,
            x: x + b.x,
            // the event fires when the sweep reaches the circle bottom
            y: y_center + (x * x + y * y).sqrt(),
            y_center,
        };

        // insertion point in the queue, ordered by (y, x) ascending
        let mut previous = None;
        let mut node = self.circles.root();
        while let Some(n) = node {
            let v = *self.circles.get(n);
            if event.y < v.y || (event.y == v.y && event.x <= v.x) {
                match self.circles.left(n) {
                    Some(l) => node = Some(l),
                    None => {
                        previous = self.circles.prev(n);
                        break;
                    }
                }
            } else {
                match self.circles.right(n) {
                    Some(r) => node = Some(r),
                    None => {
                        previous = Some(n);
                        break;
                    }
                }
            }
        }

        let id = self.circles.insert_successor(previous, event);
        self.beach.get_mut(arc).circle = Some(id);
        if previous.is_none() {
            self.first_circle = Some(id);
        }
    }

    /// Cancel an arc's pending collapse event
    fn detach_circle(&mut self, arc: NodeId) {
        let Some(circle) = self.beach.get(arc).circle else {
            return;
        };
        if self.circles.prev(circle).is_none() {
            self.first_circle = self.circles.next(circle);
        }
        self.circles.remove(circle);
        self.beach.get_mut(arc).circle = None;
    }

    /// Drop an arc from the beachline together with its circle event
    fn detach_beach(&mut self, arc: NodeId) {
        self.detach_circle(arc);
        self.beach.remove(arc);
    }

    /// x of the breakpoint between this arc and its left neighbour at the
    /// given directrix
    fn left_break_point(&self, node: NodeId, directrix: f64) -> f64 {
        let right = self.diagram.point(self.beach.get(node).site).position();
        let pby2 = right.y - directrix;
        if pby2 == 0.0 {
            return right.x;
        }

        let Some(left_node) = self.beach.prev(node) else {
            return -INFINITY;
        };
        let left = self
            .diagram
            .point(self.beach.get(left_node).site)
            .position();
        let plby2 = left.y - directrix;
        if plby2 == 0.0 {
            return left.x;
        }

        let hl = left.x - right.x;
        let aby2 = 1.0 / pby2 - 1.0 / plby2;
        let b = hl / plby2;

        if aby2 != 0.0 {
            return (-b
                + (b * b
                    - 2.0 * aby2
                        * (hl * hl / (-2.0 * plby2) - left.y + plby2 / 2.0 + right.y
                            - pby2 / 2.0))
                    .sqrt())
                / aby2
                + right.x;
        }

        // both parabolas have the same curvature: breakpoint is the midpoint
        (right.x + left.x) / 2.0
    }

    /// x of the breakpoint between this arc and its right neighbour
    fn right_break_point(&self, node: NodeId, directrix: f64) -> f64 {
        if let Some(next) = self.beach.next(node) {
            return self.left_break_point(next, directrix);
        }
        let site = self.diagram.point(self.beach.get(node).site).position();
        if site.y == directrix {
            site.x
        } else {
            INFINITY
        }
    }

    /// Vertex for the given coordinates, merged by exact equality so every
    /// edge meeting here shares one point
    pub(super) fn create_vertex(&mut self, x: f64, y: f64) -> PointId {
        let key = (x.to_bits(), y.to_bits());
        if let Some(&id) = self.vertices.get(&key) {
            return id;
        }
        let id = self.diagram.new_point(DVec2::new(x, y));
        self.vertices.insert(key, id);
        id
    }
}
