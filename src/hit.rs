//! Pixel-accurate hit testing.
//!
//! A node is hit at a point when drawing it moves any non-transparent pixel
//! under that point. The test renders into a single-pixel probe surface
//! translated so the query point lands on the probe, then reads its alpha.

use crate::color::Color;
use crate::error::Result;
use crate::event::EventType;
use crate::matrix::Matrix2D;
use crate::render::RenderContext;
use crate::surface::Surface;
use crate::tree::{NodeId, SceneTree};

/// Which nodes count when searching under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitFilter {
    /// Every visible node.
    #[default]
    All,
    /// Skip nodes with `mouse_enabled` off; containers with
    /// `mouse_children` off stand in for their descendants.
    MouseEnabled,
    /// As [`MouseEnabled`](Self::MouseEnabled), and only nodes that (or
    /// whose ancestors) listen for pointer events.
    MouseListeners,
}

const POINTER_EVENTS: [EventType; 9] = [
    EventType::Click,
    EventType::DblClick,
    EventType::MouseDown,
    EventType::MouseOut,
    EventType::MouseOver,
    EventType::PressMove,
    EventType::PressUp,
    EventType::RollOut,
    EventType::RollOver,
];

fn has_pointer_listener(tree: &SceneTree, id: NodeId) -> bool {
    POINTER_EVENTS
        .iter()
        .any(|kind| tree.has_event_listener(id, kind))
}

/// Holds the probe surface shared by every query.
#[derive(Debug)]
pub struct HitTester {
    probe: Surface,
}

impl HitTester {
    pub fn new() -> Result<Self> {
        Ok(Self {
            probe: Surface::new(1, 1)?,
        })
    }

    /// Whether `id` has a visible pixel at the local point `(x, y)`. The
    /// node's own transform is ignored.
    pub fn hit_test(&mut self, tree: &SceneTree, id: NodeId, x: f64, y: f64) -> bool {
        let m = Matrix2D::identity();
        self.probe(&m, x, y, 1.0, |surface| {
            tree.draw(id, surface, &RenderContext::default(), false);
        })
    }

    /// Topmost node under the point `(x, y)` given in `container`'s local
    /// space.
    pub fn object_under_point(
        &mut self,
        tree: &SceneTree,
        container: NodeId,
        x: f64,
        y: f64,
        filter: HitFilter,
    ) -> Option<NodeId> {
        let p = tree.local_to_global(container, x, y)?;
        let hit = self.under_point(tree, container, p.x, p.y, None, filter, false, 0);
        log::trace!("Hit at ({}, {}): {:?}", x, y, hit);
        hit
    }

    /// Every leaf under the point, topmost first.
    pub fn objects_under_point(
        &mut self,
        tree: &SceneTree,
        container: NodeId,
        x: f64,
        y: f64,
        filter: HitFilter,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(p) = tree.local_to_global(container, x, y) {
            self.under_point(tree, container, p.x, p.y, Some(&mut out), filter, false, 0);
        }
        out
    }

    /// Topmost node under a point already in stage space.
    pub(crate) fn under_stage_point(
        &mut self,
        tree: &SceneTree,
        root: NodeId,
        x: f64,
        y: f64,
        filter: HitFilter,
    ) -> Option<NodeId> {
        let hit = self.under_point(tree, root, x, y, None, filter, false, 0);
        log::trace!("Stage hit at ({}, {}): {:?}", x, y, hit);
        hit
    }

    /// Walks children topmost first, with `(x, y)` in stage space. With
    /// `out`, collects every hit; otherwise returns the first.
    #[allow(clippy::too_many_arguments)]
    fn under_point(
        &mut self,
        tree: &SceneTree,
        container: NodeId,
        x: f64,
        y: f64,
        mut out: Option<&mut Vec<NodeId>>,
        filter: HitFilter,
        active_listener: bool,
        depth: usize,
    ) -> Option<NodeId> {
        if depth == 0 && !self.test_mask(tree, container, x, y) {
            return None;
        }
        let mouse = filter != HitFilter::All;
        let need_listener = filter == HitFilter::MouseListeners;
        let active_listener = active_listener || (need_listener && has_pointer_listener(tree, container));
        let mouse_children = tree
            .content(container)
            .and_then(|c| c.container())
            .map_or(true, |c| c.mouse_children);
        let resolve = |hit: NodeId| {
            if mouse && !mouse_children {
                container
            } else {
                hit
            }
        };

        for &child in tree.children(container).iter().rev() {
            let Some(display) = tree.display(child) else {
                continue;
            };
            let hit_area = display.hit_area.filter(|&h| tree.exists(h));
            if !display.visible
                || (hit_area.is_none() && !tree.is_visible(child))
                || (mouse && !display.mouse_enabled)
            {
                continue;
            }
            if hit_area.is_none() && !self.test_mask(tree, child, x, y) {
                continue;
            }

            let is_container = tree.content(child).is_some_and(|c| c.is_container());
            if hit_area.is_none() && is_container {
                let result = self.under_point(
                    tree,
                    child,
                    x,
                    y,
                    out.as_deref_mut(),
                    filter,
                    active_listener,
                    depth + 1,
                );
                if out.is_none() {
                    if let Some(hit) = result {
                        return Some(resolve(hit));
                    }
                }
                continue;
            }

            if need_listener && !active_listener && !has_pointer_listener(tree, child) {
                continue;
            }
            let Some(mut m) = tree.concatenated_matrix(child) else {
                continue;
            };
            let mut alpha = m.alpha;
            let drawn = match hit_area.and_then(|h| tree.display(h).map(|d| (h, d))) {
                Some((area, area_display)) => {
                    m.append_matrix(&area_display.matrix());
                    alpha = area_display.alpha;
                    area
                }
                None => child,
            };
            let hit = self.probe(&m, x, y, alpha, |surface| {
                tree.draw(drawn, surface, &RenderContext::default(), false);
            });
            if !hit {
                continue;
            }
            match out.as_deref_mut() {
                Some(list) => list.push(child),
                None => return Some(resolve(child)),
            }
        }
        None
    }

    /// False when `target` has a non-empty mask that does not cover the
    /// stage point.
    fn test_mask(&mut self, tree: &SceneTree, target: NodeId, x: f64, y: f64) -> bool {
        let Some(mask) = tree.display(target).and_then(|d| d.mask) else {
            return true;
        };
        let Some(graphics) = tree.content(mask).and_then(|c| c.graphics()) else {
            return true;
        };
        if graphics.is_empty() {
            return true;
        }
        let Some(mut m) = tree.matrix(mask) else {
            return true;
        };
        if let Some(parent_matrix) = tree.parent(target).and_then(|p| tree.concatenated_matrix(p)) {
            m.prepend_matrix(&parent_matrix);
        }
        self.probe(&m, x, y, 1.0, |surface| {
            surface.set_fill_style(Color::BLACK);
            surface.begin_path();
            graphics.draw_as_path(surface);
            surface.fill();
        })
    }

    /// Draw with `m` shifted so `(x, y)` lands on the probe pixel, then
    /// report whether the pixel was touched.
    fn probe(&mut self, m: &Matrix2D, x: f64, y: f64, alpha: f64, draw: impl FnOnce(&mut Surface)) -> bool {
        self.probe.clear();
        self.probe.save();
        self.probe
            .set_transform(&Matrix2D::new(m.a, m.b, m.c, m.d, m.tx - x, m.ty - y));
        self.probe.set_global_alpha(alpha);
        draw(&mut self.probe);
        self.probe.restore();

        let hit = match self.probe.pixel_alpha(0, 0) {
            Ok(a) => a > 1,
            Err(e) => {
                log::warn!("Hit test could not read pixels: {}", e);
                false
            }
        };
        if self.probe.is_read_protected() {
            if let Err(e) = self.probe.reset() {
                log::warn!("Could not reset hit test surface: {}", e);
            }
        }
        hit
    }
}
