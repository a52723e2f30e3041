//! Drawing nodes onto a surface, and offscreen caching.
//!
//! Every node is drawn in two steps: [`SceneTree::update_context`] sets up
//! the surface for the node (mask clip, transform, alpha, composite
//! operation, shadow) and [`SceneTree::draw`] paints its content in local
//! coordinates. Containers repeat both steps for each visible child inside a
//! save/restore pair.
//!
//! A cached node is painted once into its own surface (filters applied) and
//! that surface is blitted instead of the content until the cache is
//! refreshed or dropped.

use crate::display::Content;
use crate::error::{Result, SceneError};
use crate::filter::filter_bounds;
use crate::geom::Rect;
use crate::style::CompositeOperation;
use crate::surface::Surface;
use crate::tree::{NodeId, SceneTree};

/// Per-render settings that would otherwise be global toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderContext {
    /// Round node translations to whole pixels for nodes that opt in.
    pub snap_to_pixel_enabled: bool,
}

/// Offscreen snapshot of a node.
#[derive(Debug)]
pub(crate) struct CacheState {
    /// `None` when the requested area rounds to nothing.
    surface: Option<Surface>,
    offset_x: f64,
    offset_y: f64,
    width: f64,
    height: f64,
    scale: f64,
    filter_offset_x: f64,
    filter_offset_y: f64,
    id: u64,
    context: RenderContext,
}

impl CacheState {
    /// Cached area in local coordinates.
    pub(crate) fn bounds(&self) -> Rect {
        let (w, h) = self
            .surface
            .as_ref()
            .map(|s| (f64::from(s.width()), f64::from(s.height())))
            .unwrap_or((0.0, 0.0));
        Rect::new(self.offset_x, self.offset_y, w / self.scale, h / self.scale)
    }

    fn draw(&self, surface: &mut Surface) {
        let Some(cache) = &self.surface else {
            return;
        };
        let (w, h) = (f64::from(cache.width()), f64::from(cache.height()));
        let dst = Rect::new(
            self.offset_x + self.filter_offset_x / self.scale,
            self.offset_y + self.filter_offset_y / self.scale,
            w / self.scale,
            h / self.scale,
        );
        surface.draw_surface(cache, Rect::new(0.0, 0.0, w, h), dst);
    }
}

impl SceneTree {
    /// Prepare `surface` for drawing `id` in its parent's coordinate space.
    /// Callers save the surface state before and restore it after.
    pub fn update_context(&self, id: NodeId, surface: &mut Surface, ctx: &RenderContext) {
        let Some(node) = self.node(id) else {
            return;
        };
        let display = &node.display;

        let mask = display.mask.and_then(|mask| {
            let graphics = self.content(mask)?.graphics()?;
            (!graphics.is_empty()).then(|| (self.display(mask).map(|d| d.matrix()), graphics))
        });
        if let Some((Some(mask_matrix), graphics)) = mask {
            let before = surface.current_transform().clone();
            surface.transform(&mask_matrix);
            surface.begin_path();
            graphics.draw_as_path(surface);
            surface.clip();
            surface.set_transform(&before);
        }

        let mut m = display.matrix();
        if ctx.snap_to_pixel_enabled && display.snap_to_pixel {
            m.tx = m.tx.round();
            m.ty = m.ty.round();
        }
        surface.transform(&m);
        surface.set_global_alpha(surface.global_alpha() * display.alpha);
        if let Some(op) = display.composite_operation {
            surface.set_composite_operation(op);
        }
        if let Some(shadow) = display.shadow {
            surface.set_shadow(Some(shadow));
        }
    }

    /// Paint `id` in its local coordinates. Uses the cache unless
    /// `ignore_cache` is set. Returns whether the node was handled.
    pub fn draw(&self, id: NodeId, surface: &mut Surface, ctx: &RenderContext, ignore_cache: bool) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !ignore_cache {
            if let Some(cache) = &node.cache {
                cache.draw(surface);
                return true;
            }
        }
        match &node.content {
            Content::Container(_) => {
                for &child in &node.children {
                    if !self.is_visible(child) {
                        continue;
                    }
                    surface.save();
                    self.update_context(child, surface, ctx);
                    self.draw(child, surface, ctx, false);
                    surface.restore();
                }
                true
            }
            content => content.draw(surface),
        }
    }

    /// Snapshot `id` into an offscreen surface covering the local rect
    /// `(x, y, width, height)` at `scale`. The node draws from the cache
    /// until [`uncache`](Self::uncache); call
    /// [`update_cache`](Self::update_cache) after changing its content.
    pub fn cache(&mut self, id: NodeId, x: f64, y: f64, width: f64, height: f64, scale: f64) -> Result<()> {
        self.cache_with(id, Rect::new(x, y, width, height), scale, RenderContext::default())
    }

    pub(crate) fn cache_with(&mut self, id: NodeId, area: Rect, scale: f64, context: RenderContext) -> Result<()> {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let node = self.node_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        let previous = node.cache.take();
        node.cache = Some(CacheState {
            surface: previous.and_then(|c| c.surface),
            offset_x: area.x,
            offset_y: area.y,
            width: area.width,
            height: area.height,
            scale,
            filter_offset_x: 0.0,
            filter_offset_y: 0.0,
            id: 0,
            context,
        });
        self.update_cache(id, None)
    }

    /// Repaint the cache of `id`. Without a composite operation the cache is
    /// cleared first; with one, new content is composited over the old.
    pub fn update_cache(&mut self, id: NodeId, composite: Option<CompositeOperation>) -> Result<()> {
        let node = self.node_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        let mut cache = node.cache.take().ok_or(SceneError::CacheNotInitialized)?;
        let filters = node.display.filters.clone();

        let fb = filter_bounds(&filters).unwrap_or_default();
        cache.filter_offset_x = fb.x;
        cache.filter_offset_y = fb.y;
        let off_x = cache.offset_x * cache.scale + fb.x;
        let off_y = cache.offset_y * cache.scale + fb.y;
        let w = (cache.width * cache.scale).ceil() + fb.width;
        let h = (cache.height * cache.scale).ceil() + fb.height;

        if w < 1.0 || h < 1.0 {
            cache.surface = None;
        } else {
            let (w, h) = (w as u32, h as u32);
            let reuse = cache
                .surface
                .as_ref()
                .is_some_and(|s| s.width() == w && s.height() == h);
            if reuse {
                if composite.is_none() {
                    if let Some(surface) = cache.surface.as_mut() {
                        surface.clear();
                    }
                }
            } else {
                cache.surface = match Surface::new(w, h) {
                    Ok(surface) => Some(surface),
                    Err(e) => {
                        log::warn!("Cache for {:?} not allocated: {}", id, e);
                        None
                    }
                };
            }
        }

        if let Some(mut surface) = cache.surface.take() {
            surface.save();
            if let Some(op) = composite {
                surface.set_composite_operation(op);
            }
            surface.set_transform(&crate::matrix::Matrix2D::new(
                cache.scale,
                0.0,
                0.0,
                cache.scale,
                -off_x,
                -off_y,
            ));
            self.draw(id, &mut surface, &cache.context, true);
            let (sw, sh) = (surface.width(), surface.height());
            for filter in &filters {
                filter.apply(&mut surface, 0, 0, sw, sh);
            }
            surface.restore();
            cache.surface = Some(surface);
        }

        cache.id = self.next_cache_id;
        self.next_cache_id += 1;
        log::debug!(
            "Cached {:?} as #{} ({:?})",
            id,
            cache.id,
            cache.surface.as_ref().map(|s| (s.width(), s.height()))
        );
        if let Some(node) = self.node_mut(id) {
            node.cache = Some(cache);
        }
        Ok(())
    }

    /// Drop the cache of `id`; it draws its content again.
    pub fn uncache(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.cache = None;
        }
    }

    pub fn is_cached(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.cache.is_some())
    }

    /// Changes every time the cache is repainted. `None` when not cached.
    pub fn cache_id(&self, id: NodeId) -> Option<u64> {
        self.node(id)?.cache.as_ref().map(|c| c.id)
    }

    /// PNG encoding of the cache surface.
    pub fn cache_png(&self, id: NodeId) -> Result<Vec<u8>> {
        let node = self.node(id).ok_or(SceneError::NodeNotFound(id))?;
        let cache = node.cache.as_ref().ok_or(SceneError::CacheNotInitialized)?;
        match &cache.surface {
            Some(surface) => surface.to_png(),
            None => Err(SceneError::Encode("cache area is empty".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::filter::{BlurFilter, ColorFilter};
    use crate::graphics::Graphics;
    use std::sync::Arc;

    fn red_square(tree: &mut SceneTree, size: f64) -> NodeId {
        let mut g = Graphics::new();
        g.begin_fill(Color::RED).draw_rect(0.0, 0.0, size, size);
        tree.create_shape(g)
    }

    fn render(tree: &SceneTree, root: NodeId, surface: &mut Surface, ctx: &RenderContext) {
        surface.save();
        tree.update_context(root, surface, ctx);
        tree.draw(root, surface, ctx, false);
        surface.restore();
    }

    #[test]
    fn test_container_draws_visible_children_in_place() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let a = red_square(&mut tree, 4.0);
        let b = red_square(&mut tree, 4.0);
        tree.display_mut(b).unwrap().x = 10.0;
        tree.display_mut(b).unwrap().visible = false;
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.display_mut(root).unwrap().x = 2.0;

        let mut surface = Surface::new(20, 20).unwrap();
        render(&tree, root, &mut surface, &RenderContext::default());

        assert_eq!(surface.pixel_alpha(1, 1).unwrap(), 0);
        assert_eq!(surface.pixel_alpha(3, 1).unwrap(), 255);
        assert_eq!(surface.pixel_alpha(13, 1).unwrap(), 0);
    }

    #[test]
    fn test_alpha_multiplies_down_the_tree() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let child = red_square(&mut tree, 4.0);
        tree.add_child(root, child).unwrap();
        tree.display_mut(root).unwrap().alpha = 0.5;
        tree.display_mut(child).unwrap().alpha = 0.5;

        let mut surface = Surface::new(4, 4).unwrap();
        render(&tree, root, &mut surface, &RenderContext::default());
        let alpha = surface.pixel_alpha(1, 1).unwrap();
        assert!((63..=65).contains(&alpha), "{alpha}");
    }

    #[test]
    fn test_mask_clips_content() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let content = red_square(&mut tree, 10.0);
        let mask = red_square(&mut tree, 5.0);
        tree.add_child(root, content).unwrap();
        tree.display_mut(content).unwrap().mask = Some(mask);

        let mut surface = Surface::new(10, 10).unwrap();
        render(&tree, root, &mut surface, &RenderContext::default());
        assert_eq!(surface.pixel_alpha(2, 2).unwrap(), 255);
        assert_eq!(surface.pixel_alpha(7, 7).unwrap(), 0);
    }

    #[test]
    fn test_snap_to_pixel() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let child = red_square(&mut tree, 2.0);
        tree.add_child(root, child).unwrap();
        tree.display_mut(child).unwrap().x = 1.4;

        let ctx = RenderContext {
            snap_to_pixel_enabled: true,
        };
        let mut surface = Surface::new(4, 4).unwrap();
        render(&tree, root, &mut surface, &ctx);
        assert_eq!(surface.pixel_alpha(1, 0).unwrap(), 255);
        assert_eq!(surface.pixel_alpha(2, 0).unwrap(), 255);
        assert_eq!(surface.pixel_alpha(3, 0).unwrap(), 0);
    }

    #[test]
    fn test_update_cache_requires_cache() {
        let mut tree = SceneTree::new();
        let node = red_square(&mut tree, 4.0);
        assert_eq!(
            tree.update_cache(node, None),
            Err(SceneError::CacheNotInitialized)
        );
        assert_eq!(
            tree.cache_png(node),
            Err(SceneError::CacheNotInitialized)
        );
    }

    #[test]
    fn test_cache_lifecycle() {
        let mut tree = SceneTree::new();
        let node = red_square(&mut tree, 4.0);
        tree.cache(node, 0.0, 0.0, 4.0, 4.0, 1.0).unwrap();
        let first = tree.cache_id(node).unwrap();
        assert_eq!(tree.bounds(node), Some(Rect::new(0.0, 0.0, 4.0, 4.0)));

        // Content edits do not show until the cache is refreshed.
        tree.graphics_mut(node).unwrap().clear();
        let mut surface = Surface::new(4, 4).unwrap();
        assert!(tree.draw(node, &mut surface, &RenderContext::default(), false));
        assert_eq!(surface.pixel_alpha(1, 1).unwrap(), 255);

        tree.update_cache(node, None).unwrap();
        assert_ne!(tree.cache_id(node), Some(first));
        surface.clear();
        tree.draw(node, &mut surface, &RenderContext::default(), false);
        assert_eq!(surface.pixel_alpha(1, 1).unwrap(), 0);

        let png = tree.cache_png(node).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        tree.uncache(node);
        assert!(!tree.is_cached(node));
        assert_eq!(tree.cache_id(node), None);
    }

    #[test]
    fn test_scaled_cache_keeps_local_size() {
        let mut tree = SceneTree::new();
        let node = red_square(&mut tree, 4.0);
        tree.cache(node, 0.0, 0.0, 4.0, 4.0, 2.0).unwrap();
        assert_eq!(tree.bounds(node), Some(Rect::new(0.0, 0.0, 4.0, 4.0)));

        let mut surface = Surface::new(8, 8).unwrap();
        tree.draw(node, &mut surface, &RenderContext::default(), false);
        assert_eq!(surface.pixel_alpha(3, 3).unwrap(), 255);
        assert_eq!(surface.pixel_alpha(5, 5).unwrap(), 0);
    }

    #[test]
    fn test_empty_cache_area_is_not_an_error() {
        let mut tree = SceneTree::new();
        let node = red_square(&mut tree, 4.0);
        tree.cache(node, 0.0, 0.0, 0.0, 0.0, 1.0).unwrap();
        assert!(tree.is_cached(node));
        let mut surface = Surface::new(4, 4).unwrap();
        assert!(tree.draw(node, &mut surface, &RenderContext::default(), false));
        assert_eq!(surface.pixel_alpha(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_filters_run_on_cache() {
        let mut tree = SceneTree::new();
        let node = red_square(&mut tree, 4.0);
        tree.display_mut(node).unwrap().filters =
            vec![Arc::new(ColorFilter::new([1.0, 1.0, 1.0, 0.0], [0.0; 4]))];
        tree.cache(node, 0.0, 0.0, 4.0, 4.0, 1.0).unwrap();

        let mut surface = Surface::new(4, 4).unwrap();
        tree.draw(node, &mut surface, &RenderContext::default(), false);
        assert_eq!(surface.pixel_alpha(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_spreading_filter_grows_cache() {
        let mut tree = SceneTree::new();
        let node = red_square(&mut tree, 4.0);
        tree.display_mut(node).unwrap().filters = vec![Arc::new(BlurFilter::new(4.0, 4.0, 1))];
        tree.cache(node, 0.0, 0.0, 4.0, 4.0, 1.0).unwrap();

        let bounds = tree.bounds(node).unwrap();
        assert!(bounds.width > 4.0 && bounds.height > 4.0, "{bounds:?}");
    }
}
