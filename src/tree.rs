//! Arena-based node storage for the scene graph.
//!
//! The SceneTree owns every node using a sparse-set architecture with
//! generational indices. Containers hold ordered child id lists (paint
//! order, back to front) and every child keeps a plain back-pointer to its
//! single parent, maintained only by the container operations here.
//!
//! ## Key Features
//!
//! - **Generational Indices**: NodeId contains index + generation so a stale
//!   id never resolves to a node that was later allocated in the same slot.
//!
//! - **Dense Storage**: Nodes stored contiguously; lookups go through the
//!   sparse map in O(1).
//!
//! - **Swap-Remove**: O(1) removal without creating holes in dense storage.
//!
//! - **Single Parent**: adding a node to a container first detaches it from
//!   its previous parent. A node can never be added into its own subtree.

use std::cmp::Ordering;

use crate::display::{Bitmap, Content, ContainerProps, DisplayObject, Drawable, Sprite};
use crate::error::{Result, SceneError};
use crate::event::{EventType, ListenerEntry, SceneEvent};
use crate::geom::{Point, Rect};
use crate::graphics::Graphics;
use crate::image_source::Image;
use crate::matrix::Matrix2D;
use crate::render::CacheState;

/// Unique identifier for a node in the tree.
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after removal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Entry in the sparse map, pointing to a dense array slot.
struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

/// A node in the tree: its properties, content and relationships.
pub(crate) struct Node {
    pub display: DisplayObject,
    pub content: Content,
    pub parent: Option<NodeId>,
    /// Paint order, back to front. Empty for non-containers.
    pub children: Vec<NodeId>,
    pub listeners: Vec<ListenerEntry>,
    pub cache: Option<CacheState>,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// Owner of every node of one scene graph.
pub struct SceneTree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
    pub(crate) next_cache_id: u64,
    pub(crate) next_listener_id: u64,
}

impl SceneTree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            next_cache_id: 1,
            next_listener_id: 1,
        }
    }

    /// Store a new, unparented node.
    pub fn create(&mut self, display: DisplayObject, content: Content) -> NodeId {
        // Reuse a freed slot with the next generation, or grow.
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let old_gen = self.sparse[idx as usize]
                .as_ref()
                .map(|e| e.generation)
                .unwrap_or(0);
            (idx, old_gen.wrapping_add(1))
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            display,
            content,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            cache: None,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        NodeId::new(sparse_index, generation)
    }

    pub fn create_container(&mut self) -> NodeId {
        self.create(
            DisplayObject::new(),
            Content::Container(ContainerProps::default()),
        )
    }

    pub fn create_shape(&mut self, graphics: Graphics) -> NodeId {
        self.create(DisplayObject::new(), graphics.into())
    }

    pub fn create_bitmap(&mut self, image: Image) -> NodeId {
        self.create(DisplayObject::new(), Bitmap::new(image).into())
    }

    pub fn create_sprite(&mut self, sprite: Sprite) -> NodeId {
        self.create(DisplayObject::new(), sprite.into())
    }

    pub fn create_custom(&mut self, drawable: Box<dyn Drawable>) -> NodeId {
        self.create(DisplayObject::new(), Content::Custom(drawable))
    }

    /// Detach a node and free it together with its whole subtree.
    ///
    /// Ids of destroyed nodes go stale; masks or hit areas elsewhere that
    /// still point at them are ignored from then on.
    pub fn destroy(&mut self, id: NodeId) {
        if !self.exists(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            if let Err(e) = self.remove_child(parent, id) {
                log::warn!("Could not detach {:?} from {:?}: {}", id, parent, e);
            }
        }
        // A `removed` listener may have destroyed or re-attached the node.
        if !self.exists(id) {
            return;
        }
        self.unlink(id);

        let mut stack = vec![id];
        let mut count = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.free(next) {
                stack.extend(node.children);
                count += 1;
            }
        }
        log::debug!("Destroyed {} node(s) under {:?}", count, id);
    }

    /// Drop `id` from its parent's child list without dispatching events.
    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Swap-remove a single node from storage.
    fn free(&mut self, id: NodeId) -> Option<Node> {
        let dense_index = self.get_dense_index(id)?;
        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        // Keep the generation around for the next allocation in this slot.
        self.sparse[id.index as usize] = Some(SparseEntry {
            dense_index: usize::MAX,
            generation: id.generation,
        });
        self.free_indices.push(id.index);
        Some(removed)
    }

    /// Get the dense array index for a NodeId, validating generation.
    fn get_dense_index(&self, id: NodeId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation && e.dense_index != usize::MAX)
            .map(|e| e.dense_index)
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.get_dense_index(id).map(|idx| &self.dense[idx])
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.get_dense_index(id).map(move |idx| &mut self.dense[idx])
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(SceneError::NodeNotFound(id))
    }

    fn require_container(&self, id: NodeId) -> Result<&Node> {
        let node = self.require(id)?;
        if node.content.is_container() {
            Ok(node)
        } else {
            Err(SceneError::NotAContainer(id))
        }
    }

    /// Check if a node is alive.
    pub fn exists(&self, id: NodeId) -> bool {
        self.get_dense_index(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.dense.len()
    }

    pub fn display(&self, id: NodeId) -> Option<&DisplayObject> {
        self.node(id).map(|n| &n.display)
    }

    pub fn display_mut(&mut self, id: NodeId) -> Option<&mut DisplayObject> {
        self.node_mut(id).map(|n| &mut n.display)
    }

    pub fn content(&self, id: NodeId) -> Option<&Content> {
        self.node(id).map(|n| &n.content)
    }

    pub fn content_mut(&mut self, id: NodeId) -> Option<&mut Content> {
        self.node_mut(id).map(|n| &mut n.content)
    }

    /// Graphics of a shape node.
    pub fn graphics_mut(&mut self, id: NodeId) -> Option<&mut Graphics> {
        self.content_mut(id).and_then(Content::graphics_mut)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children in paint order. Empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn num_children(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// True if `node` is `ancestor` or lies anywhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ---- container operations ----

    /// Append `child` on top of `parent`'s children, detaching it from any
    /// previous parent first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.require_container(parent)?.children.len();
        let len = if self.parent(child) == Some(parent) {
            len - 1
        } else {
            len
        };
        self.insert_child(parent, child, len)
    }

    /// Insert `child` at `index` of `parent`'s children. `index` may equal
    /// the child count.
    pub fn add_child_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let len = self.require_container(parent)?.children.len();
        if index > len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        self.insert_child(parent, child, index)
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        self.require(child)?;
        if self.contains(child, parent) {
            return Err(SceneError::CyclicHierarchy { parent, child });
        }
        if let Some(old) = self.parent(child) {
            self.remove_child(old, child)?;
        }

        let Some(node) = self.node_mut(parent) else {
            return Err(SceneError::NodeNotFound(parent));
        };
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        log::debug!("Added {:?} to {:?} at {}", child, parent, index);

        self.dispatch_event(child, SceneEvent::new(EventType::Added, false, false));
        Ok(())
    }

    /// Detach `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let node = self.require_container(parent)?;
        match node.children.iter().position(|&c| c == child) {
            Some(index) => {
                self.remove_child_at(parent, index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let len = self.require_container(parent)?.children.len();
        if index >= len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        let Some(node) = self.node_mut(parent) else {
            return Err(SceneError::NodeNotFound(parent));
        };
        let child = node.children.remove(index);
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
        log::debug!("Removed {:?} from {:?}", child, parent);

        self.dispatch_event(child, SceneEvent::new(EventType::Removed, false, false));
        Ok(child)
    }

    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<()> {
        while self.require_container(parent)?.children.first().is_some() {
            self.remove_child_at(parent, 0)?;
        }
        Ok(())
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    /// First child with the given name.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.display(c).and_then(|d| d.name.as_deref()) == Some(name))
    }

    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Move an existing child to a new depth.
    pub fn set_child_index(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let len = self.require_container(parent)?.children.len();
        if index >= len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        let Some(current) = self.child_index(parent, child) else {
            return Err(SceneError::NodeNotFound(child));
        };
        if let Some(node) = self.node_mut(parent) {
            let id = node.children.remove(current);
            node.children.insert(index, id);
        }
        Ok(())
    }

    /// Swap the depths of two children of the same parent.
    pub fn swap_children(&mut self, parent: NodeId, a: NodeId, b: NodeId) -> Result<()> {
        self.require_container(parent)?;
        let i = self
            .child_index(parent, a)
            .ok_or(SceneError::NodeNotFound(a))?;
        let j = self
            .child_index(parent, b)
            .ok_or(SceneError::NodeNotFound(b))?;
        self.swap_children_at(parent, i, j)
    }

    pub fn swap_children_at(&mut self, parent: NodeId, i: usize, j: usize) -> Result<()> {
        let len = self.require_container(parent)?.children.len();
        if let Some(index) = [i, j].into_iter().find(|&k| k >= len) {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.swap(i, j);
        }
        Ok(())
    }

    /// Reorder children with a comparison over their properties. The sort is
    /// stable.
    pub fn sort_children(
        &mut self,
        parent: NodeId,
        mut compare: impl FnMut(&DisplayObject, &DisplayObject) -> Ordering,
    ) -> Result<()> {
        let mut children = self.require_container(parent)?.children.clone();
        children.sort_by(|&a, &b| match (self.display(a), self.display(b)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => Ordering::Equal,
        });
        if let Some(node) = self.node_mut(parent) {
            node.children = children;
        }
        Ok(())
    }

    /// Copy a node into a fresh, unparented id. With `recursive`, container
    /// children are copied too. Listeners and caches are not copied; masks
    /// and hit areas keep pointing at the same nodes.
    pub fn clone_node(&mut self, id: NodeId, recursive: bool) -> Result<NodeId> {
        let node = self.require(id)?;
        let display = node.display.clone();
        let content = node.content.clone();
        let children = if recursive {
            node.children.clone()
        } else {
            Vec::new()
        };

        let copy = self.create(display, content);
        for child in children {
            let child_copy = self.clone_node(child, true)?;
            if let Some(node) = self.node_mut(child_copy) {
                node.parent = Some(copy);
            }
            if let Some(node) = self.node_mut(copy) {
                node.children.push(child_copy);
            }
        }
        Ok(copy)
    }

    // ---- transforms ----

    /// Local matrix of a node.
    pub fn matrix(&self, id: NodeId) -> Option<Matrix2D> {
        self.display(id).map(DisplayObject::matrix)
    }

    /// Full transform from local to root space, with alpha, shadow,
    /// composite operation and visibility inherited from the ancestors.
    pub fn concatenated_matrix(&self, id: NodeId) -> Option<Matrix2D> {
        let mut m = self.matrix(id)?;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            let node = self.node(parent)?;
            m.prepend_matrix(&node.display.matrix());
            current = node.parent;
        }
        Some(m)
    }

    pub fn local_to_global(&self, id: NodeId, x: f64, y: f64) -> Option<Point> {
        self.concatenated_matrix(id).map(|m| m.transform_point(x, y))
    }

    /// `None` when the node is scaled to nothing somewhere along its chain.
    pub fn global_to_local(&self, id: NodeId, x: f64, y: f64) -> Option<Point> {
        self.concatenated_matrix(id)?
            .inverse()
            .map(|m| m.transform_point(x, y))
    }

    /// Map a point from one node's space to another's.
    pub fn local_to_local(&self, from: NodeId, x: f64, y: f64, to: NodeId) -> Option<Point> {
        let global = self.local_to_global(from, x, y)?;
        self.global_to_local(to, global.x, global.y)
    }

    // ---- bounds & visibility ----

    /// Local bounds: explicit bounds win, then the cache area, then bounds
    /// computed from content. Containers union their visible children.
    /// Shapes without explicit bounds have none.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.bounds_in(id, None, true)
    }

    /// Bounds in the parent's coordinate space.
    pub fn transformed_bounds(&self, id: NodeId) -> Option<Rect> {
        self.bounds_in(id, None, false)
    }

    fn bounds_in(&self, id: NodeId, matrix: Option<&Matrix2D>, ignore_transform: bool) -> Option<Rect> {
        let node = self.node(id)?;
        let own = node
            .display
            .bounds
            .or_else(|| node.cache.as_ref().map(CacheState::bounds));

        if own.is_none() && node.content.is_container() {
            let mut m = if ignore_transform {
                Matrix2D::identity()
            } else {
                node.display.matrix()
            };
            if let Some(outer) = matrix {
                m.prepend_matrix(outer);
            }
            return node
                .children
                .iter()
                .filter(|&&c| self.display(c).is_some_and(|d| d.visible))
                .filter_map(|&c| self.bounds_in(c, Some(&m), false))
                .reduce(|acc, b| acc.union(&b));
        }

        let bounds = own.or_else(|| node.content.bounds())?;
        let mut m = if ignore_transform {
            Matrix2D::identity()
        } else {
            node.display.matrix()
        };
        if bounds.x != 0.0 || bounds.y != 0.0 {
            m.append_transform(0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, -bounds.x, -bounds.y);
        }
        if let Some(outer) = matrix {
            m.prepend_matrix(outer);
        }
        Some(transform_rect(&m, bounds.width, bounds.height))
    }

    /// Whether the node would draw anything: visible, not transparent, not
    /// scaled to zero, and with content (or a cache) to show. Empty
    /// containers are not visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let has_content = node.cache.is_some()
            || match node.content {
                Content::Container(_) => !node.children.is_empty(),
                ref content => content.has_content(),
            };
        node.display.is_drawn() && has_content
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned box of the `(0, 0, width, height)` rect mapped through `m`.
fn transform_rect(m: &Matrix2D, width: f64, height: f64) -> Rect {
    let corners = [
        m.transform_point(0.0, 0.0),
        m.transform_point(width, 0.0),
        m.transform_point(width, height),
        m.transform_point(0.0, height),
    ];
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in corners {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rect_approx_eq(a: Rect, b: Rect) -> bool {
        approx_eq(a.x, b.x)
            && approx_eq(a.y, b.y)
            && approx_eq(a.width, b.width)
            && approx_eq(a.height, b.height)
    }

    fn shape_with_bounds(tree: &mut SceneTree, bounds: Rect) -> NodeId {
        let mut g = Graphics::new();
        g.begin_fill(Color::RED)
            .draw_rect(bounds.x, bounds.y, bounds.width, bounds.height);
        let id = tree.create_shape(g);
        tree.display_mut(id).unwrap().set_bounds(Some(bounds));
        id
    }

    #[test]
    fn test_create_destroy() {
        let mut tree = SceneTree::new();
        let id = tree.create_container();
        assert!(tree.exists(id));
        tree.destroy(id);
        assert!(!tree.exists(id));
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_generational_index() {
        let mut tree = SceneTree::new();
        let id1 = tree.create_container();
        tree.destroy(id1);
        let id2 = tree.create_container();

        assert!(!tree.exists(id1));
        assert!(tree.exists(id2));
        assert_eq!(id1.index, id2.index);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn test_swap_remove_fixup() {
        let mut tree = SceneTree::new();
        let id1 = tree.create_container();
        let id2 = tree.create_container();
        let id3 = tree.create_container();
        tree.display_mut(id3).unwrap().name = Some("third".into());

        tree.destroy(id1);

        assert!(!tree.exists(id1));
        assert!(tree.exists(id2));
        assert_eq!(
            tree.display(id3).unwrap().name.as_deref(),
            Some("third")
        );
    }

    #[test]
    fn test_destroy_frees_subtree() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let group = tree.create_container();
        let leaf = tree.create_shape(Graphics::new());
        tree.add_child(root, group).unwrap();
        tree.add_child(group, leaf).unwrap();

        tree.destroy(group);
        assert!(!tree.exists(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_destroy_while_removed_listener_reattaches() {
        let mut tree = SceneTree::new();
        let a = tree.create_container();
        let b = tree.create_container();
        let leaf = tree.create_shape(Graphics::new());
        tree.add_child(a, leaf).unwrap();
        tree.on(leaf, EventType::Removed, move |tree, _| {
            tree.add_child(b, leaf).unwrap();
        })
        .unwrap();

        tree.destroy(leaf);
        assert!(!tree.exists(leaf));
        assert!(tree.children(a).is_empty());
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_add_child_reparents() {
        let mut tree = SceneTree::new();
        let a = tree.create_container();
        let b = tree.create_container();
        let child = tree.create_shape(Graphics::new());

        tree.add_child(a, child).unwrap();
        tree.add_child(b, child).unwrap();

        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[child]);
        assert_eq!(tree.parent(child), Some(b));
    }

    #[test]
    fn test_add_child_again_moves_to_top() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let a = tree.create_container();
        let b = tree.create_container();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_child(root, a).unwrap();
        assert_eq!(tree.children(root), &[b, a]);
    }

    #[test]
    fn test_hierarchy_errors() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let group = tree.create_container();
        let leaf = tree.create_shape(Graphics::new());
        tree.add_child(root, group).unwrap();

        assert_eq!(
            tree.add_child(group, root),
            Err(SceneError::CyclicHierarchy {
                parent: group,
                child: root
            })
        );
        assert!(matches!(
            tree.add_child(group, group),
            Err(SceneError::CyclicHierarchy { .. })
        ));
        assert_eq!(
            tree.add_child(leaf, group),
            Err(SceneError::NotAContainer(leaf))
        );
        assert_eq!(
            tree.add_child_at(root, leaf, 5),
            Err(SceneError::IndexOutOfRange { index: 5, len: 1 })
        );
        // The failed insert did not detach anything.
        assert_eq!(tree.parent(group), Some(root));
    }

    #[test]
    fn test_child_ordering_operations() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let ids: Vec<NodeId> = (0..3)
            .map(|i| {
                let id = tree.create_container();
                tree.display_mut(id).unwrap().name = Some(format!("n{i}"));
                tree.add_child(root, id).unwrap();
                id
            })
            .collect();

        assert_eq!(tree.child_by_name(root, "n1"), Some(ids[1]));
        assert_eq!(tree.child_index(root, ids[2]), Some(2));

        tree.set_child_index(root, ids[2], 0).unwrap();
        assert_eq!(tree.children(root), &[ids[2], ids[0], ids[1]]);

        tree.swap_children(root, ids[2], ids[1]).unwrap();
        assert_eq!(tree.children(root), &[ids[1], ids[0], ids[2]]);

        tree.swap_children_at(root, 0, 1).unwrap();
        assert_eq!(tree.children(root), &[ids[0], ids[1], ids[2]]);

        tree.sort_children(root, |a, b| b.name.cmp(&a.name)).unwrap();
        assert_eq!(tree.children(root), &[ids[2], ids[1], ids[0]]);

        tree.add_child_at(root, ids[0], 0).unwrap();
        assert_eq!(tree.child_at(root, 0), Some(ids[0]));

        assert_eq!(tree.remove_child_at(root, 1).unwrap(), ids[2]);
        assert!(tree.remove_child(root, ids[1]).unwrap());
        assert!(!tree.remove_child(root, ids[1]).unwrap());

        tree.remove_all_children(root).unwrap();
        assert_eq!(tree.num_children(root), 0);
        assert_eq!(tree.parent(ids[0]), None);
    }

    #[test]
    fn test_contains_includes_self_and_descendants() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let group = tree.create_container();
        let leaf = tree.create_shape(Graphics::new());
        tree.add_child(root, group).unwrap();
        tree.add_child(group, leaf).unwrap();

        assert!(tree.contains(root, leaf));
        assert!(tree.contains(group, group));
        assert!(!tree.contains(leaf, group));
        assert_eq!(tree.ancestors(leaf), vec![group, root]);
    }

    #[test]
    fn test_clone_node() {
        let mut tree = SceneTree::new();
        let group = tree.create_container();
        let leaf = shape_with_bounds(&mut tree, Rect::new(0.0, 0.0, 4.0, 4.0));
        tree.add_child(group, leaf).unwrap();
        tree.display_mut(group).unwrap().x = 7.0;

        let shallow = tree.clone_node(group, false).unwrap();
        assert_eq!(tree.display(shallow).unwrap().x, 7.0);
        assert!(tree.children(shallow).is_empty());

        let deep = tree.clone_node(group, true).unwrap();
        let copied_leaf = tree.children(deep)[0];
        assert_ne!(copied_leaf, leaf);
        assert_eq!(tree.parent(copied_leaf), Some(deep));
        assert_eq!(tree.parent(deep), None);
        assert!(!tree.graphics_mut(copied_leaf).unwrap().is_empty());
    }

    #[test]
    fn test_concatenated_matrix_and_coordinates() {
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        let group = tree.create_container();
        let leaf = tree.create_shape(Graphics::new());
        tree.add_child(root, group).unwrap();
        tree.add_child(group, leaf).unwrap();

        tree.display_mut(root).unwrap().alpha = 0.5;
        {
            let d = tree.display_mut(group).unwrap();
            d.x = 100.0;
            d.scale_x = 2.0;
            d.scale_y = 2.0;
        }
        tree.display_mut(leaf).unwrap().x = 10.0;

        let m = tree.concatenated_matrix(leaf).unwrap();
        assert!(approx_eq(m.alpha, 0.5));

        let global = tree.local_to_global(leaf, 1.0, 1.0).unwrap();
        assert!(approx_eq(global.x, 122.0) && approx_eq(global.y, 2.0));

        let local = tree.global_to_local(leaf, 122.0, 2.0).unwrap();
        assert!(approx_eq(local.x, 1.0) && approx_eq(local.y, 1.0));

        let p = tree.local_to_local(leaf, 0.0, 0.0, group).unwrap();
        assert!(approx_eq(p.x, 10.0) && approx_eq(p.y, 0.0));

        tree.display_mut(group).unwrap().scale_x = 0.0;
        assert_eq!(tree.global_to_local(leaf, 0.0, 0.0), None);
    }

    #[test]
    fn test_container_bounds() {
        let mut tree = SceneTree::new();
        let group = tree.create_container();
        assert_eq!(tree.bounds(group), None);

        let child = shape_with_bounds(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.display_mut(child).unwrap().x = 5.0;
        tree.add_child(group, child).unwrap();
        assert_eq!(tree.bounds(group), Some(Rect::new(5.0, 0.0, 10.0, 10.0)));

        // The container's own transform only shows in transformed bounds.
        tree.display_mut(group).unwrap().x = 100.0;
        assert_eq!(tree.bounds(group), Some(Rect::new(5.0, 0.0, 10.0, 10.0)));
        assert_eq!(
            tree.transformed_bounds(group),
            Some(Rect::new(105.0, 0.0, 10.0, 10.0))
        );

        // Invisible children do not count.
        tree.display_mut(child).unwrap().visible = false;
        assert_eq!(tree.bounds(group), None);
    }

    #[test]
    fn test_rotated_bounds() {
        let mut tree = SceneTree::new();
        let group = tree.create_container();
        let child = shape_with_bounds(&mut tree, Rect::new(-5.0, -5.0, 10.0, 20.0));
        tree.display_mut(child).unwrap().rotation = 90.0;
        tree.add_child(group, child).unwrap();

        let bounds = tree.bounds(group).unwrap();
        assert!(
            rect_approx_eq(bounds, Rect::new(-15.0, -5.0, 20.0, 10.0)),
            "{bounds:?}"
        );
    }

    #[test]
    fn test_visibility() {
        let mut tree = SceneTree::new();
        let group = tree.create_container();
        assert!(!tree.is_visible(group));

        let shape = tree.create_shape(Graphics::new());
        tree.add_child(group, shape).unwrap();
        assert!(tree.is_visible(group));
        assert!(!tree.is_visible(shape));

        tree.graphics_mut(shape)
            .unwrap()
            .draw_rect(0.0, 0.0, 1.0, 1.0);
        assert!(tree.is_visible(shape));
        tree.display_mut(shape).unwrap().alpha = 0.0;
        assert!(!tree.is_visible(shape));
    }
}
