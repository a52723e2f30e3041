//! The root of a scene: a container bound to a surface.
//!
//! A [`Stage`] owns its [`SceneTree`] and the surface everything is drawn
//! into. The driver calls [`Stage::update`] once per frame (optionally with
//! timing from its own clock) and forwards pointer input to the
//! `handle_pointer_*` entry points; see the `pointer` module for routing.

mod pointer;

pub use pointer::PointerRecord;

use crate::cursor::CursorIcon;
use crate::error::Result;
use crate::event::{EventType, SceneEvent, Tick};
use crate::geom::Rect;
use crate::hit::{HitFilter, HitTester};
use crate::matrix::Matrix2D;
use crate::render::RenderContext;
use crate::surface::Surface;
use crate::tree::{NodeId, SceneTree};

/// Stage settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    pub width: u32,
    pub height: u32,
    /// Clear the surface before each update.
    pub auto_clear: bool,
    /// Tick the scene at the start of each update.
    pub tick_on_update: bool,
    /// Allow nodes with `snap_to_pixel` to round their translation.
    pub snap_to_pixel_enabled: bool,
    /// Keep tracking pointers that leave the stage, clamped to its edges.
    pub mouse_move_outside: bool,
    /// Mouse-over checks per second. `None` disables them.
    pub mouse_over_frequency: Option<u32>,
    /// Restrict clearing and drawing to this region.
    pub draw_rect: Option<Rect>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            auto_clear: true,
            tick_on_update: true,
            snap_to_pixel_enabled: false,
            mouse_move_outside: false,
            mouse_over_frequency: None,
            draw_rect: None,
        }
    }
}

impl StageConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn auto_clear(mut self, auto_clear: bool) -> Self {
        self.auto_clear = auto_clear;
        self
    }

    pub fn tick_on_update(mut self, tick_on_update: bool) -> Self {
        self.tick_on_update = tick_on_update;
        self
    }

    pub fn snap_to_pixel(mut self, enabled: bool) -> Self {
        self.snap_to_pixel_enabled = enabled;
        self
    }

    pub fn mouse_move_outside(mut self, enabled: bool) -> Self {
        self.mouse_move_outside = enabled;
        self
    }

    pub fn mouse_over(mut self, frequency: Option<u32>) -> Self {
        self.mouse_over_frequency = frequency;
        self
    }

    pub fn draw_rect(mut self, rect: Option<Rect>) -> Self {
        self.draw_rect = rect;
        self
    }
}

#[derive(Debug, Default)]
struct MouseOverState {
    /// Milliseconds between checks.
    interval: Option<f64>,
    elapsed: f64,
    x: f64,
    y: f64,
    /// Ancestor chain of the last target, root first.
    targets: Vec<NodeId>,
}

pub struct Stage {
    config: StageConfig,
    tree: SceneTree,
    root: NodeId,
    surface: Surface,
    hit: HitTester,
    /// Pointer records in registration order.
    pointers: Vec<(i32, PointerRecord)>,
    mouse_x: f64,
    mouse_y: f64,
    mouse_in_bounds: bool,
    mouse_over: MouseOverState,
    cursor: CursorIcon,
    next: Option<Box<Stage>>,
}

impl Stage {
    pub fn new(config: StageConfig) -> Result<Self> {
        let surface = Surface::new(config.width, config.height)?;
        let mut tree = SceneTree::new();
        let root = tree.create_container();
        log::debug!("Created {}x{} stage", config.width, config.height);

        let frequency = config.mouse_over_frequency;
        let mut stage = Self {
            config,
            tree,
            root,
            surface,
            hit: HitTester::new()?,
            pointers: Vec::new(),
            mouse_x: 0.0,
            mouse_y: 0.0,
            mouse_in_bounds: false,
            mouse_over: MouseOverState::default(),
            cursor: CursorIcon::Default,
            next: None,
        };
        stage.enable_mouse_over(frequency);
        Ok(stage)
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Settings other than the size, which goes through [`resize`](Self::resize).
    pub fn config_mut(&mut self) -> &mut StageConfig {
        &mut self.config
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// The container every other node hangs off.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Reallocate the surface. Its pixels are lost.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.surface.resize(width, height)?;
        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    fn render_context(&self) -> RenderContext {
        RenderContext {
            snap_to_pixel_enabled: self.config.snap_to_pixel_enabled,
        }
    }

    /// Dispatch a stage-level event at the root.
    fn dispatch_stage_event(&mut self, kind: EventType, cancelable: bool) -> bool {
        self.tree
            .dispatch_event(self.root, SceneEvent::new(kind, false, cancelable))
    }

    /// Tick the scene (if enabled) and redraw it into the surface.
    pub fn update(&mut self, tick: Option<&Tick>) {
        if self.config.tick_on_update {
            self.tick(tick);
        }
        if !self.dispatch_stage_event(EventType::DrawStart, true) {
            return;
        }

        let ctx = self.render_context();
        self.surface.set_transform(&Matrix2D::identity());
        if self.config.auto_clear {
            self.clear();
        }
        self.surface.save();
        if let Some(r) = self.config.draw_rect {
            self.surface.begin_path();
            self.surface.rect(r.x, r.y, r.width, r.height);
            self.surface.clip();
        }
        self.tree.update_context(self.root, &mut self.surface, &ctx);
        self.tree.draw(self.root, &mut self.surface, &ctx, false);
        self.surface.restore();

        self.dispatch_stage_event(EventType::DrawEnd, false);
    }

    /// Entry point for an external clock: ticks and redraws.
    pub fn handle_tick(&mut self, tick: &Tick) {
        self.update(Some(tick));
    }

    /// Propagate a tick through the scene without drawing. A `tickstart`
    /// listener can cancel it.
    pub fn tick(&mut self, tick: Option<&Tick>) {
        let enabled = self.tree.display(self.root).is_some_and(|d| d.tick_enabled);
        if !enabled || !self.dispatch_stage_event(EventType::TickStart, true) {
            return;
        }
        let tick = tick.copied().unwrap_or_default();
        self.tree.tick(self.root, &tick);
        self.dispatch_stage_event(EventType::TickEnd, false);
    }

    /// Clear the draw region, or the whole surface.
    pub fn clear(&mut self) {
        self.surface.save();
        self.surface.reset_transform();
        match self.config.draw_rect {
            Some(r) => self.surface.clear_rect(r.x, r.y, r.width, r.height),
            None => self.surface.clear(),
        }
        self.surface.restore();
    }

    /// Cache a node, honouring the stage's pixel snapping.
    pub fn cache(&mut self, id: NodeId, x: f64, y: f64, width: f64, height: f64, scale: f64) -> Result<()> {
        let ctx = self.render_context();
        self.tree
            .cache_with(id, Rect::new(x, y, width, height), scale, ctx)
    }

    /// Topmost mouse-enabled node under a stage point.
    pub fn object_under_point(&mut self, x: f64, y: f64) -> Option<NodeId> {
        self.hit
            .under_stage_point(&self.tree, self.root, x, y, HitFilter::MouseEnabled)
    }

    /// Encode the surface as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.surface.to_png()
    }

    /// Cursor of the node under the mouse, from the last mouse-over check.
    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    /// Relay pointer input to another stage after this one has handled it.
    /// Returns the previous relay target.
    pub fn set_next_stage(&mut self, next: Option<Stage>) -> Option<Stage> {
        let previous = std::mem::replace(&mut self.next, next.map(Box::new));
        previous.map(|s| *s)
    }

    pub fn next_stage(&self) -> Option<&Stage> {
        self.next.as_deref()
    }

    pub fn next_stage_mut(&mut self) -> Option<&mut Stage> {
        self.next.as_deref_mut()
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("config", &self.config)
            .field("root", &self.root)
            .field("nodes", &self.tree.node_count())
            .field("next", &self.next)
            .finish()
    }
}
