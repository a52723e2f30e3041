//! Events, listeners and dispatch through the node hierarchy.
//!
//! Bubbling events travel in three phases: capture listeners from the root
//! down to the target's parent, then the target itself, then regular
//! listeners from the parent back up to the root. Events that do not bubble
//! only reach the target.
//!
//! Listeners receive the tree along with the event, so they may change the
//! scene while it is being dispatched. Listener lists are snapshotted per
//! node before any of them run.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SceneError};
use crate::tree::{NodeId, SceneTree};

/// Timing information handed to every ticked node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    /// Milliseconds since the previous tick.
    pub delta: f64,
    pub elapsed_time: f64,
    pub total_run_time: f64,
    pub paused: bool,
}

impl Tick {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Added,
    Removed,
    Tick,
    TickStart,
    TickEnd,
    DrawStart,
    DrawEnd,
    MouseDown,
    PressMove,
    PressUp,
    Click,
    DblClick,
    MouseOver,
    MouseOut,
    RollOver,
    RollOut,
    StageMouseDown,
    StageMouseMove,
    StageMouseUp,
    MouseEnter,
    MouseLeave,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Added => "added",
            EventType::Removed => "removed",
            EventType::Tick => "tick",
            EventType::TickStart => "tickstart",
            EventType::TickEnd => "tickend",
            EventType::DrawStart => "drawstart",
            EventType::DrawEnd => "drawend",
            EventType::MouseDown => "mousedown",
            EventType::PressMove => "pressmove",
            EventType::PressUp => "pressup",
            EventType::Click => "click",
            EventType::DblClick => "dblclick",
            EventType::MouseOver => "mouseover",
            EventType::MouseOut => "mouseout",
            EventType::RollOver => "rollover",
            EventType::RollOut => "rollout",
            EventType::StageMouseDown => "stagemousedown",
            EventType::StageMouseMove => "stagemousemove",
            EventType::StageMouseUp => "stagemouseup",
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::Custom(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "added" => EventType::Added,
            "removed" => EventType::Removed,
            "tick" => EventType::Tick,
            "tickstart" => EventType::TickStart,
            "tickend" => EventType::TickEnd,
            "drawstart" => EventType::DrawStart,
            "drawend" => EventType::DrawEnd,
            "mousedown" => EventType::MouseDown,
            "pressmove" => EventType::PressMove,
            "pressup" => EventType::PressUp,
            "click" => EventType::Click,
            "dblclick" => EventType::DblClick,
            "mouseover" => EventType::MouseOver,
            "mouseout" => EventType::MouseOut,
            "rollover" => EventType::RollOver,
            "rollout" => EventType::RollOut,
            "stagemousedown" => EventType::StageMouseDown,
            "stagemousemove" => EventType::StageMouseMove,
            "stagemouseup" => EventType::StageMouseUp,
            "mouseenter" => EventType::MouseEnter,
            "mouseleave" => EventType::MouseLeave,
            other => EventType::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    /// Not being dispatched.
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Pointer details attached to mouse and touch events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerData {
    /// Position on the stage, clamped to its bounds unless moves outside are
    /// allowed.
    pub stage_x: f64,
    pub stage_y: f64,
    /// Unclamped position.
    pub raw_x: f64,
    pub raw_y: f64,
    /// Position in the local space of the current target, updated as the
    /// event moves through the hierarchy.
    pub local_x: f64,
    pub local_y: f64,
    /// -1 for the mouse, otherwise a touch or pen contact id.
    pub pointer_id: i32,
    pub primary: bool,
    /// The node left or entered on over/out style events.
    pub related_target: Option<NodeId>,
}

impl PointerData {
    pub fn new(stage_x: f64, stage_y: f64, pointer_id: i32, primary: bool) -> Self {
        Self {
            stage_x,
            stage_y,
            raw_x: stage_x,
            raw_y: stage_y,
            local_x: stage_x,
            local_y: stage_y,
            pointer_id,
            primary,
            related_target: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneEvent {
    pub kind: EventType,
    pub bubbles: bool,
    pub cancelable: bool,
    pub pointer: Option<PointerData>,
    pub tick: Option<Tick>,
    phase: EventPhase,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    removed: bool,
}

impl SceneEvent {
    pub fn new(kind: impl Into<EventType>, bubbles: bool, cancelable: bool) -> Self {
        Self {
            kind: kind.into(),
            bubbles,
            cancelable,
            pointer: None,
            tick: None,
            phase: EventPhase::None,
            target: None,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            removed: false,
        }
    }

    pub fn with_pointer(mut self, pointer: PointerData) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn with_tick(mut self, tick: Tick) -> Self {
        self.tick = Some(tick);
        self
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node whose listeners are running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Only cancelable events can be prevented.
    pub fn prevent_default(&mut self) {
        self.default_prevented = self.default_prevented || self.cancelable;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Skip the nodes after the current one. Remaining listeners on the
    /// current node still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Unregister the listener that is currently running.
    pub fn remove(&mut self) {
        self.removed = true;
    }
}

/// Handle returned when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Arc<dyn Fn(&mut SceneTree, &mut SceneEvent) + Send + Sync>;

#[derive(Clone)]
pub(crate) struct ListenerEntry {
    id: ListenerId,
    kind: EventType,
    capture: bool,
    callback: Listener,
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("capture", &self.capture)
            .finish()
    }
}

impl SceneTree {
    /// Register a listener for `kind` on `node`. Capture listeners run on
    /// the way down to the target of a bubbling event.
    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        kind: impl Into<EventType>,
        capture: bool,
        callback: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&mut SceneTree, &mut SceneEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        let entry = ListenerEntry {
            id,
            kind: kind.into(),
            capture,
            callback: Arc::new(callback),
        };
        let target = self.node_mut(node).ok_or(SceneError::NodeNotFound(node))?;
        target.listeners.push(entry);
        self.next_listener_id += 1;
        Ok(id)
    }

    /// Shorthand for a regular (non-capture) listener.
    pub fn on<F>(&mut self, node: NodeId, kind: impl Into<EventType>, callback: F) -> Result<ListenerId>
    where
        F: Fn(&mut SceneTree, &mut SceneEvent) + Send + Sync + 'static,
    {
        self.add_event_listener(node, kind, false, callback)
    }

    /// A regular listener that unregisters itself after its first call.
    pub fn once<F>(&mut self, node: NodeId, kind: impl Into<EventType>, callback: F) -> Result<ListenerId>
    where
        F: Fn(&mut SceneTree, &mut SceneEvent) + Send + Sync + 'static,
    {
        self.add_event_listener(node, kind, false, move |tree, event| {
            callback(tree, event);
            event.remove();
        })
    }

    /// Returns whether a listener was removed.
    pub fn remove_event_listener(&mut self, node: NodeId, listener: ListenerId) -> bool {
        let Some(target) = self.node_mut(node) else {
            return false;
        };
        let before = target.listeners.len();
        target.listeners.retain(|l| l.id != listener);
        target.listeners.len() != before
    }

    /// Drop every listener of `node`, or only those for `kind`.
    pub fn remove_all_event_listeners(&mut self, node: NodeId, kind: Option<&EventType>) {
        if let Some(target) = self.node_mut(node) {
            match kind {
                Some(kind) => target.listeners.retain(|l| &l.kind != kind),
                None => target.listeners.clear(),
            }
        }
    }

    /// Whether `node` itself listens for `kind`, in either phase.
    pub fn has_event_listener(&self, node: NodeId, kind: &EventType) -> bool {
        self.node(node)
            .is_some_and(|n| n.listeners.iter().any(|l| &l.kind == kind))
    }

    /// Whether dispatching `kind` on `node` would reach any listener on the
    /// node or its ancestors.
    pub fn will_trigger(&self, node: NodeId, kind: &EventType) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.has_event_listener(id, kind) {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Dispatch `event` with `node` as its target. Returns false if a
    /// listener prevented the default action.
    pub fn dispatch_event(&mut self, node: NodeId, mut event: SceneEvent) -> bool {
        if !self.exists(node) {
            return true;
        }
        event.target = Some(node);
        event.propagation_stopped = false;
        event.immediate_propagation_stopped = false;
        log::trace!("Dispatching {} at {:?}", event.kind, node);

        let parent = self.parent(node);
        if !event.bubbles || parent.is_none() {
            self.dispatch_at(node, &mut event, EventPhase::AtTarget);
        } else {
            let mut path = vec![node];
            path.extend(self.ancestors(node));

            for (i, &id) in path.iter().enumerate().rev() {
                if event.propagation_stopped {
                    break;
                }
                let phase = if i == 0 {
                    EventPhase::AtTarget
                } else {
                    EventPhase::Capturing
                };
                self.dispatch_at(id, &mut event, phase);
            }
            for &id in path.iter().skip(1) {
                if event.propagation_stopped {
                    break;
                }
                self.dispatch_at(id, &mut event, EventPhase::Bubbling);
            }
        }

        event.phase = EventPhase::None;
        event.current_target = None;
        !event.default_prevented
    }

    /// Run the listeners of one node for one phase. At the target, capture
    /// listeners run before regular ones.
    fn dispatch_at(&mut self, node: NodeId, event: &mut SceneEvent, phase: EventPhase) {
        let passes: &[bool] = match phase {
            EventPhase::Capturing => &[true],
            EventPhase::AtTarget => &[true, false],
            EventPhase::Bubbling | EventPhase::None => &[false],
        };
        for &capture in passes {
            let snapshot: Vec<ListenerEntry> = match self.node(node) {
                Some(n) => n
                    .listeners
                    .iter()
                    .filter(|l| l.capture == capture && l.kind == event.kind)
                    .cloned()
                    .collect(),
                None => return,
            };
            if snapshot.is_empty() {
                continue;
            }
            event.current_target = Some(node);
            event.phase = phase;
            if let Some(pointer) = event.pointer.as_mut() {
                if let Some(local) = self.global_to_local(node, pointer.stage_x, pointer.stage_y) {
                    pointer.local_x = local.x;
                    pointer.local_y = local.y;
                }
            }
            for entry in snapshot {
                if event.immediate_propagation_stopped || !self.exists(node) {
                    return;
                }
                event.removed = false;
                (entry.callback)(self, event);
                if event.removed {
                    self.remove_event_listener(node, entry.id);
                    event.removed = false;
                }
            }
        }
    }

    /// Advance `node` and, for containers, its descendants. Children are
    /// ticked topmost first, then the node itself. Nodes with a `tick`
    /// listener receive a `tick` event.
    pub fn tick(&mut self, node: NodeId, tick: &Tick) {
        let Some(n) = self.node(node) else {
            return;
        };
        let tick_children = n.content.container().is_some_and(|c| c.tick_children);
        if tick_children {
            let children = n.children.clone();
            for child in children.into_iter().rev() {
                if self.display(child).is_some_and(|d| d.tick_enabled) {
                    self.tick(child, tick);
                }
            }
        }

        if let Some(n) = self.node_mut(node) {
            n.content.tick(tick);
        }
        if self.has_event_listener(node, &EventType::Tick) {
            self.dispatch_event(node, SceneEvent::new(EventType::Tick, false, false).with_tick(*tick));
        }
    }
}
