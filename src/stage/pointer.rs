//! Pointer routing.
//!
//! Every pointer (the mouse is id `-1`, touch or pen contacts use their own
//! ids) gets a record when first seen. A press remembers the node under the
//! pointer; moves report `pressmove` to that node until release, and a
//! release over the same node also reports `click`.
//!
//! The mouse is the primary pointer whenever it has a record. Otherwise the
//! earliest registered pointer is primary.
//!
//! Stages can be chained with [`Stage::set_next_stage`]. Input is handled by
//! each stage in turn; once a stage has found a target the later stages
//! still see the input but do not hit test it.

use crate::cursor::CursorIcon;
use crate::event::{EventType, PointerData, SceneEvent};
use crate::hit::HitFilter;
use crate::tree::NodeId;

use super::Stage;

/// Mouse-over checks per second when none is given.
const DEFAULT_MOUSE_OVER_FREQUENCY: u32 = 20;

const MOUSE: i32 = -1;

/// Tracked state of one pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerRecord {
    /// Position on the stage, clamped to its edges when tracked outside.
    pub x: f64,
    pub y: f64,
    pub raw_x: f64,
    pub raw_y: f64,
    pub in_bounds: bool,
    /// Node under the pointer when it was pressed.
    pub target: Option<NodeId>,
    /// Pressed while inside the stage.
    pub down: bool,
}

impl Stage {
    /// Current primary pointer id.
    pub fn primary_pointer(&self) -> Option<i32> {
        if self.pointers.iter().any(|(id, _)| *id == MOUSE) {
            return Some(MOUSE);
        }
        self.pointers.first().map(|(id, _)| *id)
    }

    pub fn pointer_data(&self, id: i32) -> Option<&PointerRecord> {
        self.pointers.iter().find(|(p, _)| *p == id).map(|(_, r)| r)
    }

    /// Position of the primary pointer (or the mouse).
    pub fn mouse_x(&self) -> f64 {
        self.mouse_x
    }

    pub fn mouse_y(&self) -> f64 {
        self.mouse_y
    }

    pub fn mouse_in_bounds(&self) -> bool {
        self.mouse_in_bounds
    }

    fn record_mut(&mut self, id: i32) -> &mut PointerRecord {
        let index = match self.pointers.iter().position(|(p, _)| *p == id) {
            Some(index) => index,
            None => {
                log::debug!("Tracking pointer {}", id);
                self.pointers.push((id, PointerRecord::default()));
                self.pointers.len() - 1
            }
        };
        &mut self.pointers[index].1
    }

    fn record(&mut self, id: i32) -> PointerRecord {
        *self.record_mut(id)
    }

    fn update_pointer_position(&mut self, id: i32, x: f64, y: f64) {
        let (w, h) = (f64::from(self.config.width), f64::from(self.config.height));
        let outside = self.config.mouse_move_outside;
        let record = self.record_mut(id);
        record.in_bounds = x >= 0.0 && y >= 0.0 && x <= w - 1.0 && y <= h - 1.0;
        if record.in_bounds {
            record.x = x;
            record.y = y;
        } else if outside {
            record.x = x.clamp(0.0, (w - 1.0).max(0.0));
            record.y = y.clamp(0.0, (h - 1.0).max(0.0));
        }
        record.raw_x = x;
        record.raw_y = y;

        let record = *record;
        if Some(id) == self.primary_pointer() || id == MOUSE {
            self.mouse_x = record.x;
            self.mouse_y = record.y;
            self.mouse_in_bounds = record.in_bounds;
        }
    }

    fn hit_under(&mut self, x: f64, y: f64) -> Option<NodeId> {
        self.hit
            .under_stage_point(&self.tree, self.root, x, y, HitFilter::MouseEnabled)
    }

    /// Dispatch a pointer event. Skipped without a target, and for
    /// non-bubbling events the target does not listen for.
    fn dispatch_pointer_event(
        &mut self,
        target: Option<NodeId>,
        kind: EventType,
        bubbles: bool,
        id: i32,
        related: Option<NodeId>,
    ) {
        let Some(target) = target else {
            return;
        };
        if !bubbles && !self.tree.has_event_listener(target, &kind) {
            return;
        }
        let record = self.pointer_data(id).copied().unwrap_or_default();
        let primary = id == MOUSE || Some(id) == self.primary_pointer();
        let data = PointerData {
            raw_x: record.raw_x,
            raw_y: record.raw_y,
            related_target: related,
            ..PointerData::new(record.x, record.y, id, primary)
        };
        self.tree
            .dispatch_event(target, SceneEvent::new(kind, bubbles, false).with_pointer(data));
    }

    /// A pointer was pressed at stage coordinates `(x, y)`.
    pub fn handle_pointer_down(&mut self, id: i32, x: f64, y: f64) {
        self.pointer_down(id, x, y, None, 0);
    }

    fn pointer_down(&mut self, id: i32, x: f64, y: f64, owner: Option<usize>, depth: usize) {
        self.update_pointer_position(id, x, y);
        let record = self.record(id);
        let target = match owner {
            Some(_) => None,
            None => self.hit_under(record.x, record.y),
        };
        self.record_mut(id).target = target;

        if record.in_bounds {
            let root = Some(self.root);
            self.dispatch_pointer_event(root, EventType::StageMouseDown, false, id, target);
            self.record_mut(id).down = true;
        }
        self.dispatch_pointer_event(target, EventType::MouseDown, true, id, None);

        let owner = owner.or(target.map(|_| depth));
        if let Some(next) = self.next.as_deref_mut() {
            next.pointer_down(id, x, y, owner, depth + 1);
        }
    }

    /// A pointer moved to stage coordinates `(x, y)`.
    pub fn handle_pointer_move(&mut self, id: i32, x: f64, y: f64) {
        self.pointer_move(id, x, y);
    }

    fn pointer_move(&mut self, id: i32, x: f64, y: f64) {
        let was_in_bounds = self.record(id).in_bounds;
        self.update_pointer_position(id, x, y);
        let record = self.record(id);

        if was_in_bounds || record.in_bounds || self.config.mouse_move_outside {
            if id == MOUSE && record.in_bounds != was_in_bounds {
                let kind = if was_in_bounds {
                    EventType::MouseLeave
                } else {
                    EventType::MouseEnter
                };
                self.dispatch_pointer_event(Some(self.root), kind, false, id, None);
            }
            self.dispatch_pointer_event(Some(self.root), EventType::StageMouseMove, false, id, None);
            self.dispatch_pointer_event(record.target, EventType::PressMove, true, id, None);
        }

        if let Some(next) = self.next.as_deref_mut() {
            next.pointer_move(id, x, y);
        }
    }

    /// A pointer was released at `(x, y)`. `clear` forgets the pointer
    /// entirely, as when a touch ends.
    pub fn handle_pointer_up(&mut self, id: i32, x: f64, y: f64, clear: bool) {
        self.pointer_up(id, x, y, clear, None, 0);
    }

    fn pointer_up(&mut self, id: i32, x: f64, y: f64, clear: bool, owner: Option<usize>, depth: usize) {
        self.update_pointer_position(id, x, y);
        let record = self.record(id);
        let held = record.target;
        let target = if owner.is_none() && (held.is_some() || self.next.is_some()) {
            self.hit_under(record.x, record.y)
        } else {
            None
        };

        if record.down {
            let root = Some(self.root);
            self.dispatch_pointer_event(root, EventType::StageMouseUp, false, id, target);
            self.record_mut(id).down = false;
        }
        if held.is_some() && target == held {
            self.dispatch_pointer_event(held, EventType::Click, true, id, None);
        }
        self.dispatch_pointer_event(held, EventType::PressUp, true, id, None);

        if clear {
            self.pointers.retain(|(p, _)| *p != id);
            log::debug!("Released pointer {}", id);
        } else {
            self.record_mut(id).target = None;
        }

        let owner = owner.or(target.map(|_| depth));
        if let Some(next) = self.next.as_deref_mut() {
            next.pointer_up(id, x, y, clear, owner, depth + 1);
        }
    }

    /// A double click with the primary pointer.
    pub fn handle_double_click(&mut self) {
        self.double_click(None, 0);
    }

    fn double_click(&mut self, owner: Option<usize>, depth: usize) {
        let primary = self
            .primary_pointer()
            .and_then(|id| self.pointer_data(id).copied().map(|record| (id, record)));
        let mut target = None;
        if let (None, Some((id, record))) = (owner, primary) {
            target = self.hit_under(record.x, record.y);
            self.dispatch_pointer_event(target, EventType::DblClick, true, id, None);
        }
        let owner = owner.or(target.map(|_| depth));
        if let Some(next) = self.next.as_deref_mut() {
            next.double_click(owner, depth + 1);
        }
    }

    /// Turn periodic mouse-over checks on (`Some(0)` picks the default rate)
    /// or off. The driver reports elapsed time with
    /// [`advance_mouse_over`](Self::advance_mouse_over).
    pub fn enable_mouse_over(&mut self, frequency: Option<u32>) {
        let frequency = frequency.map(|f| if f == 0 { DEFAULT_MOUSE_OVER_FREQUENCY } else { f });
        self.config.mouse_over_frequency = frequency;
        self.mouse_over.interval = frequency.map(|f| 1000.0 / f64::from(f));
        self.mouse_over.elapsed = 0.0;
    }

    /// Advance the mouse-over clock by `elapsed` milliseconds, running a
    /// check when an interval has passed.
    pub fn advance_mouse_over(&mut self, elapsed: f64) {
        let Some(interval) = self.mouse_over.interval else {
            return;
        };
        self.mouse_over.elapsed += elapsed;
        if self.mouse_over.elapsed >= interval {
            self.mouse_over.elapsed %= interval;
            self.test_mouse_over(false);
        }
    }

    /// Recompute what is under the primary pointer and report rollover,
    /// rollout, mouseover and mouseout changes. Without `clear` nothing
    /// happens while the pointer has not moved.
    pub fn test_mouse_over(&mut self, clear: bool) {
        self.mouse_over_pass(clear, None, 0);
    }

    fn mouse_over_pass(&mut self, clear: bool, owner: Option<usize>, depth: usize) {
        if self.mouse_over.interval.is_none() {
            if let Some(next) = self.next.as_deref_mut() {
                next.mouse_over_pass(clear, owner, depth + 1);
            }
            return;
        }
        let Some(id) = self.primary_pointer() else {
            if let Some(next) = self.next.as_deref_mut() {
                next.mouse_over_pass(clear, owner, depth + 1);
            }
            return;
        };
        let unmoved = self.mouse_x == self.mouse_over.x && self.mouse_y == self.mouse_over.y;
        if !clear && unmoved && self.mouse_in_bounds {
            return;
        }

        let mut target = None;
        if owner.is_none() && (clear || self.mouse_in_bounds) {
            target = self.hit_under(self.mouse_x, self.mouse_y);
            self.mouse_over.x = self.mouse_x;
            self.mouse_over.y = self.mouse_y;
        }

        let old_list = std::mem::take(&mut self.mouse_over.targets);
        let old_target = old_list.last().copied();

        let mut list = Vec::new();
        let mut cursor = None;
        let mut current = target;
        while let Some(node) = current {
            list.push(node);
            if cursor.is_none() {
                cursor = self.tree.display(node).and_then(|d| d.cursor);
            }
            current = self.tree.parent(node);
        }
        list.reverse();
        self.cursor = cursor.unwrap_or(CursorIcon::Default);

        let common = list
            .iter()
            .zip(&old_list)
            .take_while(|(a, b)| a == b)
            .count();

        if old_target != target {
            self.dispatch_pointer_event(old_target, EventType::MouseOut, true, id, target);
        }
        for &node in old_list[common..].iter().rev() {
            self.dispatch_pointer_event(Some(node), EventType::RollOut, false, id, target);
        }
        for &node in &list[common..] {
            self.dispatch_pointer_event(Some(node), EventType::RollOver, false, id, old_target);
        }
        if old_target != target {
            self.dispatch_pointer_event(target, EventType::MouseOver, true, id, old_target);
        }
        self.mouse_over.targets = list;

        let owner = owner.or(target.map(|_| depth));
        if let Some(next) = self.next.as_deref_mut() {
            next.mouse_over_pass(clear, owner, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::graphics::Graphics;
    use crate::stage::StageConfig;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn square(stage: &mut Stage, parent: NodeId, x: f64, size: f64) -> NodeId {
        let mut g = Graphics::new();
        g.begin_fill(Color::RED).draw_rect(0.0, 0.0, size, size);
        let tree = stage.tree_mut();
        let id = tree.create_shape(g);
        tree.display_mut(id).unwrap().x = x;
        tree.add_child(parent, id).unwrap();
        id
    }

    fn listen(stage: &mut Stage, node: NodeId, kinds: &[EventType], label: &str, log: &Log) {
        for kind in kinds {
            let log = log.clone();
            let label = label.to_string();
            stage
                .tree_mut()
                .on(node, kind.clone(), move |_, e| {
                    log.lock().unwrap().push(format!("{}:{label}", e.kind));
                })
                .unwrap();
        }
    }

    #[test]
    fn test_primary_pointer_rule() {
        let mut stage = Stage::new(StageConfig::new(10, 10)).unwrap();
        assert_eq!(stage.primary_pointer(), None);

        stage.handle_pointer_down(3, 1.0, 1.0);
        stage.handle_pointer_down(4, 2.0, 2.0);
        assert_eq!(stage.primary_pointer(), Some(3));

        stage.handle_pointer_move(MOUSE, 5.0, 5.0);
        assert_eq!(stage.primary_pointer(), Some(MOUSE));

        stage.handle_pointer_up(MOUSE, 5.0, 5.0, true);
        assert_eq!(stage.primary_pointer(), Some(3));
        stage.handle_pointer_up(3, 1.0, 1.0, true);
        assert_eq!(stage.primary_pointer(), Some(4));
        assert!(stage.pointer_data(3).is_none());
    }

    #[test]
    fn test_position_tracking() {
        let mut stage = Stage::new(StageConfig::new(10, 10)).unwrap();
        stage.handle_pointer_move(MOUSE, 4.0, 5.0);
        assert_eq!((stage.mouse_x(), stage.mouse_y()), (4.0, 5.0));
        assert!(stage.mouse_in_bounds());

        // Outside positions are ignored unless tracked outside.
        stage.handle_pointer_move(MOUSE, 20.0, 5.0);
        assert_eq!(stage.mouse_x(), 4.0);
        assert!(!stage.mouse_in_bounds());
        assert_eq!(stage.pointer_data(MOUSE).unwrap().raw_x, 20.0);

        stage.config_mut().mouse_move_outside = true;
        stage.handle_pointer_move(MOUSE, 20.0, -3.0);
        assert_eq!((stage.mouse_x(), stage.mouse_y()), (9.0, 0.0));
    }

    #[test]
    fn test_press_sequence_and_click() {
        let mut stage = Stage::new(StageConfig::new(40, 20)).unwrap();
        let root = stage.root();
        let a = square(&mut stage, root, 0.0, 10.0);
        let b = square(&mut stage, root, 20.0, 10.0);
        let log: Log = Arc::default();
        let kinds = [
            EventType::MouseDown,
            EventType::PressMove,
            EventType::PressUp,
            EventType::Click,
        ];
        listen(&mut stage, a, &kinds, "a", &log);
        listen(&mut stage, b, &kinds, "b", &log);
        listen(&mut stage, root, &[EventType::StageMouseDown, EventType::StageMouseUp], "stage", &log);

        stage.handle_pointer_down(MOUSE, 5.0, 5.0);
        stage.handle_pointer_move(MOUSE, 6.0, 5.0);
        stage.handle_pointer_up(MOUSE, 6.0, 5.0, false);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "stagemousedown:stage",
                "mousedown:a",
                "pressmove:a",
                "stagemouseup:stage",
                "click:a",
                "pressup:a",
            ]
        );

        log.lock().unwrap().clear();
        stage.handle_pointer_down(MOUSE, 5.0, 5.0);
        stage.handle_pointer_move(MOUSE, 25.0, 5.0);
        stage.handle_pointer_up(MOUSE, 25.0, 5.0, false);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "stagemousedown:stage",
                "mousedown:a",
                "pressmove:a",
                "stagemouseup:stage",
                "pressup:a",
            ]
        );
        assert_eq!(stage.pointer_data(MOUSE).unwrap().target, None);
    }

    #[test]
    fn test_pointer_events_bubble_with_local_position() {
        let mut stage = Stage::new(StageConfig::new(40, 40)).unwrap();
        let root = stage.root();
        let group = stage.tree_mut().create_container();
        stage.tree_mut().add_child(root, group).unwrap();
        stage.tree_mut().display_mut(group).unwrap().x = 10.0;
        square(&mut stage, group, 0.0, 10.0);

        let seen = Arc::new(Mutex::new(None));
        let out = seen.clone();
        stage
            .tree_mut()
            .on(group, EventType::MouseDown, move |_, e| {
                let p = e.pointer.unwrap();
                *out.lock().unwrap() = Some((p.local_x, p.stage_x, p.primary));
            })
            .unwrap();

        stage.handle_pointer_down(7, 12.0, 3.0);
        assert_eq!(*seen.lock().unwrap(), Some((2.0, 12.0, true)));
    }

    #[test]
    fn test_mouse_enter_and_leave() {
        let mut stage = Stage::new(StageConfig::new(10, 10)).unwrap();
        let root = stage.root();
        let log: Log = Arc::default();
        listen(&mut stage, root, &[EventType::MouseEnter, EventType::MouseLeave], "stage", &log);

        stage.handle_pointer_move(MOUSE, 5.0, 5.0);
        stage.handle_pointer_move(MOUSE, 6.0, 5.0);
        stage.handle_pointer_move(MOUSE, 50.0, 5.0);
        // Touch pointers never enter or leave.
        stage.handle_pointer_move(2, 5.0, 5.0);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["mouseenter:stage", "mouseleave:stage"]
        );
    }

    #[test]
    fn test_double_click() {
        let mut stage = Stage::new(StageConfig::new(20, 20)).unwrap();
        let root = stage.root();
        let a = square(&mut stage, root, 0.0, 10.0);
        let log: Log = Arc::default();
        listen(&mut stage, a, &[EventType::DblClick], "a", &log);

        stage.handle_pointer_move(MOUSE, 3.0, 3.0);
        stage.handle_double_click();
        assert_eq!(*log.lock().unwrap(), vec!["dblclick:a"]);
    }

    #[test]
    fn test_double_click_without_pointer_tracks_nothing() {
        let mut stage = Stage::new(StageConfig::new(100, 100)).unwrap();
        stage.handle_double_click();
        assert_eq!(stage.primary_pointer(), None);
        assert!(stage.pointer_data(MOUSE).is_none());

        stage.handle_pointer_down(7, 10.0, 10.0);
        assert_eq!(stage.primary_pointer(), Some(7));
        assert_eq!((stage.mouse_x(), stage.mouse_y()), (10.0, 10.0));
    }

    #[test]
    fn test_mouse_over_sequence() {
        let mut stage = Stage::new(StageConfig::new(40, 20).mouse_over(Some(10))).unwrap();
        let root = stage.root();
        let group = stage.tree_mut().create_container();
        stage.tree_mut().add_child(root, group).unwrap();
        let a = square(&mut stage, group, 0.0, 10.0);
        let b = square(&mut stage, root, 20.0, 10.0);
        stage.tree_mut().display_mut(group).unwrap().cursor = Some(CursorIcon::Pointer);

        let log: Log = Arc::default();
        let kinds = [
            EventType::MouseOver,
            EventType::MouseOut,
            EventType::RollOver,
            EventType::RollOut,
        ];
        listen(&mut stage, group, &kinds[2..], "group", &log);
        listen(&mut stage, a, &kinds, "a", &log);
        listen(&mut stage, b, &kinds, "b", &log);

        stage.handle_pointer_move(MOUSE, 5.0, 5.0);
        stage.advance_mouse_over(50.0);
        assert!(log.lock().unwrap().is_empty());
        stage.advance_mouse_over(50.0);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["rollover:group", "rollover:a", "mouseover:a"]
        );
        assert_eq!(stage.cursor(), CursorIcon::Pointer);

        log.lock().unwrap().clear();
        stage.test_mouse_over(false);
        assert!(log.lock().unwrap().is_empty());

        stage.handle_pointer_move(MOUSE, 25.0, 5.0);
        stage.test_mouse_over(false);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["mouseout:a", "rollout:a", "rollout:group", "rollover:b", "mouseover:b"]
        );
        assert_eq!(stage.cursor(), CursorIcon::Default);
    }

    #[test]
    fn test_relay_chain_has_one_owner() {
        let mut front = Stage::new(StageConfig::new(20, 20)).unwrap();
        let mut back = Stage::new(StageConfig::new(20, 20)).unwrap();

        let log: Log = Arc::default();
        let front_root = front.root();
        let front_node = square(&mut front, front_root, 0.0, 10.0);
        listen(&mut front, front_node, &[EventType::MouseDown], "front", &log);
        let back_root = back.root();
        let back_node = square(&mut back, back_root, 0.0, 20.0);
        listen(&mut back, back_node, &[EventType::MouseDown], "back", &log);
        listen(&mut back, back_root, &[EventType::StageMouseDown], "back-stage", &log);
        front.set_next_stage(Some(back));

        // Over both: the front stage claims the press.
        front.handle_pointer_down(MOUSE, 5.0, 5.0);
        // Only the back stage has content here.
        front.handle_pointer_down(MOUSE, 15.0, 15.0);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "mousedown:front",
                "stagemousedown:back-stage",
                "stagemousedown:back-stage",
                "mousedown:back",
            ]
        );
    }

    /// Front stage with a 10x10 node at the origin, relaying to a back
    /// stage whose node covers it entirely.
    fn relay_pair(config: StageConfig) -> (Stage, NodeId, NodeId) {
        let mut front = Stage::new(config.clone()).unwrap();
        let mut back = Stage::new(config).unwrap();
        let front_root = front.root();
        let front_node = square(&mut front, front_root, 0.0, 10.0);
        let back_root = back.root();
        let back_node = square(&mut back, back_root, 0.0, 20.0);
        front.set_next_stage(Some(back));
        (front, front_node, back_node)
    }

    #[test]
    fn test_relay_release_clicks_only_the_owner() {
        let (mut front, front_node, back_node) = relay_pair(StageConfig::new(20, 20));
        let log: Log = Arc::default();
        let front_root = front.root();
        listen(&mut front, front_node, &[EventType::Click], "front", &log);
        listen(&mut front, front_root, &[EventType::StageMouseUp], "front-stage", &log);
        let back = front.next_stage_mut().unwrap();
        let back_root = back.root();
        listen(back, back_node, &[EventType::Click], "back", &log);
        listen(back, back_root, &[EventType::StageMouseUp], "back-stage", &log);

        front.handle_pointer_down(MOUSE, 5.0, 5.0);
        front.handle_pointer_up(MOUSE, 5.0, 5.0, false);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["stagemouseup:front-stage", "click:front", "stagemouseup:back-stage"]
        );

        log.lock().unwrap().clear();
        front.handle_pointer_down(MOUSE, 15.0, 15.0);
        front.handle_pointer_up(MOUSE, 15.0, 15.0, false);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["stagemouseup:front-stage", "stagemouseup:back-stage", "click:back"]
        );
    }

    #[test]
    fn test_relay_double_click_has_one_owner() {
        let (mut front, front_node, back_node) = relay_pair(StageConfig::new(20, 20));
        let log: Log = Arc::default();
        listen(&mut front, front_node, &[EventType::DblClick], "front", &log);
        let back = front.next_stage_mut().unwrap();
        listen(back, back_node, &[EventType::DblClick], "back", &log);

        front.handle_pointer_move(MOUSE, 5.0, 5.0);
        front.handle_double_click();
        front.handle_pointer_move(MOUSE, 15.0, 15.0);
        front.handle_double_click();
        assert_eq!(*log.lock().unwrap(), vec!["dblclick:front", "dblclick:back"]);
    }

    #[test]
    fn test_relay_mouse_over_clears_back_stage_when_front_owns() {
        let (mut front, front_node, back_node) =
            relay_pair(StageConfig::new(20, 20).mouse_over(Some(10)));
        let log: Log = Arc::default();
        let kinds = [EventType::RollOver, EventType::RollOut];
        listen(&mut front, front_node, &kinds, "front", &log);
        let back = front.next_stage_mut().unwrap();
        listen(back, back_node, &kinds, "back", &log);

        front.handle_pointer_move(MOUSE, 15.0, 15.0);
        front.test_mouse_over(false);
        assert_eq!(*log.lock().unwrap(), vec!["rollover:back"]);
        assert_eq!(front.next_stage().unwrap().mouse_over.targets.len(), 2);

        log.lock().unwrap().clear();
        front.handle_pointer_move(MOUSE, 5.0, 5.0);
        front.test_mouse_over(false);
        assert_eq!(*log.lock().unwrap(), vec!["rollover:front", "rollout:back"]);
        assert!(front.next_stage().unwrap().mouse_over.targets.is_empty());
        assert_eq!(front.mouse_over.targets.last(), Some(&front_node));
    }
}
