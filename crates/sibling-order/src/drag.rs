//! Drag Gesture Model
//!
//! Pointer-driven drag-and-drop over a vertical sibling list, independent of
//! any UI toolkit. Uses a movement threshold to tell a click from a drag.

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// A finished drag: move the sibling at `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    /// Button down on a sibling, not yet moved far enough
    Pending { index: usize, start_x: i32, start_y: i32 },
    Dragging { index: usize, target: Option<usize> },
}

/// Drag state for one list.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragSession {
    state: State,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary button pressed on the sibling at `index`.
    pub fn press(&mut self, index: usize, x: i32, y: i32) {
        if matches!(self.state, State::Dragging { .. }) {
            return;
        }
        self.state = State::Pending {
            index,
            start_x: x,
            start_y: y,
        };
    }

    /// Pointer moved. Starts the drag once the threshold is crossed on either axis.
    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if let State::Pending {
            index,
            start_x,
            start_y,
        } = self.state
        {
            let dx = (x - start_x).abs();
            let dy = (y - start_y).abs();
            if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
                self.state = State::Dragging { index, target: None };
            }
        }
    }

    /// Pointer entered the slot at `index` while dragging.
    pub fn hover(&mut self, index: usize) {
        if let State::Dragging { target, .. } = &mut self.state {
            *target = Some(index);
        }
    }

    /// Pointer left the current slot.
    pub fn leave(&mut self) {
        if let State::Dragging { target, .. } = &mut self.state {
            *target = None;
        }
    }

    /// Button released. Returns a move only for a real drag onto another slot.
    pub fn release(&mut self) -> Option<DropOutcome> {
        let state = std::mem::take(&mut self.state);
        match state {
            State::Dragging {
                index,
                target: Some(to),
            } if to != index => Some(DropOutcome { from: index, to }),
            _ => None,
        }
    }

    pub fn dragging(&self) -> Option<usize> {
        match self.state {
            State::Dragging { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn drop_target(&self) -> Option<usize> {
        match self.state {
            State::Dragging { target, .. } => target,
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_without_movement_is_not_a_drag() {
        let mut dnd = DragSession::new();
        dnd.press(0, 10, 10);
        dnd.pointer_move(12, 13);
        assert_eq!(dnd.dragging(), None);
        assert_eq!(dnd.release(), None);
        assert!(dnd.is_idle());
    }

    #[test]
    fn test_drag_onto_other_slot() {
        let mut dnd = DragSession::new();
        dnd.press(0, 10, 10);
        dnd.pointer_move(10, 40);
        assert_eq!(dnd.dragging(), Some(0));

        dnd.hover(2);
        assert_eq!(dnd.drop_target(), Some(2));
        assert_eq!(dnd.release(), Some(DropOutcome { from: 0, to: 2 }));
        assert!(dnd.is_idle());
    }

    #[test]
    fn test_drop_on_own_slot_is_noop() {
        let mut dnd = DragSession::new();
        dnd.press(1, 0, 0);
        dnd.pointer_move(0, 20);
        dnd.hover(1);
        assert_eq!(dnd.release(), None);
    }

    #[test]
    fn test_leaving_clears_target() {
        let mut dnd = DragSession::new();
        dnd.press(1, 0, 0);
        dnd.pointer_move(20, 0);
        dnd.hover(3);
        dnd.leave();
        assert_eq!(dnd.release(), None);
    }

    #[test]
    fn test_press_ignored_while_dragging() {
        let mut dnd = DragSession::new();
        dnd.press(0, 0, 0);
        dnd.pointer_move(0, 30);
        dnd.press(2, 0, 0);
        assert_eq!(dnd.dragging(), Some(0));
    }
}
