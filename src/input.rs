use crate::event_queue::{EventQueue, InputEvent, InputEventKind};
use crate::tree::{FocusableElement, SceneView};

/// Per-frame pointer reading. Device register access stays outside the
/// core; the platform shim fills one of these per poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerSample {
    pub x: i32,
    pub y: i32,
    pub down: bool,
}

/// Per-frame touch reading; `contact` is the primary touch point, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSample {
    pub contact: Option<(i32, i32)>,
}

/// Per-frame directional-pad reading. The direction flags are edge
/// triggered (pressed this frame); `confirm` is level triggered (held).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavSample {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Default)]
struct PointerState {
    prev_down: bool,
    hovered: Option<String>,
    pressed: Option<String>,
}

#[derive(Debug, Default)]
struct TouchState {
    prev_down: bool,
    hovered: Option<String>,
    pressed: Option<String>,
}

#[derive(Debug, Default)]
struct NavState {
    prev_confirm: bool,
    focused: Option<String>,
    pressed: Option<String>,
}

/// Hover/press/focus derivation for all input devices, owned by the
/// render/input thread. Each poll hit-tests the current front snapshot and
/// emits one event per observed transition into the queue; a tracked id
/// that no longer exists in the snapshot is treated as already left or
/// released before anything else is emitted.
#[derive(Debug, Default)]
pub struct InputDevices {
    pointer: PointerState,
    touch: TouchState,
    nav: NavState,
}

impl InputDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any device is hovering or focusing the node. Drives button
    /// hover feedback.
    pub fn is_hovered(&self, id: &str) -> bool {
        matches_id(&self.pointer.hovered, id)
            || matches_id(&self.touch.hovered, id)
            || matches_id(&self.nav.focused, id)
    }

    /// True when any device holds the node pressed.
    pub fn is_pressed(&self, id: &str) -> bool {
        matches_id(&self.pointer.pressed, id)
            || matches_id(&self.touch.pressed, id)
            || matches_id(&self.nav.pressed, id)
    }

    pub fn poll_pointer(&mut self, sample: PointerSample, view: &SceneView, queue: &EventQueue) {
        let top = view.hit_test(sample.x, sample.y);

        drop_if_stale(&mut self.pointer.hovered, view);
        drop_if_stale(&mut self.pointer.pressed, view);

        if self.pointer.hovered != top {
            // Pointer activity steals navigation focus.
            self.clear_focus(queue);
            if let Some(prev) = self.pointer.hovered.take() {
                queue.push(InputEvent::new(InputEventKind::MouseLeave, prev));
            }
            if let Some(id) = top.clone() {
                queue.push(InputEvent::new(InputEventKind::MouseEnter, id.clone()));
                self.pointer.hovered = Some(id);
            }
        }

        let just_pressed = sample.down && !self.pointer.prev_down;
        let just_released = !sample.down && self.pointer.prev_down;

        if just_pressed {
            self.clear_focus(queue);
            if let Some(id) = top {
                queue.push(InputEvent::new(InputEventKind::MouseDown, id.clone()));
                self.pointer.pressed = Some(id);
            }
        }

        if just_released {
            if let Some(id) = self.pointer.pressed.take() {
                queue.push(InputEvent::new(InputEventKind::MouseUp, id.clone()));
                if matches_id(&self.pointer.hovered, &id) {
                    queue.push(InputEvent::new(InputEventKind::Click, id));
                }
            }
        }

        self.pointer.prev_down = sample.down;
    }

    pub fn poll_touch(&mut self, sample: TouchSample, view: &SceneView, queue: &EventQueue) {
        let down = sample.contact.is_some();
        let top = sample.contact.and_then(|(x, y)| view.hit_test(x, y));

        drop_if_stale(&mut self.touch.hovered, view);
        drop_if_stale(&mut self.touch.pressed, view);

        // Hover only tracks while the finger is down.
        if down && self.touch.hovered != top {
            if let Some(prev) = self.touch.hovered.take() {
                queue.push(InputEvent::new(InputEventKind::MouseLeave, prev));
            }
            if let Some(id) = top.clone() {
                queue.push(InputEvent::new(InputEventKind::MouseEnter, id.clone()));
                self.touch.hovered = Some(id);
            }
        }

        let just_pressed = down && !self.touch.prev_down;
        let just_released = !down && self.touch.prev_down;

        if just_pressed {
            self.clear_focus(queue);
            if let Some(id) = top {
                queue.push(InputEvent::new(InputEventKind::MouseDown, id.clone()));
                self.touch.pressed = Some(id);
            }
        }

        if just_released {
            if let Some(id) = self.touch.pressed.take() {
                queue.push(InputEvent::new(InputEventKind::MouseUp, id.clone()));
                if matches_id(&self.touch.hovered, &id) {
                    queue.push(InputEvent::new(InputEventKind::Click, id));
                }
            }
            // Lift always ends the hover.
            if let Some(prev) = self.touch.hovered.take() {
                queue.push(InputEvent::new(InputEventKind::MouseLeave, prev));
            }
        }

        self.touch.prev_down = down;
    }

    pub fn poll_nav(&mut self, sample: NavSample, view: &SceneView, queue: &EventQueue) {
        drop_if_stale(&mut self.nav.focused, view);
        drop_if_stale(&mut self.nav.pressed, view);

        let direction = if sample.up {
            Some(NavDirection::Up)
        } else if sample.down {
            Some(NavDirection::Down)
        } else if sample.left {
            Some(NavDirection::Left)
        } else if sample.right {
            Some(NavDirection::Right)
        } else {
            None
        };

        if let Some(direction) = direction {
            let next =
                nearest_focusable(&view.focusables(), self.nav.focused.as_deref(), direction);
            if let Some(next) = next {
                self.set_focus(next, queue);
            }
        }

        let just_pressed = sample.confirm && !self.nav.prev_confirm;
        let just_released = !sample.confirm && self.nav.prev_confirm;

        if just_pressed {
            if let Some(id) = self.nav.focused.clone() {
                queue.push(InputEvent::new(InputEventKind::MouseDown, id.clone()));
                self.nav.pressed = Some(id);
            }
        }

        if just_released {
            if let Some(id) = self.nav.pressed.take() {
                queue.push(InputEvent::new(InputEventKind::MouseUp, id.clone()));
                if matches_id(&self.nav.focused, &id) {
                    queue.push(InputEvent::new(InputEventKind::Click, id));
                }
            }
        }

        self.nav.prev_confirm = sample.confirm;
    }

    fn set_focus(&mut self, next: String, queue: &EventQueue) {
        if matches_id(&self.nav.focused, &next) {
            return;
        }
        if let Some(prev) = self.nav.focused.take() {
            queue.push(InputEvent::new(InputEventKind::MouseLeave, prev));
        }
        queue.push(InputEvent::new(InputEventKind::MouseEnter, next.clone()));
        self.nav.focused = Some(next);
    }

    /// Drops navigation focus, notifying the focused node. The held nav
    /// press is abandoned without events.
    fn clear_focus(&mut self, queue: &EventQueue) {
        if let Some(prev) = self.nav.focused.take() {
            queue.push(InputEvent::new(InputEventKind::MouseLeave, prev));
        }
        self.nav.pressed = None;
    }
}

fn matches_id(slot: &Option<String>, id: &str) -> bool {
    slot.as_deref() == Some(id)
}

fn drop_if_stale(slot: &mut Option<String>, view: &SceneView) {
    if let Some(id) = slot.as_deref() {
        if !view.exists(id) {
            *slot = None;
        }
    }
}

/// Nearest focusable in the requested direction, by weighted Manhattan
/// score between element centers: primary-axis distance plus twice the
/// perpendicular distance, over candidates strictly in that direction.
/// With no current focus the first focusable wins.
pub fn nearest_focusable(
    elements: &[FocusableElement],
    focused: Option<&str>,
    direction: NavDirection,
) -> Option<String> {
    if elements.is_empty() {
        return None;
    }
    let current = focused.and_then(|id| elements.iter().find(|element| element.id == id));
    let Some(current) = current else {
        return Some(elements[0].id.clone());
    };

    let (cur_cx, cur_cy) = center(current);
    let mut best: Option<(&FocusableElement, i64)> = None;
    for candidate in elements {
        if candidate.id == current.id {
            continue;
        }
        let (cx, cy) = center(candidate);
        let dx = (cx - cur_cx) as i64;
        let dy = (cy - cur_cy) as i64;
        let in_direction = match direction {
            NavDirection::Up => dy < 0,
            NavDirection::Down => dy > 0,
            NavDirection::Left => dx < 0,
            NavDirection::Right => dx > 0,
        };
        if !in_direction {
            continue;
        }
        let (primary, secondary) = match direction {
            NavDirection::Up | NavDirection::Down => (dy.abs(), dx.abs()),
            NavDirection::Left | NavDirection::Right => (dx.abs(), dy.abs()),
        };
        let score = primary + secondary * 2;
        if best.map_or(true, |(_, best_score)| score < best_score) {
            best = Some((candidate, score));
        }
    }
    best.map(|(element, _)| element.id.clone())
}

fn center(element: &FocusableElement) -> (i32, i32) {
    (element.x + element.w / 2, element.y + element.h / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, x: i32, y: i32) -> FocusableElement {
        FocusableElement { id: id.to_owned(), x, y, w: 40, h: 20 }
    }

    #[test]
    fn nav_prefers_aligned_candidates() {
        let elements = vec![
            element("origin", 100, 100),
            element("aligned", 100, 160),
            element("offset", 140, 150),
        ];
        // aligned scores 60, offset scores 50 + 2*40 = 130.
        let next = nearest_focusable(&elements, Some("origin"), NavDirection::Down);
        assert_eq!(next.as_deref(), Some("aligned"));
    }

    #[test]
    fn nav_ignores_candidates_behind_the_origin() {
        let elements = vec![element("origin", 100, 100), element("above", 100, 40)];
        assert_eq!(nearest_focusable(&elements, Some("origin"), NavDirection::Down), None);
        assert_eq!(
            nearest_focusable(&elements, Some("origin"), NavDirection::Up).as_deref(),
            Some("above")
        );
    }

    #[test]
    fn nav_with_no_focus_picks_the_first_element() {
        let elements = vec![element("first", 0, 0), element("second", 100, 0)];
        assert_eq!(
            nearest_focusable(&elements, None, NavDirection::Left).as_deref(),
            Some("first")
        );
        assert_eq!(
            nearest_focusable(&elements, Some("gone"), NavDirection::Left).as_deref(),
            Some("first")
        );
    }
}
