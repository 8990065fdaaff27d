use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// Input notifications produced by the render/input thread and consumed by
/// the script thread, named the way scripts see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEventKind {
    MouseEnter,
    MouseLeave,
    MouseDown,
    MouseUp,
    Click,
}

impl InputEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputEventKind::MouseEnter => "mouseenter",
            InputEventKind::MouseLeave => "mouseleave",
            InputEventKind::MouseDown => "mousedown",
            InputEventKind::MouseUp => "mouseup",
            InputEventKind::Click => "click",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub target: String,
}

impl InputEvent {
    pub fn new(kind: InputEventKind, target: impl Into<String>) -> Self {
        Self { kind, target: target.into() }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} target={}", self.kind.as_str(), self.target)
    }
}

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

struct QueueInner {
    events: VecDeque<InputEvent>,
    shutdown: bool,
}

/// Bounded FIFO between the render/input thread (producer) and the script
/// thread (consumer). Push drops the incoming event when full; pop never
/// blocks. Overflow policy is drop-newest: the earliest pushes survive.
pub struct EventQueue {
    capacity: usize,
    inner: Mutex<QueueInner>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(QueueInner {
                events: VecDeque::with_capacity(capacity),
                shutdown: false,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, event: InputEvent) {
        let mut inner = self.lock();
        if inner.events.len() < self.capacity {
            inner.events.push_back(event);
        }
    }

    pub fn pop(&self) -> Option<InputEvent> {
        self.lock().events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    /// Cooperative stop flag polled by the script thread. Does not wake
    /// anyone because pop never blocks.
    pub fn shutdown(&self) {
        self.lock().shutdown = true;
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueInner> {
        self.inner.lock().expect("event queue mutex poisoned")
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
