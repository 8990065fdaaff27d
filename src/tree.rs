use crate::node::{ButtonProps, ChildList, NodeKind, RectProps, TextProps, UiNode};
use crate::color::Color;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Parent id meaning "the root list" in structural operations.
pub const ROOT_PARENT: &str = "";

/// Absolute-coordinate projection of a focusable node, built from the front
/// snapshot for directional navigation. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusableElement {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Default, Clone)]
struct Buffer {
    registry: HashMap<String, UiNode>,
    roots: Vec<String>,
}

/// Immutable deep copy of the back buffer taken at the last swap. Only nodes
/// reachable from the root list are captured, so stale child links never
/// survive into a snapshot.
#[derive(Debug, Default)]
pub struct Snapshot {
    registry: HashMap<String, UiNode>,
    roots: Vec<String>,
}

impl Snapshot {
    fn from_back(back: &Buffer) -> Self {
        let mut snap = Snapshot::default();
        for root_id in &back.roots {
            if snap.copy_reachable(back, root_id, None) {
                snap.roots.push(root_id.clone());
            }
        }
        snap
    }

    fn copy_reachable(&mut self, back: &Buffer, id: &str, parent: Option<&str>) -> bool {
        let Some(src) = back.registry.get(id) else { return false };
        if self.registry.contains_key(id) {
            // Id already captured through another link; drop the duplicate.
            return false;
        }
        let mut copy = UiNode::new(id, src.kind.clone());
        copy.parent = parent.map(str::to_owned);
        self.registry.insert(id.to_owned(), copy);
        let mut kept = ChildList::new();
        for child_id in &src.children {
            if self.copy_reachable(back, child_id, Some(id)) {
                kept.push(child_id.clone());
            }
        }
        if let Some(node) = self.registry.get_mut(id) {
            node.children = kept;
        }
        true
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn get(&self, id: &str) -> Option<&UiNode> {
        self.registry.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Topmost interactive node under the point: reverse z-order over
    /// siblings, children before their parent's own bounds, offsets
    /// accumulated (child coordinates are relative to the parent rect).
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&str> {
        self.hit_children(&self.roots, x, y, 0, 0)
    }

    fn hit_children(&self, ids: &[String], x: i32, y: i32, off_x: i32, off_y: i32) -> Option<&str> {
        for id in ids.iter().rev() {
            if let Some(hit) = self.hit_node(id, x, y, off_x, off_y) {
                return Some(hit);
            }
        }
        None
    }

    fn hit_node(&self, id: &str, x: i32, y: i32, off_x: i32, off_y: i32) -> Option<&str> {
        let node = self.get(id)?;
        match &node.kind {
            NodeKind::Rect(rect) => {
                let abs_x = off_x + rect.x;
                let abs_y = off_y + rect.y;
                if let Some(hit) = self.hit_children(node.children.as_slice(), x, y, abs_x, abs_y) {
                    return Some(hit);
                }
                let inside =
                    x >= abs_x && x < abs_x + rect.w && y >= abs_y && y < abs_y + rect.h;
                inside.then_some(node.id.as_str())
            }
            NodeKind::Button(button) => {
                let abs_x = off_x + button.x;
                let abs_y = off_y + button.y;
                let inside =
                    x >= abs_x && x < abs_x + button.w && y >= abs_y && y < abs_y + button.h;
                inside.then_some(node.id.as_str())
            }
            // Text and raw text are transparent to hits.
            NodeKind::Text(_) | NodeKind::RawText(_) => None,
        }
    }

    /// Every button in the snapshot with absolute bounds, in draw order.
    pub fn focusables(&self) -> Vec<FocusableElement> {
        let mut out = Vec::new();
        self.collect_focusables(&self.roots, 0, 0, &mut out);
        out
    }

    fn collect_focusables(
        &self,
        ids: &[String],
        off_x: i32,
        off_y: i32,
        out: &mut Vec<FocusableElement>,
    ) {
        for id in ids {
            let Some(node) = self.get(id) else { continue };
            match &node.kind {
                NodeKind::Rect(rect) => {
                    self.collect_focusables(
                        node.children.as_slice(),
                        off_x + rect.x,
                        off_y + rect.y,
                        out,
                    );
                }
                NodeKind::Button(button) => out.push(FocusableElement {
                    id: node.id.clone(),
                    x: off_x + button.x,
                    y: off_y + button.y,
                    w: button.w,
                    h: button.h,
                }),
                NodeKind::Text(_) | NodeKind::RawText(_) => {}
            }
        }
    }
}

struct SharedFront {
    front: Mutex<Arc<Snapshot>>,
}

/// Script-thread side of the double buffer: owns the mutable back buffer and
/// publishes immutable snapshots of it via `swap`.
///
/// Mutations are permissive: operating on an unknown id is a silent no-op,
/// never an error. Callers (the script reconciler) are responsible for id
/// uniqueness and detach-before-destroy ordering; violations degrade to
/// stale links that the next swap filters out.
pub struct SceneTree {
    back: Buffer,
    shared: Arc<SharedFront>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self {
            back: Buffer::default(),
            shared: Arc::new(SharedFront { front: Mutex::new(Arc::new(Snapshot::default())) }),
        }
    }

    /// Render-thread handle onto the front snapshot.
    pub fn view(&self) -> SceneView {
        SceneView { shared: Arc::clone(&self.shared) }
    }

    /// Inserts a node. No-op if the id is already taken.
    pub fn create_node(&mut self, id: &str, kind: NodeKind) {
        if id.is_empty() || self.back.registry.contains_key(id) {
            return;
        }
        self.back.registry.insert(id.to_owned(), UiNode::new(id, kind));
    }

    pub fn node(&self, id: &str) -> Option<&UiNode> {
        self.back.registry.get(id)
    }

    pub fn root_ids(&self) -> &[String] {
        &self.back.roots
    }

    pub fn node_count(&self) -> usize {
        self.back.registry.len()
    }

    pub fn set_rect_bounds(&mut self, id: &str, x: i32, y: i32, w: i32, h: i32) -> bool {
        self.with_rect(id, |rect| {
            rect.x = x;
            rect.y = y;
            rect.w = w;
            rect.h = h;
        })
    }

    pub fn set_rect_fill(&mut self, id: &str, fill: Option<Color>) -> bool {
        self.with_rect(id, |rect| rect.fill = fill)
    }

    pub fn set_rect_outline(&mut self, id: &str, outline: Option<Color>) -> bool {
        self.with_rect(id, |rect| rect.outline = outline)
    }

    pub fn set_text_style(
        &mut self,
        id: &str,
        font_size: i32,
        color: Option<Color>,
        border: bool,
    ) -> bool {
        match self.back.registry.get_mut(id) {
            Some(UiNode { kind: NodeKind::Text(text), .. }) => {
                *text = TextProps { font_size, color, border };
                true
            }
            _ => false,
        }
    }

    pub fn set_button_bounds(&mut self, id: &str, x: i32, y: i32, w: i32, h: i32) -> bool {
        self.with_button(id, |button| {
            button.x = x;
            button.y = y;
            button.w = w;
            button.h = h;
        })
    }

    pub fn set_button_color(&mut self, id: &str, color: Color) -> bool {
        self.with_button(id, |button| button.color = color)
    }

    pub fn set_button_label(&mut self, id: &str, label: &str) -> bool {
        self.with_button(id, |button| button.label = label.to_owned())
    }

    pub fn set_button_font_size(&mut self, id: &str, font_size: i32) -> bool {
        self.with_button(id, |button| button.font_size = font_size)
    }

    pub fn set_raw_text(&mut self, id: &str, content: &str) -> bool {
        match self.back.registry.get_mut(id) {
            Some(UiNode { kind: NodeKind::RawText(text), .. }) => {
                *text = content.to_owned();
                true
            }
            _ => false,
        }
    }

    fn with_rect(&mut self, id: &str, apply: impl FnOnce(&mut RectProps)) -> bool {
        match self.back.registry.get_mut(id) {
            Some(UiNode { kind: NodeKind::Rect(rect), .. }) => {
                apply(rect);
                true
            }
            _ => false,
        }
    }

    fn with_button(&mut self, id: &str, apply: impl FnOnce(&mut ButtonProps)) -> bool {
        match self.back.registry.get_mut(id) {
            Some(UiNode { kind: NodeKind::Button(button), .. }) => {
                apply(button);
                true
            }
            _ => false,
        }
    }

    /// Appends `child_id` to `parent_id`'s children (or the root list for
    /// `""`). The child is detached from its previous location first, so a
    /// node never appears in two lists.
    pub fn append_child(&mut self, parent_id: &str, child_id: &str) {
        self.attach(parent_id, child_id, None);
    }

    /// Like `append_child`, but places the child before `before_id` in the
    /// target list. An unknown `before_id` appends at the end.
    pub fn insert_before(&mut self, parent_id: &str, child_id: &str, before_id: &str) {
        self.attach(parent_id, child_id, Some(before_id));
    }

    fn attach(&mut self, parent_id: &str, child_id: &str, before_id: Option<&str>) {
        if !self.back.registry.contains_key(child_id) {
            return;
        }
        if parent_id != ROOT_PARENT && !self.back.registry.contains_key(parent_id) {
            return;
        }
        self.detach(child_id);
        if parent_id == ROOT_PARENT {
            let index = before_id
                .and_then(|before| self.back.roots.iter().position(|id| id == before))
                .unwrap_or(self.back.roots.len());
            self.back.roots.insert(index, child_id.to_owned());
        } else {
            let Some(parent) = self.back.registry.get_mut(parent_id) else { return };
            let index = before_id
                .and_then(|before| parent.children.iter().position(|id| id == before))
                .unwrap_or(parent.children.len());
            parent.children.insert(index, child_id.to_owned());
            if let Some(child) = self.back.registry.get_mut(child_id) {
                child.parent = Some(parent_id.to_owned());
            }
        }
    }

    /// Unlinks a node from wherever it currently sits: its parent's child
    /// list if it has a parent, the root list otherwise.
    fn detach(&mut self, child_id: &str) {
        let parent_id = self.back.registry.get(child_id).and_then(|child| child.parent.clone());
        match parent_id {
            Some(parent_id) => {
                if let Some(parent) = self.back.registry.get_mut(&parent_id) {
                    parent.children.retain(|id| id != child_id);
                }
            }
            None => self.back.roots.retain(|id| id != child_id),
        }
        if let Some(child) = self.back.registry.get_mut(child_id) {
            child.parent = None;
        }
    }

    /// Removes `child_id` from `parent_id`'s children (or the root list).
    /// No-op if either lookup fails or the child is not in that list.
    pub fn remove_child(&mut self, parent_id: &str, child_id: &str) {
        if !self.back.registry.contains_key(child_id) {
            return;
        }
        if parent_id == ROOT_PARENT {
            self.back.roots.retain(|id| id != child_id);
        } else {
            match self.back.registry.get_mut(parent_id) {
                Some(parent) => parent.children.retain(|id| id != child_id),
                None => return,
            }
        }
        if let Some(child) = self.back.registry.get_mut(child_id) {
            child.parent = None;
        }
    }

    /// Drops the node from the registry. Links pointing at it become stale
    /// and are filtered out at the next swap; destroying an unknown id is a
    /// no-op.
    pub fn destroy_node(&mut self, id: &str) {
        self.back.registry.remove(id);
    }

    /// Empties the root list without destroying nodes. Anything left only
    /// in the registry stays there until destroyed explicitly.
    pub fn clear_root(&mut self) {
        self.back.roots.clear();
    }

    /// Publishes the back buffer. The reachable deep copy happens outside
    /// any lock; only the pointer exchange holds the snapshot mutex, and the
    /// previous snapshot is dropped after the lock is released so a render
    /// traversal in progress keeps its tree alive via the shared `Arc`.
    pub fn swap(&mut self) {
        let next = Arc::new(Snapshot::from_back(&self.back));
        let previous = {
            let mut front = self.shared.front.lock().expect("snapshot mutex poisoned");
            std::mem::replace(&mut *front, next)
        };
        drop(previous);
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Render/input-thread handle onto the front snapshot. Cheap to clone.
#[derive(Clone)]
pub struct SceneView {
    shared: Arc<SharedFront>,
}

impl SceneView {
    /// Locks the snapshot for a whole frame. Hold the guard across every
    /// traversal and hit test that must observe one consistent tree.
    pub fn render_lock(&self) -> RenderGuard<'_> {
        RenderGuard { guard: self.shared.front.lock().expect("snapshot mutex poisoned") }
    }

    /// Single-call hit test; locks internally.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<String> {
        self.render_lock().snapshot().hit_test(x, y).map(str::to_owned)
    }

    /// Single-call existence probe against the front snapshot.
    pub fn exists(&self, id: &str) -> bool {
        self.render_lock().snapshot().contains(id)
    }

    pub fn focusables(&self) -> Vec<FocusableElement> {
        self.render_lock().snapshot().focusables()
    }
}

pub struct RenderGuard<'a> {
    guard: MutexGuard<'a, Arc<Snapshot>>,
}

impl RenderGuard<'_> {
    pub fn snapshot(&self) -> &Snapshot {
        &self.guard
    }
}
