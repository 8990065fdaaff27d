use crate::color::Color;
use smallvec::SmallVec;

/// Child id links into the owning buffer's registry. Most nodes carry a
/// handful of children, so keep them inline.
pub type ChildList = SmallVec<[String; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectProps {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub fill: Option<Color>,
    pub outline: Option<Color>,
}

impl RectProps {
    pub fn at(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h, fill: None, outline: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextProps {
    pub font_size: i32,
    pub color: Option<Color>,
    pub border: bool,
}

impl Default for TextProps {
    fn default() -> Self {
        Self { font_size: 0, color: None, border: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonProps {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub color: Color,
    pub label: String,
    pub font_size: i32,
}

impl ButtonProps {
    pub fn at(x: i32, y: i32, w: i32, h: i32, label: impl Into<String>) -> Self {
        Self { x, y, w, h, color: Color::GRAY, label: label.into(), font_size: 0 }
    }
}

/// Tagged node payload. `Text` content lives in `RawText` children and is
/// concatenated at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Rect(RectProps),
    Text(TextProps),
    Button(ButtonProps),
    RawText(String),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Rect(_) => "rect",
            NodeKind::Text(_) => "text",
            NodeKind::Button(_) => "button",
            NodeKind::RawText(_) => "raw_text",
        }
    }
}

/// One node in a buffer. `children` and `parent` are id links; the registry
/// owns every node, so links can go stale and are treated as lookup misses.
#[derive(Debug, Clone, PartialEq)]
pub struct UiNode {
    pub id: String,
    pub kind: NodeKind,
    pub children: ChildList,
    pub parent: Option<String>,
}

impl UiNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self { id: id.into(), kind, children: ChildList::new(), parent: None }
    }
}
