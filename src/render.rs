use crate::color::Color;
use crate::input::InputDevices;
use crate::node::NodeKind;
use crate::tree::Snapshot;
use serde::{Deserialize, Serialize};

pub const TEXT_PADDING: i32 = 8;
pub const TEXT_BORDER_PADDING: i32 = 4;
pub const DEFAULT_TEXT_SIZE: i32 = 30;
pub const DEFAULT_BUTTON_TEXT_SIZE: i32 = 20;
const HOVER_MIX: f32 = 0.4;
const PRESS_MIX: f32 = 0.5;

/// Seam to the rasterizer. Coordinates are absolute pixels; the traversal
/// resolves all parent offsets before calling in.
pub trait DrawSurface {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);
    fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: Color);
    fn text(&mut self, content: &str, x: i32, y: i32, font_size: i32, color: Color);
    fn measure_text(&self, content: &str, font_size: i32) -> i32;
}

/// Draws one frame of the snapshot. The caller must already hold the render
/// lock; pass `guard.snapshot()` so the whole traversal observes a single
/// swap generation.
pub fn draw_snapshot(snapshot: &Snapshot, devices: &InputDevices, surface: &mut impl DrawSurface) {
    draw_children(snapshot, snapshot.roots(), 0, 0, devices, surface);
}

fn draw_children(
    snapshot: &Snapshot,
    ids: &[String],
    off_x: i32,
    off_y: i32,
    devices: &InputDevices,
    surface: &mut impl DrawSurface,
) {
    // Text children stack below one another inside their parent rect.
    let mut text_index = 0;
    for id in ids {
        let Some(node) = snapshot.get(id) else { continue };
        match &node.kind {
            NodeKind::Rect(rect) => {
                let abs_x = off_x + rect.x;
                let abs_y = off_y + rect.y;
                if let Some(fill) = rect.fill {
                    surface.fill_rect(abs_x, abs_y, rect.w, rect.h, fill);
                }
                if let Some(outline) = rect.outline {
                    surface.outline_rect(abs_x, abs_y, rect.w, rect.h, 1, outline);
                }
                draw_children(snapshot, node.children.as_slice(), abs_x, abs_y, devices, surface);
            }
            NodeKind::Text(text) => {
                let mut content = String::new();
                for child_id in &node.children {
                    if let Some(NodeKind::RawText(raw)) =
                        snapshot.get(child_id).map(|child| &child.kind)
                    {
                        content.push_str(raw);
                    }
                }
                let font_size = if text.font_size > 0 { text.font_size } else { DEFAULT_TEXT_SIZE };
                let x = off_x + TEXT_PADDING;
                let y = off_y + TEXT_PADDING + text_index * font_size;
                let color = text.color.unwrap_or(Color::BLACK);
                if text.border {
                    let width = surface.measure_text(&content, font_size);
                    surface.outline_rect(
                        x - TEXT_BORDER_PADDING,
                        y - TEXT_BORDER_PADDING,
                        width + TEXT_BORDER_PADDING * 2,
                        font_size + TEXT_BORDER_PADDING * 2,
                        2,
                        color,
                    );
                }
                surface.text(&content, x, y, font_size, color);
                text_index += 1;
            }
            NodeKind::Button(button) => {
                let abs_x = off_x + button.x;
                let abs_y = off_y + button.y;
                let mut visual = button.color;
                if devices.is_pressed(&node.id) {
                    visual = visual.mix(Color::BLACK, PRESS_MIX);
                } else if devices.is_hovered(&node.id) {
                    visual = visual.mix(Color::WHITE, HOVER_MIX);
                }
                surface.fill_rect(abs_x, abs_y, button.w, button.h, visual);
                let font_size =
                    if button.font_size > 0 { button.font_size } else { DEFAULT_BUTTON_TEXT_SIZE };
                surface.text(
                    &button.label,
                    abs_x + TEXT_PADDING,
                    abs_y + TEXT_PADDING,
                    font_size,
                    Color::SNOW,
                );
            }
            // Raw text only contributes through its parent text node.
            NodeKind::RawText(_) => {}
        }
    }
}

/// Draw call captured by `RecordingSurface`, comparable in tests and
/// serializable into harness reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCall {
    FillRect { x: i32, y: i32, w: i32, h: i32, color: Color },
    OutlineRect { x: i32, y: i32, w: i32, h: i32, thickness: i32, color: Color },
    Text { content: String, x: i32, y: i32, font_size: i32, color: Color },
}

/// Headless surface that records draw calls instead of rasterizing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.calls.push(DrawCall::FillRect { x, y, w, h, color });
    }

    fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: Color) {
        self.calls.push(DrawCall::OutlineRect { x, y, w, h, thickness, color });
    }

    fn text(&mut self, content: &str, x: i32, y: i32, font_size: i32, color: Color) {
        self.calls.push(DrawCall::Text { content: content.to_owned(), x, y, font_size, color });
    }

    fn measure_text(&self, content: &str, font_size: i32) -> i32 {
        // Crude fixed-advance estimate; headless runs only need stable numbers.
        content.chars().count() as i32 * font_size * 3 / 5
    }
}
