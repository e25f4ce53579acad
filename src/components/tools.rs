use crate::canvas::{IPoint, PixelBuffer};
use crate::components::history::HistoryManager;
use crate::ops::render::{self, RenderMode};

pub const MIN_BRUSH_WIDTH: u32 = 1;
pub const MAX_BRUSH_WIDTH: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Line,
    Rect,
    Ellipse,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[Tool::Pen, Tool::Eraser, Tool::Line, Tool::Rect, Tool::Ellipse]
    }

    /// Pen and Eraser paint into the committed buffer on every move.
    pub fn is_continuous(self) -> bool {
        matches!(self, Tool::Pen | Tool::Eraser)
    }

    pub fn label(self) -> String {
        match self {
            Tool::Pen => t!("tool.pen"),
            Tool::Eraser => t!("tool.eraser"),
            Tool::Line => t!("tool.line"),
            Tool::Rect => t!("tool.rect"),
            Tool::Ellipse => t!("tool.ellipse"),
        }
    }

    /// Tool by the name scripts use.
    pub fn from_name(name: &str) -> Option<Tool> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pen" | "brush" => Some(Tool::Pen),
            "eraser" => Some(Tool::Eraser),
            "line" => Some(Tool::Line),
            "rect" | "rectangle" => Some(Tool::Rect),
            "ellipse" => Some(Tool::Ellipse),
            _ => None,
        }
    }

    /// Keyboard digit (1-5) bound to this tool.
    pub fn shortcut_digit(self) -> u8 {
        match self {
            Tool::Pen => 1,
            Tool::Eraser => 2,
            Tool::Line => 3,
            Tool::Rect => 4,
            Tool::Ellipse => 5,
        }
    }
}

/// Per-tool style read by the render pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushStyle {
    pub color: [u8; 3],
    width: u32,
    /// Rect/Ellipse only.
    pub fill_shapes: bool,
    /// Shapes and Pen; never Eraser.
    pub glow: bool,
    /// Display-only; never baked into pixels.
    pub grid_overlay: bool,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            color: [0, 191, 255],
            width: 8,
            fill_shapes: false,
            glow: false,
            grid_overlay: false,
        }
    }
}

impl BrushStyle {
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Clamps into [1, 60] instead of rejecting.
    pub fn set_width(&mut self, px: i32) {
        self.width = (px.max(0) as u32).clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
    }

    pub fn rgba(&self, alpha: u8) -> [u8; 4] {
        [self.color[0], self.color[1], self.color[2], alpha]
    }

    pub fn hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            self.color[0], self.color[1], self.color[2]
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

// ============================================================================
// GESTURE STATE MACHINE
// ============================================================================

/// One pointer-down-to-up interaction. Tool and style are captured when the
/// gesture starts, so mid-gesture setter calls only affect the next gesture.
#[derive(Clone, Debug, Default)]
pub enum GestureState {
    #[default]
    Idle,
    ContinuousStroke {
        tool: Tool,
        style: BrushStyle,
        last: IPoint,
    },
    ShapeDrag {
        tool: Tool,
        style: BrushStyle,
        start: IPoint,
        current: IPoint,
        scratch: PixelBuffer,
    },
}

/// Active tool, style and the in-flight gesture.
#[derive(Default)]
pub struct ToolState {
    pub active_tool: Tool,
    pub style: BrushStyle,
    gesture: GestureState,
}

impl ToolState {
    pub fn is_stroke_active(&self) -> bool {
        !matches!(self.gesture, GestureState::Idle)
    }

    /// Start a gesture. Ignored without a canvas, for non-primary buttons,
    /// or while another gesture is in flight.
    pub fn pointer_down(
        &mut self,
        committed: Option<&mut PixelBuffer>,
        history: &mut HistoryManager,
        pos: IPoint,
        button: PointerButton,
    ) -> bool {
        let Some(committed) = committed else {
            return false;
        };
        if button != PointerButton::Primary || self.is_stroke_active() {
            return false;
        }

        history.begin_gesture(committed);
        let tool = self.active_tool;
        let style = self.style.clone();

        self.gesture = if tool.is_continuous() {
            // A click alone leaves a dot.
            render::render_stroke_segment(committed, tool, &style, pos, pos);
            GestureState::ContinuousStroke {
                tool,
                style,
                last: pos,
            }
        } else {
            let mut scratch = committed.clone();
            render::render_shape(&mut scratch, tool, &style, pos, pos, RenderMode::Preview);
            GestureState::ShapeDrag {
                tool,
                style,
                start: pos,
                current: pos,
                scratch,
            }
        };
        true
    }

    /// Advance the gesture. Returns true when the display changed.
    pub fn pointer_move(&mut self, committed: Option<&mut PixelBuffer>, pos: IPoint) -> bool {
        let Some(committed) = committed else {
            return false;
        };
        match &mut self.gesture {
            GestureState::Idle => false,
            GestureState::ContinuousStroke { tool, style, last } => {
                render::render_stroke_segment(committed, *tool, style, *last, pos);
                *last = pos;
                true
            }
            GestureState::ShapeDrag {
                tool,
                style,
                start,
                current,
                scratch,
            } => {
                *current = pos;
                *scratch = committed.clone();
                render::render_shape(scratch, *tool, style, *start, pos, RenderMode::Preview);
                true
            }
        }
    }

    /// Finish the gesture. Shapes are committed here, with glow if enabled.
    /// Returns true when a gesture was completed.
    pub fn pointer_up(&mut self, committed: Option<&mut PixelBuffer>, pos: IPoint) -> bool {
        let Some(committed) = committed else {
            return false;
        };
        match std::mem::take(&mut self.gesture) {
            GestureState::Idle => false,
            GestureState::ContinuousStroke { .. } => true,
            GestureState::ShapeDrag {
                tool, style, start, ..
            } => {
                render::render_shape(committed, tool, &style, start, pos, RenderMode::Commit);
                true
            }
        }
    }

    /// Rebuild the drag preview after the committed buffer was reallocated.
    pub fn refresh_preview(&mut self, committed: &PixelBuffer) {
        if let GestureState::ShapeDrag {
            tool,
            style,
            start,
            current,
            scratch,
        } = &mut self.gesture
        {
            *scratch = committed.clone();
            render::render_shape(scratch, *tool, style, *start, *current, RenderMode::Preview);
        }
    }

    /// Drop any in-flight gesture without committing it.
    pub fn reset(&mut self) {
        self.gesture = GestureState::Idle;
    }

    /// The preview while a shape is being dragged, otherwise `committed`.
    pub fn display_buffer<'a>(&'a self, committed: Option<&'a PixelBuffer>) -> Option<&'a PixelBuffer> {
        match &self.gesture {
            GestureState::ShapeDrag { scratch, .. } => Some(scratch),
            _ => committed,
        }
    }
}
