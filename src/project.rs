use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::canvas::{CanvasState, IPoint, PixelBuffer};
use crate::components::history::HistoryManager;
use crate::components::tools::{PointerButton, Tool, ToolState};
use crate::io::FileHandler;

/// Single open document: committed canvas, its history, the tool state that
/// paints into it, and where it was loaded from or saved to.
pub struct Project {
    pub canvas_state: CanvasState,
    pub history: HistoryManager,
    pub tools: ToolState,
    pub file_handler: FileHandler,
    /// `None` for unsaved/untitled files.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (derived from path or "Untitled-X")
    pub name: String,
}

impl Default for Project {
    fn default() -> Self {
        Self::new_untitled(1)
    }
}

impl Project {
    /// A project with no canvas yet; the first `create_canvas` or
    /// `resize_surface` allocates one.
    pub fn new_untitled(untitled_counter: usize) -> Self {
        Self {
            canvas_state: CanvasState::new(),
            history: HistoryManager::default(),
            tools: ToolState::default(),
            file_handler: FileHandler::new(),
            path: None,
            is_dirty: false,
            name: t!("project.untitled", n = untitled_counter),
        }
    }

    // ---- lifecycle -------------------------------------------------------------

    /// New document: white canvas of at least 800×600, empty history.
    pub fn create_canvas(&mut self, width: i32, height: i32) -> (u32, u32) {
        self.tools.reset();
        let size = self
            .canvas_state
            .create_canvas(width, height, false, &mut self.history);
        self.file_handler.reset();
        self.path = None;
        self.is_dirty = false;
        size
    }

    /// Replace the document with row-major RGBA bytes. Returns false (and
    /// leaves the document alone) if the byte count does not match.
    pub fn load_pixels(&mut self, pixels: &[u8], width: u32, height: u32) -> bool {
        let Some(img) = RgbaImage::from_raw(width, height, pixels.to_vec()) else {
            log_warn!("load_pixels: {} bytes do not form a {}x{} image", pixels.len(), width, height);
            return false;
        };
        if width == 0 || height == 0 {
            return false;
        }
        self.load_image(&img);
        true
    }

    /// Replace the document with a decoded image. Images smaller than the
    /// 800×600 floor are stretched to fill it.
    pub fn load_image(&mut self, img: &RgbaImage) {
        self.tools.reset();
        let (w, h) = self.canvas_state.create_canvas(
            img.width() as i32,
            img.height() as i32,
            false,
            &mut self.history,
        );
        let buffer = if (w, h) == img.dimensions() {
            PixelBuffer::from_rgba_image(img)
        } else {
            PixelBuffer::from_rgba_image(&imageops::resize(img, w, h, FilterType::Triangle))
        };
        self.canvas_state.replace_committed(buffer);
        self.is_dirty = false;
        log_info!("loaded {}x{} image into a {}x{} canvas", img.width(), img.height(), w, h);
    }

    /// Decode `path` and make it the document.
    pub fn open_path(&mut self, path: &Path) -> Result<(), String> {
        let img = crate::io::load_image(path)?;
        self.load_image(&img);
        self.set_path(path);
        Ok(())
    }

    /// Ask for a file with the native dialog and load it. `None` on cancel.
    pub fn open_with_dialog(&mut self) -> Option<Result<PathBuf, String>> {
        let picked = self.file_handler.open_image()?;
        Some(picked.map(|(img, path)| {
            self.load_image(&img);
            self.set_path(&path);
            path
        }))
    }

    /// Ask where to save and write the committed buffer there.
    pub fn save_with_dialog(&mut self, quality: u8) -> Option<Result<PathBuf, String>> {
        if !self.canvas_state.has_canvas() {
            return Some(Err(t!("error.no_canvas")));
        }
        let path = self.file_handler.pick_save_path()?;
        Some(self.save_to(&path, quality).map(|()| path))
    }

    /// Read-only copy of the committed pixels for saving.
    pub fn export_pixels(&self) -> Option<RgbaImage> {
        self.canvas_state.committed().map(PixelBuffer::to_rgba_image)
    }

    /// Encode the committed buffer to `path` (format from the extension).
    pub fn save_to(&mut self, path: &Path, quality: u8) -> Result<(), String> {
        let img = self
            .export_pixels()
            .ok_or_else(|| t!("error.no_canvas"))?;
        self.file_handler
            .save_image(&img, path, quality)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        self.set_path(path);
        self.mark_clean();
        log_info!("saved {}", path.display());
        Ok(())
    }

    /// Follow a host-surface size change (exact size, content and history kept).
    pub fn resize_surface(&mut self, width: i32, height: i32) -> bool {
        let changed = self
            .canvas_state
            .resize_surface(width, height, &mut self.history);
        if changed && let Some(committed) = self.canvas_state.committed() {
            self.tools.refresh_preview(committed);
        }
        changed
    }

    // ---- pointer ---------------------------------------------------------------

    pub fn pointer_down(&mut self, x: i32, y: i32, button: PointerButton) -> bool {
        self.tools.pointer_down(
            self.canvas_state.committed_mut(),
            &mut self.history,
            IPoint::new(x, y),
            button,
        )
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        self.tools
            .pointer_move(self.canvas_state.committed_mut(), IPoint::new(x, y))
    }

    /// Any button ends the active gesture.
    pub fn pointer_up(&mut self, x: i32, y: i32, _button: PointerButton) -> bool {
        let done = self
            .tools
            .pointer_up(self.canvas_state.committed_mut(), IPoint::new(x, y));
        if done {
            self.mark_dirty();
        }
        done
    }

    // ---- style setters ---------------------------------------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.active_tool = tool;
    }

    pub fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.tools.style.color = [r, g, b];
    }

    pub fn set_brush_width(&mut self, px: i32) {
        self.tools.style.set_width(px);
    }

    pub fn set_fill_enabled(&mut self, on: bool) {
        self.tools.style.fill_shapes = on;
    }

    pub fn set_glow_enabled(&mut self, on: bool) {
        self.tools.style.glow = on;
    }

    pub fn set_grid_overlay(&mut self, on: bool) {
        self.tools.style.grid_overlay = on;
    }

    pub fn grid_overlay(&self) -> bool {
        self.tools.style.grid_overlay
    }

    // ---- history ---------------------------------------------------------------

    /// Returns false when there is nothing to undo or a gesture is in flight.
    pub fn undo(&mut self) -> bool {
        if self.tools.is_stroke_active() {
            return false;
        }
        let Some(committed) = self.canvas_state.committed() else {
            return false;
        };
        match self.history.undo(committed) {
            Some(prev) => {
                self.canvas_state.replace_committed(prev);
                self.mark_dirty();
                true
            }
            None => {
                log_info!("undo: history is empty");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.tools.is_stroke_active() {
            return false;
        }
        let Some(committed) = self.canvas_state.committed() else {
            return false;
        };
        match self.history.redo(committed) {
            Some(next) => {
                self.canvas_state.replace_committed(next);
                self.mark_dirty();
                true
            }
            None => {
                log_info!("redo: nothing to redo");
                false
            }
        }
    }

    // ---- display ---------------------------------------------------------------

    /// The drag preview while a shape is being dragged, otherwise the
    /// committed buffer. The grid overlay is the caller's job.
    pub fn display_buffer(&self) -> Option<&PixelBuffer> {
        self.tools.display_buffer(self.canvas_state.committed())
    }

    /// `MiniPaint - <tool> | <width>px | #RRGGBB`
    pub fn status_text(&self) -> String {
        format!(
            "MiniPaint - {} | {}px | {}",
            self.tools.active_tool.label(),
            self.tools.style.width(),
            self.tools.style.hex()
        )
    }

    /// Status text followed by the document name (with dirty indicator).
    pub fn window_title(&self) -> String {
        format!("{} | {}", self.status_text(), self.display_title())
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    fn set_path(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
        self.name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}
