use crate::canvas::{MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH};
use crate::components::tools::{MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH, PointerButton, Tool};
use crate::ops::render::{GRID_COLOR, grid_lines};
use crate::project::Project;
use crate::settings::AppSettings;
use eframe::egui;

// ============================================================================
// APPLICATION STATE
// ============================================================================

pub struct MiniPaintApp {
    project: Project,
    settings: AppSettings,
    untitled_counter: usize,

    /// GPU copy of `project.display_buffer()`.
    canvas_texture: Option<egui::TextureHandle>,
    /// Set whenever the displayed pixels may have changed.
    texture_dirty: bool,
    /// Last size the central panel offered, in whole points.
    last_surface: Option<(i32, i32)>,
    last_title: String,
    status_message: Option<String>,
}

impl MiniPaintApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();

        // Apply saved language preference (or auto-detect on first boot)
        if settings.language.is_empty() {
            let detected = crate::i18n::detect_system_language();
            crate::i18n::set_language(&detected);
        } else {
            crate::i18n::set_language(&settings.language);
        }

        Self {
            project: Project::new_untitled(1),
            settings,
            untitled_counter: 1,
            canvas_texture: None,
            texture_dirty: true,
            last_surface: None,
            last_title: String::new(),
            status_message: None,
        }
    }

    // ---- dialogs ---------------------------------------------------------------

    fn confirm_discard(&self, message_key: &str) -> bool {
        if !self.settings.confirm_destructive {
            return true;
        }
        let dialog = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title(t!("confirm.title").as_str())
            .set_description(t!(message_key).as_str())
            .set_buttons(rfd::MessageButtons::OkCancel);
        dialog_accepted(dialog.show())
    }

    fn show_error(&self, title_key: &str, message: &str) {
        log_err!("{}: {}", title_key, message);
        let _ = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(t!(title_key).as_str())
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    // ---- document commands -----------------------------------------------------

    fn new_document(&mut self) {
        if !self.confirm_discard("confirm.new") {
            return;
        }
        let (w, h) = self
            .last_surface
            .unwrap_or((MIN_CANVAS_WIDTH as i32, MIN_CANVAS_HEIGHT as i32));
        self.project.create_canvas(w, h);
        self.untitled_counter += 1;
        self.project.name = t!("project.untitled", n = self.untitled_counter);
        self.status_message = None;
        self.texture_dirty = true;
    }

    fn open_document(&mut self) {
        if !self.confirm_discard("confirm.open") {
            return;
        }
        match self.project.open_with_dialog() {
            Some(Ok(path)) => {
                self.status_message = Some(t!("status.opened", path = path.display()));
                self.texture_dirty = true;
            }
            Some(Err(e)) => self.show_error("error.open_title", &e),
            None => {}
        }
    }

    fn save_document(&mut self) {
        match self.project.save_with_dialog(self.settings.jpeg_quality) {
            Some(Ok(path)) => {
                self.status_message = Some(t!("status.saved", path = path.display()));
            }
            Some(Err(e)) => self.show_error("error.save_title", &e),
            None => {}
        }
    }

    fn undo(&mut self) {
        if self.project.undo() {
            self.texture_dirty = true;
        }
    }

    fn redo(&mut self) {
        if self.project.redo() {
            self.texture_dirty = true;
        }
    }

    // ---- input -----------------------------------------------------------------

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        let pressed = |ctx: &egui::Context, modifiers: Modifiers, key: Key| {
            ctx.input_mut(|i| i.consume_key(modifiers, key))
        };

        if pressed(ctx, Modifiers::COMMAND, Key::Z) {
            self.undo();
        }
        if pressed(ctx, Modifiers::COMMAND, Key::Y) {
            self.redo();
        }
        if pressed(ctx, Modifiers::COMMAND, Key::S) {
            self.save_document();
        }
        if pressed(ctx, Modifiers::COMMAND, Key::O) {
            self.open_document();
        }
        if pressed(ctx, Modifiers::COMMAND, Key::N) {
            self.new_document();
        }

        // Digit shortcuts only when no text field has focus
        if ctx.wants_keyboard_input() {
            return;
        }
        const DIGITS: [Key; 5] = [Key::Num1, Key::Num2, Key::Num3, Key::Num4, Key::Num5];
        for &tool in Tool::all() {
            let key = DIGITS[(tool.shortcut_digit() - 1) as usize];
            if pressed(ctx, Modifiers::NONE, key) {
                self.project.set_tool(tool);
            }
        }
    }

    /// Forward raw pointer events that concern the canvas to the project.
    fn handle_canvas_pointer(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect, hovered: bool) {
        let to_canvas = |pos: egui::Pos2| {
            (
                (pos.x - canvas_rect.min.x).floor() as i32,
                (pos.y - canvas_rect.min.y).floor() as i32,
            )
        };

        let events = ctx.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let Some(button) = map_button(button) else { continue };
                    let (x, y) = to_canvas(pos);
                    let changed = if pressed {
                        hovered
                            && canvas_rect.contains(pos)
                            && self.project.pointer_down(x, y, button)
                    } else {
                        self.project.pointer_up(x, y, button)
                    };
                    self.texture_dirty |= changed;
                }
                egui::Event::PointerMoved(pos) => {
                    let (x, y) = to_canvas(pos);
                    self.texture_dirty |= self.project.pointer_move(x, y);
                }
                _ => {}
            }
        }
    }

    // ---- panels ----------------------------------------------------------------

    fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button(t!("menu.new")).on_hover_text(t!("tooltip.new")).clicked() {
                self.new_document();
            }
            if ui.button(t!("menu.open")).on_hover_text(t!("tooltip.open")).clicked() {
                self.open_document();
            }
            if ui.button(t!("menu.save")).on_hover_text(t!("tooltip.save")).clicked() {
                self.save_document();
            }
            ui.separator();

            let can_undo = self.project.history.can_undo() && !self.project.tools.is_stroke_active();
            let can_redo = self.project.history.can_redo() && !self.project.tools.is_stroke_active();
            if ui
                .add_enabled(can_undo, egui::Button::new(t!("menu.undo")))
                .on_hover_text(t!("tooltip.undo"))
                .clicked()
            {
                self.undo();
            }
            if ui
                .add_enabled(can_redo, egui::Button::new(t!("menu.redo")))
                .on_hover_text(t!("tooltip.redo"))
                .clicked()
            {
                self.redo();
            }
            ui.separator();

            ui.label(t!("toolbar.tool"));
            let mut selected = self.project.tools.active_tool;
            egui::ComboBox::from_id_source("tool_select")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for &tool in Tool::all() {
                        ui.selectable_value(&mut selected, tool, tool.label());
                    }
                });
            if selected != self.project.tools.active_tool {
                self.project.set_tool(selected);
            }

            ui.label(t!("toolbar.color"));
            let mut color = self.project.tools.style.color;
            if ui
                .color_edit_button_srgb(&mut color)
                .on_hover_text(t!("tooltip.color"))
                .changed()
            {
                let [r, g, b] = color;
                self.project.set_color(r, g, b);
            }
        });
    }

    fn show_style_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);

        let mut width = self.project.tools.style.width() as i32;
        ui.label(t!("panel.size", px = width));
        if ui
            .add(egui::Slider::new(&mut width, MIN_BRUSH_WIDTH as i32..=MAX_BRUSH_WIDTH as i32).show_value(false))
            .changed()
        {
            self.project.set_brush_width(width);
        }
        ui.add_space(8.0);

        let mut fill = self.project.tools.style.fill_shapes;
        if ui.checkbox(&mut fill, t!("panel.fill")).changed() {
            self.project.set_fill_enabled(fill);
        }
        let mut grid = self.project.grid_overlay();
        if ui.checkbox(&mut grid, t!("panel.grid")).changed() {
            self.project.set_grid_overlay(grid);
        }
        let mut glow = self.project.tools.style.glow;
        if ui.checkbox(&mut glow, t!("panel.glow")).changed() {
            self.project.set_glow_enabled(glow);
        }

        ui.separator();

        let mut confirm = self.settings.confirm_destructive;
        if ui.checkbox(&mut confirm, t!("panel.confirm")).changed() {
            self.settings.confirm_destructive = confirm;
            self.settings.save();
        }

        ui.label(t!("panel.language"));
        let current = crate::i18n::current_language();
        let mut chosen = current.clone();
        let current_name = crate::i18n::LANGUAGES
            .iter()
            .find(|(code, _)| *code == current)
            .map_or("English", |(_, name)| *name);
        egui::ComboBox::from_id_source("language_select")
            .selected_text(current_name)
            .show_ui(ui, |ui| {
                for (code, name) in crate::i18n::LANGUAGES {
                    ui.selectable_value(&mut chosen, code.to_string(), *name);
                }
            });
        if chosen != current {
            crate::i18n::set_language(&chosen);
            self.settings.language = chosen;
            self.settings.save();
        }
    }

    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let surface = (available.x.floor() as i32, available.y.floor() as i32);

        // The first surface creates a floor-sized canvas; later window resizes
        // follow the panel exactly.
        if !self.project.canvas_state.has_canvas() {
            self.project.create_canvas(surface.0, surface.1);
            self.texture_dirty = true;
        } else if self.last_surface.is_some_and(|last| last != surface)
            && self.project.resize_surface(surface.0, surface.1)
        {
            self.texture_dirty = true;
        }
        self.last_surface = Some(surface);

        let Some((w, h)) = self.project.canvas_state.size() else { return };
        let origin = ui.max_rect().min;
        let canvas_rect = egui::Rect::from_min_size(origin, egui::vec2(w as f32, h as f32));
        let response = ui.allocate_rect(canvas_rect, egui::Sense::click_and_drag());

        self.handle_canvas_pointer(ui.ctx(), canvas_rect, response.hovered());
        self.upload_texture(ui.ctx());

        let painter = ui.painter_at(ui.max_rect());
        if let Some(texture) = &self.canvas_texture {
            painter.image(
                texture.id(),
                canvas_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        if self.project.grid_overlay() {
            let [r, g, b, a] = GRID_COLOR;
            let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(r, g, b, a));
            for x in grid_lines(w) {
                let x = canvas_rect.min.x + x as f32 + 0.5;
                painter.line_segment(
                    [egui::pos2(x, canvas_rect.min.y), egui::pos2(x, canvas_rect.max.y)],
                    stroke,
                );
            }
            for y in grid_lines(h) {
                let y = canvas_rect.min.y + y as f32 + 0.5;
                painter.line_segment(
                    [egui::pos2(canvas_rect.min.x, y), egui::pos2(canvas_rect.max.x, y)],
                    stroke,
                );
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty {
            return;
        }
        let Some(buffer) = self.project.display_buffer() else { return };
        let image = buffer.to_rgba_image();
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());

        match &mut self.canvas_texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.canvas_texture =
                    Some(ctx.load_texture("canvas", color_image, egui::TextureOptions::NEAREST));
            }
        }
        self.texture_dirty = false;
    }
}

/// Whether an OK/Cancel (or Yes/No) prompt was confirmed.
fn dialog_accepted(result: rfd::MessageDialogResult) -> bool {
    matches!(result, rfd::MessageDialogResult::Ok | rfd::MessageDialogResult::Yes)
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl eframe::App for MiniPaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Window title: "MiniPaint - <tool> | <width>px | #RRGGBB | <name>[*]" ---
        let title = self.project.window_title();
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }

        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.show_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let text = self
                .status_message
                .clone()
                .unwrap_or_else(|| self.project.status_text());
            ui.label(text);
        });

        egui::SidePanel::right("style_panel")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                self.show_style_panel(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_gray(200)))
            .show(ctx, |ui| {
                self.show_canvas(ui);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_affirmative_answers_confirm() {
        assert!(dialog_accepted(rfd::MessageDialogResult::Ok));
        assert!(dialog_accepted(rfd::MessageDialogResult::Yes));
        assert!(!dialog_accepted(rfd::MessageDialogResult::Cancel));
        assert!(!dialog_accepted(rfd::MessageDialogResult::No));
    }

    #[test]
    fn only_the_three_mouse_buttons_are_forwarded() {
        assert_eq!(map_button(egui::PointerButton::Primary), Some(PointerButton::Primary));
        assert_eq!(map_button(egui::PointerButton::Middle), Some(PointerButton::Middle));
        assert_eq!(map_button(egui::PointerButton::Extra1), None);
    }
}
