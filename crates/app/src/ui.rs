//! Overlay window using egui

use crate::assist::{AssistWorker, SystemAssist};
use crate::fonts;
use crate::ocr;
use crate::paint::{self, SceneTextures};
use crate::settings::AppSettings;
use eframe::egui::{self, Color32, Key, Modifiers, Pos2};
use image::RgbaImage;
use overlay::annotation::{Primitive, Tool, PALETTE, STROKE_WIDTHS};
use overlay::assist::{AssistError, AssistKind, AssistPanel};
use overlay::{
    Command, CursorHint, OverlayController, OverlayKey, Point, PointerButton, RasterRenderer,
    ToolbarAction,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const PANEL_GAP: f32 = 4.0;
const RESULT_PANEL_WIDTH: f32 = 260.0;
const ASSIST_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn tool_label(tool: Tool) -> &'static str {
    match tool {
        Tool::None => "",
        Tool::Rectangle => "矩形",
        Tool::Ellipse => "椭圆",
        Tool::Arrow => "箭头",
        Tool::FreehandBrush => "画笔",
        Tool::Text => "文字",
        Tool::Mosaic => "马赛克",
    }
}

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Default => egui::CursorIcon::Default,
        CursorHint::Crosshair | CursorHint::Draw => egui::CursorIcon::Crosshair,
        CursorHint::Move => egui::CursorIcon::Move,
        CursorHint::ResizeNwSe => egui::CursorIcon::ResizeNwSe,
        CursorHint::ResizeNeSw => egui::CursorIcon::ResizeNeSw,
        CursorHint::ResizeNs => egui::CursorIcon::ResizeVertical,
        CursorHint::ResizeEw => egui::CursorIcon::ResizeHorizontal,
        CursorHint::Text => egui::CursorIcon::Text,
    }
}

/// Full-screen overlay over a frozen screenshot
pub struct OverlayApp {
    controller: OverlayController,
    settings: AppSettings,
    renderer: RasterRenderer,
    worker: Option<AssistWorker>,
    screenshot: Option<egui::TextureHandle>,
    /// Pixelated pattern texture, keyed by the pattern's address
    mosaic: Option<(usize, egui::TextureHandle)>,
    draft_has_focus: bool,
    focused_window: bool,
}

impl OverlayApp {
    pub fn new(cc: &eframe::CreationContext<'_>, controller: OverlayController, settings: AppSettings) -> Self {
        fonts::setup_custom_fonts(&cc.egui_ctx);

        let label_font = fonts::LABEL_FONT.clone();
        let controller = match label_font.clone() {
            Some(font) => controller.with_measure(Box::new(font)),
            None => controller,
        };

        Self {
            controller,
            settings,
            renderer: RasterRenderer::with_font(label_font),
            worker: None,
            screenshot: None,
            mosaic: None,
            draft_has_focus: false,
            focused_window: false,
        }
    }

    fn load_textures(&mut self, ctx: &egui::Context) {
        if self.screenshot.is_none() {
            let image = color_image(self.controller.source());
            self.screenshot = Some(ctx.load_texture("screenshot", image, egui::TextureOptions::LINEAR));
        }

        let layer = self.controller.layer();
        let pattern = layer
            .primitives()
            .iter()
            .chain(self.controller.engine().tools().pending())
            .find_map(|p| match p {
                Primitive::Mosaic(stroke) => Some(stroke.pattern.clone()),
                _ => None,
            });
        if let Some(pattern) = pattern {
            let key = Arc::as_ptr(&pattern) as usize;
            if self.mosaic.as_ref().map(|(k, _)| *k) != Some(key) {
                let texture = ctx.load_texture("mosaic", color_image(&pattern), egui::TextureOptions::NEAREST);
                self.mosaic = Some((key, texture));
            }
        }
    }

    fn poll_assist(&mut self, ctx: &egui::Context) {
        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        while let Some(reply) = worker.try_recv() {
            if self.controller.finish_assist(reply.generation, reply.result) {
                ctx.request_repaint();
            }
        }
        if matches!(self.controller.assist_panel(), AssistPanel::Pending { .. }) {
            ctx.request_repaint_after(ASSIST_POLL_INTERVAL);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) -> Vec<Command> {
        let (escape, enter, undo) = ctx.input_mut(|i| {
            let escape = i.consume_key(Modifiers::NONE, Key::Escape);
            // Shift+Enter stays with the text box as a newline
            let enter = !i.modifiers.shift && i.consume_key(Modifiers::NONE, Key::Enter);
            let undo = i.consume_key(Modifiers::COMMAND, Key::Z);
            (escape, enter, undo)
        });

        let mut commands = Vec::new();
        if escape {
            commands.push(self.controller.key(OverlayKey::Escape));
        }
        if enter {
            commands.push(self.controller.key(OverlayKey::Enter));
        }
        if undo {
            commands.push(self.controller.key(OverlayKey::Undo));
        }
        commands
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) -> Vec<Command> {
        let (latest, primary_pressed, secondary_pressed, primary_released, moving) = ctx.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.secondary_pressed(),
                i.pointer.primary_released(),
                i.pointer.is_moving(),
            )
        });
        let Some(latest) = latest else {
            return Vec::new();
        };
        let p = Point::new(latest.x as f64, latest.y as f64);

        let mut commands = Vec::new();
        if secondary_pressed {
            commands.push(self.controller.pointer_down(p, PointerButton::Secondary));
        }
        if primary_pressed {
            commands.push(self.controller.pointer_down(p, PointerButton::Primary));
        }
        if moving {
            commands.push(self.controller.pointer_move(p));
        }
        if primary_released {
            commands.push(self.controller.pointer_up(p));
        }

        if !self.controller.is_over_ui(p) {
            ctx.set_cursor_icon(cursor_icon(self.controller.cursor_hint(p)));
        }
        commands
    }

    fn toolbar(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) -> Option<egui::Rect> {
        let at = self.controller.toolbar_rect()?;
        if self.controller.selection().is_dragging() || self.controller.engine().is_drawing() {
            return None;
        }

        let current = self.controller.engine().tool();
        let mut actions = Vec::new();
        let response = egui::Area::new(egui::Id::new("toolbar"))
            .order(egui::Order::Foreground)
            .fixed_pos(paint::pos(at.top_left()))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for tool in Tool::DRAWING {
                            if ui.selectable_label(current == tool, tool_label(tool)).clicked() {
                                actions.push(ToolbarAction::Tool(tool));
                            }
                        }
                        ui.separator();
                        if ui.button("撤销").on_hover_text("Ctrl+Z").clicked() {
                            actions.push(ToolbarAction::Undo);
                        }
                        if ui.button("识字").clicked() {
                            actions.push(ToolbarAction::Recognize);
                        }
                        if ui.button("翻译").clicked() {
                            actions.push(ToolbarAction::Translate);
                        }
                        if ui.button("保存").clicked() {
                            actions.push(ToolbarAction::Save);
                        }
                        ui.separator();
                        if ui.button("✕").on_hover_text("Esc").clicked() {
                            actions.push(ToolbarAction::Cancel);
                        }
                        let done = egui::Button::new(egui::RichText::new("✓").color(Color32::WHITE))
                            .fill(Color32::from_rgb(0x07, 0xC1, 0x60));
                        if ui.add(done).on_hover_text("Enter").clicked() {
                            actions.push(ToolbarAction::Copy);
                        }
                    });
                });
            })
            .response;

        let size = response.rect.size();
        self.controller.set_toolbar_size(size.x as f64, size.y as f64);
        commands.extend(actions.into_iter().map(|a| self.controller.toolbar(a)));
        Some(response.rect)
    }

    fn options_panel(&mut self, ctx: &egui::Context, toolbar: egui::Rect) -> Option<egui::Rect> {
        let tools = self.controller.engine().tools();
        if !tools.panel_open() {
            return None;
        }
        let (tool, selected_color, selected_width) = (tools.current, tools.color, tools.stroke_width);

        let sel_bottom = self.controller.selection().rect().bottom() as f32;
        let below = toolbar.min.y >= sel_bottom;
        let anchor = if below {
            (toolbar.left_bottom() + egui::vec2(0.0, PANEL_GAP), egui::Align2::LEFT_TOP)
        } else {
            (toolbar.left_top() - egui::vec2(0.0, PANEL_GAP), egui::Align2::LEFT_BOTTOM)
        };

        let mut picked_color = None;
        let mut picked_width = None;
        let response = egui::Area::new(egui::Id::new("tool_options"))
            .order(egui::Order::Foreground)
            .pivot(anchor.1)
            .fixed_pos(anchor.0)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if tool != Tool::Text && tool != Tool::Mosaic {
                            for width in STROKE_WIDTHS {
                                let label = format!("{}px", width);
                                if ui.selectable_label(selected_width == width, label).clicked() {
                                    picked_width = Some(width);
                                }
                            }
                            ui.separator();
                        }
                        for color in PALETTE {
                            let (rect, swatch) =
                                ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::click());
                            ui.painter().rect_filled(rect, 3.0, paint::color(color));
                            if color == selected_color {
                                ui.painter().rect_stroke(rect.expand(2.0), 3.0, (2.0, Color32::WHITE));
                            }
                            if swatch.clicked() {
                                picked_color = Some(color);
                            }
                        }
                    });
                });
            })
            .response;

        if let Some(color) = picked_color {
            self.controller.set_color(color);
        }
        if let Some(width) = picked_width {
            self.controller.set_stroke_width(width);
        }
        Some(response.rect)
    }

    fn draft_editor(&mut self, ctx: &egui::Context) -> Option<egui::Rect> {
        let Some(bounds) = self.controller.draft_rect() else {
            self.draft_has_focus = false;
            return None;
        };
        let draft = self.controller.draft()?;
        let (font_size, text_color, at) = (draft.font_size as f32, paint::color(draft.color), paint::pos(draft.position));
        let grab_focus = !self.draft_has_focus;

        let controller = &mut self.controller;
        let response = egui::Area::new(egui::Id::new("text_draft"))
            .order(egui::Order::Foreground)
            .fixed_pos(at)
            .show(ctx, |ui| {
                let text = controller.draft_text_mut()?;
                let edit = egui::TextEdit::multiline(text)
                    .font(egui::FontId::proportional(font_size))
                    .text_color(text_color)
                    .frame(false)
                    .margin(egui::Vec2::ZERO)
                    .desired_rows(1)
                    .desired_width(bounds.width as f32);
                let output = ui.add(edit);
                ui.painter().rect_stroke(
                    output.rect.expand(2.0),
                    0.0,
                    (1.0, Color32::from_white_alpha(160)),
                );
                if grab_focus {
                    output.request_focus();
                }
                Some(output)
            });

        self.draft_has_focus = true;
        response.inner.map(|output| output.rect)
    }

    fn result_panel(&mut self, ctx: &egui::Context) -> Option<egui::Rect> {
        let panel = self.controller.assist_panel().clone();
        let sel = self.controller.selection().rect();
        if matches!(panel, AssistPanel::Hidden) || sel.is_empty() {
            return None;
        }

        let mut copy_text = None;
        let mut dismiss = false;
        let response = egui::Area::new(egui::Id::new("assist_results"))
            .order(egui::Order::Foreground)
            .fixed_pos(Pos2::new(sel.right() as f32 + 8.0, sel.top() as f32))
            .constrain(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(RESULT_PANEL_WIDTH);
                    match &panel {
                        AssistPanel::Hidden => {}
                        AssistPanel::Pending { kind, .. } => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(match kind {
                                    AssistKind::Recognize => "识别中...",
                                    AssistKind::Translate => "翻译中...",
                                });
                            });
                        }
                        AssistPanel::Ready { boxes, .. } => {
                            egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                                for result in boxes {
                                    ui.label(&result.text);
                                }
                            });
                            ui.separator();
                            ui.horizontal(|ui| {
                                if ui.button("复制文本").clicked() {
                                    copy_text = panel.joined_text();
                                }
                                if ui.button("关闭").clicked() {
                                    dismiss = true;
                                }
                            });
                        }
                        AssistPanel::Failed { message, .. } => {
                            ui.colored_label(Color32::from_rgb(255, 90, 90), message);
                            if ui.button("关闭").clicked() {
                                dismiss = true;
                            }
                        }
                    }
                });
            })
            .response;

        if let Some(text) = copy_text {
            if let Err(e) = export::copy_text(&text) {
                log::error!("Copy text failed: {}", e);
                self.controller.set_status(format!("复制失败: {}", e));
            }
        }
        if dismiss {
            self.controller.dismiss_assist();
        }
        Some(response.rect)
    }

    fn run(&mut self, ctx: &egui::Context, command: Command) {
        match command {
            Command::None => {}
            Command::Redraw => ctx.request_repaint(),
            Command::Close => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Command::Copy => self.copy_selection(ctx),
            Command::Save => self.save_selection(ctx),
            Command::Assist(kind) => self.start_assist(kind),
        }
    }

    fn export_selection(&mut self) -> Option<RgbaImage> {
        // Failures are already on the status line
        match self.controller.export(&self.renderer) {
            Ok(image) => image.map(|i| i.into_image()),
            Err(_) => None,
        }
    }

    fn copy_selection(&mut self, ctx: &egui::Context) {
        let Some(image) = self.export_selection() else {
            return;
        };
        match export::copy_image(image) {
            Ok(()) => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Err(e) => {
                log::error!("Copy to clipboard failed: {}", e);
                self.controller.set_status(format!("复制失败: {}", e));
            }
        }
    }

    fn save_selection(&mut self, ctx: &egui::Context) {
        let Some(path) = self.choose_save_path() else {
            return;
        };
        let Some(image) = self.export_selection() else {
            return;
        };
        match export::save_image(image, &path) {
            Ok(saved) => {
                if self.settings.remember_save_dir(&saved) {
                    if let Err(e) = self.settings.save() {
                        log::warn!("Failed to save settings: {:#}", e);
                    }
                }
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(e) => {
                log::error!("Save to {} failed: {}", path.display(), e);
                self.controller.set_status(format!("保存失败: {}", e));
            }
        }
    }

    #[cfg(windows)]
    fn choose_save_path(&self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_directory(&self.settings.default_save_path)
            .set_file_name(export::default_file_name(chrono::Local::now()));
        for format in export::ExportFormat::ALL {
            dialog = dialog.add_filter(format.label(), format.extensions());
        }
        dialog.save_file()
    }

    #[cfg(not(windows))]
    fn choose_save_path(&self) -> Option<PathBuf> {
        let name = export::default_file_name(chrono::Local::now());
        Some(self.settings.default_save_path.join(name))
    }

    fn start_assist(&mut self, kind: AssistKind) {
        let Some(request) = self.controller.begin_assist(kind, &self.renderer) else {
            return;
        };
        let generation = request.generation;
        let worker = self.worker.get_or_insert_with(|| {
            AssistWorker::spawn(|| {
                ocr::warm_up();
                SystemAssist::new()
            })
        });
        if !worker.submit(request) {
            self.controller.finish_assist(generation, Err(AssistError::Unavailable));
        }
    }
}

fn color_image(image: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.as_flat_samples().as_slice(),
    )
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.focused_window {
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            self.focused_window = true;
        }

        self.load_textures(ctx);
        self.poll_assist(ctx);

        let mut commands = self.handle_keys(ctx);
        commands.extend(self.handle_pointer(ctx));

        if let Some(screenshot) = self.screenshot.as_ref() {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let textures = SceneTextures {
                screenshot,
                mosaic: self.mosaic.as_ref().map(|(_, t)| t),
            };
            paint::scene(&painter, &self.controller, &textures);
        }

        let mut regions = Vec::new();
        if let Some(toolbar) = self.toolbar(ctx, &mut commands) {
            regions.push(toolbar);
            regions.extend(self.options_panel(ctx, toolbar));
        }
        regions.extend(self.result_panel(ctx));
        regions.extend(self.draft_editor(ctx));
        self.controller
            .set_ui_regions(regions.into_iter().map(paint::logical).collect());

        for command in commands {
            self.run(ctx, command);
        }
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }
}
