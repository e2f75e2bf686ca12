use std::time::Duration;

use eframe::egui;

use crate::model::NudgeDirection;
use crate::session::Interaction;

use super::PlacementApp;
use super::geometry::page_rect_on_screen;
use super::help::draw_help_window;
use super::render::{draw_page, draw_placement};

impl eframe::App for PlacementApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_render_events(ctx);

        let wants_keyboard = ctx.wants_keyboard_input();
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                self.attach_template_dialog();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                self.submit_record();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = true;
            }
            if !wants_keyboard && self.session.is_some() {
                // Save/cancel are transitions out of the idle state; a drag
                // or resize in progress has to end before either applies.
                if self.interaction.is_idle() {
                    if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                        self.cancel_editor();
                    }
                    if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter) {
                        self.save_editor();
                    }
                }
                let step = if i.modifiers.shift {
                    self.settings.move_step_fast
                } else {
                    self.settings.move_step
                };
                let nudges = [
                    (egui::Key::ArrowLeft, NudgeDirection::Left),
                    (egui::Key::ArrowRight, NudgeDirection::Right),
                    (egui::Key::ArrowUp, NudgeDirection::Up),
                    (egui::Key::ArrowDown, NudgeDirection::Down),
                ];
                for (key, direction) in nudges {
                    if i.consume_key(egui::Modifiers::NONE, key)
                        || i.consume_key(egui::Modifiers::SHIFT, key)
                    {
                        if let Some(session) = &mut self.session {
                            session.nudge(&self.interaction, direction, step);
                        }
                    }
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Plus)
                    || i.consume_key(egui::Modifiers::NONE, egui::Key::Equals)
                {
                    if let Some(session) = &mut self.session {
                        session.grow(&self.interaction, 1.0);
                    }
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Minus) {
                    if let Some(session) = &mut self.session {
                        session.grow(&self.interaction, -1.0);
                    }
                }
                if !self.render_in_flight() && self.page_count > 1 {
                    if i.consume_key(egui::Modifiers::NONE, egui::Key::PageDown) {
                        let next = self.current_page.saturating_add(1);
                        self.request_page(next);
                    }
                    if i.consume_key(egui::Modifiers::NONE, egui::Key::PageUp) {
                        let prev = self.current_page.saturating_sub(1).max(1);
                        self.request_page(prev);
                    }
                }
            }
        });

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Attach template… (⌘O)").clicked() {
                        self.attach_template_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Save record (⌘S)").clicked() {
                        self.submit_record();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.label("Record path:");
                    if ui
                        .text_edit_singleline(&mut self.settings.record_path)
                        .lost_focus()
                    {
                        self.persist_settings();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Shortcuts (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                });
            });
        });

        egui::SidePanel::left("record_form")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Record");
                ui.separator();
                ui.label("Name:");
                ui.text_edit_singleline(&mut self.form.name);
                ui.add_space(6.0);

                match self.form.asset() {
                    Some(asset) => {
                        ui.label(format!("Template: {}", asset.describe()));
                        if self.page_count > 1 {
                            ui.label(format!("{} pages", self.page_count));
                        }
                    }
                    None => {
                        ui.label("No template attached.");
                    }
                }
                if ui.button("Attach template…").clicked() {
                    self.attach_template_dialog();
                }
                ui.add_space(10.0);

                ui.heading("QR placement");
                ui.separator();
                match (self.form.position(), self.form.position_confirmed()) {
                    (Some(p), true) => {
                        ui.label(format!(
                            "x {:.1}%  y {:.1}%  w {:.1}%  h {:.1}%",
                            p.x, p.y, p.width, p.height
                        ));
                        ui.label("Placement confirmed ✓");
                    }
                    _ => {
                        ui.label("No placement confirmed for this template.");
                    }
                }
                let can_edit =
                    self.form.asset().is_some() && self.page_texture.is_some();
                if self.session.is_none()
                    && ui
                        .add_enabled(can_edit, egui::Button::new("Edit placement"))
                        .clicked()
                {
                    self.open_editor();
                }
                ui.add_space(10.0);

                if ui.button("Save record").clicked() {
                    self.submit_record();
                }
                if let Some(error) = &self.form_error {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 50), error);
                }
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mode = match self.interaction.current() {
                    Interaction::Idle => None,
                    Interaction::Dragging { .. } => Some("moving placement"),
                    Interaction::Resizing { .. } => Some("resizing placement"),
                };
                if let Some(mode) = mode {
                    ui.label(mode);
                    ui.separator();
                }
                if let Some(status) = &self.status {
                    ui.label(status.clone());
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.form.asset().is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label("Attach a template image or PDF to place a QR code.");
                });
                return;
            }

            if let Some(error) = self.document_error.clone() {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.colored_label(egui::Color32::from_rgb(200, 60, 50), error.to_string());
                        if ui.button("Retry").clicked() {
                            self.retry_document();
                        }
                    });
                });
                return;
            }

            ui.horizontal(|ui| {
                let nav_enabled = self.page_count > 1 && !self.render_in_flight();
                if ui
                    .add_enabled(nav_enabled && self.current_page > 1, egui::Button::new("◀"))
                    .clicked()
                {
                    let prev = self.current_page - 1;
                    self.request_page(prev);
                }
                ui.label(format!("Page {}/{}", self.current_page, self.page_count));
                if ui
                    .add_enabled(
                        nav_enabled && self.current_page < self.page_count,
                        egui::Button::new("▶"),
                    )
                    .clicked()
                {
                    let next = self.current_page + 1;
                    self.request_page(next);
                }
                ui.separator();

                if ui.button("−").clicked() {
                    self.view.zoom_by(1.0 / 1.25);
                }
                ui.label(format!("{:.0}%", self.view.zoom * 100.0));
                if ui.button("+").clicked() {
                    self.view.zoom_by(1.25);
                }
                if ui.button("Reset view").clicked() {
                    self.view = super::View::default();
                }
                ui.separator();

                if self.session.is_some() {
                    if let Some(session) = &mut self.session {
                        ui.checkbox(&mut session.lock_aspect, "Square");
                    }
                    let save = ui.button("Save placement").clicked();
                    let cancel = ui.button("Cancel").clicked();
                    if save {
                        self.save_editor();
                    } else if cancel {
                        self.cancel_editor();
                    }
                }

                if let Some(error) = self.page_error.clone() {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 50), error.to_string());
                    if ui.button("Retry page").clicked() {
                        let page = self.current_page;
                        self.request_page(page);
                    }
                }
            });
            ui.separator();

            let available = ui.available_size();
            let (response, painter) = ui.allocate_painter(available, egui::Sense::hover());
            let container = response.rect;

            if response.hovered() {
                let (scroll, zoom_delta) = ctx.input(|i| (i.raw_scroll_delta, i.zoom_delta()));
                if scroll != egui::Vec2::ZERO {
                    self.view.pan_screen += scroll;
                }
                if (zoom_delta - 1.0).abs() > f32::EPSILON {
                    self.view.zoom_by(zoom_delta);
                }
            }

            let texture = self.page_texture.clone();
            match (texture, self.page_size) {
                (Some(texture), Some(page_size)) => {
                    let page_rect = page_rect_on_screen(container, page_size, &self.view);
                    draw_page(&painter, &texture, page_rect);
                    self.ensure_qr_texture(ctx);

                    if let Some(session) = &self.session {
                        draw_placement(
                            &painter,
                            self.qr_texture.as_ref(),
                            page_rect,
                            &session.position(),
                            true,
                        );
                    } else if let Some(position) = self.form.position() {
                        draw_placement(
                            &painter,
                            self.qr_texture.as_ref(),
                            page_rect,
                            &position,
                            false,
                        );
                    }

                    self.interact_editor(ui, &painter, page_rect, ctx);
                }
                _ => {
                    ui.put(
                        container,
                        egui::Label::new(if self.render_in_flight() {
                            "Rendering page…"
                        } else {
                            "Waiting for template…"
                        }),
                    );
                }
            }
        });

        draw_help_window(ctx, &mut self.show_help);

        if self.render_in_flight() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
