use eframe::egui;

use crate::model::Corner;

use super::PlacementApp;
use super::geometry::{hit_body, hit_corner, screen_to_percent};
use super::render::draw_handles;

impl PlacementApp {
    /// Pointer wiring for the open editor session. One interaction mode is
    /// active at a time; pointer-down dispatches on corner-versus-body hit,
    /// pointer-up always returns to idle. egui keeps drag capture alive while
    /// the pointer leaves the widget, which stands in for the window-level
    /// move/up listeners a browser implementation would attach.
    pub(super) fn interact_editor(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        page_rect: egui::Rect,
        ctx: &egui::Context,
    ) {
        let Some(session) = &mut self.session else {
            return;
        };
        let overlay = super::geometry::position_screen_rect(page_rect, &session.position());
        let rotation = session.position().rotation_radians();

        let hit_area = page_rect
            .union(overlay)
            .expand(super::geometry::CORNER_HIT_RADIUS);
        let id = ui.id().with("placement");
        let response = ui.interact(hit_area, id, egui::Sense::click_and_drag());

        if let Some(p) = response.hover_pos() {
            if let Some(corner) = hit_corner(overlay, rotation, p) {
                let icon = match corner {
                    Corner::Ne | Corner::Sw => egui::CursorIcon::ResizeNeSw,
                    Corner::Nw | Corner::Se => egui::CursorIcon::ResizeNwSe,
                };
                ctx.set_cursor_icon(icon);
            } else if hit_body(overlay, rotation, p) {
                ctx.set_cursor_icon(if response.dragged() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::Grab
                });
            }
        }

        if response.drag_started() {
            if let Some(p) = response.interact_pointer_pos() {
                if let Some(corner) = hit_corner(overlay, rotation, p) {
                    self.interaction
                        .begin_resize(corner, screen_to_percent(page_rect, p));
                } else if hit_body(overlay, rotation, p) {
                    self.interaction
                        .begin_drag(session, screen_to_percent(page_rect, p));
                }
            }
        }
        if response.dragged() {
            if let Some(p) = response.interact_pointer_pos() {
                self.interaction
                    .pointer_move(session, screen_to_percent(page_rect, p));
            }
        }
        if response.drag_stopped() {
            self.interaction.pointer_up();
        }

        let overlay = super::geometry::position_screen_rect(page_rect, &session.position());
        draw_handles(painter, overlay, rotation);
    }
}
