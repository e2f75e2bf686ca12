use eframe::egui;

use crate::model::{self, Corner, Position};

use super::View;

/// Screen-space radius around a corner handle that counts as a resize grab.
pub(super) const CORNER_HIT_RADIUS: f32 = 12.0;

pub(super) fn rotate_vec2(v: egui::Vec2, angle: f32) -> egui::Vec2 {
    let sin = angle.sin();
    let cos = angle.cos();
    egui::vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Where the page lands on screen: fitted into the container preserving
/// aspect, then scaled about the container's center by the view zoom, then
/// panned. All percent math downstream uses this rectangle, which is what
/// keeps Position values zoom- and pan-invariant.
pub(super) fn page_rect_on_screen(
    container: egui::Rect,
    page_size: egui::Vec2,
    view: &View,
) -> egui::Rect {
    if page_size.x <= f32::EPSILON || page_size.y <= f32::EPSILON {
        return container;
    }
    let fit = (container.width() / page_size.x)
        .min(container.height() / page_size.y)
        .max(f32::EPSILON);
    let size = page_size * fit * view.zoom;
    let center = container.center() + view.pan_screen;
    egui::Rect::from_center_size(center, size)
}

pub(super) fn position_screen_rect(page_rect: egui::Rect, pos: &Position) -> egui::Rect {
    let min = page_rect.min
        + egui::vec2(
            pos.x / model::MAX_PCT * page_rect.width(),
            pos.y / model::MAX_PCT * page_rect.height(),
        );
    let size = egui::vec2(
        pos.width / model::MAX_PCT * page_rect.width(),
        pos.height / model::MAX_PCT * page_rect.height(),
    );
    egui::Rect::from_min_size(min, size)
}

/// Converts an on-screen point to page percentages. The page rectangle is
/// already zoomed, so the same physical drag moves the rectangle by fewer
/// percent when zoomed in.
pub(super) fn screen_to_percent(page_rect: egui::Rect, screen: egui::Pos2) -> model::Point {
    let w = page_rect.width().max(f32::EPSILON);
    let h = page_rect.height().max(f32::EPSILON);
    model::Point {
        x: (screen.x - page_rect.min.x) / w * model::MAX_PCT,
        y: (screen.y - page_rect.min.y) / h * model::MAX_PCT,
    }
}

pub(super) fn corner_screen_points(
    rect: egui::Rect,
    rotation: f32,
) -> [(Corner, egui::Pos2); 4] {
    let center = rect.center();
    let place = |p: egui::Pos2| center + rotate_vec2(p - center, rotation);
    [
        (Corner::Nw, place(rect.left_top())),
        (Corner::Ne, place(rect.right_top())),
        (Corner::Sw, place(rect.left_bottom())),
        (Corner::Se, place(rect.right_bottom())),
    ]
}

/// Corner under the pointer, if any, preferring the nearest one inside the
/// hit radius.
pub(super) fn hit_corner(
    rect: egui::Rect,
    rotation: f32,
    pointer: egui::Pos2,
) -> Option<Corner> {
    let mut best: Option<(Corner, f32)> = None;
    for (corner, point) in corner_screen_points(rect, rotation) {
        let d = (pointer - point).length();
        if d <= CORNER_HIT_RADIUS && best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((corner, d));
        }
    }
    best.map(|(c, _)| c)
}

pub(super) fn hit_body(rect: egui::Rect, rotation: f32, pointer: egui::Pos2) -> bool {
    let center = rect.center();
    let half = rect.size() * 0.5;
    let local = rotate_vec2(pointer - center, -rotation);
    local.x.abs() <= half.x && local.y.abs() <= half.y
}
