use eframe::egui;
use image::RgbaImage;
use qrcode::QrCode;
use tracing::warn;

use crate::model::Position;

use super::geometry::{corner_screen_points, position_screen_rect, rotate_vec2};

pub(super) const HANDLE_SIZE: f32 = 10.0;

pub(super) fn handle_fill() -> egui::Color32 {
    egui::Color32::from_rgb(250, 250, 250)
}

pub(super) fn handle_stroke() -> egui::Stroke {
    egui::Stroke::new(1.0, egui::Color32::from_rgb(90, 160, 255))
}

pub(super) fn color_image_from_rgba(bitmap: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [bitmap.width() as usize, bitmap.height() as usize],
        bitmap.as_raw(),
    )
}

/// Sample QR bitmap shown inside the placement rectangle. Preview-only: the
/// real code is produced server-side when the record is consumed.
pub(super) fn qr_preview_color_image(text: &str) -> Option<egui::ColorImage> {
    let code = match QrCode::new(text.as_bytes()) {
        Ok(code) => code,
        Err(e) => {
            warn!(error = %e, "could not build preview QR code");
            return None;
        }
    };
    let luma = code
        .render::<image::Luma<u8>>()
        .max_dimensions(512, 512)
        .build();
    let size = [luma.width() as usize, luma.height() as usize];
    let mut rgba = Vec::with_capacity(size[0] * size[1] * 4);
    for p in luma.pixels() {
        let v = p.0[0];
        rgba.extend_from_slice(&[v, v, v, 255]);
    }
    Some(egui::ColorImage::from_rgba_unmultiplied(size, &rgba))
}

pub(super) fn draw_page(
    painter: &egui::Painter,
    texture: &egui::TextureHandle,
    page_rect: egui::Rect,
) {
    painter.rect_filled(page_rect, 0.0, egui::Color32::WHITE);
    painter.image(
        texture.id(),
        page_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
    painter.rect_stroke(
        page_rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
        egui::StrokeKind::Middle,
    );
}

/// Draws the QR preview inside the placement rectangle, honoring the stored
/// rotation, plus the selection outline.
pub(super) fn draw_placement(
    painter: &egui::Painter,
    qr_texture: Option<&egui::TextureHandle>,
    page_rect: egui::Rect,
    position: &Position,
    active: bool,
) {
    let rect = position_screen_rect(page_rect, position);
    let rotation = position.rotation_radians();
    let center = rect.center();

    match qr_texture {
        Some(texture) => {
            let mut mesh = egui::Mesh::with_texture(texture.id());
            mesh.add_rect_with_uv(
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
            if rotation.abs() > f32::EPSILON {
                for v in &mut mesh.vertices {
                    v.pos = center + rotate_vec2(v.pos - center, rotation);
                }
            }
            painter.add(egui::Shape::mesh(mesh));
        }
        None => {
            let points: Vec<egui::Pos2> = corner_screen_points(rect, rotation)
                .into_iter()
                .map(|(_, p)| p)
                .collect();
            painter.add(egui::Shape::convex_polygon(
                points,
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, 220),
                egui::Stroke::NONE,
            ));
        }
    }

    let outline = if active {
        handle_stroke()
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(150))
    };
    let points: Vec<egui::Pos2> = corner_screen_points(rect, rotation)
        .into_iter()
        .map(|(_, p)| p)
        .collect();
    // corner_screen_points orders nw, ne, sw, se; the outline wants a loop
    let loop_points = vec![points[0], points[1], points[3], points[2]];
    painter.add(egui::Shape::closed_line(loop_points, outline));
}

pub(super) fn draw_handles(painter: &egui::Painter, rect: egui::Rect, rotation: f32) {
    for (_, point) in corner_screen_points(rect, rotation) {
        let r = egui::Rect::from_center_size(point, egui::vec2(HANDLE_SIZE, HANDLE_SIZE));
        painter.rect_filled(r, 1.0, handle_fill());
        painter.rect_stroke(r, 1.0, handle_stroke(), egui::StrokeKind::Middle);
    }
}
