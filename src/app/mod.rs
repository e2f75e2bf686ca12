use std::path::Path;
use std::time::Instant;

use eframe::egui;
use tracing::{debug, info, warn};

use crate::asset::TemplateAsset;
use crate::form::TemplateForm;
use crate::raster::{RENDER_TIMEOUT, RasterError, RenderEvent, RenderWorker};
use crate::session::{EditorSession, InteractionState};

mod geometry;
mod help;
mod interaction;
mod render;
mod settings;
mod update;

/// Display-only view transform. Zoom scales the page about the container's
/// center and pan slides it; neither ever enters position math, which is
/// done in page percentages.
#[derive(Clone, Copy, Debug)]
pub(crate) struct View {
    pan_screen: egui::Vec2,
    zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan_screen: egui::Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl View {
    fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(0.25, 8.0);
    }
}

#[derive(Clone, Copy, Debug)]
struct InFlightRender {
    generation: u64,
    page: u16,
    started: Instant,
}

impl InFlightRender {
    fn is_timed_out(&self, now: Instant) -> bool {
        deadline_passed(self.started, now)
    }
}

fn deadline_passed(started: Instant, now: Instant) -> bool {
    now.duration_since(started) > RENDER_TIMEOUT
}

/// Whether a rendered page result is still displayable. Anything tagged with
/// an old generation, or a page the user has navigated away from, is stale
/// and dropped before texture upload.
fn result_is_current(generation: u64, page: u16, current_generation: u64, current_page: u16) -> bool {
    generation == current_generation && page == current_page
}

pub struct PlacementApp {
    form: TemplateForm,
    session: Option<EditorSession>,
    interaction: InteractionState,

    worker: Option<RenderWorker>,
    page_count: u16,
    current_page: u16,
    render_generation: u64,
    in_flight: Option<InFlightRender>,
    document_load_started: Option<Instant>,
    document_error: Option<RasterError>,
    page_error: Option<RasterError>,

    page_texture: Option<egui::TextureHandle>,
    page_size: Option<egui::Vec2>,
    qr_texture: Option<egui::TextureHandle>,

    view: View,
    status: Option<String>,
    form_error: Option<String>,
    settings: settings::AppSettings,
    settings_path: String,
    show_help: bool,
}

impl PlacementApp {
    fn config_path() -> Option<String> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home)
                .join(".config")
                .join("qrplace.toml");
            if path.exists() {
                return Some(path.display().to_string());
            }
        }
        if std::path::Path::new("settings.toml").exists() {
            return Some("settings.toml".to_string());
        }
        None
    }

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| "settings.toml".to_string());
        let settings = settings::load_settings(&settings_path)
            .or_else(|| settings::load_settings("settings.json"))
            .unwrap_or_default();
        let form = TemplateForm::new(settings.default_position());
        Self {
            form,
            session: None,
            interaction: InteractionState::default(),
            worker: None,
            page_count: 1,
            current_page: 1,
            render_generation: 0,
            in_flight: None,
            document_load_started: None,
            document_error: None,
            page_error: None,
            page_texture: None,
            page_size: None,
            qr_texture: None,
            view: View::default(),
            status: None,
            form_error: None,
            settings,
            settings_path,
            show_help: false,
        }
    }

    pub(super) fn attach_template_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Template (png, jpeg, pdf)", &["png", "jpg", "jpeg", "pdf"])
            .pick_file();
        if let Some(path) = picked {
            self.load_template(&path);
        }
    }

    pub(super) fn load_template(&mut self, path: &Path) {
        match TemplateAsset::from_path(path) {
            Ok(asset) => {
                info!(asset = %asset.describe(), "loading template");
                self.status = Some(format!("Attached {}", asset.describe()));
                self.spawn_worker(&asset);
                self.form.attach_asset(asset);
                self.form_error = None;
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "template rejected");
                self.status = Some(e.to_string());
            }
        }
    }

    fn spawn_worker(&mut self, asset: &TemplateAsset) {
        // New asset: everything rendered or in flight for the old one is
        // stale from here on.
        self.render_generation += 1;
        self.worker = Some(RenderWorker::spawn(asset.kind, asset.bytes.clone()));
        self.document_load_started = Some(Instant::now());
        self.page_count = 1;
        self.current_page = 1;
        self.in_flight = None;
        self.document_error = None;
        self.page_error = None;
        self.page_texture = None;
        self.page_size = None;
        self.session = None;
        self.interaction = InteractionState::default();
        self.view = View::default();
    }

    pub(super) fn retry_document(&mut self) {
        if let Some(asset) = self.form.asset().cloned() {
            self.spawn_worker(&asset);
        }
    }

    pub(super) fn request_page(&mut self, page: u16) {
        let page = page.clamp(1, self.page_count);
        self.current_page = page;
        if let Some(session) = &mut self.session {
            session.go_to_page(page);
        }
        if let Some(worker) = &self.worker {
            self.render_generation += 1;
            self.page_error = None;
            self.in_flight = Some(InFlightRender {
                generation: self.render_generation,
                page,
                started: Instant::now(),
            });
            worker.request(self.render_generation, page);
        }
    }

    pub(super) fn render_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drains worker events, dropping anything stale: a result tagged with an
    /// old generation or a page the user has already navigated away from is
    /// never displayed.
    pub(super) fn process_render_events(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(started) = self.document_load_started {
            // The load phase (pdfium bind + parse) gets the same deadline as
            // a page render; a hung worker must not leave the UI waiting
            // forever.
            if deadline_passed(started, now) {
                warn!("template document load timed out");
                self.document_error = Some(RasterError::DocumentLoad(format!(
                    "timed out after {:?}",
                    RENDER_TIMEOUT
                )));
                self.document_load_started = None;
                self.worker = None;
                self.render_generation += 1;
                self.in_flight = None;
            }
        }
        if let Some(flight) = self.in_flight {
            if flight.is_timed_out(now) {
                warn!(page = flight.page, "page render timed out");
                self.page_error = Some(RasterError::PageRender {
                    page: flight.page,
                    reason: format!("timed out after {:?}", RENDER_TIMEOUT),
                });
                // Leave the late result nothing to match against.
                self.render_generation += 1;
                self.in_flight = None;
            }
        }
        let Some(worker) = &self.worker else {
            return;
        };
        let mut ready_page: Option<u16> = None;
        while let Some(event) = worker.poll() {
            match event {
                RenderEvent::DocumentReady { page_count } => {
                    debug!(page_count, "template document ready");
                    self.document_load_started = None;
                    self.page_count = page_count.max(1);
                    self.document_error = None;
                    if let Some(session) = &mut self.session {
                        session.set_page_count(self.page_count);
                    }
                    ready_page = Some(1);
                }
                RenderEvent::DocumentFailed(e) => {
                    self.document_load_started = None;
                    self.document_error = Some(e);
                    self.in_flight = None;
                }
                RenderEvent::PageRendered {
                    generation,
                    page,
                    result,
                } => {
                    if !result_is_current(generation, page, self.render_generation, self.current_page) {
                        debug!(generation, page, "discarding stale render result");
                        continue;
                    }
                    self.in_flight = None;
                    match result {
                        Ok(bitmap) => {
                            self.page_size =
                                Some(egui::vec2(bitmap.width() as f32, bitmap.height() as f32));
                            self.page_texture = Some(ctx.load_texture(
                                "template-page",
                                render::color_image_from_rgba(&bitmap),
                                egui::TextureOptions::LINEAR,
                            ));
                            self.page_error = None;
                        }
                        Err(e) => {
                            warn!(error = %e, "page render failed");
                            self.page_error = Some(e);
                        }
                    }
                }
            }
        }
        if let Some(page) = ready_page {
            self.request_page(page);
        }
    }

    pub(super) fn ensure_qr_texture(&mut self, ctx: &egui::Context) {
        if self.qr_texture.is_none() {
            if let Some(img) = render::qr_preview_color_image(&self.settings.qr_preview_text) {
                self.qr_texture =
                    Some(ctx.load_texture("qr-preview", img, egui::TextureOptions::NEAREST));
            }
        }
    }

    pub(super) fn open_editor(&mut self) {
        if self.form.asset().is_none() {
            return;
        }
        let mut session = self.form.open_session();
        session.set_page_count(self.page_count);
        session.go_to_page(self.current_page);
        self.session = Some(session);
        self.interaction = InteractionState::default();
        self.status = Some("Editing placement".to_string());
    }

    pub(super) fn save_editor(&mut self) {
        if let Some(session) = self.session.take() {
            self.form.commit_position(session.save());
            self.interaction = InteractionState::default();
            self.form_error = None;
            self.status = Some("Placement saved".to_string());
        }
    }

    /// Discards the in-session position and any in-flight render; the form's
    /// previously confirmed placement is untouched.
    pub(super) fn cancel_editor(&mut self) {
        if self.session.take().is_some() {
            self.interaction = InteractionState::default();
            self.render_generation += 1;
            self.in_flight = None;
            self.status = Some("Placement editing cancelled".to_string());
        }
    }

    pub(super) fn submit_record(&mut self) {
        let path = self.settings.record_path.clone();
        match self.form.submit_to(Path::new(&path)) {
            Ok(record) => {
                self.form_error = None;
                self.status = Some(format!("Saved record {:?} to {path}", record.name));
            }
            Err(e) => {
                self.form_error = Some(e.to_string());
                self.status = None;
            }
        }
    }

    pub(super) fn persist_settings(&mut self) {
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            self.status = Some(format!("Could not save settings: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn result_from_old_generation_is_stale() {
        // asset reloaded (or editing cancelled) while the render was queued
        assert!(!result_is_current(1, 1, 2, 1));
        assert!(result_is_current(2, 1, 2, 1));
    }

    #[test]
    fn result_for_departed_page_is_stale() {
        // user navigated to page 3 before page 1 finished rendering
        assert!(!result_is_current(2, 1, 2, 3));
        assert!(result_is_current(2, 3, 2, 3));
    }

    #[test]
    fn render_deadline_passes_only_after_timeout() {
        let flight = InFlightRender {
            generation: 5,
            page: 2,
            started: Instant::now(),
        };
        assert!(!flight.is_timed_out(flight.started));
        assert!(!flight.is_timed_out(flight.started + RENDER_TIMEOUT));
        assert!(flight.is_timed_out(flight.started + RENDER_TIMEOUT + Duration::from_millis(1)));
    }

    #[test]
    fn timed_out_render_result_never_matches_again() {
        let flight = InFlightRender {
            generation: 5,
            page: 2,
            started: Instant::now(),
        };
        assert!(flight.is_timed_out(flight.started + RENDER_TIMEOUT + Duration::from_secs(1)));
        // the timeout path bumps the generation, so the late result is stale
        // even when the user never left the page
        let bumped_generation = flight.generation + 1;
        assert!(!result_is_current(
            flight.generation,
            flight.page,
            bumped_generation,
            flight.page
        ));
    }

    #[test]
    fn document_load_deadline_matches_render_deadline() {
        let started = Instant::now();
        assert!(!deadline_passed(started, started + RENDER_TIMEOUT));
        assert!(deadline_passed(
            started,
            started + RENDER_TIMEOUT + Duration::from_millis(1)
        ));
    }
}
