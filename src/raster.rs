use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::asset::AssetKind;

/// Fixed magnification for PDF page rasterization.
pub const RENDER_SCALE: f32 = 2.0;
/// A render outstanding longer than this is treated as failed and its
/// eventual result discarded.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Error)]
pub enum RasterError {
    #[error("could not load document: {0}")]
    DocumentLoad(String),
    #[error("could not render page {page}: {reason}")]
    PageRender { page: u16, reason: String },
}

/// Turns one page of a template asset into a bitmap. Pages are 1-based.
/// Rendering the same page twice must yield the identical bitmap.
pub trait PageRasterizer {
    fn page_count(&self) -> u16;
    fn render_page(&mut self, page: u16) -> Result<RgbaImage, RasterError>;
}

/// Identity rasterizer for plain image templates: decode once, serve forever.
pub struct ImageRasterizer {
    bitmap: RgbaImage,
}

impl ImageRasterizer {
    pub fn new(bytes: &[u8]) -> Result<Self, RasterError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RasterError::DocumentLoad(e.to_string()))?;
        Ok(Self {
            bitmap: decoded.to_rgba8(),
        })
    }
}

impl PageRasterizer for ImageRasterizer {
    fn page_count(&self) -> u16 {
        1
    }

    fn render_page(&mut self, page: u16) -> Result<RgbaImage, RasterError> {
        if page != 1 {
            return Err(RasterError::PageRender {
                page,
                reason: "image templates have a single page".to_string(),
            });
        }
        Ok(self.bitmap.clone())
    }
}

/// PDF-backed rasterizer. The pdfium binding is only acquired when a PDF
/// asset actually shows up; image templates never touch it.
///
/// pdfium document handles borrow the library and are not Send, so the
/// document is re-opened from the retained bytes on each render; pdfium
/// caches parse state internally and rendered pages are cached here, which
/// also makes page re-renders bitmap-identical.
pub struct PdfRasterizer {
    pdfium: Pdfium,
    bytes: Vec<u8>,
    pages: u16,
    cache: HashMap<u16, RgbaImage>,
}

impl PdfRasterizer {
    pub fn new(bytes: Vec<u8>) -> Result<Self, RasterError> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| RasterError::DocumentLoad(format!("pdfium unavailable: {e}")))?;
        let pdfium = Pdfium::new(bindings);
        let pages = {
            let document = pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .map_err(|e| RasterError::DocumentLoad(e.to_string()))?;
            document.pages().len()
        };
        if pages == 0 {
            return Err(RasterError::DocumentLoad("document has no pages".to_string()));
        }
        Ok(Self {
            pdfium,
            bytes,
            pages,
            cache: HashMap::new(),
        })
    }
}

impl PageRasterizer for PdfRasterizer {
    fn page_count(&self) -> u16 {
        self.pages
    }

    fn render_page(&mut self, page: u16) -> Result<RgbaImage, RasterError> {
        if page == 0 || page > self.pages {
            return Err(RasterError::PageRender {
                page,
                reason: format!("page out of range 1..={}", self.pages),
            });
        }
        if let Some(bitmap) = self.cache.get(&page) {
            return Ok(bitmap.clone());
        }
        let bitmap = {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(&self.bytes, None)
                .map_err(|e| RasterError::DocumentLoad(e.to_string()))?;
            let pages = document.pages();
            let pdf_page = pages.get(page - 1).map_err(|e| RasterError::PageRender {
                page,
                reason: e.to_string(),
            })?;
            let config = PdfRenderConfig::new().scale_page_by_factor(RENDER_SCALE);
            pdf_page
                .render_with_config(&config)
                .map_err(|e| RasterError::PageRender {
                    page,
                    reason: e.to_string(),
                })?
                .as_image()
                .to_rgba8()
        };
        self.cache.insert(page, bitmap.clone());
        Ok(bitmap)
    }
}

fn build_rasterizer(kind: AssetKind, bytes: Vec<u8>) -> Result<Box<dyn PageRasterizer>, RasterError> {
    match kind {
        AssetKind::Image => Ok(Box::new(ImageRasterizer::new(&bytes)?)),
        AssetKind::Pdf => Ok(Box::new(PdfRasterizer::new(bytes)?)),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RenderRequest {
    pub generation: u64,
    pub page: u16,
}

#[derive(Debug)]
pub enum RenderEvent {
    DocumentReady { page_count: u16 },
    DocumentFailed(RasterError),
    PageRendered {
        generation: u64,
        page: u16,
        result: Result<RgbaImage, RasterError>,
    },
}

/// One worker thread per loaded asset. The thread owns the rasterizer
/// (pdfium state is not Send, so it never leaves the thread); requests and
/// results are tagged with a generation so the UI can discard anything that
/// arrives after the page or asset has moved on. Dropping the worker closes
/// the request channel and the thread exits.
pub struct RenderWorker {
    requests: mpsc::Sender<RenderRequest>,
    events: mpsc::Receiver<RenderEvent>,
}

impl RenderWorker {
    pub fn spawn(kind: AssetKind, bytes: Vec<u8>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<RenderRequest>();
        let (event_tx, event_rx) = mpsc::channel::<RenderEvent>();
        thread::spawn(move || {
            let mut rasterizer = match build_rasterizer(kind, bytes) {
                Ok(r) => {
                    let _ = event_tx.send(RenderEvent::DocumentReady {
                        page_count: r.page_count(),
                    });
                    r
                }
                Err(e) => {
                    warn!(error = %e, "template document failed to load");
                    let _ = event_tx.send(RenderEvent::DocumentFailed(e));
                    return;
                }
            };
            for request in request_rx {
                debug!(page = request.page, generation = request.generation, "rendering page");
                let result = rasterizer.render_page(request.page);
                let event = RenderEvent::PageRendered {
                    generation: request.generation,
                    page: request.page,
                    result,
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });
        Self {
            requests: request_tx,
            events: event_rx,
        }
    }

    pub fn request(&self, generation: u64, page: u16) {
        let _ = self.requests.send(RenderRequest { generation, page });
    }

    pub fn poll(&self) -> Option<RenderEvent> {
        self.events.try_recv().ok()
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: Duration) -> Option<RenderEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}
