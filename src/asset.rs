use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upload ceiling for template assets.
pub const MAX_ASSET_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Pdf,
}

/// Where a template asset came from. A `Registered` reference points at a
/// pre-existing asset in the external store; an `Upload` is a local file that
/// only becomes a stable reference once the owning record is saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TemplateRef {
    Registered { id: String },
    Upload { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read template asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("template asset is {size} bytes, larger than the {MAX_ASSET_BYTES} byte limit")]
    TooLarge { size: usize },
    #[error("unsupported template type {detected:?}; expected png, jpeg or pdf")]
    UnsupportedType { detected: String },
}

/// In-memory template asset, content-sniffed to one of the supported kinds.
#[derive(Clone, Debug)]
pub struct TemplateAsset {
    pub kind: AssetKind,
    pub bytes: Vec<u8>,
    pub source: TemplateRef,
}

impl TemplateAsset {
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(
            bytes,
            TemplateRef::Upload {
                path: path.to_path_buf(),
            },
        )
    }

    /// Sniffs the asset kind from the leading bytes, never from the file
    /// extension; an upload with a lying extension is still classified by
    /// content.
    pub fn from_bytes(bytes: Vec<u8>, source: TemplateRef) -> Result<Self, AssetError> {
        if bytes.len() > MAX_ASSET_BYTES {
            return Err(AssetError::TooLarge { size: bytes.len() });
        }
        let kind = match infer::get(&bytes).map(|t| t.mime_type()) {
            Some("image/png") | Some("image/jpeg") => AssetKind::Image,
            Some("application/pdf") => AssetKind::Pdf,
            Some(other) => {
                return Err(AssetError::UnsupportedType {
                    detected: other.to_string(),
                });
            }
            None => {
                return Err(AssetError::UnsupportedType {
                    detected: "unknown".to_string(),
                });
            }
        };
        Ok(Self {
            kind,
            bytes,
            source,
        })
    }

    pub fn describe(&self) -> String {
        let kind = match self.kind {
            AssetKind::Image => "image",
            AssetKind::Pdf => "pdf",
        };
        match &self.source {
            TemplateRef::Registered { id } => format!("{kind} (registered {id})"),
            TemplateRef::Upload { path } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("{kind} ({name}, {} KiB)", self.bytes.len() / 1024)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> TemplateRef {
        TemplateRef::Registered {
            id: "tpl-1".to_string(),
        }
    }

    #[test]
    fn sniffs_png_by_magic_bytes() {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        bytes.extend_from_slice(&[0u8; 64]);
        let asset = TemplateAsset::from_bytes(bytes, registered()).unwrap();
        assert_eq!(asset.kind, AssetKind::Image);
    }

    #[test]
    fn sniffs_jpeg_by_magic_bytes() {
        let mut bytes = vec![0xff, 0xd8, 0xff, 0xe0];
        bytes.extend_from_slice(&[0u8; 64]);
        let asset = TemplateAsset::from_bytes(bytes, registered()).unwrap();
        assert_eq!(asset.kind, AssetKind::Image);
    }

    #[test]
    fn sniffs_pdf_by_header() {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        let asset = TemplateAsset::from_bytes(bytes, registered()).unwrap();
        assert_eq!(asset.kind, AssetKind::Pdf);
    }

    #[test]
    fn rejects_unsupported_content() {
        let err = TemplateAsset::from_bytes(b"hello world".to_vec(), registered()).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedType { .. }));
    }

    #[test]
    fn rejects_oversized_upload() {
        let bytes = vec![0u8; MAX_ASSET_BYTES + 1];
        let err = TemplateAsset::from_bytes(bytes, registered()).unwrap_err();
        assert!(matches!(err, AssetError::TooLarge { .. }));
    }
}
