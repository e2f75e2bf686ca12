use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::asset::{TemplateAsset, TemplateRef};
use crate::model::Position;
use crate::session::EditorSession;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("attach a template asset before saving")]
    MissingAsset,
    #[error("confirm a QR position for the attached template before saving")]
    PositionRequired,
    #[error("could not write record: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The record handed to the external store on submit. Position fields are
/// flattened into scalar columns, matching the schema that embeds them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QrRecord {
    pub name: String,
    pub template: TemplateRef,
    pub qr_position_x: f32,
    pub qr_position_y: f32,
    pub qr_width: f32,
    pub qr_height: f32,
    #[serde(default)]
    pub qr_rotation: f32,
}

/// Draft state of the hosting form. Owns the confirmed position between
/// editor runs; the editor only ever sees a copy.
///
/// Attaching a different asset invalidates any confirmed position: a record
/// must never be saved with a placement computed against another asset's
/// dimensions.
pub struct TemplateForm {
    pub name: String,
    asset: Option<TemplateAsset>,
    position: Option<Position>,
    position_confirmed: bool,
    default_position: Position,
}

impl TemplateForm {
    pub fn new(default_position: Position) -> Self {
        Self {
            name: String::new(),
            asset: None,
            position: None,
            position_confirmed: false,
            default_position,
        }
    }

    pub fn asset(&self) -> Option<&TemplateAsset> {
        self.asset.as_ref()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn position_confirmed(&self) -> bool {
        self.position_confirmed
    }

    pub fn attach_asset(&mut self, asset: TemplateAsset) {
        debug!(asset = %asset.describe(), "template asset attached, placement reset");
        self.asset = Some(asset);
        self.position = None;
        self.position_confirmed = false;
    }

    /// Opens an editor session over a copy of the confirmed position, or the
    /// caller-configured default when none exists.
    pub fn open_session(&self) -> EditorSession {
        EditorSession::open(self.position, self.default_position)
    }

    /// Stores the position the editor handed back and marks it confirmed for
    /// the currently attached asset.
    pub fn commit_position(&mut self, position: Position) {
        self.position = Some(position);
        self.position_confirmed = true;
    }

    /// Builds the record for submission. Fails when an asset is attached but
    /// no position has been confirmed against it.
    pub fn record(&self) -> Result<QrRecord, FormError> {
        let asset = self.asset.as_ref().ok_or(FormError::MissingAsset)?;
        if !self.position_confirmed {
            return Err(FormError::PositionRequired);
        }
        let position = self.position.unwrap_or(self.default_position);
        Ok(QrRecord {
            name: self.name.clone(),
            template: asset.source.clone(),
            qr_position_x: position.x,
            qr_position_y: position.y,
            qr_width: position.width,
            qr_height: position.height,
            qr_rotation: position.rotation,
        })
    }

    /// Submits by writing the record as JSON; the file stands in for the
    /// external record store.
    pub fn submit_to(&self, path: &Path) -> Result<QrRecord, FormError> {
        let record = self.record()?;
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "record submitted");
        Ok(record)
    }
}
