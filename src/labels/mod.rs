//! Display names and colours for the eight faces.
//!
//! The registry is total over the faces: a face without an explicit mapping resolves to a
//! synthesized `Face N` label, and [LabelRegistry::load] fills every missing face.

pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::Result, orientation::Face};

pub const DEFAULT_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "label")]
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn default_for(face: Face) -> Self {
        Label {
            name: format!("Face {face}"),
            color: DEFAULT_COLOR.into(),
        }
    }
}

/// Serialized form of the registry: `{"1": {"label": "...", "color": "..."}, ...}`.
pub type LabelsDocument = BTreeMap<String, Label>;

#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    labels: BTreeMap<Face, Label>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never fails, faces without a mapping get a synthesized default.
    pub fn resolve(&self, face: Face) -> Label {
        self.labels
            .get(&face)
            .cloned()
            .unwrap_or_else(|| Label::default_for(face))
    }

    /// Replaces the mapping for a single code. Codes outside 1-8 are rejected.
    pub fn update(
        &mut self,
        code: i64,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<()> {
        let face = Face::try_new(code)?;
        let label = Label {
            name: name.into(),
            color: color.into(),
        };
        debug!("Face {face} is now {label:?}");
        self.labels.insert(face, label);
        Ok(())
    }

    /// Builds a registry from a settings document. Keys that aren't a face code are ignored and
    /// missing faces are filled with defaults.
    pub fn load(document: LabelsDocument) -> Self {
        let mut labels = BTreeMap::new();
        for (key, label) in document {
            match key.trim().parse::<i64>().ok().and_then(Face::new) {
                Some(face) => {
                    labels.insert(face, label);
                }
                None => warn!("Ignoring label {label:?} stored under unknown face {key:?}"),
            }
        }
        for face in Face::all() {
            labels.entry(face).or_insert_with(|| Label::default_for(face));
        }
        Self { labels }
    }

    /// Exports all eight faces, including synthesized ones.
    pub fn save(&self) -> LabelsDocument {
        Face::all()
            .map(|face| (face.to_string(), self.resolve(face)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Face, Label)> + '_ {
        Face::all().map(|face| (face, self.resolve(face)))
    }

    /// Colour of the first face carrying `name`. Labels in the ledger are stored by name, so this
    /// is how reports find a colour for them.
    pub fn color_for_label(&self, name: &str) -> Option<&str> {
        self.labels
            .values()
            .find(|label| label.name == name)
            .map(|label| label.color.as_str())
    }
}
