use std::path::{Path, PathBuf};

use tracing::error;

use crate::{
    error::Result,
    fs::document::{read_document, write_document},
};

use super::{LabelRegistry, LabelsDocument};

pub const LABELS_FILE: &str = "labels.json";

/// Keeps the label registry in `labels.json` inside the data directory.
pub struct LabelStore {
    path: PathBuf,
}

impl LabelStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(LABELS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the registry. A missing file gives the default registry.
    pub async fn load(&self) -> Result<LabelRegistry> {
        let document = read_document::<LabelsDocument>(&self.path)
            .await?
            .unwrap_or_default();
        Ok(LabelRegistry::load(document))
    }

    /// Same as [LabelStore::load] but never fails: on error the default registry is used so the
    /// application can still start.
    pub async fn load_or_default(&self) -> LabelRegistry {
        match self.load().await {
            Ok(registry) => registry,
            Err(e) => {
                error!("Failed to load labels, falling back to defaults: {e}");
                LabelRegistry::load(LabelsDocument::new())
            }
        }
    }

    pub async fn save(&self, registry: &LabelRegistry) -> Result<()> {
        write_document(&self.path, &registry.save()).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::orientation::Face;

    use super::LabelStore;

    #[tokio::test]
    async fn test_labels_survive_restart() -> Result<()> {
        let dir = tempdir()?;
        let store = LabelStore::new(dir.path());

        let mut registry = store.load().await?;
        registry.update(1, "Deep work", "#336699")?;
        store.save(&registry).await?;

        let reloaded = LabelStore::new(dir.path()).load().await?;
        let face = Face::new(1).unwrap();
        assert_eq!(reloaded.resolve(face).name, "Deep work");
        assert_eq!(reloaded.resolve(face).color, "#336699");
        Ok(())
    }

    #[tokio::test]
    async fn test_settings_document_shape() -> Result<()> {
        let dir = tempdir()?;
        let store = LabelStore::new(dir.path());
        std::fs::write(
            store.path(),
            r##"{"2": {"label": "Admin", "color": "#AA0000"}}"##,
        )?;

        let registry = store.load().await?;
        store.save(&registry).await?;

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path())?)?;
        assert_eq!(written["2"]["label"], "Admin");
        assert_eq!(written["2"]["color"], "#AA0000");
        assert_eq!(written["7"]["label"], "Face 7");
        assert_eq!(written.as_object().unwrap().len(), 8);
        Ok(())
    }

    #[tokio::test]
    async fn test_broken_labels_fall_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let store = LabelStore::new(dir.path());
        std::fs::write(store.path(), "[1, 2")?;

        assert!(store.load().await.is_err());
        let registry = store.load_or_default().await;
        assert_eq!(registry.resolve(Face::new(4).unwrap()).name, "Face 4");
        Ok(())
    }
}
