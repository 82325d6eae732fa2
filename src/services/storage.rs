//! Archiviazione su disco dei file originali, dei risultati e degli sfondi

use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Aree di archiviazione sotto la media root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Originals,
    Processed,
    Backgrounds,
}

impl StorageArea {
    pub const ALL: [StorageArea; 3] = [
        StorageArea::Originals,
        StorageArea::Processed,
        StorageArea::Backgrounds,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            StorageArea::Originals => "originals",
            StorageArea::Processed => "processed",
            StorageArea::Backgrounds => "backgrounds",
        }
    }
}

/// I riferimenti salvati nei job sono path relativi alla media root,
/// es. `originals/3f2a...png`
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Crea le directory delle aree se mancano
    pub async fn ensure_dirs(&self) -> Result<()> {
        for area in StorageArea::ALL {
            tokio::fs::create_dir_all(self.root.join(area.dir_name())).await?;
        }
        Ok(())
    }

    /// Nome univoco per un file caricato
    pub fn unique_name(extension: &str) -> String {
        format!("{}.{}", Uuid::new_v4(), extension)
    }

    /// Nome deterministico del risultato di un job
    pub fn processed_name(job_id: i64) -> String {
        format!("result_{}.png", job_id)
    }

    /// Salva i dati e restituisce il riferimento relativo
    pub async fn save(&self, area: StorageArea, name: &str, data: &[u8]) -> Result<String> {
        let reference = format!("{}/{}", area.dir_name(), name);
        let path = self.resolve(&reference)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        tracing::debug!(reference = %reference, bytes = data.len(), "File salvato");
        Ok(reference)
    }

    pub async fn read(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve(reference)?;
        Ok(tokio::fs::read(&path).await?)
    }

    /// Rimozione best effort, usata per non lasciare output parziali
    pub async fn remove(&self, reference: &str) {
        match self.resolve(reference) {
            Ok(path) => {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::warn!("Errore rimozione file {}: {}", reference, e);
                }
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }

    /// Converte un riferimento in path assoluto. Sono ammessi solo path relativi
    /// dentro una delle aree note, senza componenti `..`.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let relative = Path::new(reference);
        let mut components = relative.components();

        let area_ok = match components.next() {
            Some(Component::Normal(first)) => StorageArea::ALL
                .iter()
                .any(|a| first.to_str() == Some(a.dir_name())),
            _ => false,
        };
        let rest_ok = components.clone().count() > 0
            && components.all(|c| matches!(c, Component::Normal(_)));

        if !area_ok || !rest_ok {
            return Err(AppError::InvalidReference(reference.to_string()));
        }

        Ok(self.root.join(relative))
    }
}
