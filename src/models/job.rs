use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

/// Stato di un job di rimozione sfondo.
///
/// Transizioni ammesse: `PENDING -> PROCESSING -> DONE | FAILED`. Il processore
/// sincrono non persiste `PROCESSING`: un job passa direttamente da `PENDING`
/// allo stato finale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Pending, JobStatus::Done)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Done)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(JobStatus::Pending),
            "PROCESSING" => Ok(JobStatus::Processing),
            "DONE" => Ok(JobStatus::Done),
            "FAILED" => Ok(JobStatus::Failed),
            _ => Err(AppError::BadRequest(format!("Stato sconosciuto: {}", s))),
        }
    }
}

/// Variante del modello di segmentazione
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SegmentationModel {
    #[default]
    Isnet,
    Bria,
}

impl SegmentationModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentationModel::Isnet => "isnet",
            SegmentationModel::Bria => "bria",
        }
    }

    /// Nome della sessione lato server rembg
    pub fn rembg_name(&self) -> &'static str {
        match self {
            SegmentationModel::Isnet => "isnet-general-use",
            SegmentationModel::Bria => "bria-rmbg",
        }
    }
}

impl std::fmt::Display for SegmentationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentationModel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "isnet" => Ok(SegmentationModel::Isnet),
            "bria" => Ok(SegmentationModel::Bria),
            other => Err(AppError::InvalidModel(other.to_string())),
        }
    }
}
