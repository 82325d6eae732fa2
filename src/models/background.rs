use image::Rgba;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::{AppError, Result};

/// Tipo di sfondo richiesto dal client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BackgroundKind {
    Color,
    Image,
}

impl BackgroundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundKind::Color => "color",
            BackgroundKind::Image => "image",
        }
    }
}

impl std::fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "color" => Ok(BackgroundKind::Color),
            "image" => Ok(BackgroundKind::Image),
            other => Err(AppError::InvalidBackgroundType(other.to_string())),
        }
    }
}

/// Sfondo da applicare: colore pieno oppure riferimento a un'immagine salvata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSpec {
    Color { value: String },
    Image { reference: String },
}

impl BackgroundSpec {
    pub fn new(kind: BackgroundKind, value: impl Into<String>) -> Self {
        match kind {
            BackgroundKind::Color => BackgroundSpec::Color {
                value: value.into(),
            },
            BackgroundKind::Image => BackgroundSpec::Image {
                reference: value.into(),
            },
        }
    }

    /// Costruisce lo sfondo dai campi testuali del form
    pub fn parse(kind: &str, value: &str) -> Result<Self> {
        let kind: BackgroundKind = kind.parse()?;
        let spec = Self::new(kind, value);
        if let BackgroundSpec::Color { value } = &spec {
            parse_color(value)?;
        }
        Ok(spec)
    }

    pub fn kind(&self) -> BackgroundKind {
        match self {
            BackgroundSpec::Color { .. } => BackgroundKind::Color,
            BackgroundSpec::Image { .. } => BackgroundKind::Image,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            BackgroundSpec::Color { value } => value,
            BackgroundSpec::Image { reference } => reference,
        }
    }
}

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("white", [255, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
];

/// Converte un colore `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` o un nome CSS base
pub fn parse_color(value: &str) -> Result<Rgba<u8>> {
    let trimmed = value.trim();
    let lower = trimmed.to_lowercase();

    if let Some((_, rgba)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Ok(Rgba(*rgba));
    }

    let hex = lower.strip_prefix('#').unwrap_or(&lower);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::InvalidColor(trimmed.to_string()));
    }

    let channel = |s: &str| {
        u8::from_str_radix(s, 16).map_err(|_| AppError::InvalidColor(trimmed.to_string()))
    };

    match hex.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, c) in hex.char_indices() {
                out[i] = channel(&hex[i..i + c.len_utf8()])? * 17;
            }
            Ok(Rgba(out))
        }
        6 | 8 => {
            let mut out = [255u8; 4];
            for i in 0..hex.len() / 2 {
                out[i] = channel(&hex[i * 2..i * 2 + 2])?;
            }
            Ok(Rgba(out))
        }
        _ => Err(AppError::InvalidColor(trimmed.to_string())),
    }
}
