//! # Media Table Module
//!
//! Questo modulo contiene la tabella fissa delle categorie media.
//!
//! ## Responsabilità:
//! - Classifica un file per estensione (Video, Audio, Image)
//! - Definisce l'estensione di output per ogni categoria
//! - Costruisce la lista di argomenti per l'encoder esterno
//! - Mappa i preset di qualità sui parametri numerici (CRF video, qualità WebP)
//!
//! ## Tabella:
//! | Categoria | Input | Output | Codec |
//! |-----------|-------|--------|-------|
//! | Video | mp4, mkv, avi, mov, webm | mp4 | libx265 + aac |
//! | Audio | mp3, wav, aac, flac, m4a | opus | libopus |
//! | Image | jpg, jpeg, png, bmp | webp | libwebp |
//!
//! Aggiungere una categoria significa aggiungere una riga a `CATEGORIES`
//! e un ramo a `encoder_args`.

use crate::args;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kind of media a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Video,
    Audio,
    Image,
}

/// Compression preset shared by every category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    High,
    // `serde(other)` must sit on the last variant
    #[default]
    #[serde(other)]
    Medium,
}

struct CategorySpec {
    category: MediaCategory,
    extensions: &'static [&'static str],
    output_extension: &'static str,
}

const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        category: MediaCategory::Video,
        extensions: &["mp4", "mkv", "avi", "mov", "webm"],
        output_extension: "mp4",
    },
    CategorySpec {
        category: MediaCategory::Audio,
        extensions: &["mp3", "wav", "aac", "flac", "m4a"],
        output_extension: "opus",
    },
    CategorySpec {
        category: MediaCategory::Image,
        extensions: &["jpg", "jpeg", "png", "bmp"],
        output_extension: "webp",
    },
];

impl MediaCategory {
    /// Classify a path by its (case-insensitive) extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        CATEGORIES
            .iter()
            .find(|spec| spec.extensions.contains(&ext.as_str()))
            .map(|spec| spec.category)
    }

    fn spec(self) -> &'static CategorySpec {
        match self {
            Self::Video => &CATEGORIES[0],
            Self::Audio => &CATEGORIES[1],
            Self::Image => &CATEGORIES[2],
        }
    }

    /// Extensions recognised as input for this category
    pub fn extensions(self) -> &'static [&'static str] {
        self.spec().extensions
    }

    /// Extension of the transcoded file
    pub fn output_extension(self) -> &'static str {
        self.spec().output_extension
    }

    /// Full encoder argument list for `src` → `dst`
    pub fn encoder_args(self, src: &Path, dst: &Path, quality: QualityPreset) -> Vec<String> {
        let mut args = args!["-y", "-i", src.display()];
        match self {
            Self::Video => args.extend(args![
                "-c:v", "libx265",
                "-preset", "medium",
                "-crf", quality.crf(),
                "-c:a", "aac",
                "-b:a", "96k",
                "-movflags", "+faststart",
            ]),
            Self::Audio => args.extend(args!["-c:a", "libopus", "-b:a", "96k"]),
            Self::Image => args.extend(args!["-c:v", "libwebp", "-q:v", quality.webp_quality()]),
        }
        args.push(dst.display().to_string());
        args
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Image => "Image",
        };
        f.write_str(name)
    }
}

impl QualityPreset {
    /// Parse a preset name; anything unrecognised falls back to `Medium`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// x265 constant rate factor (lower = better quality)
    pub fn crf(self) -> u8 {
        match self {
            Self::Low => 32,
            Self::Medium => 28,
            Self::High => 23,
        }
    }

    /// libwebp quality (higher = better quality)
    pub fn webp_quality(self) -> u8 {
        match self {
            Self::Low => 70,
            Self::Medium => 80,
            Self::High => 90,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}
