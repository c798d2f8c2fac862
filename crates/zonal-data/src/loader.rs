//! Rule source loading: format detection, file discovery and decoding of
//! rule documents into validated rule sets.
//!
//! Supports YAML, RON, TOML and JSON, selected by file extension. All
//! formats share one document shape, so a rule file can be converted
//! between them without changing its meaning.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use zonal_core::records::RuleDocument;
use zonal_core::rules::{RuleSet, ValidationError};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors raised while locating or decoding a source file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("rule source not found: {path}")]
    NotFound { path: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from [`load_rules`]: the source could not be read, or its
/// records failed validation.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid rule: {0}")]
    Validation(#[from] ValidationError),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported source file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Extensions searched by [`find_rule_file`], in discovery order.
    pub const EXTENSIONS: [&'static str; 5] = ["yaml", "yml", "ron", "toml", "json"];
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a source file with the given base name.
///
/// Looks for `{base_name}` with every supported extension. Returns
/// `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if more
/// than one exists.
pub fn find_rule_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, ConfigError> {
    let mut found: Option<PathBuf> = None;

    for ext in Format::EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found.take() {
                return Err(ConfigError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. Blank content decodes as
/// `T::default()`; `file` is only used for error reporting.
pub fn deserialize_str<T: DeserializeOwned + Default>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, ConfigError> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    let parse_err = |detail: String| ConfigError::Parse {
        file: file.to_path_buf(),
        detail,
    };

    match format {
        // A YAML document of just `~` or `null` is also empty.
        Format::Yaml => serde_yaml::from_str::<Option<T>>(content)
            .map(Option::unwrap_or_default)
            .map_err(|e| parse_err(e.to_string())),
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from
/// the extension).
pub fn deserialize_file<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    let format = detect_format(path)?;
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Rule loading
// ===========================================================================

/// Decode a rule document without validating it.
pub fn load_rule_document(path: &Path) -> Result<RuleDocument, ConfigError> {
    let document: RuleDocument = deserialize_file(path)?;
    tracing::info!(
        path = %path.display(),
        records = document.record_count(),
        "rule document loaded"
    );
    Ok(document)
}

/// Decode and validate a rule file into a [`RuleSet`].
///
/// Source errors always surface before any record is validated.
pub fn load_rules(path: &Path) -> Result<RuleSet, LoadError> {
    let document = load_rule_document(path)?;
    Ok(RuleSet::from_document(&document)?)
}

/// Like [`load_rules`], reading from an in-memory string.
pub fn parse_rules(content: &str, format: Format) -> Result<RuleSet, LoadError> {
    let document: RuleDocument = deserialize_str(content, format, Path::new("<memory>"))?;
    Ok(RuleSet::from_document(&document)?)
}

// ===========================================================================
// Tests
// ===========================================================================
