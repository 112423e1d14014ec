//! Class source resolution.
//!
//! Turns the run inputs (an artifact path and/or an explicit class count) into
//! an ordered list of class names plus an optional resolution. The artifact
//! kind is picked from the file extension:
//!
//! - `.json` - algorithm descriptor with `resolution` and `classes.names`
//! - `.h5`, `.hdf5`, `.keras` - Keras model weights (see [`crate::weights`])

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ChannelConfigError, ChannelConfigResult};
use crate::weights;

/// Unit marker trailing resolution values in algorithm descriptors.
pub const RESOLUTION_UNIT: &str = "mpp";

/// Prefix of synthesized class names.
pub const SYNTHESIZED_NAME_PREFIX: &str = "Name_";

/// Kind of input artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Trained model weights (HDF5 container).
    ModelWeights,
    /// JSON algorithm descriptor.
    AlgorithmDescriptor,
}

impl ArtifactKind {
    /// Extensions (lowercase, without dot) handled by this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::ModelWeights => &["h5", "hdf5", "keras"],
            Self::AlgorithmDescriptor => &["json"],
        }
    }

    /// Classify an artifact by extension (case-insensitive).
    pub fn from_path(path: &Path) -> ChannelConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        [Self::ModelWeights, Self::AlgorithmDescriptor]
            .into_iter()
            .find(|kind| {
                extension
                    .as_deref()
                    .is_some_and(|ext| kind.extensions().iter().any(|e| *e == ext))
            })
            .ok_or_else(|| ChannelConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelWeights => write!(f, "model weights"),
            Self::AlgorithmDescriptor => write!(f, "algorithm descriptor"),
        }
    }
}

/// Pixel size in microns, kept as the text found in the source.
///
/// Serialized as a JSON number with the source digits unchanged (`0.50`
/// stays `0.50`) when the text is valid JSON number syntax, otherwise as the
/// raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution(String);

impl Resolution {
    /// Parse a resolution value, stripping whitespace and a trailing `mpp` unit.
    ///
    /// Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let split = trimmed.len().saturating_sub(RESOLUTION_UNIT.len());
        let value = match (trimmed.get(..split), trimmed.get(split..)) {
            (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(RESOLUTION_UNIT) => head.trim_end(),
            _ => trimmed,
        };

        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// The resolution text with the unit removed.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text as a JSON number, if it has number syntax.
    pub fn as_number(&self) -> Option<serde_json::Number> {
        serde_json::Number::from_str(&self.0).ok()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(number) => number.serialize(serializer),
            None => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    /// `"0.5mpp"` or `0.5`.
    #[serde(default)]
    resolution: Option<serde_json::Value>,
    #[serde(default)]
    classes: Option<RawClasses>,
}

#[derive(Debug, Deserialize)]
struct RawClasses {
    #[serde(default)]
    names: Option<Vec<String>>,
}

/// The parts of an algorithm descriptor this tool reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    pub resolution: Option<Resolution>,
    pub class_names: Vec<String>,
}

impl AlgorithmDescriptor {
    /// Parse descriptor JSON. `origin` only labels errors.
    pub fn from_json_str(text: &str, origin: &Path) -> ChannelConfigResult<Self> {
        let raw: RawDescriptor = serde_json::from_str(text)
            .map_err(|e| ChannelConfigError::malformed(origin, e.to_string()))?;

        let class_names = raw
            .classes
            .and_then(|c| c.names)
            .ok_or_else(|| ChannelConfigError::malformed(origin, "missing `classes.names`"))?;

        let resolution = match raw.resolution {
            Some(Value::String(text)) => Resolution::parse(&text),
            Some(Value::Number(number)) => Resolution::parse(&number.to_string()),
            Some(Value::Null) | None => None,
            Some(other) => {
                return Err(ChannelConfigError::malformed(
                    origin,
                    format!("`resolution` must be text or a number, got {other}"),
                ))
            }
        };

        Ok(Self {
            resolution,
            class_names,
        })
    }

    /// Read and parse a descriptor file.
    pub fn from_file(path: &Path) -> ChannelConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ChannelConfigError::io(path, e))?;
        Self::from_json_str(&text, path)
    }
}

/// Resolved classes and resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSource {
    pub resolution: Option<Resolution>,
    pub names: Vec<String>,
}

impl ClassSource {
    /// `Name_0 .. Name_{count-1}` with no resolution.
    pub fn synthesized(count: usize) -> Self {
        Self {
            resolution: None,
            names: (0..count)
                .map(|i| format!("{SYNTHESIZED_NAME_PREFIX}{i}"))
                .collect(),
        }
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.names.len()
    }
}

impl From<AlgorithmDescriptor> for ClassSource {
    fn from(descriptor: AlgorithmDescriptor) -> Self {
        Self {
            resolution: descriptor.resolution,
            names: descriptor.class_names,
        }
    }
}

/// Inputs to class resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRequest {
    /// Model weights or algorithm descriptor file.
    pub input: Option<PathBuf>,
    /// Explicit number of classes.
    pub explicit_class_count: Option<usize>,
}

impl SourceRequest {
    /// Request reading classes from an artifact.
    pub fn from_input(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Some(path.into()),
            explicit_class_count: None,
        }
    }

    /// Request synthesized classes.
    pub fn from_count(count: usize) -> Self {
        Self {
            input: None,
            explicit_class_count: Some(count),
        }
    }

    /// Fail early when there is nothing to resolve from.
    pub fn validate(&self) -> ChannelConfigResult<()> {
        if self.input.is_none() && self.explicit_class_count.is_none() {
            return Err(ChannelConfigError::Configuration);
        }
        Ok(())
    }
}

/// Resolve the ordered class names and resolution for a run.
///
/// An algorithm descriptor (standalone or embedded in model weights) always
/// supplies the names. The explicit count is used when no input is given, or
/// for model weights without an embedded descriptor.
pub fn resolve_class_source(request: &SourceRequest) -> ChannelConfigResult<ClassSource> {
    request.validate()?;

    let Some(path) = request.input.as_deref() else {
        let count = request.explicit_class_count.unwrap_or_default();
        debug!(count, "synthesizing class names");
        return Ok(ClassSource::synthesized(count));
    };

    let kind = ArtifactKind::from_path(path)?;
    info!(path = %path.display(), %kind, "reading classes");

    let source = match kind {
        ArtifactKind::AlgorithmDescriptor => AlgorithmDescriptor::from_file(path)?.into(),
        ArtifactKind::ModelWeights => read_weights(path, request.explicit_class_count)?,
    };

    if let Some(count) = request.explicit_class_count {
        if count != source.class_count() {
            warn!(
                explicit = count,
                resolved = source.class_count(),
                "explicit class count ignored, names come from the input"
            );
        }
    }

    Ok(source)
}

#[cfg(feature = "hdf5")]
fn read_weights(path: &Path, explicit_count: Option<usize>) -> ChannelConfigResult<ClassSource> {
    let archive = weights::Hdf5Archive::open(path)?;
    weights::class_source_from_weights(&archive, path, explicit_count)
}

#[cfg(not(feature = "hdf5"))]
fn read_weights(path: &Path, explicit_count: Option<usize>) -> ChannelConfigResult<ClassSource> {
    match explicit_count {
        Some(count) => {
            warn!(
                path = %path.display(),
                "built without hdf5 support, using the explicit class count"
            );
            Ok(weights::synthesize_from_count(count))
        }
        None => Err(ChannelConfigError::WeightsUnavailable {
            path: path.to_path_buf(),
        }),
    }
}
