//! Channel data model: class types, display colors and class descriptors.
//!
//! A [`ClassDescriptor`] is one entry of the viewer configuration. It is built
//! once per class by the inference engine and serialized as
//! `{"name": ..., "rgba": [...], "type": ...}`.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ChannelConfigError;

/// Alpha marker flagging a channel that is rendered fully transparent.
pub const TRANSPARENT_ALPHA: i16 = -255;

/// Semantic role of a class in the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassType {
    /// Tissue structure (default).
    #[default]
    Structure,
    /// Boundary between structures.
    Boundary,
    /// Background or empty slide area.
    Background,
}

impl ClassType {
    /// All known class types.
    pub const ALL: [ClassType; 3] = [Self::Structure, Self::Boundary, Self::Background];

    /// Upper-case label used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structure => "STRUCTURE",
            Self::Boundary => "BOUNDARY",
            Self::Background => "BACKGROUND",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassType {
    type Err = ChannelConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ChannelConfigError::InvalidClassType {
                value: s.to_string(),
            })
    }
}

/// Display color of a channel.
///
/// Serialized as a JSON array of three (RGB) or four (RGBA) integers. The
/// fourth component is only ever used for the [`TRANSPARENT_ALPHA`] marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelColor {
    Rgb([u8; 3]),
    Rgba([u8; 3], i16),
}

impl ChannelColor {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb([r, g, b])
    }

    /// White flagged as transparent; used for background-like classes.
    pub const fn transparent_white() -> Self {
        Self::Rgba([255, 255, 255], TRANSPARENT_ALPHA)
    }

    /// The RGB part of the color.
    pub fn components(&self) -> [u8; 3] {
        match self {
            Self::Rgb(c) | Self::Rgba(c, _) => *c,
        }
    }

    /// The alpha marker, if any.
    pub fn alpha(&self) -> Option<i16> {
        match self {
            Self::Rgb(_) => None,
            Self::Rgba(_, a) => Some(*a),
        }
    }

    /// Flattened integer representation (3 or 4 values).
    pub fn to_vec(&self) -> Vec<i32> {
        let [r, g, b] = self.components();
        let mut values = vec![i32::from(r), i32::from(g), i32::from(b)];
        if let Some(a) = self.alpha() {
            values.push(i32::from(a));
        }
        values
    }
}

impl Serialize for ChannelColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.to_vec();
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for v in &values {
            seq.serialize_element(v)?;
        }
        seq.end()
    }
}

/// One class of the viewer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    /// Display name of the class. Not required to be unique.
    pub name: String,
    /// Zero-based position in the source class list.
    #[serde(skip_serializing)]
    pub ordinal: usize,
    /// Display color.
    #[serde(rename = "rgba")]
    pub color: ChannelColor,
    /// Semantic role.
    #[serde(rename = "type")]
    pub class_type: ClassType,
}
