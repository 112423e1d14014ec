//! Derive PhilPath viewer channel configurations.
//!
//! A configuration lists one channel per segmentation class with a display
//! name, a color and a semantic type, plus the pixel size in microns. Classes
//! come from one of:
//!
//! - an algorithm descriptor (`.json`) with `resolution` and `classes.names`
//! - a Keras weight file (`.h5`), either from its embedded descriptor or by
//!   counting the outputs of the last convolution layer
//! - an explicit class count, producing `Name_0 .. Name_{n-1}`
//!
//! ## Pipeline
//!
//! ```text
//! SourceRequest ──resolve──▶ ClassSource ──infer (per class)──▶ ClassDescriptor*
//!                                                                   │
//!                                        ChannelConfiguration ◀─assemble
//! ```
//!
//! Colors and types come from ordered, first-match-wins name rules (see
//! [`inference`]). Unmatched classes get a palette color by position and a
//! random color beyond the palette; the random source is always passed in.
//!
//! ## Features
//!
//! - `hdf5` - read Keras weight files through `hdf5-metno` (needs libhdf5)

pub mod channel;
pub mod config;
mod error;
pub mod generate;
pub mod inference;
pub mod palette;
pub mod rule;
pub mod source;
pub mod weights;

pub use channel::{ChannelColor, ClassDescriptor, ClassType, TRANSPARENT_ALPHA};
pub use config::{ChannelConfiguration, DEFAULT_OUTPUT_FILE};
pub use error::{ChannelConfigError, ChannelConfigResult};
pub use generate::{generate, GenerateOptions};
pub use inference::{AttributeInferencer, ColorOrigin, InferredAttributes};
pub use palette::{palette_color, random_color, PALETTE};
pub use rule::{NamePattern, NameRule, NormalizedName, RuleSet};
pub use source::{
    resolve_class_source, AlgorithmDescriptor, ArtifactKind, ClassSource, Resolution,
    SourceRequest,
};
pub use weights::{class_source_from_weights, WeightsArchive};

#[cfg(feature = "hdf5")]
pub use weights::Hdf5Archive;
