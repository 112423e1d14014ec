//! End-to-end generation: resolve classes, infer attributes, assemble.

use rand::Rng;
use tracing::info;

use crate::channel::{ClassDescriptor, ClassType};
use crate::config::ChannelConfiguration;
use crate::error::ChannelConfigResult;
use crate::inference::AttributeInferencer;
use crate::source::{resolve_class_source, SourceRequest};

/// Options for a single generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Where class names come from.
    pub source: SourceRequest,
    /// Type for classes no type rule matches.
    pub default_type: ClassType,
}

/// Build a channel configuration.
///
/// Nothing is written here; callers serialize the returned value only after
/// every stage succeeded.
pub fn generate<R: Rng + ?Sized>(
    options: &GenerateOptions,
    rng: &mut R,
) -> ChannelConfigResult<ChannelConfiguration> {
    let source = resolve_class_source(&options.source)?;
    let inferencer = AttributeInferencer::new(options.default_type);

    let channels: Vec<ClassDescriptor> = source
        .names
        .iter()
        .enumerate()
        .map(|(ordinal, name)| inferencer.describe(name, ordinal, rng))
        .collect();

    let config = ChannelConfiguration::assemble(source.resolution, channels)?;
    info!(
        channels = config.len(),
        resolution = ?config.pixel_size_microns.as_ref().map(|r| r.as_str()),
        "assembled channel configuration"
    );
    Ok(config)
}
