//! Attribute inference: derive a display color and class type from a class name.
//!
//! Color and type are two independent first-match-wins passes over the same
//! normalized name. A name can hit the boundary color rule and still get a
//! different type, or the other way round.
//!
//! ## Color rules (in order)
//!
//! | rule         | matches                       | color                |
//! |--------------|-------------------------------|----------------------|
//! | `non_tumour` | `non tumour`, `not tumor`, .. | `[0,255,0]`          |
//! | `tumour`     | `tumour`, `tumor`             | `[255,0,0]`          |
//! | `background` | `background`                  | `[255,255,255,-255]` |
//! | `whitespace` | `whitespace`, `white space`   | `[255,255,255,-255]` |
//! | `boundary`   | `bound`                       | `[20,20,20]`         |
//!
//! Unmatched names take the palette entry at their ordinal, then a random
//! color once the palette is exhausted.
//!
//! ## Type rules (in order)
//!
//! `bound` → `BOUNDARY`, `background`/`whitespace` → `BACKGROUND`, otherwise
//! the default type given at construction.

use rand::Rng;
use tracing::{debug, warn};

use crate::channel::{ChannelColor, ClassDescriptor, ClassType};
use crate::palette::{palette_color, random_color};
use crate::rule::{NamePattern, NormalizedName, RuleSet};

const NON_TUMOUR: NamePattern = NamePattern::AnyOf(&["non tumo", "nontumo", "not tumo"]);
const TUMOUR: NamePattern = NamePattern::AnyOf(&["tumour", "tumor"]);
const BACKGROUND: NamePattern = NamePattern::AnyOf(&["background"]);
const WHITESPACE: NamePattern = NamePattern::AnyOf(&["whitespace", "white space"]);
const BOUNDARY: NamePattern = NamePattern::AnyOf(&["bound"]);
const BACKGROUND_LIKE: NamePattern =
    NamePattern::AnyOf(&["background", "whitespace", "white space"]);

/// Where an inferred color came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOrigin {
    /// A name rule matched.
    Rule(&'static str),
    /// Positional palette entry.
    Palette,
    /// Random fallback past the end of the palette.
    Random,
}

/// Result of inferring a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredAttributes {
    pub color: ChannelColor,
    pub class_type: ClassType,
    pub color_origin: ColorOrigin,
}

/// Rule-based color and type classifier.
#[derive(Debug, Clone)]
pub struct AttributeInferencer {
    color_rules: RuleSet<ChannelColor>,
    type_rules: RuleSet<ClassType>,
    default_type: ClassType,
}

impl Default for AttributeInferencer {
    fn default() -> Self {
        Self::new(ClassType::default())
    }
}

impl AttributeInferencer {
    /// Create an inferencer with the built-in rules and the given default type.
    pub fn new(default_type: ClassType) -> Self {
        Self {
            color_rules: default_color_rules(),
            type_rules: default_type_rules(),
            default_type,
        }
    }

    /// Create an inferencer with custom rule sets.
    pub fn with_rules(
        color_rules: RuleSet<ChannelColor>,
        type_rules: RuleSet<ClassType>,
        default_type: ClassType,
    ) -> Self {
        Self {
            color_rules,
            type_rules,
            default_type,
        }
    }

    /// Type assigned when no type rule matches.
    pub fn default_type(&self) -> ClassType {
        self.default_type
    }

    /// Infer color and type for a class.
    ///
    /// `rng` is only consulted when neither a rule nor the palette supplies a color.
    pub fn infer<R: Rng + ?Sized>(
        &self,
        name: &str,
        ordinal: usize,
        rng: &mut R,
    ) -> InferredAttributes {
        let normalized = NormalizedName::new(name);
        let (color, color_origin) = self.infer_color(&normalized, ordinal, rng);
        let class_type = self.infer_type(&normalized);

        debug!(class = name, ordinal, ?color, ?color_origin, %class_type, "inferred class attributes");

        InferredAttributes {
            color,
            class_type,
            color_origin,
        }
    }

    /// Infer attributes and package them as a descriptor.
    pub fn describe<R: Rng + ?Sized>(
        &self,
        name: &str,
        ordinal: usize,
        rng: &mut R,
    ) -> ClassDescriptor {
        let attrs = self.infer(name, ordinal, rng);
        ClassDescriptor {
            name: name.to_string(),
            ordinal,
            color: attrs.color,
            class_type: attrs.class_type,
        }
    }

    fn infer_color<R: Rng + ?Sized>(
        &self,
        name: &NormalizedName,
        ordinal: usize,
        rng: &mut R,
    ) -> (ChannelColor, ColorOrigin) {
        if let Some(rule) = self.color_rules.first_match(name) {
            return (*rule.outcome(), ColorOrigin::Rule(rule.id()));
        }

        match palette_color(ordinal) {
            Some(color) => (color, ColorOrigin::Palette),
            None => {
                warn!(ordinal, "palette exhausted, using a random color");
                (random_color(rng), ColorOrigin::Random)
            }
        }
    }

    fn infer_type(&self, name: &NormalizedName) -> ClassType {
        self.type_rules
            .resolve(name)
            .copied()
            .unwrap_or(self.default_type)
    }
}

/// Built-in color rules, in priority order.
pub fn default_color_rules() -> RuleSet<ChannelColor> {
    RuleSet::new()
        .with_rule("non_tumour", NON_TUMOUR, ChannelColor::rgb(0, 255, 0))
        .with_rule("tumour", TUMOUR, ChannelColor::rgb(255, 0, 0))
        .with_rule("background", BACKGROUND, ChannelColor::transparent_white())
        .with_rule("whitespace", WHITESPACE, ChannelColor::transparent_white())
        .with_rule("boundary", BOUNDARY, ChannelColor::rgb(20, 20, 20))
}

/// Built-in type rules, in priority order.
pub fn default_type_rules() -> RuleSet<ClassType> {
    RuleSet::new()
        .with_rule("boundary", BOUNDARY, ClassType::Boundary)
        .with_rule("background", BACKGROUND_LIKE, ClassType::Background)
}
