//! Positional color palette with a random fallback.

use rand::Rng;

use crate::channel::ChannelColor;

/// Hand-picked colors assigned by class position when no name rule matches.
pub const PALETTE: [ChannelColor; 9] = [
    ChannelColor::rgb(255, 0, 0),
    ChannelColor::rgb(0, 255, 0),
    ChannelColor::rgb(0, 0, 255),
    ChannelColor::rgb(255, 0, 255),
    ChannelColor::rgb(255, 255, 0),
    ChannelColor::rgb(255, 153, 0),
    ChannelColor::rgb(102, 0, 204),
    ChannelColor::rgb(0, 153, 204),
    ChannelColor::rgb(0, 153, 51),
];

/// Palette entry for a class position, or `None` past the end of the palette.
pub fn palette_color(ordinal: usize) -> Option<ChannelColor> {
    PALETTE.get(ordinal).copied()
}

/// Uniformly random opaque color.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> ChannelColor {
    ChannelColor::Rgb([rng.random(), rng.random(), rng.random()])
}
