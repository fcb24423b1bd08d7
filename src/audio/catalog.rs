use rodio::Source;
use serde::Serialize;

use super::{forest::ForestAmbience, rain::SoftRain, waves::OceanWaves};

/// One selectable ambient sound. The order of `SOUND_OPTIONS` is the display
/// order; the first entry is the default selection.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SoundOption {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const SOUND_OPTIONS: &[SoundOption] = &[
    SoundOption {
        id: "soft-rain",
        name: "Soft Rain",
        icon: "🌧️",
    },
    SoundOption {
        id: "ocean-waves",
        name: "Ocean Waves",
        icon: "🌊",
    },
    SoundOption {
        id: "forest-ambience",
        name: "Forest Ambience",
        icon: "🌳",
    },
];

pub fn default_sound() -> &'static SoundOption {
    &SOUND_OPTIONS[0]
}

pub fn find(id: &str) -> Option<&'static SoundOption> {
    SOUND_OPTIONS.iter().find(|option| option.id == id)
}

/// Every catalog entry resolves to an infinite synthesized source; there are
/// no bundled audio files.
pub fn build_source(id: &str) -> Box<dyn Source<Item = f32> + Send> {
    match id {
        "ocean-waves" => Box::new(OceanWaves::new()),
        "forest-ambience" => Box::new(ForestAmbience::new()),
        _ => Box::new(SoftRain::new()),
    }
}
