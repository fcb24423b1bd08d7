use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

/// Forest ambience generator.
/// A bed of band-limited wind with sparse birdsong chirps a few seconds
/// apart, each a short decaying tone at a random pitch.
pub struct ForestAmbience {
    rng: StdRng,
    wind_state: f32,
    chirp_phase: f32,
    chirp_freq: f32,
    chirp_energy: f32,
    next_chirp_in: u32,
}

impl ForestAmbience {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            wind_state: 0.0,
            chirp_phase: 0.0,
            chirp_freq: 0.0,
            chirp_energy: 0.0,
            next_chirp_in: SAMPLE_RATE,
        }
    }
}

impl Iterator for ForestAmbience {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        self.wind_state += 0.02 * (white - self.wind_state);

        if self.next_chirp_in == 0 {
            self.chirp_freq = self.rng.gen_range(1800.0..3600.0);
            self.chirp_energy = self.rng.gen_range(0.2..0.45);
            self.chirp_phase = 0.0;
            // Two to nine seconds until the next bird.
            self.next_chirp_in = self.rng.gen_range(SAMPLE_RATE * 2..SAMPLE_RATE * 9);
        } else {
            self.next_chirp_in -= 1;
        }

        self.chirp_phase += TAU * self.chirp_freq / SAMPLE_RATE as f32;
        if self.chirp_phase > TAU {
            self.chirp_phase -= TAU;
        }
        self.chirp_energy *= 0.9996;
        let chirp = self.chirp_energy * self.chirp_phase.sin();

        Some((self.wind_state * 0.5 + chirp) * 0.8)
    }
}

impl Source for ForestAmbience {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
