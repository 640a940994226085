use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::error::ConfigError;

/// Everything that distinguishes one instrument's chain from another's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentPreset {
    pub main_waveform: Waveform,
    pub sub_waveform: Waveform,
    pub filter_cutoff_hz: f32,
    /// Seconds to ramp up, before the 30%-of-duration cap.
    pub attack: f64,
    /// Seconds to ramp down, before the 30%-of-duration cap.
    pub release: f64,
    pub main_gain: f32,
    pub sub_gain: f32,
    /// Reverb impulse length in seconds, capped at 3.
    pub reverb_seconds: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Instrument {
    #[default]
    Piano,
    Guitar,
    Organ,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Piano, Instrument::Guitar, Instrument::Organ];

    pub fn preset(self) -> InstrumentPreset {
        match self {
            Instrument::Piano => InstrumentPreset {
                main_waveform: Waveform::Sine,
                sub_waveform: Waveform::Triangle,
                filter_cutoff_hz: 2000.0,
                attack: 0.1,
                release: 0.3,
                main_gain: 0.5,
                sub_gain: 0.15,
                reverb_seconds: 2.0,
            },
            Instrument::Guitar => InstrumentPreset {
                main_waveform: Waveform::Sawtooth,
                sub_waveform: Waveform::Triangle,
                filter_cutoff_hz: 1500.0,
                attack: 0.05,
                release: 0.1,
                main_gain: 0.3,
                sub_gain: 0.1,
                reverb_seconds: 1.5,
            },
            Instrument::Organ => InstrumentPreset {
                main_waveform: Waveform::Square,
                sub_waveform: Waveform::Square,
                filter_cutoff_hz: 2500.0,
                attack: 0.02,
                release: 0.02,
                main_gain: 0.2,
                sub_gain: 0.1,
                reverb_seconds: 1.0,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Guitar => "guitar",
            Instrument::Organ => "organ",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .into_iter()
            .find(|i| i.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownInstrument(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_piano() {
        assert_eq!(Instrument::default(), Instrument::Piano);
        let piano = Instrument::Piano.preset();
        assert_eq!(piano.main_waveform, Waveform::Sine);
        assert_eq!(piano.sub_waveform, Waveform::Triangle);
        assert_eq!(piano.filter_cutoff_hz, 2000.0);
    }

    #[test]
    fn presets_keep_sub_quieter_than_main() {
        for instrument in Instrument::ALL {
            let preset = instrument.preset();
            assert!(preset.sub_gain < preset.main_gain, "{instrument}");
            assert!(preset.reverb_seconds <= 3.0);
        }
    }

    #[test]
    fn names_round_trip() {
        for instrument in Instrument::ALL {
            assert_eq!(instrument.to_string().parse::<Instrument>().unwrap(), instrument);
        }
        assert_eq!(" ORGAN ".parse::<Instrument>().unwrap(), Instrument::Organ);
        assert!(matches!(
            "theremin".parse::<Instrument>(),
            Err(ConfigError::UnknownInstrument(_))
        ));
    }
}
