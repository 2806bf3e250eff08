//! Lumen Analysis - real-time audio analysis for the light-show pipeline
//!
//! Turns a stream of audio frames into the musical events the rest of the
//! system reacts to:
//!
//! - [`fft`] / [`spectrum`] / [`phase`] - FFT, windowing, and spectral primitives
//! - [`mel`] - mel-scale filterbank energies and MFCCs
//! - [`onset`] - spectral-flux onset detection
//! - [`tempo`] - inter-onset-interval beat tracking
//! - [`pitch`] - autocorrelation pitch estimation and note detection
//! - [`classifier`] - maps track-level features to a [`LightShowType`]
//! - [`state`] - silence/beat/note transport state machines
//! - [`handler`] - callbacks for transport and musical events
//! - [`analyser`] - the [`AudioAnalyser`] that ties the above together

pub mod analyser;
pub mod classifier;
pub mod fft;
pub mod handler;
pub mod mel;
pub mod onset;
pub mod phase;
pub mod pitch;
pub mod spectrum;
pub mod state;
pub mod tempo;

pub use analyser::AudioAnalyser;
pub use classifier::classify_track;
pub use fft::{Fft, Window};
pub use handler::{AnalyserHandler, NullAnalyserHandler};
pub use lumen_track::LightShowType;
pub use mel::{mel_band_energies, mfcc, MelFilterbank};
pub use onset::OnsetDetector;
pub use pitch::{estimate_pitch, hz_to_midi_note};
pub use spectrum::{
    find_peaks, magnitude_spectrum, phase_spectrum, power_spectrum_db, spectral_centroid,
    spectral_flatness, spectral_flux, spectral_rolloff,
};
pub use state::AnalyserState;
pub use tempo::BeatTracker;
