//! Structural change detection: aggregates audio into embeddings, tracks
//! embedding similarity over a rolling window, and raises section-change
//! events.

use std::collections::VecDeque;
use std::time::Instant;

use lumen_track::TrackAnalysis;

use crate::embedding::{cosine_similarity, mean_embedding, EmbeddingModel};
use crate::handler::ChangeHandler;
use crate::tracker::{ChangeTracker, ChangeVerdict};

const AGG_BUFFER_MULTIPLIER: usize = 16;
const AUDIO_LOOKBACK_SEC: f64 = 1.0;
const EMBEDDING_LOOKBACK_SEC: f64 = 2.0;
const SIMILARITY_STRIDE_BLOCKS: usize = 1;
const SPOTIFY_RANGE_TOLERANCE_SEC: f64 = 5.0;

pub struct ChangeDetector {
    agg_buffer_size: usize,
    agg_buffer: Vec<f32>,
    sample_rate: usize,
    audio_lookback_samples: usize,
    embedding_lookback_blocks: usize,
    rolling_audio: VecDeque<f32>,
    rolling_embeddings: VecDeque<Vec<f32>>,
    tracker: ChangeTracker,
    model: Box<dyn EmbeddingModel>,
}

impl ChangeDetector {
    pub fn new(sample_rate: usize, buffer_size: usize, model: Box<dyn EmbeddingModel>) -> Self {
        let agg_buffer_size = buffer_size * AGG_BUFFER_MULTIPLIER;
        let blocks_per_sec = (sample_rate as f64 / agg_buffer_size as f64).round().max(1.0);
        let embedding_lookback_blocks = (blocks_per_sec * EMBEDDING_LOOKBACK_SEC).round() as usize;

        Self {
            agg_buffer_size,
            agg_buffer: Vec::with_capacity(agg_buffer_size),
            sample_rate,
            audio_lookback_samples: (sample_rate as f64 * AUDIO_LOOKBACK_SEC) as usize,
            embedding_lookback_blocks: embedding_lookback_blocks.max(1),
            rolling_audio: VecDeque::new(),
            rolling_embeddings: VecDeque::new(),
            tracker: ChangeTracker::new(Instant::now()),
            model,
        }
    }

    /// Feed one audio buffer. `current_song_sec` is the transport position
    /// used to gate weak changes against known section boundaries.
    pub fn process(
        &mut self,
        frame: &[f32],
        current_song_sec: f64,
        track: Option<&TrackAnalysis>,
        handler: &mut impl ChangeHandler,
    ) {
        self.agg_buffer.extend_from_slice(frame);
        if self.agg_buffer.len() < self.agg_buffer_size {
            return;
        }
        let aggregated = std::mem::take(&mut self.agg_buffer);

        self.rolling_audio.extend(aggregated);
        if self.rolling_audio.len() > self.audio_lookback_samples * 2 {
            let excess = self.rolling_audio.len() - self.audio_lookback_samples;
            self.rolling_audio.drain(..excess);
        }

        let lookback: Vec<f32> = self
            .rolling_audio
            .iter()
            .rev()
            .take(self.audio_lookback_samples)
            .rev()
            .copied()
            .collect();

        let embedding_frames = self.model.embed(&lookback);
        let embedding = mean_embedding(&embedding_frames);
        self.rolling_embeddings.push_back(embedding.clone());
        if self.rolling_embeddings.len() > self.embedding_lookback_blocks * 2 {
            let excess = self.rolling_embeddings.len() - self.embedding_lookback_blocks;
            self.rolling_embeddings.drain(..excess);
        }

        if self.rolling_embeddings.len() <= self.embedding_lookback_blocks {
            return;
        }

        let mut best_similarity = 1.0f64;
        let mut index = 0usize;
        while index <= self.embedding_lookback_blocks {
            if let Some(prior) = self.rolling_embeddings.iter().rev().nth(index + 1) {
                let similarity = cosine_similarity(prior, &embedding).abs();
                best_similarity = best_similarity.min(similarity);
            }
            index += SIMILARITY_STRIDE_BLOCKS;
        }

        let now = Instant::now();
        self.tracker.observe(best_similarity, now);

        match self.tracker.is_change(now) {
            ChangeVerdict::No => {}
            ChangeVerdict::Strong => {
                self.tracker.start_cooldown(now);
                handler.on_section_change(current_song_sec);
            }
            ChangeVerdict::Weak => {
                if in_track_section_range(current_song_sec, track) {
                    self.tracker.start_cooldown(now);
                    handler.on_section_change(current_song_sec);
                }
            }
        }
    }

    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }
}

fn in_track_section_range(current_sec: f64, track: Option<&TrackAnalysis>) -> bool {
    let Some(track) = track else {
        return true;
    };
    track.audio_sections.iter().any(|section| {
        (section.start_sec - current_sec).abs() < SPOTIFY_RANGE_TOLERANCE_SEC
            || (section.end_sec() - current_sec).abs() < SPOTIFY_RANGE_TOLERANCE_SEC
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::CoarseEnergyEmbedding;
    use crate::handler::NullChangeHandler;

    #[test]
    fn no_section_change_before_buffers_fill() {
        let model = Box::new(CoarseEnergyEmbedding::new(8, 64));
        let mut detector = ChangeDetector::new(44100, 512, model);
        let mut handler = NullChangeHandler;
        detector.process(&[0.0; 512], 0.0, None, &mut handler);
    }

    #[test]
    fn missing_track_analysis_allows_weak_changes_through() {
        assert!(in_track_section_range(12.0, None));
    }

    #[test]
    fn section_boundary_within_tolerance_is_in_range() {
        use lumen_track::{AudioSection, LightShowType, TrackAnalysis};

        let track = TrackAnalysis {
            track_name: "t".into(),
            album_name: "a".into(),
            artists: vec![],
            progress_ms: 0,
            duration_ms: 200_000,
            first_downbeat_ms: 0,
            beats_to_first_downbeat: 0,
            current_beat_count: 0,
            bpm: 120.0,
            key: 0,
            mode: 1,
            time_signature: 4,
            acousticness: 0.0,
            danceability: 0.5,
            energy: 0.5,
            instrumentalness: 0.0,
            liveness: 0.0,
            loudness: -8.0,
            speechiness: 0.0,
            valence: 0.0,
            tempo: 120.0,
            release_date: String::new(),
            popularity: 0,
            genres: vec![],
            light_show_type: LightShowType::Medium,
            beat_strengths_by_sec: vec![],
            audio_sections: vec![AudioSection {
                start_sec: 30.0,
                duration_sec: 20.0,
                loudness: -8.0,
                bpm: 120.0,
                key: 0,
                mode: 1,
                time_signature: 4,
            }],
        };
        assert!(in_track_section_range(31.0, Some(&track)));
        assert!(!in_track_section_range(60.0, Some(&track)));
    }
}
