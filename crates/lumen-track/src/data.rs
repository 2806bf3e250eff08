//! The parsed, read-only track-metadata record shared between the engine and
//! the audio analyser.

/// Light-show intensity classification, computed from genre/energy/loudness/
/// danceability by the classifier in `lumen-analysis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightShowType {
    Low,
    Medium,
    High,
    HipHop,
}

/// One structural section of a track (verse/chorus/drop/...), as reported by
/// the streaming-service analysis API.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSection {
    pub start_sec: f64,
    pub duration_sec: f64,
    pub loudness: f64,
    pub bpm: f64,
    pub key: i32,
    pub mode: i32,
    pub time_signature: i32,
}

impl AudioSection {
    /// End timestamp of this section.
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }
}

/// One observed track's full analysis, valid until the next observed track
/// change supersedes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackAnalysis {
    pub track_name: String,
    pub album_name: String,
    pub artists: Vec<String>,

    pub progress_ms: u64,
    pub duration_ms: u64,
    pub first_downbeat_ms: u64,
    pub beats_to_first_downbeat: u32,
    pub current_beat_count: u32,

    pub bpm: f64,
    pub key: i32,
    pub mode: i32,
    pub time_signature: i32,

    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub valence: f64,
    pub tempo: f64,

    /// Informational only; logged but not consumed by any decision logic.
    pub release_date: String,
    pub popularity: u32,

    pub genres: Vec<String>,
    pub light_show_type: LightShowType,

    /// Per-second beat strength, quantile-normalized to `[0, 1]`.
    pub beat_strengths_by_sec: Vec<f64>,

    /// Ordered by `start_sec`, non-overlapping.
    pub audio_sections: Vec<AudioSection>,
}

impl TrackAnalysis {
    /// Find the index of the last section whose `start_sec <= t`, if any.
    ///
    /// Sections are treated as contiguous (each running until the next
    /// section's start), so no upper-bound check is needed beyond `start_sec`.
    pub fn section_at(&self, t: f64) -> Option<usize> {
        self.audio_sections.iter().rposition(|s| s.start_sec <= t)
    }

    /// Beat strength at the given whole second, or 0 if out of range.
    pub fn beat_strength_at_sec(&self, second: usize) -> f64 {
        self.beat_strengths_by_sec.get(second).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(start: f64, dur: f64) -> AudioSection {
        AudioSection {
            start_sec: start,
            duration_sec: dur,
            loudness: -6.0,
            bpm: 120.0,
            key: 0,
            mode: 1,
            time_signature: 4,
        }
    }

    #[test]
    fn section_at_finds_containing_section() {
        let sections = vec![section(0.0, 10.0), section(10.0, 20.0), section(30.0, 5.0)];
        assert_eq!(AudioSection::end_sec(&sections[0]), 10.0);
        let track = TrackAnalysis {
            track_name: "t".into(),
            album_name: "a".into(),
            artists: vec![],
            progress_ms: 0,
            duration_ms: 1,
            first_downbeat_ms: 0,
            beats_to_first_downbeat: 0,
            current_beat_count: 0,
            bpm: 120.0,
            key: 0,
            mode: 1,
            time_signature: 4,
            acousticness: 0.0,
            danceability: 0.0,
            energy: 0.0,
            instrumentalness: 0.0,
            liveness: 0.0,
            loudness: -6.0,
            speechiness: 0.0,
            valence: 0.0,
            tempo: 120.0,
            release_date: String::new(),
            popularity: 0,
            genres: vec![],
            light_show_type: LightShowType::Medium,
            beat_strengths_by_sec: vec![],
            audio_sections: sections,
        };
        assert_eq!(track.section_at(5.0), Some(0));
        assert_eq!(track.section_at(15.0), Some(1));
        assert_eq!(track.section_at(31.0), Some(2));
    }
}
