//! Audio embedding models.
//!
//! The production embedding model is an external neural network; this crate
//! only depends on the shape of its output (a matrix of per-frame vectors,
//! mean-reduced along time), so it is abstracted behind [`EmbeddingModel`]
//! rather than pulled in as a dependency.

/// Produces one embedding vector per analysis block from a window of audio.
pub trait EmbeddingModel: Send {
    /// Returns one embedding vector per internal frame of `audio`.
    fn embed(&self, audio: &[f32]) -> Vec<Vec<f32>>;
}

/// Mean-reduce an embedding matrix's time axis into a single vector.
pub fn mean_embedding(frames: &[Vec<f32>]) -> Vec<f32> {
    if frames.is_empty() {
        return Vec::new();
    }
    let dims = frames[0].len();
    let mut mean = vec![0.0f32; dims];
    for frame in frames {
        for (m, &v) in mean.iter_mut().zip(frame.iter()) {
            *m += v;
        }
    }
    let n = frames.len() as f32;
    for m in mean.iter_mut() {
        *m /= n;
    }
    mean
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

/// A deterministic, dependency-free stand-in for a real embedding model:
/// bins a frame's energy into a fixed number of coarse spectral-shape
/// buckets. Good enough to drive the change-tracking pipeline in tests and
/// as a default when no real model is configured.
pub struct CoarseEnergyEmbedding {
    n_bins: usize,
    frame_len: usize,
}

impl CoarseEnergyEmbedding {
    pub fn new(n_bins: usize, frame_len: usize) -> Self {
        Self { n_bins, frame_len }
    }
}

impl EmbeddingModel for CoarseEnergyEmbedding {
    fn embed(&self, audio: &[f32]) -> Vec<Vec<f32>> {
        audio
            .chunks(self.frame_len.max(1))
            .map(|chunk| {
                let mut bins = vec![0.0f32; self.n_bins];
                let bin_size = chunk.len().div_ceil(self.n_bins).max(1);
                for (i, &sample) in chunk.iter().enumerate() {
                    let bin = (i / bin_size).min(self.n_bins - 1);
                    bins[bin] += sample * sample;
                }
                bins
            })
            .collect()
    }
}
