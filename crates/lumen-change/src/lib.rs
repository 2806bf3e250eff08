//! Lumen Change - structural change detection from audio embeddings.
//!
//! Aggregates audio into embedding blocks, tracks their pairwise similarity
//! over a rolling window via [`tracker::ChangeTracker`], and fires
//! [`handler::ChangeHandler::on_section_change`] when the similarity stream
//! shows a statistically significant break.

pub mod detector;
pub mod embedding;
pub mod handler;
pub mod outliers;
pub mod tracker;

pub use detector::ChangeDetector;
pub use embedding::{cosine_similarity, mean_embedding, CoarseEnergyEmbedding, EmbeddingModel};
pub use handler::{ChangeHandler, NullChangeHandler};
pub use outliers::{is_outlier, is_outlier_mad};
pub use tracker::{ChangeTracker, ChangeVerdict};
