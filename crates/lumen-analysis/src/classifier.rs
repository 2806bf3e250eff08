//! Pure function mapping track-level features to a [`LightShowType`].

use lumen_track::LightShowType;

const LOW_VOCAB: [&str; 4] = ["mellow", "soft", "golden", "trance"];
const MEDIUM_VOCAB: [&str; 1] = ["pop"];
const HIGH_VOCAB: [&str; 9] = [
    "dance", "hard", "techno", "house", "edm", "electro", "latin", "euro", "reggaeton",
];
const HIP_HOP_VOCAB: [&str; 1] = ["hip hop"];

fn any_substring_match(haystack: &str, vocab: &[&str]) -> bool {
    vocab.iter().any(|word| haystack.contains(word))
}

/// Classify a track's light-show intensity from its genre tags and
/// high-level audio features.
///
/// First-match-wins cascade; see the HIGH branch for a deliberately
/// preserved operator-precedence quirk: `(has_high && energy > 0.87) ||
/// loudness > -4.5 || danceability > 0.87` makes the loudness/danceability
/// terms unconditional with respect to genre. This is intentional, not a bug
/// to fix — changing it changes which tracks get promoted to HIGH.
pub fn classify_track(
    genres: &[String],
    bpm: f64,
    energy: f64,
    loudness: f64,
    danceability: f64,
) -> LightShowType {
    let joined = genres.join(" ").to_lowercase();
    let every_flag_true = joined.is_empty();

    let has_low = every_flag_true || any_substring_match(&joined, &LOW_VOCAB);
    let has_medium = every_flag_true || any_substring_match(&joined, &MEDIUM_VOCAB);
    let has_high = every_flag_true || any_substring_match(&joined, &HIGH_VOCAB);
    let has_hip_hop = every_flag_true || any_substring_match(&joined, &HIP_HOP_VOCAB);

    if has_hip_hop && !has_medium && !has_high {
        return LightShowType::HipHop;
    }

    if (has_high && energy > 0.87) || loudness > -4.5 || danceability > 0.87 {
        return LightShowType::High;
    }

    if has_high && has_low {
        return LightShowType::Medium;
    }

    if bpm < 90.0 || energy < 0.4 || danceability < 0.3 {
        return LightShowType::Low;
    }

    LightShowType::Medium
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pop_is_medium() {
        assert_eq!(
            classify_track(&genres(&["pop"]), 110.0, 0.5, -6.0, 0.6),
            LightShowType::Medium
        );
    }

    #[test]
    fn hip_hop_tag_is_hip_hop() {
        assert_eq!(
            classify_track(&genres(&["hip hop"]), 90.0, 0.5, -6.0, 0.5),
            LightShowType::HipHop
        );
    }

    #[test]
    fn techno_high_energy_is_high() {
        assert_eq!(
            classify_track(&genres(&["techno"]), 130.0, 0.9, -3.0, 0.9),
            LightShowType::High
        );
    }

    #[test]
    fn no_genres_slow_quiet_is_low() {
        assert_eq!(
            classify_track(&genres(&[]), 70.0, 0.2, -20.0, 0.1),
            LightShowType::Low
        );
    }

    #[test]
    fn loud_track_is_high_even_without_high_genre_tag() {
        // Preserved precedence quirk: loudness > -4.5 alone forces HIGH.
        assert_eq!(
            classify_track(&genres(&["mellow"]), 80.0, 0.2, -3.0, 0.1),
            LightShowType::High
        );
    }

    #[test]
    fn classification_is_idempotent_across_calls() {
        let g = genres(&["techno", "house"]);
        let a = classify_track(&g, 128.0, 0.8, -5.0, 0.7);
        let b = classify_track(&g, 128.0, 0.8, -5.0, 0.7);
        assert_eq!(a, b);
    }

    #[test]
    fn equivalent_genre_permutations_classify_the_same() {
        let a = classify_track(&genres(&["techno", "house"]), 128.0, 0.8, -5.0, 0.7);
        let b = classify_track(&genres(&["house", "techno"]), 128.0, 0.8, -5.0, 0.7);
        assert_eq!(a, b);
    }
}
