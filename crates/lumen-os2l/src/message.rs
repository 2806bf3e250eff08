//! OS2L JSON message formatters and parser (§4.7, §6).
//!
//! Outbound messages are produced as byte-exact JSON objects, concatenated
//! with no delimiter (the logon burst) or sent one at a time (everything
//! else). Inbound messages are parsed as a newline-delimited sequence of
//! JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const DECK_COUNT: u32 = 4;
const DEFAULT_BPM: i64 = 120;
const DEFAULT_LOOP_BEATS: i64 = 4;

/// A `subscribe` request from the lighting host (§6): the only inbound
/// message shape this sender understands.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub evt: String,
    pub frequency: u64,
}

/// Parse one JSON line from the host, returning the subscribe request if
/// that's what it was. Any other `evt` (or malformed JSON) yields `None`
/// and is otherwise ignored - transient per §7.
pub fn parse_inbound_line(line: &str) -> Option<SubscribeRequest> {
    let value: Value = serde_json::from_str(line.trim()).ok()?;
    if value.get("evt").and_then(Value::as_str) != Some("subscribe") {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[derive(Serialize)]
struct Subscribed<'a> {
    evt: &'static str,
    trigger: &'a str,
    value: Value,
}

fn subscribed(trigger: &str, value: impl Into<Value>) -> String {
    serde_json::to_string(&Subscribed { evt: "subscribed", trigger, value: value.into() })
        .expect("Subscribed serializes infallibly")
}

#[derive(Serialize)]
struct Beat {
    evt: &'static str,
    change: bool,
    pos: i64,
    bpm: i64,
    strength: f64,
}

/// `{"evt":"beat","change":<bool>,"pos":<int>,"bpm":<int>,"strength":<1dp float>}`.
pub fn beat_message(change: bool, pos: i64, bpm: i64, strength: f64) -> String {
    let strength = (strength * 10.0).round() / 10.0;
    serde_json::to_string(&Beat { evt: "beat", change, pos, bpm, strength })
        .expect("Beat serializes infallibly")
}

/// The virtual-deck logon burst sent right after a `subscribe` is received:
/// one run of `subscribed` triggers per deck, concatenated with no
/// delimiter (§6).
pub fn logon_message() -> String {
    let mut out = String::new();
    for deck in 1..=DECK_COUNT {
        out.push_str(&subscribed(&format!("deck {deck} get_text"), ""));
        out.push_str(&subscribed(&format!("deck {deck} level"), 0.0));
        out.push_str(&subscribed(&format!("deck {deck} get_bpm"), DEFAULT_BPM));
        out.push_str(&subscribed(&format!("deck {deck} play"), "off"));
        out.push_str(&subscribed(&format!("deck {deck} loop"), "off"));
        out.push_str(&subscribed(&format!("deck {deck} get_loop"), DEFAULT_LOOP_BEATS));
        out.push_str(&subscribed(
            &format!("deck {deck} loop_roll 1/4 1/2 1 2 4 8 16 32"),
            "off",
        ));
    }
    out
}

/// Populates deck 1's transport state after a track loads (§4.7).
pub fn song_loaded_message(time_elapsed_ms: u64, beat_pos: f64, first_beat_ms: u64, bpm: f64) -> String {
    let mut out = String::new();
    out.push_str(&subscribed("deck 1 get_time elapsed absolute", time_elapsed_ms as i64));
    out.push_str(&subscribed("deck 1 get_beatpos", beat_pos));
    out.push_str(&subscribed("deck 1 get_first_beat absolute", first_beat_ms as i64));
    out.push_str(&subscribed("deck 1 get_bpm", bpm));
    out
}

pub fn play_start_message() -> String {
    subscribed("deck 1 play", "on")
}

pub fn play_stop_message() -> String {
    subscribed("deck 1 play", "off")
}

/// Periodic progress update: beat position and elapsed time (§4.7, §5).
pub fn update_message(beat_pos: f64, time_elapsed_ms: u64) -> String {
    let mut out = String::new();
    out.push_str(&subscribed("deck 1 get_time elapsed absolute", time_elapsed_ms as i64));
    out.push_str(&subscribed("deck 1 get_beatpos", beat_pos));
    out
}

pub fn shutdown_message() -> String {
    serde_json::to_string(&serde_json::json!({ "evt": "shutdown" })).expect("json! literal is always serializable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_message_uses_json_booleans_never_strings() {
        let msg = beat_message(true, 42, 128, 0.83);
        assert!(msg.contains("\"change\":true"));
        assert!(!msg.contains("\"True\""));
        assert!(!msg.contains("\"change\":1"));
    }

    #[test]
    fn beat_message_strength_is_rounded_to_one_decimal() {
        let msg = beat_message(false, 1, 120, 0.8333);
        let value: Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(value["strength"].as_f64().unwrap(), 0.8);
    }

    #[test]
    fn beat_message_round_trips_through_json() {
        let msg = beat_message(true, 7, 121, 0.5);
        let value: Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(value["evt"], "beat");
        assert_eq!(value["change"], true);
        assert_eq!(value["pos"], 7);
        assert_eq!(value["bpm"], 121);
        assert_eq!(value["strength"], 0.5);
    }

    #[test]
    fn parse_inbound_line_extracts_subscribe_frequency() {
        let req = parse_inbound_line(r#"{"evt":"subscribe","frequency":25}"#).unwrap();
        assert_eq!(req.frequency, 25);
    }

    #[test]
    fn parse_inbound_line_ignores_other_events() {
        assert!(parse_inbound_line(r#"{"evt":"ping"}"#).is_none());
        assert!(parse_inbound_line("not json").is_none());
    }

    #[test]
    fn logon_burst_has_no_newlines_and_covers_four_decks() {
        let burst = logon_message();
        assert!(!burst.contains('\n'));
        for deck in 1..=DECK_COUNT {
            assert!(burst.contains(&format!("deck {deck} get_bpm")));
        }
    }
}
