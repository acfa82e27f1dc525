//! Wake word detection over live transcripts.
//!
//! Speech-to-text renders the wake phrases inconsistently, so each phrase
//! matches a set of common misrecognitions ("hey flower", "oranj", ...).
//! Only final transcripts should be fed in; partials flicker too much.

use std::sync::LazyLock;

use regex::Regex;

// Longer variants come first so alternation does not stop at a prefix.
static HEY_FLOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:hey|hay)[,!]?\s+(?:flowed|flower|flows|fluer|fleur|floor|fluid|flow|flew|flo)|he[,!]?\s+(?:flowed|flow)|heyflow|hayflo)\b[,!]?",
    )
    .expect("invalid hey-flow regex")
});

static ORANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:oranges|aurange|arange|urrange|orrige|oringe|orenge|orange|oranj|orang)\b[,!]?",
    )
    .expect("invalid orange regex")
});

/// Which wake phrase was heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeWord {
    HeyFlow,
    Orange,
}

/// A wake phrase found in a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeDetection {
    pub word: WakeWord,
    /// Command spoken after the wake phrase, if any.
    pub payload: Option<String>,
}

/// Scan a final transcript for a wake phrase.
///
/// When both phrases occur, the earlier one wins. The payload is whatever
/// follows the phrase, with leading punctuation stripped.
#[must_use]
pub fn detect(transcript: &str) -> Option<WakeDetection> {
    let hey = HEY_FLOW.find(transcript);
    let orange = ORANGE.find(transcript);

    let (word, end) = match (hey, orange) {
        (Some(h), Some(o)) if o.start() < h.start() => (WakeWord::Orange, o.end()),
        (Some(h), _) => (WakeWord::HeyFlow, h.end()),
        (None, Some(o)) => (WakeWord::Orange, o.end()),
        (None, None) => return None,
    };

    let payload = transcript[end..]
        .trim_start_matches([',', '!', '.', ' ', '\t'])
        .trim_end();
    Some(WakeDetection {
        word,
        payload: if payload.is_empty() {
            None
        } else {
            Some(payload.to_owned())
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_canonical_phrase_with_payload() {
        let detection = detect("Hey Flow, what's the weather in NYC?").unwrap();
        assert_eq!(detection.word, WakeWord::HeyFlow);
        assert_eq!(detection.payload.as_deref(), Some("what's the weather in NYC?"));
    }

    #[test]
    fn detects_misrecognized_variants() {
        for phrase in [
            "hey flo open the calendar",
            "hay fleur open the calendar",
            "hey flower open the calendar",
            "heyflow open the calendar",
            "hey floor open the calendar",
            "he flow open the calendar",
            "he flowed open the calendar",
        ] {
            let detection = detect(phrase).unwrap_or_else(|| panic!("missed: {phrase}"));
            assert_eq!(detection.word, WakeWord::HeyFlow, "{phrase}");
            assert_eq!(detection.payload.as_deref(), Some("open the calendar"));
        }
    }

    #[test]
    fn detects_orange_variants() {
        for phrase in ["orange", "Oranges", "oranj", "aurange", "oringe"] {
            let detection = detect(phrase).unwrap_or_else(|| panic!("missed: {phrase}"));
            assert_eq!(detection.word, WakeWord::Orange);
            assert!(detection.payload.is_none());
        }
    }

    #[test]
    fn bare_wake_word_has_no_payload() {
        let detection = detect("hey flow").unwrap();
        assert_eq!(detection.word, WakeWord::HeyFlow);
        assert!(detection.payload.is_none());

        let detection = detect("hey flow!").unwrap();
        assert!(detection.payload.is_none());
    }

    #[test]
    fn earlier_phrase_wins() {
        let detection = detect("orange hey flow do something").unwrap();
        assert_eq!(detection.word, WakeWord::Orange);
        assert_eq!(detection.payload.as_deref(), Some("hey flow do something"));
    }

    #[test]
    fn plain_speech_is_ignored() {
        assert!(detect("the quick brown fox").is_none());
        assert!(detect("I like oranging things").is_none());
    }

    #[test]
    fn mid_sentence_phrase_is_found() {
        let detection = detect("um so hey flow turn on the lights").unwrap();
        assert_eq!(detection.payload.as_deref(), Some("turn on the lights"));
    }
}
