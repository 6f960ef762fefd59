// src/reassemble.rs

use serde::{Deserialize, Serialize};

/// How decoded response text becomes visible. Every policy delivers the
/// exact response text by stream end; they differ only in when and at
/// what granularity partial text is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealPolicy {
    /// One publish per character, paced by the presentation layer.
    Typewriter,
    /// Publishes complete words only; the trailing fragment waits for its
    /// closing space or for the end of the stream.
    WordBuffered,
    /// Publishes every decoded chunk the moment it arrives.
    Immediate,
}

/// Turns the raw byte chunks of a response stream into text deltas for the
/// trailing bot message. Chunk boundaries are arbitrary: a multi-byte
/// UTF-8 sequence split across chunks is carried until its remaining bytes
/// arrive, and genuinely invalid bytes decode to U+FFFD.
#[derive(Debug)]
pub struct Reassembler {
    policy: RevealPolicy,
    /// Undecoded tail of an incomplete UTF-8 sequence (at most 3 bytes).
    carry: Vec<u8>,
    /// Decoded but unpublished text, used by the word-buffered policy.
    held: String,
}

impl Reassembler {
    pub fn new(policy: RevealPolicy) -> Self {
        Self {
            policy,
            carry: Vec::new(),
            held: String::new(),
        }
    }

    /// Feeds one chunk and returns the deltas to publish, in order. Under
    /// [`RevealPolicy::Typewriter`] every delta is exactly one character.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let decoded = self.decode(chunk);
        if decoded.is_empty() {
            return Vec::new();
        }
        match self.policy {
            RevealPolicy::Immediate => vec![decoded],
            RevealPolicy::Typewriter => decoded.chars().map(|c| c.to_string()).collect(),
            RevealPolicy::WordBuffered => {
                self.held.push_str(&decoded);
                match self.held.rfind(' ') {
                    Some(cut) if cut > 0 => {
                        let tail = self.held.split_off(cut);
                        let delta = std::mem::replace(&mut self.held, tail);
                        vec![delta]
                    }
                    _ => Vec::new(),
                }
            }
        }
    }

    /// Ends the stream: flushes withheld text and converts a dangling
    /// incomplete sequence to U+FFFD. Returns the final delta, if any.
    pub fn finish(&mut self) -> Option<String> {
        let mut tail = std::mem::take(&mut self.held);
        if !self.carry.is_empty() {
            self.carry.clear();
            tail.push('\u{FFFD}');
        }
        if tail.is_empty() {
            None
        } else {
            Some(tail)
        }
    }

    /// Incremental UTF-8 decoding with carry, the streaming text-decoder
    /// contract: invalid sequences become U+FFFD, an incomplete trailing
    /// sequence is held back for the next chunk.
    fn decode(&mut self, chunk: &[u8]) -> String {
        let owned: Vec<u8>;
        let mut rest: &[u8] = if self.carry.is_empty() {
            chunk
        } else {
            self.carry.extend_from_slice(chunk);
            owned = std::mem::take(&mut self.carry);
            &owned
        };

        let mut out = String::new();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            rest = &after[bad..];
                        }
                        None => {
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "The limit is 65 mph.";

    /// Feeds the chunks, finishes, and returns (deltas, reconstructed text).
    fn run(policy: RevealPolicy, chunks: &[&[u8]]) -> (Vec<String>, String) {
        let mut reassembler = Reassembler::new(policy);
        let mut deltas = Vec::new();
        for chunk in chunks {
            deltas.extend(reassembler.push(chunk));
        }
        deltas.extend(reassembler.finish());
        let text = deltas.concat();
        (deltas, text)
    }

    #[test]
    fn immediate_passes_chunks_straight_through() {
        let (deltas, text) = run(
            RevealPolicy::Immediate,
            &[b"The ", b"limit is 65", b" mph."],
        );
        assert_eq!(deltas, vec!["The ", "limit is 65", " mph."]);
        assert_eq!(text, ANSWER);
    }

    #[test]
    fn typewriter_emits_one_character_per_delta() {
        let (deltas, text) = run(RevealPolicy::Typewriter, &[b"ab ", "c\u{e9}".as_bytes()]);
        for delta in &deltas {
            assert_eq!(delta.chars().count(), 1, "delta {:?}", delta);
        }
        assert_eq!(text, "ab c\u{e9}");
    }

    #[test]
    fn word_buffered_withholds_the_trailing_fragment() {
        let mut reassembler = Reassembler::new(RevealPolicy::WordBuffered);
        let mut published = String::new();

        for chunk in [b"The ".as_ref(), b"limit is 65", b" mph."] {
            for delta in reassembler.push(chunk) {
                published.push_str(&delta);
                // Every intermediate value stops right before a space:
                // complete words only, never a partial one.
                assert!(ANSWER.starts_with(&published));
                assert_eq!(ANSWER.as_bytes()[published.len()], b' ');
            }
        }
        assert_eq!(published, "The limit is 65");

        let flush = reassembler.finish().expect("fragment flushed at end");
        published.push_str(&flush);
        assert_eq!(published, ANSWER);
    }

    #[test]
    fn word_buffered_never_reveals_a_partial_word_byte_at_a_time() {
        let mut reassembler = Reassembler::new(RevealPolicy::WordBuffered);
        let mut published = String::new();
        for byte in ANSWER.as_bytes() {
            for delta in reassembler.push(&[*byte]) {
                published.push_str(&delta);
                assert!(ANSWER.starts_with(&published));
                assert_eq!(ANSWER.as_bytes()[published.len()], b' ');
            }
        }
        published.extend(reassembler.finish());
        assert_eq!(published, ANSWER);
    }

    #[test]
    fn word_buffered_flushes_a_spaceless_stream_at_end() {
        let (deltas, text) = run(RevealPolicy::WordBuffered, &[b"monolith"]);
        assert_eq!(deltas, vec!["monolith"]);
        assert_eq!(text, "monolith");
    }

    #[test]
    fn exact_text_for_every_two_chunk_split() {
        // 2-, 3- and 4-byte sequences, so some split points land inside a
        // character.
        let answer = "\u{160}koda na\u{ef}ve \u{20ac}5 \u{1f499} fin.";
        let bytes = answer.as_bytes();
        for policy in [
            RevealPolicy::Typewriter,
            RevealPolicy::WordBuffered,
            RevealPolicy::Immediate,
        ] {
            for split in 0..=bytes.len() {
                let (_, text) = run(policy, &[&bytes[..split], &bytes[split..]]);
                assert_eq!(text, answer, "{:?} split at {}", policy, split);
            }
        }
    }

    #[test]
    fn exact_text_byte_at_a_time() {
        let answer = "caf\u{e9} \u{1f499} ok";
        for policy in [
            RevealPolicy::Typewriter,
            RevealPolicy::WordBuffered,
            RevealPolicy::Immediate,
        ] {
            let singles: Vec<&[u8]> = answer.as_bytes().chunks(1).collect();
            let (_, text) = run(policy, &singles);
            assert_eq!(text, answer, "{:?}", policy);
        }
    }

    #[test]
    fn invalid_bytes_decode_to_replacement_chars() {
        let (_, text) = run(RevealPolicy::Immediate, &[&[0xFF, b'o', b'k']]);
        assert_eq!(text, "\u{FFFD}ok");
    }

    #[test]
    fn truncated_sequence_at_stream_end_becomes_replacement() {
        // First two bytes of a four-byte emoji, never completed.
        let (deltas, text) = run(RevealPolicy::Immediate, &[b"ok ", &[0xF0, 0x9F]]);
        assert_eq!(deltas, vec!["ok ", "\u{FFFD}"]);
        assert_eq!(text, "ok \u{FFFD}");
    }

    #[test]
    fn empty_stream_publishes_nothing() {
        let (deltas, text) = run(RevealPolicy::WordBuffered, &[]);
        assert!(deltas.is_empty());
        assert_eq!(text, "");
    }

    #[test]
    fn policy_names_parse_from_config_strings() {
        for (name, policy) in [
            ("\"typewriter\"", RevealPolicy::Typewriter),
            ("\"word-buffered\"", RevealPolicy::WordBuffered),
            ("\"immediate\"", RevealPolicy::Immediate),
        ] {
            let parsed: RevealPolicy = serde_json::from_str(name).expect("known policy name");
            assert_eq!(parsed, policy);
        }
    }
}
