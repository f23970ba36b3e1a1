//! Raw chunk classification.
//!
//! Every chunk read from stdin is classified before any keystroke decoding.
//! Some terminal/multiplexer combinations echo mouse reports as literal
//! text or split them across reads, so a chunk is checked for, in order:
//!
//! 1. complete SGR mouse sequences → converted to [`MouseEvent`]s
//! 2. legacy X10 mouse reports → discarded
//! 3. an SGR sequence cut off by the end of the chunk → discarded
//! 4. stray coordinate runs (`65;87;26M`, `<0;10`) → discarded
//!
//! Any hit short-circuits the chunk: nothing else in it reaches the key
//! decoder. Legitimate typing that happens to look like coordinates is
//! dropped too, which is the price of never leaking garbage into the UI.

use super::mouse::{MouseEvent, SgrMatch, legacy_mouse, lex_sgr, stray_coordinates};

/// Why a chunk was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noise {
    /// X10 `ESC [ M b x y` report.
    LegacyMouse,
    /// SGR report cut off mid-sequence.
    Fragment,
    /// Coordinate-shaped run without its escape prefix.
    StrayCoordinates,
}

/// Classification of one raw input chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// One or more complete SGR reports, in order.
    Mouse(Vec<MouseEvent>),
    /// Mouse-shaped noise; drop the whole chunk.
    Discarded(Noise),
    /// Nothing mouse-like; hand the chunk to the key decoder.
    Keys,
}

/// Classify a raw chunk.
pub fn classify(chunk: &[u8]) -> Classified {
    let mut events = Vec::new();
    let mut noise = None;
    let mut i = 0;

    while i < chunk.len() {
        let rest = &chunk[i..];

        if rest[0] == 0x1B {
            match lex_sgr(rest) {
                SgrMatch::Complete { event, len } => {
                    events.push(event);
                    i += len;
                    continue;
                }
                SgrMatch::Partial => {
                    noise.get_or_insert(Noise::Fragment);
                    break;
                }
                SgrMatch::NoMatch => {}
            }
            if let Some(len) = legacy_mouse(rest) {
                noise.get_or_insert(Noise::LegacyMouse);
                i += len;
                continue;
            }
            i += 1;
            continue;
        }

        if let Some(len) = stray_coordinates(rest) {
            noise.get_or_insert(Noise::StrayCoordinates);
            i += len;
            continue;
        }

        i += 1;
    }

    if !events.is_empty() {
        Classified::Mouse(events)
    } else if let Some(noise) = noise {
        Classified::Discarded(noise)
    } else {
        Classified::Keys
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mouse::MouseKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_keys() {
        assert_eq!(classify(b"hello"), Classified::Keys);
        assert_eq!(classify(b"\x1b[A"), Classified::Keys);
        assert_eq!(classify(b"\x1b[1;5C"), Classified::Keys);
        assert_eq!(classify(b"\x1b"), Classified::Keys);
        assert_eq!(classify(b"\t"), Classified::Keys);
        assert_eq!(classify(b"12:30"), Classified::Keys);
    }

    #[test]
    fn test_complete_sgr() {
        match classify(b"\x1b[<0;10;5M") {
            Classified::Mouse(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].kind, MouseKind::Press);
                assert_eq!((events[0].x, events[0].y), (9, 4));
            }
            other => panic!("expected mouse, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_sgr_in_one_chunk() {
        match classify(b"\x1b[<0;1;1M\x1b[<0;1;1m") {
            Classified::Mouse(events) => {
                assert_eq!(events.len(), 2);
                assert_eq!(events[1].kind, MouseKind::Release);
            }
            other => panic!("expected mouse, got {other:?}"),
        }
    }

    #[test]
    fn test_mouse_wins_over_surrounding_bytes() {
        assert!(matches!(classify(b"q\x1b[<0;3;3Mq"), Classified::Mouse(ref e) if e.len() == 1));
    }

    #[test]
    fn test_legacy_mouse_discarded() {
        assert_eq!(classify(b"\x1b[M !!"), Classified::Discarded(Noise::LegacyMouse));
    }

    #[test]
    fn test_fragment_discarded() {
        assert_eq!(classify(b"\x1b[<0;10"), Classified::Discarded(Noise::Fragment));
        assert_eq!(classify(b"\x1b[<"), Classified::Discarded(Noise::Fragment));
    }

    #[test]
    fn test_stray_coordinates_discarded() {
        assert_eq!(classify(b"65;87;26M"), Classified::Discarded(Noise::StrayCoordinates));
        assert_eq!(classify(b"[<0;10;5M"), Classified::Discarded(Noise::StrayCoordinates));
        assert_eq!(classify(b";5M"), Classified::Discarded(Noise::StrayCoordinates));
        assert_eq!(classify(b"<35;12"), Classified::Discarded(Noise::StrayCoordinates));
        assert_eq!(classify(b"abc12;4;9m"), Classified::Discarded(Noise::StrayCoordinates));
    }
}
