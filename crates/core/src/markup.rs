//! Inline icon markup embedded in question and answer text.
//!
//! Prompts may carry bracket tokens of the form `[[identifier]]` that render
//! as inline icon references (traffic signs, signals). Tokens are
//! non-overlapping and the identifier is alphanumeric; anything that does
//! not match (unterminated brackets, empty or non-alphanumeric identifiers)
//! passes through verbatim as text. `reassemble` restores the exact original
//! bytes, so tokenization is lossless and tokens survive any reordering of
//! the surrounding questions untouched.

/// One piece of tokenized prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Icon(&'a str),
}

fn is_icon_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Split `input` into text and icon segments.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Segment<'_>> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' && input[i..].starts_with("[[") {
            if let Some(close) = input[i + 2..].find("]]") {
                let identifier = &input[i + 2..i + 2 + close];
                if is_icon_identifier(identifier) {
                    if text_start < i {
                        segments.push(Segment::Text(&input[text_start..i]));
                    }
                    segments.push(Segment::Icon(identifier));
                    i += close + 4;
                    text_start = i;
                    continue;
                }
            }
        }
        // Only ASCII delimiters are matched, so byte-wise stepping never
        // lands a slice boundary inside a multi-byte character.
        i += 1;
    }

    if text_start < input.len() {
        segments.push(Segment::Text(&input[text_start..]));
    }
    segments
}

/// Rebuild the original string from its segments, byte-for-byte.
#[must_use]
pub fn reassemble(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Icon(identifier) => {
                out.push_str("[[");
                out.push_str(identifier);
                out.push_str("]]");
            }
        }
    }
    out
}
