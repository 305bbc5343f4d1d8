//! Codepoint-level text helpers
//!
//! Every editable or wrapped string in the console is handled as a slice of
//! `char`s so that cursor positions, columns and selection math all count
//! codepoints, one cell each.

/// Substituted for bytes that are not valid UTF-8
pub const INVALID_PLACEHOLDER: &str = "?u8?";

/// Decode bytes, replacing every invalid sequence with the placeholder
pub fn decode_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                out.push_str(INVALID_PLACEHOLDER);
                match e.error_len() {
                    Some(len) => rest = &after[len..],
                    None => return out,
                }
            }
        }
    }
}

pub fn to_chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

pub fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Insert `text` at `pos` (clamped) and return the position after it
pub fn insert_at(buf: &mut Vec<char>, pos: usize, text: &str) -> usize {
    let pos = pos.min(buf.len());
    let inserted: Vec<char> = text.chars().collect();
    let count = inserted.len();
    buf.splice(pos..pos, inserted);
    pos + count
}

/// Remove the codepoint before `pos`; returns the new position
pub fn backspace(buf: &mut Vec<char>, pos: usize) -> usize {
    let pos = pos.min(buf.len());
    if pos == 0 {
        return 0;
    }
    buf.remove(pos - 1);
    pos - 1
}

/// Start of the word to the left of `pos`.
///
/// Whitespace immediately left of the cursor is skipped first. If there was
/// none, the word the cursor sits in is skipped and then the whitespace
/// before it.
pub fn word_left(buf: &[char], pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    let start = i;
    while i > 0 && is_whitespace(buf[i - 1]) {
        i -= 1;
    }
    if i == start {
        while i > 0 && !is_whitespace(buf[i - 1]) {
            i -= 1;
        }
        while i > 0 && is_whitespace(buf[i - 1]) {
            i -= 1;
        }
    }
    i
}

/// Mirror of `word_left`
pub fn word_right(buf: &[char], pos: usize) -> usize {
    let len = buf.len();
    let mut i = pos.min(len);
    let start = i;
    while i < len && is_whitespace(buf[i]) {
        i += 1;
    }
    if i == start {
        while i < len && !is_whitespace(buf[i]) {
            i += 1;
        }
        while i < len && is_whitespace(buf[i]) {
            i += 1;
        }
    }
    i
}

/// The `[start, end)` run around `pos` sharing its whitespace class.
///
/// Used for double-click selection. Returns `None` when `pos` is past the end.
pub fn find_run(buf: &[char], pos: usize) -> Option<(usize, usize)> {
    let class = is_whitespace(*buf.get(pos)?);
    let mut start = pos;
    while start > 0 && is_whitespace(buf[start - 1]) == class {
        start -= 1;
    }
    let mut end = pos + 1;
    while end < buf.len() && is_whitespace(buf[end]) == class {
        end += 1;
    }
    Some((start, end))
}

/// Collect the codepoints in `[start, end)`, clamped to the slice
pub fn slice_string(buf: &[char], start: usize, end: usize) -> String {
    let end = end.min(buf.len());
    let start = start.min(end);
    buf[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_placeholder() {
        assert_eq!(decode_utf8(b"abc"), "abc");
        assert_eq!(decode_utf8(b"a\xffb"), "a?u8?b");
        assert_eq!(decode_utf8(b"\xc3"), "?u8?");
        assert_eq!(decode_utf8("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut buf = to_chars("ac");
        let pos = insert_at(&mut buf, 1, "b");
        assert_eq!(pos, 2);
        assert_eq!(slice_string(&buf, 0, 10), "abc");

        let pos = insert_at(&mut buf, 99, "d");
        assert_eq!(pos, 4);

        let pos = backspace(&mut buf, pos);
        assert_eq!(pos, 3);
        assert_eq!(slice_string(&buf, 0, 10), "abc");
        assert_eq!(backspace(&mut buf, 0), 0);
    }

    #[test]
    fn test_word_left() {
        let buf = to_chars("foo bar  baz");
        assert_eq!(word_left(&buf, 12), 7);
        // From inside whitespace, only the whitespace is skipped
        assert_eq!(word_left(&buf, 9), 7);
        assert_eq!(word_left(&buf, 3), 0);
        assert_eq!(word_left(&buf, 0), 0);
    }

    #[test]
    fn test_word_right() {
        let buf = to_chars("foo bar  baz");
        assert_eq!(word_right(&buf, 0), 4);
        assert_eq!(word_right(&buf, 7), 9);
        assert_eq!(word_right(&buf, 9), 12);
        assert_eq!(word_right(&buf, 12), 12);
    }

    #[test]
    fn test_find_run() {
        let buf = to_chars("ab  cd");
        assert_eq!(find_run(&buf, 0), Some((0, 2)));
        assert_eq!(find_run(&buf, 1), Some((0, 2)));
        assert_eq!(find_run(&buf, 2), Some((2, 4)));
        assert_eq!(find_run(&buf, 5), Some((4, 6)));
        assert_eq!(find_run(&buf, 6), None);
    }

    proptest! {
        #[test]
        fn test_word_jumps_stay_in_bounds(s in "[a-c \t]{0,24}", pos in 0usize..40) {
            let buf = to_chars(&s);
            let left = word_left(&buf, pos);
            let right = word_right(&buf, pos);
            prop_assert!(left <= buf.len());
            prop_assert!(right <= buf.len());
            prop_assert!(left <= pos.min(buf.len()));
            prop_assert!(right >= pos.min(buf.len()));
        }
    }
}
