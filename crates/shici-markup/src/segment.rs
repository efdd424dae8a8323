//! Punctuation-driven definition segmentation.

/// Ideographic full stop terminating a definition.
pub const FULL_STOP: char = '。';

/// Two-character boundaries, checked in this order. The split falls after
/// the first character, so a quoted title or a `又` continuation opens the
/// next segment.
const BOUNDARY_MARKERS: [&str; 4] = ["。《", "」《", "。又", "」又"];

/// Outcome of [`segment`]. Both halves borrow from the input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentResult<'a> {
    /// `head` is never empty; `residual` is `None` when the head consumed
    /// everything.
    Split {
        head: &'a str,
        residual: Option<&'a str>,
    },
    NoBoundary,
}

/// Find the end of the first definition unit in `text`.
///
/// Marker boundaries win over a string-final full stop, which wins over the
/// first bare full stop.
pub fn segment(text: &str) -> SegmentResult<'_> {
    for marker in BOUNDARY_MARKERS {
        if let Some(idx) = text.find(marker)
            && let Some(first) = marker.chars().next()
        {
            return split_at(text, idx + first.len_utf8());
        }
    }

    if text.ends_with(FULL_STOP) {
        return SegmentResult::Split {
            head: text,
            residual: None,
        };
    }

    match text.find(FULL_STOP) {
        Some(idx) => split_at(text, idx + FULL_STOP.len_utf8()),
        None => SegmentResult::NoBoundary,
    }
}

fn split_at(text: &str, end: usize) -> SegmentResult<'_> {
    let (head, rest) = text.split_at(end);
    SegmentResult::Split {
        head,
        residual: (!rest.is_empty()).then_some(rest),
    }
}
