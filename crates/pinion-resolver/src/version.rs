//! Package version parsing and comparison.
//!
//! Versions are compared segment by segment:
//! - Segments are split on `.`, `-`, `_`, `+` and at digit/letter boundaries
//! - Numeric segments compare as numbers
//! - Known tags have a fixed ordering:
//!   `dev` < `alpha` < `beta` < `rc` < (release) < `post`
//! - Other text sorts below numbers and compares case-insensitively
//! - Missing trailing segments count as `0`, so `1.0 == 1.0.0`

use std::cmp::Ordering;
use std::fmt;

/// Suffix appended to the operand of `=`/`==` to form an exclusive upper bound.
pub const EXACT_UPPER_SENTINEL: &str = ".99999999999999";

/// A parsed package version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    pub original: String,
    segments: Vec<Segment>,
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Tag(TagKind),
    Text(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum TagKind {
    Dev,
    Alpha,
    Beta,
    Rc,
    Release,
    Post,
}

impl Version {
    pub fn parse(version: &str) -> Self {
        Self {
            original: version.to_string(),
            segments: parse_segments(version),
        }
    }

    /// The exclusive upper bound used by `=`/`==`: this version with
    /// [`EXACT_UPPER_SENTINEL`] appended.
    pub fn exact_upper_bound(&self) -> Self {
        Self::parse(&format!("{}{EXACT_UPPER_SENTINEL}", self.original))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        for i in 0..max_len {
            let ord = compare_segments(self.segments.get(i), other.segments.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => compare_segment_to_empty(s),
        (None, Some(s)) => compare_segment_to_empty(s).reverse(),
        (Some(a), Some(b)) => compare_two_segments(a, b),
    }
}

fn compare_segment_to_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        Segment::Tag(t) => t.cmp(&TagKind::Release),
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_two_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
        (Segment::Tag(a), Segment::Tag(b)) => a.cmp(b),
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Segment::Numeric(_), _) => Ordering::Greater,
        (_, Segment::Numeric(_)) => Ordering::Less,
        (Segment::Tag(t), Segment::Text(_)) => {
            if *t >= TagKind::Release {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Segment::Text(_), Segment::Tag(t)) => {
            if *t >= TagKind::Release {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in version.chars() {
        if matches!(ch, '.' | '-' | '_' | '+') {
            if !current.is_empty() {
                segments.push(classify(&current));
                current.clear();
            }
            continue;
        }
        // 1.0rc1 -> 1, 0, rc, 1
        let boundary = current
            .chars()
            .last()
            .is_some_and(|last| last.is_ascii_digit() != ch.is_ascii_digit());
        if boundary {
            segments.push(classify(&current));
            current.clear();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(classify(&current));
    }

    segments
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "dev" => Segment::Tag(TagKind::Dev),
        "alpha" | "a" => Segment::Tag(TagKind::Alpha),
        "beta" | "b" => Segment::Tag(TagKind::Beta),
        "rc" | "c" => Segment::Tag(TagKind::Rc),
        "final" | "release" => Segment::Tag(TagKind::Release),
        "post" => Segment::Tag(TagKind::Post),
        _ => Segment::Text(token.to_string()),
    }
}
