//! Segment-anchored path patterns.
//!
//! # Syntax
//! - `/foo/bar` literal segments
//! - `*` exactly one non-empty segment
//! - `*.txt`, `file?.log` wildcards inside a single segment
//! - `**` zero or more whole segments
//!
//! # Design Decisions
//! - Patterns compile once, at table build time
//! - No regex: segment comparison plus a small glob matcher
//! - A trailing slash is its own (empty) segment, so `/foo/` and `/foo` differ
//!   unless `optional_trailing_separator` is enabled

use crate::config::PathMatchingConfig;
use crate::routing::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Glob(Vec<char>),
    AnySegment,
    MultiSegment,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    options: PathMatchingConfig,
}

impl PathPattern {
    /// Compile a pattern. Patterns must start with `/`.
    pub fn parse(raw: &str, options: PathMatchingConfig) -> Result<Self, BuildError> {
        let invalid = |reason| BuildError::InvalidPattern {
            pattern: raw.to_string(),
            reason,
        };

        if !raw.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let segments = split_segments(raw)
            .into_iter()
            .map(|seg| match seg {
                "**" => Ok(Segment::MultiSegment),
                "*" => Ok(Segment::AnySegment),
                _ if seg.contains("**") => Err(invalid("'**' must be a whole segment")),
                _ if seg.contains(['*', '?']) => Ok(Segment::Glob(normalize(seg, options).chars().collect())),
                _ => Ok(Segment::Literal(normalize(seg, options))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
            options,
        })
    }

    /// Whether the pattern contains any wildcard.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|seg| matches!(seg, Segment::Literal(_)))
    }

    /// Match the whole path.
    pub fn matches(&self, path: &str) -> bool {
        let segs = split_segments(path);
        if self.match_from(&self.segments, &segs, 0, false).is_some() {
            return true;
        }

        let pattern_has_trailing = matches!(self.segments.last(), Some(Segment::Literal(s)) if s.is_empty());
        self.options.optional_trailing_separator
            && !pattern_has_trailing
            && segs.len() > 1
            && segs.last() == Some(&"")
            && self
                .match_from(&self.segments, &segs[..segs.len() - 1], 0, false)
                .is_some()
    }

    /// Match the start of the path on a segment boundary and return the rest.
    ///
    /// `/api` against `/api/foo/` yields `/foo/`; against `/api` it yields `""`.
    pub fn match_start<'p>(&self, path: &'p str) -> Option<&'p str> {
        let pattern = match self.segments.split_last() {
            Some((Segment::Literal(last), init)) if last.is_empty() => init,
            _ => &self.segments[..],
        };
        let segs = split_segments(path);
        let consumed = self.match_from(pattern, &segs, 0, true)?;
        Some(remainder(path, consumed))
    }

    /// The part of a matching path covered by the pattern's wildcards.
    ///
    /// `/docs/**` and `/docs/a/b.txt` yield `a/b.txt`; a literal pattern yields `""`.
    pub fn extract_path_within(&self, path: &str) -> Option<String> {
        if !self.matches(path) {
            return None;
        }
        let first_wild = self
            .segments
            .iter()
            .position(|seg| !matches!(seg, Segment::Literal(_)));
        let Some(start) = first_wild else {
            return Some(String::new());
        };
        let segs = split_segments(path);
        let rest: Vec<&str> = segs
            .iter()
            .skip(start)
            .copied()
            .filter(|s| !s.is_empty())
            .collect();
        Some(rest.join("/"))
    }

    fn match_from(
        &self,
        pattern: &[Segment],
        path: &[&str],
        at: usize,
        prefix: bool,
    ) -> Option<usize> {
        let Some((head, tail)) = pattern.split_first() else {
            return (prefix || at == path.len()).then_some(at);
        };

        match head {
            Segment::MultiSegment => {
                (at..=path.len()).find_map(|end| self.match_from(tail, path, end, prefix))
            }
            seg => {
                let candidate = path.get(at)?;
                if self.segment_matches(seg, candidate) {
                    self.match_from(tail, path, at + 1, prefix)
                } else {
                    None
                }
            }
        }
    }

    fn segment_matches(&self, seg: &Segment, candidate: &str) -> bool {
        let case_sensitive = self.options.case_sensitive;
        match seg {
            Segment::Literal(lit) if case_sensitive => lit == candidate,
            Segment::Literal(lit) => lit.eq_ignore_ascii_case(candidate),
            Segment::AnySegment => !candidate.is_empty(),
            Segment::Glob(glob) => glob_match(glob, candidate, case_sensitive),
            Segment::MultiSegment => true,
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn normalize(seg: &str, options: PathMatchingConfig) -> String {
    if options.case_sensitive {
        seg.to_string()
    } else {
        seg.to_ascii_lowercase()
    }
}

/// `/foo/` → `["foo", ""]`, `/` and `""` → `[""]`.
fn split_segments(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

/// The suffix of `path` after its first `consumed` segments, starting at the separator.
fn remainder(path: &str, consumed: usize) -> &str {
    if consumed == 0 {
        return path;
    }
    let body = path.strip_prefix('/').unwrap_or(path);
    let mut offset = path.len() - body.len();
    for (i, seg) in body.split('/').take(consumed).enumerate() {
        offset += seg.len();
        if i + 1 < consumed {
            offset += 1;
        }
    }
    &path[offset..]
}

/// Glob over a single segment: `*` any run of characters, `?` one character.
fn glob_match(pattern: &[char], text: &str, case_sensitive: bool) -> bool {
    let text: Vec<char> = if case_sensitive {
        text.chars().collect()
    } else {
        text.to_ascii_lowercase().chars().collect()
    };

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some(c) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
