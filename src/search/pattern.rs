//! Compiled search patterns and match partitioning for highlights.

use crate::error::{FlowlessError, Result};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};

/// Search toggles, flipped in the search prompt with Tab (case) and Ctrl-R (regex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub ignore_case: bool,
    /// When false the pattern is matched literally.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            regex: true,
        }
    }
}

impl SearchOptions {
    /// Prompt label, e.g. `Search[regexp/ignore]:`.
    pub fn prompt_label(&self) -> String {
        let mode = if self.regex { "regexp" } else { "string" };
        let ignore = if self.ignore_case { "/ignore" } else { "" };
        format!("Search[{mode}{ignore}]:")
    }
}

/// A piece of a line, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Unmatched(&'a str),
    Matched(&'a str),
}

impl<'a> Span<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Span::Unmatched(text) | Span::Matched(text) => text,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Span::Matched(_))
    }
}

#[derive(Debug, Clone)]
pub struct SearchPattern {
    text: String,
    options: SearchOptions,
    matcher: RegexMatcher,
}

impl PartialEq for SearchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.options == other.options
    }
}

impl SearchPattern {
    pub fn compile(text: &str, options: SearchOptions) -> Result<Self> {
        let source = if options.regex {
            text.to_string()
        } else {
            regex::escape(text)
        };
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(options.ignore_case)
            .build(&source)
            .map_err(|e| FlowlessError::invalid_pattern(text, e.to_string()))?;
        Ok(Self {
            text: text.to_string(),
            options,
            matcher,
        })
    }

    /// The text the user typed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.matcher.is_match(line.as_bytes()).unwrap_or(false)
    }

    /// Split `line` into alternating unmatched/matched spans.
    ///
    /// Concatenating the spans always reproduces `line`. Empty matches are skipped, and
    /// no empty unmatched span is emitted except for a line without any match.
    pub fn partition<'a>(&self, line: &'a str) -> Vec<Span<'a>> {
        let bytes = line.as_bytes();
        let mut spans = Vec::new();
        let mut emitted = 0;
        let mut at = 0;

        while at <= line.len() {
            let found = match self.matcher.find_at(bytes, at) {
                Ok(Some(found)) => found,
                _ => break,
            };
            let (start, end) = (found.start(), found.end());
            if !line.is_char_boundary(start) || !line.is_char_boundary(end) {
                break;
            }
            if start == end {
                match line[end..].chars().next() {
                    Some(ch) => at = end + ch.len_utf8(),
                    None => break,
                }
                continue;
            }
            if start > emitted {
                spans.push(Span::Unmatched(&line[emitted..start]));
            }
            spans.push(Span::Matched(&line[start..end]));
            emitted = end;
            at = end;
        }

        if emitted < line.len() || spans.is_empty() {
            spans.push(Span::Unmatched(&line[emitted..]));
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn regex(text: &str) -> SearchPattern {
        SearchPattern::compile(text, SearchOptions::default()).unwrap()
    }

    #[test]
    fn partition_alternates_spans() {
        let pattern = regex("o");
        assert_eq!(
            pattern.partition("foo bar"),
            vec![
                Span::Unmatched("f"),
                Span::Matched("o"),
                Span::Matched("o"),
                Span::Unmatched(" bar"),
            ]
        );
    }

    #[test]
    fn partition_without_match_returns_whole_line() {
        let pattern = regex("zzz");
        assert_eq!(pattern.partition("abc"), vec![Span::Unmatched("abc")]);
        assert_eq!(pattern.partition(""), vec![Span::Unmatched("")]);
    }

    #[test]
    fn partition_omits_empty_edges() {
        let pattern = regex("ab");
        assert_eq!(pattern.partition("ab"), vec![Span::Matched("ab")]);
        assert_eq!(
            pattern.partition("abxab"),
            vec![Span::Matched("ab"), Span::Unmatched("x"), Span::Matched("ab")]
        );
    }

    #[test]
    fn empty_matches_are_skipped() {
        let pattern = regex("x*");
        assert_eq!(
            pattern.partition("abxxc"),
            vec![Span::Unmatched("ab"), Span::Matched("xx"), Span::Unmatched("c")]
        );
    }

    #[test]
    fn literal_mode_escapes_metacharacters() {
        let literal = SearchPattern::compile(
            "a.b(",
            SearchOptions {
                regex: false,
                ..SearchOptions::default()
            },
        )
        .unwrap();
        assert!(literal.is_match("xx a.b( yy"));
        assert!(!literal.is_match("axb("));
    }

    #[test]
    fn case_insensitive_toggle() {
        let options = SearchOptions {
            ignore_case: true,
            ..SearchOptions::default()
        };
        let pattern = SearchPattern::compile("error", options).unwrap();
        assert!(pattern.is_match("An ERROR occurred"));
        assert!(!regex("error").is_match("An ERROR occurred"));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = SearchPattern::compile("(unclosed", SearchOptions::default()).unwrap_err();
        assert!(matches!(err, FlowlessError::InvalidPattern { .. }));
    }

    #[test]
    fn equality_ignores_compiled_state() {
        assert_eq!(regex("abc"), regex("abc"));
        let literal = SearchPattern::compile(
            "abc",
            SearchOptions {
                regex: false,
                ..SearchOptions::default()
            },
        )
        .unwrap();
        assert_ne!(regex("abc"), literal);
    }

    #[test]
    fn prompt_label_reflects_toggles() {
        assert_eq!(SearchOptions::default().prompt_label(), "Search[regexp]:");
        let options = SearchOptions {
            ignore_case: true,
            regex: false,
        };
        assert_eq!(options.prompt_label(), "Search[string/ignore]:");
    }

    proptest! {
        #[test]
        fn partition_round_trips(line in "\\PC{0,40}", needle in "[a-c]{1,2}|[a-c]\\*|\\.") {
            let pattern = regex(&needle);
            let spans = pattern.partition(&line);
            let joined: String = spans.iter().map(|span| span.text()).collect();
            prop_assert_eq!(joined, line.clone());
            for pair in spans.windows(2) {
                prop_assert!(!(matches!(pair[0], Span::Unmatched(_)) && matches!(pair[1], Span::Unmatched(_))));
            }
        }

        #[test]
        fn literal_patterns_never_fail_to_compile(text in "\\PC{1,20}") {
            let options = SearchOptions { regex: false, ..SearchOptions::default() };
            let pattern = SearchPattern::compile(&text, options).unwrap();
            let haystack = format!("<{text}>");
            prop_assert!(pattern.is_match(&haystack));
        }
    }
}
