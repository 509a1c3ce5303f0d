//! Component-wise glob matching with recursive `**` support.
//!
//! A pattern is split on `/` into tokens. Every token except `**` is an ordinary glob
//! (`*`, `?`, `[...]`, `{a,b}`) that matches exactly one path component and never crosses a
//! separator. `**` matches zero or more whole components; when it is not the final token every
//! possible split point is tried, so matching is exponential in the number of `**` tokens in
//! the worst case.
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{Error, Result};

pub const RECURSIVE_WILDCARD: &str = "**";

#[derive(Debug, Clone)]
enum ComponentMatcher {
    Literal(String),
    Glob(GlobMatcher),
}

impl ComponentMatcher {
    fn is_match(&self, component: &str) -> bool {
        match self {
            #[cfg(windows)]
            Self::Literal(literal) => literal.eq_ignore_ascii_case(component),
            #[cfg(not(windows))]
            Self::Literal(literal) => literal == component,
            Self::Glob(glob) => glob.is_match(component),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PatternToken {
    /// `**`: zero or more whole path components.
    Recursive,
    /// One component, matched with single-component glob rules.
    Component(ComponentToken),
}

#[derive(Debug, Clone)]
pub struct ComponentToken {
    source: String,
    matcher: ComponentMatcher,
}

impl ComponentToken {
    fn compile(source: &str) -> std::result::Result<Self, globset::Error> {
        let matcher = if contains_glob_meta(source) {
            let mut builder = GlobBuilder::new(source);
            builder.literal_separator(true);
            #[cfg(windows)]
            builder.case_insensitive(true);
            ComponentMatcher::Glob(builder.build()?.compile_matcher())
        } else {
            ComponentMatcher::Literal(source.to_string())
        };
        Ok(Self {
            source: source.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, ComponentMatcher::Literal(_))
    }

    pub fn is_match(&self, component: &str) -> bool {
        self.matcher.is_match(component)
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let normalized = crate::path_utils::normalize_glob_pattern(pattern);
        let components = split_pattern(&normalized);
        if components.iter().any(|component| *component == "..") {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: "patterns must not contain '..' segments".to_string(),
            });
        }
        let tokens = compile_tokens(&components).map_err(|err| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether the pattern contains `**` and therefore needs a full-tree walk.
    pub fn requires_tree_walk(&self) -> bool {
        self.tokens
            .iter()
            .any(|token| matches!(token, PatternToken::Recursive))
    }

    /// Matches a relative path. Root and prefix components are ignored.
    pub fn matches(&self, path: &Path) -> bool {
        let components = crate::path_utils::path_components_lossy(path);
        self.matches_components(&components)
    }

    pub fn matches_components<S: AsRef<str>>(&self, path: &[S]) -> bool {
        match_tokens(path, &self.tokens)
    }
}

/// Matches a sequence of path components against a sequence of pattern components.
///
/// A pattern component that is not a valid glob never matches.
pub fn match_components<P, S>(path: &[P], pattern: &[S]) -> bool
where
    P: AsRef<str>,
    S: AsRef<str>,
{
    match compile_tokens(pattern) {
        Ok(tokens) => match_tokens(path, &tokens),
        Err(_) => false,
    }
}

/// Matches a `/`-separated candidate path against a `/`-separated pattern.
///
/// An invalid pattern never matches; use [`Pattern::new`] to surface the error.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let Ok(pattern) = Pattern::new(pattern) else {
        return false;
    };
    let normalized = crate::path_utils::normalize_glob_pattern(path);
    pattern.matches_components(&split_pattern(&normalized))
}

/// Whether a single component contains glob metacharacters.
pub fn contains_glob_meta(component: &str) -> bool {
    component
        .chars()
        .any(|ch| matches!(ch, '*' | '?' | '[' | ']' | '{' | '}'))
}

fn split_pattern(pattern: &str) -> Vec<&str> {
    pattern
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

fn compile_tokens<S: AsRef<str>>(
    components: &[S],
) -> std::result::Result<Vec<PatternToken>, globset::Error> {
    components
        .iter()
        .map(|component| {
            let component = component.as_ref();
            if component == RECURSIVE_WILDCARD {
                Ok(PatternToken::Recursive)
            } else {
                ComponentToken::compile(component).map(PatternToken::Component)
            }
        })
        .collect()
}

fn match_tokens<S: AsRef<str>>(path: &[S], pattern: &[PatternToken]) -> bool {
    let mut pi = 0;
    let mut ti = 0;

    while pi < path.len() && ti < pattern.len() {
        match &pattern[ti] {
            PatternToken::Recursive => {
                if ti == pattern.len() - 1 {
                    return true;
                }
                let rest = &pattern[ti + 1..];
                return (pi..=path.len()).any(|start| match_tokens(&path[start..], rest));
            }
            PatternToken::Component(token) => {
                if !token.is_match(path[pi].as_ref()) {
                    return false;
                }
                pi += 1;
                ti += 1;
            }
        }
    }

    // Trailing `**` tokens also match zero components.
    pi == path.len()
        && pattern[ti..]
            .iter()
            .all(|token| matches!(token, PatternToken::Recursive))
}
