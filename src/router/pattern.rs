//! Route key compilation
//!
//! Every route key is compiled exactly once, when it is registered, into a
//! [`CompiledKey`]: a tagged [`KeyKind`] plus whatever matcher that kind needs.
//! Matching never re-inspects the raw key string.
//!
//! ## Key grammar
//!
//! - `users` - static; matches the literal text as a prefix of the path
//! - `users/:id` - one parameter; `:id` matches a run of non-`/` characters
//! - `:a/:b` - several parameters; values are taken positionally from the path
//! - `files/*rest` - wildcard; `*rest` swallows the remainder as a segment list
//!
//! Anything that is not a token is matched literally (regex metacharacters are
//! escaped), so malformed keys degrade to static text instead of failing.
//!
//! ## Positional binding for multi-parameter keys
//!
//! A multi-parameter key only uses its compiled pattern to decide whether it
//! matches and how much of the path it consumes. The values come from the
//! *entire* remaining path: it is broken into runs of non-`/` characters with an
//! empty run recorded at every separator (`a/b` gives `["a", "", "b", ""]`),
//! and parameter `i` takes run `2 * i`. For keys made only of parameters that
//! is the `i`th segment; for keys with literal segments the values land on the
//! literals instead (`users/:id/posts/:post` binds `id = "users"`).

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::RouterError;

/// A single extracted parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Bound by a `:name` token
    Single(String),
    /// Bound by a `*name` wildcard: the remainder split on `/`
    Segments(Vec<String>),
}

impl ParamValue {
    /// The value of a `:name` parameter, `None` for wildcard values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            ParamValue::Segments(_) => None,
        }
    }

    /// The segments of a `*name` parameter, `None` for single values.
    #[must_use]
    pub fn as_segments(&self) -> Option<&[String]> {
        match self {
            ParamValue::Segments(v) => Some(v),
            ParamValue::Single(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Single(s) => f.write_str(s),
            ParamValue::Segments(v) => f.write_str(&v.join("/")),
        }
    }
}

/// Parameters extracted for a route node on its last activation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteData(BTreeMap<String, ParamValue>);

impl RouteData {
    /// Look up a parameter by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Look up a `:name` parameter.
    #[inline]
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Look up a `*name` parameter.
    #[inline]
    #[must_use]
    pub fn get_segments(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(ParamValue::as_segments)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for RouteData {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Syntactic form of a route key, fixed at registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyKind {
    /// Literal text only
    Static,
    /// Exactly one `:name` token
    SingleParam { name: String },
    /// Two or more `:name` tokens, in declaration order
    MultiParam { names: Vec<String> },
    /// A `*name` token; any `:name` tokens before it are kept in `params`
    Wildcard { name: String, params: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// Split a raw key into literal text and tokens.
///
/// `:name` runs up to the next `/`; `*name` needs at least one ASCII letter
/// after the star, otherwise the star is literal.
fn tokenize(raw: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = raw.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            ':' => {
                let rest = &raw[i + 1..];
                let name_len = rest.find('/').unwrap_or(rest.len());
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Param(rest[..name_len].to_string()));
                while chars.peek().is_some_and(|&(j, _)| j <= i + name_len) {
                    chars.next();
                }
            }
            '*' => {
                let rest = &raw[i + 1..];
                let name_len = rest
                    .find(|ch: char| !ch.is_ascii_alphabetic())
                    .unwrap_or(rest.len());
                if name_len == 0 {
                    literal.push(c);
                    continue;
                }
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Wildcard(rest[..name_len].to_string()));
                while chars.peek().is_some_and(|&(j, _)| j <= i + name_len) {
                    chars.next();
                }
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    pieces
}

/// Runs of non-`/` characters, with an empty run recorded at every separator
/// and at the end of input.
fn separator_runs(path: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut pos = 0;
    while pos <= path.len() {
        let end = path[pos..].find('/').map_or(path.len(), |off| pos + off);
        runs.push(&path[pos..end]);
        pos = if end == pos { pos + 1 } else { end };
    }
    runs
}

/// Result of matching a compiled key against the front of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatch {
    /// Number of bytes of the path the key consumed
    pub len: usize,
    /// Parameters bound by the match
    pub data: RouteData,
}

/// A route key compiled into a prefix matcher
#[derive(Debug, Clone)]
pub struct CompiledKey {
    raw: String,
    kind: KeyKind,
    /// `None` for static keys, which compare with `starts_with`
    regex: Option<Regex>,
    /// Tokens in capture-group order
    groups: Vec<Piece>,
}

impl CompiledKey {
    /// Compile a raw route key.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidPattern`] if the generated regex is rejected.
    pub fn compile(raw: &str) -> Result<Self, RouterError> {
        let pieces = tokenize(raw);
        let params: Vec<String> = pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Param(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        let wildcard = pieces.iter().find_map(|p| match p {
            Piece::Wildcard(name) => Some(name.clone()),
            _ => None,
        });

        let kind = match (wildcard, params.len()) {
            (Some(name), _) => KeyKind::Wildcard { name, params },
            (None, 0) => KeyKind::Static,
            (None, 1) => KeyKind::SingleParam {
                name: params[0].clone(),
            },
            (None, _) => KeyKind::MultiParam { names: params },
        };

        let regex = if kind == KeyKind::Static {
            None
        } else {
            let mut pattern = String::with_capacity(raw.len() + 16);
            pattern.push('^');
            for piece in &pieces {
                match piece {
                    Piece::Literal(text) => pattern.push_str(&regex::escape(text)),
                    Piece::Param(_) => pattern.push_str("([^/]*)"),
                    Piece::Wildcard(_) => pattern.push_str("(.*)"),
                }
            }
            let regex = Regex::new(&pattern).map_err(|e| RouterError::InvalidPattern {
                key: raw.to_string(),
                reason: e.to_string(),
            })?;
            Some(regex)
        };

        let groups = pieces
            .into_iter()
            .filter(|p| !matches!(p, Piece::Literal(_)))
            .collect();

        Ok(Self {
            raw: raw.to_string(),
            kind,
            regex,
            groups,
        })
    }

    /// The key as registered
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn kind(&self) -> &KeyKind {
        &self.kind
    }

    /// Match this key against the front of `path`.
    #[must_use]
    pub fn match_prefix(&self, path: &str) -> Option<KeyMatch> {
        let regex = match (&self.kind, &self.regex) {
            (KeyKind::Static, _) | (_, None) => {
                return path.starts_with(self.raw.as_str()).then(|| KeyMatch {
                    len: self.raw.len(),
                    data: RouteData::default(),
                });
            }
            (_, Some(regex)) => regex,
        };

        let captures = regex.captures(path)?;
        let len = captures.get(0).map_or(0, |m| m.end());
        let mut data = RouteData::default();

        match &self.kind {
            KeyKind::Static => {}
            KeyKind::SingleParam { name } => {
                let value = captures.get(1).map_or("", |m| m.as_str());
                data.insert(name.as_str(), ParamValue::Single(value.to_string()));
            }
            KeyKind::MultiParam { names } => {
                let runs = separator_runs(path);
                for (i, name) in names.iter().enumerate() {
                    if let Some(value) = runs.get(i * 2) {
                        data.insert(name.as_str(), ParamValue::Single((*value).to_string()));
                    }
                }
            }
            KeyKind::Wildcard { .. } => {
                for (group, capture) in self.groups.iter().zip(captures.iter().skip(1)) {
                    let value = capture.map_or("", |m| m.as_str());
                    match group {
                        Piece::Param(name) => {
                            data.insert(name.as_str(), ParamValue::Single(value.to_string()));
                        }
                        Piece::Wildcard(name) => {
                            let segments = if value.is_empty() {
                                Vec::new()
                            } else {
                                value.split('/').map(str::to_string).collect()
                            };
                            data.insert(name.as_str(), ParamValue::Segments(segments));
                        }
                        Piece::Literal(_) => {}
                    }
                }
            }
        }

        Some(KeyMatch { len, data })
    }
}

impl fmt::Display for CompiledKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
