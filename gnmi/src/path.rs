//! Structured paths and their string form.
//!
//! The wire-visible grammar is `[origin:]/name[key=value][key2=value2]/...`.
//! A backslash escapes the character after it, so `/` can appear inside an
//! element name and `]` inside a key value. Key order within an element is
//! preserved and re-emitted as parsed.

use std::collections::HashMap;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use thiserror::Error;

use gnmi_proto as pb;

/// Structured identifier for a management data node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    pub origin: Option<String>,
    pub elements: Vec<PathElem>,
}

/// One path element: a name plus ordered key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathElem {
    pub name: String,
    pub keys: Vec<(String, String)>,
}

impl PathElem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.push((key.into(), value.into()));
        self
    }
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.elements.is_empty()
    }

    /// Left elements followed by right elements. The origin of both
    /// operands is dropped, never inherited.
    pub fn concat(&self, other: &Path) -> Path {
        Path {
            origin: None,
            elements: self
                .elements
                .iter()
                .chain(&other.elements)
                .cloned()
                .collect(),
        }
    }

    pub fn to_proto(&self) -> pb::Path {
        pb::Path {
            origin: self.origin.clone().unwrap_or_default(),
            elem: self
                .elements
                .iter()
                .map(|elem| pb::PathElem {
                    name: elem.name.clone(),
                    key: elem.keys.iter().cloned().collect::<HashMap<_, _>>(),
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Builds a [`Path`] from its wire form. Wire key maps are unordered,
    /// so keys come back sorted by name; only the canonical `elem` field is
    /// read.
    pub fn from_proto(proto: &pb::Path) -> Path {
        let origin = (!proto.origin.is_empty()).then(|| proto.origin.clone());
        let elements = proto
            .elem
            .iter()
            .map(|elem| {
                let mut keys: Vec<(String, String)> = elem
                    .key
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                keys.sort();
                PathElem {
                    name: elem.name.clone(),
                    keys,
                }
            })
            .collect();
        Path { origin, elements }
    }
}

impl Add<&Path> for &Path {
    type Output = Path;

    fn add(self, rhs: &Path) -> Path {
        self.concat(rhs)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{origin}:")?;
        }
        for elem in &self.elements {
            write!(f, "/{}", escape(&elem.name, '/'))?;
            for (key, value) in &elem.keys {
                write!(f, "[{key}={}]", escape(value, ']'))?;
            }
        }
        Ok(())
    }
}

/// Malformed path string. Carries the offending component verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("Empty element name in {0:?}")]
    EmptyName(String),

    #[error("Unterminated key expression in {0:?}")]
    UnterminatedKey(String),

    #[error("Key expression without '=' in {0:?}")]
    MissingEquals(String),

    #[error("Empty key name in {0:?}")]
    EmptyKey(String),

    #[error("Unexpected text after key expression in {0:?}")]
    TrailingCharacters(String),
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, PathParseError> {
        let s = s.trim();
        let (origin, rest) = match split_origin(s) {
            Some((origin, rest)) => (Some(origin.to_string()), rest),
            None => (None, s),
        };

        let mut elements = Vec::new();
        for component in split_components(rest) {
            if component.is_empty() {
                continue;
            }
            elements.push(parse_element(&component)?);
        }
        Ok(Path { origin, elements })
    }
}

/// Leading `origin:` token, when present. The origin is a non-empty run of
/// `[A-Za-z0-9_-]` directly followed by `:`.
fn split_origin(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))?;
    if end == 0 || s.as_bytes()[end] != b':' {
        return None;
    }
    Some((&s[..end], &s[end + 1..]))
}

/// Splits on unescaped `/`, keeping escape sequences intact for the
/// per-component pass.
fn split_components(s: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '/' => components.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    components.push(current);
    components
}

/// Parses one `name[key=value]...` component, unescaping as it goes.
/// A key's value is everything after the first `=`, so values may contain
/// `=` themselves.
fn parse_element(component: &str) -> Result<PathElem, PathParseError> {
    let mut chars = component.chars().peekable();

    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        match c {
            '\\' => {
                chars.next();
                match chars.next() {
                    Some(escaped) => name.push(escaped),
                    None => name.push('\\'),
                }
            }
            '[' => break,
            _ => {
                chars.next();
                name.push(c);
            }
        }
    }
    if name.is_empty() {
        return Err(PathParseError::EmptyName(component.to_string()));
    }

    let mut keys = Vec::new();
    while chars.next().is_some() {
        // the '[' that ended the previous scan was just consumed
        let mut group = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => group.push(escaped),
                    None => group.push('\\'),
                },
                ']' => {
                    closed = true;
                    break;
                }
                _ => group.push(c),
            }
        }
        if !closed {
            return Err(PathParseError::UnterminatedKey(component.to_string()));
        }

        let Some((key, value)) = group.split_once('=') else {
            return Err(PathParseError::MissingEquals(component.to_string()));
        };
        if key.is_empty() {
            return Err(PathParseError::EmptyKey(component.to_string()));
        }
        keys.push((key.to_string(), value.to_string()));

        match chars.peek() {
            Some('[') | None => {}
            Some(_) => return Err(PathParseError::TrailingCharacters(component.to_string())),
        }
    }

    Ok(PathElem { name, keys })
}

fn escape(s: &str, reserved: char) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == reserved || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Conversion accepted wherever an operation takes paths: already-built
/// [`Path`] values pass through, strings go through the parser.
pub trait IntoPath {
    fn into_path(self) -> Result<Path, PathParseError>;
}

impl IntoPath for Path {
    fn into_path(self) -> Result<Path, PathParseError> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Result<Path, PathParseError> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<Path, PathParseError> {
        self.parse()
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<Path, PathParseError> {
        self.parse()
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<Path, PathParseError> {
        self.parse()
    }
}

pub(crate) fn into_paths<I>(paths: I) -> Result<Vec<Path>, PathParseError>
where
    I: IntoIterator,
    I::Item: IntoPath,
{
    paths.into_iter().map(IntoPath::into_path).collect()
}
