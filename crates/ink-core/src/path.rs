use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InkError;

const PARENT_ID: &str = "^";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathComponent {
    Index(usize),
    Name(String),
    Parent,
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Name(name) => f.write_str(name),
            Self::Parent => f.write_str(PARENT_ID),
        }
    }
}

/// Canonical dot-separated address of a node in the compiled story graph,
/// e.g. `knot.stitch.0`. A leading dot marks a relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InkPath {
    components: Vec<PathComponent>,
    relative: bool,
}

impl InkPath {
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
            relative: false,
        }
    }

    pub fn from_components(components: Vec<PathComponent>) -> Self {
        Self {
            components,
            relative: false,
        }
    }

    /// Parses a dotted path. The empty string is the root container.
    pub fn parse(value: &str) -> Result<Self, InkError> {
        if value.is_empty() {
            return Ok(Self::root());
        }
        let (relative, body) = match value.strip_prefix('.') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        if body.is_empty() {
            return Err(InkError::new(
                "PATH_INVALID",
                format!("Path \"{}\" has no components.", value),
            ));
        }

        let mut components = Vec::new();
        for part in body.split('.') {
            if part.is_empty() {
                return Err(InkError::new(
                    "PATH_INVALID",
                    format!("Path \"{}\" contains an empty component.", value),
                ));
            }
            let component = if part == PARENT_ID {
                PathComponent::Parent
            } else if let Ok(index) = part.parse::<usize>() {
                PathComponent::Index(index)
            } else {
                PathComponent::Name(part.to_string())
            };
            components.push(component);
        }

        Ok(Self {
            components,
            relative,
        })
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty() && !self.relative
    }
}

impl fmt::Display for InkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relative {
            f.write_str(".")?;
        }
        for (index, component) in self.components.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for InkPath {
    type Err = InkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for InkPath {
    type Error = InkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InkPath> for String {
    fn from(path: InkPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod path_tests {
    use super::*;

    #[test]
    fn parse_splits_named_index_and_parent_components() {
        let path = InkPath::parse("knot.stitch.0.^").expect("path should parse");
        assert_eq!(
            path.components(),
            &[
                PathComponent::Name("knot".to_string()),
                PathComponent::Name("stitch".to_string()),
                PathComponent::Index(0),
                PathComponent::Parent,
            ]
        );
        assert!(!path.is_relative());
        assert_eq!(path.to_string(), "knot.stitch.0.^");
    }

    #[test]
    fn relative_paths_keep_leading_dot() {
        let path: InkPath = ".^.c-0".parse().expect("relative path should parse");
        assert!(path.is_relative());
        assert_eq!(path.to_string(), ".^.c-0");
    }

    #[test]
    fn parse_rejects_empty_components() {
        assert_eq!(
            InkPath::parse("a..b").expect_err("gap").code,
            "PATH_INVALID"
        );
        assert_eq!(InkPath::parse("a.").expect_err("trailing dot").code, "PATH_INVALID");
        assert_eq!(InkPath::parse(".").expect_err("dot").code, "PATH_INVALID");
    }

    #[test]
    fn empty_path_is_the_root() {
        let root = InkPath::parse("").expect("root path");
        assert!(root.is_root());
        assert_eq!(root, InkPath::root());
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn serde_uses_the_dotted_string_form() {
        let path = InkPath::parse("intro.1").expect("path");
        let json = serde_json::to_string(&path).expect("serialize");
        assert_eq!(json, "\"intro.1\"");
        let back: InkPath = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, path);
        assert!(serde_json::from_str::<InkPath>("\"a..b\"").is_err());
    }
}
