use super::key::Section;
use super::value::ValueError;
use std::fmt;

/// Conditions that abort a whole layout build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The section declares no keys at all.
    EmptyTaxonomy(Section),
    /// The section's main picture or main position key is not in its table.
    MissingMainKey { section: Section, key: &'static str },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::EmptyTaxonomy(section) => {
                write!(f, "section {} declares no feature keys", section)
            }
            BuildError::MissingMainKey { section, key } => {
                write!(f, "section {} does not declare its main key '{}'", section, key)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// One entry of an interface dump that could not be loaded. Loading carries
/// on with the remaining entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    UnknownKey { group: String, key: String },
    DuplicateKey { group: String, key: String },
    BadValue { group: String, key: String, source: ValueError },
    BadGroup { group: String, reason: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnknownKey { group, key } => {
                write!(f, "[{}] unknown feature key '{}'", group, key)
            }
            LoadError::DuplicateKey { group, key } => {
                write!(f, "[{}] '{}' is defined more than once", group, key)
            }
            LoadError::BadValue { group, key, source } => {
                write!(f, "[{}] {}: {}", group, key, source)
            }
            LoadError::BadGroup { group, reason } => {
                write!(f, "[{}] skipped: {}", group, reason)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::BadValue { source, .. } => Some(source),
            _ => None,
        }
    }
}
