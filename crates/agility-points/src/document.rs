use crate::filter::{FilterCatalog, VisibilityFilterState};
use crate::scoring::domain::Dog;
use crate::scoring::rules::Configuration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnknownDog { call_name: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(err) => write!(f, "failed to read document: {err}"),
            DocumentError::Json(err) => write!(f, "invalid document data: {err}"),
            DocumentError::UnknownDog { call_name } => {
                write!(f, "no dog named '{call_name}' in document")
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io(err) => Some(err),
            DocumentError::Json(err) => Some(err),
            DocumentError::UnknownDog { .. } => None,
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// A JSON snapshot of everything a report needs: configuration, dogs, the
/// active filter and any saved filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsDocument {
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub dogs: Vec<Dog>,
    #[serde(default)]
    pub filter: VisibilityFilterState,
    #[serde(default)]
    pub filters: BTreeMap<String, VisibilityFilterState>,
}

impl PointsDocument {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DocumentError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn dog(&self, call_name: &str) -> Result<&Dog, DocumentError> {
        self.dogs
            .iter()
            .find(|dog| dog.call_name == call_name)
            .ok_or_else(|| DocumentError::UnknownDog {
                call_name: call_name.to_string(),
            })
    }

    pub fn catalog(&self) -> FilterCatalog {
        self.filters
            .iter()
            .map(|(name, state)| (name.clone(), state.clone()))
            .collect()
    }

    /// The named saved filter, or the document's active one when no name is
    /// given or the name is unknown.
    pub fn filter_state(&self, name: Option<&str>) -> &VisibilityFilterState {
        name.and_then(|name| self.filters.get(name))
            .unwrap_or(&self.filter)
    }
}
