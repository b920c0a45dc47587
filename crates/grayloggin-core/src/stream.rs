//! Log streams and the name-to-id directory

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A server-side stream a search can be scoped to.
///
/// Only the id goes on the wire; the name is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRef {
    pub name: String,
    pub id: String,
}

impl StreamRef {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamListing {
    #[serde(default)]
    streams: Vec<StreamEntry>,
}

#[derive(Debug, Deserialize)]
struct StreamEntry {
    id: String,
    title: String,
}

/// Enabled streams of an installation, keyed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDirectory {
    streams: BTreeMap<String, String>,
}

impl StreamDirectory {
    /// Parse the body of the enabled-streams listing (`{"streams": [...]}`).
    pub fn from_listing(body: &[u8]) -> Result<Self> {
        let listing: StreamListing = serde_json::from_slice(body)
            .map_err(|e| Error::MalformedResponse(format!("stream listing: {}", e)))?;

        let streams = listing
            .streams
            .into_iter()
            .map(|entry| (entry.title, entry.id))
            .collect();

        Ok(Self { streams })
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.streams.get(name).map(String::as_str)
    }

    /// Iterate `(name, id)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.streams
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }

    /// Turn stream names into references, failing on the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<StreamRef>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.id_of(name)
                    .map(|id| StreamRef::new(name, id))
                    .ok_or_else(|| Error::UnknownStream(name.to_string()))
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for StreamDirectory {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            streams: iter.into_iter().collect(),
        }
    }
}
