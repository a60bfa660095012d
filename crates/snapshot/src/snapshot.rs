//! Snapshot parsing.

use serde::Deserialize;
use snapcheck_common::digest::{extract_digest, is_sha256_digest};
use snapcheck_common::{Error, Result, Stream};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Snapshot document as it appears on the wire.
#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    application: String,
    #[serde(default)]
    components: Vec<ComponentDocument>,
}

#[derive(Debug, Deserialize)]
struct ComponentDocument {
    name: Option<String>,
    #[serde(rename = "containerImage")]
    container_image: Option<String>,
}

/// A single component built for the release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component name, unique within a snapshot.
    pub name: String,
    /// Full image reference.
    pub image: String,
    /// Digest taken from the image reference, if it is pinned by digest.
    pub digest: Option<String>,
}

impl Component {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        let image = image.into();
        let digest = extract_digest(&image).map(str::to_string);
        Self {
            name: name.into(),
            image,
            digest,
        }
    }
}

/// A parsed snapshot. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Snapshot {
    application: String,
    stream: Stream,
    components: Vec<Component>,
}

impl Snapshot {
    /// Parse a snapshot from its JSON representation.
    ///
    /// Syntax errors surface as [`Error::Json`]; a well-formed document with
    /// the wrong shape, a component without a name or image, or a duplicated
    /// component name is an [`Error::MalformedSnapshot`]. The stream is
    /// derived from the application name.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let document: SnapshotDocument = serde_json::from_value(value)
            .map_err(|e| Error::MalformedSnapshot(e.to_string()))?;

        let stream = Stream::detect(&document.application)?;

        let mut seen = HashSet::new();
        let mut components = Vec::with_capacity(document.components.len());

        for (index, entry) in document.components.into_iter().enumerate() {
            let name = entry.name.ok_or_else(|| {
                Error::MalformedSnapshot(format!("component #{} has no name", index))
            })?;
            let image = entry.container_image.ok_or_else(|| {
                Error::MalformedSnapshot(format!("component {} has no containerImage", name))
            })?;

            if !seen.insert(name.clone()) {
                return Err(Error::MalformedSnapshot(format!(
                    "duplicate component name: {}",
                    name
                )));
            }

            let component = Component::new(name, image);
            match component.digest.as_deref() {
                Some(digest) if !is_sha256_digest(digest) => {
                    warn!(
                        "Component {} carries an unexpected digest: {}",
                        component.name, digest
                    );
                }
                None => debug!("Component {} is not pinned by digest", component.name),
                _ => {}
            }
            components.push(component);
        }

        debug!(
            "Parsed snapshot {} ({}) with {} components",
            document.application,
            stream,
            components.len()
        );

        Ok(Self {
            application: document.application,
            stream,
            components,
        })
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Components in the order they appear in the snapshot.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Names of all components, in snapshot order.
    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }
}
