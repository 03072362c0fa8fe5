use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::Size2;
use crate::foundation::error::PuppetryResult;
use crate::rig::geometry::RigGeometry;
use crate::rig::metadata::{RigMetadata, RigSchema, extract_rig_with};
use crate::rig::mirror::MirrorTable;

/// Everything derived from one SVG document: parts, pivots, mirror pairs and static geometry.
#[derive(Clone, Debug)]
pub struct Rig {
    /// Discovered parts and pivots.
    pub metadata: RigMetadata,
    /// Bilateral pairs derived from declared sides.
    pub mirror: MirrorTable,
    /// Resolved document geometry, `None` when `usvg` could not build a tree.
    pub geometry: Option<RigGeometry>,
}

impl Rig {
    /// Parse `markup` into a rig.
    ///
    /// Fails only when the markup is not well-formed XML; geometry problems degrade to
    /// `geometry: None`.
    pub fn parse(markup: &str, schema: &RigSchema) -> PuppetryResult<Self> {
        let metadata = extract_rig_with(markup, schema)?;
        let mirror = MirrorTable::from_rig(&metadata);
        let geometry = match RigGeometry::from_markup(
            markup,
            metadata.interactive_parts.iter().map(String::as_str),
        ) {
            Ok(g) => Some(g),
            Err(err) => {
                tracing::warn!(%err, "rig geometry unavailable");
                None
            }
        };
        Ok(Self {
            metadata,
            mirror,
            geometry,
        })
    }

    /// Intrinsic document size, if known.
    pub fn doc_size(&self) -> Option<Size2> {
        self.geometry.as_ref().map(|g| g.size)
    }
}

/// Rig cache keyed by SVG content.
///
/// Extraction is a pure function of the markup, so each distinct content string is parsed once.
#[derive(Debug, Default)]
pub struct RigCache {
    schema: RigSchema,
    entries: HashMap<Arc<str>, Arc<Rig>>,
}

impl RigCache {
    /// Empty cache using `schema` for discovery.
    pub fn new(schema: RigSchema) -> Self {
        Self {
            schema,
            entries: HashMap::new(),
        }
    }

    /// Schema used for discovery.
    pub fn schema(&self) -> &RigSchema {
        &self.schema
    }

    /// Return the rig for `content`, parsing it on first use.
    pub fn load(&mut self, content: &str) -> PuppetryResult<Arc<Rig>> {
        if let Some(rig) = self.entries.get(content) {
            return Ok(Arc::clone(rig));
        }
        let rig = Arc::new(Rig::parse(content, &self.schema)?);
        self.entries.insert(Arc::from(content), Arc::clone(&rig));
        Ok(rig)
    }

    /// Previously loaded rig for `content`.
    pub fn get(&self, content: &str) -> Option<&Rig> {
        self.entries.get(content).map(Arc::as_ref)
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose content is not in `live`.
    pub fn retain_contents<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) {
        let live: std::collections::HashSet<&str> = live.into_iter().collect();
        self.entries.retain(|k, _| live.contains(k.as_ref()));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/cache.rs"]
mod tests;
