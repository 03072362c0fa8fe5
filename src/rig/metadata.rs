//! Declarative rig discovery.
//!
//! A puppet document marks its articulable parts directly in the markup: any element carrying the
//! interactivity attribute set to `true` (and an `id`) is a part. Pivots are declared either on the
//! part, on one of its descendants, or through a legacy pivot-marker `<circle>` child.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::Context as _;

use crate::foundation::core::Point;
use crate::foundation::error::{PuppetryError, PuppetryResult};

/// Attribute names used to discover rig metadata.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RigSchema {
    /// Marks an element as an interactive (rotatable) part when set to `true`.
    pub interactive_attr: String,
    /// Pivot coordinate, `"x,y"` in the element's local space.
    pub pivot_attr: String,
    /// Optional `left` / `right` tag used for mirroring.
    pub side_attr: String,
    /// Optional part role (e.g. `upper-arm`), used to pair mirrored parts.
    pub role_attr: String,
    /// Legacy flag on a direct-child `<circle>` whose center is the pivot.
    pub pivot_marker_attr: String,
}

impl Default for RigSchema {
    fn default() -> Self {
        Self {
            interactive_attr: "data-interactive".to_owned(),
            pivot_attr: "data-pivot".to_owned(),
            side_attr: "data-side".to_owned(),
            role_attr: "data-part".to_owned(),
            pivot_marker_attr: "data-pivot-marker".to_owned(),
        }
    }
}

/// Left/right tag of a bilateral part.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left-hand part.
    Left,
    /// Right-hand part.
    Right,
}

impl Side {
    /// The opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }

    pub(crate) fn token(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// One articulable part discovered in a puppet document.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuppetPart {
    /// Element id, unique within the document.
    pub id: String,
    /// Rotation origin in the part's local coordinate space.
    pub pivot: Option<Point>,
    /// Declared side, if any.
    pub side: Option<Side>,
    /// Declared role, if any.
    pub role: Option<String>,
    /// Nearest enclosing interactive part.
    pub parent: Option<String>,
}

/// Rig lookup tables extracted from one SVG document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RigMetadata {
    /// Interactive parts in document order.
    pub parts: Vec<PuppetPart>,
    /// Part id to resolved pivot.
    pub pivots: BTreeMap<String, Point>,
    /// Interactive part ids in document order.
    pub interactive_parts: Vec<String>,
    /// Parts with no resolvable pivot; they never rotate.
    pub unpivoted: Vec<String>,
    /// Ids flagged interactive more than once; only the first occurrence is kept.
    pub duplicate_ids: Vec<String>,
    #[serde(skip)]
    owners: HashMap<String, String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RigMetadata {
    /// Look up a part by id.
    pub fn part(&self, id: &str) -> Option<&PuppetPart> {
        self.index.get(id).map(|&i| &self.parts[i])
    }

    /// Return `true` when `id` is an interactive part of this rig.
    pub fn is_part(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Pivot of `part`, if declared.
    pub fn pivot(&self, part: &str) -> Option<Point> {
        self.pivots.get(part).copied()
    }

    /// Resolve any element id to the nearest interactive part enclosing it (itself included).
    ///
    /// This is how a pointer hit on an inner primitive is attributed to its limb.
    pub fn owning_part(&self, element_id: &str) -> Option<&str> {
        self.owners.get(element_id).map(String::as_str)
    }

    /// Chain of parts from the outermost enclosing part down to `part` (inclusive).
    pub fn chain_to(&self, part: &str) -> Option<Vec<&PuppetPart>> {
        let mut chain = Vec::new();
        let mut cur = self.part(part)?;
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(cur.id.as_str()) {
                break;
            }
            chain.push(cur);
            match cur.parent.as_deref().and_then(|p| self.part(p)) {
                Some(p) => cur = p,
                None => break,
            }
        }
        chain.reverse();
        Some(chain)
    }
}

/// Extract rig metadata using the default [`RigSchema`].
pub fn extract_rig(markup: &str) -> PuppetryResult<RigMetadata> {
    extract_rig_with(markup, &RigSchema::default())
}

/// Extract rig metadata from SVG markup.
///
/// Only an unparsable document is an error. Parts with missing pivots or duplicate ids are
/// reported through [`RigMetadata::unpivoted`] / [`RigMetadata::duplicate_ids`].
#[tracing::instrument(skip(markup, schema), fields(len = markup.len()))]
pub fn extract_rig_with(markup: &str, schema: &RigSchema) -> PuppetryResult<RigMetadata> {
    let doc = roxmltree::Document::parse(markup)
        .context("parse rig markup")
        .map_err(|e| PuppetryError::rig(format!("{e:#}")))?;

    let mut meta = RigMetadata::default();
    let mut part_nodes: HashSet<roxmltree::NodeId> = HashSet::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        if !is_interactive(node, schema) {
            continue;
        }
        let Some(id) = node.attribute("id").filter(|s| !s.is_empty()) else {
            tracing::warn!(
                tag = node.tag_name().name(),
                "interactive element without id ignored"
            );
            continue;
        };
        if meta.index.contains_key(id) {
            tracing::warn!(part = id, "duplicate interactive part id");
            meta.duplicate_ids.push(id.to_owned());
            continue;
        }

        let parent = node
            .ancestors()
            .skip(1)
            .find(|a| part_nodes.contains(&a.id()))
            .and_then(|a| a.attribute("id"))
            .map(str::to_owned);

        let pivot = resolve_pivot(node, schema);
        match pivot {
            Some(p) => {
                meta.pivots.insert(id.to_owned(), p);
            }
            None => {
                tracing::warn!(part = id, "interactive part has no pivot; it will not rotate");
                meta.unpivoted.push(id.to_owned());
            }
        }

        part_nodes.insert(node.id());
        meta.index.insert(id.to_owned(), meta.parts.len());
        meta.interactive_parts.push(id.to_owned());
        meta.parts.push(PuppetPart {
            id: id.to_owned(),
            pivot,
            side: node.attribute(schema.side_attr.as_str()).and_then(Side::parse),
            role: node
                .attribute(schema.role_attr.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            parent,
        });
    }

    for node in doc.descendants().filter(|n| n.is_element()) {
        let Some(id) = node.attribute("id").filter(|s| !s.is_empty()) else {
            continue;
        };
        if meta.owners.contains_key(id) {
            continue;
        }
        let owner = node
            .ancestors()
            .find(|a| part_nodes.contains(&a.id()))
            .and_then(|a| a.attribute("id"));
        if let Some(owner) = owner {
            meta.owners.insert(id.to_owned(), owner.to_owned());
        }
    }

    Ok(meta)
}

fn is_interactive(node: roxmltree::Node<'_, '_>, schema: &RigSchema) -> bool {
    node.attribute(schema.interactive_attr.as_str())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// First match wins: the part's own attribute, any descendant's attribute in document order,
/// then a direct-child circle flagged as the pivot marker.
fn resolve_pivot(node: roxmltree::Node<'_, '_>, schema: &RigSchema) -> Option<Point> {
    let attr = schema.pivot_attr.as_str();
    if let Some(p) = node.attribute(attr).and_then(parse_pivot) {
        return Some(p);
    }

    let nested = node
        .descendants()
        .skip(1)
        .filter(|d| d.is_element())
        .find_map(|d| d.attribute(attr).and_then(parse_pivot));
    if nested.is_some() {
        return nested;
    }

    node.children()
        .filter(|c| c.is_element() && c.tag_name().name() == "circle")
        .filter(|c| {
            c.attribute(schema.pivot_marker_attr.as_str())
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        })
        .find_map(|c| {
            let cx = parse_number(c.attribute("cx").unwrap_or("0"))?;
            let cy = parse_number(c.attribute("cy").unwrap_or("0"))?;
            Some(Point::new(cx, cy))
        })
}

/// Parse a `"x,y"` pivot coordinate.
pub(crate) fn parse_pivot(s: &str) -> Option<Point> {
    let (x, y) = s.split_once(',')?;
    if y.contains(',') {
        return None;
    }
    Some(Point::new(parse_number(x)?, parse_number(y)?))
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "../../tests/unit/rig/metadata.rs"]
mod tests;
