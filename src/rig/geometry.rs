use std::collections::HashMap;

use anyhow::Context as _;

use crate::foundation::core::{Affine, Size2};
use crate::foundation::error::{PuppetryError, PuppetryResult};

/// Static geometry of a rig document, resolved by `usvg`.
///
/// `part_transforms` maps each part id to the element's absolute transform from its local space to
/// the document's user space, before any articulation is applied.
#[derive(Clone, Debug)]
pub struct RigGeometry {
    /// Intrinsic document size.
    pub size: Size2,
    part_transforms: HashMap<String, Affine>,
}

impl RigGeometry {
    /// Resolve document size and the static transforms of `part_ids`.
    ///
    /// Parts that `usvg` drops from the tree (e.g. empty groups) are simply absent.
    pub fn from_markup<'a>(
        markup: &str,
        part_ids: impl IntoIterator<Item = &'a str>,
    ) -> PuppetryResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_str(markup, &opts).context("parse svg tree")?;

        let size = Size2::new(
            f64::from(tree.size().width()),
            f64::from(tree.size().height()),
        );
        if !size.is_positive() {
            return Err(PuppetryError::rig("svg document has an empty size"));
        }

        let mut part_transforms = HashMap::new();
        for id in part_ids {
            match tree.node_by_id(id) {
                Some(node) => {
                    part_transforms.insert(id.to_owned(), affine_from_usvg(node.abs_transform()));
                }
                None => tracing::debug!(part = id, "part missing from resolved svg tree"),
            }
        }

        Ok(Self {
            size,
            part_transforms,
        })
    }

    /// Build geometry directly, for hosts that measure documents themselves.
    pub fn from_parts(size: Size2, part_transforms: HashMap<String, Affine>) -> Self {
        Self {
            size,
            part_transforms,
        }
    }

    /// Static absolute transform of `part`.
    pub fn part_transform(&self, part: &str) -> Option<Affine> {
        self.part_transforms.get(part).copied()
    }
}

fn affine_from_usvg(t: usvg::Transform) -> Affine {
    Affine::new([
        f64::from(t.sx),
        f64::from(t.ky),
        f64::from(t.kx),
        f64::from(t.sy),
        f64::from(t.tx),
        f64::from(t.ty),
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/rig/geometry.rs"]
mod tests;
