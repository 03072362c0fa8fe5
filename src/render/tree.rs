use std::collections::{HashMap, HashSet};

use crate::foundation::core::{Affine, Size2};
use crate::rig::cache::RigCache;
use crate::rig::pose::{PuppetPose, evaluate_pose};
use crate::scene::layout::SceneLayout;
use crate::scene::model::{Category, ObjectId, Scene, SceneObject};
use crate::timeline::evaluate::SvgOverrides;

/// One object ready to draw.
///
/// Roots are placed in world space; attached children are placed in their limb's local space by
/// the stored relative matrix, and the renderer nests them inside the limb's group.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: ObjectId,
    pub category: Category,
    /// Box frame in the parent space (world, or limb-local when attached).
    pub placement: Affine,
    pub size: Size2,
    /// Document units to box units, including the horizontal mirror of a flipped puppet.
    pub content_transform: Affine,
    pub hidden: bool,
    /// Part rotations, for content with interactive parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<PuppetPose>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attached: Vec<LimbGroup>,
}

/// Children hanging from one limb, in draw order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimbGroup {
    pub limb: String,
    pub children: Vec<RenderNode>,
}

/// Build the frame's render tree with `overrides` merged on top of the scene.
///
/// Roots are free-standing objects in draw order. Objects attached to a missing parent, or
/// caught in an attachment cycle, are skipped with a warning.
#[tracing::instrument(skip_all, fields(objects = scene.len()))]
pub fn build_render_tree(
    scene: &Scene,
    rigs: &RigCache,
    overrides: &SvgOverrides,
) -> Vec<RenderNode> {
    let effective: Vec<SceneObject> = scene
        .draw_order()
        .into_iter()
        .map(|o| match overrides.get(&o.id) {
            Some(ov) => o.with_override(ov),
            None => o.clone(),
        })
        .collect();

    let mut children: HashMap<&ObjectId, Vec<&SceneObject>> = HashMap::new();
    let mut roots = Vec::new();
    for obj in &effective {
        match &obj.attachment_info {
            None => roots.push(obj),
            Some(info) if scene.contains(&info.parent_id) => {
                children.entry(&info.parent_id).or_default().push(obj)
            }
            Some(info) => {
                tracing::warn!(object = %obj.id, parent = %info.parent_id, "skipping orphaned attachment");
            }
        }
    }

    for id in unreachable(&roots, &children) {
        tracing::warn!(object = %id, "skipping attachment cycle");
    }

    let builder = TreeBuilder {
        rigs,
        children,
        depth_limit: effective.len(),
    };
    roots
        .into_iter()
        .map(|obj| builder.node(obj, obj.standalone_frame(), 0))
        .collect()
}

/// Attached objects that no root reaches through the parent links.
fn unreachable<'a>(
    roots: &[&'a SceneObject],
    children: &HashMap<&'a ObjectId, Vec<&'a SceneObject>>,
) -> Vec<&'a ObjectId> {
    let mut seen: HashSet<&ObjectId> = HashSet::new();
    let mut stack: Vec<&ObjectId> = roots.iter().map(|o| &o.id).collect();
    while let Some(id) = stack.pop() {
        if seen.insert(id) {
            stack.extend(children.get(id).into_iter().flatten().map(|c| &c.id));
        }
    }
    let mut missing: Vec<&ObjectId> = children
        .values()
        .flatten()
        .map(|c| &c.id)
        .filter(|id| !seen.contains(id))
        .collect();
    missing.sort();
    missing
}

struct TreeBuilder<'a> {
    rigs: &'a RigCache,
    children: HashMap<&'a ObjectId, Vec<&'a SceneObject>>,
    depth_limit: usize,
}

impl TreeBuilder<'_> {
    fn node(&self, obj: &SceneObject, placement: Affine, depth: usize) -> RenderNode {
        let rig = self.rigs.get(&obj.content);
        let pose = rig.filter(|r| !r.metadata.parts.is_empty()).map(|r| {
            let doc_width = r.doc_size().map_or(obj.width, |s| s.width);
            evaluate_pose(
                &r.metadata,
                &r.mirror,
                &obj.articulation,
                obj.flipped,
                doc_width,
            )
        });

        let mut attached: Vec<LimbGroup> = Vec::new();
        if depth < self.depth_limit {
            for child in self.children.get(&obj.id).into_iter().flatten() {
                let Some(info) = &child.attachment_info else {
                    continue;
                };
                let node = self.node(child, info.transform, depth + 1);
                match attached.iter_mut().find(|g| g.limb == info.limb_id) {
                    Some(group) => group.children.push(node),
                    None => attached.push(LimbGroup {
                        limb: info.limb_id.clone(),
                        children: vec![node],
                    }),
                }
            }
        } else {
            tracing::warn!(object = %obj.id, "attachment chain too deep");
        }

        RenderNode {
            id: obj.id.clone(),
            category: obj.category,
            placement,
            size: obj.size(),
            content_transform: SceneLayout::content_transform(obj, rig),
            hidden: obj.hidden,
            pose,
            attached,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/tree.rs"]
mod tests;
