use std::fmt;

use crate::foundation::core::{Affine, Point, Rect, Size2};
use crate::foundation::error::{PuppetryError, PuppetryResult};
use crate::foundation::math::{normalize_deg_signed, rotate_about_deg};
use crate::rig::pose::Articulation;
use crate::timeline::evaluate::ObjectOverride;

/// Stable identifier of a scene object.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Wrap a string id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Kind of scene object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Articulated character.
    Puppet,
    /// Rigid object that can be attached to limbs.
    Prop,
    /// Anything else (backgrounds, effects).
    #[default]
    Other,
}

/// Rigid parenting of an object to a limb of another object.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    /// Object owning the limb.
    pub parent_id: ObjectId,
    /// Limb (interactive part) id in the parent's markup.
    pub limb_id: String,
    /// Child box frame expressed in the limb's local frame, captured at attach time.
    pub transform: Affine,
}

/// Unit placed on the canvas.
///
/// `x`/`y` are authoritative only while `attachment_info` is `None`; an attached object is placed
/// by `limb world transform * attachment_info.transform`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    /// Unique id.
    pub id: ObjectId,
    /// Raw SVG markup.
    pub content: String,
    /// Left edge in world units.
    pub x: f64,
    /// Top edge in world units.
    pub y: f64,
    /// Box width in world units.
    pub width: f64,
    /// Box height in world units.
    pub height: f64,
    /// Object kind.
    #[serde(default)]
    pub category: Category,
    /// Draw order; higher draws later.
    #[serde(default)]
    pub z_index: i32,
    /// Locked against editing.
    #[serde(default)]
    pub locked: bool,
    /// Not drawn.
    #[serde(default)]
    pub hidden: bool,
    /// Mirrored horizontally.
    #[serde(default)]
    pub flipped: bool,
    /// Rotation about the box center in degrees, within `[-180, 180]`.
    #[serde(default)]
    pub rotation: f64,
    /// Stored limb angles (puppets).
    #[serde(default, skip_serializing_if = "Articulation::is_empty")]
    pub articulation: Articulation,
    /// Present iff attached to a limb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_info: Option<AttachmentInfo>,
}

impl SceneObject {
    /// New free-standing object occupying `rect`.
    pub fn new(id: ObjectId, content: impl Into<String>, category: Category, rect: Rect) -> Self {
        Self {
            id,
            content: content.into(),
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            category,
            z_index: 0,
            locked: false,
            hidden: false,
            flipped: false,
            rotation: 0.0,
            articulation: Articulation::new(),
            attachment_info: None,
        }
    }

    /// Box size.
    pub fn size(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }

    /// Return `true` while attached to a limb.
    pub fn is_attached(&self) -> bool {
        self.attachment_info.is_some()
    }

    /// Box frame in world space for a free-standing object: translate to `(x, y)`, then rotate
    /// about the box center.
    pub fn standalone_frame(&self) -> Affine {
        let center = Point::new(self.width / 2.0, self.height / 2.0);
        Affine::translate((self.x, self.y)) * rotate_about_deg(self.rotation, center)
    }

    /// Copy of this object with a timeline override merged on top.
    ///
    /// The base object is never modified; articulation entries merge per part.
    pub fn with_override(&self, ov: &ObjectOverride) -> Self {
        let mut out = self.clone();
        if let Some(x) = ov.x {
            out.x = x;
        }
        if let Some(y) = ov.y {
            out.y = y;
        }
        if let Some(r) = ov.rotation {
            out.rotation = r;
        }
        if let Some(h) = ov.hidden {
            out.hidden = h;
        }
        for (part, angle) in &ov.articulation {
            out.articulation.insert(part.clone(), *angle);
        }
        out
    }
}

/// Partial update of a [`SceneObject`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectPatch {
    /// New left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New draw order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// New lock flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// New hidden flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// New flip flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flipped: Option<bool>,
    /// New rotation in degrees (normalized on apply).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Limb angles to set; other parts keep their angle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articulation: Option<Articulation>,
}

impl ObjectPatch {
    /// Patch moving the object to `(x, y)`.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch setting a single limb angle.
    pub fn articulate(part: impl Into<String>, angle: f64) -> Self {
        Self {
            articulation: Some([(part.into(), angle)].into_iter().collect()),
            ..Self::default()
        }
    }

    /// Reject non-finite numbers and non-positive sizes.
    pub fn validate(&self) -> PuppetryResult<()> {
        let finite = [self.x, self.y, self.rotation]
            .into_iter()
            .flatten()
            .chain(self.articulation.iter().flat_map(|a| a.values().copied()))
            .all(f64::is_finite);
        if !finite {
            return Err(PuppetryError::validation("patch values must be finite"));
        }
        for v in [self.width, self.height].into_iter().flatten() {
            if !v.is_finite() || v <= 0.0 {
                return Err(PuppetryError::validation("width/height must be > 0"));
            }
        }
        Ok(())
    }

    /// Apply onto `obj`.
    pub fn apply_to(&self, obj: &mut SceneObject) {
        if let Some(v) = self.x {
            obj.x = v;
        }
        if let Some(v) = self.y {
            obj.y = v;
        }
        if let Some(v) = self.width {
            obj.width = v;
        }
        if let Some(v) = self.height {
            obj.height = v;
        }
        if let Some(v) = self.z_index {
            obj.z_index = v;
        }
        if let Some(v) = self.locked {
            obj.locked = v;
        }
        if let Some(v) = self.hidden {
            obj.hidden = v;
        }
        if let Some(v) = self.flipped {
            obj.flipped = v;
        }
        if let Some(v) = self.rotation {
            obj.rotation = normalize_deg_signed(v);
        }
        if let Some(a) = &self.articulation {
            for (part, angle) in a {
                obj.articulation.insert(part.clone(), *angle);
            }
        }
    }
}

/// Flat, insertion-ordered collection of scene objects.
///
/// Attachment is a foreign key (`attachment_info.parent_id`), never an owning reference, so any
/// reparenting is a field update on the child.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate ids.
    pub fn from_objects(objects: Vec<SceneObject>) -> PuppetryResult<Self> {
        let mut scene = Self::new();
        for obj in objects {
            scene.insert(obj)?;
        }
        Ok(scene)
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Iterate objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Return `true` when the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Lookup by id.
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    /// Return `true` when `id` exists.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// An id not used by any object.
    pub fn fresh_id(&self) -> ObjectId {
        let mut n = self.objects.len() + 1;
        loop {
            let id = ObjectId(format!("obj-{n}"));
            if !self.contains(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Insert an object with a caller-chosen id.
    pub fn insert(&mut self, obj: SceneObject) -> PuppetryResult<()> {
        if self.contains(&obj.id) {
            return Err(PuppetryError::validation(format!(
                "duplicate object id '{}'",
                obj.id
            )));
        }
        self.objects.push(obj);
        Ok(())
    }

    /// Create a free-standing object with a fresh id.
    pub fn spawn(&mut self, content: impl Into<String>, category: Category, rect: Rect) -> ObjectId {
        let id = self.fresh_id();
        self.objects
            .push(SceneObject::new(id.clone(), content, category, rect));
        id
    }

    /// Remove and return an object. Children attached to it are left untouched.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| &o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// Objects in draw order: ascending `z_index`, ties in insertion order.
    pub fn draw_order(&self) -> Vec<&SceneObject> {
        let mut out: Vec<&SceneObject> = self.objects.iter().collect();
        out.sort_by_key(|o| o.z_index);
        out
    }

    /// Ids of objects attached directly to `parent`.
    pub fn children_of(&self, parent: &ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| {
                o.attachment_info
                    .as_ref()
                    .is_some_and(|a| &a.parent_id == parent)
            })
            .map(|o| o.id.clone())
            .collect()
    }

    /// Return `true` when `candidate` is `of` or one of the objects `of` hangs from.
    pub fn is_self_or_ancestor(&self, candidate: &ObjectId, of: &ObjectId) -> bool {
        let mut cur = of.clone();
        for _ in 0..=self.objects.len() {
            if &cur == candidate {
                return true;
            }
            match self
                .get(&cur)
                .and_then(|o| o.attachment_info.as_ref())
                .map(|a| a.parent_id.clone())
            {
                Some(parent) => cur = parent,
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
