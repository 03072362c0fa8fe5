use crate::foundation::error::PuppetryResult;
use crate::scene::model::SceneObject;
use crate::timeline::model::TimelineState;

/// Persisted document: scene objects plus the timeline.
///
/// Playback position, the playing flag and the viewport are live editor state and are not part
/// of the document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub timeline: TimelineState,
}

impl DocumentSnapshot {
    pub fn to_json(&self) -> PuppetryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a document.
    pub fn from_json(json: &str) -> PuppetryResult<Self> {
        let mut doc: Self = serde_json::from_str(json)?;
        doc.timeline.validate()?;
        Ok(doc)
    }
}
