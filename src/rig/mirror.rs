use std::collections::{BTreeMap, HashMap};

use crate::foundation::error::{PuppetryError, PuppetryResult};
use crate::rig::metadata::{RigMetadata, Side};

/// Symmetric lookup table of bilateral part pairs (`left-arm <-> right-arm`).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct MirrorTable {
    pairs: BTreeMap<String, String>,
}

impl MirrorTable {
    /// An empty table: every part mirrors to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from unordered pairs, validating symmetry once.
    ///
    /// Rejects self-pairs and ids that appear in more than one pair.
    pub fn from_pairs<A, B>(pairs: impl IntoIterator<Item = (A, B)>) -> PuppetryResult<Self>
    where
        A: Into<String>,
        B: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (a, b) in pairs {
            let (a, b) = (a.into(), b.into());
            if a == b {
                return Err(PuppetryError::validation(format!(
                    "part '{a}' cannot mirror itself"
                )));
            }
            for id in [&a, &b] {
                if table.contains_key(id) {
                    return Err(PuppetryError::validation(format!(
                        "part '{id}' appears in more than one mirror pair"
                    )));
                }
            }
            table.insert(a.clone(), b.clone());
            table.insert(b, a);
        }
        Ok(Self { pairs: table })
    }

    /// Derive pairs from declared sides.
    ///
    /// Two parts pair when they declare opposite sides and share a pairing key: the declared role,
    /// or else the id with its side token removed (`left-forearm` and `forearm_right` both key to
    /// `forearm`). Ambiguous keys are skipped.
    pub fn from_rig(meta: &RigMetadata) -> Self {
        let mut by_key: HashMap<(String, Side), Vec<&str>> = HashMap::new();
        for part in &meta.parts {
            let Some(side) = part.side else {
                continue;
            };
            let key = part
                .role
                .clone()
                .unwrap_or_else(|| strip_side_token(&part.id, side));
            by_key.entry((key, side)).or_default().push(part.id.as_str());
        }

        let mut keys: Vec<&(String, Side)> = by_key.keys().filter(|(_, s)| *s == Side::Left).collect();
        keys.sort();

        let mut pairs = Vec::new();
        for left_key in keys {
            let lefts = &by_key[left_key];
            let Some(rights) = by_key.get(&(left_key.0.clone(), Side::Right)) else {
                continue;
            };
            if lefts.len() != 1 || rights.len() != 1 {
                tracing::warn!(key = %left_key.0, "ambiguous mirror pairing skipped");
                continue;
            }
            pairs.push((lefts[0], rights[0]));
        }

        match Self::from_pairs(pairs) {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(%err, "mirror table derivation failed; mirroring disabled");
                Self::empty()
            }
        }
    }

    /// Mirrored counterpart of `part`, if it is paired.
    pub fn mirror(&self, part: &str) -> Option<&str> {
        self.pairs.get(part).map(String::as_str)
    }

    /// `mirror(part)`, or `part` itself when unpaired.
    pub fn mirror_or_self<'a>(&'a self, part: &'a str) -> &'a str {
        self.mirror(part).unwrap_or(part)
    }

    /// Number of paired ids (twice the number of pairs).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Return `true` when no pairs are defined.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn strip_side_token(id: &str, side: Side) -> String {
    let token = side.token();
    id.split(['-', '_'])
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(token))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[path = "../../tests/unit/rig/mirror.rs"]
mod tests;
