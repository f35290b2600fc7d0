//! The decoded path record consumed by the path tree.
//!
//! A [`PathRecord`] describes one mapped semantic path: an array of
//! identifiers alternating between class (even index) and property (odd
//! index) roles, an optional trailing datatype property, the group it
//! belongs to, and display metadata. Records are produced by an external
//! parser and are never mutated by this workspace.

use serde::{Deserialize, Serialize};

/// One row of the flat path list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Identifier of this path; group records are referenced by it.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Free-form description shown by presentation layers.
    #[serde(default)]
    pub description: String,
    /// Disabled records are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// `true` for a group (bundle), `false` for a field.
    #[serde(default)]
    pub is_group: bool,
    /// Identifier of the parent group. Empty for top-level groups.
    #[serde(default)]
    pub group_id: String,
    /// Alternating class/property identifiers.
    #[serde(default)]
    pub path_array: Vec<String>,
    /// Datatype property ending the path. Empty when the path ends on a class.
    #[serde(default)]
    pub datatype_property: String,
    /// 1-based position of the disambiguated concept, if any.
    #[serde(default)]
    pub disambiguation: Option<u32>,
    /// Primary sort key among siblings.
    #[serde(default)]
    pub weight: i64,
    /// Position of this record in the original input list.
    #[serde(default)]
    pub index: usize,
    /// Machine name of the bundle this record maps to.
    #[serde(default)]
    pub bundle: String,
    /// Machine name of the field this record maps to.
    #[serde(default)]
    pub field: String,
    /// Field type shown by presentation layers.
    #[serde(default)]
    pub field_type: String,
    /// Maximum number of values, `-1` for unlimited.
    #[serde(default = "default_cardinality")]
    pub cardinality: i64,
}

fn default_enabled() -> bool {
    true
}

fn default_cardinality() -> i64 {
    -1
}

impl PathRecord {
    /// Creates an enabled group record.
    pub fn group(id: &str, group_id: &str, path_array: &[&str]) -> Self {
        PathRecord {
            is_group: true,
            ..PathRecord::new(id, group_id, path_array)
        }
    }

    /// Creates an enabled field record without a datatype property.
    pub fn field(id: &str, group_id: &str, path_array: &[&str]) -> Self {
        PathRecord::new(id, group_id, path_array)
    }

    fn new(id: &str, group_id: &str, path_array: &[&str]) -> Self {
        PathRecord {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            enabled: true,
            is_group: false,
            group_id: group_id.to_string(),
            path_array: path_array.iter().map(|s| s.to_string()).collect(),
            datatype_property: String::new(),
            disambiguation: None,
            weight: 0,
            index: 0,
            bundle: String::new(),
            field: String::new(),
            field_type: String::new(),
            cardinality: -1,
        }
    }

    /// Sets the datatype property.
    pub fn with_datatype(mut self, property: &str) -> Self {
        self.datatype_property = property.to_string();
        self
    }

    /// Sets the 1-based disambiguation position.
    pub fn with_disambiguation(mut self, position: u32) -> Self {
        self.disambiguation = Some(position);
        self
    }

    /// Sets the sibling sort weight.
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the original input position.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Marks the record as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns the datatype property, or `None` if the path ends on a class.
    pub fn datatype(&self) -> Option<&str> {
        if self.datatype_property.is_empty() {
            None
        } else {
            Some(&self.datatype_property)
        }
    }

    /// Returns `true` if this record is a top-level group or names no group.
    pub fn is_top_level(&self) -> bool {
        self.group_id.is_empty()
    }

    /// Path array index of the disambiguated concept.
    ///
    /// `None` when the record has no disambiguation (unset or 0).
    pub fn disambiguation_index(&self) -> Option<usize> {
        match self.disambiguation {
            Some(position) if position > 0 => Some(2 * (position as usize - 1)),
            _ => None,
        }
    }

    /// The class identifier the record singles out for disambiguation.
    pub fn disambiguated_concept(&self) -> Option<&str> {
        self.disambiguation_index()
            .and_then(|i| self.path_array.get(i))
            .map(String::as_str)
    }

    /// Path array index of the last class identifier, if the path has one.
    pub fn last_concept_index(&self) -> Option<usize> {
        match self.path_array.len() {
            0 => None,
            len if len % 2 == 1 => Some(len - 1),
            len => Some(len - 2),
        }
    }

    /// The last class identifier of the path.
    pub fn last_concept(&self) -> Option<&str> {
        self.last_concept_index()
            .map(|i| self.path_array[i].as_str())
    }

    /// Every identifier mentioned by this record, in path order followed by
    /// the datatype property.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.path_array
            .iter()
            .map(String::as_str)
            .chain(self.datatype())
    }

    /// Assigns `index` to every record in input order.
    pub fn number(records: &mut [PathRecord]) {
        for (i, record) in records.iter_mut().enumerate() {
            record.index = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguation_index_is_concept_position() {
        let r = PathRecord::field("f", "g", &["A", "p", "B", "q", "C"]).with_disambiguation(2);
        assert_eq!(r.disambiguation_index(), Some(2));
        assert_eq!(r.disambiguated_concept(), Some("B"));
    }

    #[test]
    fn zero_disambiguation_is_unset() {
        let r = PathRecord::field("f", "g", &["A"]).with_disambiguation(0);
        assert_eq!(r.disambiguation_index(), None);
        assert_eq!(r.disambiguated_concept(), None);
    }

    #[test]
    fn last_concept_handles_odd_and_even_lengths() {
        assert_eq!(PathRecord::group("g", "", &[]).last_concept(), None);
        assert_eq!(PathRecord::group("g", "", &["A", "p", "B"]).last_concept(), Some("B"));
        assert_eq!(PathRecord::group("g", "", &["A", "p"]).last_concept(), Some("A"));
    }

    #[test]
    fn uris_include_datatype() {
        let r = PathRecord::field("f", "g", &["A", "p", "B"]).with_datatype("name");
        let uris: Vec<_> = r.uris().collect();
        assert_eq!(uris, vec!["A", "p", "B", "name"]);
    }

    #[test]
    fn empty_datatype_is_none() {
        let r = PathRecord::field("f", "g", &["A"]);
        assert_eq!(r.datatype(), None);
    }

    #[test]
    fn deserialize_with_defaults() {
        let json = r#"{"id": "f", "group_id": "g", "path_array": ["A"]}"#;
        let r: PathRecord = serde_json::from_str(json).unwrap();
        assert!(r.enabled);
        assert!(!r.is_group);
        assert_eq!(r.cardinality, -1);
        assert_eq!(r.disambiguation, None);
    }

    #[test]
    fn number_assigns_input_positions() {
        let mut records = vec![
            PathRecord::group("a", "", &[]),
            PathRecord::field("b", "a", &[]),
        ];
        PathRecord::number(&mut records);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[1].index, 1);
    }
}
