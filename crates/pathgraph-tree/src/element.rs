//! Decomposition of a path record into typed elements.
//!
//! Each identifier of a record's path array becomes a [`PathElement`]:
//! even indices are concepts (classes), odd indices are properties. Fields
//! with a datatype property get one extra synthetic [`ElementRole::Datatype`]
//! element at index `path_array.len()`.
//!
//! Two signed offsets are attached to every element:
//!
//! - `common`: `index - shared`, where `shared` is the length of the prefix
//!   the path has in common with the parent's own path. Negative values mean
//!   the element still lies inside that shared prefix. `None` when nothing
//!   is shared.
//! - `disambiguation`: `index - d`, where `d` is the path index of the
//!   record's disambiguated concept. `None` when the record has none.

use serde::Serialize;

use pathgraph_core::PathRecord;

/// The role an element plays in its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementRole {
    /// A class identifier (even index).
    Concept,
    /// An object property identifier (odd index).
    Property,
    /// The trailing datatype property of a field.
    Datatype,
}

/// One element of a decomposed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathElement<'a> {
    pub role: ElementRole,
    pub uri: &'a str,
    /// Position in the path array; `path_array.len()` for the datatype slot.
    pub index: usize,
    pub common: Option<isize>,
    pub disambiguation: Option<isize>,
}

impl PathElement<'_> {
    /// Returns `true` while the element lies within the prefix shared with
    /// the parent's path.
    pub fn is_inherited(&self) -> bool {
        matches!(self.common, Some(c) if c < 0)
    }

    /// Position among the concepts of the path (`index / 2`).
    pub fn concept_index(&self) -> usize {
        self.index / 2
    }
}

/// Length of the element-wise common prefix of two paths.
pub fn common_prefix_len(a: &[String], b: &[String]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Decomposes `record` into elements relative to `parent_path`.
///
/// The datatype element is appended only when `with_datatype` is set and
/// the record has a datatype property.
pub fn decompose<'a>(
    record: &'a PathRecord,
    parent_path: &[String],
    with_datatype: bool,
) -> Vec<PathElement<'a>> {
    let shared = common_prefix_len(&record.path_array, parent_path);
    let disambiguation = record.disambiguation_index();

    let offsets = |index: usize| {
        let common = (shared > 0).then(|| index as isize - shared as isize);
        let disambiguation = disambiguation.map(|d| index as isize - d as isize);
        (common, disambiguation)
    };

    let mut elements: Vec<PathElement<'a>> = record
        .path_array
        .iter()
        .enumerate()
        .map(|(index, uri)| {
            let (common, disambiguation) = offsets(index);
            PathElement {
                role: if index % 2 == 0 {
                    ElementRole::Concept
                } else {
                    ElementRole::Property
                },
                uri: uri.as_str(),
                index,
                common,
                disambiguation,
            }
        })
        .collect();

    if with_datatype {
        if let Some(datatype) = record.datatype() {
            let index = record.path_array.len();
            let (common, disambiguation) = offsets(index);
            elements.push(PathElement {
                role: ElementRole::Datatype,
                uri: datatype,
                index,
                common,
                disambiguation,
            });
        }
    }

    elements
}
