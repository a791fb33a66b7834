//! Duplicate detection across an import batch
//!
//! Reported duplicates are advisory. A batch with duplicates can still be
//! committed.

use super::ImportRow;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// One duplicated key and every spreadsheet row carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup<K> {
    pub key: K,
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub seals: Vec<DuplicateGroup<i64>>,
    pub permits: Vec<DuplicateGroup<String>>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.seals.is_empty() && self.permits.is_empty()
    }
}

/// Find repeated seals and permits
///
/// Every occurrence of a repeated key is listed, the first one included.
/// Groups appear in order of first occurrence. Rows without a seal take no
/// part in the seal check.
pub fn find_duplicates(rows: &[ImportRow]) -> DuplicateReport {
    let seals = group_repeated(rows.iter().filter_map(|r| r.shipment.seal.map(|s| (s, r.row_number))));
    let permits = group_repeated(rows.iter().map(|r| (r.shipment.permit.clone(), r.row_number)));

    DuplicateReport { seals, permits }
}

fn group_repeated<K>(keyed: impl Iterator<Item = (K, usize)>) -> Vec<DuplicateGroup<K>>
where
    K: Eq + Hash + Clone,
{
    let mut groups: Vec<DuplicateGroup<K>> = Vec::new();
    let mut positions: HashMap<K, usize> = HashMap::new();

    for (key, row) in keyed {
        match positions.get(&key) {
            Some(&pos) => groups[pos].rows.push(row),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup { key, rows: vec![row] });
            }
        }
    }

    groups.retain(|g| g.rows.len() > 1);
    groups
}
