use crate::otlp::Flattened;
use crate::rows::{RowSet, TableMap};

/// Collects flattened entities of one batch into per-table row slices.
///
/// Rows keep the order in which entities were added. Tables are independent
/// streams: nothing is merged, deduplicated or reordered across them.
#[derive(Debug, Default)]
pub struct RecordAggregator {
    rows: RowSet,
    entities: usize,
    dropped_attributes: u64,
}

impl RecordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flattened: Flattened) {
        self.entities += 1;
        self.dropped_attributes += flattened.dropped_attributes;
        self.rows.append(flattened.rows);
    }

    /// Number of root entities added so far.
    pub fn entities(&self) -> usize {
        self.entities
    }

    pub fn dropped_attributes(&self) -> u64 {
        self.dropped_attributes
    }

    pub fn total_rows(&self) -> usize {
        self.rows.total_rows()
    }

    /// Table map without empty tables.
    pub fn finish(self) -> TableMap {
        let mut tables = self.rows.into_tables();
        tables.retain(|_, rows| !rows.is_empty());
        tables
    }
}

/// Aggregate a whole batch of flattened entities in one call.
pub fn aggregate(outputs: impl IntoIterator<Item = Flattened>) -> TableMap {
    let mut aggregator = RecordAggregator::new();
    for output in outputs {
        aggregator.add(output);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{AttributeOwner, AttributeRow, Row};
    use crate::table::Table;
    use crate::value::TaggedValue;
    use uuid::Uuid;

    fn entity(keys: &[&str]) -> Flattened {
        let root_id = Uuid::new_v4();
        let mut rows = RowSet::new();
        for key in keys {
            rows.push(
                Table::LogAttribute,
                AttributeRow {
                    owner: AttributeOwner::Log { log_id: root_id },
                    key: key.to_string(),
                    value: TaggedValue::string("v"),
                },
            );
        }
        Flattened {
            root_id,
            rows,
            dropped_attributes: 1,
        }
    }

    #[test]
    fn concatenates_in_arrival_order() {
        let first = entity(&["a", "b"]);
        let second = entity(&["c"]);
        let expected_owners = vec![first.root_id, first.root_id, second.root_id];

        let mut aggregator = RecordAggregator::new();
        aggregator.add(first);
        aggregator.add(second);
        assert_eq!(aggregator.entities(), 2);
        assert_eq!(aggregator.dropped_attributes(), 2);
        assert_eq!(aggregator.total_rows(), 3);

        let tables = aggregator.finish();
        let rows = &tables[&Table::LogAttribute];
        let keys: Vec<_> = rows
            .iter()
            .map(|row| match row {
                Row::Attribute(attr) => attr.key.as_str(),
                other => panic!("unexpected row {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let owners: Vec<_> = rows
            .iter()
            .map(|row| match row {
                Row::Attribute(attr) => attr.owner.owner_id(),
                other => panic!("unexpected row {other:?}"),
            })
            .collect();
        assert_eq!(owners, expected_owners);
    }

    #[test]
    fn empty_tables_are_omitted() {
        let tables = aggregate(vec![entity(&[]), entity(&[])]);
        assert!(tables.is_empty());
    }
}
