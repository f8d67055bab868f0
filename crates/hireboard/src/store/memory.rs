use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::query::compare_values;
use super::{RecordId, RecordKind, RecordPage, RecordQuery, RecordStore, StoreError, StoredRecord};

/// In-memory record store backing the service in this build. The hosted
/// backend the original credentials point at is swapped out for per-kind
/// tables behind a mutex; identifiers are kind-prefixed sequence numbers so
/// insertion order stays readable in logs and fixtures.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: Mutex<HashMap<RecordKind, BTreeMap<String, StoredRecord>>>,
    sequence: AtomicU64,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, kind: RecordKind) -> RecordId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        RecordId(format!("{}-{id:06}", kind.prefix()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch(&self, kind: RecordKind, query: &RecordQuery) -> Result<RecordPage, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        let mut matches: Vec<StoredRecord> = tables
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|record| query.filters.iter().all(|f| f.matches(&record.fields)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            matches.sort_by(|a, b| {
                let ordering = match (a.fields.get(&order.field), b.fields.get(&order.field)) {
                    (Some(left), Some(right)) => {
                        compare_values(left, right).unwrap_or(std::cmp::Ordering::Equal)
                    }
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let total = matches.len();
        let records: Vec<StoredRecord> = matches
            .into_iter()
            .skip(query.paging.offset)
            .take(query.paging.limit)
            .map(|record| project(record, &query.fields))
            .collect();

        Ok(RecordPage { records, total })
    }

    fn get(&self, kind: RecordKind, id: &RecordId) -> Result<Option<StoredRecord>, StoreError> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.get(&kind).and_then(|table| table.get(&id.0)).cloned())
    }

    fn create(&self, kind: RecordKind, mut fields: Value) -> Result<StoredRecord, StoreError> {
        let id = self.next_id(kind);
        if let Some(map) = fields.as_object_mut() {
            map.insert("id".to_string(), Value::String(id.0.clone()));
        }

        let record = StoredRecord {
            id: id.clone(),
            revision: 1,
            fields,
        };

        let mut tables = self.tables.lock().expect("store mutex poisoned");
        tables
            .entry(kind)
            .or_default()
            .insert(id.0, record.clone());
        Ok(record)
    }

    fn update(
        &self,
        kind: RecordKind,
        id: &RecordId,
        expected_revision: u64,
        mut fields: Value,
    ) -> Result<StoredRecord, StoreError> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let table = tables.entry(kind).or_default();
        let current = table.get(&id.0).ok_or(StoreError::NotFound)?;

        if current.revision != expected_revision {
            return Err(StoreError::RevisionMismatch {
                expected: expected_revision,
                actual: current.revision,
            });
        }

        if let Some(map) = fields.as_object_mut() {
            map.insert("id".to_string(), Value::String(id.0.clone()));
        }

        let record = StoredRecord {
            id: id.clone(),
            revision: current.revision + 1,
            fields,
        };
        table.insert(id.0.clone(), record.clone());
        Ok(record)
    }
}

/// Apply a field projection; an empty selection returns the full record.
/// The identifier column is always kept.
fn project(record: StoredRecord, fields: &[String]) -> StoredRecord {
    if fields.is_empty() {
        return record;
    }

    let projected = match record.fields.as_object() {
        Some(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() == "id" || fields.iter().any(|f| f == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        None => record.fields.clone(),
    };

    StoredRecord {
        fields: projected,
        ..record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Filter;
    use serde_json::json;

    #[test]
    fn create_assigns_prefixed_ids_and_first_revision() {
        let store = InMemoryRecordStore::new();
        let record = store
            .create(RecordKind::Job, json!({ "title": "Backend Engineer" }))
            .expect("create succeeds");

        assert!(record.id.0.starts_with("job-"));
        assert_eq!(record.revision, 1);
        assert_eq!(record.fields["id"], json!(record.id.0));
    }

    #[test]
    fn update_is_compare_and_swap_on_revision() {
        let store = InMemoryRecordStore::new();
        let record = store
            .create(RecordKind::Job, json!({ "views": 0 }))
            .expect("create succeeds");

        let updated = store
            .update(RecordKind::Job, &record.id, 1, json!({ "views": 1 }))
            .expect("first writer wins");
        assert_eq!(updated.revision, 2);

        match store.update(RecordKind::Job, &record.id, 1, json!({ "views": 5 })) {
            Err(StoreError::RevisionMismatch { expected: 1, actual: 2 }) => {}
            other => panic!("expected revision mismatch, got {other:?}"),
        }
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        match store.update(
            RecordKind::User,
            &RecordId("usr-999999".to_string()),
            1,
            json!({}),
        ) {
            Err(StoreError::NotFound) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn fetch_filters_orders_and_pages() {
        let store = InMemoryRecordStore::new();
        for (title, views) in [("a", 3), ("b", 1), ("c", 2), ("d", 9)] {
            store
                .create(
                    RecordKind::Job,
                    json!({ "title": title, "views": views, "status": "active" }),
                )
                .expect("create succeeds");
        }
        store
            .create(RecordKind::Job, json!({ "title": "e", "status": "deleted" }))
            .expect("create succeeds");

        let page = store
            .fetch(
                RecordKind::Job,
                &RecordQuery::new()
                    .filter(Filter::eq("status", "active"))
                    .order_desc("views")
                    .page(1, 2),
            )
            .expect("fetch succeeds");

        assert_eq!(page.total, 4);
        let titles: Vec<_> = page
            .records
            .iter()
            .map(|r| r.fields["title"].as_str().expect("title").to_string())
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn projection_keeps_requested_fields_and_id() {
        let store = InMemoryRecordStore::new();
        store
            .create(
                RecordKind::Job,
                json!({ "title": "a", "company": "Acme", "description": "long text" }),
            )
            .expect("create succeeds");

        let page = store
            .fetch(RecordKind::Job, &RecordQuery::new().select(&["title"]))
            .expect("fetch succeeds");

        let fields = page.records[0].fields.as_object().expect("object fields");
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("id"));
        assert!(!fields.contains_key("description"));
    }

    #[test]
    fn kinds_do_not_share_tables() {
        let store = InMemoryRecordStore::new();
        store
            .create(RecordKind::Job, json!({ "title": "a" }))
            .expect("create succeeds");

        let page = store
            .fetch(RecordKind::Application, &RecordQuery::new())
            .expect("fetch succeeds");
        assert_eq!(page.total, 0);
    }
}
