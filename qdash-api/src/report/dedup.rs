//! Deduplicator: one record per unit identifier, the most recent one

use qdash_common::EventRecord;
use std::collections::HashMap;
use tracing::debug;

/// Collapse records sharing a unit identifier down to the latest one
///
/// Single linear pass over an identifier → slot map. Records without a unit
/// identifier are dropped. Output keeps the order in which identifiers were first
/// seen, so running it twice yields the same sequence.
pub fn dedup_latest(records: Vec<EventRecord>) -> Vec<EventRecord> {
    let total = records.len();
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(total);
    let mut kept: Vec<EventRecord> = Vec::with_capacity(total);
    let mut duplicates = 0usize;

    for record in records {
        let Some(unit_id) = record.unit_id.clone() else {
            continue;
        };

        match slots.get(&unit_id) {
            Some(&slot) => {
                duplicates += 1;
                if supersedes(&record, &kept[slot]) {
                    kept[slot] = record;
                }
            }
            None => {
                slots.insert(unit_id, kept.len());
                kept.push(record);
            }
        }
    }

    if duplicates > 0 {
        debug!(
            total,
            unique = kept.len(),
            duplicates,
            "Deduplicated records by unit id"
        );
    }

    kept
}

/// Whether `candidate` replaces `current` for the same unit
///
/// A valid later timestamp wins; a valid timestamp beats a missing one. Equal or
/// missing timestamps fall back to the source table name: the lexicographically
/// greater (or same) table wins, so within one table the later row wins.
fn supersedes(candidate: &EventRecord, current: &EventRecord) -> bool {
    match (candidate.recorded_at, current.recorded_at) {
        (Some(new), Some(old)) if new != old => new > old,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        _ => candidate.source_table >= current.source_table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdash_common::time::parse_timestamp;
    use qdash_common::ResultCode;

    fn record(table: &str, unit: Option<&str>, at: Option<&str>, result: ResultCode) -> EventRecord {
        EventRecord {
            source_table: table.to_string(),
            unit_id: unit.map(str::to_string),
            recorded_at: at.and_then(parse_timestamp),
            car_type: None,
            result: Some(result),
            errtype: None,
        }
    }

    #[test]
    fn test_later_timestamp_wins() {
        let records = vec![
            record("t", Some("A"), Some("2024-05-02 10:00:00"), ResultCode::Ok),
            record("t", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ng),
        ];
        let unique = dedup_latest(records);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].result, Some(ResultCode::Ok));

        let records = vec![
            record("t", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ng),
            record("t", Some("A"), Some("2024-05-02 10:00:00"), ResultCode::Ok),
        ];
        assert_eq!(dedup_latest(records)[0].result, Some(ResultCode::Ok));
    }

    #[test]
    fn test_missing_unit_id_dropped() {
        let records = vec![
            record("t", None, Some("2024-05-02 10:00:00"), ResultCode::Ok),
            record("t", Some("B"), None, ResultCode::Ok),
        ];
        let unique = dedup_latest(records);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].unit_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_valid_timestamp_beats_missing() {
        let records = vec![
            record("t", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ok),
            record("t", Some("A"), None, ResultCode::Ng),
        ];
        assert_eq!(dedup_latest(records)[0].result, Some(ResultCode::Ok));

        let records = vec![
            record("t", Some("A"), None, ResultCode::Ng),
            record("t", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ok),
        ];
        assert_eq!(dedup_latest(records)[0].result, Some(ResultCode::Ok));
    }

    #[test]
    fn test_tie_prefers_later_table_then_later_row() {
        // Equal timestamps: the greater table name wins regardless of scan order
        let records = vec![
            record("b", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ng),
            record("a", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ok),
        ];
        assert_eq!(dedup_latest(records)[0].source_table, "b");

        // Missing timestamps within one table: last row wins
        let records = vec![
            record("a", Some("A"), None, ResultCode::Ok),
            record("a", Some("A"), None, ResultCode::Ng),
        ];
        assert_eq!(dedup_latest(records)[0].result, Some(ResultCode::Ng));
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let records = vec![
            record("t", Some("B"), Some("2024-05-01 10:00:00"), ResultCode::Ok),
            record("t", Some("A"), Some("2024-05-01 11:00:00"), ResultCode::Ok),
            record("t", Some("B"), Some("2024-05-03 10:00:00"), ResultCode::Ng),
        ];
        let unique = dedup_latest(records);
        let ids: Vec<&str> = unique.iter().map(|r| r.unit_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(unique[0].result, Some(ResultCode::Ng));
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            record("b", Some("A"), None, ResultCode::Ok),
            record("a", Some("A"), Some("2024-05-01 10:00:00"), ResultCode::Ng),
            record("a", Some("C"), Some("2024-05-02 10:00:00"), ResultCode::Ok),
            record("a", None, Some("2024-05-02 10:00:00"), ResultCode::Ok),
            record("c", Some("C"), Some("2024-05-02 10:00:00"), ResultCode::Ng),
        ];
        let once = dedup_latest(records);
        let twice = dedup_latest(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
