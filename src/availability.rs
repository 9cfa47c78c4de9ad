//! # Teacher Unavailability Decoding
//!
//! Teachers carry a free-form stored value describing when they must not be
//! scheduled. The stored shape has drifted over time: it may be a JSON array,
//! a JSON-encoded *string* containing an array, NULL, or garbage predating
//! the current schema. This module is the defensive boundary between that
//! store and the strictly-typed solve pipeline: decoding is total and a
//! parse failure degrades to "no exclusions" instead of failing the solve.

use serde::Serialize;
use serde_json::Value;

/// One exclusion record: a weekday and the slot indexes blocked on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unavailability {
    pub day: String,
    pub slot_indexes: Vec<i64>,
}

/// Decodes a stored unavailability value into exclusion records.
///
/// Accepted inputs, best effort:
/// - a JSON array of `{day, slotIndexes}` objects;
/// - a JSON string whose contents are such an array (double-encoded rows);
/// - anything else, including NULL and malformed JSON, yielding `[]`.
///
/// Array elements without a string `day` are dropped whole; slot indexes
/// that are not integral JSON numbers are dropped individually without
/// invalidating their record.
pub fn parse_unavailability(raw: Option<&str>) -> Vec<Unavailability> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let Ok(mut value) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    // One level of string indirection: rows written by older tooling hold
    // the array JSON-encoded inside a string column.
    if let Value::String(inner) = &value {
        match serde_json::from_str::<Value>(inner) {
            Ok(v) => value = v,
            Err(_) => return Vec::new(),
        }
    }
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for item in items {
        let Value::Object(map) = item else {
            continue;
        };
        let Some(day) = map.get("day").and_then(Value::as_str) else {
            continue;
        };
        let slot_indexes = match map.get("slotIndexes") {
            Some(Value::Array(slots)) => slots.iter().filter_map(Value::as_i64).collect(),
            _ => Vec::new(),
        };
        result.push(Unavailability {
            day: day.to_string(),
            slot_indexes,
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(records: &[Unavailability]) -> Vec<&str> {
        records.iter().map(|r| r.day.as_str()).collect()
    }

    #[test]
    fn absent_and_empty_values_decode_to_nothing() {
        assert!(parse_unavailability(None).is_empty());
        assert!(parse_unavailability(Some("")).is_empty());
        assert!(parse_unavailability(Some("   ")).is_empty());
    }

    #[test]
    fn non_array_shapes_decode_to_nothing() {
        assert!(parse_unavailability(Some("null")).is_empty());
        assert!(parse_unavailability(Some("{\"day\":\"MON\"}")).is_empty());
        assert!(parse_unavailability(Some("42")).is_empty());
        assert!(parse_unavailability(Some("not json at all")).is_empty());
    }

    #[test]
    fn plain_array_decodes() {
        let got = parse_unavailability(Some(
            r#"[{"day":"MON","slotIndexes":[1,2]},{"day":"FRI","slotIndexes":[6]}]"#,
        ));
        assert_eq!(
            got,
            vec![
                Unavailability {
                    day: "MON".into(),
                    slot_indexes: vec![1, 2]
                },
                Unavailability {
                    day: "FRI".into(),
                    slot_indexes: vec![6]
                },
            ]
        );
    }

    #[test]
    fn double_encoded_array_decodes() {
        // The array itself stored as a JSON string.
        let raw = r#""[{\"day\":\"TUE\",\"slotIndexes\":[3]}]""#;
        let got = parse_unavailability(Some(raw));
        assert_eq!(days(&got), vec!["TUE"]);
        assert_eq!(got[0].slot_indexes, vec![3]);
    }

    #[test]
    fn double_encoded_garbage_decodes_to_nothing() {
        assert!(parse_unavailability(Some(r#""not an array""#)).is_empty());
    }

    #[test]
    fn records_without_a_string_day_are_dropped() {
        let got = parse_unavailability(Some(
            r#"[{"slotIndexes":[1]},{"day":7,"slotIndexes":[2]},"MON",{"day":"WED","slotIndexes":[4]}]"#,
        ));
        assert_eq!(days(&got), vec!["WED"]);
    }

    #[test]
    fn non_integral_slot_indexes_are_dropped_individually() {
        let got = parse_unavailability(Some(
            r#"[{"day":"MON","slotIndexes":[1,"two",2.5,3,null]}]"#,
        ));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].slot_indexes, vec![1, 3]);
    }

    #[test]
    fn missing_slot_list_keeps_the_day_with_no_slots() {
        let got = parse_unavailability(Some(r#"[{"day":"THU"}]"#));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].day, "THU");
        assert!(got[0].slot_indexes.is_empty());
    }
}
