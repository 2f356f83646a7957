//! Shaping of raw store records into typed results.
//!
//! Pure functions, no I/O. Outer joins in the store queries can leave `null`
//! placeholders in name and relationship collections; they are dropped here so
//! they never reach a `MovieDetail`. Collection order coming from the store is
//! kept as is.
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::{ExportSource, MovieDetail, MovieProps, MovieSummary, RelatedPerson, RelationKind};
use crate::db::Record;
use crate::errors::{ExplorerError, Result};

fn field<'r>(record: &'r Record, key: &str) -> &'r Value {
    record.get(key).unwrap_or(&Value::Null)
}

fn required_str(record: &Record, key: &str) -> Result<String> {
    match field(record, key) {
        Value::String(s) => Ok(s.clone()),
        other => Err(ExplorerError::Decode(format!("field '{key}' must be a string, got {other}"))),
    }
}

fn optional_str(record: &Record, key: &str) -> Result<Option<String>> {
    match field(record, key) {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(ExplorerError::Decode(format!("field '{key}' must be a string, got {other}"))),
    }
}

fn optional_year(record: &Record, key: &str) -> Result<Option<i64>> {
    match field(record, key) {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ExplorerError::Decode(format!("field '{key}' must be an integer, got {n}"))),
        other => Err(ExplorerError::Decode(format!("field '{key}' must be an integer, got {other}"))),
    }
}

/// Names from a collected list, nulls removed, first occurrence kept.
fn name_list(record: &Record, key: &str) -> Result<Vec<String>> {
    let items = match field(record, key) {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ExplorerError::Decode(format!("field '{key}' must be a list, got {other}")))
        }
    };
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Null => {}
            Value::String(name) => {
                if seen.insert(name.as_str()) {
                    out.push(name.clone());
                }
            }
            other => {
                return Err(ExplorerError::Decode(format!(
                    "entries of '{key}' must be strings, got {other}"
                )))
            }
        }
    }
    Ok(out)
}

fn relation_list(record: &Record, key: &str, expected: RelationKind) -> Result<Vec<RelatedPerson>> {
    let items = match field(record, key) {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ExplorerError::Decode(format!("field '{key}' must be a list, got {other}")))
        }
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if item.is_null() {
            out.push(RelatedPerson::placeholder(expected));
            continue;
        }
        let rel: RelatedPerson = serde_json::from_value(item.clone())
            .map_err(|e| ExplorerError::Decode(format!("entry of '{key}': {e}")))?;
        if rel.kind != expected {
            return Err(ExplorerError::Decode(format!(
                "entry of '{key}' has relationship {} instead of {expected}",
                rel.kind
            )));
        }
        out.push(rel);
    }
    Ok(out)
}

/// Descending by year; movies without a year go last.
#[must_use]
pub fn compare_release_desc(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort, so equal years keep the order the store returned.
pub fn order_by_release_desc(movies: &mut [MovieSummary]) {
    movies.sort_by(|a, b| compare_release_desc(a.released_year, b.released_year));
}

/// # Errors
/// `ExplorerError::Decode` when `title` is missing or a field has the wrong type.
pub fn summary_from_record(record: &Record) -> Result<MovieSummary> {
    Ok(MovieSummary {
        title: required_str(record, "title")?,
        released_year: optional_year(record, "released")?,
        tagline: optional_str(record, "tagline")?,
    })
}

/// Map search rows and apply the documented release ordering.
///
/// # Errors
/// `ExplorerError::Decode` if any row is malformed.
pub fn summaries_from_records(records: &[Record]) -> Result<Vec<MovieSummary>> {
    let mut out = records.iter().map(summary_from_record).collect::<Result<Vec<_>>>()?;
    order_by_release_desc(&mut out);
    Ok(out)
}

/// # Errors
/// `ExplorerError::Decode` if the record does not have the detail shape.
pub fn detail_from_record(record: &Record) -> Result<MovieDetail> {
    Ok(MovieDetail {
        title: required_str(record, "title")?,
        released_year: optional_year(record, "released")?,
        tagline: optional_str(record, "tagline")?,
        directors: name_list(record, "directors")?,
        actors: name_list(record, "actors")?,
    })
}

/// # Errors
/// `ExplorerError::Decode` if the movie map or a relationship entry is malformed.
pub fn export_source_from_record(record: &Record) -> Result<ExportSource> {
    let movie: MovieProps = serde_json::from_value(field(record, "m").clone())
        .map_err(|e| ExplorerError::Decode(format!("field 'm': {e}")))?;
    Ok(ExportSource {
        movie,
        directors: relation_list(record, "director_rels", RelationKind::Directed)?,
        actors: relation_list(record, "actor_rels", RelationKind::ActedIn)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(map) => map,
            _ => panic!("record fixture must be an object"),
        }
    }

    #[test]
    fn detail_drops_null_placeholders() {
        let r = record(json!({
            "title": "Unknown Soldier",
            "released": null,
            "tagline": null,
            "directors": [null],
            "actors": ["Keanu Reeves", null, "Carrie-Anne Moss"]
        }));
        let d = detail_from_record(&r).unwrap();
        assert!(d.directors.is_empty());
        assert_eq!(d.actors, vec!["Keanu Reeves", "Carrie-Anne Moss"]);
        assert_eq!(d.released_year, None);
    }

    #[test]
    fn detail_keeps_store_order_and_first_occurrence() {
        let r = record(json!({
            "title": "X",
            "released": 2000,
            "directors": ["Zed", "Amy", "Zed"],
            "actors": []
        }));
        let d = detail_from_record(&r).unwrap();
        assert_eq!(d.directors, vec!["Zed", "Amy"]);
        assert_eq!(d.tagline, None);
    }

    #[test]
    fn wrong_types_are_decode_errors() {
        let r = record(json!({ "title": 12, "released": 1999 }));
        assert!(matches!(summary_from_record(&r), Err(ExplorerError::Decode(_))));
        let r = record(json!({ "title": "A", "released": "1999" }));
        assert!(matches!(summary_from_record(&r), Err(ExplorerError::Decode(_))));
        let r = record(json!({ "title": "A", "directors": [1] }));
        assert!(matches!(detail_from_record(&r), Err(ExplorerError::Decode(_))));
    }

    #[test]
    fn missing_years_sort_last() {
        let rows = vec![
            record(json!({ "title": "undated", "released": null })),
            record(json!({ "title": "old", "released": 1990 })),
            record(json!({ "title": "new", "released": 2010 })),
            record(json!({ "title": "also old", "released": 1990 })),
        ];
        let out = summaries_from_records(&rows).unwrap();
        let titles: Vec<&str> = out.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old", "also old", "undated"]);
    }

    #[test]
    fn export_source_keeps_placeholders_and_rejects_mismatched_kind() {
        let r = record(json!({
            "m": { "title": "Solo", "released": 2001, "tagline": "alone" },
            "director_rels": [{ "person": null, "rel": "DIRECTED" }],
            "actor_rels": [{ "person": { "name": "Ann", "born": 1970 }, "rel": "ACTED_IN" }]
        }));
        let src = export_source_from_record(&r).unwrap();
        assert_eq!(src.movie.title, "Solo");
        assert_eq!(src.directors, vec![RelatedPerson::placeholder(RelationKind::Directed)]);
        assert_eq!(src.actors[0].person.as_ref().map(|p| p.name.as_str()), Some("Ann"));

        let bad = record(json!({
            "m": { "title": "Solo" },
            "director_rels": [{ "person": { "name": "Ann" }, "rel": "ACTED_IN" }]
        }));
        assert!(matches!(export_source_from_record(&bad), Err(ExplorerError::Decode(_))));
    }
}
