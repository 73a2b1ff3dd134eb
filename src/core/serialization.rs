//! JSON and CSV mapping of item subtrees.
//!
//! JSON objects are keyed by child name and map recursively onto children; value
//! leaves map to JSON scalars. Measures whose active unit is not the first unit of
//! their table serialize as `{"value": .., "unit": ..}` so the unit survives a round
//! trip. CSV uses one `path,value,unit` row per defined leaf; the unit field is empty
//! for leaves without units.

use serde_json::{Map, Value as Json};
use tracing::warn;

use super::{ItemId, Model};
use crate::util::{Error, Result};
use crate::values::Value;

/// Header line written by [`to_csv`] and skipped by [`from_csv`].
const CSV_HEADER: &str = "path,value,unit";
/// Header of unitless files, also accepted by [`from_csv`].
const CSV_HEADER_UNITLESS: &str = "path,value";

/// Serialize an item subtree into JSON.
///
/// Undefined leaves are skipped; an item with nothing to serialize yields `null`.
pub fn serialize(model: &Model, id: ItemId) -> Result<Json> {
    Ok(serialize_inner(model, id)?.unwrap_or(Json::Null))
}

fn serialize_inner(model: &Model, id: ItemId) -> Result<Option<Json>> {
    if let Ok(state) = model.simple(id) {
        let Some(value) = state.get() else {
            return Ok(None);
        };
        let json = value.to_json();
        return Ok(Some(match state.unit() {
            Some(unit) if !std::ptr::eq(unit, &state.units()[0]) => {
                let mut object = Map::new();
                object.insert("value".to_string(), json);
                object.insert("unit".to_string(), Json::String(unit.id.to_string()));
                Json::Object(object)
            }
            _ => json,
        }));
    }

    let mut object = Map::new();
    for child in model.children(id)?.iter() {
        if let Some(json) = serialize_inner(model, *child)? {
            object.insert(model.name(*child)?.to_string(), json);
        }
    }
    Ok((!object.is_empty()).then_some(Json::Object(object)))
}

/// Apply JSON onto an existing item subtree.
///
/// Keys without a matching child are ignored. `null` resets a leaf to its default.
pub fn deserialize(model: &mut Model, id: ItemId, json: &Json) -> Result<()> {
    if let Ok(state) = model.simple(id) {
        let kind = state.kind();
        let is_measure = !state.units().is_empty();
        return match json {
            Json::Null => model.modify_simple(id, |name, v| v.set(name, None)),
            Json::Object(object) if is_measure => {
                let raw = object
                    .get("value")
                    .ok_or_else(|| Error::serialization(model.path(id), "measure object without 'value'"))?;
                let value = Value::from_json(raw, kind)
                    .ok_or_else(|| Error::serialization(model.path(id), format!("expected a {kind}")))?;
                set_value_in(model, id, value, object.get("unit").and_then(Json::as_str))
            }
            _ => {
                let value = Value::from_json(json, kind)
                    .ok_or_else(|| Error::serialization(model.path(id), format!("expected a {kind}, got {json}")))?;
                model.set_value(id, value)
            }
        };
    }

    let Json::Object(object) = json else {
        return Err(Error::serialization(model.path(id), format!("expected an object, got {json}")));
    };
    for (key, value) in object {
        match model.child_by_name(id, key) {
            Some(child) => deserialize(model, child, value)?,
            None => warn!(path = %model.path(id), key = %key, "ignoring unknown key"),
        }
    }
    Ok(())
}

/// Set a leaf value, switching to `unit` first when one is given.
fn set_value_in(model: &mut Model, id: ItemId, value: Value, unit: Option<&str>) -> Result<()> {
    match unit {
        Some(unit) => model.modify_simple(id, |name, v| {
            v.set_unit(name, unit)?;
            v.set(name, Some(value))
        }),
        None => model.set_value(id, value),
    }
}

/// Parse JSON text.
pub fn from_json(text: &str) -> Result<Json> {
    Ok(serde_json::from_str(text)?)
}

/// Serialize an item subtree into JSON text.
pub fn to_json(model: &Model, id: ItemId, pretty: bool) -> Result<String> {
    let json = serialize(model, id)?;
    Ok(if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    })
}

// ============================================================================
// CSV
// ============================================================================

/// One parsed `path,value[,unit]` row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRecord {
    /// 1-based source line.
    pub line: usize,
    pub path: String,
    pub value: String,
    /// Unit of `value`; `None` when the field is missing or empty.
    pub unit: Option<String>,
}

/// Write every defined leaf below `id` as a `path,value,unit` row, header first.
pub fn to_csv(model: &Model, id: ItemId) -> Result<String> {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    let mut prefix = Vec::new();
    write_rows(model, id, &mut prefix, &mut out)?;
    Ok(out)
}

fn write_rows(model: &Model, id: ItemId, prefix: &mut Vec<String>, out: &mut String) -> Result<()> {
    if let Ok(state) = model.simple(id) {
        if let Some(value) = state.get() {
            out.push_str(&quote(&prefix.join("/")));
            out.push(',');
            out.push_str(&quote(&value.to_string()));
            out.push(',');
            if let Some(unit) = state.unit() {
                out.push_str(unit.id);
            }
            out.push('\n');
        }
        return Ok(());
    }
    for child in model.children(id)?.iter() {
        prefix.push(model.name(*child)?.to_string());
        write_rows(model, *child, prefix, out)?;
        prefix.pop();
    }
    Ok(())
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse `path,value` or `path,value,unit` rows. Blank lines and a leading header
/// are skipped.
pub fn from_csv(text: &str) -> Result<Vec<CsvRecord>> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let header = line.trim();
        if records.is_empty()
            && (header.eq_ignore_ascii_case(CSV_HEADER) || header.eq_ignore_ascii_case(CSV_HEADER_UNITLESS))
        {
            continue;
        }
        let mut fields = split_fields(line).map_err(|reason| Error::Csv { line: number, reason })?;
        if !(2..=3).contains(&fields.len()) {
            return Err(Error::Csv {
                line: number,
                reason: format!("expected 2 or 3 fields, found {}", fields.len()),
            });
        }
        let unit = (if fields.len() == 3 { fields.pop() } else { None })
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let value = fields.pop().unwrap_or_default();
        let path = fields.pop().unwrap_or_default();
        if path.trim().is_empty() {
            return Err(Error::Csv { line: number, reason: "empty path".to_string() });
        }
        records.push(CsvRecord {
            line: number,
            path: path.trim().to_string(),
            value,
            unit,
        });
    }
    Ok(records)
}

fn split_fields(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, c) => field.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

/// Parse CSV and apply each row to the leaf at its path below `id`.
///
/// Rows whose path does not resolve are skipped. Returns the number of rows applied.
pub fn deserialize_csv(model: &mut Model, id: ItemId, text: &str) -> Result<usize> {
    let mut applied = 0;
    for record in from_csv(text)? {
        let Some(target) = model.find_path(id, &record.path) else {
            warn!(path = %record.path, line = record.line, "ignoring unknown path");
            continue;
        };
        let kind = match model.simple(target) {
            Ok(state) => state.kind(),
            Err(_) => {
                return Err(Error::Csv {
                    line: record.line,
                    reason: format!("'{}' is not a value", record.path),
                })
            }
        };
        let value = Value::parse(&record.value, kind).ok_or_else(|| Error::Csv {
            line: record.line,
            reason: format!("'{}' is not a {kind}", record.value),
        })?;
        set_value_in(model, target, value, record.unit.as_deref()).map_err(|e| Error::Csv {
            line: record.line,
            reason: e.to_string(),
        })?;
        applied += 1;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::names;
    use crate::values::{Boolean, Distance, Number, Text};
    use serde_json::json;

    fn sample() -> (Model, ItemId) {
        let mut model = Model::new();
        let root = model.create(None, names::ITEM, "root").unwrap();
        Number::create(&mut model, Some(root), "count", 3.0).unwrap();
        Boolean::create(&mut model, Some(root), "enabled", true).unwrap();
        let nested = model.create(Some(root), names::ITEM, "nested").unwrap();
        Text::create(&mut model, Some(nested), "label", "a,b").unwrap();
        Distance::create(&mut model, Some(nested), "height", 1500.0).unwrap();
        (model, root)
    }

    #[test]
    fn test_serialize_structure() {
        let (model, root) = sample();
        let json = serialize(&model, root).unwrap();
        assert_eq!(
            json,
            json!({"count": 3.0, "enabled": true, "nested": {"label": "a,b", "height": 1500.0}})
        );
    }

    #[test]
    fn test_deserialize_ignores_unknown_and_accepts_units() {
        let (mut model, root) = sample();
        let json = json!({"count": 4, "bogus": 1, "nested": {"height": {"value": 2, "unit": "km"}}});
        deserialize(&mut model, root, &json).unwrap();

        let count = Number::from_item(&model, model.find_path(root, "count").unwrap()).unwrap();
        assert_eq!(count.get(&model).unwrap(), 4.0);
        let height = Distance::from_item(&model, model.find_path(root, "nested/height").unwrap()).unwrap();
        assert_eq!(height.unit(&model).unwrap(), "kilometers");
        assert!((height.meters(&model).unwrap() - 2000.0).abs() < 1e-9);

        let json = serialize(&model, root).unwrap();
        assert_eq!(json["nested"]["height"], json!({"value": 2.0, "unit": "kilometers"}));
    }

    #[test]
    fn test_deserialize_type_mismatch() {
        let (mut model, root) = sample();
        let err = deserialize(&mut model, root, &json!({"enabled": "yes"})).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(deserialize(&mut model, root, &json!(5)).is_err());
    }

    #[test]
    fn test_csv_roundtrip_with_quotes() {
        let (mut model, root) = sample();
        let csv = to_csv(&model, root).unwrap();
        assert!(csv.starts_with("path,value,unit\n"));
        assert!(csv.contains("nested/label,\"a,b\",\n"));
        assert!(csv.contains("nested/height,1500,meters\n"));

        let edited = csv.replace("count,3,", "count,7,").replace("\"a,b\"", "\"say \"\"hi\"\"\"");
        assert_eq!(deserialize_csv(&mut model, root, &edited).unwrap(), 4);
        let label = Text::from_item(&model, model.find_path(root, "nested/label").unwrap()).unwrap();
        assert_eq!(label.get(&model).unwrap(), "say \"hi\"");
        let count = Number::from_item(&model, model.find_path(root, "count").unwrap()).unwrap();
        assert_eq!(count.get(&model).unwrap(), 7.0);
    }

    #[test]
    fn test_csv_errors_carry_line() {
        let (mut model, root) = sample();
        let err = from_csv("path,value\ncount,1,m,2\n").unwrap_err();
        assert!(matches!(err, Error::Csv { line: 2, .. }));
        let err = from_csv("\"open,1").unwrap_err();
        assert!(matches!(err, Error::Csv { line: 1, .. }));
        let err = deserialize_csv(&mut model, root, "count,abc").unwrap_err();
        assert!(matches!(err, Error::Csv { line: 1, .. }));
        assert_eq!(deserialize_csv(&mut model, root, "missing/leaf,1").unwrap(), 0);
        let err = deserialize_csv(&mut model, root, "count,1,km").unwrap_err();
        assert!(matches!(err, Error::Csv { line: 1, .. }));
    }

    #[test]
    fn test_csv_keeps_units() {
        let (mut model, root) = sample();
        let height = Distance::from_item(&model, model.find_path(root, "nested/height").unwrap()).unwrap();
        height.set_unit(&mut model, "km").unwrap();
        height.set(&mut model, 2.0).unwrap();
        let csv = to_csv(&model, root).unwrap();
        assert!(csv.contains("nested/height,2,kilometers\n"));

        let (mut other, other_root) = sample();
        deserialize_csv(&mut other, other_root, &csv).unwrap();
        let copy = Distance::from_item(&other, other.find_path(other_root, "nested/height").unwrap()).unwrap();
        assert_eq!(copy.unit(&other).unwrap(), "kilometers");
        assert!((copy.meters(&other).unwrap() - 2000.0).abs() < 1e-9);

        let records = from_csv("path,value\ncount,5\n").unwrap();
        assert_eq!(records[0].unit, None);
    }
}
