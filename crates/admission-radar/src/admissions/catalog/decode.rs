use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

use super::super::domain::{DataDefect, DefectKind, Institution, ProgramUnit};

/// Catalog decoded record by record. Malformed institutions and units are
/// skipped and reported in `defects` instead of failing the whole load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCatalog {
    pub institutions: Vec<Institution>,
    pub defects: Vec<DataDefect>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogDecodeError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog must be a JSON array or an object keyed by institution id, found {0}")]
    UnexpectedShape(&'static str),
}

impl DecodedCatalog {
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogDecodeError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Accepts a list of records or an object keyed by institution id, the
    /// shape the hosted record store exports. `null` is an empty catalog.
    pub fn from_value(raw: Value) -> Result<Self, CatalogDecodeError> {
        let entries: Vec<(Option<String>, Value)> = match raw {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().map(|item| (None, item)).collect(),
            Value::Object(map) => map.into_iter().map(|(key, item)| (Some(key), item)).collect(),
            other => return Err(CatalogDecodeError::UnexpectedShape(json_kind(&other))),
        };

        let mut decoded = DecodedCatalog::default();
        let mut seen = BTreeSet::new();

        for (key, record) in entries {
            let Some(institution) = decode_institution(key, record, &mut decoded.defects) else {
                continue;
            };

            if !seen.insert(institution.id.clone()) {
                decoded.defects.push(DataDefect {
                    institution_id: Some(institution.id.0.clone()),
                    unit_id: None,
                    kind: DefectKind::MalformedInstitution,
                    detail: "duplicate institution id; later record skipped".to_string(),
                });
                continue;
            }

            decoded.defects.extend(institution.quality_warnings());
            decoded.institutions.push(institution);
        }

        for defect in &decoded.defects {
            warn!(
                institution = defect.institution_id.as_deref().unwrap_or("-"),
                unit = defect.unit_id.as_deref().unwrap_or("-"),
                kind = ?defect.kind,
                detail = %defect.detail,
                "catalog data-quality defect"
            );
        }

        Ok(decoded)
    }

    /// Number of records dropped from the snapshot.
    pub fn skipped(&self) -> usize {
        self.defects
            .iter()
            .filter(|defect| defect.kind.skips_record())
            .count()
    }
}

fn decode_institution(
    key: Option<String>,
    record: Value,
    defects: &mut Vec<DataDefect>,
) -> Option<Institution> {
    let mut fields = match record {
        Value::Object(fields) => fields,
        other => {
            defects.push(DataDefect {
                institution_id: key,
                unit_id: None,
                kind: DefectKind::MalformedInstitution,
                detail: format!("expected an object, found {}", json_kind(&other)),
            });
            return None;
        }
    };

    if let Some(key) = key {
        fields.entry("id").or_insert(Value::String(key));
    }
    let id_hint = fields.get("id").and_then(Value::as_str).map(str::to_string);
    let raw_units = fields.remove("units").unwrap_or(Value::Null);

    let mut institution: Institution = match serde_json::from_value(Value::Object(fields)) {
        Ok(institution) => institution,
        Err(err) => {
            defects.push(DataDefect {
                institution_id: id_hint,
                unit_id: None,
                kind: DefectKind::MalformedInstitution,
                detail: err.to_string(),
            });
            return None;
        }
    };

    let unit_records: Vec<Value> = match raw_units {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, item)| item).collect(),
        other => {
            defects.push(DataDefect {
                institution_id: Some(institution.id.0.clone()),
                unit_id: None,
                kind: DefectKind::MalformedUnit,
                detail: format!("units must be a list, found {}", json_kind(&other)),
            });
            Vec::new()
        }
    };

    for (index, raw_unit) in unit_records.into_iter().enumerate() {
        let unit_hint = raw_unit
            .get("unitId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{index}"));

        match serde_json::from_value::<ProgramUnit>(raw_unit) {
            Ok(unit) if institution.unit(&unit.unit_id).is_some() => defects.push(DataDefect {
                institution_id: Some(institution.id.0.clone()),
                unit_id: Some(unit.unit_id),
                kind: DefectKind::MalformedUnit,
                detail: "duplicate unit id; later unit skipped".to_string(),
            }),
            Ok(unit) => institution.units.push(unit),
            Err(err) => defects.push(DataDefect {
                institution_id: Some(institution.id.0.clone()),
                unit_id: Some(unit_hint),
                kind: DefectKind::MalformedUnit,
                detail: err.to_string(),
            }),
        }
    }

    Some(institution)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
