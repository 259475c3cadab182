use tracing::error;

use super::super::domain::Institution;
use super::DecodedCatalog;

const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

/// Built-in catalog used to seed an empty store.
pub fn default_institutions() -> Vec<Institution> {
    match DecodedCatalog::from_json_str(DEFAULT_CATALOG) {
        Ok(decoded) => decoded.institutions,
        Err(err) => {
            error!(%err, "built-in catalog failed to decode");
            Vec::new()
        }
    }
}
