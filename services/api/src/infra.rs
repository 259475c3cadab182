use admission_radar::admissions::{
    default_institutions, wire, CatalogStore, DecodedCatalog, InMemoryCatalogStore, StatusFilter,
};
use admission_radar::config::CatalogConfig;
use admission_radar::error::AppError;
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read a catalog export, skipping malformed records.
pub(crate) fn load_catalog_file(path: &Path) -> Result<DecodedCatalog, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let decoded = DecodedCatalog::from_json_str(&raw)?;
    info!(
        path = %path.display(),
        institutions = decoded.institutions.len(),
        skipped = decoded.skipped(),
        "catalog file loaded"
    );
    Ok(decoded)
}

/// Hydrate the process-local store from the configured file, then seed the
/// built-in catalog if it is still empty and seeding is enabled.
pub(crate) fn build_store(config: &CatalogConfig) -> Result<InMemoryCatalogStore, AppError> {
    let store = match &config.source_path {
        Some(path) => {
            InMemoryCatalogStore::from_institutions(load_catalog_file(path)?.institutions)
        }
        None => InMemoryCatalogStore::default(),
    };

    if config.seed_defaults && store.initialize_if_empty(default_institutions())? {
        info!("catalog seeded with built-in institutions");
    }
    if store.list()?.is_empty() {
        warn!("catalog is empty; every match will return no institutions");
    }

    Ok(store)
}

pub(crate) fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    wire::parse_instant(raw)
}

pub(crate) fn parse_status(raw: &str) -> Result<StatusFilter, String> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_now_accepts_dates_and_instants() {
        let midnight = Utc
            .with_ymd_and_hms(2025, 9, 1, 0, 0, 0)
            .single()
            .expect("valid instant");
        assert_eq!(parse_now("2025-09-01"), Ok(midnight));
        assert_eq!(parse_now("2025-09-01T00:00:00Z"), Ok(midnight));
        assert!(parse_now("next tuesday").is_err());
    }

    #[test]
    fn build_store_seeds_when_enabled() {
        let config = CatalogConfig {
            admin_emails: Vec::new(),
            seed_defaults: true,
            source_path: None,
        };

        let store = build_store(&config).expect("store builds");

        assert_eq!(store.list().expect("list").len(), default_institutions().len());
    }

    #[test]
    fn build_store_can_start_empty() {
        let config = CatalogConfig {
            admin_emails: Vec::new(),
            seed_defaults: false,
            source_path: None,
        };

        let store = build_store(&config).expect("store builds");

        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn missing_catalog_files_are_io_errors() {
        let error = load_catalog_file(Path::new("/nonexistent/catalog.json"))
            .expect_err("missing file");

        assert!(matches!(error, AppError::Io(_)));
    }
}
