use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::super::domain::{Institution, InstitutionId};
use super::{CatalogError, CatalogStore, CatalogSubscription, SnapshotPublisher};

/// Process-local catalog keyed by institution id.
#[derive(Debug)]
pub struct InMemoryCatalogStore {
    records: Mutex<BTreeMap<InstitutionId, Institution>>,
    publisher: SnapshotPublisher,
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::from_institutions(Vec::new())
    }
}

impl InMemoryCatalogStore {
    pub fn from_institutions(institutions: Vec<Institution>) -> Self {
        let records: BTreeMap<InstitutionId, Institution> = institutions
            .into_iter()
            .map(|institution| (institution.id.clone(), institution))
            .collect();
        let publisher = SnapshotPublisher::new(records.values().cloned().collect());

        Self {
            records: Mutex::new(records),
            publisher,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.publisher.subscriber_count()
    }

    fn records(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<InstitutionId, Institution>>, CatalogError> {
        self.records
            .lock()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn publish(&self, records: &BTreeMap<InstitutionId, Institution>) {
        self.publisher.publish(records.values().cloned().collect());
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn list(&self) -> Result<Vec<Institution>, CatalogError> {
        Ok(self.records()?.values().cloned().collect())
    }

    fn put(&self, institution: Institution) -> Result<(), CatalogError> {
        let mut records = self.records()?;
        records.insert(institution.id.clone(), institution);
        self.publish(&records);
        Ok(())
    }

    fn update(&self, institution: Institution) -> Result<(), CatalogError> {
        let mut records = self.records()?;
        match records.get_mut(&institution.id) {
            Some(existing) => *existing = institution,
            None => return Err(CatalogError::NotFound(institution.id)),
        }
        self.publish(&records);
        Ok(())
    }

    fn remove(&self, id: &InstitutionId) -> Result<(), CatalogError> {
        let mut records = self.records()?;
        if records.remove(id).is_none() {
            return Err(CatalogError::NotFound(id.clone()));
        }
        self.publish(&records);
        Ok(())
    }

    fn subscribe(&self) -> CatalogSubscription {
        self.publisher.subscribe()
    }

    fn initialize_if_empty(&self, defaults: Vec<Institution>) -> Result<bool, CatalogError> {
        let mut records = self.records()?;
        if !records.is_empty() || defaults.is_empty() {
            return Ok(false);
        }

        records.extend(
            defaults
                .into_iter()
                .map(|institution| (institution.id.clone(), institution)),
        );
        self.publish(&records);
        Ok(true)
    }
}
