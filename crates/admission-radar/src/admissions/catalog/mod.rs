//! Catalog record store seam and the snapshot channel stores publish through.

mod decode;
mod memory;
mod seed;

pub use decode::{CatalogDecodeError, DecodedCatalog};
pub use memory::InMemoryCatalogStore;
pub use seed::default_institutions;

use std::sync::Arc;

use tokio::sync::watch;

use super::domain::{Institution, InstitutionId};

/// Storage abstraction over the institution catalog.
pub trait CatalogStore: Send + Sync {
    /// Current full catalog, in no particular order.
    fn list(&self) -> Result<Vec<Institution>, CatalogError>;
    /// Insert or replace the record keyed by `institution.id`.
    fn put(&self, institution: Institution) -> Result<(), CatalogError>;
    /// Replace an existing record.
    fn update(&self, institution: Institution) -> Result<(), CatalogError>;
    fn remove(&self, id: &InstitutionId) -> Result<(), CatalogError>;
    /// Receive a full snapshot after every mutation. Dropping the
    /// subscription unsubscribes.
    fn subscribe(&self) -> CatalogSubscription;
    /// Seed `defaults` only when the store holds no records. Returns whether
    /// seeding happened.
    fn initialize_if_empty(&self, defaults: Vec<Institution>) -> Result<bool, CatalogError>;
}

/// Error enumeration for catalog store failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("institution '{0}' not found")]
    NotFound(InstitutionId),
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),
}

/// Immutable catalog contents as of one store revision.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    revision: u64,
    institutions: Arc<[Institution]>,
}

impl CatalogSnapshot {
    pub fn new(revision: u64, institutions: Vec<Institution>) -> Self {
        Self {
            revision,
            institutions: institutions.into(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }
}

/// Receiving side of a store's snapshot channel.
#[derive(Debug, Clone)]
pub struct CatalogSubscription {
    receiver: watch::Receiver<CatalogSnapshot>,
}

impl CatalogSubscription {
    /// Latest published snapshot, marking it as seen.
    pub fn current(&mut self) -> CatalogSnapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next snapshot. `None` once the store has gone away.
    pub async fn changed(&mut self) -> Option<CatalogSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

/// Sending side shared by store implementations.
#[derive(Debug)]
pub struct SnapshotPublisher {
    sender: watch::Sender<CatalogSnapshot>,
}

impl SnapshotPublisher {
    pub fn new(initial: Vec<Institution>) -> Self {
        let (sender, _) = watch::channel(CatalogSnapshot::new(0, initial));
        Self { sender }
    }

    /// Replace the current snapshot, bumping the revision.
    pub fn publish(&self, institutions: Vec<Institution>) -> CatalogSnapshot {
        self.sender.send_modify(|snapshot| {
            *snapshot = CatalogSnapshot::new(snapshot.revision + 1, institutions);
        });
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> CatalogSubscription {
        CatalogSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
