use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use common::metrics::{RESORTS_CREATED_TOTAL, RESORTS_DELETED_TOTAL, RESORTS_REJECTED_TOTAL};
use models::{fold_name, Resort, ResortCandidate, ResortRow, NAME_COLUMN, RESORT_COLUMNS};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::resorts::{DeleteOutcome, ResortRepository};
use crate::storage::csv_table::CsvTable;

/// Ordered list plus name index. Both are only ever mutated together.
#[derive(Debug, Default)]
struct ResortState {
    resorts: Vec<Resort>,
    /// Keyed by the exact stored name.
    index: HashMap<String, Resort>,
}

impl ResortState {
    fn from_resorts(resorts: Vec<Resort>) -> Result<Self, ServiceError> {
        let mut state = Self::default();
        for resort in resorts {
            if let Some(existing) = state.find_key(&resort.name) {
                return Err(ServiceError::Storage(format!(
                    "duplicate resort name `{}` (conflicts with `{existing}`)",
                    resort.name
                )));
            }
            state.push(resort);
        }
        Ok(state)
    }

    /// Case-insensitive lookup returning the stored spelling.
    fn find_key(&self, name: &str) -> Option<String> {
        let folded = fold_name(name);
        self.index.keys().find(|k| fold_name(k) == folded).cloned()
    }

    fn push(&mut self, resort: Resort) {
        self.index.insert(resort.name.clone(), resort.clone());
        self.resorts.push(resort);
    }

    fn remove(&mut self, exact: &str) {
        self.index.remove(exact);
        self.resorts.retain(|r| r.name != exact);
    }
}

/// File-backed resort store.
///
/// The CSV file is the source of truth; the in-memory list and index mirror it.
/// Every mutation holds the state lock across its file I/O and touches the file
/// before memory, so a failed write leaves both sides unchanged.
#[derive(Debug)]
pub struct ResortStore {
    table: CsvTable,
    state: Mutex<ResortState>,
}

impl ResortStore {
    /// Load every row of the backing file. A missing or malformed file is an error.
    #[instrument(skip_all, fields(component = "resort_store"))]
    pub async fn load<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let table = CsvTable::open(path, &RESORT_COLUMNS).await?;
        let rows: Vec<ResortRow> = table.read_all().await?;
        let resorts = rows
            .into_iter()
            .map(Resort::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ServiceError::Storage(format!("{}: {e}", table.path().display())))?;
        let state = ResortState::from_resorts(resorts)?;
        info!(path = %table.path().display(), count = state.resorts.len(), "resorts loaded");
        Ok(Arc::new(Self { table, state: Mutex::new(state) }))
    }

    pub fn path(&self) -> &Path {
        self.table.path()
    }

    /// Snapshot of all resorts in insertion order.
    pub async fn list(&self) -> Vec<Resort> {
        self.state.lock().await.resorts.clone()
    }

    #[instrument(skip_all, fields(component = "resort_store"))]
    pub async fn create(&self, candidate: &ResortCandidate) -> Result<Resort, ServiceError> {
        let resort = candidate.validate().map_err(|e| {
            RESORTS_REJECTED_TOTAL.inc();
            warn!(error = %e, "invalid resort payload");
            ServiceError::from(e)
        })?;

        let mut state = self.state.lock().await;
        if let Some(existing) = state.find_key(&resort.name) {
            RESORTS_REJECTED_TOTAL.inc();
            warn!(name = %resort.name, %existing, "resort name already taken");
            return Err(ServiceError::conflict("resort"));
        }

        self.table.append(&ResortRow::from(&resort)).await?;
        state.push(resort.clone());
        RESORTS_CREATED_TOTAL.inc();
        info!(name = %resort.name, count = state.resorts.len(), "resort created");
        Ok(resort)
    }

    #[instrument(skip(self), fields(component = "resort_store"))]
    pub async fn delete(&self, name: &str) -> Result<DeleteOutcome, ServiceError> {
        let mut state = self.state.lock().await;
        let Some(exact) = state.find_key(name) else {
            info!("resort already deleted");
            return Ok(DeleteOutcome::AlreadyDeleted);
        };

        let dropped = self.table.retain(NAME_COLUMN, |n| n != exact).await?;
        if dropped != 1 {
            warn!(%exact, dropped, "backing file did not hold exactly one row for resort");
        }
        state.remove(&exact);
        RESORTS_DELETED_TOTAL.inc();
        info!(%exact, count = state.resorts.len(), "resort deleted");
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl ResortRepository for ResortStore {
    async fn list(&self) -> Vec<Resort> {
        self.list().await
    }

    async fn create(&self, candidate: &ResortCandidate) -> Result<Resort, ServiceError> {
        self.create(candidate).await
    }

    async fn delete(&self, name: &str) -> Result<DeleteOutcome, ServiceError> {
        self.delete(name).await
    }
}
