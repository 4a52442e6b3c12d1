//! Storage contract for the dispatch core.
//!
//! Reads outside a unit of work go through the per-entity repositories.
//! Anything that mutates a request or a contended resource goes through a
//! [`DispatchTx`] opened with [`DispatchStore::begin`]: loads observe the
//! transaction's own writes, every `save_*` is a compare-and-set on the
//! entity's `version`, and nothing becomes visible until [`DispatchTx::commit`].
//! Dropping a transaction without committing discards all of its writes.

use async_trait::async_trait;
use flood_core::{
    FloodError, RequestId, RequestMedia, RequestSupply, RescueRequest, RescueTeam, Supply,
    SupplyId, TeamId, Vehicle, VehicleId,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("{entity} with {key} already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: String },

    /// The backend aborted the transaction to break a lock cycle or a
    /// serialization conflict. Retrying the whole unit of work may succeed.
    #[error("transaction aborted by the backend: {0}")]
    Aborted(String),

    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<StorageError> for FloodError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::VersionConflict { .. }
            | StorageError::Duplicate { .. }
            | StorageError::Aborted(_) => {
                FloodError::Conflict(err.to_string())
            }
            StorageError::Missing { entity, id } => FloodError::NotFound { entity, key: id },
            StorageError::Backend(message) => FloodError::Internal(message),
        }
    }
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn get(&self, id: RequestId) -> Result<Option<RescueRequest>, StorageError>;
    async fn find_by_tracking_code(
        &self,
        tracking_code: &str,
    ) -> Result<Option<RescueRequest>, StorageError>;
    async fn list(&self, limit: usize, offset: usize)
    -> Result<Vec<RescueRequest>, StorageError>;
    async fn media(&self, id: RequestId) -> Result<Vec<RequestMedia>, StorageError>;
    async fn supply_ledger(&self, id: RequestId) -> Result<Vec<RequestSupply>, StorageError>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn get(&self, id: TeamId) -> Result<Option<RescueTeam>, StorageError>;
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<RescueTeam>, StorageError>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn get(&self, id: VehicleId) -> Result<Option<Vehicle>, StorageError>;
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Vehicle>, StorageError>;
}

#[async_trait]
pub trait SupplyRepository: Send + Sync {
    async fn get(&self, id: SupplyId) -> Result<Option<Supply>, StorageError>;
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Supply>, StorageError>;
}

/// One atomic unit of work against the durable store.
#[async_trait]
pub trait DispatchTx: Send {
    async fn load_request(&mut self, id: RequestId)
    -> Result<Option<RescueRequest>, StorageError>;
    async fn load_team(&mut self, id: TeamId) -> Result<Option<RescueTeam>, StorageError>;
    async fn load_vehicle(&mut self, id: VehicleId) -> Result<Option<Vehicle>, StorageError>;
    async fn load_supply(&mut self, id: SupplyId) -> Result<Option<Supply>, StorageError>;
    async fn tracking_code_exists(&mut self, tracking_code: &str) -> Result<bool, StorageError>;

    async fn insert_request(&mut self, request: &RescueRequest) -> Result<(), StorageError>;
    async fn insert_team(&mut self, team: &RescueTeam) -> Result<(), StorageError>;
    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StorageError>;
    async fn insert_supply(&mut self, supply: &Supply) -> Result<(), StorageError>;

    /// Writes the row if its stored version still equals `request.version`,
    /// then bumps `request.version` to the new stored value.
    async fn save_request(&mut self, request: &mut RescueRequest) -> Result<(), StorageError>;
    async fn save_team(&mut self, team: &mut RescueTeam) -> Result<(), StorageError>;
    async fn save_vehicle(&mut self, vehicle: &mut Vehicle) -> Result<(), StorageError>;
    async fn save_supply(&mut self, supply: &mut Supply) -> Result<(), StorageError>;

    async fn append_supply_ledger(&mut self, entry: &RequestSupply) -> Result<(), StorageError>;
    async fn append_media(&mut self, media: &RequestMedia) -> Result<(), StorageError>;

    async fn commit(&mut self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait DispatchStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn DispatchTx>, StorageError>;
}

/// Everything a coordinator needs from a backend.
pub trait Store:
    DispatchStore + RequestRepository + TeamRepository + VehicleRepository + SupplyRepository
{
}

impl<T> Store for T where
    T: DispatchStore + RequestRepository + TeamRepository + VehicleRepository + SupplyRepository
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use flood_core::ErrorCode;

    #[test]
    fn storage_errors_map_onto_the_dispatch_taxonomy() {
        let conflict: FloodError = StorageError::VersionConflict {
            entity: "team",
            id: "t-1".to_string(),
            expected: 3,
            actual: 4,
        }
        .into();
        assert_eq!(conflict.code(), ErrorCode::Conflict);

        let duplicate: FloodError = StorageError::Duplicate {
            entity: "vehicle",
            key: "name Cano-01".to_string(),
        }
        .into();
        assert_eq!(duplicate.code(), ErrorCode::Conflict);

        let missing: FloodError = StorageError::Missing {
            entity: "supply",
            id: "s-9".to_string(),
        }
        .into();
        assert_eq!(missing.code(), ErrorCode::NotFound);

        let deadlock: FloodError = StorageError::Aborted("deadlock detected".to_string()).into();
        assert_eq!(deadlock.code(), ErrorCode::Conflict);

        let backend: FloodError = StorageError::new("connection reset").into();
        assert_eq!(backend, FloodError::Internal("connection reset".to_string()));
    }
}
