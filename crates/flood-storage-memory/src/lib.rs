use async_trait::async_trait;
use flood_core::{
    RequestId, RequestMedia, RequestSupply, RescueRequest, RescueTeam, Supply, SupplyId, TeamId,
    Vehicle, VehicleId,
};
use flood_storage::{
    DispatchStore, DispatchTx, RequestRepository, StorageError, SupplyRepository, TeamRepository,
    VehicleRepository,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

const ENTITY_REQUEST: &str = "rescue request";
const ENTITY_TEAM: &str = "rescue team";
const ENTITY_VEHICLE: &str = "vehicle";
const ENTITY_SUPPLY: &str = "supply";

#[derive(Debug, Clone, Default)]
struct Tables {
    requests: HashMap<RequestId, RescueRequest>,
    teams: HashMap<TeamId, RescueTeam>,
    vehicles: HashMap<VehicleId, Vehicle>,
    supplies: HashMap<SupplyId, Supply>,
    ledger: Vec<RequestSupply>,
    media: Vec<RequestMedia>,
}

/// Process-local store with serializable transactions.
///
/// Writers queue on a single async mutex and work on a private copy of the
/// committed tables; readers only ever see committed state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Arc<RwLock<Tables>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, StorageError> {
        let tables = self
            .committed
            .read()
            .map_err(|_| StorageError::new("memory store lock poisoned"))?;
        Ok(f(&tables))
    }
}

pub struct MemoryTx {
    _writer: OwnedMutexGuard<()>,
    committed: Arc<RwLock<Tables>>,
    working: Tables,
    finished: bool,
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("memory transaction dropped without commit, discarding writes");
        }
    }
}

#[async_trait]
impl DispatchStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn DispatchTx>, StorageError> {
        let writer = self.writer.clone().lock_owned().await;
        let working = self.read(Clone::clone)?;
        Ok(Box::new(MemoryTx {
            _writer: writer,
            committed: self.committed.clone(),
            working,
            finished: false,
        }))
    }
}

fn check_version(
    entity: &'static str,
    id: impl ToString,
    stored: Option<u64>,
    expected: u64,
) -> Result<(), StorageError> {
    match stored {
        None => Err(StorageError::Missing {
            entity,
            id: id.to_string(),
        }),
        Some(actual) if actual != expected => Err(StorageError::VersionConflict {
            entity,
            id: id.to_string(),
            expected,
            actual,
        }),
        Some(_) => Ok(()),
    }
}

fn duplicate(entity: &'static str, key: impl Into<String>) -> StorageError {
    StorageError::Duplicate {
        entity,
        key: key.into(),
    }
}

impl MemoryTx {
    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.finished {
            return Err(StorageError::new("transaction already committed"));
        }
        Ok(())
    }
}

#[async_trait]
impl DispatchTx for MemoryTx {
    async fn load_request(
        &mut self,
        id: RequestId,
    ) -> Result<Option<RescueRequest>, StorageError> {
        self.ensure_open()?;
        Ok(self.working.requests.get(&id).cloned())
    }

    async fn load_team(&mut self, id: TeamId) -> Result<Option<RescueTeam>, StorageError> {
        self.ensure_open()?;
        Ok(self.working.teams.get(&id).cloned())
    }

    async fn load_vehicle(&mut self, id: VehicleId) -> Result<Option<Vehicle>, StorageError> {
        self.ensure_open()?;
        Ok(self.working.vehicles.get(&id).cloned())
    }

    async fn load_supply(&mut self, id: SupplyId) -> Result<Option<Supply>, StorageError> {
        self.ensure_open()?;
        Ok(self.working.supplies.get(&id).cloned())
    }

    async fn tracking_code_exists(&mut self, tracking_code: &str) -> Result<bool, StorageError> {
        self.ensure_open()?;
        Ok(self
            .working
            .requests
            .values()
            .any(|request| request.tracking_code.eq_ignore_ascii_case(tracking_code)))
    }

    async fn insert_request(&mut self, request: &RescueRequest) -> Result<(), StorageError> {
        self.ensure_open()?;
        if self.working.requests.contains_key(&request.id) {
            return Err(duplicate(ENTITY_REQUEST, format!("id {}", request.id)));
        }
        if self.tracking_code_exists(&request.tracking_code).await? {
            return Err(duplicate(
                ENTITY_REQUEST,
                format!("tracking code {}", request.tracking_code),
            ));
        }
        self.working.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn insert_team(&mut self, team: &RescueTeam) -> Result<(), StorageError> {
        self.ensure_open()?;
        if self.working.teams.contains_key(&team.id) {
            return Err(duplicate(ENTITY_TEAM, format!("id {}", team.id)));
        }
        if self.working.teams.values().any(|other| other.name == team.name) {
            return Err(duplicate(ENTITY_TEAM, format!("name {}", team.name)));
        }
        self.working.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StorageError> {
        self.ensure_open()?;
        if self.working.vehicles.contains_key(&vehicle.id) {
            return Err(duplicate(ENTITY_VEHICLE, format!("id {}", vehicle.id)));
        }
        if self
            .working
            .vehicles
            .values()
            .any(|other| other.name == vehicle.name)
        {
            return Err(duplicate(ENTITY_VEHICLE, format!("name {}", vehicle.name)));
        }
        self.working.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn insert_supply(&mut self, supply: &Supply) -> Result<(), StorageError> {
        self.ensure_open()?;
        if self.working.supplies.contains_key(&supply.id) {
            return Err(duplicate(ENTITY_SUPPLY, format!("id {}", supply.id)));
        }
        self.working.supplies.insert(supply.id, supply.clone());
        Ok(())
    }

    async fn save_request(&mut self, request: &mut RescueRequest) -> Result<(), StorageError> {
        self.ensure_open()?;
        let stored = self.working.requests.get(&request.id).map(|row| row.version);
        check_version(ENTITY_REQUEST, request.id, stored, request.version)?;
        request.version += 1;
        self.working.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn save_team(&mut self, team: &mut RescueTeam) -> Result<(), StorageError> {
        self.ensure_open()?;
        let stored = self.working.teams.get(&team.id).map(|row| row.version);
        check_version(ENTITY_TEAM, team.id, stored, team.version)?;
        if self
            .working
            .teams
            .values()
            .any(|other| other.id != team.id && other.name == team.name)
        {
            return Err(duplicate(ENTITY_TEAM, format!("name {}", team.name)));
        }
        team.version += 1;
        self.working.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn save_vehicle(&mut self, vehicle: &mut Vehicle) -> Result<(), StorageError> {
        self.ensure_open()?;
        let stored = self.working.vehicles.get(&vehicle.id).map(|row| row.version);
        check_version(ENTITY_VEHICLE, vehicle.id, stored, vehicle.version)?;
        if self
            .working
            .vehicles
            .values()
            .any(|other| other.id != vehicle.id && other.name == vehicle.name)
        {
            return Err(duplicate(ENTITY_VEHICLE, format!("name {}", vehicle.name)));
        }
        vehicle.version += 1;
        self.working.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn save_supply(&mut self, supply: &mut Supply) -> Result<(), StorageError> {
        self.ensure_open()?;
        let stored = self.working.supplies.get(&supply.id).map(|row| row.version);
        check_version(ENTITY_SUPPLY, supply.id, stored, supply.version)?;
        supply.version += 1;
        self.working.supplies.insert(supply.id, supply.clone());
        Ok(())
    }

    async fn append_supply_ledger(&mut self, entry: &RequestSupply) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.working.ledger.push(entry.clone());
        Ok(())
    }

    async fn append_media(&mut self, media: &RequestMedia) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.working.media.push(media.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut committed = self
            .committed
            .write()
            .map_err(|_| StorageError::new("memory store lock poisoned"))?;
        *committed = std::mem::take(&mut self.working);
        self.finished = true;
        Ok(())
    }
}

fn page<T: Clone>(rows: Vec<&T>, limit: usize, offset: usize) -> Vec<T> {
    rows.into_iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn get(&self, id: RequestId) -> Result<Option<RescueRequest>, StorageError> {
        self.read(|tables| tables.requests.get(&id).cloned())
    }

    async fn find_by_tracking_code(
        &self,
        tracking_code: &str,
    ) -> Result<Option<RescueRequest>, StorageError> {
        self.read(|tables| {
            tables
                .requests
                .values()
                .find(|request| request.tracking_code.eq_ignore_ascii_case(tracking_code))
                .cloned()
        })
    }

    async fn list(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RescueRequest>, StorageError> {
        self.read(|tables| {
            let mut rows: Vec<&RescueRequest> = tables.requests.values().collect();
            rows.sort_by(|a, b| {
                b.created_at_ms
                    .cmp(&a.created_at_ms)
                    .then_with(|| a.tracking_code.cmp(&b.tracking_code))
            });
            page(rows, limit, offset)
        })
    }

    async fn media(&self, id: RequestId) -> Result<Vec<RequestMedia>, StorageError> {
        self.read(|tables| {
            tables
                .media
                .iter()
                .filter(|media| media.request_id == id)
                .cloned()
                .collect()
        })
    }

    async fn supply_ledger(&self, id: RequestId) -> Result<Vec<RequestSupply>, StorageError> {
        self.read(|tables| {
            tables
                .ledger
                .iter()
                .filter(|entry| entry.request_id == id)
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn get(&self, id: TeamId) -> Result<Option<RescueTeam>, StorageError> {
        self.read(|tables| tables.teams.get(&id).cloned())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<RescueTeam>, StorageError> {
        self.read(|tables| {
            let mut rows: Vec<&RescueTeam> = tables.teams.values().collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            page(rows, limit, offset)
        })
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn get(&self, id: VehicleId) -> Result<Option<Vehicle>, StorageError> {
        self.read(|tables| tables.vehicles.get(&id).cloned())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Vehicle>, StorageError> {
        self.read(|tables| {
            let mut rows: Vec<&Vehicle> = tables.vehicles.values().collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            page(rows, limit, offset)
        })
    }
}

#[async_trait]
impl SupplyRepository for MemoryStore {
    async fn get(&self, id: SupplyId) -> Result<Option<Supply>, StorageError> {
        self.read(|tables| tables.supplies.get(&id).cloned())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Supply>, StorageError> {
        self.read(|tables| {
            let mut rows: Vec<&Supply> = tables.supplies.values().collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.unit.cmp(&b.unit)));
            page(rows, limit, offset)
        })
    }
}
