use flood_config::{DispatchConfig, ServiceConfig, StorageBackend};
use flood_dispatch::{RequestCoordinator, ResourceRegistry};
use flood_policy::{BasicPolicyEngine, PolicyEngine};
use flood_storage::{StorageError, Store};
use flood_storage_memory::MemoryStore;
use flood_storage_postgres::{PostgresConfig, PostgresStore};
use std::sync::Arc;

pub struct AppState {
    pub config: ServiceConfig,
    pub coordinator: RequestCoordinator<dyn Store>,
    pub registry: ResourceRegistry<dyn Store>,
}

impl AppState {
    pub fn new(config: ServiceConfig, store: Arc<dyn Store>, dispatch: DispatchConfig) -> Self {
        let policy: Arc<dyn PolicyEngine> = Arc::new(BasicPolicyEngine::with_default_rules());
        Self {
            coordinator: RequestCoordinator::new(store.clone(), policy.clone(), dispatch),
            registry: ResourceRegistry::new(store, policy),
            config,
        }
    }

    pub async fn connect(
        config: ServiceConfig,
        dispatch: DispatchConfig,
    ) -> Result<Self, StorageError> {
        let store: Arc<dyn Store> = match config.storage_backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Postgres => {
                Arc::new(PostgresStore::connect(&PostgresConfig::from_env()).await?)
            }
        };
        Ok(Self::new(config, store, dispatch))
    }
}
