#![allow(dead_code)]

use flood_config::DispatchConfig;
use flood_core::{
    EmergencyLevel, RequestId, RescueRequest, RescueTeam, Supply, SupplyId, SupplyType, TeamId,
    UserId, Vehicle, VehicleId,
};
use flood_dispatch::{
    NewSupply, NewTeam, NewVehicle, RequestCoordinator, ResourceRegistry, SubmitReceipt,
    SubmitRequest, VerifyRequest,
};
use flood_identity::{Actor, Role};
use flood_policy::BasicPolicyEngine;
use flood_storage::{RequestRepository, SupplyRepository, TeamRepository, VehicleRepository};
use flood_storage_memory::MemoryStore;
use std::sync::Arc;

pub fn actor(name: &str, roles: Vec<Role>) -> Actor {
    Actor::new(UserId::new(), name, roles)
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub coordinator: RequestCoordinator<MemoryStore>,
    pub registry: ResourceRegistry<MemoryStore>,
    pub dispatcher: Actor,
    pub manager: Actor,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let policy = Arc::new(BasicPolicyEngine::with_default_rules());
        Self {
            coordinator: RequestCoordinator::new(
                store.clone(),
                policy.clone(),
                DispatchConfig::default(),
            ),
            registry: ResourceRegistry::new(store.clone(), policy),
            store,
            dispatcher: actor("Lan", vec![Role::Coordinator]),
            manager: actor("Minh", vec![Role::Manager]),
        }
    }

    pub async fn submit(&self, title: &str) -> SubmitReceipt {
        self.coordinator
            .submit(
                SubmitRequest {
                    title: title.to_string(),
                    description: Some("water rising on the ground floor".to_string()),
                    emergency_level: EmergencyLevel::High,
                    people_count: 3,
                    contact_name: Some("Hoa".to_string()),
                    contact_phone: Some("0901234567".to_string()),
                    location: None,
                    media: Vec::new(),
                },
                None,
            )
            .await
            .unwrap()
    }

    pub async fn submit_verified(&self, title: &str) -> SubmitReceipt {
        let receipt = self.submit(title).await;
        self.coordinator
            .verify(receipt.request_id, VerifyRequest::default(), &self.dispatcher)
            .await
            .unwrap();
        receipt
    }

    pub async fn team(&self, name: &str, leader: Option<&Actor>) -> RescueTeam {
        self.registry
            .register_team(
                NewTeam {
                    name: name.to_string(),
                    description: None,
                    leader_id: leader.map(|leader| leader.user_id),
                    member_ids: leader.map(|leader| vec![leader.user_id]).unwrap_or_default(),
                    contact_phone: Some("0911000000".to_string()),
                },
                &self.manager,
            )
            .await
            .unwrap()
    }

    pub async fn vehicle(&self, name: &str) -> Vehicle {
        self.registry
            .register_vehicle(
                NewVehicle {
                    name: name.to_string(),
                    vehicle_type: "boat".to_string(),
                    license_plate: None,
                    capacity: Some(6),
                    status: None,
                },
                &self.manager,
            )
            .await
            .unwrap()
    }

    pub async fn supply(&self, name: &str, quantity: u32) -> Supply {
        self.registry
            .register_supply(
                NewSupply {
                    name: name.to_string(),
                    supply_type: SupplyType::FoodWater,
                    quantity,
                    unit: "box".to_string(),
                    description: None,
                    imported_at_ms: None,
                    exported_at_ms: None,
                    expires_at_ms: None,
                },
                &self.manager,
            )
            .await
            .unwrap()
    }

    pub async fn request(&self, id: RequestId) -> RescueRequest {
        RequestRepository::get(&*self.store, id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn team_now(&self, id: TeamId) -> RescueTeam {
        TeamRepository::get(&*self.store, id).await.unwrap().unwrap()
    }

    pub async fn vehicle_now(&self, id: VehicleId) -> Vehicle {
        VehicleRepository::get(&*self.store, id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn supply_now(&self, id: SupplyId) -> Supply {
        SupplyRepository::get(&*self.store, id)
            .await
            .unwrap()
            .unwrap()
    }
}
