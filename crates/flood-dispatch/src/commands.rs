//! Inputs to coordinator and registry operations.

use flood_core::{
    EmergencyLevel, EpochMillis, MediaKind, RequestId, RequestStatus, SupplyType, TeamId, UserId,
    VehicleId, VehicleStatus,
};
use flood_geo::RequestLocation;
use serde::{Deserialize, Serialize};

use crate::allocation::SupplyLine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emergency_level: EmergencyLevel,
    #[serde(default = "default_people_count")]
    pub people_count: u32,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub location: Option<RequestLocation>,
    #[serde(default)]
    pub media: Vec<MediaUpload>,
}

fn default_people_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub request_id: RequestId,
    pub tracking_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub emergency_level: Option<EmergencyLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignTask {
    pub team_id: TeamId,
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    #[serde(default)]
    pub supplies: Vec<SupplyLine>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub emergency_level: Option<EmergencyLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub status: RequestStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmCompletion {
    pub tracking_code: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub leader_id: Option<UserId>,
    #[serde(default)]
    pub member_ids: Vec<UserId>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Partial edit of a team. Absent fields are left alone; `member_ids` are
/// added to the current roster rather than replacing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub leader_id: Option<UserId>,
    #[serde(default)]
    pub member_ids: Vec<UserId>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub name: String,
    pub vehicle_type: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSupply {
    pub name: String,
    pub supply_type: SupplyType,
    pub quantity: u32,
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub imported_at_ms: Option<EpochMillis>,
    #[serde(default)]
    pub exported_at_ms: Option<EpochMillis>,
    #[serde(default)]
    pub expires_at_ms: Option<EpochMillis>,
}
