use crate::emergency::EmergencyLevel;
use crate::ids::{LedgerEntryId, MediaId, RequestId, SupplyId, TeamId, UserId, VehicleId};
use crate::time::EpochMillis;
use flood_geo::RequestLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Verified,
    InProgress,
    Moving,
    Arrived,
    Rescuing,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 8] = [
        Self::Pending,
        Self::Verified,
        Self::InProgress,
        Self::Moving,
        Self::Arrived,
        Self::Rescuing,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses in which a team is out in the field for the request.
    pub fn is_field_execution(&self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::Moving | Self::Arrived | Self::Rescuing
        )
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Pending | Self::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::InProgress => "IN_PROGRESS",
            Self::Moving => "MOVING",
            Self::Arrived => "ARRIVED",
            Self::Rescuing => "RESCUING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamStatus {
    Available,
    Busy,
    OffDuty,
}

impl Default for TeamStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Busy => "BUSY",
            Self::OffDuty => "OFF_DUTY",
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
    Unavailable,
}

impl Default for VehicleStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InUse => "IN_USE",
            Self::Maintenance => "MAINTENANCE",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplyType {
    FoodWater,
    Medical,
    Equipment,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

/// A citizen's call for help and everything the coordinators attach to it.
///
/// Resources are referenced by id only; the request never owns the team,
/// vehicle or supply rows it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueRequest {
    pub id: RequestId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub emergency_level: EmergencyLevel,
    pub people_count: u32,
    pub status: RequestStatus,
    pub tracking_code: String,
    pub contact_name: String,
    pub contact_phone: String,
    #[serde(default)]
    pub citizen_id: Option<UserId>,
    #[serde(default)]
    pub verified_by: Option<UserId>,
    #[serde(default)]
    pub assigned_team_id: Option<TeamId>,
    #[serde(default)]
    pub assigned_vehicle_id: Option<VehicleId>,
    /// Newline-delimited `[HH:MM dd/MM - author]: text` entries, append-only.
    #[serde(default)]
    pub coordinator_note: Option<String>,
    #[serde(default)]
    pub citizen_feedback: Option<String>,
    #[serde(default)]
    pub citizen_rating: Option<u8>,
    #[serde(default)]
    pub location: Option<RequestLocation>,
    pub created_at_ms: EpochMillis,
    pub updated_at_ms: EpochMillis,
    #[serde(default)]
    pub completed_at_ms: Option<EpochMillis>,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueTeam {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
    pub status: TeamStatus,
    #[serde(default)]
    pub leader_id: Option<UserId>,
    #[serde(default)]
    pub member_ids: Vec<UserId>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    pub created_at_ms: EpochMillis,
    pub updated_at_ms: EpochMillis,
    #[serde(default)]
    pub version: u64,
}

impl RescueTeam {
    pub fn is_led_by(&self, user_id: UserId) -> bool {
        self.leader_id == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub vehicle_type: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    pub status: VehicleStatus,
    #[serde(default)]
    pub current_team_id: Option<TeamId>,
    pub created_at_ms: EpochMillis,
    pub updated_at_ms: EpochMillis,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    pub id: SupplyId,
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
    pub created_at_ms: EpochMillis,
    pub updated_at_ms: EpochMillis,
    #[serde(default)]
    pub version: u64,
}

/// Stock handed out to a request. Never reversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSupply {
    pub id: LedgerEntryId,
    pub request_id: RequestId,
    pub supply_id: SupplyId,
    pub quantity: u32,
    pub recorded_at_ms: EpochMillis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMedia {
    pub id: MediaId,
    pub request_id: RequestId,
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub uploaded_by: Option<UserId>,
    pub uploaded_at_ms: EpochMillis,
}
