pub mod domain;
pub mod emergency;
pub mod error;
pub mod ids;
pub mod time;

pub use domain::{
    MediaKind, RequestMedia, RequestStatus, RequestSupply, RescueRequest, RescueTeam, Supply,
    SupplyType, TeamStatus, Vehicle, VehicleStatus,
};
pub use emergency::EmergencyLevel;
pub use error::{ErrorCode, FloodError, FloodResult, ResourceKind};
pub use ids::{LedgerEntryId, MediaId, RequestId, SupplyId, TeamId, UserId, VehicleId};
pub use time::{format_note_timestamp, now_epoch_millis, EpochMillis};
