//! Rescue request lifecycle and resource allocation.
//!
//! [`RequestCoordinator`] is the entry point for every request operation;
//! [`ResourceRegistry`] owns the team, vehicle and supply inventory.

mod access;
pub mod allocation;
pub mod commands;
pub mod coordinator;
pub mod lifecycle;
pub mod notes;
pub mod registry;
mod telemetry;
pub mod tracking;

pub use allocation::{AssignmentPlan, AssignmentResult, ReleaseOutcome, SupplyLine};
pub use commands::{
    AssignTask, CancelRequest, ConfirmCompletion, MediaUpload, NewSupply, NewTeam, NewVehicle,
    ProgressUpdate, SubmitReceipt, SubmitRequest, TeamUpdate, VerifyRequest,
};
pub use coordinator::RequestCoordinator;
pub use registry::ResourceRegistry;
pub use tracking::PublicStatusView;
