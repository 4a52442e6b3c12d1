//! Reserving and releasing the shared resources behind a request.
//!
//! Everything here runs inside the caller's [`DispatchTx`]. A failure part
//! way through leaves earlier writes in the transaction, so callers must
//! drop it instead of committing.

use flood_core::{
    EpochMillis, FloodError, FloodResult, LedgerEntryId, RequestId, RequestStatus, RequestSupply,
    RescueRequest, RescueTeam, ResourceKind, SupplyId, TeamId, TeamStatus, UserId, Vehicle,
    VehicleId, VehicleStatus,
};
use flood_storage::DispatchTx;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyLine {
    pub supply_id: SupplyId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    pub team_id: TeamId,
    pub vehicle_id: Option<VehicleId>,
    pub supplies: Vec<SupplyLine>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub team_released: bool,
    pub vehicle_released: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub request_id: RequestId,
    pub status: RequestStatus,
    pub team_id: TeamId,
    pub vehicle_id: Option<VehicleId>,
    pub consumed: Vec<RequestSupply>,
    /// Resources freed from a previous assignment of the same request.
    pub released: ReleaseOutcome,
}

impl AssignmentResult {
    /// Units drawn across every line. Lines are `u32` each but their total
    /// can exceed it.
    pub fn units_consumed(&self) -> u64 {
        self.consumed
            .iter()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }
}

/// Binds a team, optional vehicle and supplies to `request` and moves it to
/// `IN_PROGRESS`. A request already in the field gives its current team and
/// vehicle back first.
pub async fn assign(
    tx: &mut dyn DispatchTx,
    request: &mut RescueRequest,
    plan: &AssignmentPlan,
    actor: UserId,
    now: EpochMillis,
) -> FloodResult<AssignmentResult> {
    if let Some(line) = plan.supplies.iter().find(|line| line.quantity == 0) {
        return Err(FloodError::InvalidInput(format!(
            "supply {} requested with zero quantity",
            line.supply_id
        )));
    }

    let released = if request.status.is_field_execution() {
        release(tx, request, now).await?
    } else {
        ReleaseOutcome::default()
    };

    let mut team = tx
        .load_team(plan.team_id)
        .await?
        .ok_or_else(|| FloodError::not_found("rescue team", plan.team_id))?;
    ensure_team_available(&team)?;

    let mut vehicle = match plan.vehicle_id {
        Some(vehicle_id) => {
            let vehicle = tx
                .load_vehicle(vehicle_id)
                .await?
                .ok_or_else(|| FloodError::not_found("vehicle", vehicle_id))?;
            ensure_vehicle_available(&vehicle)?;
            Some(vehicle)
        }
        None => None,
    };

    team.status = TeamStatus::Busy;
    team.updated_at_ms = now;
    tx.save_team(&mut team).await?;

    if let Some(vehicle) = vehicle.as_mut() {
        vehicle.status = VehicleStatus::InUse;
        vehicle.current_team_id = Some(team.id);
        vehicle.updated_at_ms = now;
        tx.save_vehicle(vehicle).await?;
    }

    // Supply rows are locked in id order so two assignments naming the same
    // supplies in a different order cannot wait on each other. The sort is
    // stable, so repeated lines still draw against the running balance.
    let mut lines = plan.supplies.clone();
    lines.sort_by_key(|line| line.supply_id);

    let mut consumed = Vec::with_capacity(lines.len());
    for line in &lines {
        let mut supply = tx
            .load_supply(line.supply_id)
            .await?
            .ok_or_else(|| FloodError::not_found("supply", line.supply_id))?;
        if line.quantity > supply.quantity {
            return Err(FloodError::InsufficientStock {
                supply: supply.name,
                requested: line.quantity,
                available: supply.quantity,
            });
        }
        supply.quantity -= line.quantity;
        supply.updated_at_ms = now;
        tx.save_supply(&mut supply).await?;

        let entry = RequestSupply {
            id: LedgerEntryId::new(),
            request_id: request.id,
            supply_id: supply.id,
            quantity: line.quantity,
            recorded_at_ms: now,
        };
        tx.append_supply_ledger(&entry).await?;
        consumed.push(entry);
    }

    request.assigned_team_id = Some(team.id);
    request.assigned_vehicle_id = plan.vehicle_id;
    request.status = RequestStatus::InProgress;
    request.verified_by = Some(actor);
    request.updated_at_ms = now;

    tracing::info!(
        request_id = %request.id,
        team_id = %team.id,
        vehicle_id = ?plan.vehicle_id,
        supply_lines = consumed.len(),
        "resources reserved for request"
    );

    Ok(AssignmentResult {
        request_id: request.id,
        status: request.status,
        team_id: team.id,
        vehicle_id: plan.vehicle_id,
        consumed,
        released,
    })
}

/// Returns the request's team and vehicle to `AVAILABLE`.
///
/// Only a `BUSY` team and an `IN_USE` vehicle still bound to the request's
/// team are touched, so calling this twice is the same as calling it once.
/// Supply stock is never given back.
pub async fn release(
    tx: &mut dyn DispatchTx,
    request: &RescueRequest,
    now: EpochMillis,
) -> FloodResult<ReleaseOutcome> {
    let mut outcome = ReleaseOutcome::default();

    if let Some(vehicle_id) = request.assigned_vehicle_id {
        if let Some(mut vehicle) = tx.load_vehicle(vehicle_id).await? {
            let bound_here = vehicle.current_team_id.is_none()
                || vehicle.current_team_id == request.assigned_team_id;
            if vehicle.status == VehicleStatus::InUse && bound_here {
                vehicle.status = VehicleStatus::Available;
                vehicle.current_team_id = None;
                vehicle.updated_at_ms = now;
                tx.save_vehicle(&mut vehicle).await?;
                outcome.vehicle_released = true;
            }
        }
    }

    if let Some(team_id) = request.assigned_team_id {
        if let Some(mut team) = tx.load_team(team_id).await? {
            if team.status == TeamStatus::Busy {
                team.status = TeamStatus::Available;
                team.updated_at_ms = now;
                tx.save_team(&mut team).await?;
                outcome.team_released = true;
            }
        }
    }

    if outcome.team_released || outcome.vehicle_released {
        tracing::info!(
            request_id = %request.id,
            team_released = outcome.team_released,
            vehicle_released = outcome.vehicle_released,
            "resources released"
        );
    }
    Ok(outcome)
}

fn ensure_team_available(team: &RescueTeam) -> FloodResult<()> {
    if !team.is_active {
        return Err(FloodError::ResourceUnavailable {
            kind: ResourceKind::Team,
            name: team.name.clone(),
            status: "INACTIVE".to_string(),
        });
    }
    if team.status != TeamStatus::Available {
        return Err(FloodError::ResourceUnavailable {
            kind: ResourceKind::Team,
            name: team.name.clone(),
            status: team.status.to_string(),
        });
    }
    Ok(())
}

fn ensure_vehicle_available(vehicle: &Vehicle) -> FloodResult<()> {
    if vehicle.status != VehicleStatus::Available {
        return Err(FloodError::ResourceUnavailable {
            kind: ResourceKind::Vehicle,
            name: vehicle.name.clone(),
            status: vehicle.status.to_string(),
        });
    }
    Ok(())
}
