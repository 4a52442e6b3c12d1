use flood_core::{
    FloodError, FloodResult, ResourceKind, RescueTeam, Supply, SupplyId, TeamId, TeamStatus,
    UserId, Vehicle, VehicleId, VehicleStatus, now_epoch_millis,
};
use flood_identity::{Actor, Permission};
use flood_policy::{PolicyContext, PolicyEngine};
use flood_storage::{DispatchStore, Store, SupplyRepository, TeamRepository, VehicleRepository};
use std::sync::Arc;

use crate::access::authorize;
use crate::commands::{NewSupply, NewTeam, NewVehicle, TeamUpdate};
use crate::telemetry::observe;

/// Inventory of teams, vehicles and supplies that assignments draw from.
pub struct ResourceRegistry<S: ?Sized> {
    store: Arc<S>,
    policy: Arc<dyn PolicyEngine>,
}

impl<S: ?Sized> Clone for ResourceRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<S: Store + ?Sized> ResourceRegistry<S> {
    pub fn new(store: Arc<S>, policy: Arc<dyn PolicyEngine>) -> Self {
        Self { store, policy }
    }

    pub async fn register_team(&self, command: NewTeam, actor: &Actor) -> FloodResult<RescueTeam> {
        observe("register_team", self.register_team_inner(command, actor).await)
    }

    /// Renames, re-describes or re-staffs a team. The leader of a `BUSY`
    /// team is the one reporting progress on its request, so it cannot be
    /// replaced or the team deactivated until that request releases it.
    pub async fn update_team(
        &self,
        team_id: TeamId,
        update: TeamUpdate,
        actor: &Actor,
    ) -> FloodResult<RescueTeam> {
        observe(
            "update_team",
            self.update_team_inner(team_id, update, actor).await,
        )
    }

    /// Drops `user_id` from the roster, clearing the leader slot if it was
    /// theirs. Removing someone who is not on the team changes nothing.
    pub async fn remove_member(
        &self,
        team_id: TeamId,
        user_id: UserId,
        actor: &Actor,
    ) -> FloodResult<RescueTeam> {
        observe(
            "remove_member",
            self.remove_member_inner(team_id, user_id, actor).await,
        )
    }

    /// Moves a team between `AVAILABLE` and `OFF_DUTY`. A team out on a
    /// request stays `BUSY` until that request releases it.
    pub async fn set_team_duty(
        &self,
        team_id: TeamId,
        on_duty: bool,
        actor: &Actor,
    ) -> FloodResult<RescueTeam> {
        observe(
            "set_team_duty",
            self.set_team_duty_inner(team_id, on_duty, actor).await,
        )
    }

    pub async fn register_vehicle(
        &self,
        command: NewVehicle,
        actor: &Actor,
    ) -> FloodResult<Vehicle> {
        observe(
            "register_vehicle",
            self.register_vehicle_inner(command, actor).await,
        )
    }

    pub async fn change_vehicle_status(
        &self,
        vehicle_id: VehicleId,
        status: VehicleStatus,
        actor: &Actor,
    ) -> FloodResult<Vehicle> {
        observe(
            "change_vehicle_status",
            self.change_vehicle_status_inner(vehicle_id, status, actor)
                .await,
        )
    }

    pub async fn register_supply(&self, command: NewSupply, actor: &Actor) -> FloodResult<Supply> {
        observe(
            "register_supply",
            self.register_supply_inner(command, actor).await,
        )
    }

    pub async fn list_teams(
        &self,
        limit: usize,
        offset: usize,
        actor: &Actor,
    ) -> FloodResult<Vec<RescueTeam>> {
        self.authorize(actor, Permission::ViewRequests)?;
        Ok(TeamRepository::list(&*self.store, limit, offset).await?)
    }

    pub async fn list_vehicles(
        &self,
        limit: usize,
        offset: usize,
        actor: &Actor,
    ) -> FloodResult<Vec<Vehicle>> {
        self.authorize(actor, Permission::ViewRequests)?;
        Ok(VehicleRepository::list(&*self.store, limit, offset).await?)
    }

    pub async fn list_supplies(
        &self,
        limit: usize,
        offset: usize,
        actor: &Actor,
    ) -> FloodResult<Vec<Supply>> {
        self.authorize(actor, Permission::ViewRequests)?;
        Ok(SupplyRepository::list(&*self.store, limit, offset).await?)
    }

    pub async fn get_team(&self, team_id: TeamId, actor: &Actor) -> FloodResult<RescueTeam> {
        self.authorize(actor, Permission::ViewRequests)?;
        TeamRepository::get(&*self.store, team_id)
            .await?
            .ok_or_else(|| FloodError::not_found("rescue team", team_id))
    }

    pub async fn get_vehicle(&self, vehicle_id: VehicleId, actor: &Actor) -> FloodResult<Vehicle> {
        self.authorize(actor, Permission::ViewRequests)?;
        VehicleRepository::get(&*self.store, vehicle_id)
            .await?
            .ok_or_else(|| FloodError::not_found("vehicle", vehicle_id))
    }

    pub async fn get_supply(&self, supply_id: SupplyId, actor: &Actor) -> FloodResult<Supply> {
        self.authorize(actor, Permission::ViewRequests)?;
        SupplyRepository::get(&*self.store, supply_id)
            .await?
            .ok_or_else(|| FloodError::not_found("supply", supply_id))
    }

    fn authorize(&self, actor: &Actor, action: Permission) -> FloodResult<()> {
        authorize(self.policy.as_ref(), actor, action, PolicyContext::default())
    }

    async fn register_team_inner(&self, command: NewTeam, actor: &Actor) -> FloodResult<RescueTeam> {
        self.authorize(actor, Permission::ManageResources)?;
        let name = required("team name", &command.name)?;

        let now = now_epoch_millis();
        let team = RescueTeam {
            id: TeamId::new(),
            name,
            description: command.description,
            is_active: true,
            status: TeamStatus::Available,
            leader_id: command.leader_id,
            member_ids: roster(command.member_ids, command.leader_id),
            contact_phone: command.contact_phone,
            created_at_ms: now,
            updated_at_ms: now,
            version: 0,
        };
        let mut tx = self.store.begin().await?;
        tx.insert_team(&team).await?;
        tx.commit().await?;

        tracing::info!(team_id = %team.id, name = %team.name, "rescue team registered");
        Ok(team)
    }

    async fn update_team_inner(
        &self,
        team_id: TeamId,
        update: TeamUpdate,
        actor: &Actor,
    ) -> FloodResult<RescueTeam> {
        self.authorize(actor, Permission::ManageResources)?;

        let mut tx = self.store.begin().await?;
        let mut team = tx
            .load_team(team_id)
            .await?
            .ok_or_else(|| FloodError::not_found("rescue team", team_id))?;

        let new_leader = update.leader_id.filter(|leader| team.leader_id != Some(*leader));
        let deactivating = update.is_active == Some(false) && team.is_active;
        if team.status == TeamStatus::Busy && (new_leader.is_some() || deactivating) {
            return Err(busy(team));
        }

        if let Some(name) = update.name {
            team.name = required("team name", &name)?;
        }
        if let Some(description) = update.description {
            team.description = Some(description);
        }
        if let Some(phone) = update.contact_phone {
            team.contact_phone = Some(phone);
        }
        if let Some(is_active) = update.is_active {
            team.is_active = is_active;
        }
        if let Some(leader) = new_leader {
            team.leader_id = Some(leader);
        }
        let mut members = std::mem::take(&mut team.member_ids);
        members.extend(update.member_ids);
        team.member_ids = roster(members, team.leader_id);

        team.updated_at_ms = now_epoch_millis();
        tx.save_team(&mut team).await?;
        tx.commit().await?;

        tracing::info!(
            team_id = %team.id,
            name = %team.name,
            leader_id = ?team.leader_id,
            members = team.member_ids.len(),
            is_active = team.is_active,
            "rescue team updated"
        );
        Ok(team)
    }

    async fn remove_member_inner(
        &self,
        team_id: TeamId,
        user_id: UserId,
        actor: &Actor,
    ) -> FloodResult<RescueTeam> {
        self.authorize(actor, Permission::ManageResources)?;

        let mut tx = self.store.begin().await?;
        let mut team = tx
            .load_team(team_id)
            .await?
            .ok_or_else(|| FloodError::not_found("rescue team", team_id))?;

        let is_leader = team.leader_id == Some(user_id);
        if !is_leader && !team.member_ids.contains(&user_id) {
            return Ok(team);
        }
        if is_leader && team.status == TeamStatus::Busy {
            return Err(busy(team));
        }

        team.member_ids.retain(|member| *member != user_id);
        if is_leader {
            team.leader_id = None;
        }
        team.updated_at_ms = now_epoch_millis();
        tx.save_team(&mut team).await?;
        tx.commit().await?;

        tracing::info!(
            team_id = %team.id,
            user_id = %user_id,
            leader_removed = is_leader,
            "team member removed"
        );
        Ok(team)
    }

    async fn set_team_duty_inner(
        &self,
        team_id: TeamId,
        on_duty: bool,
        actor: &Actor,
    ) -> FloodResult<RescueTeam> {
        self.authorize(actor, Permission::ManageResources)?;

        let mut tx = self.store.begin().await?;
        let mut team = tx
            .load_team(team_id)
            .await?
            .ok_or_else(|| FloodError::not_found("rescue team", team_id))?;
        if team.status == TeamStatus::Busy {
            return Err(busy(team));
        }
        let target = if on_duty {
            TeamStatus::Available
        } else {
            TeamStatus::OffDuty
        };
        if team.status != target {
            team.status = target;
            team.updated_at_ms = now_epoch_millis();
            tx.save_team(&mut team).await?;
            tx.commit().await?;
            tracing::info!(team_id = %team.id, status = %team.status, "team duty changed");
        }
        Ok(team)
    }

    async fn register_vehicle_inner(
        &self,
        command: NewVehicle,
        actor: &Actor,
    ) -> FloodResult<Vehicle> {
        self.authorize(actor, Permission::ManageResources)?;
        let name = required("vehicle name", &command.name)?;
        let vehicle_type = required("vehicle type", &command.vehicle_type)?;
        let status = command.status.unwrap_or_default();
        if status == VehicleStatus::InUse {
            return Err(FloodError::InvalidInput(
                "a vehicle only becomes IN_USE through an assignment".to_string(),
            ));
        }

        let now = now_epoch_millis();
        let vehicle = Vehicle {
            id: VehicleId::new(),
            name,
            vehicle_type,
            license_plate: command.license_plate,
            capacity: command.capacity,
            status,
            current_team_id: None,
            created_at_ms: now,
            updated_at_ms: now,
            version: 0,
        };
        let mut tx = self.store.begin().await?;
        tx.insert_vehicle(&vehicle).await?;
        tx.commit().await?;

        tracing::info!(vehicle_id = %vehicle.id, name = %vehicle.name, "vehicle registered");
        Ok(vehicle)
    }

    async fn change_vehicle_status_inner(
        &self,
        vehicle_id: VehicleId,
        status: VehicleStatus,
        actor: &Actor,
    ) -> FloodResult<Vehicle> {
        self.authorize(actor, Permission::ManageResources)?;
        if status == VehicleStatus::InUse {
            return Err(FloodError::InvalidInput(
                "a vehicle only becomes IN_USE through an assignment".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let mut vehicle = tx
            .load_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| FloodError::not_found("vehicle", vehicle_id))?;
        if vehicle.status == VehicleStatus::InUse {
            let holder = match vehicle.current_team_id {
                Some(team_id) => tx.load_team(team_id).await?.map(|team| team.name),
                None => None,
            };
            return Err(FloodError::ResourceUnavailable {
                kind: ResourceKind::Vehicle,
                name: vehicle.name,
                status: match holder {
                    Some(team) => format!("IN_USE by {team}"),
                    None => VehicleStatus::InUse.to_string(),
                },
            });
        }

        vehicle.status = status;
        if matches!(
            status,
            VehicleStatus::Maintenance | VehicleStatus::Unavailable
        ) {
            vehicle.current_team_id = None;
        }
        vehicle.updated_at_ms = now_epoch_millis();
        tx.save_vehicle(&mut vehicle).await?;
        tx.commit().await?;

        tracing::info!(vehicle_id = %vehicle.id, status = %vehicle.status, "vehicle status changed");
        Ok(vehicle)
    }

    async fn register_supply_inner(&self, command: NewSupply, actor: &Actor) -> FloodResult<Supply> {
        self.authorize(actor, Permission::ManageResources)?;
        let name = required("supply name", &command.name)?;
        let unit = required("supply unit", &command.unit)?;

        let now = now_epoch_millis();
        let supply = Supply {
            id: SupplyId::new(),
            name,
            supply_type: command.supply_type,
            quantity: command.quantity,
            unit,
            description: command.description,
            imported_at_ms: command.imported_at_ms.or(Some(now)),
            exported_at_ms: command.exported_at_ms,
            expires_at_ms: command.expires_at_ms,
            created_at_ms: now,
            updated_at_ms: now,
            version: 0,
        };
        let mut tx = self.store.begin().await?;
        tx.insert_supply(&supply).await?;
        tx.commit().await?;

        tracing::info!(
            supply_id = %supply.id,
            name = %supply.name,
            quantity = supply.quantity,
            "supply registered"
        );
        Ok(supply)
    }
}

fn required(field: &str, value: &str) -> FloodResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FloodError::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Leader first, then members in the order given, without repeats.
fn roster(members: Vec<UserId>, leader: Option<UserId>) -> Vec<UserId> {
    let mut roster: Vec<UserId> = Vec::with_capacity(members.len() + 1);
    for member in leader.into_iter().chain(members) {
        if !roster.contains(&member) {
            roster.push(member);
        }
    }
    roster
}

fn busy(team: RescueTeam) -> FloodError {
    FloodError::ResourceUnavailable {
        kind: ResourceKind::Team,
        name: team.name,
        status: TeamStatus::Busy.to_string(),
    }
}
