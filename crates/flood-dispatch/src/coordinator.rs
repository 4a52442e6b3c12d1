use flood_config::DispatchConfig;
use flood_core::{
    EpochMillis, FloodError, FloodResult, MediaId, RequestId, RequestMedia, RequestStatus,
    RequestSupply, RescueRequest, UserId, now_epoch_millis,
};
use flood_identity::{Actor, Permission};
use flood_policy::{PolicyContext, PolicyEngine};
use flood_storage::{DispatchStore, DispatchTx, RequestRepository, Store, TeamRepository};
use std::sync::Arc;

use crate::access::authorize;
use crate::allocation::{self, AssignmentPlan, AssignmentResult};
use crate::commands::{
    AssignTask, CancelRequest, ConfirmCompletion, MediaUpload, ProgressUpdate, SubmitReceipt,
    SubmitRequest, VerifyRequest,
};
use crate::lifecycle::{self, Confirmation};
use crate::notes::{append_note, append_optional_note};
use crate::telemetry::{observe, supply_consumed};
use crate::tracking::{self, PublicStatusView};

const ANONYMOUS_CONTACT: &str = "Anonymous";

/// Runs every request operation as one unit of work against the store.
///
/// Authorization is checked before the state machine; the state machine
/// before any resource is touched. Nothing is written unless the whole
/// operation succeeds.
pub struct RequestCoordinator<S: ?Sized> {
    store: Arc<S>,
    policy: Arc<dyn PolicyEngine>,
    config: DispatchConfig,
}

impl<S: ?Sized> Clone for RequestCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            policy: self.policy.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: Store + ?Sized> RequestCoordinator<S> {
    pub fn new(store: Arc<S>, policy: Arc<dyn PolicyEngine>, config: DispatchConfig) -> Self {
        Self {
            store,
            policy,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn submit(
        &self,
        command: SubmitRequest,
        citizen: Option<&Actor>,
    ) -> FloodResult<SubmitReceipt> {
        observe("submit", self.submit_inner(command, citizen).await)
    }

    pub async fn verify(
        &self,
        request_id: RequestId,
        command: VerifyRequest,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        observe("verify", self.verify_inner(request_id, command, actor).await)
    }

    pub async fn assign(
        &self,
        request_id: RequestId,
        command: AssignTask,
        actor: &Actor,
    ) -> FloodResult<AssignmentResult> {
        let result = observe("assign", self.assign_inner(request_id, command, actor).await)?;
        supply_consumed(result.units_consumed());
        Ok(result)
    }

    pub async fn update_progress(
        &self,
        request_id: RequestId,
        command: ProgressUpdate,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        observe(
            "update_progress",
            self.update_progress_inner(request_id, command, actor).await,
        )
    }

    pub async fn confirm(
        &self,
        request_id: RequestId,
        command: ConfirmCompletion,
        actor: Option<&Actor>,
    ) -> FloodResult<RescueRequest> {
        observe(
            "confirm",
            self.confirm_inner(request_id, command, actor).await,
        )
    }

    pub async fn cancel(
        &self,
        request_id: RequestId,
        command: CancelRequest,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        observe("cancel", self.cancel_inner(request_id, command, actor).await)
    }

    pub async fn track(&self, tracking_code: &str) -> FloodResult<PublicStatusView> {
        let code = tracking::normalize_code(tracking_code);
        let request = RequestRepository::find_by_tracking_code(&*self.store, &code)
            .await?
            .ok_or_else(|| FloodError::not_found("tracking code", &code))?;
        let team = match request.assigned_team_id {
            Some(team_id) => TeamRepository::get(&*self.store, team_id).await?,
            None => None,
        };
        Ok(PublicStatusView::new(&request, team.as_ref()))
    }

    /// Staff with view rights see every request; a citizen sees their own.
    pub async fn get_request(
        &self,
        request_id: RequestId,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        let request = RequestRepository::get(&*self.store, request_id)
            .await?
            .ok_or_else(|| FloodError::not_found("rescue request", request_id))?;
        if request.citizen_id != Some(actor.user_id) {
            self.authorize(actor, Permission::ViewRequests, request_id)?;
        }
        Ok(request)
    }

    pub async fn list_requests(
        &self,
        limit: usize,
        offset: usize,
        actor: &Actor,
    ) -> FloodResult<Vec<RescueRequest>> {
        authorize(
            self.policy.as_ref(),
            actor,
            Permission::ViewRequests,
            PolicyContext::default(),
        )?;
        Ok(RequestRepository::list(&*self.store, limit, offset).await?)
    }

    pub async fn request_media(
        &self,
        request_id: RequestId,
        actor: &Actor,
    ) -> FloodResult<Vec<RequestMedia>> {
        self.get_request(request_id, actor).await?;
        Ok(RequestRepository::media(&*self.store, request_id).await?)
    }

    pub async fn request_supplies(
        &self,
        request_id: RequestId,
        actor: &Actor,
    ) -> FloodResult<Vec<RequestSupply>> {
        self.get_request(request_id, actor).await?;
        Ok(RequestRepository::supply_ledger(&*self.store, request_id).await?)
    }

    fn authorize(
        &self,
        actor: &Actor,
        action: Permission,
        request_id: RequestId,
    ) -> FloodResult<()> {
        authorize(
            self.policy.as_ref(),
            actor,
            action,
            PolicyContext {
                request_id: Some(request_id),
                team_leader_id: None,
            },
        )
    }

    async fn submit_inner(
        &self,
        command: SubmitRequest,
        citizen: Option<&Actor>,
    ) -> FloodResult<SubmitReceipt> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(FloodError::InvalidInput("title is required".to_string()));
        }
        let contact_phone = non_blank(command.contact_phone)
            .or_else(|| citizen.and_then(|actor| non_blank(actor.phone.clone())))
            .ok_or_else(|| {
                FloodError::InvalidInput("a contact phone number is required".to_string())
            })?;
        let contact_name = non_blank(command.contact_name)
            .or_else(|| citizen.and_then(|actor| non_blank(Some(actor.display_name.clone()))))
            .unwrap_or_else(|| ANONYMOUS_CONTACT.to_string());
        if let Some(location) = &command.location {
            location
                .validate()
                .map_err(|err| FloodError::InvalidInput(err.to_string()))?;
        }
        validate_media(&command.media)?;

        let mut tx = self.store.begin().await?;
        let tracking_code = self.allocate_tracking_code(tx.as_mut()).await?;
        let now = now_epoch_millis();
        let request = RescueRequest {
            id: RequestId::new(),
            title: title.to_string(),
            description: non_blank(command.description),
            emergency_level: command.emergency_level,
            people_count: command.people_count,
            status: RequestStatus::Pending,
            tracking_code,
            contact_name,
            contact_phone,
            citizen_id: citizen.map(|actor| actor.user_id),
            verified_by: None,
            assigned_team_id: None,
            assigned_vehicle_id: None,
            coordinator_note: None,
            citizen_feedback: None,
            citizen_rating: None,
            location: command.location,
            created_at_ms: now,
            updated_at_ms: now,
            completed_at_ms: None,
            version: 0,
        };
        tx.insert_request(&request).await?;
        attach_media(
            tx.as_mut(),
            request.id,
            command.media,
            request.citizen_id,
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            tracking_code = %request.tracking_code,
            emergency_level = %request.emergency_level.as_str(),
            "rescue request submitted"
        );
        Ok(SubmitReceipt {
            request_id: request.id,
            tracking_code: request.tracking_code,
        })
    }

    async fn allocate_tracking_code(&self, tx: &mut dyn DispatchTx) -> FloodResult<String> {
        for _ in 0..self.config.tracking_code_attempts.max(1) {
            let candidate = tracking::generate_code(&self.config);
            if !tx.tracking_code_exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(candidate = %candidate, "tracking code collision, drawing again");
        }
        Err(FloodError::Conflict(
            "could not allocate a unique tracking code".to_string(),
        ))
    }

    async fn verify_inner(
        &self,
        request_id: RequestId,
        command: VerifyRequest,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        self.authorize(actor, Permission::VerifyRequests, request_id)?;

        let mut tx = self.store.begin().await?;
        let mut request = load_request(tx.as_mut(), request_id).await?;
        lifecycle::check_verify(request.status)?;

        let now = now_epoch_millis();
        request.status = RequestStatus::Verified;
        request.verified_by = Some(actor.user_id);
        if let Some(level) = command.emergency_level {
            request.emergency_level = level;
        }
        append_optional_note(
            &mut request.coordinator_note,
            &actor.display_name,
            now,
            command.note.as_deref(),
        );
        request.updated_at_ms = now;
        tx.save_request(&mut request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            status = %request.status,
            verified_by = %actor.user_id,
            "rescue request verified"
        );
        Ok(request)
    }

    async fn assign_inner(
        &self,
        request_id: RequestId,
        command: AssignTask,
        actor: &Actor,
    ) -> FloodResult<AssignmentResult> {
        self.authorize(actor, Permission::AssignTasks, request_id)?;

        let mut tx = self.store.begin().await?;
        let mut request = load_request(tx.as_mut(), request_id).await?;
        lifecycle::check_assign(request.status)?;

        let now = now_epoch_millis();
        let plan = AssignmentPlan {
            team_id: command.team_id,
            vehicle_id: command.vehicle_id,
            supplies: command.supplies,
        };
        let result = allocation::assign(tx.as_mut(), &mut request, &plan, actor.user_id, now).await?;
        if let Some(level) = command.emergency_level {
            request.emergency_level = level;
        }
        append_optional_note(
            &mut request.coordinator_note,
            &actor.display_name,
            now,
            command.note.as_deref(),
        );
        tx.save_request(&mut request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            status = %request.status,
            team_id = %result.team_id,
            vehicle_id = ?result.vehicle_id,
            "rescue task assigned"
        );
        Ok(result)
    }

    async fn update_progress_inner(
        &self,
        request_id: RequestId,
        command: ProgressUpdate,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        let mut tx = self.store.begin().await?;
        let mut request = load_request(tx.as_mut(), request_id).await?;
        let team_leader_id = match request.assigned_team_id {
            Some(team_id) => tx.load_team(team_id).await?.and_then(|team| team.leader_id),
            None => None,
        };
        authorize(
            self.policy.as_ref(),
            actor,
            Permission::UpdateProgress,
            PolicyContext {
                request_id: Some(request_id),
                team_leader_id,
            },
        )?;
        lifecycle::check_progress(request.status, command.status)?;
        validate_media(&command.media)?;

        let now = now_epoch_millis();
        let previous = request.status;
        request.status = command.status;
        append_optional_note(
            &mut request.coordinator_note,
            &actor.display_name,
            now,
            command.note.as_deref(),
        );
        if request.status == RequestStatus::Completed {
            allocation::release(tx.as_mut(), &request, now).await?;
            request.completed_at_ms.get_or_insert(now);
        }
        attach_media(
            tx.as_mut(),
            request.id,
            command.media,
            Some(actor.user_id),
            now,
        )
        .await?;
        request.updated_at_ms = now;
        tx.save_request(&mut request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            from = %previous,
            status = %request.status,
            "rescue progress updated"
        );
        Ok(request)
    }

    async fn confirm_inner(
        &self,
        request_id: RequestId,
        command: ConfirmCompletion,
        actor: Option<&Actor>,
    ) -> FloodResult<RescueRequest> {
        let mut tx = self.store.begin().await?;
        let mut request = load_request(tx.as_mut(), request_id).await?;
        if !tracking::codes_match(&request.tracking_code, &command.tracking_code) {
            return Err(FloodError::Unauthorized(
                "tracking code does not match this request".to_string(),
            ));
        }
        if let Some(rating) = command.rating {
            if !(1..=5).contains(&rating) {
                return Err(FloodError::InvalidInput(format!(
                    "rating must be between 1 and 5, got {rating}"
                )));
            }
        }

        let now = now_epoch_millis();
        if lifecycle::check_confirm(request.status)? == Confirmation::Complete {
            allocation::release(tx.as_mut(), &request, now).await?;
            request.status = RequestStatus::Completed;
            request.completed_at_ms.get_or_insert(now);
        }
        if let Some(feedback) = non_blank(command.feedback) {
            request.citizen_feedback = Some(feedback);
        }
        if let Some(rating) = command.rating {
            request.citizen_rating = Some(rating);
        }
        request.updated_at_ms = now;
        tx.save_request(&mut request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            status = %request.status,
            confirmed_by = ?actor.map(|actor| actor.user_id),
            rating = ?request.citizen_rating,
            "rescue completion confirmed"
        );
        Ok(request)
    }

    async fn cancel_inner(
        &self,
        request_id: RequestId,
        command: CancelRequest,
        actor: &Actor,
    ) -> FloodResult<RescueRequest> {
        self.authorize(actor, Permission::CancelRequests, request_id)?;

        let mut tx = self.store.begin().await?;
        let mut request = load_request(tx.as_mut(), request_id).await?;
        lifecycle::check_cancel(request.status)?;

        let now = now_epoch_millis();
        allocation::release(tx.as_mut(), &request, now).await?;
        let previous = request.status;
        request.status = RequestStatus::Cancelled;
        request.completed_at_ms.get_or_insert(now);
        let line = match non_blank(command.reason) {
            Some(reason) => format!("Request cancelled: {reason}"),
            None => "Request cancelled".to_string(),
        };
        append_note(&mut request.coordinator_note, &actor.display_name, now, &line);
        request.updated_at_ms = now;
        tx.save_request(&mut request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            from = %previous,
            status = %request.status,
            "rescue request cancelled"
        );
        Ok(request)
    }
}

async fn load_request(tx: &mut dyn DispatchTx, id: RequestId) -> FloodResult<RescueRequest> {
    tx.load_request(id)
        .await?
        .ok_or_else(|| FloodError::not_found("rescue request", id))
}

async fn attach_media(
    tx: &mut dyn DispatchTx,
    request_id: RequestId,
    uploads: Vec<MediaUpload>,
    uploaded_by: Option<UserId>,
    now: EpochMillis,
) -> FloodResult<()> {
    for upload in uploads {
        let media = RequestMedia {
            id: MediaId::new(),
            request_id,
            kind: upload.kind,
            url: upload.url.trim().to_string(),
            uploaded_by,
            uploaded_at_ms: now,
        };
        tx.append_media(&media).await?;
    }
    Ok(())
}

fn validate_media(uploads: &[MediaUpload]) -> FloodResult<()> {
    if uploads.iter().any(|upload| upload.url.trim().is_empty()) {
        return Err(FloodError::InvalidInput(
            "media attachments need a url".to_string(),
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
