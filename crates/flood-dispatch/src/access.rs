use flood_core::{FloodError, FloodResult};
use flood_identity::{Actor, Permission};
use flood_policy::{PolicyContext, PolicyDecision, PolicyEngine, PolicyRequest};

pub(crate) fn authorize(
    policy: &dyn PolicyEngine,
    actor: &Actor,
    action: Permission,
    context: PolicyContext,
) -> FloodResult<()> {
    let request = PolicyRequest {
        actor,
        action,
        context,
    };
    match policy.evaluate(&request) {
        PolicyDecision::Permit => Ok(()),
        PolicyDecision::Deny => Err(FloodError::Forbidden(format!(
            "{} is not allowed to {}",
            actor.display_name,
            describe(action)
        ))),
    }
}

fn describe(action: Permission) -> &'static str {
    match action {
        Permission::ViewRequests => "view rescue requests",
        Permission::VerifyRequests => "verify rescue requests",
        Permission::AssignTasks => "assign rescue tasks",
        Permission::UpdateProgress => "report progress on this request",
        Permission::CancelRequests => "cancel rescue requests",
        Permission::ManageResources => "manage teams, vehicles and supplies",
    }
}
