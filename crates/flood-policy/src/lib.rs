use flood_core::{RequestId, UserId};
use flood_identity::{Actor, Permission, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    Permit,
    Deny,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyContext {
    pub request_id: Option<RequestId>,
    /// Leader of the team currently assigned to the request, if any.
    pub team_leader_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct PolicyRequest<'a> {
    pub actor: &'a Actor,
    pub action: Permission,
    pub context: PolicyContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    pub description: String,
    pub required_roles: Vec<Role>,
    pub required_permissions: Vec<Permission>,
    /// Lets the assigned team's leader through regardless of role.
    #[serde(default)]
    pub allow_team_leader: bool,
}

pub trait PolicyEngine: Send + Sync {
    fn evaluate(&self, request: &PolicyRequest<'_>) -> PolicyDecision;
}

#[derive(Debug, Clone)]
pub struct BasicPolicyEngine {
    rules: Vec<PolicyRule>,
}

impl BasicPolicyEngine {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    fn matches_rule(&self, request: &PolicyRequest<'_>, rule: &PolicyRule) -> bool {
        if !rule.required_permissions.contains(&request.action) {
            return false;
        }
        let is_leader = rule.allow_team_leader
            && request
                .context
                .team_leader_id
                .is_some_and(|leader| leader == request.actor.user_id);
        if is_leader {
            return true;
        }
        rule.required_roles
            .iter()
            .any(|role| request.actor.has_role(*role))
    }
}

impl Default for BasicPolicyEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl PolicyEngine for BasicPolicyEngine {
    fn evaluate(&self, request: &PolicyRequest<'_>) -> PolicyDecision {
        if self
            .rules
            .iter()
            .any(|rule| self.matches_rule(request, rule))
        {
            PolicyDecision::Permit
        } else {
            PolicyDecision::Deny
        }
    }
}

fn default_rules() -> Vec<PolicyRule> {
    vec![
        PolicyRule {
            id: "view_requests".to_string(),
            description: "Browse rescue requests and their ledgers".to_string(),
            required_roles: vec![
                Role::Admin,
                Role::Manager,
                Role::Coordinator,
                Role::RescueTeam,
            ],
            required_permissions: vec![Permission::ViewRequests],
            allow_team_leader: false,
        },
        PolicyRule {
            id: "verify_requests".to_string(),
            description: "Confirm a citizen report is genuine".to_string(),
            required_roles: vec![Role::Admin, Role::Manager, Role::Coordinator],
            required_permissions: vec![Permission::VerifyRequests],
            allow_team_leader: false,
        },
        PolicyRule {
            id: "assign_tasks".to_string(),
            description: "Dispatch a team, vehicle and supplies".to_string(),
            required_roles: vec![Role::Admin, Role::Manager, Role::Coordinator],
            required_permissions: vec![Permission::AssignTasks],
            allow_team_leader: false,
        },
        PolicyRule {
            id: "update_progress".to_string(),
            description: "Report field progress for an assigned request".to_string(),
            required_roles: vec![Role::Admin, Role::Manager],
            required_permissions: vec![Permission::UpdateProgress],
            allow_team_leader: true,
        },
        PolicyRule {
            id: "cancel_requests".to_string(),
            description: "Close a request without completing it".to_string(),
            required_roles: vec![Role::Admin, Role::Manager, Role::Coordinator],
            required_permissions: vec![Permission::CancelRequests],
            allow_team_leader: false,
        },
        PolicyRule {
            id: "manage_resources".to_string(),
            description: "Register teams, vehicles and supplies".to_string(),
            required_roles: vec![Role::Admin, Role::Manager],
            required_permissions: vec![Permission::ManageResources],
            allow_team_leader: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(roles: Vec<Role>) -> Actor {
        Actor::new(UserId::new(), "tester", roles)
    }

    fn decide(actor: &Actor, action: Permission, leader: Option<UserId>) -> PolicyDecision {
        BasicPolicyEngine::with_default_rules().evaluate(&PolicyRequest {
            actor,
            action,
            context: PolicyContext {
                request_id: None,
                team_leader_id: leader,
            },
        })
    }

    #[test]
    fn coordinators_verify_and_assign() {
        let coordinator = actor(vec![Role::Coordinator]);
        assert_eq!(
            decide(&coordinator, Permission::VerifyRequests, None),
            PolicyDecision::Permit
        );
        assert_eq!(
            decide(&coordinator, Permission::AssignTasks, None),
            PolicyDecision::Permit
        );
        assert_eq!(
            decide(&coordinator, Permission::UpdateProgress, None),
            PolicyDecision::Deny
        );
    }

    #[test]
    fn citizens_cannot_dispatch() {
        let citizen = actor(vec![Role::Citizen]);
        assert_eq!(
            decide(&citizen, Permission::AssignTasks, None),
            PolicyDecision::Deny
        );
        assert_eq!(
            decide(&citizen, Permission::CancelRequests, None),
            PolicyDecision::Deny
        );
    }

    #[test]
    fn only_the_assigned_leader_reports_progress() {
        let leader = actor(vec![Role::RescueTeam]);
        let other = actor(vec![Role::RescueTeam]);
        assert_eq!(
            decide(&leader, Permission::UpdateProgress, Some(leader.user_id)),
            PolicyDecision::Permit
        );
        assert_eq!(
            decide(&other, Permission::UpdateProgress, Some(leader.user_id)),
            PolicyDecision::Deny
        );
        let manager = actor(vec![Role::Manager]);
        assert_eq!(
            decide(&manager, Permission::UpdateProgress, Some(leader.user_id)),
            PolicyDecision::Permit
        );
    }

    #[test]
    fn leadership_does_not_grant_other_actions() {
        let leader = actor(vec![Role::RescueTeam]);
        assert_eq!(
            decide(&leader, Permission::AssignTasks, Some(leader.user_id)),
            PolicyDecision::Deny
        );
    }

    #[test]
    fn empty_rule_set_denies() {
        let admin = actor(vec![Role::Admin]);
        let engine = BasicPolicyEngine::new(Vec::new());
        let decision = engine.evaluate(&PolicyRequest {
            actor: &admin,
            action: Permission::ViewRequests,
            context: PolicyContext::default(),
        });
        assert_eq!(decision, PolicyDecision::Deny);
    }
}
