use flood_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Citizen,
    RescueTeam,
    Coordinator,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "CITIZEN",
            Self::RescueTeam => "RESCUE_TEAM",
            Self::Coordinator => "COORDINATOR",
            Self::Manager => "MANAGER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.trim_start_matches("ROLE_") {
            "CITIZEN" => Ok(Self::Citizen),
            "RESCUE_TEAM" => Ok(Self::RescueTeam),
            "COORDINATOR" => Ok(Self::Coordinator),
            "MANAGER" => Ok(Self::Manager),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewRequests,
    VerifyRequests,
    AssignTasks,
    UpdateProgress,
    CancelRequests,
    ManageResources,
}

/// An authenticated caller. Token handling happens upstream; the core only
/// ever sees the resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(user_id: UserId, display_name: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            phone: None,
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|candidate| *candidate == role)
    }
}
