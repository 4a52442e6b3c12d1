use flood_config::DispatchConfig;
use flood_core::{EpochMillis, RequestStatus, RescueRequest, RescueTeam};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Draws a fresh candidate code: the configured prefix followed by
/// uppercase alphanumerics. Uniqueness is checked by the caller.
pub fn generate_code(config: &DispatchConfig) -> String {
    let length = config
        .tracking_code_length
        .clamp(DispatchConfig::MIN_CODE_LENGTH, DispatchConfig::MAX_CODE_LENGTH);
    let random = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("{}{}", config.tracking_code_prefix, &random[..length])
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

pub fn codes_match(stored: &str, presented: &str) -> bool {
    stored.eq_ignore_ascii_case(presented.trim())
}

/// What an unauthenticated citizen may see about their request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicStatusView {
    pub tracking_code: String,
    pub status: RequestStatus,
    pub title: String,
    pub description: Option<String>,
    pub coordinator_note: Option<String>,
    pub created_at_ms: EpochMillis,
    pub completed_at_ms: Option<EpochMillis>,
    pub assigned_team_name: Option<String>,
    pub team_contact_phone: Option<String>,
}

impl PublicStatusView {
    pub fn new(request: &RescueRequest, team: Option<&RescueTeam>) -> Self {
        Self {
            tracking_code: request.tracking_code.clone(),
            status: request.status,
            title: request.title.clone(),
            description: request.description.clone(),
            coordinator_note: request.coordinator_note.clone(),
            created_at_ms: request.created_at_ms,
            completed_at_ms: request.completed_at_ms,
            assigned_team_name: team.map(|team| team.name.clone()),
            team_contact_phone: team.and_then(|team| team.contact_phone.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_carry_prefix_and_configured_length() {
        let config = DispatchConfig {
            tracking_code_prefix: "SOS".to_string(),
            tracking_code_length: 8,
            tracking_code_attempts: 3,
        };
        let code = generate_code(&config);
        assert_eq!(code.len(), 11);
        assert!(code.starts_with("SOS"));
        assert!(
            code[3..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn out_of_range_lengths_are_clamped() {
        let config = DispatchConfig {
            tracking_code_length: 99,
            ..DispatchConfig::default()
        };
        assert_eq!(generate_code(&config).len(), 3 + DispatchConfig::MAX_CODE_LENGTH);
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(normalize_code("  sos4f2a9c "), "SOS4F2A9C");
        assert!(codes_match("SOS4F2A9C", " sos4f2a9c"));
        assert!(!codes_match("SOS4F2A9C", "SOS4F2A9D"));
    }
}
