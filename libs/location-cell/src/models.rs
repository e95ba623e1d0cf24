use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::loose::id_string;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndianState {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "state_name", alias = "stateName")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct District {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "district_name", alias = "districtName")]
    pub name: String,
}

/// State of one mounted state → district picker.
#[derive(Debug, Clone, Serialize)]
pub struct LocationCascade {
    pub cascade_id: String,
    pub states: Vec<IndianState>,
    pub selected_state_id: Option<String>,
    pub districts: Vec<District>,
    pub selected_district_id: Option<String>,
    /// Set once a fetch fails. The cascade stays failed until a new one is mounted.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LocationCascade {
    pub fn new(cascade_id: String) -> Self {
        Self {
            cascade_id,
            states: Vec::new(),
            selected_state_id: None,
            districts: Vec::new(),
            selected_district_id: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn fail(&mut self, message: &str) {
        self.states.clear();
        self.selected_state_id = None;
        self.districts.clear();
        self.selected_district_id = None;
        self.error = Some(message.to_string());
    }

    /// Configured default if it is enabled, else the first state.
    pub fn default_state_id(&self, configured: Option<&str>) -> Option<String> {
        configured
            .and_then(|id| self.states.iter().find(|s| s.id == id))
            .or_else(|| self.states.first())
            .map(|s| s.id.clone())
    }

    pub fn has_state(&self, state_id: &str) -> bool {
        self.states.iter().any(|s| s.id == state_id)
    }

    /// Install the enabled districts for a newly selected state and return
    /// the resolved district id. A previous pick that is no longer enabled
    /// is cleared.
    pub fn apply_districts(&mut self, state_id: &str, districts: Vec<District>) -> Option<String> {
        self.selected_state_id = Some(state_id.to_string());
        self.districts = districts;

        let still_enabled = self
            .selected_district_id
            .as_ref()
            .map(|id| self.districts.iter().any(|d| &d.id == id))
            .unwrap_or(false);

        if !still_enabled {
            self.selected_district_id = None;
        }

        self.selected_district_id.clone()
    }

    pub fn select_district(&mut self, district_id: &str) -> bool {
        if self.districts.iter().any(|d| d.id == district_id) {
            self.selected_district_id = Some(district_id.to_string());
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectStateRequest {
    pub state_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectDistrictRequest {
    pub district_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district(id: &str) -> District {
        District {
            id: id.to_string(),
            name: format!("District {}", id),
        }
    }

    fn state(id: &str) -> IndianState {
        IndianState {
            id: id.to_string(),
            name: format!("State {}", id),
        }
    }

    #[test]
    fn previous_district_survives_only_if_still_enabled() {
        let mut cascade = LocationCascade::new("c".to_string());
        cascade.apply_districts("1", vec![district("10"), district("11")]);
        assert!(cascade.select_district("11"));

        assert_eq!(cascade.apply_districts("1", vec![district("11")]), Some("11".to_string()));
        assert_eq!(cascade.apply_districts("2", vec![district("20")]), None);
        assert_eq!(cascade.selected_district_id, None);
    }

    #[test]
    fn unknown_district_is_not_selected() {
        let mut cascade = LocationCascade::new("c".to_string());
        cascade.apply_districts("1", vec![district("10")]);
        assert!(!cascade.select_district("99"));
        assert_eq!(cascade.selected_district_id, None);
    }

    #[test]
    fn default_state_prefers_configured_then_first() {
        let mut cascade = LocationCascade::new("c".to_string());
        cascade.states = vec![state("4"), state("9")];
        assert_eq!(cascade.default_state_id(Some("9")), Some("9".to_string()));
        assert_eq!(cascade.default_state_id(Some("77")), Some("4".to_string()));
        assert_eq!(cascade.default_state_id(None), Some("4".to_string()));
    }

    #[test]
    fn failure_clears_every_selection() {
        let mut cascade = LocationCascade::new("c".to_string());
        cascade.states = vec![state("4")];
        cascade.apply_districts("4", vec![district("10")]);
        cascade.select_district("10");

        cascade.fail("Unable to load districts");
        assert!(cascade.is_failed());
        assert!(cascade.states.is_empty());
        assert!(cascade.selected_state_id.is_none());
        assert!(cascade.selected_district_id.is_none());
    }
}
