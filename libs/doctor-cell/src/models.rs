use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::loose::{id_string, loose_bool, LooseNumber};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessionalDetails {
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default, alias = "experience_years")]
    pub experience: LooseNumber,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HospitalDetails {
    #[serde(default, alias = "hospital_name", alias = "hospitalName")]
    pub name: Option<String>,
    #[serde(default, alias = "addressLine1")]
    pub address_line1: Option<String>,
    #[serde(default, alias = "addressLine2")]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
}

/// Doctor as the backend directory returns it. Token-mode and
/// appointment-mode fields coexist; use [`Doctor::booking_mode`] to branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "doctor_name", alias = "doctorName")]
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "photo_url", alias = "profile_photo")]
    pub photo: Option<String>,
    #[serde(default)]
    pub fee: LooseNumber,
    #[serde(default, alias = "tokenFee")]
    pub token_fee: LooseNumber,
    #[serde(default, alias = "professionalDetails")]
    pub professional_details: ProfessionalDetails,
    #[serde(default, alias = "hospitalDetails")]
    pub hospital_details: HospitalDetails,
    #[serde(default, deserialize_with = "loose_bool")]
    pub is_token: bool,
    #[serde(default, deserialize_with = "loose_bool")]
    pub is_fees_online: bool,
    #[serde(default, deserialize_with = "loose_bool")]
    pub is_appointment: bool,
    #[serde(default, alias = "weekOff", alias = "week_off_day")]
    pub week_off: Option<String>,
    #[serde(default, alias = "tokenBookingDays")]
    pub token_booking_days: Option<LooseNumber>,
    #[serde(default, alias = "appointmentBookingDays")]
    pub appointment_booking_days: Option<LooseNumber>,
    #[serde(default)]
    pub review_percentage: Option<LooseNumber>,
    #[serde(default, rename = "reviewPercentage")]
    pub review_percentage_camel: Option<LooseNumber>,
    #[serde(default)]
    pub positive_review_percentage: Option<LooseNumber>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DoctorBookingMode {
    Token { horizon_days: Option<u32> },
    Appointment { horizon_days: Option<u32> },
}

fn horizon(days: &Option<LooseNumber>) -> Option<u32> {
    days.as_ref()
        .map(|d| d.as_i64())
        .filter(|d| *d > 0)
        .map(|d| d.min(u32::MAX as i64) as u32)
}

pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

impl Doctor {
    pub fn booking_mode(&self) -> DoctorBookingMode {
        if self.is_token {
            DoctorBookingMode::Token {
                horizon_days: horizon(&self.token_booking_days),
            }
        } else {
            DoctorBookingMode::Appointment {
                horizon_days: horizon(&self.appointment_booking_days),
            }
        }
    }

    pub fn experience_years(&self) -> f64 {
        self.professional_details.experience.as_f64()
    }

    pub fn fee_amount(&self) -> f64 {
        self.fee.as_f64()
    }

    /// First review field the backend actually sent, or 0.
    pub fn review_percentage(&self) -> f64 {
        [
            &self.review_percentage,
            &self.review_percentage_camel,
            &self.positive_review_percentage,
        ]
        .into_iter()
        .find_map(|field| field.as_ref().filter(|v| v.is_present()))
        .map(LooseNumber::as_f64)
        .unwrap_or(0.0)
    }

    pub fn specialization(&self) -> Option<&str> {
        self.professional_details.specialization.as_deref()
    }

    pub fn off_day(&self) -> Option<Weekday> {
        self.week_off.as_deref().and_then(parse_weekday)
    }
}

/// Doctor plus the derived fields a listing card shows.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorCard {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub booking_mode: DoctorBookingMode,
    pub experience_years: f64,
    pub review_score: f64,
}

impl From<Doctor> for DoctorCard {
    fn from(doctor: Doctor) -> Self {
        Self {
            booking_mode: doctor.booking_mode(),
            experience_years: doctor.experience_years(),
            review_score: doctor.review_percentage(),
            doctor,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    ExperienceDesc,
    FeeAsc,
    FeeDesc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorFilters {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_experience: Option<f64>,
    #[serde(default)]
    pub min_review: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

// Query strings cannot go through `#[serde(flatten)]` with numeric fields,
// so the search query repeats the filter fields.
#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub district_id: Option<String>,
    pub gender: Option<String>,
    pub specialization: Option<String>,
    pub name: Option<String>,
    pub min_experience: Option<f64>,
    pub min_review: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

impl DoctorSearchQuery {
    pub fn filters(&self) -> DoctorFilters {
        DoctorFilters {
            gender: self.gender.clone(),
            specialization: self.specialization.clone(),
            name: self.name.clone(),
            min_experience: self.min_experience,
            min_review: self.min_review,
            sort: self.sort,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialization {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "specialization", alias = "specialization_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "hospital_name")]
    pub name: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_mode_follows_is_token() {
        let token: Doctor = serde_json::from_value(json!({
            "id": 1, "name": "A", "is_token": 1, "token_booking_days": "3"
        }))
        .unwrap();
        assert_eq!(token.booking_mode(), DoctorBookingMode::Token { horizon_days: Some(3) });

        let appt: Doctor = serde_json::from_value(json!({
            "id": 2, "name": "B", "is_token": false, "appointment_booking_days": null
        }))
        .unwrap();
        assert_eq!(appt.booking_mode(), DoctorBookingMode::Appointment { horizon_days: None });
    }

    #[test]
    fn review_percentage_uses_first_present_field() {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": 1,
            "reviewPercentage": "81",
            "positive_review_percentage": 99
        }))
        .unwrap();
        assert_eq!(doctor.review_percentage(), 81.0);

        let garbage: Doctor = serde_json::from_value(json!({
            "id": 1,
            "review_percentage": "n/a",
            "reviewPercentage": 70
        }))
        .unwrap();
        assert_eq!(garbage.review_percentage(), 0.0);

        let none: Doctor = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(none.review_percentage(), 0.0);
    }

    #[test]
    fn weekday_names_parse_loosely() {
        assert_eq!(parse_weekday("Sunday"), Some(Weekday::Sun));
        assert_eq!(parse_weekday(" monday "), Some(Weekday::Mon));
        assert_eq!(parse_weekday("Thu"), Some(Weekday::Thu));
        assert_eq!(parse_weekday("none"), None);
    }
}
