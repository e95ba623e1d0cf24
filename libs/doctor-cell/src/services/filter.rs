//! In-memory narrowing and ordering of a fetched doctor list. Pure and
//! synchronous; the only network call is the directory fetch before it.

use std::cmp::Ordering;

use crate::models::{Doctor, DoctorFilters, SortKey};

/// Blank values and the select's "all" option mean "no filter".
fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

pub fn matches(doctor: &Doctor, filters: &DoctorFilters) -> bool {
    if let Some(gender) = active(&filters.gender) {
        let doctor_gender = doctor.gender.as_deref().unwrap_or("").trim();
        if !doctor_gender.eq_ignore_ascii_case(gender) {
            return false;
        }
    }

    if let Some(specialization) = active(&filters.specialization) {
        if doctor.specialization().map(str::trim) != Some(specialization) {
            return false;
        }
    }

    if let Some(name) = active(&filters.name) {
        if !doctor.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }

    if let Some(min_experience) = filters.min_experience.filter(|v| v.is_finite()) {
        if doctor.experience_years() < min_experience {
            return false;
        }
    }

    if let Some(min_review) = filters.min_review.filter(|v| v.is_finite()) {
        if doctor.review_percentage() < min_review {
            return false;
        }
    }

    true
}

fn compare(a: &Doctor, b: &Doctor, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Relevance => Ordering::Equal,
        SortKey::ExperienceDesc => b.experience_years().total_cmp(&a.experience_years()),
        SortKey::FeeAsc => a.fee_amount().total_cmp(&b.fee_amount()),
        SortKey::FeeDesc => b.fee_amount().total_cmp(&a.fee_amount()),
    }
}

/// Filter with AND semantics, then sort. The sort is stable, so ties keep
/// input order and applying the same filters twice changes nothing.
pub fn apply(doctors: &[Doctor], filters: &DoctorFilters) -> Vec<Doctor> {
    let mut result: Vec<Doctor> = doctors
        .iter()
        .filter(|d| matches(d, filters))
        .cloned()
        .collect();

    if filters.sort != SortKey::Relevance {
        result.sort_by(|a, b| compare(a, b, filters.sort));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doctor(id: &str, name: &str, gender: &str, specialization: &str, exp: serde_json::Value, fee: serde_json::Value, review: serde_json::Value) -> Doctor {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "gender": gender,
            "fee": fee,
            "professional_details": {"specialization": specialization, "experience": exp},
            "review_percentage": review
        }))
        .unwrap()
    }

    fn roster() -> Vec<Doctor> {
        vec![
            doctor("1", "Dr. Anil Rao", "Male", "Cardiology", json!("15"), json!("800"), json!("90")),
            doctor("2", "Dr. Bina Shah", "Female", "Dermatology", json!(4), json!(300), json!("75")),
            doctor("3", "Dr. Chetan Rao", "male", "Cardiology", json!("ten"), json!("free"), json!(null)),
            doctor("4", "Dr. Divya Nair", "Female", "Cardiology", json!("9"), json!("500"), json!("95")),
        ]
    }

    fn ids(doctors: &[Doctor]) -> Vec<&str> {
        doctors.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn no_filters_keep_input_order() {
        let all = roster();
        assert_eq!(ids(&apply(&all, &DoctorFilters::default())), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn gender_is_case_insensitive() {
        let filters = DoctorFilters {
            gender: Some("MALE".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&roster(), &filters)), vec!["1", "3"]);
    }

    #[test]
    fn filters_compose_with_and() {
        let filters = DoctorFilters {
            specialization: Some("Cardiology".to_string()),
            name: Some("rao".to_string()),
            min_experience: Some(10.0),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&roster(), &filters)), vec!["1"]);
    }

    #[test]
    fn non_numeric_values_count_as_zero() {
        let filters = DoctorFilters {
            min_review: Some(1.0),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&roster(), &filters)), vec!["1", "2", "4"]);

        let by_fee = DoctorFilters {
            sort: SortKey::FeeAsc,
            ..Default::default()
        };
        assert_eq!(ids(&apply(&roster(), &by_fee)), vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn sort_orders() {
        let exp = DoctorFilters {
            sort: SortKey::ExperienceDesc,
            ..Default::default()
        };
        assert_eq!(ids(&apply(&roster(), &exp)), vec!["1", "4", "2", "3"]);

        let fee_desc = DoctorFilters {
            sort: SortKey::FeeDesc,
            ..Default::default()
        };
        assert_eq!(ids(&apply(&roster(), &fee_desc)), vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn all_option_disables_select_filters() {
        let filters = DoctorFilters {
            gender: Some("All".to_string()),
            specialization: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&roster(), &filters).len(), 4);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let filter_sets = vec![
            DoctorFilters::default(),
            DoctorFilters {
                gender: Some("female".to_string()),
                sort: SortKey::FeeDesc,
                ..Default::default()
            },
            DoctorFilters {
                specialization: Some("Cardiology".to_string()),
                min_review: Some(50.0),
                sort: SortKey::ExperienceDesc,
                ..Default::default()
            },
            DoctorFilters {
                name: Some("dr".to_string()),
                sort: SortKey::FeeAsc,
                ..Default::default()
            },
        ];

        for filters in filter_sets {
            let once = apply(&roster(), &filters);
            let twice = apply(&once, &filters);
            assert_eq!(ids(&once), ids(&twice));
        }
    }
}
