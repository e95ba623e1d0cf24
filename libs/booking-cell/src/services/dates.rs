//! Date policies for the booking calendars.
//!
//! Patients may book a token only for today; staff booking on a patient's
//! behalf may look ahead by the doctor's token horizon. Appointment
//! calendars always run to the appointment horizon.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use doctor_cell::models::{Doctor, DoctorBookingMode};

use crate::models::{DateBounds, OffDayOffer};

fn plus_days(today: NaiveDate, days: Option<u32>) -> NaiveDate {
    today + Duration::days(i64::from(days.unwrap_or(0)))
}

pub fn patient_token_max_date(today: NaiveDate) -> NaiveDate {
    today
}

pub fn staff_token_max_date(today: NaiveDate, horizon_days: Option<u32>) -> NaiveDate {
    plus_days(today, horizon_days)
}

pub fn appointment_max_date(today: NaiveDate, horizon_days: Option<u32>) -> NaiveDate {
    plus_days(today, horizon_days)
}

pub fn patient_bounds(mode: DoctorBookingMode, today: NaiveDate) -> DateBounds {
    let max = match mode {
        DoctorBookingMode::Token { .. } => patient_token_max_date(today),
        DoctorBookingMode::Appointment { horizon_days } => appointment_max_date(today, horizon_days),
    };
    DateBounds { min: today, max }
}

pub fn staff_bounds(mode: DoctorBookingMode, today: NaiveDate) -> DateBounds {
    let max = match mode {
        DoctorBookingMode::Token { horizon_days } => staff_token_max_date(today, horizon_days),
        DoctorBookingMode::Appointment { horizon_days } => appointment_max_date(today, horizon_days),
    };
    DateBounds { min: today, max }
}

/// First day after `date` that is not `off_day`.
pub fn next_non_off_day(date: NaiveDate, off_day: Weekday) -> NaiveDate {
    let mut candidate = date + Duration::days(1);
    while candidate.weekday() == off_day {
        candidate += Duration::days(1);
    }
    candidate
}

pub fn off_day_offer(doctor: &Doctor, date: NaiveDate, bounds: &DateBounds) -> Option<OffDayOffer> {
    let off_day = doctor.off_day()?;
    if date.weekday() != off_day {
        return None;
    }

    let suggested = next_non_off_day(date, off_day);
    Some(OffDayOffer {
        requested: date,
        suggested,
        off_day: doctor.week_off.clone().unwrap_or_default(),
        suggested_within_bounds: bounds.contains(suggested),
    })
}
