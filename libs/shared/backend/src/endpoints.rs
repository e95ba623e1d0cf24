//! Paths on the external backend API, relative to `BACKEND_BASE_URL`.

pub const STATES_LIST: &str = "/getStatesList";
pub const DISTRICTS_LIST: &str = "/getDistrictsList";
pub const DOCTORS_BY_DISTRICT: &str = "/getDoctorsByDistrict";
pub const DOCTOR_BY_ID: &str = "/getDoctorsById";
pub const DOCTOR_OPD_SHIFTS: &str = "/getDoctorOPDShifts";
pub const DOCTOR_SLOTS: &str = "/getDoctorSlots";
pub const SPECIALIZATIONS: &str = "/getSpecializations";
pub const HOSPITAL_LIST: &str = "/getHospitalList";

pub const BOOK_TOKEN: &str = "/bookToken";
pub const BOOK_APPOINTMENT: &str = "/bookAppointment";
pub const BOOK_TOKEN_BY_DOCTOR: &str = "/bookTokenByDoctor";
pub const BOOK_APPOINTMENT_BY_DOCTOR: &str = "/bookAppointmentByDoctor";

pub const REGISTER_USER: &str = "/registerUser";
pub const REGISTER_DOCTOR: &str = "/registerDoctor";
pub const LOGIN: &str = "/getToken";
pub const USER_DETAILS: &str = "/getUserDetails";
pub const SEND_OTP: &str = "/generateAndSendOtp";
pub const VERIFY_OTP: &str = "/verify-otp";
pub const RESET_PASSWORD: &str = "/reset-password";

pub const TOKEN_STATUS_LIST: &str = "/getTokenStatusList";
pub const TOKENS_BY_DOCTOR_AND_DATE: &str = "/getTokenDetailsByDocIdAndDate";
pub const UPDATE_TOKEN_STATUS: &str = "/updateTokenStatus";

pub const COIN_BALANCE: &str = "/getCoinBalance";
pub const COIN_USAGE_HISTORY: &str = "/getCoinsUsageHistory";
pub const PURCHASE_SUBSCRIPTION: &str = "/purchase-subscription";

pub const UPLOAD_DOCTOR_PHOTO: &str = "/uploadDoctorPhoto";
pub const SEND_FOLLOW_UP_REMINDER: &str = "/send-Follow-up-reminder";
pub const GET_FOLLOW_UP_REMINDERS: &str = "/get-Follow-up-reminder";
pub const CONTACT_MESSAGES: &str = "/addContactMessages";
