pub mod date_display;
pub mod extractor;
pub mod request_tracker;
pub mod session;
pub mod test_utils;
pub mod validation;
