use serde_json::json;
use tracing::info;

use shared_backend::{endpoints, BackendClient};
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_utils::validation::FieldValidator;

use crate::models::{ContactMessage, ContactReceipt};

pub const MAX_MESSAGE_CHARS: usize = 2000;

fn validate(message: &ContactMessage) -> Result<(), AppError> {
    FieldValidator::new()
        .required("name", &message.name, "Name")
        .email("email", message.email.trim())
        .phone("phone", message.phone.trim())
        .required("message", &message.message, "Message")
        .check(
            message.message.chars().count() <= MAX_MESSAGE_CHARS,
            "message",
            "Message is too long",
        )
        .finish()
}

pub struct ContactService {
    backend: BackendClient,
}

impl ContactService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn submit(&self, message: ContactMessage) -> Result<ContactReceipt, AppError> {
        validate(&message)?;

        let envelope = self
            .backend
            .post(
                endpoints::CONTACT_MESSAGES,
                json!({
                    "name": message.name.trim(),
                    "email": message.email.trim(),
                    "phone": message.phone.trim(),
                    "message": message.message.trim()
                }),
                None,
            )
            .await?;

        info!("Contact message received");

        Ok(ContactReceipt {
            notice: Notice::success("Message sent", envelope.message_or("Thank you! We will get back to you soon."))
                .auto_dismiss(4000),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn message(email: &str, phone: &str, body: &str) -> ContactMessage {
        ContactMessage {
            name: "Asha".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            message: body.to_string(),
        }
    }

    #[test]
    fn complete_message_passes() {
        assert!(validate(&message("asha@example.com", "9876543210", "Hello")).is_ok());
    }

    #[test]
    fn every_bad_field_is_reported() {
        assert_matches!(
            validate(&message("not-an-email", "123", "")),
            Err(AppError::FieldValidation(fields)) if fields.len() == 3
        );
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert_matches!(
            validate(&message("asha@example.com", "9876543210", &long)),
            Err(AppError::FieldValidation(fields)) if fields[0].field == "message"
        );
    }
}
