pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;

pub use client::BackendClient;
pub use envelope::Envelope;
pub use error::BackendError;
pub use reqwest::Method;
pub use reqwest::multipart;
