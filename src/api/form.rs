//! Purpose: Model the two optional identifying fields and their wire encoding.
//! Exports: `FormInput`, `IdentifyRequest`.
//! Role: Boundary between user-entered text and the identify request body.
//! Invariants: No format validation; absent fields are sent as empty strings.
//! Invariants: Wire body always carries `email` then `phoneNumber`.
use serde::Serialize;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormInput {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn to_request(&self) -> IdentifyRequest<'_> {
        IdentifyRequest {
            email: self.email.as_deref().unwrap_or(""),
            phone_number: self.phone.as_deref().unwrap_or(""),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct IdentifyRequest<'a> {
    pub email: &'a str,
    #[serde(rename = "phoneNumber")]
    pub phone_number: &'a str,
}
