use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::Validator;

string_enum! {
    pub enum MessageStatus {
        Unread => "unread",
        Read => "read",
        Replied => "replied",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
    pub is_starred: bool,
    pub admin_notes: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public contact-form submission.
#[derive(Debug, Default, Deserialize)]
pub struct MessageInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl Message {
    pub fn submit(
        input: MessageInput,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Self, ApiError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        let subject = input.subject.trim().to_string();
        let body = input.message.trim().to_string();

        let mut v = Validator::new();
        v.required("name", &name, "Name is required")
            .max_len("name", &name, 100, "Name cannot exceed 100 characters")
            .required("email", &email, "Email is required")
            .email("email", &email, "Please enter a valid email")
            .required("subject", &subject, "Subject is required")
            .max_len("subject", &subject, 200, "Subject cannot exceed 200 characters")
            .required("message", &body, "Message is required")
            .max_len("message", &body, 2000, "Message cannot exceed 2000 characters");
        v.finish()?;

        let now = Utc::now();
        Ok(Message {
            id: Uuid::new_v4(),
            name,
            email,
            subject,
            message: body,
            status: MessageStatus::Unread,
            is_starred: false,
            admin_notes: String::new(),
            ip_address,
            user_agent,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
