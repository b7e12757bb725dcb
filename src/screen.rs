//! The admin screens. Each one is the same list-management engine pointed
//! at a different endpoint and record shape.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// How a write reaches the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// `application/x-www-form-urlencoded`, envelope readable.
    Form,
    /// `multipart/form-data`, envelope readable.
    Multipart,
    /// Url-encoded POST whose response cannot be inspected.
    FireAndForget,
}

/// Which envelope field carries the success discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminator {
    /// `"status": "success" | "error"`
    Status,
    /// `"success": true | false`
    Success,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvelopeAdapter {
    pub discriminator: Discriminator,
    pub payload_key: &'static str,
}

#[derive(Debug)]
pub struct Screen {
    pub id: &'static str,
    pub title: &'static str,
    /// Key into the configured endpoint map.
    pub endpoint: &'static str,
    pub read_action: &'static str,
    pub envelope: EnvelopeAdapter,
    pub transport: Transport,
    pub id_field: &'static str,
    pub timestamp_fields: &'static [&'static str],
    pub searchable_fields: &'static [&'static str],
    pub columns: &'static [&'static str],
    pub required_on_create: &'static [&'static str],
    pub status_field: Option<&'static str>,
    pub statuses: &'static [&'static str],
    /// Reading requires an authorized session, not just writing.
    pub admin_only: bool,
}

const STATUS_DATA: EnvelopeAdapter = EnvelopeAdapter {
    discriminator: Discriminator::Status,
    payload_key: "data",
};

const SUCCESS_DATA: EnvelopeAdapter = EnvelopeAdapter {
    discriminator: Discriminator::Success,
    payload_key: "data",
};

const SUCCESS_SUBMISSIONS: EnvelopeAdapter = EnvelopeAdapter {
    discriminator: Discriminator::Success,
    payload_key: "submissions",
};

const REVIEW_STATUSES: &[&str] = &["pending", "approved", "rejected"];

pub static SCREENS: &[Screen] = &[
    Screen {
        id: "blog",
        title: "Blog Posts",
        endpoint: "blog",
        read_action: "getPosts",
        envelope: STATUS_DATA,
        transport: Transport::Form,
        id_field: "id",
        timestamp_fields: &["date", "createdAt", "timestamp"],
        searchable_fields: &["title", "author", "tags", "excerpt"],
        columns: &["id", "title", "author", "date", "status"],
        required_on_create: &["title", "content", "author"],
        status_field: Some("status"),
        statuses: &["draft", "published"],
        admin_only: false,
    },
    Screen {
        id: "gallery",
        title: "Gallery Photos",
        endpoint: "gallery",
        read_action: "getPhotos",
        envelope: SUCCESS_DATA,
        transport: Transport::Multipart,
        id_field: "id",
        timestamp_fields: &["uploadedAt", "date", "timestamp"],
        searchable_fields: &["title", "photographer", "category", "tags"],
        columns: &["id", "title", "photographer", "category", "uploadedAt"],
        required_on_create: &["title", "imageUrl", "photographer"],
        status_field: None,
        statuses: &[],
        admin_only: false,
    },
    Screen {
        id: "applications",
        title: "Membership Applications",
        endpoint: "membership",
        read_action: "getApplications",
        envelope: STATUS_DATA,
        transport: Transport::FireAndForget,
        id_field: "id",
        timestamp_fields: &["Timestamp", "submittedAt", "date"],
        searchable_fields: &["Full Name", "Email", "Student ID", "Department", "id"],
        columns: &["id", "Full Name", "Email", "Department", "status"],
        required_on_create: &["Full Name", "Email"],
        status_field: Some("status"),
        statuses: REVIEW_STATUSES,
        admin_only: true,
    },
    Screen {
        id: "submissions",
        title: "Photo Contest Submissions",
        endpoint: "contest",
        read_action: "getSubmissions",
        envelope: SUCCESS_SUBMISSIONS,
        transport: Transport::Form,
        id_field: "submissionId",
        timestamp_fields: &["timestamp", "submittedAt"],
        searchable_fields: &["name", "email", "submissionId", "photoTitle", "category"],
        columns: &["submissionId", "name", "photoTitle", "category", "status"],
        required_on_create: &["name", "email", "photoTitle"],
        status_field: Some("status"),
        statuses: REVIEW_STATUSES,
        admin_only: true,
    },
    Screen {
        id: "results",
        title: "Contest Results",
        endpoint: "results",
        read_action: "getResults",
        envelope: STATUS_DATA,
        transport: Transport::Form,
        id_field: "id",
        timestamp_fields: &["publishedAt", "date"],
        searchable_fields: &["contest", "winner", "category", "rank"],
        columns: &["id", "contest", "category", "rank", "winner"],
        required_on_create: &["contest", "winner", "rank"],
        status_field: None,
        statuses: &[],
        admin_only: false,
    },
    Screen {
        id: "payments",
        title: "Payments",
        endpoint: "payments",
        read_action: "getPayments",
        envelope: STATUS_DATA,
        transport: Transport::FireAndForget,
        id_field: "transactionId",
        timestamp_fields: &["Timestamp", "paidAt", "date"],
        searchable_fields: &["name", "email", "transactionId", "purpose"],
        columns: &["transactionId", "name", "amount", "purpose", "status"],
        required_on_create: &["name", "email", "amount", "transactionId"],
        status_field: Some("status"),
        statuses: &["pending", "verified", "rejected"],
        admin_only: true,
    },
    Screen {
        id: "admin",
        title: "Admin Records",
        endpoint: "admin",
        read_action: "getAll",
        envelope: STATUS_DATA,
        transport: Transport::Form,
        id_field: "id",
        timestamp_fields: &["timestamp", "date", "createdAt"],
        searchable_fields: &["id", "name", "email", "type"],
        columns: &["id", "name", "email", "type"],
        required_on_create: &["name"],
        status_field: None,
        statuses: &[],
        admin_only: true,
    },
];

pub fn find(id: &str) -> AppResult<&'static Screen> {
    SCREENS
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| AppError::ScreenNotFound(id.to_string()))
}

impl Screen {
    /// Dataset name used in export file names.
    pub fn dataset(&self) -> &'static str {
        self.id
    }

    pub fn accepts_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s.eq_ignore_ascii_case(status))
    }
}
