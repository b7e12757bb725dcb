//! Create, update, delete and status changes against a screen's endpoint.

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::list::{ListView, LocalEffect};
use crate::record::Record;
use crate::remote::{Ack, CollectionSource, WriteReply};
use crate::screen::Screen;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    UpdateStatus,
}

impl Action {
    /// Value of the `action` form field.
    pub fn verb(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::UpdateStatus => "updateStatus",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mutation {
    pub action: Action,
    pub payload: Record,
}

/// What we know about a write once it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The endpoint acknowledged success.
    Confirmed,
    /// The endpoint answered with a failure envelope.
    Rejected(String),
    /// Sent, but the transport hides the answer. Assumed to have worked
    /// until a refetch says otherwise.
    Unconfirmed,
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, MutationOutcome::Rejected(_))
    }

    pub fn into_result(self) -> AppResult<Self> {
        match self {
            MutationOutcome::Rejected(message) => Err(AppError::RemoteOperation(message)),
            other => Ok(other),
        }
    }
}

impl Mutation {
    /// New record. Fills in an id and creation time when the caller did not.
    pub fn create(screen: &Screen, mut payload: Record) -> Self {
        if payload.text(screen.id_field).is_none() {
            payload.set(
                screen.id_field,
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        if payload.timestamp(screen.timestamp_fields).is_none()
            && let Some(field) = screen.timestamp_fields.first()
        {
            payload.set(field, Value::String(chrono::Utc::now().to_rfc3339()));
        }
        Self {
            action: Action::Create,
            payload,
        }
    }

    pub fn update(screen: &Screen, id: &str, mut fields: Record) -> Self {
        fields.set(screen.id_field, Value::String(id.to_string()));
        Self {
            action: Action::Update,
            payload: fields,
        }
    }

    pub fn delete(screen: &Screen, id: &str) -> Self {
        let mut payload = Record::new();
        payload.set(screen.id_field, Value::String(id.to_string()));
        Self {
            action: Action::Delete,
            payload,
        }
    }

    pub fn set_status(screen: &Screen, id: &str, status: &str) -> Self {
        let mut payload = Record::new();
        payload.set(screen.id_field, Value::String(id.to_string()));
        payload.set(
            screen.status_field.unwrap_or("status"),
            Value::String(status.to_lowercase()),
        );
        Self {
            action: Action::UpdateStatus,
            payload,
        }
    }

    /// Client-side checks; nothing is sent when these fail.
    pub fn validate(&self, screen: &Screen) -> AppResult<()> {
        match self.action {
            Action::Create => {
                let missing: Vec<&str> = screen
                    .required_on_create
                    .iter()
                    .copied()
                    .filter(|f| self.payload.text(f).is_none())
                    .collect();
                if !missing.is_empty() {
                    return Err(AppError::Validation(format!(
                        "missing required field(s): {}",
                        missing.join(", ")
                    )));
                }
            }
            Action::Update | Action::Delete => self.require_id(screen)?,
            Action::UpdateStatus => {
                self.require_id(screen)?;
                let field = screen.status_field.ok_or_else(|| {
                    AppError::Validation(format!("{} records have no status", screen.title))
                })?;
                let status = self.payload.text(field).unwrap_or_default();
                if !screen.accepts_status(&status) {
                    return Err(AppError::Validation(format!(
                        "status '{status}' is not one of: {}",
                        screen.statuses.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }

    fn require_id(&self, screen: &Screen) -> AppResult<()> {
        if self.payload.text(screen.id_field).is_none() {
            return Err(AppError::Validation(format!(
                "missing record id ({})",
                screen.id_field
            )));
        }
        Ok(())
    }

    /// Flattened form fields: `action` first, then the payload in order.
    /// Arrays and objects are sent as JSON text.
    pub fn encode(&self) -> Vec<(String, String)> {
        let mut fields = vec![("action".to_string(), self.action.verb().to_string())];
        for (k, v) in self.payload.fields() {
            let text = match v {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => v.to_string(),
            };
            fields.push((k.clone(), text));
        }
        fields
    }

    fn local_effect(&self, screen: &Screen) -> LocalEffect {
        let Some(id) = self.payload.text(screen.id_field) else {
            return LocalEffect::None;
        };
        match self.action {
            Action::Create => LocalEffect::None,
            Action::Delete => LocalEffect::Remove(id),
            Action::UpdateStatus => LocalEffect::SetStatus {
                id,
                status: screen
                    .status_field
                    .and_then(|f| self.payload.text(f))
                    .unwrap_or_default(),
            },
            Action::Update => LocalEffect::Patch {
                id,
                fields: self.payload.clone(),
            },
        }
    }
}

/// Validate, send, and on success (confirmed or assumed) patch the view and
/// refetch it. A rejected write or transport failure leaves the list as it
/// was and is not retried.
pub async fn submit(
    source: &dyn CollectionSource,
    view: &mut ListView,
    session: &Session,
    mutation: &Mutation,
) -> AppResult<MutationOutcome> {
    let screen = view.screen();
    let actor = session.require_admin()?;
    mutation.validate(screen)?;

    let fields = mutation.encode();
    tracing::info!(
        "{} submitting {} to {} ({} field(s))",
        actor.email,
        mutation.action.verb(),
        source.id(),
        fields.len()
    );

    let outcome = match source.send(screen, &fields).await? {
        WriteReply::Ack(Ack::Success) => MutationOutcome::Confirmed,
        WriteReply::Ack(Ack::Failure(message)) => MutationOutcome::Rejected(message),
        WriteReply::Opaque => MutationOutcome::Unconfirmed,
    };

    if outcome.is_success() {
        view.apply_acknowledged(&mutation.local_effect(screen));
        view.refresh(source).await;
    } else {
        tracing::warn!("{} rejected by {}: {:?}", mutation.action.verb(), source.id(), outcome);
    }

    Ok(outcome)
}
