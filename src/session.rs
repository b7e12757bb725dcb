//! Who is at the console. Authentication happens elsewhere; this is the
//! identity it produced, handed explicitly to every operation that needs it.

use crate::error::{AppError, AppResult};
use crate::screen::Screen;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
    admins: Vec<String>,
}

impl Session {
    pub fn new(email: Option<&str>, admins: &[String]) -> Self {
        Self {
            identity: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(|e| Identity {
                    email: e.to_lowercase(),
                }),
            admins: admins.iter().map(|a| a.trim().to_lowercase()).collect(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        match &self.identity {
            Some(id) => self.admins.is_empty() || self.admins.contains(&id.email),
            None => false,
        }
    }

    /// Identity allowed to change records.
    pub fn require_admin(&self) -> AppResult<&Identity> {
        let id = self
            .identity
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("sign in with --as <email>".into()))?;
        if !self.is_admin() {
            return Err(AppError::Unauthorized(format!(
                "{} is not on the admin list",
                id.email
            )));
        }
        Ok(id)
    }

    pub fn authorize_read(&self, screen: &Screen) -> AppResult<()> {
        if screen.admin_only {
            self.require_admin()?;
        }
        Ok(())
    }
}
