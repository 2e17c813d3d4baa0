//! Identity provider seam.
//!
//! The chat only needs to know who is signed in and when that changes. Account
//! flows (sign-up, OTP, password reset, OAuth) belong to whichever provider
//! sits behind [`IdentityProvider`].

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("enter a display name")]
    MissingName,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub name: String,
}

pub type AuthListener = Box<dyn Fn(Option<&User>) + Send + Sync>;

pub trait IdentityProvider: Send {
    fn current_user(&self) -> Option<&User>;
    fn sign_in(&mut self, credentials: &Credentials) -> Result<User, AuthError>;
    fn sign_out(&mut self);
    fn on_auth_state_change(&mut self, listener: AuthListener);
}

/// In-process provider that signs in any well-formed email. Nothing is stored.
#[derive(Default)]
pub struct LocalIdentity {
    user: Option<User>,
    listeners: Vec<AuthListener>,
}

impl LocalIdentity {
    fn notify(&self) {
        for listener in &self.listeners {
            listener(self.user.as_ref());
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

impl IdentityProvider for LocalIdentity {
    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn sign_in(&mut self, credentials: &Credentials) -> Result<User, AuthError> {
        let email = credentials.email.trim();
        if !is_plausible_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let name = credentials.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
        };
        self.user = Some(user.clone());
        tracing::info!(user_id = %user.id, "signed in");
        self.notify();
        Ok(user)
    }

    fn sign_out(&mut self) {
        if self.user.take().is_some() {
            tracing::info!("signed out");
            self.notify();
        }
    }

    fn on_auth_state_change(&mut self, listener: AuthListener) {
        self.listeners.push(listener);
    }
}
