//! Admin sign-up / sign-in flow against a hosted auth backend.
//!
//! The backend itself is external; [`AuthBackend`] is the surface this crate
//! uses. On sign-up a profile document `{uid, name, email, createdAt}` is
//! written once. Nothing else is read or written, and the dashboard behind
//! the login is a static placeholder.
//!
//! [`MemoryAuthBackend`] is an in-process implementation for tests and local
//! development. Passwords are stored as Argon2id PHC strings.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,
    #[error("display name is required")]
    MissingName,
    #[error("an account already exists for {0}")]
    EmailInUse(String),
    #[error("wrong email or password")]
    InvalidCredentials,
    #[error("session is not active")]
    SessionNotFound,
    #[error("auth backend error: {0}")]
    Backend(String),
}

/// Account as returned by the backend on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub token: String,
}

/// Profile document written on sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

pub trait AuthBackend {
    fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserRecord, AuthError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
    fn write_profile(&self, profile: &UserProfile) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl SignupForm {
    /// Field checks done before anything is sent to the backend.
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        if self.display_name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }
        Ok(())
    }
}

/// Shape check only: one `@`, non-empty local part, a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let invalid = || AuthError::InvalidEmail(email.to_string());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

/// Create the account, then write its profile document.
pub fn signup(backend: &impl AuthBackend, form: &SignupForm) -> Result<UserProfile, AuthError> {
    form.validate()?;
    let email = form.email.trim();
    let name = form.display_name.trim();
    let record = backend.create_account(email, &form.password, name)?;
    let profile = UserProfile {
        uid: record.uid,
        name: record.display_name,
        email: record.email,
        created_at: Utc::now(),
    };
    backend.write_profile(&profile)?;
    log::info!("account created for {}", profile.email);
    Ok(profile)
}

pub fn login(backend: &impl AuthBackend, email: &str, password: &str) -> Result<Session, AuthError> {
    validate_email(email)?;
    let session = backend.sign_in(email.trim(), password);
    if let Err(err) = &session {
        log::warn!("sign-in failed for {}: {err}", email.trim());
    }
    session
}

pub fn logout(backend: &impl AuthBackend, session: &Session) -> Result<(), AuthError> {
    backend.sign_out(session)
}

// =============================================================================
// In-memory backend
// =============================================================================

struct Account {
    uid: String,
    email: String,
    display_name: String,
    /// PHC string: algorithm, parameters, salt and digest.
    password_hash: String,
}

#[derive(Default)]
struct MemoryState {
    /// Keyed by lowercase email.
    accounts: HashMap<String, Account>,
    profiles: HashMap<String, UserProfile>,
    /// token → uid
    sessions: HashMap<String, String>,
}

/// In-process [`AuthBackend`].
#[derive(Default)]
pub struct MemoryAuthBackend {
    state: Mutex<MemoryState>,
}

impl MemoryAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Backend("state lock poisoned".into()))
    }

    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.lock().ok()?.profiles.get(uid).cloned()
    }

    pub fn active_sessions(&self) -> usize {
        self.lock().map(|s| s.sessions.len()).unwrap_or(0)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Backend(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl AuthBackend for MemoryAuthBackend {
    fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserRecord, AuthError> {
        let mut state = self.lock()?;
        let key = email.to_ascii_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse(email.to_string()));
        }
        let account = Account {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash: hash_password(password)?,
        };
        let record = UserRecord {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
        };
        state.accounts.insert(key, account);
        Ok(record)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut state = self.lock()?;
        let uid = match state.accounts.get(&email.to_ascii_lowercase()) {
            Some(account) if verify_password(password, &account.password_hash) => {
                account.uid.clone()
            }
            _ => return Err(AuthError::InvalidCredentials),
        };
        let token = Uuid::new_v4().simple().to_string();
        state.sessions.insert(token.clone(), uid.clone());
        Ok(Session { uid, token })
    }

    fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        match state.sessions.remove(&session.token) {
            Some(_) => Ok(()),
            None => Err(AuthError::SessionNotFound),
        }
    }

    fn write_profile(&self, profile: &UserProfile) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        state.profiles.insert(profile.uid.clone(), profile.clone());
        Ok(())
    }
}
