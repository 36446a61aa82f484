//! Account service
//!
//! Sign-up, sign-in, sign-out, and session lookup over the store. Every
//! state change is announced on a broadcast channel so listeners (the
//! toast hub, WebSocket clients, tests) can follow auth state.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::{AuthError, AuthResult};
use super::password::{hash_password, unknown_account, verify_password};
use crate::forms::{normalize_email, LoginForm, SignUpForm};
use crate::store::{Session, Store, StoreError, UserProfile};

/// Auth state change delivered to every subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn { user_id: String, email: String },
    SignedOut { user_id: String },
}

/// An open session handed back to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl: Duration,
    pub event_capacity: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            event_capacity: 64,
        }
    }
}

pub struct AuthService {
    store: Arc<Store>,
    config: AuthConfig,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthService {
    pub fn new(store: Arc<Store>, config: AuthConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            store,
            config,
            events,
        }
    }

    /// Listen for sign-in and sign-out events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Create an account and open its first session
    pub fn sign_up(&self, form: &SignUpForm) -> AuthResult<AuthSession> {
        let valid = form.validate()?;

        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            full_name: valid.full_name,
            age: valid.age,
            email: valid.email,
            created_at: Utc::now(),
        };
        let credential = hash_password(&form.password);

        match self.store.create_user(&profile, &credential) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %profile.id, "Account created");
        self.open_session(profile)
    }

    /// Check credentials and open a session
    pub fn sign_in(&self, form: &LoginForm) -> AuthResult<AuthSession> {
        form.validate()?;

        let email = normalize_email(&form.email);
        let Some((profile, credential)) = self.store.user_by_email(&email)? else {
            std::hint::black_box(verify_password(&unknown_account(), &form.password));
            tracing::warn!("Login failed");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&credential, &form.password) {
            tracing::warn!(user_id = %profile.id, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(profile)
    }

    /// Close a session; returns whether one was open
    pub fn sign_out(&self, token: &str) -> AuthResult<bool> {
        let Some(session) = self.store.session(token)? else {
            return Ok(false);
        };
        self.store.delete_session(token)?;

        tracing::info!(user_id = %session.user_id, "Signed out");
        let _ = self.events.send(AuthEvent::SignedOut {
            user_id: session.user_id,
        });
        Ok(true)
    }

    /// Resolve a bearer token to its member
    ///
    /// An expired session is removed on first sight.
    pub fn current_user(&self, token: &str) -> AuthResult<UserProfile> {
        let session = self
            .store
            .session(token)?
            .ok_or(AuthError::Unauthenticated)?;

        if session.is_expired(Utc::now()) {
            self.store.delete_session(token)?;
            let _ = self.events.send(AuthEvent::SignedOut {
                user_id: session.user_id,
            });
            return Err(AuthError::SessionExpired);
        }

        self.store
            .user(&session.user_id)?
            .ok_or(AuthError::Unauthenticated)
    }

    /// Drop expired sessions; returns how many were removed
    pub fn purge_expired(&self) -> AuthResult<usize> {
        let removed = self.store.purge_expired_sessions(Utc::now())?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }

    fn open_session(&self, user: UserProfile) -> AuthResult<AuthSession> {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + self.config.session_ttl,
        };
        self.store.insert_session(&session)?;

        tracing::info!(user_id = %user.id, "Signed in");
        let _ = self.events.send(AuthEvent::SignedIn {
            user_id: user.id.clone(),
            email: user.email.clone(),
        });

        Ok(AuthSession {
            token: session.token,
            user,
            expires_at: session.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::INVALID_CREDENTIALS;

    fn service() -> AuthService {
        AuthService::new(Arc::new(Store::in_memory().unwrap()), AuthConfig::default())
    }

    fn signup(email: &str) -> SignUpForm {
        SignUpForm {
            full_name: "Abebe Kebede".to_string(),
            age: "34".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let auth = service();
        let session = auth.sign_up(&signup("guest@kuriftu.com")).unwrap();
        assert_eq!(session.user.email, "guest@kuriftu.com");

        let again = auth.sign_in(&login("Guest@Kuriftu.com", "secret1")).unwrap();
        assert_eq!(again.user.id, session.user.id);
        assert_ne!(again.token, session.token);

        let me = auth.current_user(&again.token).unwrap();
        assert_eq!(me.full_name, "Abebe Kebede");
    }

    #[test]
    fn test_duplicate_email() {
        let auth = service();
        auth.sign_up(&signup("guest@kuriftu.com")).unwrap();
        let err = auth.sign_up(&signup("GUEST@kuriftu.com")).unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn test_login_failure_does_not_enumerate() {
        let auth = service();
        auth.sign_up(&signup("guest@kuriftu.com")).unwrap();

        let wrong_password = auth
            .sign_in(&login("guest@kuriftu.com", "nope123"))
            .unwrap_err();
        let unknown_email = auth
            .sign_in(&login("nobody@kuriftu.com", "secret1"))
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS);
        assert_eq!(unknown_email.to_string(), INVALID_CREDENTIALS);
    }

    #[test]
    fn test_sign_up_validation() {
        let auth = service();
        let mut form = signup("guest@kuriftu.com");
        form.password = "abc".to_string();
        assert!(matches!(
            auth.sign_up(&form).unwrap_err(),
            AuthError::Validation(_)
        ));
    }

    #[test]
    fn test_sign_out() {
        let auth = service();
        let session = auth.sign_up(&signup("guest@kuriftu.com")).unwrap();

        assert!(auth.sign_out(&session.token).unwrap());
        assert!(!auth.sign_out(&session.token).unwrap());
        assert!(matches!(
            auth.current_user(&session.token).unwrap_err(),
            AuthError::Unauthenticated
        ));
    }

    #[test]
    fn test_expired_session() {
        let auth = AuthService::new(
            Arc::new(Store::in_memory().unwrap()),
            AuthConfig {
                session_ttl: Duration::zero(),
                ..Default::default()
            },
        );
        let session = auth.sign_up(&signup("guest@kuriftu.com")).unwrap();
        assert!(matches!(
            auth.current_user(&session.token).unwrap_err(),
            AuthError::SessionExpired
        ));
        assert_eq!(auth.purge_expired().unwrap(), 0);
    }

    #[test]
    fn test_listeners_see_auth_changes() {
        let auth = service();
        let mut first = auth.subscribe();
        let mut second = auth.subscribe();

        let session = auth.sign_up(&signup("guest@kuriftu.com")).unwrap();
        auth.sign_out(&session.token).unwrap();

        for rx in [&mut first, &mut second] {
            assert!(matches!(rx.try_recv().unwrap(), AuthEvent::SignedIn { .. }));
            assert_eq!(
                rx.try_recv().unwrap(),
                AuthEvent::SignedOut {
                    user_id: session.user.id.clone()
                }
            );
        }
    }
}
