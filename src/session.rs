// src/session.rs
//! Token persistence under fixed keys, plus an unverified look at the JWT
//! payload. The role check here is for menu routing only and is not a
//! security boundary; the backend re-checks every token.
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use tracing;

use crate::errors::{SparrowError, SparrowResult};
use crate::models::user::{JwtClaims, TokenGrant};

pub const ACCESS_TOKEN_KEY: &str = "jwt_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> SparrowResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SparrowResult<()>;
    fn remove(&self, key: &str) -> SparrowResult<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E>(_: E) -> SparrowError {
    SparrowError::Session("session lock poisoned".to_string())
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> SparrowResult<Option<String>> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SparrowResult<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SparrowResult<()> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// JSON object on disk, rewritten on every change.
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> SparrowResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                SparrowError::Session(format!("corrupt session file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> SparrowResult<()> {
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| SparrowError::JsonSerialization(e.to_string()))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> SparrowResult<Option<String>> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> SparrowResult<()> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> SparrowResult<()> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Decode the payload segment without checking the signature.
pub fn decode_claims_unverified(token: &str) -> Option<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn access_token(&self) -> SparrowResult<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> SparrowResult<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    pub fn store_grant(&self, grant: &TokenGrant) -> SparrowResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, &grant.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &grant.refresh_token)?;
        tracing::debug!("Stored new token pair");
        Ok(())
    }

    pub fn store_access_token(&self, token: &str) -> SparrowResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, token)
    }

    pub fn clear(&self) -> SparrowResult<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)
    }

    pub fn claims(&self) -> Option<JwtClaims> {
        self.access_token()
            .ok()
            .flatten()
            .and_then(|token| decode_claims_unverified(&token))
    }

    pub fn is_admin(&self) -> bool {
        self.claims()
            .and_then(|claims| claims.role)
            .is_some_and(|role| role.is_admin())
    }

    /// Tokens without an `exp` claim are treated as never expiring.
    pub fn access_token_expires_within(&self, seconds: i64) -> bool {
        self.claims()
            .and_then(|claims| claims.exp)
            .is_some_and(|exp| exp - Utc::now().timestamp() <= seconds)
    }

    /// Token for the rider/driver flow. Admin tokens are refused.
    pub fn require_user_token(&self) -> SparrowResult<String> {
        let token = self
            .access_token()?
            .ok_or_else(|| SparrowError::unauthenticated("Please log in again"))?;
        if self.is_admin() {
            return Err(SparrowError::AdminSession);
        }
        Ok(token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fake_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    fn grant(access: &str) -> TokenGrant {
        TokenGrant {
            access_token: access.to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_in: Some(900),
            user: None,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        session.store_grant(&grant("abc")).unwrap();
        assert_eq!(session.access_token().unwrap().as_deref(), Some("abc"));
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("refresh-1"));
        session.clear().unwrap();
        assert!(session.access_token().unwrap().is_none());
        assert!(session.refresh_token().unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = Session::new(Arc::new(FileSessionStore::new(&path)));
        first.store_grant(&grant("persisted")).unwrap();

        let second = Session::new(Arc::new(FileSessionStore::new(&path)));
        assert_eq!(second.access_token().unwrap().as_deref(), Some("persisted"));
        second.clear().unwrap();
        assert!(first.access_token().unwrap().is_none());
    }

    #[test]
    fn test_decode_role_and_admin_refusal() {
        let session = Session::in_memory();
        let token = fake_token(serde_json::json!({"user_id": 3, "role": "platform_admin"}));
        session.store_access_token(&token).unwrap();
        assert!(session.is_admin());
        assert!(matches!(session.require_user_token(), Err(SparrowError::AdminSession)));

        let user = fake_token(serde_json::json!({"user_id": 4, "role": "USER"}));
        session.store_access_token(&user).unwrap();
        assert_eq!(session.require_user_token().unwrap(), user);
    }

    #[test]
    fn test_garbage_tokens_decode_to_none() {
        assert!(decode_claims_unverified("not-a-jwt").is_none());
        assert!(decode_claims_unverified("a.!!!.c").is_none());
    }

    #[test]
    fn test_expiry_window() {
        let session = Session::in_memory();
        let soon = Utc::now().timestamp() + 10;
        session
            .store_access_token(&fake_token(serde_json::json!({"exp": soon})))
            .unwrap();
        assert!(session.access_token_expires_within(30));

        let later = Utc::now().timestamp() + 3600;
        session
            .store_access_token(&fake_token(serde_json::json!({"exp": later})))
            .unwrap();
        assert!(!session.access_token_expires_within(30));
    }
}
