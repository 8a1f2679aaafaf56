use crate::handlers::password::{parse_password_hash, verify_password};
use crate::models::all_models::{Subject, UserRole};
use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Resolves a username/password pair to the subject it belongs to.
pub trait CredentialDirectory: Send + Sync {
    fn resolve(&self, username: &str, password: &str) -> Option<Subject>;
}

#[derive(Debug, Clone)]
pub enum StoredPassword {
    Plain(String),
    Argon2(String),
}

impl StoredPassword {
    fn matches(&self, username: &str, candidate: &str) -> bool {
        match self {
            StoredPassword::Plain(stored) => stored == candidate,
            StoredPassword::Argon2(hash) => match verify_password(candidate, hash) {
                Ok(ok) => ok,
                Err(e) => {
                    error!("Password check failed for {}: {}", username, e);
                    false
                }
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub id: String,
    pub username: String,
    pub password: StoredPassword,
    pub role: UserRole,
}

// Directory file entry
#[derive(Debug, Deserialize)]
struct DirectoryRecord {
    id: String,
    username: String,
    password: Option<String>,
    password_hash: Option<String>,
    role: UserRole,
}

impl TryFrom<DirectoryRecord> for DirectoryEntry {
    type Error = anyhow::Error;

    fn try_from(record: DirectoryRecord) -> Result<Self> {
        let password = match (record.password, record.password_hash) {
            (Some(plain), None) => StoredPassword::Plain(plain),
            (None, Some(hash)) => {
                parse_password_hash(&hash)
                    .with_context(|| format!("entry {:?}", record.username))?;
                StoredPassword::Argon2(hash)
            }
            (Some(_), Some(_)) => bail!(
                "entry {:?} sets both password and password_hash",
                record.username
            ),
            (None, None) => bail!(
                "entry {:?} sets neither password nor password_hash",
                record.username
            ),
        };
        Ok(DirectoryEntry {
            id: record.id,
            username: record.username,
            password,
            role: record.role,
        })
    }
}

/// In-memory directory, read-only once built.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    entries: Vec<DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.username.as_str()) {
                bail!("duplicate username {:?} in credential directory", entry.username);
            }
        }
        Ok(StaticDirectory { entries })
    }

    /// The two demo accounts.
    pub fn demo() -> Self {
        StaticDirectory {
            entries: vec![
                DirectoryEntry {
                    id: "u1".to_string(),
                    username: "user1".to_string(),
                    password: StoredPassword::Plain("pass1".to_string()),
                    role: UserRole::User,
                },
                DirectoryEntry {
                    id: "u2".to_string(),
                    username: "admin1".to_string(),
                    password: StoredPassword::Plain("pass2".to_string()),
                    role: UserRole::Admin,
                },
            ],
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let records: Vec<DirectoryRecord> =
            serde_json::from_str(raw).context("Failed to parse credential directory")?;
        let entries = records
            .into_iter()
            .map(DirectoryEntry::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let directory = Self::from_json_str(&raw)
            .with_context(|| format!("Invalid credential directory {}", path.display()))?;
        if directory.is_empty() {
            warn!("{} has no entries, every login will fail", path.display());
        } else {
            info!(
                "Loaded {} directory entries from {}",
                directory.len(),
                path.display()
            );
        }
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialDirectory for StaticDirectory {
    fn resolve(&self, username: &str, password: &str) -> Option<Subject> {
        self.entries
            .iter()
            .find(|entry| entry.username == username)
            .filter(|entry| entry.password.matches(username, password))
            .map(|entry| Subject {
                id: entry.id.clone(),
                role: entry.role,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::password::hash_password;

    #[test]
    fn demo_users_resolve() {
        let directory = StaticDirectory::demo();
        assert_eq!(
            directory.resolve("user1", "pass1"),
            Some(Subject { id: "u1".into(), role: UserRole::User })
        );
        assert_eq!(
            directory.resolve("admin1", "pass2"),
            Some(Subject { id: "u2".into(), role: UserRole::Admin })
        );
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let directory = StaticDirectory::demo();
        assert!(directory.resolve("Admin1", "pass2").is_none());
        assert!(directory.resolve("admin1", "PASS2").is_none());
        assert!(directory.resolve("admin1", "pass1").is_none());
        assert!(directory.resolve("invalid", "invalid").is_none());
        assert!(directory.resolve("", "").is_none());
    }

    #[test]
    fn hashed_entries_from_json() {
        let hash = hash_password("s3cret").unwrap();
        let raw = serde_json::json!([
            { "id": "u7", "username": "ops", "password_hash": hash, "role": "admin" },
            { "id": "u8", "username": "reader", "password": "plain", "role": "user" }
        ])
        .to_string();
        let directory = StaticDirectory::from_json_str(&raw).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.resolve("ops", "s3cret").unwrap().id, "u7");
        assert!(directory.resolve("ops", "wrong").is_none());
        assert_eq!(directory.resolve("reader", "plain").unwrap().role, UserRole::User);
    }

    #[test]
    fn empty_directory_admits_nobody() {
        let directory = StaticDirectory::from_json_str("[]").unwrap();
        assert!(directory.is_empty());
        assert_eq!(directory.len(), 0);
        assert!(directory.resolve("admin1", "pass2").is_none());
        assert!(!StaticDirectory::demo().is_empty());
    }

    #[test]
    fn rejects_entries_without_exactly_one_password() {
        let neither = r#"[{ "id": "u1", "username": "a", "role": "user" }]"#;
        assert!(StaticDirectory::from_json_str(neither).is_err());

        let both = r#"[{ "id": "u1", "username": "a", "password": "x",
                         "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA", "role": "user" }]"#;
        assert!(StaticDirectory::from_json_str(both).is_err());
    }

    #[test]
    fn rejects_bad_hashes_roles_and_duplicates() {
        let bad_hash = r#"[{ "id": "u1", "username": "a", "password_hash": "nope", "role": "user" }]"#;
        assert!(StaticDirectory::from_json_str(bad_hash).is_err());

        let bad_role = r#"[{ "id": "u1", "username": "a", "password": "x", "role": "root" }]"#;
        assert!(StaticDirectory::from_json_str(bad_role).is_err());

        let dupes = r#"[{ "id": "u1", "username": "a", "password": "x", "role": "user" },
                        { "id": "u2", "username": "a", "password": "y", "role": "admin" }]"#;
        assert!(StaticDirectory::from_json_str(dupes).is_err());
    }
}
