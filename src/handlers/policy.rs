use crate::handlers::error::ApiError;
use crate::models::all_models::{Operation, UserRole};
use anyhow::{bail, Context, Result};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Which roles may perform each protected operation.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: HashMap<Operation, HashSet<UserRole>>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        AccessPolicy::empty()
            .allow(Operation::DeletePost, [UserRole::Admin])
            .allow(Operation::ReadProfile, [UserRole::User, UserRole::Admin])
    }
}

impl AccessPolicy {
    pub fn empty() -> Self {
        AccessPolicy {
            rules: HashMap::new(),
        }
    }

    /// Replaces the role set of `operation`.
    pub fn allow(mut self, operation: Operation, roles: impl IntoIterator<Item = UserRole>) -> Self {
        self.rules.insert(operation, roles.into_iter().collect());
        self
    }

    pub fn permits(&self, operation: Operation, role: UserRole) -> bool {
        self.rules
            .get(&operation)
            .is_some_and(|roles| roles.contains(&role))
    }

    pub fn check(&self, operation: Operation, role: UserRole) -> Result<(), ApiError> {
        if self.permits(operation, role) {
            Ok(())
        } else {
            Err(ApiError::InsufficientPermissions)
        }
    }

    /// Applies overrides of the form `posts.delete=admin;profile.read=user,admin`.
    /// An operation with an empty role list admits nobody.
    pub fn with_overrides(mut self, rules: &str) -> Result<Self> {
        for rule in rules.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let Some((operation, roles)) = rule.split_once('=') else {
                bail!("policy rule {:?} is missing '='", rule);
            };
            let operation = Operation::from_str(operation.trim())
                .with_context(|| format!("unknown operation in policy rule {:?}", rule))?;
            let roles = roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(|r| {
                    UserRole::from_str(r)
                        .with_context(|| format!("unknown role {:?} in policy rule {:?}", r, rule))
                })
                .collect::<Result<Vec<_>>>()?;
            self = self.allow(operation, roles);
        }
        Ok(self)
    }
}
