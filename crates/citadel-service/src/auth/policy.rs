//! Permission policy store.
//!
//! Grants (`p, <subject>, <code>`) and role assignments (`g, <subject>, <role>`)
//! live in a Casbin enforcer guarded by a `tokio::sync::RwLock`. Reads share the
//! lock; every mutation takes the write lock, so a reader never observes a
//! half-applied multi-rule change such as a role cascade delete.
//!
//! Implicit resolution walks role assignments breadth-first with a visited
//! set, so assignment cycles terminate, and stops after `max_depth` hops.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use casbin::{CoreApi, MgmtApi};
use salvo::async_trait;
use tokio::sync::RwLock;

use super::subject::Subject;
use crate::error::{ServiceError, ServiceResult};

pub struct PolicyStore {
    enforcer: RwLock<casbin::Enforcer>,
    max_depth: usize,
}

impl std::fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl PolicyStore {
    #[must_use]
    pub fn new(enforcer: casbin::Enforcer, max_depth: usize) -> Self {
        Self {
            enforcer: RwLock::new(enforcer),
            max_depth,
        }
    }

    /// ## Summary
    /// Builds a store over a fresh in-memory enforcer.
    ///
    /// ## Errors
    /// Returns an error if the Casbin model cannot be loaded.
    pub async fn in_memory(max_depth: usize) -> ServiceResult<Self> {
        Ok(Self::new(super::casbin::init_casbin().await?, max_depth))
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// ## Summary
    /// Grants `code` directly to `subject`.
    ///
    /// Returns `false` if the grant already existed.
    ///
    /// ## Errors
    /// Returns an error if Casbin rejects the rule.
    #[tracing::instrument(skip(self, subject), fields(subject = %subject))]
    pub async fn add_permission(&self, subject: &Subject, code: &str) -> ServiceResult<bool> {
        let added = self
            .enforcer
            .write()
            .await
            .add_policy(vec![subject.casbin_subject(), code.to_string()])
            .await?;
        tracing::debug!(added, "Grant added");
        Ok(added)
    }

    /// ## Summary
    /// Revokes a direct grant. Returns `false` if there was nothing to revoke.
    ///
    /// ## Errors
    /// Returns an error if Casbin fails to update the policy.
    #[tracing::instrument(skip(self, subject), fields(subject = %subject))]
    pub async fn delete_permission(&self, subject: &Subject, code: &str) -> ServiceResult<bool> {
        let removed = self
            .enforcer
            .write()
            .await
            .remove_policy(vec![subject.casbin_subject(), code.to_string()])
            .await?;
        tracing::debug!(removed, "Grant removed");
        Ok(removed)
    }

    /// Replaces every direct grant of `subject` with `codes`.
    ///
    /// ## Errors
    /// Returns an error if Casbin fails to update the policy.
    #[tracing::instrument(skip(self, subject, codes), fields(subject = %subject))]
    pub async fn set_permissions<I, S>(&self, subject: &Subject, codes: I) -> ServiceResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sub = subject.casbin_subject();
        let codes: BTreeSet<String> = codes.into_iter().map(Into::into).collect();

        let mut enforcer = self.enforcer.write().await;
        enforcer.remove_filtered_policy(0, vec![sub.clone()]).await?;
        for code in &codes {
            enforcer.add_policy(vec![sub.clone(), code.clone()]).await?;
        }
        tracing::debug!(count = codes.len(), "Grants replaced");
        Ok(())
    }

    /// Direct grants of `subject`, without following role assignments.
    pub async fn permissions(&self, subject: &Subject) -> BTreeSet<String> {
        let enforcer = self.enforcer.read().await;
        direct_codes(&enforcer, &subject.casbin_subject())
    }

    /// ## Summary
    /// Returns `true` if `subject` holds `code` directly or through any role
    /// reachable within the depth bound.
    ///
    /// ## Errors
    /// Returns `CasbinError` if Casbin evaluation fails.
    pub async fn has_permission(&self, subject: &Subject, code: &str) -> ServiceResult<bool> {
        let enforcer = self.enforcer.read().await;

        for sub in self.reachable(&enforcer, subject) {
            let allowed = enforcer
                .enforce((sub.as_str(), code))
                .map_err(ServiceError::CasbinError)?;

            tracing::trace!(subject = %sub, code, allowed, "Subject check result");

            if allowed {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Every permission code `subject` holds, directly or through roles.
    pub async fn implicit_permissions(&self, subject: &Subject) -> BTreeSet<String> {
        let enforcer = self.enforcer.read().await;
        self.reachable(&enforcer, subject)
            .iter()
            .flat_map(|sub| direct_codes(&enforcer, sub))
            .collect()
    }

    /// ## Summary
    /// Assigns the role `role_code` to `subject`.
    ///
    /// Returns `false` if the assignment already existed.
    ///
    /// ## Errors
    /// Returns `ValidationError` when a role is assigned to itself, or an
    /// error if Casbin rejects the rule.
    #[tracing::instrument(skip(self, subject), fields(subject = %subject))]
    pub async fn add_role(&self, subject: &Subject, role_code: &str) -> ServiceResult<bool> {
        if subject.role_code() == Some(role_code) {
            return Err(ServiceError::ValidationError(format!(
                "role '{role_code}' cannot be assigned to itself"
            )));
        }

        let added = self
            .enforcer
            .write()
            .await
            .add_grouping_policy(vec![
                subject.casbin_subject(),
                Subject::role(role_code).casbin_subject(),
            ])
            .await?;
        tracing::debug!(added, "Role assigned");
        Ok(added)
    }

    /// Returns `true` if `role_code` is assigned directly to `subject`.
    pub async fn has_role(&self, subject: &Subject, role_code: &str) -> bool {
        self.enforcer.read().await.has_grouping_policy(vec![
            subject.casbin_subject(),
            Subject::role(role_code).casbin_subject(),
        ])
    }

    /// ## Summary
    /// Removes the direct assignment of `role_code` to `subject`.
    ///
    /// ## Errors
    /// Returns an error if Casbin fails to update the policy.
    #[tracing::instrument(skip(self, subject), fields(subject = %subject))]
    pub async fn delete_role_for(&self, subject: &Subject, role_code: &str) -> ServiceResult<bool> {
        let removed = self
            .enforcer
            .write()
            .await
            .remove_grouping_policy(vec![
                subject.casbin_subject(),
                Subject::role(role_code).casbin_subject(),
            ])
            .await?;
        Ok(removed)
    }

    /// Role codes assigned directly to `subject`.
    pub async fn roles(&self, subject: &Subject) -> BTreeSet<String> {
        let enforcer = self.enforcer.read().await;
        direct_roles(&enforcer, &subject.casbin_subject())
            .into_iter()
            .filter_map(|sub| role_code_of(&sub))
            .collect()
    }

    /// Role codes reachable from `subject` within the depth bound.
    pub async fn implicit_roles(&self, subject: &Subject) -> BTreeSet<String> {
        let enforcer = self.enforcer.read().await;
        self.reachable(&enforcer, subject)
            .into_iter()
            .skip(1)
            .filter_map(|sub| role_code_of(&sub))
            .collect()
    }

    /// ## Summary
    /// Deletes a role: its grants, the assignments of the role to anyone, and
    /// the role's own assignments. Applied under a single write lock.
    ///
    /// Returns `false` if nothing referenced the role.
    ///
    /// ## Errors
    /// Returns an error if Casbin fails to update the policy.
    #[tracing::instrument(skip(self))]
    pub async fn delete_role(&self, role_code: &str) -> ServiceResult<bool> {
        let role = Subject::role(role_code).casbin_subject();

        let mut enforcer = self.enforcer.write().await;
        let assignments = enforcer
            .remove_filtered_grouping_policy(1, vec![role.clone()])
            .await?;
        let inherited = enforcer
            .remove_filtered_grouping_policy(0, vec![role.clone()])
            .await?;
        let grants = enforcer.remove_filtered_policy(0, vec![role]).await?;

        tracing::debug!(assignments, inherited, grants, "Role removed from policy");
        Ok(assignments || inherited || grants)
    }

    /// ## Summary
    /// Moves every grant and assignment of `old_code` over to `new_code`.
    ///
    /// ## Errors
    /// Returns an error if Casbin fails to update the policy.
    #[tracing::instrument(skip(self))]
    pub async fn rename_role(&self, old_code: &str, new_code: &str) -> ServiceResult<()> {
        if old_code == new_code {
            return Ok(());
        }
        let old = Subject::role(old_code).casbin_subject();
        let new = Subject::role(new_code).casbin_subject();

        let mut enforcer = self.enforcer.write().await;
        let grants = enforcer.get_filtered_policy(0, vec![old.clone()]);
        let holders = enforcer.get_filtered_grouping_policy(1, vec![old.clone()]);
        let parents = enforcer.get_filtered_grouping_policy(0, vec![old.clone()]);

        enforcer.remove_filtered_policy(0, vec![old.clone()]).await?;
        enforcer
            .remove_filtered_grouping_policy(1, vec![old.clone()])
            .await?;
        enforcer
            .remove_filtered_grouping_policy(0, vec![old])
            .await?;

        for rule in grants {
            if let Some(code) = rule.get(1) {
                enforcer.add_policy(vec![new.clone(), code.clone()]).await?;
            }
        }
        for rule in holders {
            if let Some(holder) = rule.first() {
                enforcer
                    .add_grouping_policy(vec![holder.clone(), new.clone()])
                    .await?;
            }
        }
        for rule in parents {
            if let Some(parent) = rule.get(1) {
                enforcer
                    .add_grouping_policy(vec![new.clone(), parent.clone()])
                    .await?;
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Loads `p, <subject>, <code>` and `g, <subject>, <role subject>` lines.
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// Returns the number of rules that were newly added.
    ///
    /// ## Errors
    /// Returns `ValidationError` naming the first malformed line.
    #[tracing::instrument(skip(self, text))]
    pub async fn load_policy_text(&self, text: &str) -> ServiceResult<usize> {
        let mut enforcer = self.enforcer.write().await;
        let mut added = 0;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let invalid = || ServiceError::ValidationError(format!("policy line {}: '{line}'", index + 1));

            let inserted = match fields.as_slice() {
                ["p", sub, code] if !code.is_empty() => {
                    Subject::from_casbin_subject(sub).ok_or_else(invalid)?;
                    enforcer
                        .add_policy(vec![(*sub).to_string(), (*code).to_string()])
                        .await?
                }
                ["g", sub, role] => {
                    Subject::from_casbin_subject(sub).ok_or_else(invalid)?;
                    match Subject::from_casbin_subject(role) {
                        Some(Subject::Role(_)) if sub != role => {}
                        _ => return Err(invalid()),
                    }
                    enforcer
                        .add_grouping_policy(vec![(*sub).to_string(), (*role).to_string()])
                        .await?
                }
                _ => return Err(invalid()),
            };
            if inserted {
                added += 1;
            }
        }

        tracing::info!(added, "Policy seed loaded");
        Ok(added)
    }

    /// Breadth-first walk over role assignments starting at `subject`.
    ///
    /// The first element is always the subject itself. Each subject appears
    /// once, and nothing more than `max_depth` hops away is returned.
    fn reachable(&self, enforcer: &casbin::Enforcer, subject: &Subject) -> Vec<String> {
        let start = subject.casbin_subject();
        let mut visited: HashSet<String> = HashSet::from([start.clone()]);
        let mut order = vec![start.clone()];
        let mut frontier = VecDeque::from([(start, 0_usize)]);

        while let Some((current, depth)) = frontier.pop_front() {
            let parents = direct_roles(enforcer, &current);
            if depth >= self.max_depth {
                if !parents.is_empty() {
                    tracing::debug!(subject = %current, depth, "Role depth limit reached");
                }
                continue;
            }

            for parent in parents {
                if visited.insert(parent.clone()) {
                    order.push(parent.clone());
                    frontier.push_back((parent, depth + 1));
                }
            }
        }
        order
    }
}

fn direct_codes(enforcer: &casbin::Enforcer, sub: &str) -> BTreeSet<String> {
    enforcer
        .get_filtered_policy(0, vec![sub.to_string()])
        .into_iter()
        .filter_map(|rule| rule.into_iter().nth(1))
        .collect()
}

fn direct_roles(enforcer: &casbin::Enforcer, sub: &str) -> Vec<String> {
    enforcer
        .get_filtered_grouping_policy(0, vec![sub.to_string()])
        .into_iter()
        .filter_map(|rule| rule.into_iter().nth(1))
        .collect()
}

fn role_code_of(sub: &str) -> Option<String> {
    match Subject::from_casbin_subject(sub)? {
        Subject::Role(code) => Some(code),
        Subject::User(_) => None,
    }
}

pub struct PolicyStoreHandler {
    pub policy: Arc<PolicyStore>,
}

#[async_trait]
impl salvo::Handler for PolicyStoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.policy.clone());
    }
}

/// ## Summary
/// Retrieves the policy store from the depot.
///
/// ## Errors
/// Returns an error if the policy store is not found in the depot.
pub fn get_policy_store_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<PolicyStore>> {
    depot
        .obtain::<Arc<PolicyStore>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Policy store not found in depot"))
}
