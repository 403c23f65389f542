//! Hierarchical authorization: resolves the effective scope of an
//! authenticated user from their *active* level, and applies that scope to
//! collections of employees and their derived records. Applied server-side
//! on every aggregate listing; clients never self-limit.

use crate::error::Result;
use crate::models::coordination::Coordination;
use crate::models::user::{Nivel, User};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub const NO_COORDINATION_MESSAGE: &str =
    "No coordination is assigned to your account; ask an administrator to assign one";

/// Effective scope of a caller. `CoordinatorUnassigned` is a success state,
/// distinct from both an error and a generic empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    AdminAll,
    Coordinator { coordination_ids: Vec<Uuid> },
    CoordinatorUnassigned,
    SelfOnly { email: String },
}

/// A filtered collection plus the explanatory message for the
/// no-coordination case, so the UI can say more than "no data yet".
#[derive(Debug, Clone, Serialize)]
pub struct ScopedList<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ScopedList<T> {
    fn plain(items: Vec<T>) -> Self {
        Self {
            items,
            message: None,
        }
    }

    fn unassigned() -> Self {
        Self {
            items: Vec::new(),
            message: Some(NO_COORDINATION_MESSAGE.to_string()),
        }
    }
}

/// Resolves scope from the user's active level, in rule order. Never fails
/// for a well-formed authenticated user; callers that are not
/// authenticated never reach this point.
pub fn resolve_scope(user: &User, coordinations: &[Coordination]) -> Scope {
    match user.active_nivel() {
        Some(Nivel::Administrator) if user.has_level(Nivel::Administrator) => Scope::AdminAll,
        Some(Nivel::Coordinator) => {
            let ids: Vec<Uuid> = coordinations
                .iter()
                .filter(|c| c.is_active && c.coordinator_email.as_deref() == Some(user.email.as_str()))
                .map(|c| c.id)
                .collect();
            if ids.is_empty() {
                Scope::CoordinatorUnassigned
            } else {
                Scope::Coordinator {
                    coordination_ids: ids,
                }
            }
        }
        _ => Scope::SelfOnly {
            email: user.email.clone(),
        },
    }
}

/// Filters employees: coordinators keep only members of their active
/// coordinations; collaborators keep only themselves. `memberships` maps a
/// user id to the coordination ids that user belongs to.
pub fn filter_employees(
    scope: &Scope,
    employees: Vec<User>,
    memberships: &HashMap<Uuid, Vec<Uuid>>,
) -> ScopedList<User> {
    match scope {
        Scope::AdminAll => ScopedList::plain(employees),
        Scope::Coordinator { coordination_ids } => {
            let allowed: HashSet<&Uuid> = coordination_ids.iter().collect();
            let items = employees
                .into_iter()
                .filter(|u| {
                    memberships
                        .get(&u.id)
                        .map(|ids| ids.iter().any(|id| allowed.contains(id)))
                        .unwrap_or(false)
                })
                .collect();
            ScopedList::plain(items)
        }
        Scope::CoordinatorUnassigned => ScopedList::unassigned(),
        Scope::SelfOnly { email } => {
            let items = employees.into_iter().filter(|u| &u.email == email).collect();
            ScopedList::plain(items)
        }
    }
}

/// Filters derived records (clock records, absences) by their owning
/// employee. `owner_email` extracts the owner; `owner_coordinations` maps
/// an owner email to that employee's coordination ids.
pub fn filter_records<T>(
    scope: &Scope,
    records: Vec<T>,
    owner_email: impl Fn(&T) -> &str,
    owner_coordinations: &HashMap<String, Vec<Uuid>>,
) -> ScopedList<T> {
    match scope {
        Scope::AdminAll => ScopedList::plain(records),
        Scope::Coordinator { coordination_ids } => {
            let allowed: HashSet<&Uuid> = coordination_ids.iter().collect();
            let items = records
                .into_iter()
                .filter(|r| {
                    owner_coordinations
                        .get(owner_email(r))
                        .map(|ids| ids.iter().any(|id| allowed.contains(id)))
                        .unwrap_or(false)
                })
                .collect();
            ScopedList::plain(items)
        }
        Scope::CoordinatorUnassigned => ScopedList::unassigned(),
        Scope::SelfOnly { email } => {
            let items = records
                .into_iter()
                .filter(|r| owner_email(r) == email.as_str())
                .collect();
            ScopedList::plain(items)
        }
    }
}

#[derive(Clone)]
pub struct ScopeService {
    pool: PgPool,
}

impl ScopeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the coordinations the user could coordinate and resolves the
    /// scope for this request.
    pub async fn resolve(&self, user: &User) -> Result<Scope> {
        let coordinations = sqlx::query_as::<_, Coordination>(
            "SELECT * FROM coordinations WHERE coordinator_email = $1 AND is_active",
        )
        .bind(&user.email)
        .fetch_all(&self.pool)
        .await?;
        Ok(resolve_scope(user, &coordinations))
    }

    /// The set of employee emails the scope covers, for SQL-side filtering:
    /// `None` means unrestricted (administrator), `Some(vec![])` means
    /// nothing is visible.
    pub async fn authorized_emails(&self, scope: &Scope) -> Result<Option<Vec<String>>> {
        match scope {
            Scope::AdminAll => Ok(None),
            Scope::Coordinator { coordination_ids } => {
                let emails = sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT DISTINCT u.email
                    FROM users u
                    JOIN user_coordinations uc ON uc.user_id = u.id
                    WHERE uc.coordination_id = ANY($1)
                    "#,
                )
                .bind(coordination_ids)
                .fetch_all(&self.pool)
                .await?;
                Ok(Some(emails))
            }
            Scope::CoordinatorUnassigned => Ok(Some(Vec::new())),
            Scope::SelfOnly { email } => Ok(Some(vec![email.clone()])),
        }
    }

    /// Whether the scope covers one specific employee.
    pub async fn covers_email(&self, scope: &Scope, email: &str) -> Result<bool> {
        match scope {
            Scope::AdminAll => Ok(true),
            Scope::Coordinator { coordination_ids } => {
                let covered = sqlx::query_scalar::<_, bool>(
                    r#"
                    SELECT EXISTS (
                        SELECT 1
                        FROM users u
                        JOIN user_coordinations uc ON uc.user_id = u.id
                        WHERE u.email = $1 AND uc.coordination_id = ANY($2)
                    )
                    "#,
                )
                .bind(email)
                .bind(coordination_ids)
                .fetch_one(&self.pool)
                .await?;
                Ok(covered)
            }
            Scope::CoordinatorUnassigned => Ok(false),
            Scope::SelfOnly { email: own } => Ok(own.as_str() == email),
        }
    }
}
