//! Users and sessions.

use chrono::Utc;
use common::UserId;
use store::{BlobWrite, CollectionKey, StateStore, WriteOptions};

use super::WorkshopService;
use crate::audit::{AuditAction, AuditLogEntry};
use crate::auth::{Actor, AuthError};
use crate::error::DomainError;
use crate::money::Percentage;
use crate::user::{NewUser, Role, User};

impl<S: StateStore> WorkshopService<S> {
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let (users, _) = self.load_users().await?;
        Ok(users)
    }

    /// Resolves the acting user for a request.
    pub async fn resolve_actor(&self, user_id: UserId) -> Result<Actor, DomainError> {
        let (users, _) = self.load_users().await?;
        let user = users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(AuthError::UnknownUser(user_id))?;
        Ok(Actor::from_user(user)?)
    }

    /// Starts a session for an active user and records the login.
    #[tracing::instrument(skip(self))]
    pub async fn login(&self, user_id: UserId) -> Result<Actor, DomainError> {
        let actor = self.resolve_actor(user_id).await?;

        let entry = AuditLogEntry::new(
            AuditAction::Login,
            &actor,
            format!("{} entrou no sistema", actor.name),
            Utc::now(),
        )
        .with_target(user_id);
        self.commit_with_audit(Vec::new(), entry).await?;

        tracing::info!(%user_id, role = %actor.role, "User logged in");
        Ok(actor)
    }

    /// Adds a staff member.
    #[tracing::instrument(skip(self, actor, new), fields(name = %new.name))]
    pub async fn create_user(&self, actor: &Actor, new: NewUser) -> Result<User, DomainError> {
        actor.require_admin("manage users")?;

        let user = User::create(new, Utc::now())?;
        let (mut users, revision) = self.load_users().await?;
        users.push(user.clone());

        let entry = AuditLogEntry::new(
            AuditAction::Update,
            actor,
            format!("Usuário cadastrado: {} ({})", user.name, user.role),
            user.created_at,
        )
        .with_target(user.id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Users,
                &users,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        Ok(user)
    }

    /// Deactivates a staff member. Users are never removed.
    #[tracing::instrument(skip(self, actor))]
    pub async fn deactivate_user(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        actor.require_admin("manage users")?;
        if actor.user_id == id {
            return Err(DomainError::InvalidState(
                "cannot deactivate the current user".to_string(),
            ));
        }

        let (mut users, revision) = self.load_users().await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found("user", id))?;
        if !user.active {
            return Ok(user.clone());
        }
        user.active = false;
        let user = user.clone();

        let entry = AuditLogEntry::new(
            AuditAction::Update,
            actor,
            format!("Usuário desativado: {}", user.name),
            Utc::now(),
        )
        .with_target(id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Users,
                &users,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        Ok(user)
    }

    /// Creates the bootstrap administrator when there are no users yet.
    ///
    /// Returns the administrator when one was created.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_default_admin(
        &self,
        name: &str,
        email: Option<String>,
    ) -> Result<Option<User>, DomainError> {
        let (mut users, revision) = self.load_users().await?;
        if !users.is_empty() {
            return Ok(None);
        }

        let admin = User::create(
            NewUser {
                name: name.to_string(),
                email,
                role: Role::Admin,
                commission_rate: Percentage::ZERO,
            },
            Utc::now(),
        )?;
        users.push(admin.clone());

        let actor = Actor::from_user(&admin)?;
        let entry = AuditLogEntry::new(
            AuditAction::Create,
            &actor,
            format!("Administrador inicial criado: {}", admin.name),
            admin.created_at,
        )
        .with_target(admin.id);
        self.commit_with_audit(
            vec![BlobWrite::new(
                CollectionKey::Users,
                &users,
                WriteOptions::expect_revision(revision),
            )?],
            entry,
        )
        .await?;

        tracing::info!(user_id = %admin.id, "Bootstrap administrator created");
        Ok(Some(admin))
    }
}
