use crate::entity::user;
use crate::error::{Result, ServiceError, is_unique_violation};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter,
};
use survey_core::domain::{DomainError, Identity, Role, UserId, UserResolution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub id_number: String,
    pub role: Role,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>>;
    async fn find_by_id_number(&self, id_number: &str) -> Result<Option<UserRecord>>;
    async fn create_admin(&self, identity: &Identity, password_hash: String) -> Result<UserRecord>;
}

#[derive(Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn map_role(code: i16) -> Result<Role> {
    match code {
        0 => Ok(Role::Student),
        1 => Ok(Role::Admin),
        _ => Err(anyhow!("invalid user.role code from database: {code}").into()),
    }
}

pub(crate) fn map_role_code(role: Role) -> i16 {
    match role {
        Role::Student => 0,
        Role::Admin => 1,
    }
}

pub(crate) fn map_model(model: user::Model) -> Result<UserRecord> {
    Ok(UserRecord {
        id: UserId::new(model.id),
        name: model.name,
        id_number: model.id_number,
        role: map_role(model.role)?,
        password_hash: model.password_hash,
    })
}

pub(crate) async fn find_by_id_number_in<C: ConnectionTrait>(
    conn: &C,
    id_number: &str,
) -> Result<Option<UserRecord>> {
    let model = user::Entity::find()
        .filter(user::Column::IdNumber.eq(id_number))
        .one(conn)
        .await?;

    model.map(map_model).transpose()
}

async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    identity: &Identity,
    role: Role,
    password_hash: Option<String>,
) -> Result<UserRecord> {
    let active_model = user::ActiveModel {
        name: Set(identity.name().to_string()),
        id_number: Set(identity.id_number().to_string()),
        role: Set(map_role_code(role)),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let model = active_model.insert(conn).await.map_err(|err| {
        if is_unique_violation(&err) {
            ServiceError::Domain(DomainError::IdNumberTaken)
        } else {
            err.into()
        }
    })?;
    map_model(model)
}

/// Looks the student up by ID number and creates them when absent.
///
/// Runs on the caller's connection so admission can keep it inside its transaction.
pub async fn find_or_create<C: ConnectionTrait>(
    conn: &C,
    identity: &Identity,
) -> Result<UserResolution<UserRecord>> {
    if let Some(existing) = find_by_id_number_in(conn, identity.id_number()).await? {
        if identity.matches_name(&existing.name) {
            return Ok(UserResolution::Found(existing));
        }
        return Ok(UserResolution::NameMismatch);
    }

    let created = insert_user(conn, identity, Role::Student, None).await?;
    Ok(UserResolution::Created(created))
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        let model = user::Entity::find_by_id(user_id.value())
            .one(&self.db)
            .await?;

        model.map(map_model).transpose()
    }

    async fn find_by_id_number(&self, id_number: &str) -> Result<Option<UserRecord>> {
        find_by_id_number_in(&self.db, id_number.trim()).await
    }

    async fn create_admin(&self, identity: &Identity, password_hash: String) -> Result<UserRecord> {
        if find_by_id_number_in(&self.db, identity.id_number())
            .await?
            .is_some()
        {
            return Err(DomainError::IdNumberTaken.into());
        }

        insert_user(&self.db, identity, Role::Admin, Some(password_hash)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes_round_trip() {
        for role in [Role::Student, Role::Admin] {
            assert_eq!(map_role(map_role_code(role)).expect("known code"), role);
        }
        assert!(map_role(7).is_err());
    }
}
