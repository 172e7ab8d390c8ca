use super::DomainError;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_ID_NUMBER_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Name and ID number a student submits with, trimmed and length-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    id_number: String,
}

impl Identity {
    pub fn new(name: &str, id_number: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        let id_number = id_number.trim();

        check_length("name", name, MAX_NAME_LENGTH)?;
        check_length("idNumber", id_number, MAX_ID_NUMBER_LENGTH)?;

        Ok(Self {
            name: name.to_string(),
            id_number: id_number.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_number(&self) -> &str {
        &self.id_number
    }

    /// An existing user matches only when the stored name is exactly the submitted one.
    pub fn matches_name(&self, stored_name: &str) -> bool {
        self.name == stored_name
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(DomainError::FieldLength { field, min: 1, max });
    }
    Ok(())
}

/// Outcome of looking a user up by ID number before admitting a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResolution<U> {
    Found(U),
    Created(U),
    NameMismatch,
}

impl<U> UserResolution<U> {
    pub fn into_user(self) -> Result<U, DomainError> {
        match self {
            UserResolution::Found(user) | UserResolution::Created(user) => Ok(user),
            UserResolution::NameMismatch => Err(DomainError::NameMismatch),
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UserResolution::Created(_))
    }
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}
