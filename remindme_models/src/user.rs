pub type UserId = i64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UserRole {
    #[default]
    Member,
    Guest,
}

/// The caller a request is made on behalf of.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: UserId,
    pub role: UserRole,
}

impl Owner {
    pub fn member(id: UserId) -> Self {
        Self {
            id,
            role: UserRole::Member,
        }
    }

    pub fn guest(id: UserId) -> Self {
        Self {
            id,
            role: UserRole::Guest,
        }
    }
}
