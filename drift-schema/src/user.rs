use serde::{Deserialize, Serialize};

/// The grant level a [`User`] is defined at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserLevel {
    Root,
    Namespace,
    Database,
}

/// A built-in role a [`User`] may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Owner,
    Editor,
    Viewer,
}

/// A database user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub level: UserLevel,
    pub password: Option<String>,
    pub roles: Vec<UserRole>,
}

impl User {
    pub fn new(name: impl Into<String>, level: UserLevel) -> Self {
        Self {
            name: name.into(),
            level,
            password: None,
            roles: Vec::new(),
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.roles.push(role);
        self
    }
}
