use serde::{Deserialize, Serialize};

/// A record access scope (`DEFINE ACCESS ... ON DATABASE TYPE RECORD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    /// Session duration, in the database's own duration syntax (e.g. `12h`).
    pub session: Option<String>,
    pub signup: Option<String>,
    pub signin: Option<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session: None,
            signup: None,
            signin: None,
        }
    }

    pub fn session(mut self, duration: impl Into<String>) -> Self {
        self.session = Some(duration.into());
        self
    }

    pub fn signup(mut self, query: impl Into<String>) -> Self {
        self.signup = Some(query.into());
        self
    }

    pub fn signin(mut self, query: impl Into<String>) -> Self {
        self.signin = Some(query.into());
        self
    }
}
