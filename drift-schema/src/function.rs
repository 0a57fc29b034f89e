use serde::{Deserialize, Serialize};

/// A named, typed function parameter (`$n: t`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_: type_.into(),
        }
    }
}

/// A namespaced, user-defined function (`fn::<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub body: String,
}

impl Function {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            body: body.into(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, type_: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, type_));
        self
    }

    pub fn returns(mut self, type_: impl Into<String>) -> Self {
        self.return_type = Some(type_.into());
        self
    }
}
