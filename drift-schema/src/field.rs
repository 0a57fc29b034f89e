use serde::{Deserialize, Serialize};

/// The user-supplied rename hint on a [`Field`].
///
/// May name a single prior field or a list of candidates, any of which
/// satisfies the rename match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviousName {
    Single(String),
    Many(Vec<String>),
}

impl PreviousName {
    /// All candidate prior names, in order.
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            PreviousName::Single(name) => vec![name.as_str()],
            PreviousName::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// A field on a table or relation.
///
/// `name` may contain dots to address a nested path (`address.city`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub optional: bool,
    pub readonly: bool,
    pub flexible: bool,
    pub if_not_exists: bool,
    pub overwrite: bool,
    pub default: Option<String>,
    pub value: Option<String>,
    pub assert: Option<String>,
    pub permissions: Option<String>,
    pub comment: Option<String>,
    pub previous_name: Option<PreviousName>,
}

impl Field {
    /// Create a required field of the given type with no other clauses set.
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_: type_.into(),
            optional: false,
            readonly: false,
            flexible: false,
            if_not_exists: false,
            overwrite: false,
            default: None,
            value: None,
            assert: None,
            permissions: None,
            comment: None,
            previous_name: None,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn value(mut self, expr: impl Into<String>) -> Self {
        self.value = Some(expr.into());
        self
    }

    pub fn assert(mut self, expr: impl Into<String>) -> Self {
        self.assert = Some(expr.into());
        self
    }

    pub fn permissions(mut self, clause: impl Into<String>) -> Self {
        self.permissions = Some(clause.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Record a rename hint: the field was previously named `name`.
    pub fn renamed_from(mut self, name: impl Into<String>) -> Self {
        self.previous_name = Some(PreviousName::Single(name.into()));
        self
    }

    /// Record a rename hint with multiple candidate prior names.
    pub fn renamed_from_any(mut self, names: Vec<String>) -> Self {
        self.previous_name = Some(PreviousName::Many(names));
        self
    }

    /// True for the two reserved relation endpoint fields, which are never
    /// emitted as drops.
    pub fn is_reserved_relation_field(&self) -> bool {
        self.name == "in" || self.name == "out"
    }

    /// True for an auto-generated array-element field (`<parent>.*`).
    pub fn is_array_element_field(&self) -> bool {
        self.name.ends_with(".*")
    }

    /// The parent field name of an array-element field, if any.
    pub fn array_element_parent(&self) -> Option<&str> {
        self.name.strip_suffix(".*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_clauses() {
        let f = Field::new("email", "string")
            .assert("$value != NONE")
            .comment("primary contact address");
        assert_eq!(f.type_, "string");
        assert_eq!(f.assert.as_deref(), Some("$value != NONE"));
        assert!(!f.optional);
    }

    #[test]
    fn previous_name_candidates() {
        let single = PreviousName::Single("email".into());
        assert_eq!(single.candidates(), vec!["email"]);

        let many = PreviousName::Many(vec!["email".into(), "mail".into()]);
        assert_eq!(many.candidates(), vec!["email", "mail"]);
    }

    #[test]
    fn reserved_and_array_element_detection() {
        assert!(Field::new("in", "record<user>").is_reserved_relation_field());
        assert!(Field::new("out", "record<user>").is_reserved_relation_field());
        assert!(!Field::new("tags", "array<string>").is_reserved_relation_field());

        let elem = Field::new("tags.*", "string");
        assert!(elem.is_array_element_field());
        assert_eq!(elem.array_element_parent(), Some("tags"));
    }
}
