//! Path patterns and field schemas the backend registers with the host router.

use serde::Serialize;

use super::request::Operation;

/// How a registered path matches an incoming request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathPattern {
    /// Matches exactly one path
    Exact { path: &'static str },
    /// Matches any non-empty path and captures it into `field`
    MatchAll { field: &'static str },
}

impl PathPattern {
    /// Returns the captured `(field, value)` pair on match, or `None`.
    pub fn matches<'a>(&self, path: &'a str) -> Option<Option<(&'static str, &'a str)>> {
        match self {
            PathPattern::Exact { path: expected } => (path == *expected).then_some(None),
            PathPattern::MatchAll { field } => (!path.is_empty()).then_some(Some((*field, path))),
        }
    }

    /// Human-readable form used in help output.
    pub fn display(&self) -> String {
        match self {
            PathPattern::Exact { path } => path.to_string(),
            PathPattern::MatchAll { field } => format!("<{}>", field),
        }
    }
}

/// Declared type of a request or secret field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
}

/// Field declaration, used for help output and schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSchema {
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self { name, kind: FieldKind::String, required: false, description }
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }
}

/// An operation supported on a path, with its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathOperation {
    pub operation: Operation,
    pub summary: &'static str,
}

/// A registered path: pattern, fields, operations and help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSpec {
    pub pattern: PathPattern,
    pub fields: Vec<FieldSchema>,
    pub operations: Vec<PathOperation>,
    pub help_synopsis: &'static str,
}

impl PathSpec {
    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.iter().any(|op| op.operation == operation)
    }
}

/// Paths that get special treatment from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecialPaths {
    /// Storage keys the host should seal-wrap
    pub seal_wrap_storage: Vec<&'static str>,
}

impl SpecialPaths {
    pub fn is_seal_wrapped(&self, key: &str) -> bool {
        self.seal_wrap_storage.iter().any(|k| *k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        let pattern = PathPattern::Exact { path: "config/admin" };
        assert_eq!(pattern.matches("config/admin"), Some(None));
        assert_eq!(pattern.matches("config/admin/x"), None);
        assert_eq!(pattern.display(), "config/admin");
    }

    #[test]
    fn test_match_all_pattern() {
        let pattern = PathPattern::MatchAll { field: "path" };
        assert_eq!(pattern.matches("team-a/deploy"), Some(Some(("path", "team-a/deploy"))));
        assert_eq!(pattern.matches(""), None);
        assert_eq!(pattern.display(), "<path>");
    }

    #[test]
    fn test_supports() {
        let spec = PathSpec {
            pattern: PathPattern::MatchAll { field: "path" },
            fields: vec![FieldSchema::string("path", "x").required()],
            operations: vec![PathOperation { operation: Operation::Read, summary: "read" }],
            help_synopsis: "",
        };
        assert!(spec.supports(Operation::Read));
        assert!(!spec.supports(Operation::Delete));
        assert!(spec.fields[0].required);
    }

    #[test]
    fn test_special_paths() {
        let special = SpecialPaths { seal_wrap_storage: vec!["config/admin"] };
        assert!(special.is_seal_wrapped("config/admin"));
        assert!(!special.is_seal_wrapped("config/other"));
    }
}
