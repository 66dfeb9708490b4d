//! Validation violation types.
//!
//! A `Violation` is the single shape of every write-time failure, whether it
//! comes from a built-in check or from a custom validation hook.

use std::fmt;

/// Severity of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Rejects the write.
    Error,
    /// Reported alongside an accepted write.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What kind of rule produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// An obligatory property or relation is absent.
    ObligatoryMissing,
    /// An option value is not a member of the declared option set.
    OptionNotInSet,
    /// A value has the wrong shape for its property.
    TypeMismatch,
    /// The instance carries a property its definition does not declare.
    UnknownProperty,
    /// An integer is outside the declared range.
    OutOfRange,
    /// A text value does not match the declared pattern.
    PatternMismatch,
    /// A relation references an id that is not an instance of the target.
    DanglingReference,
    /// A many-relation lists the same id more than once.
    DuplicateReference,
    /// A one-relation holds several ids or a many-relation a single id.
    CardinalityMismatch,
    /// Another instance already holds the same values across a unique tuple.
    UniqueConstraintViolation,
    /// Following a relation from the instance leads back to a node on the path.
    CircularDependency,
    /// The custom hook did not return in time.
    HookTimeout,
    /// The custom hook panicked.
    HookFailed,
    /// Raised by a custom hook.
    Custom,
}

/// A validation error: message, severity and dotted property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Rule that produced the violation.
    pub kind: ViolationKind,
    /// The severity of the violation.
    pub severity: Severity,
    /// Human-readable message describing the violation.
    pub message: String,
    /// Dotted property path, empty when the violation concerns the whole instance.
    pub path: String,
}

impl Violation {
    /// Create a new violation.
    pub fn new(
        kind: ViolationKind,
        severity: Severity,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create an error-level custom violation.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Custom, Severity::Error, path, message)
    }

    /// Create a warning-level custom violation.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Custom, Severity::Warning, path, message)
    }

    /// Create an error-level violation of a built-in kind.
    pub fn of_kind(
        kind: ViolationKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(kind, Severity::Error, path, message)
    }

    /// Check if this is an error-level violation.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning-level violation.
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.severity, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
        }
    }
}

/// Ordered collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Create a new empty violations collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Check if there are any violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Check if there are any error-level violations.
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.is_error())
    }

    /// Check if there are only warnings.
    pub fn has_only_warnings(&self) -> bool {
        !self.violations.is_empty() && !self.has_errors()
    }

    /// Get all violations.
    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    /// Get error-level violations.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    /// Get warning-level violations.
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_warning())
    }

    /// Violations at a given path.
    pub fn at_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.path == path)
    }

    /// Violations of a given kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Get the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Merge another violations collection.
    pub fn merge(&mut self, other: Violations) {
        self.violations.extend(other.violations);
    }
}

impl Extend<Violation> for Violations {
    fn extend<T: IntoIterator<Item = Violation>>(&mut self, iter: T) {
        self.violations.extend(iter);
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
