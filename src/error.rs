use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use strum_macros::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FailureCondition>;

/// Field name to violation message, one entry per invalid field.
pub type FieldErrors = BTreeMap<String, String>;

/// Everything that can go wrong while handling a request.
///
/// The `Display` output is meant for logs. Clients only ever see what
/// [`ProblemExceptionFilter`](crate::exception::http::ProblemExceptionFilter)
/// renders, which for [`FailureCondition::Unknown`] is a fixed opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCondition {
    #[error("Account not found: {message}")]
    AccountNotFound { message: String },

    #[error("Employee not found: {message}")]
    EmployeeNotFound { message: String },

    #[error("Duplicate username: {message}")]
    DuplicateUsername { message: String },

    #[error("Insufficient balance: {message}")]
    InsufficientBalance { message: String },

    #[error("Business rule violated: {message}")]
    GenericBusiness { message: String },

    #[error("Validation failed for {} field(s)", .field_errors.len())]
    ValidationFailed { field_errors: FieldErrors },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Anything unclassified. `cause` is kept for internal logging only.
    #[error("Unexpected error: {}", .cause.as_deref().unwrap_or("no cause recorded"))]
    Unknown { cause: Option<String> },
}

/// The tag of a [`FailureCondition`] together with its fixed HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum FailureKind {
    AccountNotFound,
    EmployeeNotFound,
    DuplicateUsername,
    InsufficientBalance,
    GenericBusiness,
    ValidationFailed,
    InvalidArgument,
    Unknown,
}

impl FailureKind {
    pub fn status(self) -> StatusCode {
        match self {
            FailureKind::AccountNotFound | FailureKind::EmployeeNotFound => StatusCode::NOT_FOUND,
            FailureKind::DuplicateUsername => StatusCode::CONFLICT,
            FailureKind::InsufficientBalance
            | FailureKind::GenericBusiness
            | FailureKind::ValidationFailed
            | FailureKind::InvalidArgument => StatusCode::BAD_REQUEST,
            FailureKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FailureKind::AccountNotFound => "Account Error",
            FailureKind::EmployeeNotFound => "Employee Error",
            FailureKind::DuplicateUsername => "Duplicate Resource",
            FailureKind::InsufficientBalance => "Transaction Error",
            FailureKind::GenericBusiness => "Business Error",
            FailureKind::ValidationFailed => "Validation Failed",
            FailureKind::InvalidArgument => "Invalid Argument",
            FailureKind::Unknown => "Server Error",
        }
    }
}

/// A single rule violation reported against one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl FailureCondition {
    pub fn account_not_found(msg: impl Into<String>) -> Self {
        Self::AccountNotFound { message: msg.into() }
    }

    pub fn employee_not_found(msg: impl Into<String>) -> Self {
        Self::EmployeeNotFound { message: msg.into() }
    }

    pub fn duplicate_username(msg: impl Into<String>) -> Self {
        Self::DuplicateUsername { message: msg.into() }
    }

    pub fn insufficient_balance(msg: impl Into<String>) -> Self {
        Self::InsufficientBalance { message: msg.into() }
    }

    pub fn business(msg: impl Into<String>) -> Self {
        Self::GenericBusiness { message: msg.into() }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument { message: msg.into() }
    }

    pub fn unknown() -> Self {
        Self::Unknown { cause: None }
    }

    pub fn unexpected(cause: impl Into<String>) -> Self {
        Self::Unknown {
            cause: Some(cause.into()),
        }
    }

    /// Build a validation failure from violations in the order they were found.
    ///
    /// A field reported more than once keeps the message of its last violation.
    pub fn validation<I>(violations: I) -> Self
    where
        I: IntoIterator<Item = FieldViolation>,
    {
        let field_errors = violations
            .into_iter()
            .fold(FieldErrors::new(), |mut acc, violation| {
                acc.insert(violation.field, violation.message);
                acc
            });
        Self::ValidationFailed { field_errors }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AccountNotFound { .. } => FailureKind::AccountNotFound,
            Self::EmployeeNotFound { .. } => FailureKind::EmployeeNotFound,
            Self::DuplicateUsername { .. } => FailureKind::DuplicateUsername,
            Self::InsufficientBalance { .. } => FailureKind::InsufficientBalance,
            Self::GenericBusiness { .. } => FailureKind::GenericBusiness,
            Self::ValidationFailed { .. } => FailureKind::ValidationFailed,
            Self::InvalidArgument { .. } => FailureKind::InvalidArgument,
            Self::Unknown { .. } => FailureKind::Unknown,
        }
    }
}

impl From<validator::ValidationErrors> for FailureCondition {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations = Vec::new();
        collect_violations(&errors, None, &mut violations);
        Self::validation(violations)
    }
}

/// Flatten validator errors into violations keyed by path.
///
/// Nested structs become `address.city`, list items `beneficiaries[1].name`.
/// Field order inside the validator's map is unspecified; keys are sorted so
/// the last-wins fold sees a stable sequence.
fn collect_violations(
    errors: &validator::ValidationErrors,
    prefix: Option<&str>,
    out: &mut Vec<FieldViolation>,
) {
    use validator::ValidationErrorsKind;

    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (name, kind) in entries {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldViolation::new(path.clone(), message)
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_violations(inner, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

impl From<std::num::ParseIntError> for FailureCondition {
    fn from(err: std::num::ParseIntError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<JsonRejection> for FailureCondition {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl From<anyhow::Error> for FailureCondition {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use validator::Validate;

    #[test]
    fn test_validation_last_violation_wins() {
        let condition = FailureCondition::validation([
            FieldViolation::new("email", "must not be blank"),
            FieldViolation::new("age", "must be positive"),
            FieldViolation::new("email", "must be a well-formed email address"),
        ]);

        let FailureCondition::ValidationFailed { field_errors } = condition else {
            panic!("expected a validation failure");
        };
        assert_eq!(field_errors.len(), 2);
        assert_eq!(field_errors["email"], "must be a well-formed email address");
        assert_eq!(field_errors["age"], "must be positive");
    }

    #[test]
    fn test_kind_matches_variant() {
        let cases = [
            (FailureCondition::account_not_found("a"), FailureKind::AccountNotFound),
            (FailureCondition::employee_not_found("e"), FailureKind::EmployeeNotFound),
            (FailureCondition::duplicate_username("d"), FailureKind::DuplicateUsername),
            (FailureCondition::insufficient_balance("b"), FailureKind::InsufficientBalance),
            (FailureCondition::business("g"), FailureKind::GenericBusiness),
            (FailureCondition::validation([]), FailureKind::ValidationFailed),
            (FailureCondition::invalid_argument("i"), FailureKind::InvalidArgument),
            (FailureCondition::unknown(), FailureKind::Unknown),
        ];
        for (condition, kind) in cases {
            assert_eq!(condition.kind(), kind);
        }
    }

    #[test]
    fn test_only_unknown_is_server_error() {
        for kind in FailureKind::iter() {
            assert_eq!(
                kind.status().is_server_error(),
                kind == FailureKind::Unknown,
                "{kind}"
            );
        }
    }

    #[derive(Validate)]
    struct NewEmployee {
        #[validate(length(min = 1, message = "must not be blank"))]
        username: String,
        #[validate(range(min = 18))]
        age: u32,
    }

    #[test]
    fn test_from_validator_errors() {
        let input = NewEmployee {
            username: String::new(),
            age: 3,
        };
        let condition = FailureCondition::from(input.validate().unwrap_err());

        let FailureCondition::ValidationFailed { field_errors } = condition else {
            panic!("expected a validation failure");
        };
        assert_eq!(field_errors["username"], "must not be blank");
        // No custom message, so the rule code is used.
        assert_eq!(field_errors["age"], "range");
    }

    #[derive(Validate)]
    struct Address {
        #[validate(length(min = 1, message = "must not be blank"))]
        city: String,
    }

    #[derive(Validate)]
    struct Beneficiary {
        #[validate(length(min = 1, message = "must not be blank"))]
        name: String,
    }

    #[derive(Validate)]
    struct OpenAccount {
        #[validate(range(min = 1, message = "must be positive"))]
        deposit: i64,
        #[validate(nested)]
        address: Address,
        #[validate(nested)]
        beneficiaries: Vec<Beneficiary>,
    }

    #[test]
    fn test_nested_validator_errors_are_flattened() {
        let input = OpenAccount {
            deposit: 0,
            address: Address {
                city: String::new(),
            },
            beneficiaries: vec![
                Beneficiary {
                    name: "Dana".to_string(),
                },
                Beneficiary {
                    name: String::new(),
                },
            ],
        };
        let condition = FailureCondition::from(input.validate().unwrap_err());

        let FailureCondition::ValidationFailed { field_errors } = condition else {
            panic!("expected a validation failure");
        };
        assert_eq!(field_errors.len(), 3, "{field_errors:?}");
        assert_eq!(field_errors["deposit"], "must be positive");
        assert_eq!(field_errors["address.city"], "must not be blank");
        assert_eq!(field_errors["beneficiaries[1].name"], "must not be blank");
    }

    #[test]
    fn test_parse_int_error_is_invalid_argument() {
        let err = "abc".parse::<i32>().unwrap_err();
        assert_eq!(FailureCondition::from(err).kind(), FailureKind::InvalidArgument);
    }

    #[test]
    fn test_anyhow_keeps_cause_chain() {
        let err = anyhow::anyhow!("connection reset").context("loading ledger");
        assert_eq!(
            FailureCondition::from(err),
            FailureCondition::unexpected("loading ledger: connection reset")
        );
    }
}
