//! Unified error-code contract for the AXON kernel.
//!
//! Every error type in the workspace implements [`ErrorCode`] so that
//! integrators can handle failures programmatically without matching on
//! message strings.
//!
//! # Code Convention
//!
//! - **UPPER_SNAKE_CASE**, stable once published (API contract)
//! - Layer-internal errors carry a layer prefix (`TRANSPORT_`, `BUS_`, ...)
//! - The kernel's externally visible failure codes are un-prefixed because
//!   they are the wire contract: `AGENT_NOT_FOUND`, `ALREADY_REGISTERED`,
//!   `MAX_CONCURRENT_LIMIT`, `CIRCUIT_OPEN`, `EXECUTION_FAILED`,
//!   `FALLBACK_AGENT_NOT_FOUND`, `FALLBACK_FAILED`, `AGENT_ERROR`,
//!   `UNKNOWN_ERROR`
//!
//! # Example
//!
//! ```
//! use axon_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     NotFound(String),
//!     Timeout,
//! }
//!
//! impl ErrorCode for MyError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::NotFound(_) => "MY_NOT_FOUND",
//!             Self::Timeout => "MY_TIMEOUT",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//! }
//!
//! let err = MyError::Timeout;
//! assert_eq!(err.code(), "MY_TIMEOUT");
//! assert!(err.is_recoverable());
//! ```

/// Machine-readable error classification.
///
/// # Recoverability
///
/// An error is recoverable when retrying the operation may succeed:
/// transient transport failures, open circuits that will half-open, agent
/// bodies that failed on a flaky dependency. Non-recoverable errors
/// (unknown ids, duplicate registration, invalid input) will fail the same
/// way on every retry.
pub trait ErrorCode {
    /// Returns a stable UPPER_SNAKE_CASE error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the failed operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows the workspace convention.
///
/// # Checks
///
/// 1. Code is non-empty
/// 2. Code starts with the expected prefix (pass `""` for un-prefixed
///    wire-contract codes)
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message when validation fails; intended for
/// use inside tests.
///
/// # Example
///
/// ```
/// use axon_types::{assert_error_code, ErrorCode};
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "BUS_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "BUS_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");

    assert!(
        code.starts_with(expected_prefix),
        "error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );

    assert!(
        is_upper_snake_case(code),
        "error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates every variant of an error enum at once.
///
/// # Example
///
/// ```
/// use axon_types::{assert_error_codes, ErrorCode};
///
/// #[derive(Debug)]
/// enum E { A, B }
///
/// impl ErrorCode for E {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::A => "X_A",
///             Self::B => "X_B",
///         }
///     }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_codes(&[E::A, E::B], "X_");
/// ```
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

/// Checks if a string is UPPER_SNAKE_CASE.
fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
