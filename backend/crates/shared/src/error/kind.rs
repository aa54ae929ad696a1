//! Error Kind - Classification of errors
//!
//! [`ErrorKind`] is the only thing the HTTP layer looks at to choose a
//! response status.

use serde::Serialize;

/// Error class, one per response status the storefront emits
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::PayloadTooLarge;
/// assert_eq!(kind.status_code(), 413);
/// assert_eq!(kind.as_str(), "Payload Too Large");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed or invalid input
    BadRequest,
    /// No identity, or credentials rejected
    Unauthorized,
    NotFound,
    /// Unique constraint (email, lookup name)
    Conflict,
    /// Request body above the upload limit
    PayloadTooLarge,
    /// Well-formed but unusable content, e.g. an image that is not JPEG/PNG
    UnprocessableEntity,
    InternalServerError,
    /// A backing store (database, session store) did not answer
    ServiceUnavailable,
}

impl ErrorKind {
    /// (status, reason phrase, problem slug)
    const fn meta(self) -> (u16, &'static str, &'static str) {
        match self {
            ErrorKind::BadRequest => (400, "Bad Request", "bad-request"),
            ErrorKind::Unauthorized => (401, "Unauthorized", "unauthorized"),
            ErrorKind::NotFound => (404, "Not Found", "not-found"),
            ErrorKind::Conflict => (409, "Conflict", "conflict"),
            ErrorKind::PayloadTooLarge => (413, "Payload Too Large", "payload-too-large"),
            ErrorKind::UnprocessableEntity => {
                (422, "Unprocessable Entity", "unprocessable-entity")
            }
            ErrorKind::InternalServerError => (500, "Internal Server Error", "internal"),
            ErrorKind::ServiceUnavailable => (503, "Service Unavailable", "unavailable"),
        }
    }

    pub const fn status_code(self) -> u16 {
        self.meta().0
    }

    /// Standard reason phrase, used as the problem `title`
    pub const fn as_str(self) -> &'static str {
        self.meta().1
    }

    /// Problem `type` URI, relative to the API root
    pub fn problem_type(self) -> String {
        format!("/problems/{}", self.meta().2)
    }

    /// 5xx errors are logged at error level
    pub const fn is_server_error(self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorKind; 8] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::PayloadTooLarge,
        ErrorKind::UnprocessableEntity,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
    ];

    #[test]
    fn status_codes() {
        let codes: Vec<u16> = ALL.iter().map(|k| k.status_code()).collect();
        assert_eq!(codes, vec![400, 401, 404, 409, 413, 422, 500, 503]);
    }

    #[test]
    fn server_errors() {
        let server: Vec<ErrorKind> = ALL.into_iter().filter(|k| k.is_server_error()).collect();
        assert_eq!(
            server,
            vec![ErrorKind::InternalServerError, ErrorKind::ServiceUnavailable]
        );
    }

    #[test]
    fn problem_types_are_distinct() {
        let mut types: Vec<String> = ALL.iter().map(|k| k.problem_type()).collect();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), ALL.len());
        assert_eq!(ErrorKind::NotFound.problem_type(), "/problems/not-found");
    }
}
