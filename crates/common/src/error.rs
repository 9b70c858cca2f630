//! Error taxonomy and the structured log record attached to every failure.

use serde::Serialize;

/// Coarse classification of a failure, mapped to an HTTP-style status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// An existence check returned zero rows.
    NotFound,
    /// Any database, cache, journal or serialization failure.
    Internal,
    /// The request conflicts with current state.
    Conflict,
    /// The request is well-formed but cannot be processed.
    Unprocessable,
}

impl ErrorKind {
    /// Returns the HTTP-style status code for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
        }
    }

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unprocessable => "unprocessable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured record describing where and why an operation failed.
///
/// Built with [`error_log!`](crate::error_log), which captures the call
/// site and emits the record as a `tracing` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLog {
    pub kind: ErrorKind,
    pub status_code: u16,
    pub message: String,
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl ErrorLog {
    /// Creates a log record. Prefer the [`error_log!`](crate::error_log) macro.
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        file: &'static str,
        line: u32,
        function: &'static str,
    ) -> Self {
        Self {
            kind,
            status_code: kind.status_code(),
            message: message.into(),
            file,
            line,
            function,
        }
    }

    /// Emits the record: internal failures at `error`, the rest at `warn`.
    pub fn emit(&self) {
        match self.kind {
            ErrorKind::Internal => tracing::error!(
                kind = %self.kind,
                status_code = self.status_code,
                file = self.file,
                line = self.line,
                function = self.function,
                "{}",
                self.message
            ),
            _ => tracing::warn!(
                kind = %self.kind,
                status_code = self.status_code,
                file = self.file,
                line = self.line,
                function = self.function,
                "{}",
                self.message
            ),
        }
    }
}

impl std::fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}:{} in {})",
            self.status_code, self.message, self.file, self.line, self.function
        )
    }
}

/// Strips the `{{closure}}` segments async functions add to type names.
#[doc(hidden)]
pub fn trim_closures(mut name: &'static str) -> &'static str {
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    name
}

/// Expands to the path of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        $crate::error::trim_closures(name.strip_suffix("::f").unwrap_or(name))
    }};
}

/// Builds an [`ErrorLog`] for the current call site and emits it.
///
/// ```ignore
/// let log = error_log!(ErrorKind::NotFound, "sales_order {} not found", id);
/// ```
#[macro_export]
macro_rules! error_log {
    ($kind:expr, $($arg:tt)+) => {{
        let log = $crate::ErrorLog::new(
            $kind,
            format!($($arg)+),
            file!(),
            line!(),
            $crate::function_name!(),
        );
        log.emit();
        log
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_http_conventions() {
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::Unprocessable.status_code(), 422);
    }

    #[test]
    fn error_log_captures_call_site() {
        let log = crate::error_log!(ErrorKind::NotFound, "agent {} not found", 7);

        assert_eq!(log.kind, ErrorKind::NotFound);
        assert_eq!(log.status_code, 404);
        assert_eq!(log.message, "agent 7 not found");
        assert!(log.file.ends_with("error.rs"));
        assert!(log.line > 0);
        assert!(log.function.ends_with("error_log_captures_call_site"));
    }

    #[test]
    fn trim_closures_removes_async_suffixes() {
        assert_eq!(
            trim_closures("repo::Repo::get::{{closure}}::{{closure}}"),
            "repo::Repo::get"
        );
        assert_eq!(trim_closures("repo::get"), "repo::get");
    }
}
