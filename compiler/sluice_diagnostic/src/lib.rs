//! Errors for the sluice query runtime.
//!
//! Errors are typed by [`ErrorCode`], never by Rust type: type-representation
//! accessors, inference, evaluation and resolution all return the same
//! [`Error`]. Construction goes through `#[cold]` factory functions so the
//! happy path stays small.
//!
//! # Call-site attribution
//!
//! A failing call is named exactly once. [`Error::attribute_call`] stamps the
//! innermost failing call onto the error; an error that already carries an
//! attribution passes through every enclosing call and pipe stage untouched,
//! so the user sees a single `error calling function "f" @l:c-l:c: msg`.

mod error_code;

use std::fmt;

use sluice_ir::SourceLocation;

pub use error_code::ErrorCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The call an error was attributed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub function_name: String,
    pub location: SourceLocation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    location: Option<SourceLocation>,
    call: Option<CallSite>,
    cause: Option<Box<Error>>,
}

impl Error {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: message.into(),
            location: None,
            call: None,
            cause: None,
        }
    }

    #[cold]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Invalid, message)
    }

    #[cold]
    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FailedPrecondition, message)
    }

    #[cold]
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OutOfRange, message)
    }

    #[cold]
    pub fn duplicate_argument(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateArgument,
            format!("duplicate argument \"{name}\""),
        )
    }

    #[cold]
    pub fn missing_argument(name: &str) -> Self {
        Self::new(
            ErrorCode::MissingArgument,
            format!("missing required argument \"{name}\""),
        )
    }

    #[cold]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TypeMismatch, message)
    }

    #[cold]
    pub fn not_resolvable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotResolvable, message)
    }

    #[cold]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Re-describe `cause` without changing its code.
    #[cold]
    pub fn inherit(cause: Error, message: impl Into<String>) -> Self {
        Error {
            code: ErrorCode::Inherited,
            message: message.into(),
            location: None,
            call: None,
            cause: Some(Box::new(cause)),
        }
    }

    /// Attach a location unless one is already known.
    #[must_use]
    pub fn at(mut self, location: &SourceLocation) -> Self {
        if self.location.is_none() && location.is_valid() {
            self.location = Some(location.clone());
        }
        self
    }

    /// Attribute this error to the call of `function_name` at `location`.
    ///
    /// No-op when the error is already attributed to a (deeper) call.
    #[must_use]
    pub fn attribute_call(mut self, function_name: &str, location: &SourceLocation) -> Self {
        if self.is_attributed() {
            return self;
        }
        self.call = Some(CallSite {
            function_name: function_name.to_string(),
            location: location.clone(),
        });
        self
    }

    /// The effective code; `Inherited` resolves to the cause's code.
    pub fn code(&self) -> ErrorCode {
        match (&self.code, &self.cause) {
            (ErrorCode::Inherited, Some(cause)) => cause.code(),
            (code, _) => *code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    pub fn call_site(&self) -> Option<&CallSite> {
        self.call.as_ref()
    }

    pub fn is_attributed(&self) -> bool {
        self.call.is_some() || self.cause.as_ref().is_some_and(|c| c.is_attributed())
    }

    fn fmt_message(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(call) = &self.call {
            write!(
                f,
                "error calling function \"{}\" {}: ",
                call.function_name, call.location
            )?;
        } else if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        self.fmt_message(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}
