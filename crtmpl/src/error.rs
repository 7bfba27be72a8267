use std::borrow::Cow;
use std::fmt;

use crate::compiler::tokens::Span;

/// Represents template errors.
///
/// Errors carry the location (1-based line and column) of the offending
/// piece of the template whenever one is known.  If the `debug` feature is
/// enabled and the error was produced by a [`Template`](crate::Template),
/// the template source is embedded as well and the alternative formatting
/// (``format!("{:#}", err)``) renders an excerpt of it.
///
/// # Example
///
/// ```rust
/// match crtmpl::render("Hello {name}!", crtmpl::context!(name => "World")) {
///     Ok(result) => println!("{}", result),
///     Err(err) => {
///         eprintln!("Could not render template:");
///         eprintln!("  {:#}", err);
///     }
/// }
/// ```
pub struct Error {
    kind: ErrorKind,
    detail: Option<Cow<'static, str>>,
    name: Option<String>,
    span: Option<Span>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    #[cfg(feature = "debug")]
    template_source: Option<String>,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut err = f.debug_struct("Error");
        err.field("kind", &self.kind);
        if let Some(ref detail) = self.detail {
            err.field("detail", detail);
        }
        if let Some(ref name) = self.name {
            err.field("name", name);
        }
        if let Some(line) = self.line() {
            err.field("line", &line);
        }
        if let Some(col) = self.column() {
            err.field("column", &col);
        }
        if let Some(ref source) = self.source {
            err.field("source", source);
        }
        err.finish()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for Error {}

/// An enum describing the error kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed brace structure or an empty control.
    SyntaxError,
    /// A lookup path referenced a missing binding, key or field.
    UndefinedError,
    /// An operation was attempted on a value that does not support it.
    InvalidOperation,
    /// The data passed in could not be converted into a value.
    BadSerialization,
    /// Writing the output failed.
    WriteFailure,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::UndefinedError => "undefined value",
            ErrorKind::InvalidOperation => "invalid operation",
            ErrorKind::BadSerialization => "could not serialize to value",
            ErrorKind::WriteFailure => "failed to write output",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref detail) = self.detail {
            write!(f, "{}: {}", self.kind, detail)?;
        } else {
            write!(f, "{}", self.kind)?;
        }
        match (self.name.as_deref(), self.line(), self.column()) {
            (Some(name), Some(line), Some(col)) => write!(f, " (in {}:{}:{})", name, line, col)?,
            (Some(name), _, _) => write!(f, " (in {})", name)?,
            (None, Some(line), Some(col)) => write!(f, " (at {}:{})", line, col)?,
            _ => {}
        }
        if f.alternate() {
            self.display_debug_info().fmt(f)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a new error with kind and detail.
    pub fn new<D: Into<Cow<'static, str>>>(kind: ErrorKind, detail: D) -> Error {
        Error {
            kind,
            detail: Some(detail.into()),
            name: None,
            span: None,
            source: None,
            #[cfg(feature = "debug")]
            template_source: None,
        }
    }

    pub(crate) fn syntax(detail: &'static str, span: Span) -> Error {
        let mut rv = Error::new(ErrorKind::SyntaxError, detail);
        rv.span = Some(span);
        rv
    }

    /// Records the span unless a more specific one is already known.
    pub(crate) fn located(mut self, span: Span) -> Error {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub(crate) fn attach_template(&mut self, name: Option<&str>, source: &str) {
        if self.name.is_none() {
            self.name = name.map(|x| x.to_string());
        }
        #[cfg(feature = "debug")]
        {
            if self.template_source.is_none() {
                self.template_source = Some(source.to_string());
            }
        }
        #[cfg(not(feature = "debug"))]
        {
            let _ = source;
        }
    }

    /// Attaches another error as source to this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error detail
    ///
    /// The detail is an error message that provides further details about
    /// the error kind.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the name of the template that failed if known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the 1-based line number where the error occurred.
    pub fn line(&self) -> Option<usize> {
        self.span.map(|x| x.start_line as usize)
    }

    /// Returns the 1-based column where the error occurred.
    pub fn column(&self) -> Option<usize> {
        self.span.map(|x| x.start_col as usize)
    }

    /// Returns the span of the template piece the error refers to.
    #[cfg(feature = "unstable_machinery")]
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Returns the template source if debug information is available.
    pub fn template_source(&self) -> Option<&str> {
        #[cfg(feature = "debug")]
        {
            self.template_source.as_deref()
        }
        #[cfg(not(feature = "debug"))]
        {
            None
        }
    }

    /// Returns an object that renders the source excerpt of the error.
    ///
    /// If no template source is attached this renders to an empty string.
    pub fn display_debug_info(&self) -> impl fmt::Display + '_ {
        struct Proxy<'a>(&'a Error);

        impl fmt::Display for Proxy<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0.template_source() {
                    Some(source) => crate::debug::render_debug_info(
                        f,
                        self.0.name(),
                        self.0.kind,
                        self.0.span,
                        source,
                    ),
                    None => Ok(()),
                }
            }
        }

        Proxy(self)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            kind,
            detail: None,
            name: None,
            span: None,
            source: None,
            #[cfg(feature = "debug")]
            template_source: None,
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::new(ErrorKind::WriteFailure, "formatting failed")
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Error::new(ErrorKind::BadSerialization, msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    #[test]
    fn test_display_with_location() {
        let span = Span {
            start_line: 2,
            start_col: 7,
            start_offset: 12,
            end_line: 2,
            end_col: 8,
            end_offset: 13,
        };
        let err = Error::syntax("found `}` while not parsing control", span);
        assert_eq!(
            err.to_string(),
            "syntax error: found `}` while not parsing control (at 2:7)"
        );
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.column(), Some(7));
    }

    #[test]
    fn test_location_is_sticky() {
        let inner = Span {
            start_line: 3,
            start_col: 1,
            ..Default::default()
        };
        let outer = Span {
            start_line: 1,
            start_col: 1,
            ..Default::default()
        };
        let err = Error::new(ErrorKind::UndefinedError, "binding `x` is not defined")
            .located(inner)
            .located(outer);
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_named_display() {
        let mut err = Error::new(ErrorKind::UndefinedError, "binding `x` is not defined");
        err.attach_template(Some("chain.html"), "{x}");
        assert_eq!(
            err.to_string(),
            "undefined value: binding `x` is not defined (in chain.html)"
        );
    }
}
