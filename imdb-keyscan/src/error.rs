use std::fmt;
use std::path::{Path, PathBuf};

/// A type alias for handling errors throughout imdb-keyscan.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while searching IMDb key files.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Return a reference to the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Transfer ownership of the kind of this error.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns true if and only if this error indicates that an identifier
    /// does not address an entry in an offset index.
    pub fn is_out_of_range(&self) -> bool {
        match self.kind {
            ErrorKind::IndexOutOfRange { .. } => true,
            _ => false,
        }
    }

    pub(crate) fn out_of_range(id: i64) -> Error {
        Error { kind: ErrorKind::IndexOutOfRange { id } }
    }

    pub(crate) fn query_too_long(len: usize, max: usize) -> Error {
        Error { kind: ErrorKind::QueryTooLong { len, max } }
    }

    pub(crate) fn malformed<T: AsRef<str>>(msg: T) -> Error {
        Error { kind: ErrorKind::MalformedRecord(msg.as_ref().to_string()) }
    }

    pub(crate) fn config<T: AsRef<str>>(msg: T) -> Error {
        Error { kind: ErrorKind::Config(msg.as_ref().to_string()) }
    }

    pub(crate) fn io(err: std::io::Error) -> Error {
        Error { kind: ErrorKind::Io { err, path: None } }
    }

    pub(crate) fn io_path<P: AsRef<Path>>(
        err: std::io::Error,
        path: P,
    ) -> Error {
        Error {
            kind: ErrorKind::Io {
                err,
                path: Some(path.as_ref().to_path_buf()),
            },
        }
    }

    pub(crate) fn number<E: std::error::Error + Send + Sync + 'static>(
        err: E,
    ) -> Error {
        Error { kind: ErrorKind::Number(Box::new(err)) }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            ErrorKind::Io { ref err, .. } => Some(err),
            ErrorKind::Number(ref err) => Some(&**err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// The specific kind of error that can occur.
#[derive(Debug)]
pub enum ErrorKind {
    /// An identifier that does not address an entry in an offset index,
    /// either because it is negative or because reading its entry ran past
    /// the end of the index.
    IndexOutOfRange {
        /// The identifier that was looked up.
        id: i64,
    },
    /// A query variant is longer than the maximum record length.
    ///
    /// Search routines never return this error. Instead, they treat it as a
    /// query that cannot match anything and return no results.
    QueryTooLong {
        /// The length of the offending query, in bytes.
        len: usize,
        /// The maximum length permitted.
        max: usize,
    },
    /// A line in a key file that could not be split into a label and a
    /// hexadecimal key.
    ///
    /// Scanners skip such lines, so this is only seen by callers that parse
    /// records themselves.
    MalformedRecord(String),
    /// An error occurred while reading a search configuration.
    Config(String),
    /// An unexpected I/O error occurred.
    Io {
        /// The underlying I/O error.
        err: std::io::Error,
        /// A file path, if the I/O error occurred in the context of a named
        /// file.
        path: Option<PathBuf>,
    },
    /// An error occurred while parsing an identifier.
    Number(Box<dyn std::error::Error + Send + Sync>),
    /// Hints that destructuring should not be exhaustive.
    ///
    /// This enum may grow additional variants, so this makes sure clients
    /// don't count on exhaustive matching. (Otherwise, adding a new variant
    /// could break existing code.)
    #[doc(hidden)]
    __Nonexhaustive,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::IndexOutOfRange { id } => write!(
                f,
                "identifier {} is out of range for the offset index",
                id
            ),
            ErrorKind::QueryTooLong { len, max } => write!(
                f,
                "query of length {} exceeds the maximum record length {}",
                len, max
            ),
            ErrorKind::MalformedRecord(ref msg) => {
                write!(f, "malformed record: {}", msg)
            }
            ErrorKind::Config(ref msg) => write!(f, "config error: {}", msg),
            ErrorKind::Io { path: None, .. } => write!(f, "I/O error"),
            ErrorKind::Io { path: Some(ref p), .. } => {
                write!(f, "{}", p.display())
            }
            ErrorKind::Number(_) => write!(f, "error parsing number"),
            ErrorKind::__Nonexhaustive => panic!("invalid error"),
        }
    }
}
