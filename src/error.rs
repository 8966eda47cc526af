use core::ffi::{CStr, c_int};
use core::fmt;

use crate::ffi;

/// A result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A result code reported by sqlite.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Code {
    raw: c_int,
}

impl Code {
    /// Construct a new code from the specified raw code.
    #[inline]
    pub(crate) const fn new(raw: c_int) -> Self {
        Self { raw }
    }
}

macro_rules! define_codes {
    ($(
        $vis:vis const $name:ident = $value:ident;
    )*) => {
        impl Code {
            $(
                $vis const $name: Code = Code::new($crate::ffi::$value);
            )*
        }

        impl fmt::Display for Code {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match *self {
                    $(Code::$name => write!(f, stringify!($name)),)*
                    Code { raw } => write!(f, "UNKNOWN({raw})"),
                }
            }
        }

        impl fmt::Debug for Code {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

define_codes! {
    pub const OK = SQLITE_OK;
    pub const ERROR = SQLITE_ERROR;
    pub const INTERNAL = SQLITE_INTERNAL;
    pub const PERM = SQLITE_PERM;
    pub const ABORT = SQLITE_ABORT;
    pub const BUSY = SQLITE_BUSY;
    pub const LOCKED = SQLITE_LOCKED;
    pub const NOMEM = SQLITE_NOMEM;
    pub const READONLY = SQLITE_READONLY;
    pub const INTERRUPT = SQLITE_INTERRUPT;
    pub const IOERR = SQLITE_IOERR;
    pub const CORRUPT = SQLITE_CORRUPT;
    pub const NOTFOUND = SQLITE_NOTFOUND;
    pub const FULL = SQLITE_FULL;
    pub const CANTOPEN = SQLITE_CANTOPEN;
    pub const PROTOCOL = SQLITE_PROTOCOL;
    pub const EMPTY = SQLITE_EMPTY;
    pub const SCHEMA = SQLITE_SCHEMA;
    pub const TOOBIG = SQLITE_TOOBIG;
    pub const CONSTRAINT = SQLITE_CONSTRAINT;
    pub const MISMATCH = SQLITE_MISMATCH;
    pub const MISUSE = SQLITE_MISUSE;
    pub const NOLFS = SQLITE_NOLFS;
    pub const AUTH = SQLITE_AUTH;
    pub const FORMAT = SQLITE_FORMAT;
    pub const RANGE = SQLITE_RANGE;
    pub const NOTADB = SQLITE_NOTADB;
    pub const NOTICE = SQLITE_NOTICE;
    pub const WARNING = SQLITE_WARNING;
    pub const CONSTRAINT_CHECK = SQLITE_CONSTRAINT_CHECK;
    pub const CONSTRAINT_FOREIGNKEY = SQLITE_CONSTRAINT_FOREIGNKEY;
    pub const CONSTRAINT_NOTNULL = SQLITE_CONSTRAINT_NOTNULL;
    pub const CONSTRAINT_PRIMARYKEY = SQLITE_CONSTRAINT_PRIMARYKEY;
    pub const CONSTRAINT_UNIQUE = SQLITE_CONSTRAINT_UNIQUE;
}

impl Code {
    /// Return the numeric representation of the code.
    #[inline]
    pub fn as_raw(self) -> c_int {
        self.raw
    }

    /// Strip extended information from the code.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::Code;
    ///
    /// assert_eq!(Code::CONSTRAINT_UNIQUE.primary(), Code::CONSTRAINT);
    /// assert_eq!(Code::BUSY.primary(), Code::BUSY);
    /// ```
    #[inline]
    pub fn primary(self) -> Code {
        Code::new(self.raw & 0xff)
    }

    /// The english description sqlite associates with the code.
    fn message(self) -> &'static str {
        // SAFETY: sqlite3_errstr always returns a static nul-terminated string.
        unsafe {
            CStr::from_ptr(ffi::sqlite3_errstr(self.raw))
                .to_str()
                .unwrap_or("unknown error")
        }
    }
}

/// An error raised by the driver.
///
/// Errors fall into classes which tell the caller what to do with the
/// connection afterwards. Everything except [`Error::Disconnect`] leaves the
/// connection usable, while a disconnect means the connection has been torn
/// down and has to be replaced. See [`Error::is_disconnect`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid connection options, no native call was attempted.
    #[error("{message}")]
    Config {
        /// Description of the problem.
        message: Box<str>,
    },
    /// Arguments were rejected before reaching sqlite.
    #[error("{message}")]
    Validation {
        /// Description of the problem, naming the offending value if any.
        message: Box<str>,
    },
    /// Error reported by sqlite.
    #[error("{message}")]
    Sqlite {
        /// The result code reported.
        code: Code,
        /// The message reported by sqlite, verbatim.
        message: Box<str>,
        /// The statement being processed, if any.
        statement: Option<Box<str>>,
    },
    /// Sqlite could not make progress because the database is locked by
    /// someone else. The caller may retry.
    #[error("database is busy")]
    Busy {
        /// The statement being processed, if any.
        statement: Option<Box<str>>,
    },
    /// The connection has already been closed.
    #[error("connection is closed")]
    Closed,
    /// The connection has been torn down and must be replaced.
    #[error("{message}")]
    Disconnect {
        /// Description of why the connection was dropped.
        message: Box<str>,
        /// The error which caused the disconnect, if any.
        #[source]
        source: Option<Box<Error>>,
    },
}

impl Error {
    pub(crate) fn config(message: impl fmt::Display) -> Self {
        Self::Config {
            message: message.to_string().into(),
        }
    }

    pub(crate) fn validation(message: impl fmt::Display) -> Self {
        Self::Validation {
            message: message.to_string().into(),
        }
    }

    pub(crate) fn new(code: Code) -> Self {
        if code.primary() == Code::BUSY {
            return Self::Busy { statement: None };
        }

        Self::Sqlite {
            code,
            message: code.message().into(),
            statement: None,
        }
    }

    /// Construct an error from the state of a database handle.
    ///
    /// The message is read from the handle, so this has to be called before
    /// any other call is made against it.
    pub(crate) fn from_handle(db: *mut ffi::sqlite3, code: c_int) -> Self {
        let code = Code::new(code);

        if db.is_null() || code.primary() == Code::BUSY {
            return Self::new(code);
        }

        // SAFETY: The handle is valid and sqlite3_errmsg never returns null
        // for it.
        let message = unsafe {
            CStr::from_ptr(ffi::sqlite3_errmsg(db))
                .to_string_lossy()
                .into_owned()
        };

        Self::Sqlite {
            code,
            message: message.into(),
            statement: None,
        }
    }

    /// Tear down wrapper around an error which left the connection in an
    /// unknown state.
    pub(crate) fn disconnect(cause: Error) -> Self {
        Self::Disconnect {
            message: cause.to_string().into(),
            source: Some(Box::new(cause)),
        }
    }

    pub(crate) fn busy_checkout() -> Self {
        Self::Disconnect {
            message: "database is busy".into(),
            source: None,
        }
    }

    /// Annotate the error with the statement which caused it.
    pub(crate) fn with_statement(mut self, sql: &str) -> Self {
        match &mut self {
            Self::Sqlite { statement, .. } | Self::Busy { statement } => {
                *statement = Some(sql.into());
            }
            _ => {}
        }

        self
    }

    /// The sqlite result code behind the error, if it came from sqlite.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Code, Connection};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// let e = c.execute(":)").unwrap_err();
    /// assert_eq!(e.code(), Some(Code::ERROR));
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn code(&self) -> Option<Code> {
        match self {
            Self::Sqlite { code, .. } => Some(*code),
            Self::Busy { .. } => Some(Code::BUSY),
            Self::Disconnect {
                source: Some(source),
                ..
            } => source.code(),
            _ => None,
        }
    }

    /// The statement which was being processed when the error happened.
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Sqlite { statement, .. } | Self::Busy { statement } => statement.as_deref(),
            Self::Disconnect {
                source: Some(source),
                ..
            } => source.statement(),
            _ => None,
        }
    }

    /// Test if the error requires the connection to be discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::Connection;
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.checkout()?;
    ///
    /// let e = c.checkout().unwrap_err();
    /// assert!(e.is_disconnect());
    /// assert_eq!(e.to_string(), "database is busy");
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnect { .. })
    }

    /// Test if the error signals that sqlite was busy.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}
