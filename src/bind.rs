//! Encoding of [`Value`] into sqlite bindings.

use std::borrow::Cow;

use core::ffi::c_int;
use core::ptr::NonNull;

use chrono::SecondsFormat;

use crate::error::{Code, Error, Result};
use crate::ffi;
use crate::value::Value;

/// A parameter which has passed validation and is ready to be bound.
///
/// Text and blobs carry their length, which is known to fit sqlite.
#[derive(Debug, PartialEq)]
pub(crate) enum Encoded<'a> {
    Null,
    Integer(i64),
    Float(f64),
    Text(Cow<'a, str>, c_int),
    Blob(&'a [u8], c_int),
}

/// Encode a single value, rejecting anything sqlite cannot represent without
/// losing information.
pub(crate) fn encode(value: &Value) -> Result<Encoded<'_>> {
    let encoded = match value {
        Value::Null => Encoded::Null,
        Value::Bool(value) => Encoded::Integer(i64::from(*value)),
        Value::Integer(value) => Encoded::Integer(*value),
        Value::BigInt(value) => match i64::try_from(*value) {
            Ok(value) => Encoded::Integer(value),
            Err(..) => {
                return Err(Error::validation(format_args!(
                    "integer {value} does not fit in a 64-bit signed integer"
                )));
            }
        },
        Value::Float(value) => Encoded::Float(*value),
        Value::Text(value) => text(Cow::Borrowed(value))?,
        Value::Blob(value) => Encoded::Blob(value, length(value.len())?),
        Value::Date(value) => text(Cow::Owned(value.to_string()))?,
        Value::Time(value) => text(Cow::Owned(value.to_string()))?,
        Value::DateTime(value) => {
            text(Cow::Owned(format!("{}T{}", value.date(), value.time())))?
        }
        Value::Timestamp(value) => {
            if value.offset().local_minus_utc() != 0 {
                return Err(Error::validation(format_args!(
                    "{value} is not in UTC, convert it before binding"
                )));
            }

            text(Cow::Owned(value.to_rfc3339_opts(SecondsFormat::AutoSi, true)))?
        }
    };

    Ok(encoded)
}

fn text(value: Cow<'_, str>) -> Result<Encoded<'_>> {
    let len = length(value.len())?;
    Ok(Encoded::Text(value, len))
}

/// Validate and bind all parameters to a statement.
///
/// Nothing is bound unless every parameter passes validation.
///
/// # Safety
///
/// The statement pointer must be valid and not used concurrently.
pub(crate) unsafe fn bind_all(raw: NonNull<ffi::sqlite3_stmt>, params: &[Value]) -> Result<()> {
    let expected = unsafe { ffi::sqlite3_bind_parameter_count(raw.as_ptr()) };

    if usize::try_from(expected).ok() != Some(params.len()) {
        return Err(Error::validation(format_args!(
            "arguments wrong length: expected {expected}, got {}",
            params.len()
        )));
    }

    let encoded = params.iter().map(encode).collect::<Result<Vec<_>>>()?;

    unsafe {
        ffi::sqlite3_reset(raw.as_ptr());
        ffi::sqlite3_clear_bindings(raw.as_ptr());

        for (index, value) in (1..).zip(&encoded) {
            bind_one(raw, index, value)?;
        }
    }

    Ok(())
}

unsafe fn bind_one(raw: NonNull<ffi::sqlite3_stmt>, index: c_int, value: &Encoded<'_>) -> Result<()> {
    let stmt = raw.as_ptr();

    let code = unsafe {
        match value {
            Encoded::Null => ffi::sqlite3_bind_null(stmt, index),
            Encoded::Integer(value) => ffi::sqlite3_bind_int64(stmt, index, *value),
            Encoded::Float(value) => ffi::sqlite3_bind_double(stmt, index, *value),
            Encoded::Text(value, len) => ffi::sqlite3_bind_text(
                stmt,
                index,
                value.as_ptr().cast(),
                *len,
                ffi::SQLITE_TRANSIENT(),
            ),
            // A null pointer would bind NULL rather than an empty blob.
            Encoded::Blob(value, _) if value.is_empty() => {
                ffi::sqlite3_bind_zeroblob(stmt, index, 0)
            }
            Encoded::Blob(value, len) => ffi::sqlite3_bind_blob(
                stmt,
                index,
                value.as_ptr().cast(),
                *len,
                ffi::SQLITE_TRANSIENT(),
            ),
        }
    };

    if code != ffi::SQLITE_OK {
        let db = unsafe { ffi::sqlite3_db_handle(stmt) };
        return Err(Error::from_handle(db, code));
    }

    Ok(())
}

fn length(len: usize) -> Result<c_int> {
    match c_int::try_from(len) {
        Ok(len) => Ok(len),
        Err(..) => Err(Error::new(Code::TOOBIG)),
    }
}
