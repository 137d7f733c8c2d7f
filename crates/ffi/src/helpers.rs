use crate::error::{with_last_error_mut, CanopyRtErrorCode, DefaultFfiError, FfiError};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error in thread-local storage and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FfiError) -> CanopyRtErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = CanopyRtErrorCode::Ok;
    });
}

/// Run an entry point body, translating its result into an error code.
///
/// Success clears the last error so callers never see a stale message.
pub(crate) fn track_result<F>(body: F) -> CanopyRtErrorCode
where
    F: FnOnce() -> Result<(), DefaultFfiError>,
{
    match body() {
        Ok(()) => {
            clear_last_error();
            CanopyRtErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrow a C array as a slice.
///
/// # Safety
/// `ptr` must be null or point to `len` initialized `f64` values.
pub(crate) unsafe fn slice_from_raw<'a>(
    ptr: *const f64,
    len: usize,
    name: &str,
) -> Result<&'a [f64], DefaultFfiError> {
    if ptr.is_null() {
        return Err(DefaultFfiError::null_pointer(name));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Borrow a C output buffer mutably, checking it can hold `required` values.
///
/// # Safety
/// `ptr` must be null or point to `len` writable `f64` values.
pub(crate) unsafe fn slice_from_raw_mut<'a>(
    ptr: *mut f64,
    len: usize,
    required: usize,
    name: &str,
) -> Result<&'a mut [f64], DefaultFfiError> {
    if ptr.is_null() {
        return Err(DefaultFfiError::null_pointer(name));
    }
    if len < required {
        return Err(DefaultFfiError::buffer_too_small(name, required, len));
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

/// Write a scalar result through an out pointer.
///
/// # Safety
/// `out` must be null or valid for a single `f64` write.
pub(crate) unsafe fn write_out(
    out: *mut f64,
    value: f64,
    name: &str,
) -> Result<(), DefaultFfiError> {
    if out.is_null() {
        return Err(DefaultFfiError::null_pointer(name));
    }
    unsafe {
        *out = value;
    }
    Ok(())
}

/// Borrow a null-terminated C string as UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a null-terminated string.
pub(crate) unsafe fn str_from_raw<'a>(
    ptr: *const c_char,
    name: &str,
) -> Result<&'a str, DefaultFfiError> {
    if ptr.is_null() {
        return Err(DefaultFfiError::null_pointer(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| {
            DefaultFfiError::invalid_parameter(format!("Parameter '{name}' is not UTF-8: {e}"))
        })
}
