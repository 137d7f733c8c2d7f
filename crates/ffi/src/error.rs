use canopy_rt_core::CanopyRtError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// Every failure crossing the C boundary carries an error code plus a
/// message that callers can fetch with `canopy_rt_get_last_error`.
pub(crate) trait FfiError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> CanopyRtErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `FfiError` for the canopy RT entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFfiError {
    code: CanopyRtErrorCode,
    msg: String,
}

impl DefaultFfiError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"lai"`, `"out_g"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: CanopyRtErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an output buffer shorter than the result.
    pub fn buffer_too_small(param_name: &str, required: usize, actual: usize) -> Self {
        Self {
            code: CanopyRtErrorCode::BufferTooSmall,
            msg: format!("Buffer '{param_name}' holds {actual} values, {required} required"),
        }
    }

    /// Create error for a malformed argument that never reached the core.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: CanopyRtErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<CanopyRtError> for DefaultFfiError {
    fn from(error: CanopyRtError) -> Self {
        let code = match error {
            CanopyRtError::Validation(_) => CanopyRtErrorCode::Validation,
            CanopyRtError::Domain { .. } => CanopyRtErrorCode::Domain,
            CanopyRtError::NonConvergence(_) => CanopyRtErrorCode::NonConvergence,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl FfiError for DefaultFfiError {
    fn code(&self) -> CanopyRtErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by canopy RT functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanopyRtErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Malformed input structure: LAI profile, selector string, array lengths.
    Validation = 2,

    /// A physical or leaf angle parameter lies outside its defined range.
    Domain = 3,

    /// Adaptive quadrature did not converge.
    NonConvergence = 4,

    /// Caller-provided output buffer is too short.
    BufferTooSmall = 5,

    /// Invalid parameter passed to function (bad enum tag, non-UTF-8 string).
    InvalidParameter = 6,
}

impl From<DefaultFfiError> for CanopyRtErrorCode {
    fn from(error: DefaultFfiError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The CString is kept here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, CanopyRtErrorCode)> = const { RefCell::new((None, CanopyRtErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, CanopyRtErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, CanopyRtErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next canopy RT call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// double k_d = 0.0;
/// if (canopy_rt_k_d(angle, 4.0, &k_d) != Ok) {
///     const char* error = canopy_rt_get_last_error();
///     if (error) {
///         fprintf(stderr, "K_d failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn canopy_rt_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `CanopyRtErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn canopy_rt_get_last_error_code() -> CanopyRtErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
