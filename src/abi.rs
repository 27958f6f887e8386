//! C ABI for foreign callers (`libstatedb_parser`).
//!
//! Each parse call returns a heap-allocated [`ParseResult`] that the caller
//! owns and must hand back to [`free_parse_result`] exactly once. Rust callers
//! that go through this boundary should use [`OwnedParseResult`], which
//! releases on drop and cannot be cloned.
//!
//! The handle is never null: Rust aborts the process on allocation failure,
//! which callers observe as a fatal error rather than a parse failure.

use crate::envelope::{self, ParseOutcome};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

/// Parse envelope. Exactly one of `err` and `json_result` is non-null.
#[repr(C)]
#[derive(Debug)]
pub struct ParseResult {
    pub success: bool,
    pub err: *mut c_char,
    pub json_result: *mut c_char,
}

impl ParseResult {
    fn success(json: CString) -> Self {
        ParseResult {
            success: true,
            err: ptr::null_mut(),
            json_result: json.into_raw(),
        }
    }

    fn failure(message: &str) -> Self {
        let message = CString::new(message.replace('\0', "\\0")).unwrap_or_default();
        ParseResult {
            success: false,
            err: message.into_raw(),
            json_result: ptr::null_mut(),
        }
    }
}

/// Parse a NUL-terminated RESP command.
///
/// # Safety
///
/// `input` must be null or point to a NUL-terminated buffer that stays valid
/// for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn parse_command(input: *const c_char) -> *mut ParseResult {
    if input.is_null() {
        return into_raw(ParseResult::failure("Usage error: input pointer is null"));
    }
    let bytes = unsafe { CStr::from_ptr(input) }.to_bytes();
    outcome_into_raw(envelope::parse(bytes))
}

/// Parse a RESP command of `len` bytes. The payload may contain NUL bytes.
///
/// # Safety
///
/// `input` must be valid for reads of `len` bytes for the duration of the
/// call. It may be null only when `len` is zero.
#[no_mangle]
pub unsafe extern "C" fn parse_command_len(input: *const u8, len: usize) -> *mut ParseResult {
    let bytes: &[u8] = if input.is_null() {
        if len != 0 {
            return into_raw(ParseResult::failure("Usage error: input pointer is null"));
        }
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(input, len) }
    };
    outcome_into_raw(envelope::parse(bytes))
}

/// Release an envelope and both of its strings. Null is ignored.
///
/// # Safety
///
/// `result` must be null or a pointer returned by [`parse_command`] or
/// [`parse_command_len`] that has not been released yet.
#[no_mangle]
pub unsafe extern "C" fn free_parse_result(result: *mut ParseResult) {
    if result.is_null() {
        return;
    }
    let result = unsafe { Box::from_raw(result) };
    if !result.err.is_null() {
        drop(unsafe { CString::from_raw(result.err) });
    }
    if !result.json_result.is_null() {
        drop(unsafe { CString::from_raw(result.json_result) });
    }
}

fn outcome_into_raw(outcome: ParseOutcome) -> *mut ParseResult {
    let result = match outcome {
        ParseOutcome::Success(parsed) => match CString::new(parsed.into_json()) {
            Ok(json) => ParseResult::success(json),
            Err(_) => ParseResult::failure("Encoding error: JSON text contains a NUL byte"),
        },
        ParseOutcome::Failure(err) => ParseResult::failure(&err.to_string()),
    };
    into_raw(result)
}

fn into_raw(result: ParseResult) -> *mut ParseResult {
    Box::into_raw(Box::new(result))
}

/// Owning handle to a [`ParseResult`] obtained through the C ABI.
///
/// Dropping the handle calls [`free_parse_result`]. The type is not `Clone`,
/// so a second release cannot be expressed.
#[derive(Debug)]
pub struct OwnedParseResult {
    raw: NonNull<ParseResult>,
}

// The envelope is exclusively owned; moving the handle moves ownership.
unsafe impl Send for OwnedParseResult {}

impl OwnedParseResult {
    /// Parse through [`parse_command_len`]. `None` only if the ABI returned null.
    pub fn parse(input: &[u8]) -> Option<Self> {
        unsafe { Self::from_raw(parse_command_len(input.as_ptr(), input.len())) }
    }

    /// Parse through [`parse_command`].
    pub fn parse_cstr(input: &CStr) -> Option<Self> {
        unsafe { Self::from_raw(parse_command(input.as_ptr())) }
    }

    /// Take ownership of a raw envelope.
    ///
    /// # Safety
    ///
    /// `raw` must be null or an unreleased pointer returned by this module's
    /// parse functions, and nothing else may release it afterwards.
    pub unsafe fn from_raw(raw: *mut ParseResult) -> Option<Self> {
        NonNull::new(raw).map(|raw| OwnedParseResult { raw })
    }

    /// Give up ownership without releasing.
    pub fn into_raw(self) -> *mut ParseResult {
        let raw = self.raw.as_ptr();
        std::mem::forget(self);
        raw
    }

    pub fn success(&self) -> bool {
        self.get().success
    }

    pub fn error(&self) -> Option<&CStr> {
        as_cstr(self.get().err)
    }

    pub fn json(&self) -> Option<&CStr> {
        as_cstr(self.get().json_result)
    }

    fn get(&self) -> &ParseResult {
        // Valid until drop; only drop releases it.
        unsafe { self.raw.as_ref() }
    }
}

impl Drop for OwnedParseResult {
    fn drop(&mut self) {
        unsafe { free_parse_result(self.raw.as_ptr()) }
    }
}

fn as_cstr<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) })
    }
}
