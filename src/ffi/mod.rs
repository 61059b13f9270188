// C ABI over the IDL parser and visitor
//
// Ownership crosses the boundary exactly twice: `parse_idl` hands out a
// `ParseResult` and `release_parse_result` takes it back. Every other entry
// point only borrows. AST nodes are opaque to C; all it ever holds is a
// pointer into a document that stays alive until the result is released.

use crate::idl::{self, Document, TypeDecl};
use std::ffi::{CStr, CString, c_char};
use std::ptr;
use tracing::{debug, warn};

pub mod handle;
pub mod visitor;

pub use handle::ParseHandle;
pub use visitor::Visitor;

// ============================================================================
// Result and Error Records
// ============================================================================

/// Status of a boundary call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Ok,
    /// The source was not valid UTF-8, or an index was out of range.
    InvalidInput,
    /// The source was not well-formed IDL.
    ParseError,
    /// A required pointer argument was null.
    NullPointer,
}

/// Error code plus an owned, NUL-terminated description.
///
/// `details` is null when `code` is [`ErrorCode::Ok`].
#[repr(C)]
#[derive(Debug)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub details: *mut c_char,
}

impl ErrorRecord {
    const OK: ErrorRecord = ErrorRecord {
        code: ErrorCode::Ok,
        details: ptr::null_mut(),
    };

    fn new(code: ErrorCode, details: impl Into<String>) -> Self {
        ErrorRecord {
            code,
            details: c_string(details.into()).into_raw(),
        }
    }
}

/// Outcome of [`parse_idl`]: exactly one of `document` and a non-`Ok`
/// `error` is set.
#[repr(C)]
#[derive(Debug)]
pub struct ParseResult {
    pub document: *mut Document,
    pub error: ErrorRecord,
}

impl ParseResult {
    fn parsed(doc: Document) -> Box<Self> {
        Box::new(ParseResult {
            document: Box::into_raw(Box::new(doc)),
            error: ErrorRecord::OK,
        })
    }

    fn failed(code: ErrorCode, details: impl Into<String>) -> Box<Self> {
        Box::new(ParseResult {
            document: ptr::null_mut(),
            error: ErrorRecord::new(code, details),
        })
    }
}

/// Interior NUL bytes cannot cross as a C string; drop them.
fn c_string(s: String) -> CString {
    CString::new(s).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

// ============================================================================
// String Views
// ============================================================================

/// Borrowed UTF-8 bytes, not NUL-terminated.
///
/// An absent value is `{ NULL, 0 }`; an empty string has a non-null `ptr`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrRef {
    pub ptr: *const u8,
    pub len: usize,
}

impl StrRef {
    pub const NONE: StrRef = StrRef {
        ptr: ptr::null(),
        len: 0,
    };

    pub fn new(s: &str) -> Self {
        StrRef {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    pub fn from_option(s: Option<&str>) -> Self {
        s.map_or(Self::NONE, Self::new)
    }

    pub fn is_none(&self) -> bool {
        self.ptr.is_null()
    }

    /// View the bytes as a `&str`.
    ///
    /// # Safety
    /// The view must have been produced by [`StrRef::new`] from a string that
    /// is still alive for `'a`.
    pub unsafe fn as_str<'a>(self) -> Option<&'a str> {
        if self.ptr.is_null() {
            return None;
        }
        // SAFETY: ptr/len describe a live str per the caller's contract
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        std::str::from_utf8(bytes).ok()
    }
}

/// Clamp a length to the `uint32_t` counts the callbacks take.
pub(crate) fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ============================================================================
// Lifecycle
// ============================================================================

pub(crate) fn parse_boxed(source: *const c_char) -> Box<ParseResult> {
    if source.is_null() {
        warn!("parse_idl called with a null source");
        return ParseResult::failed(ErrorCode::NullPointer, "source pointer is null");
    }

    // SAFETY: non-null, and the caller promises a NUL-terminated string
    let source = match unsafe { CStr::from_ptr(source) }.to_str() {
        Ok(s) => s,
        Err(e) => {
            debug!(error = %e, "rejecting non UTF-8 source");
            return ParseResult::failed(
                ErrorCode::InvalidInput,
                format!("source is not valid UTF-8: {e}"),
            );
        }
    };

    match idl::parse(source) {
        Ok(doc) => ParseResult::parsed(doc),
        Err(e) => {
            debug!(error = %e, "parse_idl failed");
            ParseResult::failed(ErrorCode::ParseError, format!("failed to parse IDL: {e}"))
        }
    }
}

/// Parse a NUL-terminated IDL source.
///
/// Never returns null. The result must be passed to
/// [`release_parse_result`] exactly once.
///
/// # Safety
/// `source` must be null or point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn parse_idl(source: *const c_char) -> *mut ParseResult {
    let result = Box::into_raw(parse_boxed(source));
    debug!(?result, "parse_idl");
    result
}

/// Free a result from [`parse_idl`] together with its document or error
/// details. Null is a no-op.
///
/// # Safety
/// `result` must be null or a pointer returned by [`parse_idl`] that has not
/// been released yet. No traversal of its document may be in progress.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn release_parse_result(result: *mut ParseResult) {
    if result.is_null() {
        return;
    }
    debug!(?result, "release_parse_result");

    // SAFETY: allocated by parse_idl and released only once per contract
    let result = unsafe { Box::from_raw(result) };
    if !result.document.is_null() {
        // SAFETY: the document was boxed by `ParseResult::parsed`
        drop(unsafe { Box::from_raw(result.document) });
    }
    if !result.error.details.is_null() {
        // SAFETY: details came from `CString::into_raw`
        drop(unsafe { CString::from_raw(result.error.details) });
    }
}

// ============================================================================
// Accessors
// ============================================================================

/// Child `index` of a type expression, or null when out of range.
///
/// Slices and arrays have their item at index 0, tuples their elements and
/// named types their generic arguments.
///
/// # Safety
/// `node` must be null or a live type expression handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn type_decl_item(node: *const TypeDecl, index: u32) -> *const TypeDecl {
    // SAFETY: null or live per contract
    let Some(node) = (unsafe { node.as_ref() }) else {
        warn!("type_decl_item called with a null node");
        return ptr::null();
    };
    usize::try_from(index)
        .ok()
        .and_then(|i| node.children().get(i))
        .map_or(ptr::null(), |child| child as *const TypeDecl)
}

/// Read global annotation `index` of `doc` into `key` and `value`.
///
/// `value` is set to `{ NULL, 0 }` for flag annotations. The views borrow
/// from the document.
///
/// # Safety
/// `doc` must be null or a live document; `key` and `value` must be null or
/// writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn document_global(
    doc: *const Document,
    index: u32,
    key: *mut StrRef,
    value: *mut StrRef,
) -> ErrorCode {
    if doc.is_null() || key.is_null() || value.is_null() {
        warn!("document_global called with a null pointer");
        return ErrorCode::NullPointer;
    }
    // SAFETY: non-null and live per contract
    let doc = unsafe { &*doc };
    let Some(ann) = usize::try_from(index).ok().and_then(|i| doc.globals.get(i)) else {
        return ErrorCode::InvalidInput;
    };

    // SAFETY: non-null and writable per contract
    unsafe {
        key.write(StrRef::new(&ann.key));
        value.write(StrRef::from_option(ann.value.as_deref()));
    }
    ErrorCode::Ok
}
