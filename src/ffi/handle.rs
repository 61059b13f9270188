// Owning guard over a `ParseResult`
//
// Rust hosts that go through the C lifecycle get release-on-drop, and the
// borrow checker keeps every `&Document` inside the guard's lifetime.

use crate::ffi::visitor::{Visitor, accept_document};
use crate::ffi::{ErrorCode, ParseResult, parse_boxed, release_parse_result};
use crate::idl::Document;
use std::ffi::{CStr, c_void};
use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

/// Sole owner of one `ParseResult`.
///
/// Dropping the handle releases the result, so it can be neither used after
/// release nor released twice.
///
/// ```
/// use idlvisit::ffi::{ErrorCode, ParseHandle, Visitor};
///
/// let handle = ParseHandle::parse(c"program P { constructors { New(a: u32); } }");
/// assert!(handle.is_ok());
/// assert_eq!(handle.document().unwrap().programs.len(), 1);
/// assert_eq!(handle.accept(std::ptr::null(), &Visitor::default()), ErrorCode::Ok);
/// handle.release();
/// ```
pub struct ParseHandle {
    raw: NonNull<ParseResult>,
}

impl ParseHandle {
    /// Parse `source` through the same path as `parse_idl`.
    pub fn parse(source: &CStr) -> Self {
        ParseHandle {
            raw: NonNull::from(Box::leak(parse_boxed(source.as_ptr()))),
        }
    }

    /// Take ownership of a pointer returned by `parse_idl`.
    ///
    /// Returns `None` for null.
    ///
    /// # Safety
    /// `raw` must come from `parse_idl` and must not be released elsewhere.
    pub unsafe fn from_raw(raw: *mut ParseResult) -> Option<Self> {
        NonNull::new(raw).map(|raw| ParseHandle { raw })
    }

    /// Give up ownership; the caller must eventually call
    /// `release_parse_result` on the pointer.
    pub fn into_raw(self) -> *mut ParseResult {
        ManuallyDrop::new(self).raw.as_ptr()
    }

    fn result(&self) -> &ParseResult {
        // SAFETY: the pointer is owned and live until drop
        unsafe { self.raw.as_ref() }
    }

    pub fn is_ok(&self) -> bool {
        self.result().error.code == ErrorCode::Ok
    }

    /// The parsed document, when parsing succeeded.
    pub fn document(&self) -> Option<&Document> {
        // SAFETY: the document lives exactly as long as the result
        unsafe { self.result().document.as_ref() }
    }

    /// The error code and description, when parsing failed.
    pub fn error(&self) -> Option<(ErrorCode, &CStr)> {
        let error = &self.result().error;
        if error.code == ErrorCode::Ok || error.details.is_null() {
            return None;
        }
        // SAFETY: details is a NUL-terminated string owned by the result
        Some((error.code, unsafe { CStr::from_ptr(error.details) }))
    }

    /// Traverse the document with a C visitor table.
    ///
    /// Returns [`ErrorCode::NullPointer`] when there is no document.
    pub fn accept(&self, context: *const c_void, visitor: &Visitor) -> ErrorCode {
        match self.document() {
            // SAFETY: both references are live for the duration of the call
            Some(doc) => unsafe { accept_document(doc, context, visitor) },
            None => ErrorCode::NullPointer,
        }
    }

    /// Release the result now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ParseHandle {
    fn drop(&mut self) {
        // SAFETY: the handle is the sole owner and this runs once
        unsafe { release_parse_result(self.raw.as_ptr()) }
    }
}

impl fmt::Debug for ParseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseHandle")
            .field("ok", &self.is_ok())
            .field("error", &self.error())
            .finish()
    }
}
