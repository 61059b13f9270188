#![no_main]

use libfuzzer_sys::fuzz_target;
use std::ffi::CString;

// Arbitrary bytes through the C lifecycle: parse, walk with an empty table,
// release.
fuzz_target!(|data: &[u8]| {
    let Ok(source) = CString::new(data) else {
        return;
    };
    let handle = idlvisit::ffi::ParseHandle::parse(&source);
    let _ = handle.accept(std::ptr::null(), &idlvisit::ffi::Visitor::default());
});
