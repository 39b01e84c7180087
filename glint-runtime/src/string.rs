//! String primitives backing the `String_*` runtime ABI.
//!
//! Strings are not ARC-managed objects in this runtime (they carry no
//! object header); emitted code frees them directly through
//! `glint_string_free`. Layout mirrors the length-prefixed buffer used by
//! the language's native string operations: a length and an owned,
//! heap-allocated, NUL-terminated byte buffer.

use std::os::raw::c_char;

#[repr(C)]
pub struct GlintString {
    pub length: i64,
    pub data: *mut c_char,
}

fn alloc_from_bytes(bytes: &[u8]) -> *mut GlintString {
    let mut buf = Vec::with_capacity(bytes.len() + 1);
    buf.extend_from_slice(bytes);
    buf.push(0);
    let data = buf.as_mut_ptr() as *mut c_char;
    std::mem::forget(buf);
    Box::into_raw(Box::new(GlintString {
        length: bytes.len() as i64,
        data,
    }))
}

unsafe fn as_bytes<'a>(s: *const GlintString) -> &'a [u8] {
    if s.is_null() {
        return &[];
    }
    let s = &*s;
    if s.data.is_null() || s.length <= 0 {
        return &[];
    }
    std::slice::from_raw_parts(s.data as *const u8, s.length as usize)
}

#[no_mangle]
pub unsafe extern "C" fn String_new_from_literal(bytes: *const c_char, len: i64) -> *mut GlintString {
    if bytes.is_null() || len <= 0 {
        return alloc_from_bytes(&[]);
    }
    let slice = std::slice::from_raw_parts(bytes as *const u8, len as usize);
    alloc_from_bytes(slice)
}

#[no_mangle]
pub extern "C" fn String_get_empty() -> *mut GlintString {
    alloc_from_bytes(&[])
}

#[no_mangle]
pub unsafe extern "C" fn String_concat(a: *const GlintString, b: *const GlintString) -> *mut GlintString {
    let mut combined = Vec::with_capacity(as_bytes(a).len() + as_bytes(b).len());
    combined.extend_from_slice(as_bytes(a));
    combined.extend_from_slice(as_bytes(b));
    alloc_from_bytes(&combined)
}

#[no_mangle]
pub unsafe extern "C" fn String_get_length(s: *const GlintString) -> i32 {
    if s.is_null() {
        return 0;
    }
    (*s).length as i32
}

#[no_mangle]
pub unsafe extern "C" fn String_substring(s: *const GlintString, start: i32) -> *mut GlintString {
    let bytes = as_bytes(s);
    let start = start.max(0) as usize;
    if start >= bytes.len() {
        return alloc_from_bytes(&[]);
    }
    alloc_from_bytes(&bytes[start..])
}

#[no_mangle]
pub unsafe extern "C" fn String_free(s: *mut GlintString) {
    if s.is_null() {
        return;
    }
    let boxed = Box::from_raw(s);
    if !boxed.data.is_null() {
        let _ = Vec::from_raw_parts(boxed.data as *mut u8, boxed.length as usize + 1, boxed.length as usize + 1);
    }
}

macro_rules! from_scalar {
    ($name:ident, $ty:ty) => {
        #[no_mangle]
        pub extern "C" fn $name(v: $ty) -> *mut GlintString {
            alloc_from_bytes(v.to_string().as_bytes())
        }
    };
}

from_scalar!(String_from_int, i32);
from_scalar!(String_from_long, i64);

#[no_mangle]
pub extern "C" fn String_from_float(v: f32) -> *mut GlintString {
    alloc_from_bytes(trim_float(v as f64).as_bytes())
}

#[no_mangle]
pub extern "C" fn String_from_double(v: f64) -> *mut GlintString {
    alloc_from_bytes(trim_float(v).as_bytes())
}

#[no_mangle]
pub extern "C" fn String_from_bool(v: bool) -> *mut GlintString {
    alloc_from_bytes(if v { b"true" } else { b"false" })
}

#[no_mangle]
pub extern "C" fn String_from_char(v: u32) -> *mut GlintString {
    let ch = char::from_u32(v).unwrap_or('\u{FFFD}');
    let mut buf = [0u8; 4];
    alloc_from_bytes(ch.encode_utf8(&mut buf).as_bytes())
}

fn trim_float(v: f64) -> String {
    let mut s = format!("{v}");
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

#[no_mangle]
pub unsafe extern "C" fn String_to_int(s: *const GlintString) -> i32 {
    parse_lenient(s).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn String_to_long(s: *const GlintString) -> i64 {
    parse_lenient(s).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn String_to_float(s: *const GlintString) -> f32 {
    parse_lenient(s).unwrap_or(0.0)
}

#[no_mangle]
pub unsafe extern "C" fn String_to_double(s: *const GlintString) -> f64 {
    parse_lenient(s).unwrap_or(0.0)
}

#[no_mangle]
pub unsafe extern "C" fn String_to_bool(s: *const GlintString) -> bool {
    let bytes = as_bytes(s);
    let text = String::from_utf8_lossy(bytes);
    text.trim().eq_ignore_ascii_case("true")
}

#[no_mangle]
pub unsafe extern "C" fn String_to_char(s: *const GlintString) -> u32 {
    let bytes = as_bytes(s);
    let text = String::from_utf8_lossy(bytes);
    text.chars().next().map(|c| c as u32).unwrap_or(0)
}

unsafe fn parse_lenient<T: std::str::FromStr>(s: *const GlintString) -> Option<T> {
    let bytes = as_bytes(s);
    let text = String::from_utf8_lossy(bytes);
    text.trim().parse::<T>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn to_rust_string(s: *mut GlintString) -> String {
        let bytes = as_bytes(s);
        let out = String::from_utf8_lossy(bytes).into_owned();
        String_free(s);
        out
    }

    #[test]
    fn concat_handles_nulls() {
        unsafe {
            let a = String_new_from_literal(b"x=".as_ptr() as *const c_char, 2);
            let b = String_concat(a, std::ptr::null());
            assert_eq!(to_rust_string(b), "x=");
            String_free(a);
        }
    }

    #[test]
    fn scenario_four_concatenation() {
        unsafe {
            let x_eq = String_new_from_literal(b"x=".as_ptr() as *const c_char, 2);
            let forty_two = String_from_int(42);
            let comma_b = String_new_from_literal(b",b=".as_ptr() as *const c_char, 3);
            let t = String_from_bool(true);

            let s1 = String_concat(x_eq, forty_two);
            let s2 = String_concat(s1, comma_b);
            let s3 = String_concat(s2, t);
            assert_eq!(to_rust_string(s3), "x=42,b=true");

            String_free(x_eq);
            String_free(forty_two);
            String_free(comma_b);
            String_free(t);
            String_free(s1);
            String_free(s2);
        }
    }

    #[test]
    fn round_trip_int() {
        unsafe {
            let s = String_from_int(-17);
            assert_eq!(String_to_int(s), -17);
            String_free(s);
        }
    }
}
