//! Object header layout consumed by emitted code.
//!
//! Bit-exact with the ABI table: offset 0 is an atomic `i32` ref count,
//! offset 4 is the `i32` type id, offset 8 is the vtable pointer (null if
//! the class has no virtuals), and fields begin at offset 16 on a 64-bit
//! target. `#[repr(C)]` plus explicit padding keeps that true regardless
//! of host pointer width quirks.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::sync::atomic::{AtomicI32, Ordering};

#[repr(C)]
pub struct ObjectHeader {
    pub ref_count: AtomicI32,
    pub type_id: i32,
    pub vtable: *const (),
}

/// Byte size of [`ObjectHeader`] — 16 on a 64-bit target (§6's bit-exact
/// layout table). Code generation imports this directly rather than
/// hardcoding the constant a second time.
pub const HEADER_SIZE: usize = std::mem::size_of::<ObjectHeader>();
const HEADER_ALIGN: usize = std::mem::align_of::<ObjectHeader>();

/// A `u64` holding the object's `data_size` sits immediately before the
/// header, so `Object_release` can recover the exact `Layout`
/// `Object_alloc` used without growing `ObjectHeader` itself — the
/// bit-exact layout table only promises offsets relative to the header
/// pointer, not what precedes it.
const SIZE_PREFIX: usize = std::mem::size_of::<u64>();

/// Destructor function pointer stored at vtable slot 0.
pub type Destructor = unsafe extern "C" fn(*mut u8);

unsafe fn alloc_layout_for(data_size: usize) -> Layout {
    Layout::from_size_align_unchecked(SIZE_PREFIX + HEADER_SIZE + data_size, HEADER_ALIGN)
}

#[no_mangle]
pub unsafe extern "C" fn Object_alloc(data_size: i64, type_id: i32, vtable: *const ()) -> *mut u8 {
    let data_size = data_size.max(0) as usize;
    let total = SIZE_PREFIX + HEADER_SIZE + data_size;
    let layout = match Layout::from_size_align(total, HEADER_ALIGN) {
        Ok(l) => l,
        Err(_) => return std::ptr::null_mut(),
    };
    let raw = alloc_zeroed(layout);
    if raw.is_null() {
        log::error!(target: "glint_runtime::object", "allocation failed for {total} bytes");
        return std::ptr::null_mut();
    }
    (raw as *mut u64).write(data_size as u64);
    let header = raw.add(SIZE_PREFIX) as *mut ObjectHeader;
    (*header).ref_count = AtomicI32::new(1);
    (*header).type_id = type_id;
    (*header).vtable = vtable;
    header as *mut u8
}

#[no_mangle]
pub unsafe extern "C" fn Object_retain(header: *mut u8) {
    if header.is_null() {
        return;
    }
    let h = &*(header as *const ObjectHeader);
    h.ref_count.fetch_add(1, Ordering::Relaxed);
}

#[no_mangle]
pub unsafe extern "C" fn Object_release(header: *mut u8) {
    if header.is_null() {
        return;
    }
    let h = &*(header as *const ObjectHeader);
    if h.ref_count.fetch_sub(1, Ordering::AcqRel) == 1 {
        // last reference: run the destructor via vtable slot 0, then free.
        let vtable = h.vtable;
        if !vtable.is_null() {
            let slot0 = vtable as *const Option<Destructor>;
            if let Some(dtor) = *slot0 {
                let fields_ptr = header.add(HEADER_SIZE);
                dtor(fields_ptr);
            }
        }
        let raw = header.sub(SIZE_PREFIX);
        let data_size = (raw as *const u64).read() as usize;
        dealloc(raw, alloc_layout_for(data_size));
    }
}

#[no_mangle]
pub unsafe extern "C" fn Object_get_ref_count(header: *mut u8) -> i32 {
    if header.is_null() {
        return 0;
    }
    let h = &*(header as *const ObjectHeader);
    h.ref_count.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_starts_at_refcount_one() {
        unsafe {
            let header = Object_alloc(16, 7, std::ptr::null());
            assert!(!header.is_null());
            assert_eq!(Object_get_ref_count(header), 1);
            Object_release(header);
        }
    }

    #[test]
    fn retain_release_round_trip() {
        unsafe {
            let header = Object_alloc(8, 1, std::ptr::null());
            Object_retain(header);
            assert_eq!(Object_get_ref_count(header), 2);
            Object_release(header);
            assert_eq!(Object_get_ref_count(header), 1);
            Object_release(header);
        }
    }

    #[test]
    fn release_frees_the_full_allocation_for_nonzero_data_size() {
        // Exercises the dealloc path with fields present; under miri or
        // with a layout mismatch this would abort rather than assert.
        unsafe {
            let header = Object_alloc(64, 3, std::ptr::null());
            let fields = header.add(HEADER_SIZE);
            std::ptr::write_bytes(fields, 0xAB, 64);
            Object_release(header);
        }
    }

    #[test]
    fn null_header_is_a_no_op() {
        unsafe {
            Object_retain(std::ptr::null_mut());
            Object_release(std::ptr::null_mut());
            assert_eq!(Object_get_ref_count(std::ptr::null_mut()), 0);
        }
    }
}
