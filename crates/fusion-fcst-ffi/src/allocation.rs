//! Memory allocation utilities for FFI functions.
//!
//! Arrays handed to C are `malloc`-allocated so the caller can release them
//! through the matching `fusion_free_*` function.

use crate::types::{ErrorCode, FusionError};
use std::ptr;

// Memory allocation - use libc on native, std::alloc on WASM
#[cfg(not(target_family = "wasm"))]
use libc::{free, malloc};

#[cfg(target_family = "wasm")]
unsafe fn malloc(size: usize) -> *mut core::ffi::c_void {
    use std::alloc::{alloc, Layout};
    match Layout::from_size_align(size, 8) {
        Ok(layout) => alloc(layout) as *mut core::ffi::c_void,
        Err(_) => ptr::null_mut(),
    }
}

#[cfg(target_family = "wasm")]
unsafe fn free(ptr: *mut core::ffi::c_void) {
    use std::alloc::{dealloc, Layout};
    if !ptr.is_null() {
        let layout = Layout::from_size_align_unchecked(1, 8);
        dealloc(ptr as *mut u8, layout);
    }
}

/// Allocate a C array and copy `items` into it.
///
/// An empty slice yields a null pointer.
///
/// # Safety
/// `out_ptr` must be a valid pointer; `out_error` must be valid if non-null.
/// Returns false (with `AllocationError` set) on allocation failure.
pub unsafe fn alloc_and_copy_array<T: Copy>(
    items: &[T],
    out_ptr: *mut *mut T,
    out_error: *mut FusionError,
) -> bool {
    if items.is_empty() {
        *out_ptr = ptr::null_mut();
        return true;
    }

    let ptr = malloc(std::mem::size_of_val(items)) as *mut T;
    if ptr.is_null() {
        if !out_error.is_null() {
            (*out_error).set_error(ErrorCode::AllocationError, "Memory allocation failed");
        }
        return false;
    }

    ptr::copy_nonoverlapping(items.as_ptr(), ptr, items.len());
    *out_ptr = ptr;
    true
}

/// Free a pointer allocated by this module.
///
/// # Safety
/// The pointer must be null or have been returned by [`alloc_and_copy_array`].
#[inline]
pub unsafe fn free_ptr(ptr: *mut core::ffi::c_void) {
    if !ptr.is_null() {
        free(ptr);
    }
}

/// Free the listed pointer fields of a result struct and reset them to null.
#[macro_export]
macro_rules! free_fields {
    ($result:expr, $($field:ident),+ $(,)?) => {{
        $(
            if !$result.$field.is_null() {
                $crate::allocation::free_ptr($result.$field as *mut core::ffi::c_void);
                $result.$field = std::ptr::null_mut();
            }
        )+
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ffi::{c_double, c_int};

    #[test]
    fn test_alloc_and_copy_doubles() {
        let data = [1.5, -2.0, 3.25];
        let mut out: *mut c_double = ptr::null_mut();
        let mut error = FusionError::default();

        unsafe {
            assert!(alloc_and_copy_array(&data, &mut out, &mut error));
            assert!(!out.is_null());
            assert_eq!(std::slice::from_raw_parts(out, 3), &data);
            free_ptr(out as *mut core::ffi::c_void);
        }
        assert_eq!(error.code, ErrorCode::Success);
    }

    #[test]
    fn test_alloc_and_copy_empty_is_null() {
        let mut out: *mut c_int = 0x1 as *mut c_int;
        let mut error = FusionError::default();

        unsafe {
            assert!(alloc_and_copy_array::<c_int>(&[], &mut out, &mut error));
        }
        assert!(out.is_null());
    }

    #[test]
    fn test_free_fields_resets_pointers() {
        struct Holder {
            values: *mut c_double,
        }

        let mut holder = Holder {
            values: ptr::null_mut(),
        };
        unsafe {
            assert!(alloc_and_copy_array(
                &[1.0, 2.0],
                &mut holder.values,
                ptr::null_mut()
            ));
            crate::free_fields!(holder, values);
        }
        assert!(holder.values.is_null());
    }
}
