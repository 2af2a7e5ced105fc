//! FFI bindings for MindSalary Core
//!
//! C-compatible entry points for host apps. Strings are null-terminated UTF-8;
//! every returned string is allocated here and must be released with
//! `ms_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ScorerConfig;
use crate::stress::pipeline::{sample_to_report, StressProcessor};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Caller must free with `ms_free_string`
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a sample JSON document and return report JSON.
///
/// # Safety
/// - `sample_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ms_free_string`.
/// - Returns NULL on error; call `ms_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ms_sample_to_report(sample_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json = match cstr_to_string(sample_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sample string pointer");
            return ptr::null_mut();
        }
    };

    match sample_to_report(&json) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a StressProcessor
pub struct StressProcessorHandle {
    processor: StressProcessor,
}

/// Create a processor.
///
/// # Safety
/// - `config_json` is either NULL (default configuration) or a valid
///   null-terminated C string holding a configuration document.
/// - Returns a pointer that must be freed with `ms_processor_free`.
/// - Returns NULL on error; call `ms_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_new(
    config_json: *const c_char,
) -> *mut StressProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        ScorerConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match ScorerConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(StressProcessorHandle {
        processor: StressProcessor::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a pointer returned by `ms_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_free(processor: *mut StressProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score a sample, record it in the processor history and return report JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ms_processor_new`.
/// - `sample_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ms_free_string`.
/// - Returns NULL on error; call `ms_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_process(
    processor: *mut StressProcessorHandle,
    sample_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json = match cstr_to_string(sample_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sample string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process(&json) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save processor history to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ms_processor_new`.
/// - Returns a newly allocated string that must be freed with `ms_free_string`.
/// - Returns NULL on error; call `ms_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_save_history(
    processor: *mut StressProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_history() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load processor history from JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ms_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error; call `ms_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_load_history(
    processor: *mut StressProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid history string pointer");
            return -1;
        }
    };

    match handle.processor.load_history(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Number of readings in the processor history, or -1 for a NULL handle.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ms_processor_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_reading_count(
    processor: *const StressProcessorHandle,
) -> i64 {
    if processor.is_null() {
        return -1;
    }
    (*processor).processor.reading_count() as i64
}

/// Drop all readings and alert state.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ms_processor_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn ms_processor_clear_history(processor: *mut StressProcessorHandle) {
    if !processor.is_null() {
        (*processor).processor.clear_history();
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by an `ms_` function.
///
/// # Safety
/// - `ptr` must be a pointer returned by an `ms_` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ms_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is thread-local and valid until the next `ms_` call
///   on this thread. Do NOT free it.
/// - Returns NULL if the last call succeeded.
#[no_mangle]
pub unsafe extern "C" fn ms_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ms_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
