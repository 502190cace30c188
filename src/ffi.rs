//! FFI bindings for Synheart Stride
//!
//! This module provides C-compatible functions for driving a tracker from a
//! mobile or watch host. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `stride_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::TrackerConfig;
use crate::encoder::SnapshotEncoder;
use crate::error::TrackerError;
use crate::pipeline::replay_ndjson;
use crate::schema::TrainingDay;
use crate::tracker::{SegmentTracker, TrackerState};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Helper to convert a Vec<String> to a JSON array string
fn vec_to_json_array(vec: Vec<String>) -> String {
    // Each string is already valid JSON, so we join them as array elements
    format!("[{}]", vec.join(","))
}

/// Report an error result as NULL plus a thread-local message
fn string_result(result: Result<String, TrackerError>) -> *mut c_char {
    match result {
        Ok(s) => string_to_cstr(&s),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Replay an NDJSON sample stream against a training day and return a JSON
/// array of replay steps.
///
/// # Safety
/// - `training_day_json` and `samples_ndjson` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `stride_free_string`.
/// - Returns NULL on error; call `stride_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stride_replay_ndjson(
    training_day_json: *const c_char,
    samples_ndjson: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let day_str = match cstr_to_string(training_day_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid training day string pointer");
            return ptr::null_mut();
        }
    };

    let samples_str = match cstr_to_string(samples_ndjson) {
        Some(s) => s,
        None => {
            set_last_error("Invalid samples string pointer");
            return ptr::null_mut();
        }
    };

    string_result(replay_ndjson(&day_str, &samples_str).map(vec_to_json_array))
}

// ============================================================================
// Stateful Tracker API
// ============================================================================

/// Opaque handle to a live tracker
pub struct StrideTrackerHandle {
    tracker: SegmentTracker,
    encoder: SnapshotEncoder,
}

fn build_tracker(
    training_day_json: &str,
    state_json: Option<&str>,
    config: TrackerConfig,
) -> Result<SegmentTracker, TrackerError> {
    let day = TrainingDay::from_json(training_day_json)?;
    let definition = day.to_definition()?;

    match state_json {
        Some(json) => {
            let state: TrackerState = serde_json::from_str(json)?;
            SegmentTracker::resume_with_config(definition, state, config)
        }
        None => SegmentTracker::with_config(definition, day.mode(), config),
    }
}

fn into_handle(result: Result<SegmentTracker, TrackerError>) -> *mut StrideTrackerHandle {
    match result {
        Ok(tracker) => Box::into_raw(Box::new(StrideTrackerHandle {
            tracker,
            encoder: SnapshotEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Create a tracker from a training-day JSON document.
///
/// `pace_tolerance_secs` <= 0 selects the default tolerance.
///
/// # Safety
/// - `training_day_json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `stride_tracker_free`.
/// - Returns NULL on error; call `stride_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_new(
    training_day_json: *const c_char,
    pace_tolerance_secs: f64,
) -> *mut StrideTrackerHandle {
    clear_last_error();

    let day_str = match cstr_to_string(training_day_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid training day string pointer");
            return ptr::null_mut();
        }
    };

    into_handle(build_tracker(&day_str, None, config_from(pace_tolerance_secs)))
}

/// Resume a tracker from a state previously returned by `stride_tracker_state`.
///
/// `pace_tolerance_secs` <= 0 selects the default tolerance.
///
/// # Safety
/// - `training_day_json` and `state_json` must be valid null-terminated C strings.
/// - Returns a pointer that must be freed with `stride_tracker_free`.
/// - Returns NULL on error; call `stride_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_resume(
    training_day_json: *const c_char,
    state_json: *const c_char,
    pace_tolerance_secs: f64,
) -> *mut StrideTrackerHandle {
    clear_last_error();

    let day_str = match cstr_to_string(training_day_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid training day string pointer");
            return ptr::null_mut();
        }
    };

    let state_str = match cstr_to_string(state_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid state string pointer");
            return ptr::null_mut();
        }
    };

    into_handle(build_tracker(
        &day_str,
        Some(&state_str),
        config_from(pace_tolerance_secs),
    ))
}

fn config_from(pace_tolerance_secs: f64) -> TrackerConfig {
    if pace_tolerance_secs > 0.0 {
        TrackerConfig::with_pace_tolerance(pace_tolerance_secs)
    } else {
        TrackerConfig::default()
    }
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `stride_tracker_new` or
///   `stride_tracker_resume`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_free(tracker: *mut StrideTrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Feed one sample and return the resulting events as a JSON array.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `stride_tracker_new`.
/// - Returns a newly allocated string that must be freed with `stride_free_string`.
/// - Returns NULL on error; call `stride_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_update(
    tracker: *mut StrideTrackerHandle,
    current_distance: f64,
    current_speed: f64,
) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &mut *tracker;
    let events = handle.tracker.update_progress(current_distance, current_speed);
    string_result(serde_json::to_string(&events).map_err(TrackerError::JsonError))
}

/// Encode the tracker's current snapshot as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `stride_tracker_new`.
/// - Returns a newly allocated string that must be freed with `stride_free_string`.
/// - Returns NULL on error; call `stride_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_snapshot(
    tracker: *const StrideTrackerHandle,
) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &*tracker;
    string_result(handle.encoder.encode_to_json(&handle.tracker))
}

/// Serialize the tracker state for checkpointing.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `stride_tracker_new`.
/// - Returns a newly allocated string that must be freed with `stride_free_string`.
/// - Returns NULL on error; call `stride_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_state(tracker: *const StrideTrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &*tracker;
    string_result(serde_json::to_string(&handle.tracker.state()).map_err(TrackerError::JsonError))
}

/// Whether the workout is completed.
///
/// Returns 1 when completed, 0 when not, -1 for a NULL tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `stride_tracker_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_is_completed(tracker: *const StrideTrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }
    i32::from((*tracker).tracker.is_completed())
}

/// Meters left in the active segment, or a negative value for a NULL tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `stride_tracker_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn stride_tracker_remaining_distance(
    tracker: *const StrideTrackerHandle,
) -> f64 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1.0;
    }
    (*tracker).tracker.remaining_distance()
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Stride functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Stride function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn stride_free_string(ptr: *mut c_char) {
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
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Stride function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn stride_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Stride library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn stride_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
