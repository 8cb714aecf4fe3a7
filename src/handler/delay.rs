//! Artificial delay endpoint
//!
//! `/slow?ms=N` suspends only its own task with a timer, so other requests
//! on the runtime keep being served while it waits.

use std::borrow::Cow;
use std::time::Duration;

use hyper::Response;

use crate::error::RouterError;
use crate::http::{self, query, ResponseBody};

pub const SLOW_PATH: &str = "/slow";

/// Query parameter carrying the delay in milliseconds
pub const DELAY_PARAM: &str = "ms";

/// Used when the query has no `ms` value
pub const DEFAULT_DELAY_MS: &str = "1000";

/// Read the requested delay from the query string
pub fn parse_delay(raw_query: Option<&str>) -> Result<i64, RouterError> {
    let value = query::get_param(raw_query, DELAY_PARAM)
        .unwrap_or_else(|| DEFAULT_DELAY_MS.to_string());

    let parsed = strip_digit_separators(value.trim()).parse::<i64>();
    parsed.map_err(|source| RouterError::ParameterFormat {
        name: DELAY_PARAM,
        value,
        source,
    })
}

/// Remove single `_` separators placed between two digits (`1_000`)
///
/// Misplaced underscores are left in place so the parse rejects them.
fn strip_digit_separators(value: &str) -> Cow<'_, str> {
    if !value.contains('_') {
        return Cow::Borrowed(value);
    }

    let bytes = value.as_bytes();
    let well_placed = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });

    if well_placed {
        Cow::Owned(value.replace('_', ""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Clamp the requested delay to the configured maximum, if any
pub fn effective_delay(requested: i64, max_ms: Option<i64>) -> i64 {
    max_ms.map_or(requested, |max| requested.min(max))
}

/// Serve `/slow`: wait, then report the delay that was applied
pub async fn serve_slow(
    raw_query: Option<&str>,
    max_ms: Option<i64>,
) -> Result<Response<ResponseBody>, RouterError> {
    let delay_ms = effective_delay(parse_delay(raw_query)?, max_ms);

    // Zero and negative delays respond immediately
    if let Ok(wait) = u64::try_from(delay_ms) {
        if wait > 0 {
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }
    }

    Ok(http::build_no_cache_text_response(
        format!("Delayed response ({delay_ms}ms)"),
        false,
    ))
}
