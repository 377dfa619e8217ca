// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::GeometryError;

/// Default fractional-digit budget for WKT emission
pub const DEFAULT_PRECISION: usize = 6;

// Read with relaxed ordering: concurrent writers may interleave precisions
// across outputs but there is no memory hazard.
static PRECISION: AtomicUsize = AtomicUsize::new(DEFAULT_PRECISION);

/// Set the process-wide fractional-digit budget used when writing WKT
///
/// Only WKT/EWKT emission consults this value; WKB and GeoJSON output are
/// unaffected.
pub fn set_precision(digits: usize) {
    PRECISION.store(digits, Ordering::Relaxed);
}

/// The fractional-digit budget currently in effect
pub fn precision() -> usize {
    PRECISION.load(Ordering::Relaxed)
}

/// Render a double in the shortest decimal form within the current budget
pub(crate) fn format_double(value: f64) -> Result<String, GeometryError> {
    format_double_with(value, precision())
}

/// Render a double in the shortest decimal form within an explicit budget
///
/// Integer-valued doubles carry no decimal point, negative zero normalizes
/// to `0` and exponent notation is never produced. Trailing zeros are
/// trimmed from the fractional part only; trimming stops at the decimal
/// point so the integral digits of values like `120` survive.
pub(crate) fn format_double_with(
    value: f64,
    digits: usize,
) -> Result<String, GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::Wkt(format!(
            "cannot write non-finite coordinate {value}"
        )));
    }
    let mut text = format!("{value:.digits$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.replace_range(.., "0");
    }
    Ok(text)
}
