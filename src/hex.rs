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
use crate::error::GeometryError;

/// Decode a hex-encoded WKB string
///
/// Upper and lower case digits are both accepted. Odd-length input and
/// non-hex characters are rejected.
pub fn decode(data: &str) -> Result<Vec<u8>, GeometryError> {
    if data.len() % 2 != 0 {
        return Err(GeometryError::Wkb(format!(
            "hex input has odd length {}",
            data.len()
        )));
    }
    hex::decode(data).map_err(|e| GeometryError::Wkb(format!("bad hex input: {e}")))
}

/// Encode bytes as lowercase hex, the form PostGIS exchanges with clients
pub fn encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// True if the string is a plausible hex-encoded WKB: non-empty and made
/// only of hex digits. Length parity is checked by [decode].
pub(crate) fn is_hex(data: &str) -> bool {
    !data.is_empty() && data.bytes().all(|b| b.is_ascii_hexdigit())
}
