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

//! Hash related utils.

use crate::Error;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// Base64 encoded HMAC with SHA256 hash.
pub fn base64_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    base64_encode(&hmac_sha256(key, content))
}

/// Sign the canonical string with a base64 encoded secret key.
///
/// This is the primitive shared by every Azure scheme: decode the account
/// key, HMAC-SHA256 the UTF-8 bytes of `string_to_sign`, base64 the MAC.
///
/// A key that is not valid base64 returns a
/// [`ErrorKind::SigningFailed`](crate::ErrorKind::SigningFailed) error.
pub fn sign(secret_key: &str, string_to_sign: &str) -> crate::Result<String> {
    let key = BASE64_STANDARD.decode(secret_key).map_err(|e| {
        Error::signing_failed("secret key is not valid base64").with_source(e)
    })?;

    Ok(base64_hmac_sha256(&key, string_to_sign.as_bytes()))
}
