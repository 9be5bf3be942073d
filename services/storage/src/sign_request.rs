//! `SharedKeyLite` request signing for the blob service.
//!
//! - [Authorize with Shared Key](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#shared-key-lite-and-table-service-format-for-2009-09-19-and-later)

use crate::constants::*;
use crate::Credential;
use azrest_core::hash::sign;
use azrest_core::time::{format_http_date, DateTime};
use azrest_core::{Result, SigningRequest};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use std::fmt::Write;

/// Sign `parts` in place: set `x-ms-date` from `time` and add the
/// `SharedKeyLite` authorization header.
pub fn sign_parts(parts: &mut Parts, cred: &Credential, time: DateTime) -> Result<()> {
    let mut ctx = SigningRequest::build(parts)?;

    ctx.headers
        .insert(X_MS_DATE, format_http_date(time).parse()?);

    let string_to_sign = string_to_sign(&ctx, &cred.account_name)?;
    let signature = sign(&cred.account_key, &string_to_sign)?;
    ctx.headers.insert(AUTHORIZATION, {
        let mut value: HeaderValue =
            format!("SharedKeyLite {}:{}", cred.account_name, signature).parse()?;
        value.set_sensitive(true);
        value
    });

    ctx.apply(parts)
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// CanonicalizedHeaders + "\n" +
/// CanonicalizedResource;
/// ```
///
/// The Date line is always empty since `x-ms-date` is part of the
/// canonicalized headers, and every canonicalized header starts with `\n`.
pub fn string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(128);
    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&CONTENT_TYPE)?)?;
    write!(
        &mut s,
        "{}",
        SigningRequest::canonicalize_headers(ctx.header_to_vec_with_prefix("x-ms-")?)
    )?;
    writeln!(&mut s)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);
    Ok(s)
}

/// Only `comp` takes part in the `SharedKeyLite` canonicalized resource.
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    match ctx.query_get("comp") {
        Some(comp) => format!("/{}{}?comp={}", account_name, ctx.path, comp),
        None => format!("/{}{}", account_name, ctx.path),
    }
}
