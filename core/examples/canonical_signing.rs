use azrest_core::hash::{base64_encode, sign};
use azrest_core::time::{format_http_date, now};
use azrest_core::{Result, SigningRequest};

fn main() -> Result<()> {
    let key = base64_encode(b"my-account-key");
    let date = format_http_date(now());

    // Resource scheme, lowercased as a whole.
    let resource = format!("get\ndbs\n\n{}\n\n", date.to_lowercase());
    println!("resource signature: {}", sign(&key, &resource)?);

    // Header canonicalization scheme.
    let (mut parts, _) = http::Request::get("https://acct.blob.core.windows.net/?comp=list")
        .header("X-Ms-Version", "2014-02-14")
        .header("x-ms-date", &date)
        .body(())?
        .into_parts();
    let req = SigningRequest::build(&mut parts)?;
    let headers = SigningRequest::canonicalize_headers(req.header_to_vec_with_prefix("x-ms-")?);
    let string_to_sign = format!("GET\n\n\n{headers}\n/acct{}?comp=list", req.path);
    println!("shared key lite signature: {}", sign(&key, &string_to_sign)?);

    Ok(())
}
