use anyhow::Result;
use azrest_core::Context;
use azrest_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Transport policy (timeouts, pooling) belongs to the client, azrest adds none.
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .user_agent("azrest-example/1.0")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let req = http::Request::builder()
        .method("GET")
        .uri("https://httpbin.org/get")
        .header("X-Test-Header", "azrest-example")
        .body(Bytes::new())?;

    match ctx.http_send_buffered(req).await {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            for (name, value) in resp.headers() {
                println!("  {name}: {value:?}");
            }
            println!("{}", String::from_utf8_lossy(resp.body()));
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
