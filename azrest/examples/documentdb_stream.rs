use anyhow::Result;
use azrest::default_context;
use azrest::documentdb::stream::stream_response;
use azrest::documentdb::{Config, DocumentDb, QueryOptions};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = default_context();
    let db = DocumentDb::new(ctx.clone(), Config::default().from_env(&ctx))?;

    // Pass the first page through to stdout, the continuation token is
    // injected as `_continuation` when the service returns one.
    let resp = db
        .query_documents_raw(
            "db",
            "coll",
            "SELECT * FROM c",
            &QueryOptions::default().with_page_size(10),
        )
        .await?;
    let mut stdout = tokio::io::stdout();
    stream_response(resp, &mut stdout).await?;

    Ok(())
}
