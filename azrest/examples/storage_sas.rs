use anyhow::Result;
use azrest::default_context;
use azrest::storage::{BlobFile, BlobStorage, Config, SharedAccessSignature};
use azrest::time::now;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = default_context();
    let storage = BlobStorage::new(ctx.clone(), Config::default().from_env(&ctx))?;

    let blob = BlobFile::new("hello, azure")
        .with_file_name("hello.txt")
        .with_content_type("text/plain");
    storage.put_blob("shared", "hello.txt", blob).await?;

    // Readable for one hour, shown with full timestamps.
    let sas = SharedAccessSignature::new("shared")
        .with_blob("hello.txt")
        .with_permissions("r")
        .with_start(now())
        .with_expiry(chrono::TimeDelta::hours(1))
        .with_long_format(true);
    println!("{}", storage.signed_url(&sas)?);

    Ok(())
}
