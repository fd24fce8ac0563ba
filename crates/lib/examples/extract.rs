//! Runs the extraction pipeline once against an image on disk.
//!
//! ```sh
//! AI_API_URL=https://api.anthropic.com/v1/messages AI_API_KEY=... \
//!   cargo run --example extract -- ./objects uploads shoe.jpg
//! ```
//!
//! The record is written to an in-memory database and printed as JSON.

use prodspec::{
    constants::DEFAULT_TABLE_NAME,
    providers::{
        ai::anthropic::AnthropicProvider, db::sqlite::SqliteRecordStore,
        object::local::LocalObjectStore,
    },
    ExtractionHandler, HandlerConfig, ProcessingEvent,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <object_root> <container> <key>", args[0]);
        return Ok(());
    }

    let api_url = env::var("AI_API_URL").map_err(|_| "AI_API_URL environment variable not set")?;
    let api_key = env::var("AI_API_KEY").ok();
    let mut config = HandlerConfig::default();
    if let Ok(model_id) = env::var("AI_MODEL") {
        config.model_id = model_id;
    }

    let record_store = SqliteRecordStore::new(":memory:").await?;
    record_store.initialize_schema(DEFAULT_TABLE_NAME).await?;

    let handler = ExtractionHandler::builder()
        .object_store(Box::new(LocalObjectStore::new(&args[1])))
        .inference_client(Box::new(AnthropicProvider::new(api_url, api_key)?))
        .record_store(Box::new(record_store))
        .config(config)
        .build()?;

    let event = ProcessingEvent::new(&args[2], &args[3]);
    match handler.process_event(&event).await {
        Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        Err(e) => {
            eprintln!("Extraction failed: {e}");
            handler.record_failure(&event.container, &event.key, &e).await;
        }
    }
    Ok(())
}
