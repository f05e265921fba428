mod cli;
mod epub_reader;
mod error;
mod listing;
mod logging;
mod markdown;
mod metadata;
mod pdf_reader;
mod reader;
mod registry;
mod server;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(&cli.log_level);

    let library = registry::Library::new(
        Arc::new(epub_reader::RbookEpub),
        Arc::new(pdf_reader::LopdfPdf),
    );
    server::serve(library).await
}
