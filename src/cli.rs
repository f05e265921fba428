use clap::Parser;

/// MCP server that lets agents browse and read EPUB and PDF files over stdio
#[derive(Parser, Debug)]
#[command(name = "ebook-mcp", version, about)]
pub struct Cli {
    /// Log filter directive (e.g. "debug" or "ebook_mcp=trace").
    /// Logs go to stderr; the EBOOK_MCP_LOG environment variable takes precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
