use crate::error::{self, BookError};
use crate::registry::Library;
use anyhow::Context;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const INSTRUCTIONS: &str = "Browse and read local e-books. List EPUB or PDF files in a \
directory, then inspect a book's metadata and table of contents before reading chapters \
(EPUB, by chapter id or href) or pages and chapters (PDF, by 1-based page number or \
outline title).";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DirectoryParams {
    /// Directory to list (not searched recursively)
    pub path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EpubParams {
    /// Path to the EPUB file
    pub epub_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EpubChapterParams {
    /// Path to the EPUB file
    pub epub_path: String,
    /// Manifest id or href of the chapter, as returned by get_epub_toc
    pub chapter_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PdfParams {
    /// Path to the PDF file
    pub pdf_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PdfPageParams {
    /// Path to the PDF file
    pub pdf_path: String,
    /// 1-based page number
    pub page_number: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PdfChapterParams {
    /// Path to the PDF file
    pub pdf_path: String,
    /// Outline title of the chapter, as returned by get_pdf_toc
    pub chapter_title: String,
}

/// MCP front end over a [`Library`]
#[derive(Clone)]
pub struct EbookServer {
    library: Library,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl EbookServer {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List the EPUB files directly inside a directory")]
    async fn get_all_epub_files(
        &self,
        Parameters(params): Parameters<DirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_all_epub_files", path = %params.path, "Tool call");
        json_result(self.library.all_epub_files(&params.path))
    }

    #[tool(description = "Get the metadata of an EPUB file (title, creator, language, ...)")]
    async fn get_epub_metadata(
        &self,
        Parameters(params): Parameters<EpubParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_epub_metadata", epub_path = %params.epub_path, "Tool call");
        json_result(self.library.epub_metadata(&params.epub_path))
    }

    #[tool(description = "Get the table of contents of an EPUB file as [title, href] pairs")]
    async fn get_epub_toc(
        &self,
        Parameters(params): Parameters<EpubParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_epub_toc", epub_path = %params.epub_path, "Tool call");
        json_result(self.library.epub_toc(&params.epub_path))
    }

    #[tool(description = "Get one chapter of an EPUB file as markdown")]
    async fn get_epub_chapter_markdown(
        &self,
        Parameters(params): Parameters<EpubChapterParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "get_epub_chapter_markdown",
            epub_path = %params.epub_path,
            chapter_id = %params.chapter_id,
            "Tool call"
        );
        text_result(
            self.library
                .epub_chapter_markdown(&params.epub_path, &params.chapter_id),
        )
    }

    #[tool(description = "List the PDF files directly inside a directory")]
    async fn get_all_pdf_files(
        &self,
        Parameters(params): Parameters<DirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_all_pdf_files", path = %params.path, "Tool call");
        json_result(self.library.all_pdf_files(&params.path))
    }

    #[tool(description = "Get the metadata of a PDF file (title, author, page count, ...)")]
    async fn get_pdf_metadata(
        &self,
        Parameters(params): Parameters<PdfParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_pdf_metadata", pdf_path = %params.pdf_path, "Tool call");
        json_result(self.library.pdf_metadata(&params.pdf_path))
    }

    #[tool(description = "Get the outline of a PDF file as [title, page number] pairs")]
    async fn get_pdf_toc(
        &self,
        Parameters(params): Parameters<PdfParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_pdf_toc", pdf_path = %params.pdf_path, "Tool call");
        json_result(self.library.pdf_toc(&params.pdf_path))
    }

    #[tool(description = "Get the plain text of one PDF page (1-based page number)")]
    async fn get_pdf_page_text(
        &self,
        Parameters(params): Parameters<PdfPageParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "get_pdf_page_text",
            pdf_path = %params.pdf_path,
            page_number = params.page_number,
            "Tool call"
        );
        text_result(
            self.library
                .pdf_page_text(&params.pdf_path, params.page_number),
        )
    }

    #[tool(description = "Get one PDF page as markdown (1-based page number)")]
    async fn get_pdf_page_markdown(
        &self,
        Parameters(params): Parameters<PdfPageParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "get_pdf_page_markdown",
            pdf_path = %params.pdf_path,
            page_number = params.page_number,
            "Tool call"
        );
        text_result(
            self.library
                .pdf_page_markdown(&params.pdf_path, params.page_number),
        )
    }

    #[tool(
        description = "Get the text of a PDF chapter by its outline title, as [text, page numbers]"
    )]
    async fn get_pdf_chapter_content(
        &self,
        Parameters(params): Parameters<PdfChapterParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "get_pdf_chapter_content",
            pdf_path = %params.pdf_path,
            chapter_title = %params.chapter_title,
            "Tool call"
        );
        json_result(
            self.library
                .pdf_chapter_content(&params.pdf_path, &params.chapter_title),
        )
    }
}

#[tool_handler]
impl ServerHandler for EbookServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

fn text_result(result: error::Result<String>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(err) => Ok(error_result(&err)),
    }
}

fn json_result<T: Serialize>(result: error::Result<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(err) => Ok(error_result(&err)),
    }
}

/// Failed calls carry `{"kind", "message"}` as their only content
fn error_result(err: &BookError) -> CallToolResult {
    let body = serde_json::json!({
        "kind": err.kind(),
        "message": err.to_string(),
    });
    CallToolResult::error(vec![Content::text(body.to_string())])
}

/// Serve `library` over stdio until the client disconnects
pub async fn serve(library: Library) -> anyhow::Result<()> {
    let server = EbookServer::new(library);

    tracing::info!("ebook-mcp ready on stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP service")?;
    let reason = service
        .waiting()
        .await
        .context("MCP service terminated abnormally")?;
    tracing::info!(?reason, "ebook-mcp stopped");

    Ok(())
}
