use crate::error::Result;
use crate::metadata::MetadataRecord;
use std::path::Path;

/// `(label, href)` entry of an EPUB table of contents
pub type EpubTocEntry = (String, String);

/// `(label, page)` entry of a PDF outline; pages are 1-based
pub type PdfTocEntry = (String, u32);

/// Chapter text paired with the pages it spans, in order
pub type PdfChapter = (String, Vec<u32>);

/// An opened EPUB, valid for the duration of one call
pub trait EpubBook: Send {
    /// Render the chapter named by `chapter_id` as markdown
    fn chapter_markdown(&self, chapter_id: &str) -> Result<String>;
}

/// Format helper for EPUB files
pub trait EpubHelper: Send + Sync {
    fn metadata(&self, path: &Path) -> Result<MetadataRecord>;
    fn toc(&self, path: &Path) -> Result<Vec<EpubTocEntry>>;
    /// Open the book for chapter extraction
    fn read_book(&self, path: &Path) -> Result<Box<dyn EpubBook>>;
}

/// Format helper for PDF files.
///
/// Page numbers are passed through untouched; implementations decide
/// which values are valid.
pub trait PdfHelper: Send + Sync {
    fn metadata(&self, path: &Path) -> Result<MetadataRecord>;
    fn toc(&self, path: &Path) -> Result<Vec<PdfTocEntry>>;
    fn page_text(&self, path: &Path, page: i64) -> Result<String>;
    fn page_markdown(&self, path: &Path, page: i64) -> Result<String>;
    fn chapter_content(&self, path: &Path, title: &str) -> Result<PdfChapter>;
}
