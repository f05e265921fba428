use crate::error::Result;
use crate::listing::{self, EPUB_SUFFIX, PDF_SUFFIX};
use crate::metadata::MetadataRecord;
use crate::reader::{EpubHelper, EpubTocEntry, PdfChapter, PdfHelper, PdfTocEntry};
use std::path::Path;
use std::sync::Arc;

/// The operations offered to clients, bound to the format helpers they
/// forward to. Every method passes its arguments through unchanged and
/// returns the helper's result as is.
#[derive(Clone)]
pub struct Library {
    epub: Arc<dyn EpubHelper>,
    pdf: Arc<dyn PdfHelper>,
}

impl Library {
    pub fn new(epub: Arc<dyn EpubHelper>, pdf: Arc<dyn PdfHelper>) -> Self {
        Self { epub, pdf }
    }

    pub fn all_epub_files(&self, dir: &str) -> Result<Vec<String>> {
        listing::files_with_suffix(Path::new(dir), EPUB_SUFFIX)
    }

    pub fn epub_metadata(&self, epub_path: &str) -> Result<MetadataRecord> {
        self.epub.metadata(Path::new(epub_path))
    }

    pub fn epub_toc(&self, epub_path: &str) -> Result<Vec<EpubTocEntry>> {
        self.epub.toc(Path::new(epub_path))
    }

    /// Opens the book, then extracts one chapter from it
    pub fn epub_chapter_markdown(&self, epub_path: &str, chapter_id: &str) -> Result<String> {
        let book = self.epub.read_book(Path::new(epub_path))?;
        book.chapter_markdown(chapter_id)
    }

    pub fn all_pdf_files(&self, dir: &str) -> Result<Vec<String>> {
        listing::files_with_suffix(Path::new(dir), PDF_SUFFIX)
    }

    pub fn pdf_metadata(&self, pdf_path: &str) -> Result<MetadataRecord> {
        self.pdf.metadata(Path::new(pdf_path))
    }

    pub fn pdf_toc(&self, pdf_path: &str) -> Result<Vec<PdfTocEntry>> {
        self.pdf.toc(Path::new(pdf_path))
    }

    pub fn pdf_page_text(&self, pdf_path: &str, page_number: i64) -> Result<String> {
        self.pdf.page_text(Path::new(pdf_path), page_number)
    }

    pub fn pdf_page_markdown(&self, pdf_path: &str, page_number: i64) -> Result<String> {
        self.pdf.page_markdown(Path::new(pdf_path), page_number)
    }

    pub fn pdf_chapter_content(&self, pdf_path: &str, chapter_title: &str) -> Result<PdfChapter> {
        self.pdf.chapter_content(Path::new(pdf_path), chapter_title)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{BookError, ErrorKind};
    use crate::metadata::MetadataValue;
    use crate::reader::EpubBook;
    use std::path::PathBuf;
    use std::sync::Mutex;

    pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

    fn missing(path: &Path) -> BookError {
        BookError::MissingFile(path.to_path_buf())
    }

    /// EPUB helper that serves canned answers for `book.epub` and reports
    /// every other path as missing
    #[derive(Default)]
    pub(crate) struct FakeEpub {
        pub(crate) calls: CallLog,
    }

    struct FakeBook {
        calls: CallLog,
    }

    impl EpubBook for FakeBook {
        fn chapter_markdown(&self, chapter_id: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("chapter_markdown {chapter_id}"));
            match chapter_id {
                "chapter1" => Ok("# Chapter 1\n\nOnce upon a time.\n".to_string()),
                _ => Err(BookError::Lookup(format!("Chapter not found: {chapter_id}"))),
            }
        }
    }

    impl FakeEpub {
        fn record(&self, call: &str, path: &Path) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{call} {}", path.display()));
            if path == Path::new("book.epub") {
                Ok(())
            } else {
                Err(missing(path))
            }
        }
    }

    impl EpubHelper for FakeEpub {
        fn metadata(&self, path: &Path) -> Result<MetadataRecord> {
            self.record("metadata", path)?;
            let mut record = MetadataRecord::new();
            record.insert(
                "title".to_string(),
                MetadataValue::Text("Test Book".to_string()),
            );
            Ok(record)
        }

        fn toc(&self, path: &Path) -> Result<Vec<EpubTocEntry>> {
            self.record("toc", path)?;
            Ok(vec![
                ("Chapter 1".to_string(), "chapter1.xhtml".to_string()),
                ("Chapter 2".to_string(), "chapter2.xhtml".to_string()),
            ])
        }

        fn read_book(&self, path: &Path) -> Result<Box<dyn EpubBook>> {
            self.record("read_book", path)?;
            Ok(Box::new(FakeBook {
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    /// PDF helper with a three-page `book.pdf` holding one chapter
    #[derive(Default)]
    pub(crate) struct FakePdf {
        pub(crate) calls: CallLog,
    }

    impl FakePdf {
        fn record(&self, call: String, path: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if path == Path::new("book.pdf") {
                Ok(())
            } else {
                Err(missing(path))
            }
        }

        fn check_page(page: i64) -> Result<()> {
            if (1..=3).contains(&page) {
                Ok(())
            } else {
                Err(BookError::Lookup(format!("Page {page} out of range")))
            }
        }
    }

    impl PdfHelper for FakePdf {
        fn metadata(&self, path: &Path) -> Result<MetadataRecord> {
            self.record(format!("metadata {}", path.display()), path)?;
            let mut record = MetadataRecord::new();
            record.insert("pages".to_string(), MetadataValue::Number(3));
            Ok(record)
        }

        fn toc(&self, path: &Path) -> Result<Vec<PdfTocEntry>> {
            self.record(format!("toc {}", path.display()), path)?;
            Ok(vec![("Chapter 1".to_string(), 1)])
        }

        fn page_text(&self, path: &Path, page: i64) -> Result<String> {
            self.record(format!("page_text {} {page}", path.display()), path)?;
            Self::check_page(page)?;
            Ok(format!("Text of page {page}"))
        }

        fn page_markdown(&self, path: &Path, page: i64) -> Result<String> {
            self.record(format!("page_markdown {} {page}", path.display()), path)?;
            Self::check_page(page)?;
            Ok(format!("## Page {page}\n"))
        }

        fn chapter_content(&self, path: &Path, title: &str) -> Result<PdfChapter> {
            self.record(format!("chapter_content {} {title}", path.display()), path)?;
            match title {
                "Chapter 1" => Ok(("This is chapter content.".to_string(), vec![1, 2, 3])),
                _ => Err(BookError::Lookup(format!("Chapter not found: {title}"))),
            }
        }
    }

    pub(crate) fn fake_library() -> (Library, CallLog, CallLog) {
        let epub = FakeEpub::default();
        let pdf = FakePdf::default();
        let (epub_calls, pdf_calls) = (Arc::clone(&epub.calls), Arc::clone(&pdf.calls));
        (
            Library::new(Arc::new(epub), Arc::new(pdf)),
            epub_calls,
            pdf_calls,
        )
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_listing_filters_by_format() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["book1.epub", "book2.epub", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let (library, _, _) = fake_library();
        let dir = dir.path().to_str().unwrap();

        let mut epubs = library.all_epub_files(dir).unwrap();
        epubs.sort();
        assert_eq!(epubs, ["book1.epub", "book2.epub"]);
        assert!(library.all_pdf_files(dir).unwrap().is_empty());
    }

    #[test]
    fn test_listing_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (library, _, _) = fake_library();
        let dir = dir.path().to_str().unwrap();

        assert!(library.all_epub_files(dir).unwrap().is_empty());
        assert!(library.all_pdf_files(dir).unwrap().is_empty());
    }

    #[test]
    fn test_epub_results_pass_through() {
        let (library, epub_calls, _) = fake_library();

        let record = library.epub_metadata("book.epub").unwrap();
        assert_eq!(
            record.get("title"),
            Some(&MetadataValue::Text("Test Book".to_string()))
        );
        let toc = library.epub_toc("book.epub").unwrap();
        assert_eq!(toc[1], ("Chapter 2".to_string(), "chapter2.xhtml".to_string()));
        let md = library.epub_chapter_markdown("book.epub", "chapter1").unwrap();
        assert_eq!(md, "# Chapter 1\n\nOnce upon a time.\n");

        assert_eq!(
            calls(&epub_calls),
            [
                "metadata book.epub",
                "toc book.epub",
                "read_book book.epub",
                "chapter_markdown chapter1",
            ]
        );
    }

    #[test]
    fn test_pdf_chapter_passes_through() {
        let (library, _, pdf_calls) = fake_library();

        let chapter = library.pdf_chapter_content("book.pdf", "Chapter 1").unwrap();
        assert_eq!(
            chapter,
            ("This is chapter content.".to_string(), vec![1, 2, 3])
        );
        assert_eq!(calls(&pdf_calls), ["chapter_content book.pdf Chapter 1"]);
    }

    #[test]
    fn test_missing_file_errors_pass_through() {
        let (library, _, _) = fake_library();
        let expect_missing = |result: Result<()>| {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingFile);
            assert!(err.to_string().contains("nonexistent"), "{err}");
        };

        expect_missing(library.epub_metadata("nonexistent.epub").map(drop));
        expect_missing(library.epub_toc("nonexistent.epub").map(drop));
        expect_missing(library.epub_chapter_markdown("nonexistent.epub", "chapter1").map(drop));
        expect_missing(library.pdf_metadata("nonexistent.pdf").map(drop));
        expect_missing(library.pdf_toc("nonexistent.pdf").map(drop));
        expect_missing(library.pdf_page_text("nonexistent.pdf", 1).map(drop));
        expect_missing(library.pdf_page_markdown("nonexistent.pdf", 1).map(drop));
        expect_missing(library.pdf_chapter_content("nonexistent.pdf", "Chapter 1").map(drop));
    }

    #[test]
    fn test_failed_open_skips_chapter_extraction() {
        let (library, epub_calls, _) = fake_library();

        let err = library
            .epub_chapter_markdown("nonexistent.epub", "chapter1")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingFile);
        assert_eq!(calls(&epub_calls), ["read_book nonexistent.epub"]);
    }

    #[test]
    fn test_page_numbers_reach_the_helper_unvalidated() {
        let (library, _, pdf_calls) = fake_library();

        assert_eq!(library.pdf_page_text("book.pdf", 2).unwrap(), "Text of page 2");
        assert_eq!(library.pdf_page_markdown("book.pdf", 3).unwrap(), "## Page 3\n");
        let err = library.pdf_page_text("book.pdf", -1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupError);
        let err = library.pdf_page_markdown("book.pdf", 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupError);

        assert_eq!(
            calls(&pdf_calls),
            [
                "page_text book.pdf 2",
                "page_markdown book.pdf 3",
                "page_text book.pdf -1",
                "page_markdown book.pdf 4",
            ]
        );
    }

    #[test]
    fn test_lookup_errors_pass_through() {
        let (library, _, _) = fake_library();

        let err = library.epub_chapter_markdown("book.epub", "chapter9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupError);
        assert_eq!(err.to_string(), "Chapter not found: chapter9");
        let err = library.pdf_chapter_content("book.pdf", "Epilogue").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupError);
    }

    #[test]
    fn test_paths_are_forwarded_verbatim() {
        let (library, _, pdf_calls) = fake_library();
        let path = PathBuf::from("dir with spaces").join("My Book.pdf");

        let _ = library.pdf_toc(path.to_str().unwrap());
        assert_eq!(
            calls(&pdf_calls),
            [format!("toc {}", path.display())]
        );
    }
}
