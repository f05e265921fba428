use crate::error::{ensure_exists, BookError, Result};
use crate::markdown;
use crate::metadata::{insert_text, MetadataRecord, MetadataValue};
use crate::reader::{PdfChapter, PdfHelper, PdfTocEntry};
use indexmap::IndexMap;
use lopdf::{Destination, Dictionary, Document, Object, ObjectId, Outline};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Info dictionary keys and the metadata names they are reported under
const INFO_KEYS: [(&[u8], &str); 8] = [
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Keywords", "keywords"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"CreationDate", "creation_date"),
    (b"ModDate", "mod_date"),
];

/// PDF helper backed by lopdf; each call loads the document afresh
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfPdf;

/// One flattened outline entry. Top-level entries have level 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: usize,
    pub title: String,
    pub page: u32,
}

pub struct PdfData {
    path: PathBuf,
    doc: Document,
}

impl PdfData {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        let doc = Document::load(path).map_err(|e| BookError::parse(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    pub fn metadata(&self) -> MetadataRecord {
        let mut record = MetadataRecord::new();

        if let Some(info) = self.info() {
            for (key, name) in INFO_KEYS {
                let value = info
                    .get(key)
                    .ok()
                    .and_then(|obj| self.doc.dereference(obj).ok())
                    .and_then(|(_, obj)| lopdf::decode_text_string(obj).ok());
                insert_text(&mut record, name, value.as_deref());
            }
        }

        record.insert(
            "pages".to_string(),
            MetadataValue::Number(u64::from(self.page_count())),
        );
        record.insert(
            "format".to_string(),
            MetadataValue::Text(format!("PDF {}", self.doc.version)),
        );
        record
    }

    fn info(&self) -> Option<&Dictionary> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let (_, info) = self.doc.dereference(info).ok()?;
        info.as_dict().ok()
    }

    /// Flattened document outline in reading order
    pub fn outline(&self) -> Result<Vec<OutlineEntry>> {
        let catalog = self
            .doc
            .catalog()
            .map_err(|e| BookError::parse(&self.path, e))?;
        if !catalog.has(b"Outlines") {
            return Ok(Vec::new());
        }

        let mut named_destinations = IndexMap::new();
        let outlines = self
            .doc
            .get_outlines(None, None, &mut named_destinations)
            .map_err(|e| BookError::parse(&self.path, e))?
            .unwrap_or_default();

        let page_numbers: HashMap<ObjectId, u32> = self
            .doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number))
            .collect();

        let mut entries = Vec::new();
        self.flatten_outline(&outlines, 1, &page_numbers, &mut entries);
        Ok(entries)
    }

    /// Depth-first walk keeping every entry in document order, repeated
    /// titles included
    fn flatten_outline(
        &self,
        outlines: &[Outline],
        level: usize,
        page_numbers: &HashMap<ObjectId, u32>,
        entries: &mut Vec<OutlineEntry>,
    ) {
        for outline in outlines {
            match outline {
                Outline::Destination(dest) => {
                    match self.destination_entry(dest, level, page_numbers) {
                        Some(entry) => entries.push(entry),
                        None => tracing::debug!(
                            path = %self.path.display(),
                            "Skipped outline entry without a local page"
                        ),
                    }
                }
                Outline::SubOutlines(children) => {
                    self.flatten_outline(children, level + 1, page_numbers, entries)
                }
            }
        }
    }

    fn destination_entry(
        &self,
        dest: &Destination,
        level: usize,
        page_numbers: &HashMap<ObjectId, u32>,
    ) -> Option<OutlineEntry> {
        let title = dest.title().ok()?;
        let (_, title) = self.doc.dereference(title).ok()?;
        let title = lopdf::decode_text_string(title).ok()?;

        let page = match dest.page().ok()? {
            Object::Reference(id) => *page_numbers.get(id)?,
            // Some writers store a 0-based page index instead of a reference
            Object::Integer(index) => u32::try_from(*index)
                .ok()
                .map(|i| i + 1)
                .filter(|p| *p as usize <= page_numbers.len())?,
            _ => return None,
        };

        Some(OutlineEntry { level, title, page })
    }

    /// Validate a 1-based page number against the page count
    fn resolve_page(&self, page: i64) -> Result<u32> {
        let count = self.page_count();
        u32::try_from(page)
            .ok()
            .filter(|p| (1..=count).contains(p))
            .ok_or_else(|| {
                BookError::Lookup(format!(
                    "Page {} out of range (document has {} pages)",
                    page, count
                ))
            })
    }

    fn text_of(&self, page: u32) -> Result<String> {
        self.doc
            .extract_text(&[page])
            .map_err(|e| BookError::parse(&self.path, e))
    }

    pub fn page_text(&self, page: i64) -> Result<String> {
        let page = self.resolve_page(page)?;
        self.text_of(page)
    }

    pub fn chapter_content(&self, title: &str) -> Result<PdfChapter> {
        let outline = self.outline()?;
        let wanted = title.trim().to_lowercase();
        let index = outline
            .iter()
            .position(|entry| entry.title == title)
            .or_else(|| {
                outline
                    .iter()
                    .position(|entry| entry.title.trim().to_lowercase() == wanted)
            })
            .ok_or_else(|| BookError::Lookup(format!("Chapter not found: {}", title)))?;

        let pages = chapter_pages(&outline, index, self.page_count());
        let mut texts = Vec::with_capacity(pages.len());
        for &page in &pages {
            texts.push(self.text_of(page)?.trim_end().to_string());
        }

        Ok((texts.join("\n\n"), pages))
    }
}

/// Pages covered by `outline[index]`: from its own page up to the page before
/// the next entry at the same or a shallower level, or the last page.
fn chapter_pages(outline: &[OutlineEntry], index: usize, page_count: u32) -> Vec<u32> {
    let chapter = &outline[index];
    let end = outline[index + 1..]
        .iter()
        .find(|entry| entry.level <= chapter.level)
        .map(|next| next.page.saturating_sub(1))
        .unwrap_or(page_count)
        .max(chapter.page);

    (chapter.page..=end).collect()
}

impl PdfHelper for LopdfPdf {
    fn metadata(&self, path: &Path) -> Result<MetadataRecord> {
        Ok(PdfData::open(path)?.metadata())
    }

    fn toc(&self, path: &Path) -> Result<Vec<PdfTocEntry>> {
        let outline = PdfData::open(path)?.outline()?;
        Ok(outline
            .into_iter()
            .map(|entry| (entry.title, entry.page))
            .collect())
    }

    fn page_text(&self, path: &Path, page: i64) -> Result<String> {
        PdfData::open(path)?.page_text(page)
    }

    fn page_markdown(&self, path: &Path, page: i64) -> Result<String> {
        let text = PdfData::open(path)?.page_text(page)?;
        Ok(markdown::text_to_markdown(&text))
    }

    fn chapter_content(&self, path: &Path, title: &str) -> Result<PdfChapter> {
        PdfData::open(path)?.chapter_content(title)
    }
}
