use crate::error::{ensure_exists, BookError, Result};
use crate::markdown;
use crate::metadata::{insert_list, insert_text, MetadataRecord};
use crate::reader::{EpubBook, EpubHelper, EpubTocEntry};
use rbook::prelude::*;
use rbook::Epub;
use std::path::{Path, PathBuf};

/// EPUB helper backed by rbook; each call opens the book afresh
#[derive(Debug, Default, Clone, Copy)]
pub struct RbookEpub;

pub struct EpubData {
    path: PathBuf,
    epub: Epub,
}

impl EpubData {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        let epub = Epub::options()
            .strict(false)
            .open(path)
            .map_err(|e| BookError::parse(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            epub,
        })
    }

    pub fn metadata(&self) -> MetadataRecord {
        let metadata = self.epub.metadata();
        let mut record = MetadataRecord::new();

        insert_text(&mut record, "title", metadata.title().map(|t| t.value()));
        insert_list(&mut record, "creator", metadata.creators().map(|c| c.value()));
        insert_list(
            &mut record,
            "contributor",
            metadata.contributors().map(|c| c.value()),
        );
        insert_text(
            &mut record,
            "language",
            metadata.language().map(|l| l.value()),
        );
        insert_text(
            &mut record,
            "identifier",
            metadata.identifier().map(|i| i.value()),
        );
        insert_text(
            &mut record,
            "publisher",
            metadata.publishers().next().map(|p| p.value()),
        );
        insert_text(
            &mut record,
            "date",
            metadata.publication_date().map(|d| d.as_str()),
        );
        insert_text(
            &mut record,
            "description",
            metadata.description().map(|d| d.value()),
        );
        insert_list(&mut record, "subject", metadata.tags().map(|t| t.value()));
        insert_text(&mut record, "version", Some(metadata.version_str()));

        record
    }

    /// Flattened primary table of contents in reading order
    pub fn toc(&self) -> Vec<EpubTocEntry> {
        let toc = self.epub.toc();
        let Some(root) = toc.contents() else {
            return Vec::new();
        };

        root.children()
            .flatten()
            .filter_map(|entry| {
                let href = entry.href()?;
                Some((entry.label().to_string(), href.as_str().to_string()))
            })
            .collect()
    }
}

impl EpubBook for EpubData {
    fn chapter_markdown(&self, chapter_id: &str) -> Result<String> {
        let manifest = self.epub.manifest();

        // Ids first, then hrefs as they appear in the table of contents
        let entry = manifest
            .by_id(chapter_id)
            .or_else(|| manifest.by_href(chapter_id))
            .or_else(|| {
                let wanted = chapter_path(chapter_id);
                if wanted.is_empty() {
                    return None;
                }
                manifest
                    .entries()
                    .find(|entry| href_matches(entry.href().path().as_str(), wanted))
            })
            .ok_or_else(|| BookError::Lookup(format!("Chapter not found: {}", chapter_id)))?;

        let html = entry
            .read_str()
            .map_err(|e| BookError::parse(&self.path, e))?;

        Ok(markdown::html_to_markdown(&html))
    }
}

impl EpubHelper for RbookEpub {
    fn metadata(&self, path: &Path) -> Result<MetadataRecord> {
        Ok(EpubData::open(path)?.metadata())
    }

    fn toc(&self, path: &Path) -> Result<Vec<EpubTocEntry>> {
        Ok(EpubData::open(path)?.toc())
    }

    fn read_book(&self, path: &Path) -> Result<Box<dyn EpubBook>> {
        Ok(Box::new(EpubData::open(path)?))
    }
}

/// Strip the fragment and any leading slash from a chapter reference
fn chapter_path(chapter_id: &str) -> &str {
    let path = chapter_id.split('#').next().unwrap_or_default();
    path.trim_start_matches('/')
}

fn href_matches(href: &str, wanted: &str) -> bool {
    let href = href.trim_start_matches('/');
    href == wanted
        || href
            .strip_suffix(wanted)
            .is_some_and(|prefix| prefix.ends_with('/'))
}
