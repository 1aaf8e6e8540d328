//! PDF operation service
//!
//! The workflow only needs "write pages P in order O to a new document" style
//! primitives, expressed by [`PdfOperations`]. [`LopdfBackend`] implements
//! them with `lopdf` (and `image` for photo merges).

mod images;
mod lopdf_backend;

pub use lopdf_backend::LopdfBackend;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF error: {0}")]
    Lopdf(#[from] lopdf::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write PDF: {0}")]
    Write(String),

    #[error("No input documents")]
    NoInput,

    #[error("Invalid page range {start}-{end} for a document with {pages} pages")]
    InvalidRange { start: u32, end: u32, pages: usize },

    #[error("Invalid page order: {0}")]
    InvalidPageOrder(String),

    #[error("Passphrase must not be empty")]
    EmptyPassphrase,
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Inclusive, 1-based page range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 || start > end {
            return Err(PdfError::InvalidRange {
                start,
                end,
                pages: 0,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// 1-based page numbers covered by the range
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Document info fields; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub author: Option<String>,
    pub title: Option<String>,
}

/// PDF manipulation primitives consumed by the workflow
pub trait PdfOperations: Send + Sync {
    /// Concatenate all pages of `documents`, in order
    fn combine(&self, documents: &[Vec<u8>]) -> Result<Vec<u8>>;

    fn extract(&self, document: &[u8], range: PageRange) -> Result<Vec<u8>>;

    /// Keep only the pages at the given 0-based indices, in that order
    fn reorder(&self, document: &[u8], order: &[u32]) -> Result<Vec<u8>>;

    fn set_metadata(&self, document: &[u8], metadata: &DocumentMetadata) -> Result<Vec<u8>>;

    /// One page per image, each sized to the image
    fn images_to_pdf(&self, images: &[Vec<u8>]) -> Result<Vec<u8>>;

    /// Protect `document` so it opens only with `passphrase`
    fn encrypt(&self, document: &[u8], passphrase: &str) -> Result<Vec<u8>>;
}
