use std::collections::HashSet;

use lopdf::{
    dictionary, Dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId,
    Permissions, StringFormat,
};
use tracing::debug;
use uuid::Uuid;

use super::images;
use super::{DocumentMetadata, PageRange, PdfError, PdfOperations, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against malformed (cyclic) page trees
const MAX_TREE_DEPTH: usize = 64;

/// RC4 key length in bits for the standard security handler
const KEY_LENGTH: usize = 128;

/// `lopdf`-backed implementation of [`PdfOperations`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfOperations for LopdfBackend {
    fn combine(&self, documents: &[Vec<u8>]) -> Result<Vec<u8>> {
        if documents.is_empty() {
            return Err(PdfError::NoInput);
        }

        let mut merged = Document::with_version("1.5");
        let mut page_ids: Vec<ObjectId> = Vec::new();

        for bytes in documents {
            let mut doc = Document::load_mem(bytes)?;
            doc.renumber_objects_with(merged.max_id + 1);

            let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for page_id in &pages {
                flatten_inherited(&mut doc, *page_id)?;
            }
            page_ids.extend(&pages);

            let last_id = doc.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
            merged.max_id = merged.max_id.max(last_id);
            for (id, object) in doc.objects {
                if !is_page_tree_node(&object) {
                    merged.objects.insert(id, object);
                }
            }
        }

        let pages_id = merged.new_object_id();
        for page_id in &page_ids {
            page_dict_mut(&mut merged, *page_id)?.set("Parent", pages_id);
        }
        merged.objects.insert(
            pages_id,
            Object::Dictionary(pages_node(&page_ids)),
        );
        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);
        merged.prune_objects();

        debug!(
            documents = documents.len(),
            pages = page_ids.len(),
            "Combined documents"
        );
        save(merged)
    }

    fn extract(&self, document: &[u8], range: PageRange) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(document)?;
        let pages = doc.get_pages().len();
        if range.end() as usize > pages {
            return Err(PdfError::InvalidRange {
                start: range.start(),
                end: range.end(),
                pages,
            });
        }

        let numbers: Vec<u32> = range.pages().collect();
        select_pages(&mut doc, &numbers)?;
        save(doc)
    }

    fn reorder(&self, document: &[u8], order: &[u32]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(document)?;
        let pages = doc.get_pages().len();

        if order.is_empty() {
            return Err(PdfError::InvalidPageOrder(
                "at least one page must be kept".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for &index in order {
            if index as usize >= pages {
                return Err(PdfError::InvalidPageOrder(format!(
                    "page index {index} out of bounds for {pages} pages"
                )));
            }
            if !seen.insert(index) {
                return Err(PdfError::InvalidPageOrder(format!(
                    "page index {index} listed more than once"
                )));
            }
        }

        let numbers: Vec<u32> = order.iter().map(|index| index + 1).collect();
        select_pages(&mut doc, &numbers)?;
        save(doc)
    }

    fn set_metadata(&self, document: &[u8], metadata: &DocumentMetadata) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(document)?;

        let info_id = match doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => *id,
            Ok(Object::Dictionary(inline)) => {
                let inline = inline.clone();
                let id = doc.add_object(inline);
                doc.trailer.set("Info", id);
                id
            }
            _ => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", id);
                id
            }
        };

        let info = doc.get_object_mut(info_id)?.as_dict_mut()?;
        if let Some(author) = &metadata.author {
            info.set("Author", text_string(author));
        }
        if let Some(title) = &metadata.title {
            info.set("Title", text_string(title));
        }

        save(doc)
    }

    fn images_to_pdf(&self, images: &[Vec<u8>]) -> Result<Vec<u8>> {
        save(images::build_document(images)?)
    }

    fn encrypt(&self, document: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(document)?;
        // Streams must be compressed before encryption, never after.
        doc.compress();
        encrypt_document(&mut doc, passphrase)?;
        write(doc)
    }
}

/// Encrypt in place with `passphrase` as both user and owner password
fn encrypt_document(doc: &mut Document, passphrase: &str) -> Result<()> {
    if passphrase.is_empty() {
        return Err(PdfError::EmptyPassphrase);
    }

    // The file key is derived from the first file identifier.
    if doc.trailer.get(b"ID").is_err() {
        let id = Uuid::new_v4().as_bytes().to_vec();
        doc.trailer.set(
            "ID",
            vec![
                Object::String(id.clone(), StringFormat::Hexadecimal),
                Object::String(id, StringFormat::Hexadecimal),
            ],
        );
    }

    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &*doc,
        owner_password: passphrase,
        user_password: passphrase,
        key_length: KEY_LENGTH,
        permissions: Permissions::all(),
    })?;
    doc.encrypt(&state)?;

    debug!(pages = doc.get_pages().len(), "Encrypted document");
    Ok(())
}

/// Rebuild the page tree so it holds exactly `numbers` (1-based), in order
fn select_pages(doc: &mut Document, numbers: &[u32]) -> Result<()> {
    let pages = doc.get_pages();
    let mut kids = Vec::with_capacity(numbers.len());
    for number in numbers {
        let page_id = pages.get(number).ok_or_else(|| {
            PdfError::InvalidPageOrder(format!("page {number} does not exist"))
        })?;
        kids.push(*page_id);
    }

    for page_id in &kids {
        flatten_inherited(doc, *page_id)?;
    }

    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;

    for page_id in &kids {
        page_dict_mut(doc, *page_id)?.set("Parent", pages_id);
    }
    let replacement = pages_node(&kids);
    let root_pages = page_dict_mut(doc, pages_id)?;
    for (key, value) in replacement.iter() {
        root_pages.set(key.clone(), value.clone());
    }

    doc.prune_objects();
    Ok(())
}

/// Copy inherited attributes onto the page itself so it survives reparenting
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent {
            if depth >= MAX_TREE_DEPTH {
                break;
            }
            let node = doc.get_dictionary(parent_id)?;
            for key in INHERITABLE {
                if page.has(key) || inherited.iter().any(|(k, _)| *k == key) {
                    continue;
                }
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if !inherited.is_empty() {
        let page = page_dict_mut(doc, page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
    Ok(())
}

fn pages_node(kids: &[ObjectId]) -> Dictionary {
    dictionary! {
        "Type" => "Pages",
        "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => kids.len() as i64,
    }
}

fn page_dict_mut(doc: &mut Document, id: ObjectId) -> Result<&mut Dictionary> {
    Ok(doc.get_object_mut(id)?.as_dict_mut()?)
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"Catalog" || name == b"Pages"
        ),
        _ => false,
    }
}

/// PDF text string: literal when ASCII, UTF-16BE with BOM otherwise
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn save(mut doc: Document) -> Result<Vec<u8>> {
    doc.compress();
    write(doc)
}

fn write(mut doc: Document) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(out)
}
