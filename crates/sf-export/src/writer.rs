//! Output document assembly on top of `lopdf`.
//!
//! The writer either starts from the caller's base PDF (whose pages are
//! adopted 1:1 by template page index) or from an empty document. Either
//! way it builds a fresh page tree holding exactly the template's pages,
//! points a fresh catalog at it, and prunes whatever the old tree kept
//! alive.

use crate::data_url::DecodedImage;
use crate::draw::{CHECK_FONT, PageCanvas, TEXT_FONT};
use crate::error::ExportError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use sf_core::PageFormat;
use sf_core::geometry::canonical_size_of;
use std::collections::BTreeMap;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

pub struct PdfWriter {
    doc: Document,
    /// Pages of the base document, 1-based.
    base_pages: BTreeMap<u32, ObjectId>,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    text_font: Option<ObjectId>,
    check_font: Option<ObjectId>,
    image_count: usize,
}

impl PdfWriter {
    /// Start from an empty document.
    pub fn new(version: &str) -> Self {
        Self::from_document(Document::with_version(version))
    }

    /// Start from the caller's background PDF.
    pub fn with_base(bytes: &[u8]) -> Result<Self, ExportError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ExportError::SourceDocument(format!("cannot read base PDF: {e}")))?;
        Ok(Self::from_document(doc))
    }

    fn from_document(mut doc: Document) -> Self {
        let base_pages = doc.get_pages();
        let pages_id = doc.new_object_id();
        Self {
            doc,
            base_pages,
            pages_id,
            kids: Vec::new(),
            text_font: None,
            check_font: None,
            image_count: 0,
        }
    }

    pub fn base_page_count(&self) -> usize {
        self.base_pages.len()
    }

    /// Append a blank page the size of `format`.
    pub fn blank_page(&mut self, format: PageFormat) -> ObjectId {
        let (w, h) = canonical_size_of(format);
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(w as f32), Object::Real(h as f32)],
            "Resources" => Dictionary::new(),
        };
        let id = self.doc.add_object(page);
        self.kids.push(id);
        id
    }

    /// Append page `number` (1-based) of the base document.
    pub fn adopt_base_page(&mut self, number: u32) -> Result<ObjectId, ExportError> {
        let id = *self.base_pages.get(&number).ok_or_else(|| {
            ExportError::SourceDocument(format!(
                "base PDF has {} pages, page {number} is missing",
                self.base_pages.len()
            ))
        })?;
        self.inherit_attributes(id)?;

        // Existing content may leave the graphics state modified; wrap it.
        let contents = self.page_dict(id)?.get(b"Contents").ok().cloned();
        if let Some(contents) = contents {
            let save = self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let restore = self.doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            let mut wrapped = vec![Object::Reference(save)];
            match contents {
                Object::Array(parts) => wrapped.extend(parts),
                other => wrapped.push(other),
            }
            wrapped.push(Object::Reference(restore));
            self.page_dict_mut(id)?.set("Contents", wrapped);
        }

        let pages_id = self.pages_id;
        self.page_dict_mut(id)?.set("Parent", pages_id);
        self.kids.push(id);
        Ok(id)
    }

    /// Copy inherited attributes onto the page itself so it survives being
    /// re-parented.
    fn inherit_attributes(&mut self, page_id: ObjectId) -> Result<(), ExportError> {
        let mut found: Vec<(&[u8], Object)> = Vec::new();
        {
            let page = self.page_dict(page_id)?;
            let mut missing: Vec<&[u8]> = INHERITABLE
                .into_iter()
                .filter(|k| !page.has(k))
                .collect();
            let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
            let mut depth = 0;
            while let Some(id) = parent
                && !missing.is_empty()
                && depth < MAX_TREE_DEPTH
            {
                let Ok(node) = self.doc.get_object(id).and_then(Object::as_dict) else {
                    break;
                };
                missing.retain(|key| match node.get(key) {
                    Ok(value) => {
                        found.push((*key, value.clone()));
                        false
                    }
                    Err(_) => true,
                });
                parent = node.get(b"Parent").and_then(Object::as_reference).ok();
                depth += 1;
            }
        }
        let page = self.page_dict_mut(page_id)?;
        for (key, value) in found {
            page.set(key, value);
        }
        Ok(())
    }

    /// Draw `canvas` on top of `page_id`, wiring up the fonts and `images`
    /// it refers to.
    pub fn finish_page(
        &mut self,
        page_id: ObjectId,
        canvas: PageCanvas,
        images: &[(String, ObjectId)],
    ) -> Result<(), ExportError> {
        if canvas.is_empty() {
            return Ok(());
        }

        let mut fonts = Vec::new();
        if canvas.uses_text_font {
            fonts.push((TEXT_FONT, self.text_font()));
        }
        if canvas.uses_check_font {
            fonts.push((CHECK_FONT, self.check_font()));
        }

        let mut resources = self.page_resources(page_id)?;
        let mut font_dict = self.sub_dictionary(&resources, b"Font");
        for (name, id) in fonts {
            font_dict.set(name, id);
        }
        resources.set("Font", font_dict);
        if !images.is_empty() {
            let mut xobjects = self.sub_dictionary(&resources, b"XObject");
            for (name, id) in images {
                xobjects.set(name.as_str(), *id);
            }
            resources.set("XObject", xobjects);
        }

        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), canvas.encode()?));
        let page = self.page_dict_mut(page_id)?;
        page.set("Resources", resources);
        let contents = match page.remove(b"Contents") {
            Some(Object::Array(mut parts)) => {
                parts.push(Object::Reference(content_id));
                Object::Array(parts)
            }
            Some(existing) => Object::Array(vec![existing, Object::Reference(content_id)]),
            None => Object::Reference(content_id),
        };
        page.set("Contents", contents);
        Ok(())
    }

    /// Embed a raster as an image XObject (alpha as an SMask). Returns the
    /// resource name and object id.
    pub fn add_image(&mut self, image: &DecodedImage) -> (String, ObjectId) {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if let Some(alpha) = &image.alpha {
            let mut smask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha.clone(),
            );
            compress(&mut smask);
            dict.set("SMask", self.doc.add_object(smask));
        }
        let mut stream = Stream::new(dict, image.rgb.clone());
        compress(&mut stream);
        let id = self.doc.add_object(stream);
        let name = format!("SfIm{}", self.image_count);
        self.image_count += 1;
        (name, id)
    }

    /// Write the page tree and catalog, drop unreachable objects and
    /// serialize.
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        let dropped = self.doc.prune_objects();
        log::debug!(
            "pdf: {} pages written, {} unreachable objects dropped",
            count,
            dropped.len()
        );

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn text_font(&mut self) -> ObjectId {
        if let Some(id) = self.text_font {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.text_font = Some(id);
        id
    }

    fn check_font(&mut self) -> ObjectId {
        if let Some(id) = self.check_font {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "ZapfDingbats",
        });
        self.check_font = Some(id);
        id
    }

    fn page_dict(&self, id: ObjectId) -> Result<&Dictionary, ExportError> {
        Ok(self.doc.get_object(id).and_then(Object::as_dict)?)
    }

    fn page_dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary, ExportError> {
        Ok(self.doc.get_object_mut(id).and_then(Object::as_dict_mut)?)
    }

    /// The page's resources as an owned dictionary, resolving a reference.
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary, ExportError> {
        let page = self.page_dict(page_id)?;
        Ok(self.resolve_dictionary(page.get(b"Resources").ok()))
    }

    fn sub_dictionary(&self, parent: &Dictionary, key: &[u8]) -> Dictionary {
        self.resolve_dictionary(parent.get(key).ok())
    }

    fn resolve_dictionary(&self, obj: Option<&Object>) -> Dictionary {
        match obj {
            Some(Object::Dictionary(dict)) => dict.clone(),
            Some(Object::Reference(id)) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        }
    }
}

/// Flate-encode a raw sample stream. A stream that fails to compress is
/// kept as is.
fn compress(stream: &mut Stream) {
    if let Err(e) = stream.compress() {
        log::debug!("pdf: image stream left uncompressed: {e}");
    }
}
