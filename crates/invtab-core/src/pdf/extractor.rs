//! PDF loading, page text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor and load `data` into it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document()?
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Owner-password-only PDFs open with the empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_texts(&self) -> Result<Vec<String>> {
        self.document()?;
        pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = self.page_id(page)?;

        let mut images = Vec::new();
        if let Some(xobjects) = page_resources(doc, page_id)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|o| resolve(doc, o).as_dict().ok())
        {
            for (_name, obj) in xobjects.iter() {
                if let Object::Stream(stream) = resolve(doc, obj) {
                    if let Some(img) = decode_image_xobject(doc, stream) {
                        images.push(img);
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Numeric value of an integer or real object.
fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match resolve(doc, obj) {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Bounded walk guards against cyclic Parent links.
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    inherited_attribute(doc, page_id, b"Resources").and_then(|o| resolve(doc, o).as_dict().ok())
}

/// Decode an image XObject: JPEG streams directly, 8-bit raw RGB and gray by hand.
fn decode_image_xobject(doc: &Document, stream: &lopdf::Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = number(doc, dict.get(b"Width").ok()?)? as u32;
    let height = number(doc, dict.get(b"Height").ok()?)? as u32;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match resolve(doc, f) {
        Object::Name(name) => Some(name.clone()),
        Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
        _ => None,
    });

    match filter.as_deref() {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter");
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| number(doc, o))
        .unwrap_or(8.0) as u8;
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match resolve(doc, o) {
            Object::Name(name) => Some(name.clone()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
            _ => None,
        })
        .unwrap_or_else(|| b"DeviceRGB".to_vec());

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let pixels = (width as usize) * (height as usize);

    match color_space.as_slice() {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: data_len={}, colorspace={}",
                data.len(),
                String::from_utf8_lossy(&color_space)
            );
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    fn ints(values: &[i64]) -> Vec<Object> {
        values.iter().map(|&v| Object::Integer(v)).collect()
    }

    /// Build a PDF with one page per operation list, Helvetica as /F1, US Letter.
    pub(crate) fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap_or_default(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "MediaBox" => ints(&[0, 0, 612, 792]),
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    /// One line of 12pt Helvetica text with its baseline at `(x, y)`.
    pub(crate) fn text_ops(x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", ints(&[x, y])),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    /// Stroked grid lines spanning the given column and row positions.
    pub(crate) fn ruled_grid(xs: &[i64], ys: &[i64]) -> Vec<Operation> {
        let (Some(&left), Some(&right)) = (xs.first(), xs.last()) else {
            return Vec::new();
        };
        let (Some(&low), Some(&high)) = (ys.iter().min(), ys.iter().max()) else {
            return Vec::new();
        };

        let mut ops = Vec::new();
        for &y in ys {
            ops.push(Operation::new("m", ints(&[left, y])));
            ops.push(Operation::new("l", ints(&[right, y])));
        }
        for &x in xs {
            ops.push(Operation::new("m", ints(&[x, low])));
            ops.push(Operation::new("l", ints(&[x, high])));
        }
        ops.push(Operation::new("S", vec![]));
        ops
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.page_texts().is_err());
    }

    #[test]
    fn test_load_garbage() {
        let err = PdfExtractor::from_bytes(b"not a pdf").err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_page_count() {
        let data = build_pdf(vec![text_ops(72, 700, "One"), text_ops(72, 700, "Two")]);
        let extractor = PdfExtractor::from_bytes(&data).unwrap();
        assert_eq!(extractor.page_count(), 2);
        assert!(matches!(extractor.extract_images(3), Err(PdfError::InvalidPage(3))));
    }

    #[test]
    fn test_no_images_on_text_page() {
        let data = build_pdf(vec![text_ops(72, 700, "Hello")]);
        let extractor = PdfExtractor::from_bytes(&data).unwrap();
        assert!(extractor.extract_images(1).unwrap().is_empty());
    }

    #[test]
    fn test_image_from_inherited_resources() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(2),
                "Height" => Object::Integer(1),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            },
            vec![0, 255],
        ));
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
                "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
                "MediaBox" => ints(&[0, 0, 612, 792]),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();

        let images = PdfExtractor::from_bytes(&data).unwrap().extract_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (2, 1));
    }
}
