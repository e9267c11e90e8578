//! PDF Document wrapper

use crate::font::Typeface;
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PdfError::InvalidColor(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| PdfError::InvalidColor(hex.to_string()))
        };
        Ok(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Black color
    pub const fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Neutral gray at the given level
    pub const fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Native page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

/// PDF Document wrapper for stamping an existing template
///
/// Drawing calls only buffer operators; the template's objects are left
/// untouched until `to_bytes`, which wraps the original page content in
/// `q … Q` and appends the overlay after it.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Typeface used for every text run
    typeface: Option<Arc<Typeface>>,
    /// Characters drawn (for the `/W` array and ToUnicode CMap)
    used_chars: BTreeSet<char>,
    /// Font resource name per page
    page_font_resources: BTreeMap<usize, String>,
    /// Image resources per page (resource name, object id)
    page_image_resources: BTreeMap<usize, Vec<(String, ObjectId)>>,
    /// Buffered content operators per page
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        Ok(Self {
            inner,
            typeface: None,
            used_chars: BTreeSet::new(),
            page_font_resources: BTreeMap::new(),
            page_image_resources: BTreeMap::new(),
            page_content_buffer: BTreeMap::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Set the typeface for all subsequent text
    pub fn set_typeface(&mut self, typeface: Arc<Typeface>) {
        self.typeface = Some(typeface);
    }

    /// The typeface text is measured and drawn with
    pub fn typeface(&self) -> Option<&Arc<Typeface>> {
        self.typeface.as_ref()
    }

    /// Get native page size
    ///
    /// Reads the MediaBox, following the parent chain for an inherited box.
    /// A CropBox is used only when no MediaBox exists anywhere on the chain,
    /// and A4 when neither does.
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        if let Some(media_box) = self.inherited_box(page_id, b"MediaBox")? {
            return media_box_size(&media_box);
        }
        match self.inherited_box(page_id, b"CropBox")? {
            Some(crop_box) => media_box_size(&crop_box),
            None => Ok(PageSize::A4),
        }
    }

    /// Insert text at a native position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from bottom)
    /// * `font_size` - Font size in points
    /// * `color` - Fill color
    /// * `align` - Alignment relative to `x`
    #[allow(clippy::too_many_arguments)]
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font_size: f32,
        color: Color,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let typeface = self.typeface.clone().ok_or(PdfError::NoTypeface)?;
        let text_hex = typeface.encode_text_hex(text)?;
        let text_width = typeface.text_width_points(text, font_size)?;
        let font_name = self.font_resource_name(page)?;
        self.used_chars.extend(text.chars());

        let ctx = TextRenderContext {
            font_name,
            font_size,
            text_width,
            color,
        };
        let operators = generate_text_operators(&text_hex, x, y, align, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert an image with its lower-left corner at a native position
    ///
    /// # Arguments
    /// * `image` - Image XObject to embed
    /// * `page` - Page number (1-indexed)
    /// * `x` - Lower-left X coordinate in points
    /// * `y` - Lower-left Y coordinate in points (from bottom)
    /// * `width` - Drawn width in points
    /// * `height` - Drawn height in points
    pub fn insert_image(
        &mut self,
        image: &ImageXObject,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.check_page(page)?;

        let resource_name = self.image_resource_name(page)?;
        let object_id = self.inner.add_object(image.to_pdf_stream());
        self.page_image_resources
            .entry(page)
            .or_default()
            .push((resource_name.clone(), object_id));

        let operators = generate_image_operators(&resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Serialize the stamped document
    ///
    /// 1. Embed the typeface once, if any text was drawn
    /// 2. Register font and image resources on each touched page
    /// 3. Wrap the page's original content and append the overlay
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        let font_id = match (&self.typeface, self.page_font_resources.is_empty()) {
            (Some(typeface), false) => Some(typeface.embed(&mut self.inner, &self.used_chars)),
            _ => None,
        };

        let pages: BTreeSet<usize> = self
            .page_font_resources
            .keys()
            .chain(self.page_image_resources.keys())
            .chain(self.page_content_buffer.keys())
            .copied()
            .collect();

        for page in pages {
            self.install_resources(page, font_id)?;
        }

        let buffers = std::mem::take(&mut self.page_content_buffer);
        for (page, content) in buffers {
            self.append_overlay(page, &content)?;
        }

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary> {
        self.inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Follow one level of indirection
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Get a page box, following parent inheritance chain if needed
    fn inherited_box(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Vec<Object>>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(page_box) = dict.get(key) {
                let array = self.resolve(page_box)?.as_array().map_err(|_| {
                    PdfError::ParseError(format!(
                        "{} is not an array",
                        String::from_utf8_lossy(key)
                    ))
                })?;
                return Ok(Some(array.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Resources dictionary in effect for a page, copied out
    ///
    /// Resolves indirect references and inheritance from the page tree.
    fn inherited_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(self
                    .resolve(resources)?
                    .as_dict()
                    .map(|d| d.clone())
                    .unwrap_or_default());
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// A category of the resources dictionary (e.g. `Font`), copied out
    fn resource_category(&self, resources: &Dictionary, key: &[u8]) -> Result<Dictionary> {
        match resources.get(key) {
            Ok(obj) => Ok(self
                .resolve(obj)?
                .as_dict()
                .map(|d| d.clone())
                .unwrap_or_default()),
            Err(_) => Ok(Dictionary::new()),
        }
    }

    /// Resource names already used by the template in a category
    fn existing_names(&self, page: usize, key: &[u8]) -> Result<BTreeSet<Vec<u8>>> {
        let resources = self.inherited_resources(self.page_id(page)?)?;
        let category = self.resource_category(&resources, key)?;
        Ok(category.iter().map(|(name, _)| name.clone()).collect())
    }

    /// Get or allocate the font resource name for a page
    fn font_resource_name(&mut self, page: usize) -> Result<String> {
        if let Some(name) = self.page_font_resources.get(&page) {
            return Ok(name.clone());
        }

        let taken = self.existing_names(page, b"Font")?;
        let name = first_free_name("F", &taken);
        self.page_font_resources.insert(page, name.clone());
        Ok(name)
    }

    /// Allocate a fresh image resource name for a page
    fn image_resource_name(&self, page: usize) -> Result<String> {
        let mut taken = self.existing_names(page, b"XObject")?;
        if let Some(images) = self.page_image_resources.get(&page) {
            taken.extend(images.iter().map(|(name, _)| name.as_bytes().to_vec()));
        }
        Ok(first_free_name("Im", &taken))
    }

    /// Write the page's Resources with the overlay's font and images added
    fn install_resources(&mut self, page: usize, font_id: Option<ObjectId>) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.inherited_resources(page_id)?;

        if let (Some(name), Some(font_id)) = (self.page_font_resources.get(&page), font_id) {
            let mut fonts = self.resource_category(&resources, b"Font")?;
            fonts.set(name.as_bytes().to_vec(), Object::Reference(font_id));
            resources.set("Font", Object::Dictionary(fonts));
        }

        if let Some(images) = self.page_image_resources.get(&page) {
            let mut xobjects = self.resource_category(&resources, b"XObject")?;
            for (name, object_id) in images {
                xobjects.set(name.as_bytes().to_vec(), Object::Reference(*object_id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));

        Ok(())
    }

    /// Replace Contents with `[q, original..., Q + overlay]`
    fn append_overlay(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        // Collect the existing parts before adding objects
        let mut original = Vec::new();
        let mut direct_stream = None;
        match self.page_dict(page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.inner.get_object(*id)? {
                Object::Array(parts) => original.extend(parts.iter().cloned()),
                _ => original.push(Object::Reference(*id)),
            },
            Ok(Object::Array(parts)) => original.extend(parts.iter().cloned()),
            Ok(Object::Stream(stream)) => direct_stream = Some(stream.clone()),
            _ => {}
        }
        if let Some(stream) = direct_stream {
            original.push(Object::Reference(self.inner.add_object(stream)));
        }

        let open_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

        let mut overlay = b"Q\n".to_vec();
        overlay.extend_from_slice(content);
        let overlay_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), overlay));

        let mut contents = Vec::with_capacity(original.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(original);
        contents.push(Object::Reference(overlay_id));

        self.page_dict_mut(page_id)?
            .set("Contents", Object::Array(contents));

        Ok(())
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }
}

/// First `{prefix}{n}` (n = 1, 2, ...) not present in `taken`
fn first_free_name(prefix: &str, taken: &BTreeSet<Vec<u8>>) -> String {
    (1u32..)
        .map(|n| format!("{prefix}{n}"))
        .find(|name| !taken.contains(name.as_bytes()))
        .unwrap_or_else(|| format!("{prefix}0"))
}

/// Width and height from a `[x1 y1 x2 y2]` box
fn media_box_size(media_box: &[Object]) -> Result<PageSize> {
    if media_box.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }

    let number = |i: usize| {
        media_box[i]
            .as_f32()
            .map(|v| v as f64)
            .ok()
            .or_else(|| media_box[i].as_i64().ok().map(|v| v as f64))
            .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {i}")))
    };

    let (x1, y1, x2, y2) = (number(0)?, number(1)?, number(2)?, number(3)?);
    Ok(PageSize {
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    })
}
