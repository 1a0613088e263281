//! DOCX (WordprocessingML) package writer.
//!
//! The package is a zip container holding a handful of XML parts plus the
//! embedded media. Entries carry a fixed timestamp, so the same document
//! and options always produce the same bytes.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::options::RenderOptions;
use crate::error::Result;
use crate::model::{Alignment, Block, Document, Paragraph, Table, TextRun};

const EMU_PER_INCH: f32 = 914_400.0;
const TWIPS_PER_INCH: f32 = 1440.0;
const DEFAULT_ASPECT: f32 = 0.75;
const LIST_INDENT: u32 = 720;
const LIST_HANGING: u32 = 360;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Render a document to DOCX bytes.
pub fn to_docx(doc: &Document, options: &RenderOptions) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    write_docx_to_writer(doc, options, &mut buffer)?;
    Ok(buffer.into_inner())
}

/// Write a document as a `.docx` file.
///
/// The package is built in memory first, so a failure never leaves a
/// partially written file behind.
pub fn write_docx(doc: &Document, options: &RenderOptions, path: impl AsRef<Path>) -> Result<()> {
    let bytes = to_docx(doc, options)?;
    fs::write(path.as_ref(), bytes)?;
    log::info!("Wrote {}", path.as_ref().display());
    Ok(())
}

/// Write a document to any [`Write`] + [`Seek`] destination.
pub fn write_docx_to_writer<W: Write + Seek>(
    doc: &Document,
    options: &RenderOptions,
    writer: W,
) -> Result<()> {
    options.validate()?;

    let media = MediaTable::new(doc);
    let mut zip = ZipWriter::new(writer);
    let deflate = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let parts: [(&str, String); 8] = [
        ("[Content_Types].xml", content_types_xml(doc)),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("docProps/core.xml", core_xml(doc)),
        ("docProps/app.xml", APP_XML.to_string()),
        ("word/document.xml", DocumentXml::new(doc, options, &media).render()),
        ("word/styles.xml", styles_xml(options)),
        ("word/settings.xml", SETTINGS_XML.to_string()),
        ("word/_rels/document.xml.rels", document_rels_xml(&media)),
    ];
    for (name, xml) in parts {
        zip.start_file(name, deflate)?;
        zip.write_all(xml.as_bytes())?;
    }

    for entry in media.entries.values() {
        let Some(resource) = doc.get_resource(&entry.resource_id) else {
            continue;
        };
        zip.start_file(format!("word/media/{}", entry.file_name), deflate)?;
        zip.write_all(&resource.data)?;
    }

    zip.finish()?;
    log::debug!(
        "Packaged {} blocks and {} media parts",
        doc.blocks.len(),
        media.entries.len()
    );
    Ok(())
}

/// Relationship ids and part names of the embedded images.
struct MediaTable {
    entries: BTreeMap<String, MediaEntry>,
}

struct MediaEntry {
    resource_id: String,
    rel_id: String,
    file_name: String,
}

impl MediaTable {
    fn new(doc: &Document) -> Self {
        // rId1 and rId2 are styles and settings.
        let entries = doc
            .resources
            .iter()
            .enumerate()
            .map(|(i, (id, resource))| {
                let entry = MediaEntry {
                    resource_id: id.clone(),
                    rel_id: format!("rId{}", i + 3),
                    file_name: resource.media_name(id),
                };
                (id.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    fn get(&self, resource_id: &str) -> Option<&MediaEntry> {
        self.entries.get(resource_id)
    }
}

/// Builds `word/document.xml`.
struct DocumentXml<'a> {
    doc: &'a Document,
    options: &'a RenderOptions,
    media: &'a MediaTable,
    out: String,
    drawing_id: u32,
}

impl<'a> DocumentXml<'a> {
    fn new(doc: &'a Document, options: &'a RenderOptions, media: &'a MediaTable) -> Self {
        Self {
            doc,
            options,
            media,
            out: String::new(),
            drawing_id: 0,
        }
    }

    fn render(mut self) -> String {
        self.out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        self.out.push('\n');
        self.out.push_str(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:wp="{}" xmlns:a="{}" xmlns:pic="{}"><w:body>"#,
            NS_W, NS_R, NS_WP, NS_A, NS_PIC
        ));

        let doc = self.doc;
        let blocks = &doc.blocks;
        for (i, block) in blocks.iter().enumerate() {
            match block {
                Block::Paragraph(p) => self.paragraph(p),
                Block::PageBreak => self.out.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#),
                Block::Image {
                    resource_id, width, ..
                } => self.image(resource_id, *width),
                Block::Table(table) => {
                    if table.column_count() == 0 {
                        continue;
                    }
                    self.table(table);
                    // Adjacent tables would merge, and the body must not end in one.
                    let next_is_table = matches!(blocks.get(i + 1), Some(Block::Table(_)) | None);
                    if next_is_table {
                        self.out.push_str("<w:p/>");
                    }
                }
            }
        }

        self.section_properties();
        self.out.push_str("</w:body></w:document>");
        self.out
    }

    fn paragraph(&mut self, p: &Paragraph) {
        self.out.push_str("<w:p>");
        self.paragraph_properties(p);
        if let Some(info) = &p.style.list_info {
            self.out.push_str(&format!(
                r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r><w:r><w:tab/></w:r>"#,
                escape_xml(&info.label())
            ));
        }
        for run in &p.runs {
            self.run(run);
        }
        self.out.push_str("</w:p>");
    }

    fn paragraph_properties(&mut self, p: &Paragraph) {
        let style = match (p.heading_level(), p.style.caption) {
            (Some(level), _) => Some(format!("Heading{}", level)),
            (None, true) => Some("Caption".to_string()),
            (None, false) => None,
        };
        let jc = justification(p.style.alignment);
        let is_list = p.is_list_item();
        if style.is_none() && jc.is_none() && !is_list {
            return;
        }

        self.out.push_str("<w:pPr>");
        if let Some(style) = style {
            self.out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, style));
        }
        if is_list {
            self.out.push_str(&format!(
                r#"<w:ind w:left="{}" w:hanging="{}"/>"#,
                LIST_INDENT, LIST_HANGING
            ));
        }
        if let Some(jc) = jc {
            self.out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, jc));
        }
        self.out.push_str("</w:pPr>");
    }

    fn run(&mut self, run: &TextRun) {
        if run.text.is_empty() {
            return;
        }
        self.out.push_str("<w:r>");
        let style = &run.style;
        if style.has_styling() || style.color.is_some() || style.font_size.is_some() {
            self.out.push_str("<w:rPr>");
            if style.bold {
                self.out.push_str("<w:b/>");
            }
            if style.italic {
                self.out.push_str("<w:i/>");
            }
            if let Some(color) = &style.color {
                self.out.push_str(&format!(
                    r#"<w:color w:val="{}"/>"#,
                    escape_xml(color.trim_start_matches('#'))
                ));
            }
            if let Some(size) = style.font_size {
                let half_points = half_points(size);
                self.out.push_str(&format!(
                    r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
                    half_points
                ));
            }
            if style.superscript {
                self.out.push_str(r#"<w:vertAlign w:val="superscript"/>"#);
            }
            self.out.push_str("</w:rPr>");
        }
        self.out.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_xml(&run.text)
        ));
    }

    fn image(&mut self, resource_id: &str, width: f32) {
        let (media, doc) = (self.media, self.doc);
        let (Some(entry), Some(resource)) = (media.get(resource_id), doc.get_resource(resource_id))
        else {
            log::warn!("Image block refers to unknown resource {}", resource_id);
            self.out.push_str(&format!(
                r#"<w:p><w:r><w:t xml:space="preserve">[Could not load image: {}]</w:t></w:r></w:p>"#,
                escape_xml(resource_id)
            ));
            return;
        };

        let width = width.min(self.options.text_width());
        let height = width * resource.aspect_ratio().unwrap_or(DEFAULT_ASPECT);
        let cx = (width * EMU_PER_INCH).round() as u64;
        let cy = (height * EMU_PER_INCH).round() as u64;
        self.drawing_id += 1;
        let id = self.drawing_id;
        let name = escape_xml(&entry.file_name);

        self.out.push_str(r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#);
        self.out.push_str(&format!(
            concat!(
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="{pic}"><pic:pic>"#,
                r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline>"#
            ),
            cx = cx,
            cy = cy,
            id = id,
            name = name,
            pic = NS_PIC,
            rel = entry.rel_id,
        ));
        self.out.push_str("</w:drawing></w:r></w:p>");
    }

    fn table(&mut self, table: &Table) {
        let columns = table.column_count();
        let total = (self.options.text_width() * TWIPS_PER_INCH).round() as u32;
        let col_width = total / columns as u32;

        self.out.push_str(concat!(
            r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/>"#,
            r#"<w:tblW w:w="0" w:type="auto"/><w:tblLook w:val="04A0"/></w:tblPr>"#
        ));
        self.out.push_str("<w:tblGrid>");
        for _ in 0..columns {
            self.out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, col_width));
        }
        self.out.push_str("</w:tblGrid>");

        for row in &table.rows {
            self.out.push_str("<w:tr>");
            if row.is_header {
                self.out.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for cell in &row.cells {
                self.out.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/></w:tcPr>"#,
                    col_width
                ));
                // Every cell needs at least one paragraph.
                self.paragraph(&cell.content);
                self.out.push_str("</w:tc>");
            }
            self.out.push_str("</w:tr>");
        }
        self.out.push_str("</w:tbl>");
    }

    fn section_properties(&mut self) {
        let (w, h) = self.options.page_size.twips();
        let margin = (self.options.margin * TWIPS_PER_INCH).round() as u32;
        self.out.push_str(&format!(
            concat!(
                r#"<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"/>"#,
                r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" "#,
                r#"w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#
            ),
            w = w,
            h = h,
            m = margin
        ));
    }
}

fn justification(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::Left => None,
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
        Alignment::Justify => Some("both"),
    }
}

fn half_points(points: f32) -> u32 {
    (points * 2.0).round() as u32
}

/// Escape text for XML content, dropping control characters XML 1.0 forbids.
fn escape_xml(text: &str) -> Cow<'_, str> {
    let forbidden = |c: char| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r');
    if text.chars().any(forbidden) {
        let cleaned: String = text.chars().filter(|c| !forbidden(*c)).collect();
        return Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned());
    }
    quick_xml::escape::escape(text)
}

fn content_types_xml(doc: &Document) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#
    ));

    let mut extensions: BTreeMap<&str, &str> = BTreeMap::new();
    for resource in doc.resources.values() {
        extensions.insert(resource.extension(), resource.mime_type.as_str());
    }
    for (ext, mime) in extensions {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            ext,
            escape_xml(mime)
        ));
    }

    xml.push_str(concat!(
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        r#"<Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>"#,
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        "</Types>"
    ));
    xml
}

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    "</Relationships>"
);

const APP_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    "<Application>manudoc</Application>",
    "</Properties>"
);

const SETTINGS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:defaultTabStop w:val="720"/>"#,
    r#"<w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>"#,
    "</w:settings>"
);

fn document_rels_xml(media: &MediaTable) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>"#
    ));
    for entry in media.entries.values() {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="media/{}"/>"#,
            entry.rel_id,
            REL_IMAGE,
            escape_xml(&entry.file_name)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn core_xml(doc: &Document) -> String {
    let meta = &doc.metadata;
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));

    let fields = [
        ("dc:title", &meta.title),
        ("dc:creator", &meta.author),
        ("dc:subject", &meta.subject),
        ("cp:keywords", &meta.keywords),
    ];
    for (tag, value) in fields {
        if let Some(value) = value {
            xml.push_str(&format!("<{tag}>{}</{tag}>", escape_xml(value), tag = tag));
        }
    }

    let dates = [("dcterms:created", meta.created), ("dcterms:modified", meta.modified)];
    for (tag, value) in dates {
        if let Some(value) = value {
            xml.push_str(&format!(
                r#"<{tag} xsi:type="dcterms:W3CDTF">{}</{tag}>"#,
                value.format("%Y-%m-%dT%H:%M:%SZ"),
                tag = tag
            ));
        }
    }

    xml.push_str("</cp:coreProperties>");
    xml
}

fn styles_xml(options: &RenderOptions) -> String {
    let font = escape_xml(&options.font_family);
    let body = half_points(options.font_size);
    let line = (options.line_spacing * 240.0).round() as u32;
    let color = escape_xml(&options.heading_color);

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, NS_W));
    xml.push_str(&format!(
        concat!(
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/><w:lang w:val="en-US"/>"#,
            "</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr>",
            r#"<w:spacing w:after="0" w:line="{line}" w:lineRule="auto"/>"#,
            "</w:pPr></w:pPrDefault></w:docDefaults>"
        ),
        font = font,
        size = body,
        line = line
    ));

    xml.push_str(concat!(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#,
        r#"<w:name w:val="Normal"/><w:qFormat/></w:style>"#
    ));

    for (level, points) in [(1u8, 16.0f32), (2, 14.0), (3, 12.0)] {
        let size = half_points(points);
        xml.push_str(&format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}">"#,
                r#"<w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/>"#,
                r#"<w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/>"#,
                r#"<w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
                r#"<w:b/><w:bCs/><w:color w:val="{color}"/>"#,
                r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#
            ),
            level = level,
            outline = level - 1,
            font = font,
            color = color,
            size = size
        ));
    }

    xml.push_str(concat!(
        r#"<w:style w:type="paragraph" w:styleId="Caption">"#,
        r#"<w:name w:val="caption"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:spacing w:before="120" w:after="120"/></w:pPr>"#,
        r#"<w:rPr><w:i/><w:iCs/></w:rPr></w:style>"#
    ));

    xml.push_str(concat!(
        r#"<w:style w:type="table" w:styleId="TableGrid">"#,
        r#"<w:name w:val="Table Grid"/><w:uiPriority w:val="39"/>"#,
        r#"<w:pPr><w:spacing w:line="240" w:lineRule="auto"/></w:pPr>"#,
        "<w:tblPr><w:tblBorders>",
        r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        "</w:tblBorders><w:tblCellMar>",
        r#"<w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/>"#,
        "</w:tblCellMar></w:tblPr></w:style>"
    ));

    xml.push_str("</w:styles>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Resource, TableRow, TextStyle};
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 2, 0, 0, 0]);
        data
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
        assert!(matches!(escape_xml("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_run_properties() {
        let mut doc = Document::new();
        let mut p = Paragraph::new();
        p.add_run(TextRun::bold("Bold"));
        p.add_run(TextRun::superscript("3,5"));
        p.add_run(TextRun::styled(
            "[IMAGE MISSING: a.png]",
            TextStyle {
                color: Some("#FF0000".to_string()),
                font_size: Some(10.0),
                ..Default::default()
            },
        ));
        doc.add_paragraph(p);

        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Bold</w:t></w:r>"#));
        assert!(xml.contains(r#"<w:vertAlign w:val="superscript"/>"#));
        assert!(xml.contains(r#"<w:color w:val="FF0000"/><w:sz w:val="20"/>"#));
    }

    #[test]
    fn test_headings_and_page_breaks() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::heading("Title", 1).align(Alignment::Center));
        doc.add_page_break();
        doc.add_paragraph(Paragraph::heading("Methods", 2));

        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/><w:jc w:val="center"/>"#));
        assert!(xml.contains(r#"<w:br w:type="page"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="Heading2"/>"#));

        let styles = read_part(&bytes, "word/styles.xml");
        assert!(styles.contains(r#"w:ascii="Times New Roman""#));
        assert!(styles.contains(r#"<w:sz w:val="24"/>"#));
        assert!(styles.contains(r#"w:line="480""#));
        assert!(styles.contains(r#"<w:color w:val="000000"/>"#));
    }

    #[test]
    fn test_table_markup() {
        let mut table = Table::new();
        let mut header = TableRow::from_strings(["Gene", "N"]);
        header.is_header = true;
        table.add_row(header);
        table.add_row(TableRow::new(vec![
            crate::model::TableCell::text("KPC"),
            crate::model::TableCell::empty(),
        ]));
        let mut doc = Document::new();
        doc.add_table(table);

        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<w:tblStyle w:val="TableGrid"/>"#));
        assert_eq!(xml.matches("<w:gridCol ").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert!(xml.contains("<w:tblHeader/>"));
        // Empty cell still has a paragraph, and the body does not end in a table.
        assert!(xml.contains("</w:tcPr><w:p></w:p></w:tc>"));
        assert!(xml.contains("</w:tbl><w:p/><w:sectPr>"));
    }

    #[test]
    fn test_empty_table_is_skipped() {
        let mut doc = Document::new();
        doc.add_table(Table::new());
        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        assert!(!read_part(&bytes, "word/document.xml").contains("<w:tbl>"));
    }

    #[test]
    fn test_image_embedding() {
        let mut doc = Document::new();
        let resource = Resource::from_image_bytes(png(800, 400)).unwrap();
        doc.add_resource("image1".to_string(), resource);
        doc.add_block(Block::Image {
            resource_id: "image1".to_string(),
            caption: None,
            width: 6.0,
        });

        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<wp:extent cx="5486400" cy="2743200"/>"#));
        assert!(xml.contains(r#"r:embed="rId3""#));

        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains(r#"Id="rId3""#));
        assert!(rels.contains(r#"Target="media/image1.png""#));

        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.by_name("word/media/image1.png").unwrap().size(), 29);
    }

    #[test]
    fn test_unknown_resource_placeholder() {
        let mut doc = Document::new();
        doc.add_block(Block::Image {
            resource_id: "image9".to_string(),
            caption: None,
            width: 6.0,
        });
        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        assert!(read_part(&bytes, "word/document.xml").contains("[Could not load image: image9]"));
    }

    #[test]
    fn test_list_item_label() {
        let mut doc = Document::new();
        let mut item = Paragraph::with_text("first");
        item.style.list_info = Some(crate::model::ListInfo::numbered(1));
        doc.add_paragraph(item);

        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<w:ind w:left="720" w:hanging="360"/>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">1.</w:t></w:r><w:r><w:tab/>"#));
    }

    #[test]
    fn test_core_properties() {
        let mut doc = Document::new();
        doc.metadata.title = Some("Decoupling & Paradox".to_string());
        let bytes = to_docx(&doc, &RenderOptions::default()).unwrap();
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Decoupling &amp; Paradox</dc:title>"));
        assert!(!core.contains("dcterms:created"));
    }

    #[test]
    fn test_rejects_invalid_options() {
        let doc = Document::new();
        let options = RenderOptions::new().with_font_size(0.0);
        assert!(to_docx(&doc, &options).is_err());
    }

    #[test]
    fn test_deterministic_output() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Same input"));
        let options = RenderOptions::default();
        assert_eq!(to_docx(&doc, &options).unwrap(), to_docx(&doc, &options).unwrap());
    }
}
