//! PPT Report Generator Module
//! Builds a PowerPoint report of the dashboard sections, one slide per view:
//! a title, and either a chart image or bullet lines (summary view).
//!
//! Uses direct ZIP/XML generation to properly embed images since the ppt-rs
//! high-level API doesn't fully support image embedding yet.

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

/// EMU (English Metric Units) conversion: 914400 EMU = 1 inch
const EMU_PER_INCH: i64 = 914400;
/// Standard 16:9 slide dimensions (in EMU)
const SLIDE_WIDTH: i64 = 9144000; // 10 inches
const SLIDE_HEIGHT: i64 = 6858000; // 7.5 inches

const MARGIN: i64 = EMU_PER_INCH / 2;
const TITLE_TOP: i64 = EMU_PER_INCH / 4;
const TITLE_HEIGHT: i64 = (EMU_PER_INCH * 9) / 10;
const BODY_TOP: i64 = TITLE_TOP + TITLE_HEIGHT + EMU_PER_INCH / 8;
/// Picture box: 9in x 6in, the 3:2 aspect the chart renderer produces.
const PIC_WIDTH: i64 = EMU_PER_INCH * 9;
const PIC_HEIGHT: i64 = EMU_PER_INCH * 6;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const DOC_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// One report slide: a section title plus a chart image or bullet lines.
pub struct ReportSlide {
    pub title: String,
    pub image: Option<Vec<u8>>,
    pub bullets: Vec<String>,
}

/// PPT generator for the dashboard report.
pub struct PptGenerator;

impl PptGenerator {
    pub fn generate_report(slides: &[ReportSlide], output_path: &Path, title: &str) -> Result<()> {
        let file = File::create(output_path)?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default();

        let slide_count = slides.len();

        let mut put = |zip: &mut ZipWriter<File>, name: String, body: String| -> Result<()> {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
            Ok(())
        };

        put(
            &mut zip,
            "[Content_Types].xml".to_string(),
            Self::content_types_xml(slide_count),
        )?;

        put(
            &mut zip,
            "_rels/.rels".to_string(),
            relationships(&[
                ("officeDocument", "ppt/presentation.xml"),
                (
                    "package/2006/relationships/metadata/core-properties",
                    "docProps/core.xml",
                ),
                ("extended-properties", "docProps/app.xml"),
            ]),
        )?;

        let mut presentation_rels = vec![
            ("slideMaster", "slideMasters/slideMaster1.xml".to_string()),
            ("theme", "theme/theme1.xml".to_string()),
        ];
        for i in 1..=slide_count {
            presentation_rels.push(("slide", format!("slides/slide{}.xml", i)));
        }
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels".to_string(),
            relationships(
                &presentation_rels
                    .iter()
                    .map(|(t, target)| (*t, target.as_str()))
                    .collect::<Vec<_>>(),
            ),
        )?;

        put(
            &mut zip,
            "ppt/presentation.xml".to_string(),
            Self::presentation_xml(slide_count),
        )?;

        // Slides, their relationships, and embedded images
        let mut image_num = 0usize;
        for (slide_idx, slide) in slides.iter().enumerate() {
            let slide_num = slide_idx + 1;

            let image_ref = slide.image.as_ref().map(|_| {
                image_num += 1;
                image_num
            });

            let mut slide_rels =
                vec![("slideLayout", "../slideLayouts/slideLayout1.xml".to_string())];
            if let Some(img_num) = image_ref {
                slide_rels.push(("image", format!("../media/image{}.png", img_num)));
            }
            put(
                &mut zip,
                format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
                relationships(
                    &slide_rels
                        .iter()
                        .map(|(t, target)| (*t, target.as_str()))
                        .collect::<Vec<_>>(),
                ),
            )?;

            put(
                &mut zip,
                format!("ppt/slides/slide{}.xml", slide_num),
                Self::slide_xml(slide, image_ref.is_some()),
            )?;
        }

        put(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            Self::slide_layout_xml(),
        )?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            relationships(&[("slideMaster", "../slideMasters/slideMaster1.xml")]),
        )?;

        put(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            Self::slide_master_xml(),
        )?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            relationships(&[
                ("slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("theme", "../theme/theme1.xml"),
            ]),
        )?;

        put(&mut zip, "ppt/theme/theme1.xml".to_string(), Self::theme_xml())?;
        put(
            &mut zip,
            "docProps/core.xml".to_string(),
            Self::core_props_xml(title),
        )?;
        put(
            &mut zip,
            "docProps/app.xml".to_string(),
            Self::app_props_xml(slide_count),
        )?;

        // Embed chart images
        let mut image_num = 0usize;
        for slide in slides {
            if let Some(bytes) = &slide.image {
                image_num += 1;
                zip.start_file(format!("ppt/media/image{}.png", image_num), options)?;
                zip.write_all(bytes)?;
            }
        }

        zip.finish()?;

        log::info!(
            "report generated: {} ({} slides, {} images)",
            output_path.display(),
            slide_count,
            image_num
        );
        Ok(())
    }

    fn content_types_xml(slide_count: usize) -> String {
        let mut overrides = String::new();
        let parts: [(&str, &str); 6] = [
            ("/ppt/presentation.xml", "presentationml.presentation.main"),
            ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster"),
            ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout"),
            ("/ppt/theme/theme1.xml", "theme"),
            ("/docProps/core.xml", "core-properties"),
            ("/docProps/app.xml", "extended-properties"),
        ];
        for (part, kind) in parts {
            overrides.push_str(&format!(
                "<Override PartName=\"{}\" ContentType=\"{}\"/>\n",
                part,
                content_type(kind)
            ));
        }
        for i in 1..=slide_count {
            overrides.push_str(&format!(
                "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"{}\"/>\n",
                i,
                content_type("presentationml.slide")
            ));
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\n\
             <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\n\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>\n\
             <Default Extension=\"png\" ContentType=\"image/png\"/>\n\
             {}</Types>",
            overrides
        )
    }

    fn presentation_xml(slide_count: usize) -> String {
        let mut slide_ids = String::new();
        for i in 1..=slide_count {
            // rId1/rId2 are the master and theme; slides follow.
            slide_ids.push_str(&format!(
                "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
                255 + i,
                i + 2
            ));
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <p:presentation xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\" saveSubsetFonts=\"1\">\n\
             <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\n\
             <p:sldIdLst>{ids}</p:sldIdLst>\n\
             <p:sldSz cx=\"{w}\" cy=\"{h}\" type=\"screen16x9\"/>\n\
             <p:notesSz cx=\"{h}\" cy=\"{w}\"/>\n\
             </p:presentation>",
            a = DRAWING_NS,
            r = DOC_REL,
            p = PRESENTATION_NS,
            ids = slide_ids,
            w = SLIDE_WIDTH,
            h = SLIDE_HEIGHT
        )
    }

    fn slide_xml(slide: &ReportSlide, has_image: bool) -> String {
        let content_width = SLIDE_WIDTH - 2 * MARGIN;
        let mut shapes = String::new();

        // Section title across the top
        shapes.push_str(&format!(
            "<p:sp>\n\
             <p:nvSpPr><p:cNvPr id=\"2\" name=\"Title\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\n\
             <p:spPr>{}</p:spPr>\n\
             <p:txBody><a:bodyPr/><a:lstStyle/>\
             <a:p><a:r><a:rPr lang=\"en-US\" sz=\"2800\" b=\"1\"/><a:t>{}</a:t></a:r></a:p>\
             </p:txBody>\n\
             </p:sp>\n",
            shape_box(MARGIN, TITLE_TOP, content_width, TITLE_HEIGHT),
            escape_xml(&slide.title)
        ));

        if has_image {
            let pic_x = (SLIDE_WIDTH - PIC_WIDTH) / 2;
            shapes.push_str(&format!(
                "<p:pic>\n\
                 <p:nvPicPr><p:cNvPr id=\"3\" name=\"Chart\"/>\
                 <p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\n\
                 <p:blipFill><a:blip r:embed=\"rId2\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\n\
                 <p:spPr>{}</p:spPr>\n\
                 </p:pic>\n",
                shape_box(pic_x, BODY_TOP, PIC_WIDTH, PIC_HEIGHT)
            ));
        }

        if !slide.bullets.is_empty() {
            let mut paragraphs = String::new();
            for line in &slide.bullets {
                paragraphs.push_str(&format!(
                    "<a:p><a:pPr><a:buChar char=\"&#8226;\"/></a:pPr>\
                     <a:r><a:rPr lang=\"en-US\" sz=\"1800\"/><a:t>{}</a:t></a:r></a:p>",
                    escape_xml(line)
                ));
            }
            let body_height = SLIDE_HEIGHT - BODY_TOP - MARGIN;
            shapes.push_str(&format!(
                "<p:sp>\n\
                 <p:nvSpPr><p:cNvPr id=\"4\" name=\"Body\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\n\
                 <p:spPr>{}</p:spPr>\n\
                 <p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody>\n\
                 </p:sp>\n",
                shape_box(MARGIN, BODY_TOP, content_width, body_height),
                paragraphs
            ));
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <p:sld xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\n\
             <p:cSld><p:spTree>\n\
             {tree_header}\n\
             {shapes}\
             </p:spTree></p:cSld>\n\
             <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\n\
             </p:sld>",
            a = DRAWING_NS,
            r = DOC_REL,
            p = PRESENTATION_NS,
            tree_header = SP_TREE_HEADER,
            shapes = shapes
        )
    }

    fn slide_layout_xml() -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <p:sldLayout xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\" type=\"blank\" preserve=\"1\">\n\
             <p:cSld name=\"Blank\"><p:spTree>{tree_header}</p:spTree></p:cSld>\n\
             <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\n\
             </p:sldLayout>",
            a = DRAWING_NS,
            r = DOC_REL,
            p = PRESENTATION_NS,
            tree_header = SP_TREE_HEADER
        )
    }

    fn slide_master_xml() -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <p:sldMaster xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\n\
             <p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>\
             <p:spTree>{tree_header}</p:spTree></p:cSld>\n\
             <p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" \
             accent1=\"accent1\" accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" \
             accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\n\
             <p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\n\
             </p:sldMaster>",
            a = DRAWING_NS,
            r = DOC_REL,
            p = PRESENTATION_NS,
            tree_header = SP_TREE_HEADER
        )
    }

    /// Minimal theme: the dashboard's chart palette as the accent colors.
    fn theme_xml() -> String {
        let accents = [
            ("accent1", "3498DB"),
            ("accent2", "E74C3C"),
            ("accent3", "2ECC71"),
            ("accent4", "F39C12"),
            ("accent5", "1ABC9C"),
            ("accent6", "9B59B6"),
        ];
        let mut accent_xml = String::new();
        for (name, rgb) in accents {
            accent_xml.push_str(&format!(
                "<a:{n}><a:srgbClr val=\"{c}\"/></a:{n}>",
                n = name,
                c = rgb
            ));
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <a:theme xmlns:a=\"{a}\" name=\"Retail Pulse Theme\">\n\
             <a:themeElements>\n\
             <a:clrScheme name=\"Retail Pulse\">\
             <a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
             <a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
             <a:dk2><a:srgbClr val=\"2C3E50\"/></a:dk2>\
             <a:lt2><a:srgbClr val=\"ECF0F1\"/></a:lt2>\
             {accents}\
             <a:hlink><a:srgbClr val=\"0563C1\"/></a:hlink>\
             <a:folHlink><a:srgbClr val=\"954F72\"/></a:folHlink>\
             </a:clrScheme>\n\
             <a:fontScheme name=\"Retail Pulse\">\
             <a:majorFont><a:latin typeface=\"Calibri Light\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
             <a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
             </a:fontScheme>\n\
             <a:fmtScheme name=\"Retail Pulse\">\
             <a:fillStyleLst>\
             <a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
             <a:solidFill><a:schemeClr val=\"phClr\"><a:tint val=\"60000\"/></a:schemeClr></a:solidFill>\
             <a:solidFill><a:schemeClr val=\"phClr\"><a:shade val=\"80000\"/></a:schemeClr></a:solidFill>\
             </a:fillStyleLst>\
             <a:lnStyleLst>\
             <a:ln w=\"6350\" cap=\"flat\" cmpd=\"sng\" algn=\"ctr\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill><a:prstDash val=\"solid\"/></a:ln>\
             <a:ln w=\"12700\" cap=\"flat\" cmpd=\"sng\" algn=\"ctr\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill><a:prstDash val=\"solid\"/></a:ln>\
             <a:ln w=\"19050\" cap=\"flat\" cmpd=\"sng\" algn=\"ctr\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill><a:prstDash val=\"solid\"/></a:ln>\
             </a:lnStyleLst>\
             <a:effectStyleLst>\
             <a:effectStyle><a:effectLst/></a:effectStyle>\
             <a:effectStyle><a:effectLst/></a:effectStyle>\
             <a:effectStyle><a:effectLst/></a:effectStyle>\
             </a:effectStyleLst>\
             <a:bgFillStyleLst>\
             <a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
             <a:solidFill><a:schemeClr val=\"phClr\"><a:tint val=\"95000\"/></a:schemeClr></a:solidFill>\
             <a:solidFill><a:schemeClr val=\"phClr\"><a:shade val=\"90000\"/></a:schemeClr></a:solidFill>\
             </a:bgFillStyleLst>\
             </a:fmtScheme>\n\
             </a:themeElements>\n\
             <a:objectDefaults/>\n\
             <a:extraClrSchemeLst/>\n\
             </a:theme>",
            a = DRAWING_NS,
            accents = accent_xml
        )
    }

    fn core_props_xml(title: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <cp:coreProperties \
             xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
             xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
             xmlns:dcterms=\"http://purl.org/dc/terms/\" \
             xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n\
             <dc:title>{}</dc:title>\n\
             <dc:creator>Retail Pulse</dc:creator>\n\
             <cp:lastModifiedBy>Retail Pulse</cp:lastModifiedBy>\n\
             <cp:revision>1</cp:revision>\n\
             </cp:coreProperties>",
            escape_xml(title)
        )
    }

    fn app_props_xml(slide_count: usize) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <Properties \
             xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" \
             xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\n\
             <Application>Retail Pulse</Application>\n\
             <PresentationFormat>On-screen Show (16:9)</PresentationFormat>\n\
             <Slides>{}</Slides>\n\
             <Notes>0</Notes>\n\
             <HiddenSlides>0</HiddenSlides>\n\
             <ScaleCrop>false</ScaleCrop>\n\
             <LinksUpToDate>false</LinksUpToDate>\n\
             <SharedDoc>false</SharedDoc>\n\
             <HyperlinksChanged>false</HyperlinksChanged>\n\
             <AppVersion>16.0000</AppVersion>\n\
             </Properties>",
            slide_count
        )
    }
}

const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PRESENTATION_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Every spTree needs this empty group-shape preamble.
const SP_TREE_HEADER: &str = "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>";

/// Position + extent + rectangle geometry for a shape.
fn shape_box(x: i64, y: i64, w: i64, h: i64) -> String {
    format!(
        "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>",
        x, y, w, h
    )
}

/// A relationships part. Entries are `(relationship kind, target)`; ids are
/// assigned rId1.. in order. Short kinds resolve against the officeDocument
/// relationship namespace; kinds with a `/` are full schema paths.
fn relationships(entries: &[(&str, &str)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">\n",
        REL_NS
    );
    for (idx, (kind, target)) in entries.iter().enumerate() {
        let rel_type = if kind.contains('/') {
            format!("http://schemas.openxmlformats.org/{}", kind)
        } else {
            format!("{}/{}", DOC_REL, kind)
        };
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}\" Target=\"{}\"/>\n",
            idx + 1,
            rel_type,
            target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_type(kind: &str) -> String {
    match kind {
        "core-properties" => {
            "application/vnd.openxmlformats-package.core-properties+xml".to_string()
        }
        other => format!("application/vnd.openxmlformats-officedocument.{}+xml", other),
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slides() -> Vec<ReportSlide> {
        vec![
            ReportSlide {
                title: "Key Metrics Summary".to_string(),
                image: None,
                bullets: vec!["Total Records: 1,000".to_string()],
            },
            ReportSlide {
                title: "Top Products & Co".to_string(),
                image: Some(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]),
                bullets: Vec::new(),
            },
        ]
    }

    #[test]
    fn generates_a_pptx_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pptx");

        PptGenerator::generate_report(&sample_slides(), &path, "Retail Pulse Report").unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // A .pptx is a ZIP archive.
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn titles_are_xml_escaped() {
        let xml = PptGenerator::slide_xml(
            &ReportSlide {
                title: "Sales & <Returns>".to_string(),
                image: None,
                bullets: Vec::new(),
            },
            false,
        );
        assert!(xml.contains("Sales &amp; &lt;Returns&gt;"));
        assert!(!xml.contains("<Returns>"));
    }

    #[test]
    fn relationship_ids_are_sequential() {
        let xml = relationships(&[
            ("slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("image", "../media/image1.png"),
        ]);
        assert!(xml.contains("rId1"));
        assert!(xml.contains("rId2"));
        assert!(xml.contains(&format!("{}/image", DOC_REL)));
    }
}
