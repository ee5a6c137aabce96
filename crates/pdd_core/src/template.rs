//! Placeholder scanning for WordprocessingML parts and the built-in template.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;

use strum::IntoEnumIterator;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::catalog::Section;
use crate::errors::TemplateRenderError;
use crate::session::context_keys;
use crate::store::FormData;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replacement for a newline inside a `<w:t>` run.
const LINE_BREAK: &str = "</w:t><w:br/><w:t xml:space=\"preserve\">";

/// Result of filling one XML part.
#[derive(Debug, Default)]
pub struct Filled {
    pub xml: String,
    /// Every key the part referenced, whether or not the context had it.
    pub referenced: BTreeSet<String>,
}

/// Replace every `{{ key }}` in `xml` with the escaped context value.
///
/// Word frequently splits typed text into several runs, so braces and key are
/// matched on the text outside markup. The value goes where the opening brace
/// was; tags inside the placeholder are kept so the runs stay balanced. Keys
/// absent from `context` render as the empty string.
///
/// A `{{` without a closing `}}` before the next `{{` is malformed.
pub fn fill_placeholders(
    xml: &str,
    part: &str,
    context: &FormData,
) -> Result<Filled, TemplateRenderError> {
    let text = text_chars(xml);
    let malformed = |offset| TemplateRenderError::MalformedPlaceholder {
        part: part.to_string(),
        offset,
    };

    let mut out = String::with_capacity(xml.len());
    let mut referenced = BTreeSet::new();
    let mut copied = 0;
    let mut i = 0;

    while i + 1 < text.len() {
        if !is_pair(&text, i, '{') {
            i += 1;
            continue;
        }
        let open_at = text[i].0;

        let mut j = i + 2;
        let close = loop {
            if j + 1 >= text.len() || is_pair(&text, j, '{') {
                return Err(malformed(open_at));
            }
            if is_pair(&text, j, '}') {
                break j;
            }
            j += 1;
        };
        let end = text[close + 1].0 + '}'.len_utf8();

        let key: String = text[i + 2..close].iter().map(|(_, c)| *c).collect();
        let key = key.trim();
        let span = &xml[open_at..end];

        out.push_str(&xml[copied..open_at]);
        if key.is_empty() {
            out.push_str(span);
        } else {
            match context.get(key) {
                Some(value) => out.push_str(&escape_run_text(&value.display_value())),
                None => debug!(%part, %key, "placeholder without value rendered blank"),
            }
            out.push_str(&markup_only(span));
            referenced.insert(key.to_string());
        }

        copied = end;
        i = close + 2;
    }
    out.push_str(&xml[copied..]);

    Ok(Filled {
        xml: out,
        referenced,
    })
}

/// Parts of a DOCX package that may carry placeholders.
pub fn is_template_part(name: &str) -> bool {
    if name == "word/document.xml" {
        return true;
    }
    name.strip_prefix("word/")
        .filter(|n| !n.contains('/'))
        .is_some_and(|n| {
            (n.starts_with("header") || n.starts_with("footer")) && n.ends_with(".xml")
        })
}

/// Byte offset and character of everything outside `<...>` tags.
fn text_chars(xml: &str) -> Vec<(usize, char)> {
    let mut out = Vec::with_capacity(xml.len());
    let mut in_tag = false;
    for (at, ch) in xml.char_indices() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push((at, c)),
            _ => {}
        }
    }
    out
}

fn is_pair(text: &[(usize, char)], at: usize, brace: char) -> bool {
    text.get(at).is_some_and(|(_, c)| *c == brace)
        && text.get(at + 1).is_some_and(|(_, c)| *c == brace)
}

/// The tags of `s` with all text between them dropped.
fn markup_only(s: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(ch);
            }
            '>' if in_tag => {
                in_tag = false;
                out.push(ch);
            }
            c if in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_run_text(s: &str) -> String {
    let normalized = s.replace("\r\n", "\n");
    normalized
        .split('\n')
        .map(escape_xml)
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

const ESTIMATE_LINES: &[(&str, &str)] = &[
    ("Total trees", context_keys::TOTAL_TREES),
    ("Total biomass (t)", context_keys::TOTAL_BIOMASS),
    ("Carbon content (t)", context_keys::CARBON_CONTENT),
    ("CO2 equivalent (tCO2e)", context_keys::CO2E),
    ("Buffer deduction (tCO2e)", context_keys::BUFFER_DEDUCTION),
    ("Buffer share (%)", context_keys::BUFFER_PERCENT),
    ("Usable credits (tCO2e)", context_keys::USABLE_CREDITS),
];

fn paragraph(body: &mut String, text: &str, bold: bool) {
    body.push_str("<w:p><w:r>");
    if bold {
        body.push_str("<w:rPr><w:b/></w:rPr>");
    }
    body.push_str("<w:t xml:space=\"preserve\">");
    body.push_str(&escape_xml(text));
    body.push_str("</w:t></w:r></w:p>");
}

fn labelled(body: &mut String, label: &str, key: &str) {
    paragraph(body, &format!("{label}: {OPEN} {key} {CLOSE}"), false);
}

fn default_document_xml() -> String {
    let mut body = String::from(DOCUMENT_HEAD);
    paragraph(&mut body, "Agroforestry Project Design Document", true);
    labelled(&mut body, "Generated on", context_keys::GENERATED_ON);

    for section in Section::iter() {
        paragraph(&mut body, &section.to_string(), true);
        for field in section.fields() {
            labelled(&mut body, field.label, field.key);
        }
    }

    paragraph(&mut body, "Estimated carbon credits", true);
    for (label, key) in ESTIMATE_LINES {
        labelled(&mut body, label, key);
    }
    paragraph(
        &mut body,
        "Simplified estimate: biomass grows linearly with project duration.",
        false,
    );
    labelled(&mut body, "Session", context_keys::SESSION_ID);

    body.push_str(DOCUMENT_TAIL);
    body
}

/// A minimal DOCX covering every catalog field and the estimate.
pub fn default_template() -> Result<Vec<u8>, TemplateRenderError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("word/document.xml", default_document_xml()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

pub fn write_default_template(path: &Path) -> Result<(), TemplateRenderError> {
    let bytes = default_template()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    debug!(path = %path.display(), "built-in template written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::FormValue;

    fn ctx(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FormValue::Text(v.to_string())))
            .collect()
    }

    #[test]
    fn fills_simple_placeholder() {
        let filled = fill_placeholders(
            "<w:t>Area: {{ project.land_area_ha }} ha</w:t>",
            "word/document.xml",
            &ctx(&[("project.land_area_ha", "10")]),
        )
        .unwrap();
        assert_eq!(filled.xml, "<w:t>Area: 10 ha</w:t>");
        assert!(filled.referenced.contains("project.land_area_ha"));
    }

    #[test]
    fn placeholder_split_across_runs_is_recognised() {
        let xml = "<w:r><w:t>{{</w:t></w:r><w:r><w:t>baseline.land_use }}</w:t></w:r>";
        let filled = fill_placeholders(xml, "p", &ctx(&[("baseline.land_use", "Cropland")]))
            .unwrap();
        assert_eq!(filled.xml, "<w:r><w:t>Cropland</w:t></w:r><w:r><w:t></w:t></w:r>");
    }

    #[test]
    fn braces_split_between_runs_keep_following_text() {
        let xml = "<w:r><w:t>{{ a.b }</w:t></w:r><w:r><w:t>} and the important sentence {{ c.d }}</w:t></w:r>";
        let filled = fill_placeholders(xml, "p", &ctx(&[("a.b", "X"), ("c.d", "Y")])).unwrap();
        assert_eq!(
            filled.xml,
            "<w:r><w:t>X</w:t></w:r><w:r><w:t> and the important sentence Y</w:t></w:r>"
        );
        assert_eq!(
            filled.referenced.into_iter().collect::<Vec<_>>(),
            vec!["a.b".to_string(), "c.d".to_string()]
        );
    }

    #[test]
    fn opening_braces_split_between_runs() {
        let xml = "<w:r><w:t>Site: {</w:t></w:r><w:r><w:t>{ description.summary }}.</w:t></w:r>";
        let filled =
            fill_placeholders(xml, "p", &ctx(&[("description.summary", "Hills")])).unwrap();
        assert_eq!(
            filled.xml,
            "<w:r><w:t>Site: Hills</w:t></w:r><w:r><w:t>.</w:t></w:r>"
        );
    }

    #[test]
    fn nested_opening_before_close_is_malformed() {
        let err = fill_placeholders("<w:t>{{ a.b } {{ c.d }}</w:t>", "p", &FormData::new())
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateRenderError::MalformedPlaceholder { offset: 5, .. }
        ));
    }

    #[test]
    fn missing_key_renders_blank() {
        let filled = fill_placeholders("<w:t>[{{ a.b }}]</w:t>", "p", &FormData::new()).unwrap();
        assert_eq!(filled.xml, "<w:t>[]</w:t>");
        assert_eq!(filled.referenced.len(), 1);
    }

    #[test]
    fn values_are_escaped_and_newlines_break() {
        let filled =
            fill_placeholders("<w:t>{{x.y}}</w:t>", "p", &ctx(&[("x.y", "A & B\n<C>")])).unwrap();
        assert_eq!(
            filled.xml,
            "<w:t>A &amp; B</w:t><w:br/><w:t xml:space=\"preserve\">&lt;C&gt;</w:t>"
        );
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let err = fill_placeholders("<w:t>ok {{ broken</w:t>", "word/footer1.xml", &FormData::new())
            .unwrap_err();
        match err {
            TemplateRenderError::MalformedPlaceholder { part, offset } => {
                assert_eq!(part, "word/footer1.xml");
                assert_eq!(offset, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn template_parts() {
        assert!(is_template_part("word/document.xml"));
        assert!(is_template_part("word/header1.xml"));
        assert!(is_template_part("word/footer2.xml"));
        assert!(!is_template_part("word/styles.xml"));
        assert!(!is_template_part("word/_rels/header1.xml.rels"));
        assert!(!is_template_part("customXml/item1.xml"));
    }

    #[test]
    fn default_template_references_every_catalog_field() {
        let xml = default_document_xml();
        for section in Section::iter() {
            for field in section.fields() {
                assert!(xml.contains(field.key), "{} missing", field.key);
            }
        }
        assert!(xml.contains(context_keys::USABLE_CREDITS));
    }
}
