//! Integration tests for the DocumentRenderer:
//! - placeholder fill across document, header and footer parts
//! - required placeholders and error cases
//! - scratch files are gone after success and after failure

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use pdd_core::template::{default_template, write_default_template};
use pdd_core::{DocumentRenderer, FormData, FormValue, TemplateRenderError};
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const DOC: &str = r#"<w:document><w:body><w:p><w:r><w:t>Title: {{ identification.project_title }}</w:t></w:r></w:p><w:p><w:r><w:t>Email: {{ identification.contact_email }}</w:t></w:r></w:p></w:body></w:document>"#;

fn write_docx(dir: &Path, parts: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("template.docx");
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    for (name, body) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn part(docx: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut out = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
    out
}

fn context(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FormValue::Text(v.to_string())))
        .collect()
}

fn scratch_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn fills_placeholders_and_blanks_missing_optional() {
    let tpl_dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let template = write_docx(
        tpl_dir.path(),
        &[
            ("word/document.xml", DOC),
            ("word/styles.xml", "<w:styles>{{ untouched }}</w:styles>"),
        ],
    );

    let renderer = DocumentRenderer::new().with_scratch_dir(scratch.path());
    let bytes = renderer
        .render(
            &template,
            &context(&[("identification.project_title", "Vidarbha Agroforestry")]),
        )
        .unwrap();

    let doc = part(&bytes, "word/document.xml");
    assert!(doc.contains("Title: Vidarbha Agroforestry"));
    assert!(doc.contains("Email: </w:t>"));
    assert_eq!(
        part(&bytes, "word/styles.xml"),
        "<w:styles>{{ untouched }}</w:styles>"
    );
    assert!(scratch_is_empty(scratch.path()));
}

#[test]
fn headers_and_footers_are_filled() {
    let tpl_dir = tempfile::tempdir().unwrap();
    let template = write_docx(
        tpl_dir.path(),
        &[
            ("word/document.xml", DOC),
            ("word/header1.xml", "<w:hdr><w:t>{{ meta.session_id }}</w:t></w:hdr>"),
            ("word/footer1.xml", "<w:ftr><w:t>{{ meta.generated_on }}</w:t></w:ftr>"),
        ],
    );

    let bytes = DocumentRenderer::new()
        .render(
            &template,
            &context(&[("meta.session_id", "abc"), ("meta.generated_on", "2025-01-01")]),
        )
        .unwrap();

    assert_eq!(part(&bytes, "word/header1.xml"), "<w:hdr><w:t>abc</w:t></w:hdr>");
    assert_eq!(
        part(&bytes, "word/footer1.xml"),
        "<w:ftr><w:t>2025-01-01</w:t></w:ftr>"
    );
}

#[test]
fn missing_template_fails_and_leaves_no_scratch() {
    let scratch = tempfile::tempdir().unwrap();
    let renderer = DocumentRenderer::new().with_scratch_dir(scratch.path());

    let err = renderer
        .render(&scratch.path().join("absent.docx"), &FormData::new())
        .unwrap_err();
    assert!(matches!(err, TemplateRenderError::TemplateMissing { .. }));
    assert!(scratch_is_empty(scratch.path()));
}

#[test]
fn corrupt_template_is_rejected() {
    let tpl_dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let path = tpl_dir.path().join("broken.docx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let err = DocumentRenderer::new()
        .with_scratch_dir(scratch.path())
        .render(&path, &FormData::new())
        .unwrap_err();
    assert!(matches!(err, TemplateRenderError::Corrupt { .. }));
    assert!(scratch_is_empty(scratch.path()));
}

#[test]
fn archive_without_document_part_is_corrupt() {
    let tpl_dir = tempfile::tempdir().unwrap();
    let template = write_docx(tpl_dir.path(), &[("readme.txt", "hello")]);

    let err = DocumentRenderer::new()
        .render(&template, &FormData::new())
        .unwrap_err();
    assert!(matches!(err, TemplateRenderError::Corrupt { .. }));
}

#[test]
fn required_placeholder_without_value_fails_and_cleans_up() {
    let tpl_dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let template = write_docx(tpl_dir.path(), &[("word/document.xml", DOC)]);

    let renderer = DocumentRenderer::new()
        .with_scratch_dir(scratch.path())
        .require(["identification.project_title", "grouping.is_grouped"]);
    let err = renderer.render(&template, &FormData::new()).unwrap_err();

    match err {
        // grouping.is_grouped is required but the template never asks for it
        TemplateRenderError::MissingPlaceholders(keys) => {
            assert_eq!(keys, vec!["identification.project_title".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(scratch_is_empty(scratch.path()));
}

#[test]
fn unterminated_placeholder_is_malformed() {
    let tpl_dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let template = write_docx(
        tpl_dir.path(),
        &[("word/document.xml", "<w:t>{{ oops</w:t>")],
    );

    let err = DocumentRenderer::new()
        .with_scratch_dir(scratch.path())
        .render(&template, &FormData::new())
        .unwrap_err();
    assert!(matches!(err, TemplateRenderError::MalformedPlaceholder { .. }));
    assert!(scratch_is_empty(scratch.path()));
}

#[test]
fn built_in_template_renders() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("pdd_template.docx");
    write_default_template(&path).unwrap();
    assert!(!default_template().unwrap().is_empty());

    let bytes = DocumentRenderer::new()
        .render(
            &path,
            &context(&[("baseline.scenario", "Rain-fed cotton & soy")]),
        )
        .unwrap();
    let doc = part(&bytes, "word/document.xml");
    assert!(doc.contains("Baseline scenario: Rain-fed cotton &amp; soy"));
    assert!(!doc.contains("{{"));
}
