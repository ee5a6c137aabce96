//! Fill a DOCX template from a [`FormData`] snapshot.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::TemplateRenderError;
use crate::store::FormData;
use crate::template::{fill_placeholders, is_template_part};

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File name offered for the generated document.
pub const DEFAULT_FILE_NAME: &str = "Agroforestry_PDD.docx";

const MAIN_PART: &str = "word/document.xml";

/// Renders DOCX templates.
///
/// The output is assembled in a named scratch file which is removed on every
/// exit path; callers only ever see the finished bytes.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    scratch_dir: Option<PathBuf>,
    required: BTreeSet<String>,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory for scratch files; the system temp dir when unset.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Keys that must have a value whenever the template references them.
    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn render(
        &self,
        template_path: &Path,
        context: &FormData,
    ) -> Result<Vec<u8>, TemplateRenderError> {
        let template = File::open(template_path).map_err(|source| {
            TemplateRenderError::TemplateMissing {
                path: template_path.to_path_buf(),
                source,
            }
        })?;
        let corrupt = |source| TemplateRenderError::Corrupt {
            path: template_path.to_path_buf(),
            source,
        };
        let mut archive = ZipArchive::new(template).map_err(corrupt)?;
        if !archive.file_names().any(|name| name == MAIN_PART) {
            return Err(corrupt(ZipError::FileNotFound));
        }

        let scratch_dir = self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
        let mut scratch = tempfile::Builder::new()
            .prefix("pdd-render-")
            .suffix(".docx")
            .tempfile_in(&scratch_dir)?;
        debug!(scratch = %scratch.path().display(), "rendering into scratch file");

        {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            let mut writer = ZipWriter::new(scratch.as_file_mut());
            let mut referenced = BTreeSet::new();

            for index in 0..archive.len() {
                let mut entry = archive.by_index(index)?;
                let name = entry.name().to_string();
                if entry.is_dir() || !is_template_part(&name) {
                    writer.raw_copy_file(entry)?;
                    continue;
                }

                let mut raw = Vec::new();
                entry.read_to_end(&mut raw)?;
                let xml = String::from_utf8(raw)
                    .map_err(|_| TemplateRenderError::Encoding { part: name.clone() })?;
                let filled = fill_placeholders(&xml, &name, context)?;
                referenced.extend(filled.referenced);

                writer.start_file(name, options)?;
                writer.write_all(filled.xml.as_bytes())?;
            }

            let missing: Vec<String> = self
                .required
                .iter()
                .filter(|key| referenced.contains(*key) && !context.contains_key(*key))
                .cloned()
                .collect();
            if !missing.is_empty() {
                warn!(?missing, "required placeholders have no value");
                return Err(TemplateRenderError::MissingPlaceholders(missing));
            }

            writer.finish()?;
        }

        let file = scratch.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        scratch.close()?;

        info!(
            template = %template_path.display(),
            len = bytes.len(),
            "document rendered"
        );
        Ok(bytes)
    }
}
