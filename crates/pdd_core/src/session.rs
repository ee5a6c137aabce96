//! One wizard session: the form store plus the step handlers working on it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use strum::{Display, IntoEnumIterator};
use tracing::{Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::catalog::Section;
use crate::errors::SessionError;
use crate::estimator::{EstimationResult, Methodology, format_tons};
use crate::inputs::ProjectInputs;
use crate::render::DocumentRenderer;
use crate::store::{FormData, FormStore, FormValue};

/// Keys added to the render context on top of the form values.
pub mod context_keys {
    pub const TOTAL_TREES: &str = "estimate.total_trees";
    pub const TOTAL_BIOMASS: &str = "estimate.total_biomass_tons";
    pub const CARBON_CONTENT: &str = "estimate.carbon_content_tons";
    pub const CO2E: &str = "estimate.co2e_tons";
    pub const BUFFER_DEDUCTION: &str = "estimate.buffer_deduction_tons";
    pub const BUFFER_PERCENT: &str = "estimate.buffer_percent";
    pub const USABLE_CREDITS: &str = "estimate.usable_credits_tons";
    pub const GENERATED_ON: &str = "meta.generated_on";
    pub const SESSION_ID: &str = "meta.session_id";
}

/// How far a session has progressed. Later states never discard data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum SessionState {
    #[strum(to_string = "empty")]
    Empty,
    #[strum(to_string = "partially filled")]
    PartiallyFilled,
    #[strum(to_string = "filled")]
    Filled,
    #[strum(to_string = "estimated")]
    Estimated,
    #[strum(to_string = "rendered")]
    Rendered,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    store: FormStore,
    methodology: Methodology,
    estimated: bool,
    rendered: bool,
    span: Span,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_methodology(Methodology::default())
    }

    pub fn with_methodology(methodology: Methodology) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("session", %id);
        span.in_scope(|| info!("session started"));
        Self {
            id,
            store: FormStore::new(),
            methodology,
            estimated: false,
            rendered: false,
            span,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn methodology(&self) -> &Methodology {
        &self.methodology
    }

    pub fn commit(&mut self, key: impl Into<String>, value: FormValue) {
        let _guard = self.span.enter();
        self.store.set(key, value);
    }

    /// Write already-parsed values of one section.
    pub fn commit_section<K, I>(&mut self, section: Section, values: I) -> usize
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FormValue)>,
    {
        let _guard = self.span.enter();
        let mut count = 0;
        for (key, value) in values {
            let key = key.into();
            if !key.starts_with(section.key()) {
                warn!(%key, section = section.key(), "key committed outside its section");
            }
            self.store.set(key, value);
            count += 1;
        }
        info!(section = section.key(), count, "section saved");
        count
    }

    /// Parse the raw form text of a section and commit it.
    ///
    /// Every field is parsed (and every upload read) before anything is
    /// written, so a rejected submit leaves the store untouched. Fields left
    /// out of `raw` count as blank.
    pub fn submit_section<'a, I>(
        &mut self,
        section: Section,
        raw: I,
        upload_limit: Option<u64>,
    ) -> Result<usize, SessionError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let raw: BTreeMap<&str, &str> = raw.into_iter().collect();
        for key in raw.keys().filter(|k| section.field(k).is_none()) {
            debug!(%key, section = section.key(), "ignoring unknown field");
        }

        let mut parsed = Vec::new();
        for field in section.fields() {
            let text = raw.get(field.key).copied().unwrap_or_default();
            let value = match field.parse(text)? {
                None => continue,
                Some(FormValue::Text(path)) if field.is_upload() => {
                    FormValue::read_upload(Path::new(&path), upload_limit)?
                }
                Some(value) => value,
            };
            parsed.push((field.key, value));
        }

        if section == Section::Project {
            let mut staged = FormStore::new();
            for (key, value) in &parsed {
                staged.set(*key, value.clone());
            }
            let inputs = ProjectInputs::from_store(&staged).map_err(|missing| {
                SessionError::PrerequisiteMissing {
                    step: "project details",
                    missing,
                }
            })?;
            inputs.validate()?;
        }

        Ok(self.commit_section(section, parsed))
    }

    /// Validate and store the project-details step.
    pub fn submit_project_inputs(&mut self, inputs: &ProjectInputs) -> Result<(), SessionError> {
        inputs.validate()?;
        self.commit_section(Section::Project, inputs.to_form_values());
        Ok(())
    }

    pub fn project_inputs(&self) -> Result<ProjectInputs, SessionError> {
        ProjectInputs::from_store(&self.store).map_err(|missing| {
            SessionError::PrerequisiteMissing {
                step: "estimate",
                missing,
            }
        })
    }

    /// Compute the estimate from the committed project inputs.
    ///
    /// Nothing is written back to the store.
    pub fn estimate(&mut self) -> Result<EstimationResult, SessionError> {
        let _guard = self.span.enter();
        let inputs = match self.project_inputs() {
            Ok(inputs) => inputs,
            Err(err) => {
                warn!(%err, "estimate requested before project details");
                return Err(err);
            }
        };
        let result = self.methodology.estimate(&inputs);
        self.estimated = true;
        info!(
            species = %inputs.species,
            co2e = result.co2e_tons,
            usable = result.usable_credits_tons,
            "estimate computed"
        );
        Ok(result)
    }

    /// Snapshot of the store plus the estimate and document metadata.
    pub fn render_context(&self) -> FormData {
        let mut context = self.store.snapshot();

        if let Ok(inputs) = self.project_inputs() {
            let result = self.methodology.estimate(&inputs);
            let total_trees =
                inputs.land_area_hectares * f64::from(inputs.tree_density_per_hectare);
            let text = |v: f64| FormValue::Text(format_tons(v));
            context.insert(context_keys::TOTAL_TREES.into(), text(total_trees));
            context.insert(
                context_keys::TOTAL_BIOMASS.into(),
                text(result.total_biomass_tons),
            );
            context.insert(
                context_keys::CARBON_CONTENT.into(),
                text(result.carbon_content_tons),
            );
            context.insert(context_keys::CO2E.into(), text(result.co2e_tons));
            context.insert(
                context_keys::BUFFER_DEDUCTION.into(),
                text(result.buffer_deduction_tons),
            );
            context.insert(
                context_keys::BUFFER_PERCENT.into(),
                text(self.methodology.buffer_percent()),
            );
            context.insert(
                context_keys::USABLE_CREDITS.into(),
                text(result.usable_credits_tons),
            );
        }

        context.insert(
            context_keys::GENERATED_ON.into(),
            FormValue::Text(chrono::Local::now().format("%Y-%m-%d").to_string()),
        );
        context.insert(
            context_keys::SESSION_ID.into(),
            FormValue::Text(self.id.to_string()),
        );
        context
    }

    /// Render the PDD into memory. The session state is not changed; only a
    /// saved document counts as rendered.
    pub fn render(
        &self,
        renderer: &DocumentRenderer,
        template: &Path,
    ) -> Result<Vec<u8>, SessionError> {
        let _guard = self.span.enter();
        let context = self.render_context();
        Ok(renderer.render(template, &context)?)
    }

    /// Render the PDD and write it to `dest`.
    ///
    /// The bytes go to a temporary file next to `dest` which is renamed over
    /// it once complete, so a failure never leaves a partial document behind
    /// and an earlier one survives. The session is marked rendered only after
    /// the rename.
    pub fn save_document(
        &mut self,
        renderer: &DocumentRenderer,
        template: &Path,
        dest: &Path,
    ) -> Result<PathBuf, SessionError> {
        let bytes = self.render(renderer, template)?;

        let _guard = self.span.enter();
        let save_err = |source| SessionError::Save {
            path: dest.to_path_buf(),
            source,
        };
        let dir = match dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(save_err)?;

        let mut file = tempfile::Builder::new()
            .prefix(".pdd-save-")
            .suffix(".docx")
            .tempfile_in(&dir)
            .map_err(save_err)?;
        file.write_all(&bytes).map_err(save_err)?;
        file.as_file().sync_all().map_err(save_err)?;
        file.persist(dest).map_err(|e| save_err(e.error))?;

        self.rendered = true;
        info!(path = %dest.display(), len = bytes.len(), "PDD saved");
        Ok(dest.to_path_buf())
    }

    pub fn section_progress(&self, section: Section) -> (usize, usize) {
        section.progress(&self.store)
    }

    /// Required catalog fields not yet committed, across all sections.
    pub fn missing_required(&self) -> Vec<&'static str> {
        Section::iter()
            .flat_map(|s| s.missing_required(&self.store))
            .collect()
    }

    pub fn state(&self) -> SessionState {
        if self.rendered {
            SessionState::Rendered
        } else if self.estimated {
            SessionState::Estimated
        } else if self.store.is_empty() {
            SessionState::Empty
        } else if self.missing_required().is_empty() {
            SessionState::Filled
        } else {
            SessionState::PartiallyFilled
        }
    }
}
