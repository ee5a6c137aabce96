//! Builds form popups from the field catalog of `pdd_core`.

use pdd_core::{FieldKind, FieldSpec, FormStore, FormValue, Section};

use crate::components::popups::form::{FormField, FormFieldKind, FormPopup, FormSchema, FormState};

fn field_kind(kind: &FieldKind) -> FormFieldKind {
    match kind {
        FieldKind::Text => FormFieldKind::Text,
        FieldKind::Number { .. } | FieldKind::Integer { .. } => FormFieldKind::Number,
        FieldKind::Slider { min, max, step } => FormFieldKind::Slider {
            min: *min,
            max: *max,
            step: *step,
        },
        FieldKind::Choice { options } => FormFieldKind::Select {
            options: options.iter().map(|o| o.to_string()).collect(),
        },
        FieldKind::Upload => FormFieldKind::Path,
    }
}

fn form_field(spec: &'static FieldSpec) -> FormField {
    let mut field = FormField::new(spec.key, spec.label, field_kind(&spec.kind))
        .required(spec.required)
        .validator(move |value| spec.parse(value).map(|_| ()).map_err(|e| e.to_string()));
    if let Some(help) = spec.help {
        field = field.help(help);
    } else if spec.is_upload() {
        field = field.help("Path to a local file");
    }
    field
}

fn description(section: Section) -> &'static str {
    match section {
        Section::Project => {
            "Basic facts about the plantation. The carbon estimate is computed from these."
        }
        Section::Identification => "Who runs the project and under which methodology.",
        Section::Description => "What will be planted, where, and who holds the land.",
        Section::Baseline => "Land use that would continue without the project.",
        Section::Additionality => "Why the project would not happen without carbon finance.",
        Section::Monitoring => "How carbon stocks will be measured over the crediting period.",
        Section::Grouping => "Whether further plantation instances may join later.",
    }
}

pub fn schema_for(section: Section) -> FormSchema {
    let fields: Vec<FormField> = section.fields().iter().map(form_field).collect();
    let height = (fields.len() as u16 * 3 + 8).clamp(24, 40);
    FormSchema::new(section.to_string(), fields)
        .description(description(section))
        .min_size(76, height)
}

/// Prefill from committed values, falling back to the declared defaults.
///
/// Uploads already read into memory show up blank: their bytes are kept and
/// only a new path replaces them.
pub fn state_for(section: Section, store: &FormStore) -> FormState {
    let mut state = FormState::default();
    for spec in section.fields() {
        match store.get(spec.key) {
            Some(FormValue::Blob(_)) => {}
            Some(value) => state.set_value(spec.key, value.display_value()),
            None => {
                if let Some(default) = spec.default {
                    state.set_value(spec.key, default);
                }
            }
        }
    }
    state
}

pub fn form_popup(section: Section, store: &FormStore) -> FormPopup {
    FormPopup::new(section, schema_for(section)).with_state(state_for(section, store))
}

#[cfg(test)]
mod tests {
    use pdd_core::{Upload, inputs::keys};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn project_form_mirrors_catalog() {
        let schema = schema_for(Section::Project);
        assert_eq!(schema.fields.len(), Section::Project.fields().len());

        let density = schema.field_by_key(keys::TREE_DENSITY).unwrap();
        assert_eq!(
            density.kind,
            FormFieldKind::Slider {
                min: 100,
                max: 1000,
                step: 50
            }
        );
        assert!(density.required);

        let species = schema.field_by_key(keys::SPECIES).unwrap();
        assert!(matches!(species.kind, FormFieldKind::Select { .. }));
    }

    #[test]
    fn validators_use_catalog_parsing() {
        let schema = schema_for(Section::Project);
        let area = schema.field_by_key(keys::LAND_AREA).unwrap();
        let validate = area.validator.as_ref().unwrap();
        assert!(validate("12.5").is_ok());
        assert!(validate("abc").is_err());
        assert!(validate("0").is_err());
        assert!(validate("").is_err());

        let optional = schema.field_by_key(keys::DEVELOPER_NAME).unwrap();
        assert!((optional.validator.as_ref().unwrap())("").is_ok());
    }

    #[test]
    fn upload_fields_become_path_inputs() {
        let schema = schema_for(Section::Description);
        let map = schema.field_by_key("description.site_map").unwrap();
        assert_eq!(map.kind, FormFieldKind::Path);
        assert!(map.help.is_some());
    }

    #[test]
    fn state_prefers_committed_values_over_defaults() {
        let mut store = FormStore::new();
        store.set(keys::TREE_DENSITY, FormValue::Int(650));

        let state = state_for(Section::Project, &store);
        assert_eq!(state.get_value(keys::TREE_DENSITY), Some("650"));
        assert_eq!(state.get_value(keys::DURATION), Some("20"));
        assert_eq!(state.get_value(keys::LOCATION), None);
    }

    #[test]
    fn uploaded_blobs_are_not_prefilled() {
        let mut store = FormStore::new();
        store.set(
            "description.site_map",
            FormValue::Blob(Upload {
                file_name: "map.png".into(),
                bytes: vec![1, 2, 3],
            }),
        );
        let state = state_for(Section::Description, &store);
        assert_eq!(state.get_value("description.site_map"), None);
    }
}
