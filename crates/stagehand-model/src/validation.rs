use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::field::{Cardinality, FieldType};
use crate::model::ContentModel;

/// Checks structural invariants of a content model.
///
/// Verifies name uniqueness, that reference settings appear on exactly the
/// reference field types, that list fields carry their options, and that
/// every reference target resolves inside the model.
pub fn validate_model(model: &ContentModel) -> Result<()> {
    if model.model_version.trim().is_empty() {
        return Err(Error::InvalidModel("model_version is empty".to_string()));
    }

    // First pass: catalog names and check per-field invariants.
    let mut catalog: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for entity_type in &model.entity_types {
        if entity_type.name.trim().is_empty() {
            return Err(Error::InvalidModel("entity type with empty name".to_string()));
        }
        if catalog.contains_key(entity_type.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "duplicate entity type: {}",
                entity_type.name
            )));
        }
        let bundles = catalog.entry(entity_type.name.as_str()).or_default();

        for bundle in &entity_type.bundles {
            if bundle.name.trim().is_empty() {
                return Err(Error::InvalidModel(format!(
                    "entity type {} has a bundle with empty name",
                    entity_type.name
                )));
            }
            if !bundles.insert(bundle.name.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "duplicate bundle: {}.{}",
                    entity_type.name, bundle.name
                )));
            }

            let mut field_names: BTreeSet<&str> = BTreeSet::new();
            for field in &bundle.fields {
                let field_path =
                    format!("{}.{}.{}", entity_type.name, bundle.name, field.name);
                if field.name.trim().is_empty() {
                    return Err(Error::InvalidModel(format!(
                        "bundle {}.{} has a field with empty name",
                        entity_type.name, bundle.name
                    )));
                }
                if !field_names.insert(field.name.as_str()) {
                    return Err(Error::InvalidModel(format!(
                        "duplicate field: {field_path}"
                    )));
                }
                if field.cardinality == Cardinality::Limited(0) {
                    return Err(Error::InvalidModel(format!(
                        "field {field_path} has cardinality 0"
                    )));
                }
                if field.field_type.is_reference() && field.reference.is_none() {
                    return Err(Error::InvalidModel(format!(
                        "reference field {field_path} has no reference settings"
                    )));
                }
                if !field.field_type.is_reference() && field.reference.is_some() {
                    return Err(Error::InvalidModel(format!(
                        "field {field_path} is not a reference but carries reference settings"
                    )));
                }
                if field.field_type == FieldType::ListString {
                    match &field.allowed_values {
                        Some(values) if !values.is_empty() => {}
                        _ => {
                            return Err(Error::InvalidModel(format!(
                                "list field {field_path} has no allowed values"
                            )));
                        }
                    }
                } else if field.allowed_values.is_some() {
                    return Err(Error::InvalidModel(format!(
                        "field {field_path} is not a list but carries allowed values"
                    )));
                }
                if field.max_length.is_some() && !field.field_type.is_textual() {
                    return Err(Error::InvalidModel(format!(
                        "field {field_path} of type {:?} cannot carry max_length",
                        field.field_type
                    )));
                }
            }
        }

        // The label key must exist as a base field on every bundle.
        if let Some(label_key) = entity_type.label_key.as_deref() {
            for bundle in &entity_type.bundles {
                match bundle.field(label_key) {
                    Some(field) if field.base_field => {}
                    Some(_) => {
                        return Err(Error::InvalidModel(format!(
                            "label key field {}.{}.{} is not a base field",
                            entity_type.name, bundle.name, label_key
                        )));
                    }
                    None => {
                        return Err(Error::InvalidModel(format!(
                            "label key field not found: {}.{}.{}",
                            entity_type.name, bundle.name, label_key
                        )));
                    }
                }
            }
        }
    }

    // Second pass: reference targets must resolve inside the model.
    for entity_type in &model.entity_types {
        for bundle in &entity_type.bundles {
            for field in &bundle.fields {
                let Some(reference) = &field.reference else {
                    continue;
                };
                let field_path =
                    format!("{}.{}.{}", entity_type.name, bundle.name, field.name);
                let Some(target_bundles) = catalog.get(reference.target_type.as_str()) else {
                    return Err(Error::InvalidModel(format!(
                        "field {field_path} references unknown entity type {}",
                        reference.target_type
                    )));
                };
                if let Some(listed) = &reference.target_bundles {
                    for name in listed {
                        if !target_bundles.contains(name.as_str()) {
                            return Err(Error::InvalidModel(format!(
                                "field {field_path} references unknown bundle {}.{}",
                                reference.target_type, name
                            )));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
