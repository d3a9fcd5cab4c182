use serde_json::json;
use stagehand_model::{
    BundleDef, Cardinality, ContentModel, EntityTypeDef, FieldDefinition, FieldType, FieldValue,
};

#[test]
fn serializes_model_deterministically() {
    let model = ContentModel {
        model_version: "0.1".to_string(),
        site: Some("staging.example.com".to_string()),
        entity_types: vec![EntityTypeDef {
            name: "node".to_string(),
            label_key: Some("title".to_string()),
            revisionable: true,
            bundles: vec![BundleDef {
                name: "landing_page".to_string(),
                label: Some("Landing page".to_string()),
                fields: Vec::new(),
            }],
        }],
        model_fingerprint: None,
    };

    let json = serde_json::to_string_pretty(&model).expect("serialize model");
    let expected = r#"{
  "model_version": "0.1",
  "site": "staging.example.com",
  "entity_types": [
    {
      "name": "node",
      "label_key": "title",
      "revisionable": true,
      "bundles": [
        {
          "name": "landing_page",
          "label": "Landing page",
          "fields": []
        }
      ]
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn field_defaults_apply_on_deserialize() {
    let field: FieldDefinition = serde_json::from_value(json!({
        "name": "field_summary",
        "field_type": "string_long"
    }))
    .expect("parse field");

    assert_eq!(field.cardinality, Cardinality::Limited(1));
    assert!(!field.required);
    assert!(!field.base_field);
    assert!(field.label.is_none());
    assert!(field.reference.is_none());
}

#[test]
fn cardinality_round_trips_through_wire_integer() {
    let unlimited: FieldDefinition = serde_json::from_value(json!({
        "name": "field_components",
        "field_type": "reference_revisions",
        "cardinality": -1,
        "reference": { "target_type": "paragraph" }
    }))
    .expect("parse unlimited field");
    assert!(unlimited.cardinality.is_unlimited());
    assert_eq!(unlimited.cardinality.limit(), None);

    let limited: FieldDefinition = serde_json::from_value(json!({
        "name": "field_captions",
        "field_type": "string",
        "cardinality": 3
    }))
    .expect("parse limited field");
    assert_eq!(limited.cardinality, Cardinality::Limited(3));
    assert_eq!(limited.cardinality.limit(), Some(3));

    let serialized = serde_json::to_value(&unlimited).expect("serialize field");
    assert_eq!(serialized["cardinality"], json!(-1));
}

#[test]
fn invalid_cardinality_is_rejected() {
    for raw in [0, -2] {
        let result: Result<FieldDefinition, _> = serde_json::from_value(json!({
            "name": "field_bad",
            "field_type": "string",
            "cardinality": raw
        }));
        assert!(result.is_err(), "cardinality {raw} should not parse");
    }
}

#[test]
fn field_values_serialize_with_type_keys() {
    let reference = FieldValue::Reference {
        target_id: 4,
        target_revision_id: Some(9),
    };
    assert_eq!(
        serde_json::to_value(&reference).expect("serialize reference"),
        json!({ "reference": { "target_id": 4, "target_revision_id": 9 } })
    );

    let link = FieldValue::Link {
        uri: "https://www.example.com/about".to_string(),
        title: None,
    };
    assert_eq!(
        serde_json::to_value(&link).expect("serialize link"),
        json!({ "link": { "uri": "https://www.example.com/about" } })
    );

    assert_eq!(
        serde_json::to_value(FieldValue::Timestamp(1_700_000_000)).expect("serialize timestamp"),
        json!({ "timestamp": 1_700_000_000 })
    );
}

#[test]
fn reference_accessor_returns_ids() {
    let value = FieldValue::Reference {
        target_id: 12,
        target_revision_id: Some(30),
    };
    assert_eq!(value.as_reference(), Some((12, Some(30))));
    assert!(value.is_reference());
    assert_eq!(FieldValue::Text("x".to_string()).as_reference(), None);
}

#[test]
fn field_type_classifiers() {
    assert!(FieldType::ReferenceRevisions.is_reference());
    assert!(FieldType::Reference.is_reference());
    assert!(!FieldType::String.is_reference());
    assert!(FieldType::Email.is_textual());
    assert!(!FieldType::Integer.is_textual());
}
