//! Integration tests for reference classification.

use fb_description::{
    Causality, Classification, ClassificationError, DeclaredType, ReferenceSubset, Variability,
    VariableDescription, load_json, load_yaml,
};
use fb_values::ScalarKind;
use proptest::prelude::*;

fn declared_type() -> impl Strategy<Value = DeclaredType> {
    prop_oneof![
        Just(DeclaredType::Real),
        Just(DeclaredType::Integer),
        Just(DeclaredType::Boolean),
        Just(DeclaredType::String),
        Just(DeclaredType::Enumeration),
    ]
}

fn variability() -> impl Strategy<Value = Variability> {
    prop_oneof![
        Just(Variability::Constant),
        Just(Variability::Parameter),
        Just(Variability::Discrete),
        Just(Variability::Continuous),
    ]
}

fn causality() -> impl Strategy<Value = Causality> {
    prop_oneof![
        Just(Causality::Input),
        Just(Causality::Output),
        Just(Causality::Internal),
        Just(Causality::None),
    ]
}

/// Variables with references unique per position.
fn variables() -> impl Strategy<Value = Vec<VariableDescription>> {
    prop::collection::vec((declared_type(), variability(), causality()), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (ty, var, cau))| {
                VariableDescription::new(format!("v{i}"), i as u32, ty)
                    .with_variability(var)
                    .with_causality(cau)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn subsets_are_nested(vars in variables()) {
        let c = Classification::classify(&vars).unwrap();
        prop_assert!(c.is_nested());

        let all = c.subset(ReferenceSubset::All).size();
        let start = c.subset(ReferenceSubset::Start).size();
        let event = c.subset(ReferenceSubset::Event).size();
        let continuous = c.subset(ReferenceSubset::Continuous).size();
        prop_assert_eq!(all, vars.len());
        prop_assert!(continuous <= event && event <= start && start <= all);
    }

    #[test]
    fn start_values_always_aligned(vars in variables()) {
        let c = Classification::classify(&vars).unwrap();
        prop_assert!(c.start_values().check_aligned(c.subset(ReferenceSubset::Start)).is_ok());
    }

    #[test]
    fn declaration_order_preserved_within_kind(vars in variables()) {
        let c = Classification::classify(&vars).unwrap();
        for kind in ScalarKind::ALL {
            let expected: Vec<u32> = vars
                .iter()
                .filter(|v| v.kind() == kind)
                .map(|v| v.value_reference)
                .collect();
            prop_assert_eq!(c.subset(ReferenceSubset::All).refs_of(kind), expected.as_slice());
        }
    }
}

#[test]
fn duplicate_in_loaded_description_is_flagged() {
    let yaml = r#"
model_name: dup
model_identifier: dup
guid: "{dup}"
variables:
  - { name: a, value_reference: 3, declared_type: integer }
  - { name: b, value_reference: 3, declared_type: enumeration }
"#;
    let path = std::env::temp_dir().join("fb_description_duplicate.yaml");
    std::fs::write(&path, yaml).unwrap();

    let err = load_yaml(&path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Duplicate"), "unexpected error: {msg}");
    assert!(matches!(
        err,
        fb_description::DescriptionError::Classification(
            ClassificationError::DuplicateReference { reference: 3, .. }
        )
    ));
}

#[test]
fn repeated_name_in_loaded_description_is_flagged() {
    let yaml = r#"
model_name: dup
model_identifier: dup
guid: "{dup}"
variables:
  - { name: speed, value_reference: 0, declared_type: real }
  - { name: speed, value_reference: 0, declared_type: integer }
"#;
    let path = std::env::temp_dir().join("fb_description_duplicate_name.yaml");
    std::fs::write(&path, yaml).unwrap();

    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(
        err,
        fb_description::DescriptionError::Classification(
            ClassificationError::DuplicateName { ref name }
        ) if name == "speed"
    ));
}

#[test]
fn json_description_loads() {
    let json = r#"{
        "model_name": "tank",
        "model_identifier": "tank",
        "guid": "{tank}",
        "number_of_continuous_states": 1,
        "variables": [
            {"name": "level", "value_reference": 0, "declared_type": "real", "start": 0.5},
            {"name": "open", "value_reference": 0, "declared_type": "boolean",
             "causality": "input", "variability": "discrete", "start": true}
        ]
    }"#;
    let path = std::env::temp_dir().join("fb_description_tank.json");
    std::fs::write(&path, json).unwrap();

    let md = load_json(&path).unwrap();
    assert_eq!(md.number_of_continuous_states, 1);
    let c = Classification::classify(&md.variables).unwrap();
    assert_eq!(c.subset(ReferenceSubset::Input).size(), 1);
    assert_eq!(c.start_values().to_string(), "[Real:|0.5|,Int:|,Bool:|true|,String:|]");
}
