use domain::{DeviceVariant, logo_slot_choices, pip_recall_choices};

fn ids(variant: DeviceVariant) -> Vec<i64> {
    variant.input_choices().iter().map(|choice| choice.id).collect()
}

#[test]
fn pds701_has_sdi_but_no_extra_dvi() {
    assert_eq!(ids(DeviceVariant::Pds701), vec![1, 2, 3, 4, 5, 6, 9, 10]);
}

#[test]
fn pds901_swaps_sdi_for_two_dvi_inputs() {
    let inputs_701 = ids(DeviceVariant::Pds701);
    let inputs_901 = ids(DeviceVariant::Pds901);

    assert!(!inputs_901.contains(&9));
    assert!(inputs_901.contains(&7) && inputs_901.contains(&8));
    assert!(!inputs_701.contains(&7) && !inputs_701.contains(&8));

    let labels: Vec<String> = DeviceVariant::Pds901
        .input_choices()
        .into_iter()
        .map(|choice| choice.label)
        .collect();
    assert!(labels.contains(&"7 DVI".to_string()));
    assert!(labels.contains(&"8 DVI".to_string()));
}

#[test]
fn pds902_has_every_input() {
    assert_eq!(ids(DeviceVariant::Pds902), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
}

#[test]
fn black_logo_entry_is_always_last() {
    for variant in DeviceVariant::ALL {
        let choices = variant.input_choices();
        let last = choices.last().expect("choices");
        assert_eq!(last.id, 10);
        assert_eq!(last.label, "Black/Logo");
    }
}

#[test]
fn variant_parses_ids_models_and_labels() {
    assert_eq!("2".parse::<DeviceVariant>(), Ok(DeviceVariant::Pds901));
    assert_eq!("902".parse::<DeviceVariant>(), Ok(DeviceVariant::Pds902));
    assert_eq!("PDS-701".parse::<DeviceVariant>(), Ok(DeviceVariant::Pds701));
    assert!("801".parse::<DeviceVariant>().is_err());
    assert_eq!(DeviceVariant::try_from(3u8), Ok(DeviceVariant::Pds902));
}

#[test]
fn variant_deserializes_from_numeric_id() {
    let variant: DeviceVariant = serde_json::from_str("2").expect("variant");
    assert_eq!(variant, DeviceVariant::Pds901);
    assert!(serde_json::from_str::<DeviceVariant>("7").is_err());
    assert_eq!(serde_json::to_string(&DeviceVariant::Pds902).expect("json"), "3");
}

#[test]
fn fixed_choice_sets() {
    assert_eq!(logo_slot_choices().len(), 3);
    assert_eq!(pip_recall_choices().len(), 10);
    assert_eq!(pip_recall_choices()[9].label, "10");
}
