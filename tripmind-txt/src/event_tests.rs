//! Unit tests for change-line classification.

use super::*;

fn classifier() -> Classifier {
    Classifier::new().unwrap()
}

// -------------------------------------------------------------------------
// Single-form lines
// -------------------------------------------------------------------------

#[test]
fn test_role() {
    let event = classifier().classify("Role: Russians").unwrap();
    assert_eq!(
        event,
        ChangeEvent::Role {
            player: "Russians".to_string()
        }
    );
}

#[test]
fn test_ownership() {
    let event = classifier()
        .classify("Russians takes Berlin from Germans")
        .unwrap();
    assert_eq!(
        event,
        ChangeEvent::Ownership {
            player: "Russians".to_string(),
            territory: "Berlin".to_string(),
            previous_owner: "Germans".to_string(),
        }
    );
}

#[test]
fn test_add_units_to_territory() {
    let line = "Add unit change.  Add to: Berlin units: [infantry owned by Germans, armour owned by Germans]";
    let event = classifier().classify(line).unwrap();
    let ChangeEvent::AddUnits { target, units } = event else {
        panic!("expected add-units, got {event:?}");
    };
    assert_eq!(target, "Berlin");
    assert_eq!(units.len(), 2);
    assert_eq!(units[1].unit, "armour");
    assert_eq!(units[1].owner, "Germans");
}

#[test]
fn test_add_units_strips_composite_tail() {
    // Last fragment of an unclosed composite keeps the trailing markers
    let line = "Add unit change.  Add to: Russians units: [infantry owned by Russians]]>";
    let event = classifier().classify(line).unwrap();
    let ChangeEvent::AddUnits { target, units } = event else {
        panic!("expected add-units, got {event:?}");
    };
    assert_eq!(target, "Russians");
    assert_eq!(
        units,
        vec![UnitToken {
            unit: "infantry".to_string(),
            owner: "Russians".to_string()
        }]
    );
}

#[test]
fn test_remove_units() {
    let line = "Remove unit change.  Remove from: Warsaw units: [infantry owned by Russians]";
    let event = classifier().classify(line).unwrap();
    assert!(matches!(
        event,
        ChangeEvent::RemoveUnits { ref target, ref units } if target == "Warsaw" && units.len() == 1
    ));
}

#[test]
fn test_resource_negative() {
    let event = classifier()
        .classify("Change resource.  Resource:PUs quantity:-6 Player:Russians")
        .unwrap();
    assert_eq!(
        event,
        ChangeEvent::Resource {
            player: "Russians".to_string(),
            quantity: -6
        }
    );
}

#[test]
fn test_resource_overflow_is_malformed() {
    let err = classifier()
        .classify("Resource:PUs quantity:99999999999999999999999 Player:Russians")
        .unwrap_err();
    assert!(matches!(err, ParseError::MalformedField { field: "quantity", .. }));
}

#[test]
fn test_property() {
    let line = "Property change, unit:armour owned by Russians property:wasInCombat newValue:true oldValue:false";
    let event = classifier().classify(line).unwrap();
    assert_eq!(
        event,
        ChangeEvent::Property {
            unit: "armour".to_string(),
            owner: "Russians".to_string(),
            property: "wasInCombat".to_string(),
            new_value: "true".to_string(),
            old_value: "false".to_string(),
        }
    );
}

#[test]
fn test_battle_records() {
    let line = "Adding Battle Records: [Russians=[3fa2c1:Russians attack Germans battle in Berlin, 9b0e:Russians attack Germans battle in Warsaw]]";
    let event = classifier().classify(line).unwrap();
    let ChangeEvent::BattleRecords { battles } = event else {
        panic!("expected battle records, got {event:?}");
    };
    let territories: Vec<_> = battles.iter().map(|b| b.territory.as_str()).collect();
    assert_eq!(territories, vec!["Berlin", "Warsaw"]);
    assert_eq!(battles[0].id, "3fa2c1");
}

#[test]
fn test_unrecognized() {
    let err = classifier().classify("Something the engine said").unwrap_err();
    assert_eq!(
        err,
        ParseError::Unrecognized {
            line: "Something the engine said".to_string()
        }
    );
}

// -------------------------------------------------------------------------
// Composite lines
// -------------------------------------------------------------------------

#[test]
fn test_composite_fragments_in_order() {
    let line = "CompositeChange <[Russians takes Berlin from Germans, Add unit change.  Add to: Berlin units: [armour owned by Russians, infantry owned by Russians], Change resource.  Resource:PUs quantity:-3 Player:Germans]>";
    let event = classifier().classify(line).unwrap();
    let ChangeEvent::Composite { fragments, closed } = event else {
        panic!("expected composite, got {event:?}");
    };
    assert!(closed);
    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0], "Russians takes Berlin from Germans");
    assert!(fragments[1].starts_with("Add unit change"));
    assert!(fragments[2].contains("quantity:-3"));
}

#[test]
fn test_composite_without_block() {
    let err = classifier().classify("CompositeChange (empty)").unwrap_err();
    assert_eq!(err, ParseError::MissingCompositeBlock);
}

#[test]
fn test_composite_takes_precedence_over_inner_forms() {
    // Contains an ownership phrase, but the composite wrapper must win
    let line = "CompositeChange <[Germans takes Warsaw from Russians]>";
    let event = classifier().classify(line).unwrap();
    assert_eq!(event.kind(), "composite");
}

// -------------------------------------------------------------------------
// Purchase choice
// -------------------------------------------------------------------------

#[test]
fn test_purchase_choice_sums_and_lowercases() {
    let purchase = classifier()
        .purchase_choice("ProductionRule:buyArtillery -> 1 ProductionRule:buyInfantry -> 2 ProductionRule:buyInfantry -> 1")
        .unwrap();
    assert_eq!(purchase.get("artillery"), Some(&1));
    assert_eq!(purchase.get("infantry"), Some(&3));
    assert_eq!(purchase.len(), 2);
}

#[test]
fn test_purchase_choice_empty() {
    assert!(classifier().purchase_choice("nothing bought").is_none());
}
