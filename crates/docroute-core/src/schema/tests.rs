//! Tests for schema descriptors, validation and the registry

use super::*;
use crate::{DocrouteError, FieldErrorKind};
use serde_json::{Value, json};

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn grocery() -> SchemaDescriptor {
    SchemaRegistry::with_defaults()
        .resolve(GROCERY_INVENTORY)
        .unwrap()
}

fn valid_item() -> Document {
    doc(json!({
        "item": "apple",
        "price_in_usd": 1.25,
        "food_group": "fruits",
        "test": "yes"
    }))
}

fn validation_failure(result: Result<Document>) -> crate::ValidationFailure {
    match result {
        Err(DocrouteError::Validation(failure)) => failure,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

mod registry_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_register_builtin_types() {
        let registry = SchemaRegistry::with_defaults();
        assert_eq!(registry.type_names(), vec![EMPLOYEES, GROCERY_INVENTORY]);
        assert!(registry.has(GROCERY_INVENTORY));
        assert!(!registry.has("GroceryItem"));
    }

    #[test]
    fn test_resolve_unknown_type_is_none() {
        let registry = SchemaRegistry::with_defaults();
        assert!(registry.resolve("Invoices").is_none());
    }

    #[test]
    fn test_types_are_bound_to_their_own_collection() {
        let registry = SchemaRegistry::with_defaults();
        assert_eq!(
            registry.type_for_collection(GROCERY_INVENTORY),
            Some(GROCERY_INVENTORY)
        );
        let descriptor = registry.descriptor_for_collection("Employees");
        assert_eq!(descriptor.type_name(), Some(EMPLOYEES));
    }

    #[test]
    fn test_unbound_collection_gets_open_schema() {
        let registry = SchemaRegistry::with_defaults();
        assert!(registry.descriptor_for_collection("bank_users").is_open());
        // lookups are case sensitive
        assert!(registry.descriptor_for_collection("groceryinventory").is_open());
    }

    #[test]
    fn test_bind_reuses_schema_for_other_collection() {
        let mut registry = SchemaRegistry::with_defaults();
        registry.bind("produce", GROCERY_INVENTORY).unwrap();
        let descriptor = registry.descriptor_for_collection("produce");
        assert_eq!(descriptor.type_name(), Some(GROCERY_INVENTORY));
    }

    #[test]
    fn test_bind_unknown_type_fails() {
        let mut registry = SchemaRegistry::with_defaults();
        let err = registry.bind("produce", "Produce").unwrap_err();
        assert!(matches!(err, DocrouteError::Configuration(ref msg) if msg.contains("Produce")));
        assert!(registry.descriptor_for_collection("produce").is_open());
    }

    #[test]
    fn test_bind_empty_collection_fails() {
        let mut registry = SchemaRegistry::with_defaults();
        assert!(matches!(
            registry.bind("", GROCERY_INVENTORY),
            Err(DocrouteError::InvalidName(_))
        ));
    }

    #[test]
    fn test_resolved_descriptors_share_schema() {
        let registry = SchemaRegistry::with_defaults();
        let (Some(SchemaDescriptor::Predefined(a)), Some(SchemaDescriptor::Predefined(b))) = (
            registry.resolve(GROCERY_INVENTORY),
            registry.resolve(GROCERY_INVENTORY),
        ) else {
            panic!("expected predefined descriptors");
        };
        assert!(Arc::ptr_eq(&a, &b));
    }
}

mod insert_validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_document_passes() {
        let prepared = grocery().prepare_insert(valid_item()).unwrap();
        assert_eq!(prepared, valid_item());
    }

    #[test]
    fn test_missing_required_field_fails_with_custom_message() {
        let mut item = valid_item();
        item.remove("item");
        let failure = validation_failure(grocery().prepare_insert(item));
        assert_eq!(failure.model, "GroceryItem");
        let error = failure.field("item").unwrap();
        assert_eq!(error.kind, FieldErrorKind::Required);
        assert_eq!(error.message, "item name is required");
    }

    #[test]
    fn test_all_failures_are_collected() {
        let failure = validation_failure(grocery().prepare_insert(doc(json!({}))));
        assert_eq!(failure.errors.len(), 4);
        assert_eq!(
            failure.to_string(),
            "GroceryItem validation failed: item: item name is required, \
             price_in_usd: Please enter a number for price_in_usd, \
             food_group: food_group is required, test: The property test is required"
        );
    }

    #[test]
    fn test_null_and_empty_string_count_as_missing() {
        let mut item = valid_item();
        item.insert("item".into(), Value::Null);
        item.insert("test".into(), json!(""));
        let failure = validation_failure(grocery().prepare_insert(item));
        assert_eq!(failure.field("item").unwrap().kind, FieldErrorKind::Required);
        assert_eq!(failure.field("test").unwrap().kind, FieldErrorKind::Required);
    }

    #[test]
    fn test_enum_violation() {
        let mut item = valid_item();
        item.insert("food_group".into(), json!("candy"));
        let failure = validation_failure(grocery().prepare_insert(item));
        let error = failure.field("food_group").unwrap();
        assert_eq!(error.kind, FieldErrorKind::Enum);
        assert_eq!(
            error.message,
            "`candy` is not a valid enum value for path `food_group`."
        );
    }

    #[test]
    fn test_numeric_string_is_cast_to_number() {
        let mut item = valid_item();
        item.insert("price_in_usd".into(), json!(" 3 "));
        let prepared = grocery().prepare_insert(item).unwrap();
        assert_eq!(prepared["price_in_usd"], json!(3));

        let mut item = valid_item();
        item.insert("price_in_usd".into(), json!("2.5"));
        let prepared = grocery().prepare_insert(item).unwrap();
        assert_eq!(prepared["price_in_usd"], json!(2.5));
    }

    #[test]
    fn test_non_numeric_string_fails_cast() {
        let mut item = valid_item();
        item.insert("price_in_usd".into(), json!("cheap"));
        let failure = validation_failure(grocery().prepare_insert(item));
        let error = failure.field("price_in_usd").unwrap();
        assert_eq!(error.kind, FieldErrorKind::Cast);
        assert!(error.message.starts_with("Cast to Number failed for value \"cheap\""));
    }

    #[test]
    fn test_number_is_cast_to_string() {
        let mut item = valid_item();
        item.insert("test".into(), json!(7));
        let prepared = grocery().prepare_insert(item).unwrap();
        assert_eq!(prepared["test"], json!("7"));
    }

    #[test]
    fn test_object_does_not_cast_to_string() {
        let mut item = valid_item();
        item.insert("item".into(), json!({ "name": "apple" }));
        let failure = validation_failure(grocery().prepare_insert(item));
        assert_eq!(failure.field("item").unwrap().kind, FieldErrorKind::Cast);
    }

    #[test]
    fn test_undeclared_fields_and_id_are_dropped() {
        let mut item = valid_item();
        item.insert("color".into(), json!("red"));
        item.insert("_id".into(), json!("65f1c2a9e4b0a1b2c3d4e5f6"));
        let prepared = grocery().prepare_insert(item).unwrap();
        assert!(!prepared.contains_key("color"));
        assert!(!prepared.contains_key("_id"));
    }

    #[test]
    fn test_optional_field_may_be_absent_or_null() {
        let registry = SchemaRegistry::with_defaults();
        let employees = registry.resolve(EMPLOYEES).unwrap();
        let person = doc(json!({
            "name": "Ada",
            "position": "engineer",
            "department": "engineering"
        }));
        let prepared = employees.prepare_insert(person.clone()).unwrap();
        assert!(!prepared.contains_key("salary"));

        let mut with_null = person;
        with_null.insert("salary".into(), Value::Null);
        let prepared = employees.prepare_insert(with_null).unwrap();
        assert_eq!(prepared["salary"], Value::Null);
    }
}

mod update_validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_update_only_checks_supplied_fields() {
        let changes = doc(json!({ "price_in_usd": "4" }));
        let prepared = grocery().prepare_update(changes).unwrap();
        assert_eq!(prepared, doc(json!({ "price_in_usd": 4 })));
    }

    #[test]
    fn test_update_enum_violation() {
        let changes = doc(json!({ "food_group": "snacks" }));
        let failure = validation_failure(grocery().prepare_update(changes));
        assert_eq!(failure.field("food_group").unwrap().kind, FieldErrorKind::Enum);
    }

    #[test]
    fn test_update_cannot_null_required_field() {
        let changes = doc(json!({ "item": null }));
        let failure = validation_failure(grocery().prepare_update(changes));
        assert_eq!(failure.field("item").unwrap().kind, FieldErrorKind::Required);
    }

    #[test]
    fn test_update_drops_undeclared_fields() {
        let changes = doc(json!({ "item": "pear", "aisle": 4, "_id": "x" }));
        let prepared = grocery().prepare_update(changes).unwrap();
        assert_eq!(prepared, doc(json!({ "item": "pear" })));
    }
}

mod open_schema_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_schema_accepts_anything() {
        let anything = doc(json!({ "balance": "lots", "nested": { "a": [1, 2] } }));
        let prepared = SchemaDescriptor::Open.prepare_insert(anything.clone()).unwrap();
        assert_eq!(prepared, anything);
    }

    #[test]
    fn test_open_schema_accepts_document_missing_predefined_fields() {
        let mut item = valid_item();
        item.remove("item");
        assert!(SchemaDescriptor::Open.prepare_insert(item.clone()).is_ok());
        assert!(grocery().prepare_insert(item).is_err());
    }

    #[test]
    fn test_open_schema_strips_id() {
        let changes = doc(json!({ "_id": "abc", "x": 1 }));
        let prepared = SchemaDescriptor::Open.prepare_update(changes).unwrap();
        assert_eq!(prepared, doc(json!({ "x": 1 })));
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(SchemaDescriptor::Open.to_string(), "open");
        assert_eq!(grocery().to_string(), "predefined(GroceryInventory)");
    }
}
