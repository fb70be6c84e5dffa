use kanban_core::{
    Outcome, Response, TagCreate, UserCreate, UserUpdate, ValidationError, WorkItemCreate,
    WorkItemDetails, WorkItemState, WorkItemUpdate,
};

#[test]
fn work_item_state_serializes_by_variant_name() {
    let json = serde_json::to_value(WorkItemState::Removed).unwrap();
    assert_eq!(json, "Removed");

    let decoded: WorkItemState = serde_json::from_value(serde_json::json!("Active")).unwrap();
    assert_eq!(decoded, WorkItemState::Active);
}

#[test]
fn details_serialization_uses_expected_fields() {
    let details = WorkItemDetails {
        id: 3,
        title: "ship it".to_string(),
        description: None,
        created: 1_700_000_000_000,
        assigned_to_name: String::new(),
        tags: vec!["ASAP".to_string()],
        state: WorkItemState::New,
        state_updated: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["assigned_to_name"], "");
    assert_eq!(json["tags"][0], "ASAP");
    assert_eq!(json["state"], "New");
    assert!(json["description"].is_null());

    let decoded: WorkItemDetails = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, details);
}

#[test]
fn outcome_serializes_response_and_optional_id() {
    let json = serde_json::to_value(Outcome::rejected(Response::Conflict)).unwrap();
    assert_eq!(json, serde_json::json!({ "response": "Conflict", "id": null }));
}

#[test]
fn payload_bounds_match_schema() {
    assert!(TagCreate::new("t".repeat(50)).validate().is_ok());
    assert_eq!(
        TagCreate::new("t".repeat(51)).validate(),
        Err(ValidationError::TooLong {
            field: "tag.name",
            max: 50,
            actual: 51
        })
    );
    assert!(UserCreate::new("n".repeat(100), "e".repeat(100))
        .validate()
        .is_ok());
    assert!(UserUpdate::new(1, "n".repeat(51), "e").validate().is_err());
    assert!(UserUpdate::new(1, "n", "e".repeat(101)).validate().is_err());
    assert!(WorkItemCreate::new("w".repeat(100)).validate().is_ok());
    assert!(WorkItemUpdate::new(1, "w".repeat(101), WorkItemState::New)
        .validate()
        .is_err());
}

#[test]
fn validation_error_message_names_field_without_value() {
    let err = WorkItemCreate::new("secret ".repeat(20)).validate().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("work_item.title"));
    assert!(!message.contains("secret"));
}
