// [libs/domain/models/src/tests_serialization.rs]
//! Certifica que las entidades nominales mantienen paridad de serialización
//! con el esquema `snake_case` consumido por el Dashboard y la API.

use super::*;
use chrono::Utc;

#[test]
fn room_type_round_trips_through_its_key() {
    for room in RoomType::ALL {
        let key = room.as_key();
        assert_eq!(RoomType::from_key(key), Some(room));
    }
    assert_eq!(RoomType::from_key("not_a_room"), None);
}

#[test]
fn style_round_trips_through_its_key() {
    for style in Style::ALL {
        let key = style.as_key();
        assert_eq!(Style::from_key(key), Some(style));
    }
}

#[test]
fn image_status_enforces_one_way_transitions() {
    use ImageStatus::*;
    assert!(Queued.can_transition_to(Processing));
    assert!(Processing.can_transition_to(Ready));
    assert!(Processing.can_transition_to(Failed));

    assert!(!Ready.can_transition_to(Failed));
    assert!(!Failed.can_transition_to(Ready));
    assert!(!Queued.can_transition_to(Ready));
    assert!(!Processing.can_transition_to(Queued));
}

#[test]
fn image_serializes_with_snake_case_status() {
    let image = Image {
        id: "img-1".into(),
        project_id: "proj-1".into(),
        original_id: Some("abc123".into()),
        source_url: None,
        room_type: Some(RoomType::LivingRoom),
        style: Some(Style::Modern),
        prompt: None,
        seed: None,
        status: ImageStatus::Queued,
        staged_url: None,
        error: None,
        cost: None,
        model_id: None,
        processing_ms: None,
        provider_prediction_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    };

    let json = serde_json::to_value(&image).unwrap();
    assert_eq!(json["status"], "queued");
    assert_eq!(json["room_type"], "living_room");
}

#[test]
fn staging_error_codes_and_statuses_match_the_taxonomy() {
    assert_eq!(StagingError::UsageLimitExceeded.code(), "usage_limit_exceeded");
    assert_eq!(StagingError::UsageLimitExceeded.http_status(), 402);
    assert_eq!(StagingError::NotFound("x".into()).http_status(), 404);
    assert_eq!(StagingError::ProviderTimeout.http_status(), 504);
}
