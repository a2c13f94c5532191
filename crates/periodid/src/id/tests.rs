use crate::{
    Components, LongOrderId, PeriodId, SequenceId, ShortOrderId, SnowflakeDayId,
    SnowflakeSecondId,
};
use serde::{Serialize, de::DeserializeOwned};

fn assert_json_round_trip<ID>(id: ID, expected_raw: u64)
where
    ID: PeriodId + Serialize + DeserializeOwned,
{
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!(r#"{{"id":{expected_raw}}}"#));

    let decoded: ID = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, id);
    assert_eq!(decoded.components(), id.components());
}

#[test]
fn sequence_id_serializes_raw_value() {
    let id = SequenceId::from_components(0, 7, 42);
    assert_json_round_trip(id, id.to_raw());
}

#[test]
fn snowflake_ids_serialize_raw_value() {
    let second = SnowflakeSecondId::from_components(126_230_400, 1023, 4_194_303);
    assert_json_round_trip(second, second.to_raw());

    let day = SnowflakeDayId::from_components(1461, 3, 131_071);
    assert_json_round_trip(day, u64::from(day.to_raw()));
}

#[test]
fn order_ids_serialize_decimal_value() {
    assert_json_round_trip(
        ShortOrderId::from_components(240_420, 1, 64_800),
        240_420_006_480_001,
    );
    assert_json_round_trip(
        LongOrderId::from_components(2_404_201_530, 7, 43),
        240_420_153_000_004_307,
    );
}

#[test]
fn components_use_field_names() {
    let components = Components {
        period: 240_420,
        worker_id: 1,
        sequence: 64_800,
    };
    let json = serde_json::to_string(&components).unwrap();
    assert_eq!(json, r#"{"period":240420,"worker_id":1,"sequence":64800}"#);

    let decoded: Components = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, components);
}

#[test]
fn malformed_order_id_deserializes_but_decodes_to_zero() {
    let id: ShortOrderId = serde_json::from_str(r#"{"id":42}"#).unwrap();
    assert_eq!(id.to_raw(), 42);
    assert_eq!(id.components(), Components::default());
}
