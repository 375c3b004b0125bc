use pretty_assertions::assert_eq;
use serde_json::json;
use vegabuild::{Data, Frame, KeyPairs, LoadOptions, Scalar};

fn rows(data: &Data) -> serde_json::Value {
    serde_json::Value::Array(data.values().cloned().unwrap_or_default())
}

#[test]
fn one_column_table_gives_one_row_per_index() {
    let frame = Frame::from_columns([("sales", vec![3, 5, 8])]).unwrap();
    let data = Data::from_table(&frame, &LoadOptions::default()).unwrap();

    assert_eq!(data.name().unwrap(), "table");
    assert_eq!(
        rows(&data),
        json!([
            {"idx": 0, "col": "sales", "val": 3},
            {"idx": 1, "col": "sales", "val": 5},
            {"idx": 2, "col": "sales", "val": 8}
        ])
    );
}

#[test]
fn json_records_keyed_on_a_column() {
    let input = json!([
        {"year": 2001, "apples": 1, "pears": 4},
        {"year": 2002, "apples": 2, "pears": 5}
    ]);
    let options = LoadOptions {
        name: Some("fruit".to_owned()),
        columns: Some(vec!["pears".to_owned()]),
        key_on: Some("year".to_owned()),
        ..LoadOptions::default()
    };
    let data = Data::from_json_input(input, &options).unwrap();

    assert_eq!(data.name().unwrap(), "fruit");
    assert_eq!(
        rows(&data),
        json!([
            {"idx": 2001, "col": "pears", "val": 4},
            {"idx": 2002, "col": "pears", "val": 5}
        ])
    );
}

#[test]
fn keypairs_from_map_sorted() {
    let map = [("b", 2), ("a", 1)]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), Scalar::from(v)))
        .collect();
    let data = Data::keypairs(KeyPairs::Map(map), None).unwrap();
    assert_eq!(rows(&data), json!([{"x": "a", "y": 1}, {"x": "b", "y": 2}]));
}

#[test]
fn unsupported_input_fails_to_load() {
    let err = Data::from_json_input(json!("just text"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, vegabuild::Error::Load(_)));

    let err = Data::from_iter([json!(true)], None).unwrap_err();
    assert_eq!(err.to_string(), "cannot serialize value of type bool");
}

#[test]
fn records_missing_a_column_name_it() {
    let input = json!([
        {"year": 2001, "apples": 1},
        {"year": 2002}
    ]);
    let err = Data::from_json_input(input, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, vegabuild::Error::Load(_)));
    assert_eq!(err.to_string(), "record 1 has no value for column \"apples\"");
}
