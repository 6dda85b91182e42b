//! End-to-end partial update scenarios over a derived record.

use colmap_core::{
    build_literal_set, build_named_set_by_column, build_named_set_by_field, build_positional_set,
    compute_changed_columns, enumerate_columns, extract_parameter_values, EnumerationMode,
    MapError, SqlValue,
};
use colmap_derive::Record;

#[derive(Debug, Clone, PartialEq, Record)]
pub struct User {
    pub id: i64,
    #[column(kind = "varchar")]
    pub name: Option<String>,
    #[column(kind = "varchar")]
    pub email: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub city: Option<String>,
    #[column(kind = "varchar")]
    pub country: Option<String>,
    #[column(kind = "boolean")]
    pub active: bool,
}

fn user() -> User {
    User {
        id: 145,
        name: Some(String::from("Pepe")),
        email: Some(String::from("pepe@astropay.com")),
        address: Some(String::from("Luis Bonavita 1122")),
        password: Some(String::from("myhashedpassword")),
        city: Some(String::from("Montevideo")),
        country: Some(String::from("UY")),
        active: true,
    }
}

const NO_FIELDS: &[&str] = &[];

// =============================================================================
// SET clause scenarios
// =============================================================================

#[test]
fn test_literal_set_scenario() {
    let fields = ["password", "address", "id", "city", "country", "active"];
    assert_eq!(
        build_literal_set(&user(), &fields).unwrap(),
        "SET `password`='myhashedpassword',`address`='Luis Bonavita 1122',`id`=145,`city`='Montevideo',`country`='UY',`active`=true"
    );
}

#[test]
fn test_positional_set_scenario() {
    let fields = ["password", "id", "country", "active"];
    assert_eq!(
        build_positional_set(&user(), &fields).unwrap(),
        "SET password=?,id=?,country=?,active=?"
    );
}

#[test]
fn test_unknown_field_rejected_everywhere() {
    let fields = ["password", "address", "id", "status"];
    let expected = MapError::InvalidField(String::from("status"));
    assert_eq!(build_literal_set(&user(), &fields), Err(expected.clone()));
    assert_eq!(build_positional_set(&user(), &fields), Err(expected.clone()));
    assert_eq!(build_named_set_by_field(&user(), &fields), Err(expected.clone()));
    assert_eq!(
        extract_parameter_values(&user(), &fields, NO_FIELDS.iter().copied()),
        Err(expected)
    );
}

#[test]
fn test_parameters_line_up_with_placeholders() {
    let record = user();
    let field_lists: [&[&str]; 3] = [
        &["password", "id", "country", "active"],
        &["active", "email", "name"],
        &["city", "city", "address"],
    ];

    for fields in field_lists {
        let positional = build_positional_set(&record, fields).unwrap();
        let named = build_named_set_by_field(&record, fields).unwrap();
        let params = extract_parameter_values(&record, fields, [record.id]).unwrap();

        let positional_columns: Vec<&str> = positional["SET ".len()..]
            .split(',')
            .map(|part| part.trim_end_matches("=?"))
            .collect();
        let named_columns: Vec<&str> = named["SET ".len()..]
            .split(',')
            .map(|part| part.split('=').next().unwrap())
            .collect();

        assert_eq!(positional_columns, named_columns);
        assert_eq!(params.len(), fields.len() + 1);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(positional_columns[i], *field);
            assert_eq!(
                params[i],
                colmap_core::extract_value(&record, field).unwrap()
            );
        }
        assert_eq!(params[fields.len()], SqlValue::Int(145));
    }
}

#[test]
fn test_enumeration_round_trip() {
    assert_eq!(
        enumerate_columns(&user(), NO_FIELDS, EnumerationMode::Plain),
        "id,name,email,address,password,city,country,active"
    );
    assert_eq!(
        enumerate_columns(&user(), &["id"], EnumerationMode::NamedParameter),
        ":name,:email,:address,:password,:city,:country,:active"
    );
}

#[test]
fn test_insert_statement_from_enumeration() {
    let record = user();
    let skip = ["id"];
    let columns = enumerate_columns(&record, &skip, EnumerationMode::Quoted);
    let placeholders = enumerate_columns(&record, &skip, EnumerationMode::NamedParameter);
    assert_eq!(
        format!("INSERT INTO users ({columns}) VALUES ({placeholders})"),
        "INSERT INTO users (`name`,`email`,`address`,`password`,`city`,`country`,`active`) \
         VALUES (:name,:email,:address,:password,:city,:country,:active)"
    );
}

// =============================================================================
// Diff scenarios
// =============================================================================

#[test]
fn test_single_password_change() {
    let mut updated = user();
    updated.password = Some(String::from("anotherhash"));
    assert_eq!(
        compute_changed_columns(&user(), &updated, NO_FIELDS).unwrap(),
        vec!["password"]
    );
}

#[test]
fn test_each_single_field_change_is_reported_alone() {
    let original = user();
    let mut variants = Vec::new();

    let mut v = original.clone();
    v.id = 146;
    variants.push((v, "id"));
    let mut v = original.clone();
    v.name = Some(String::from("Juan"));
    variants.push((v, "name"));
    let mut v = original.clone();
    v.city = None;
    variants.push((v, "city"));
    let mut v = original.clone();
    v.active = false;
    variants.push((v, "active"));

    for (updated, column) in variants {
        assert_eq!(
            compute_changed_columns(&original, &updated, NO_FIELDS).unwrap(),
            vec![column]
        );
    }
}

#[test]
fn test_absent_original_field_is_not_dirty() {
    let mut original = user();
    original.city = None;
    assert!(compute_changed_columns(&original, &user(), NO_FIELDS)
        .unwrap()
        .is_empty());
}

#[test]
fn test_diff_feeds_named_set_by_column() {
    let original = user();
    let mut updated = original.clone();
    updated.active = false;
    updated.address = Some(String::from("18 de Julio 1000"));

    let dirty = compute_changed_columns(&original, &updated, &["id"]).unwrap();
    assert_eq!(dirty, vec!["address", "active"]);

    // Order of the allowed list does not matter
    let reversed: Vec<String> = dirty.iter().rev().cloned().collect();
    let (set, used) = build_named_set_by_column(&updated, &reversed).unwrap();
    assert_eq!(set, "SET address=:address,active=:active");
    assert_eq!(used, dirty);

    let params = extract_parameter_values(&updated, &dirty, [SqlValue::Int(updated.id)]).unwrap();
    assert_eq!(
        params,
        vec![
            SqlValue::Text(String::from("18 de Julio 1000")),
            SqlValue::Bool(false),
            SqlValue::Int(145),
        ]
    );
}
