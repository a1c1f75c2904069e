use std::sync::Arc;

use automap::{Alias, Config, MapError, Record};

#[derive(Alias, Debug, Clone, Default, PartialEq)]
pub struct Email(pub String);

#[derive(Alias, Debug, Clone, Copy, Default, PartialEq)]
pub struct Celsius(pub f64);

#[derive(Alias, Debug, Clone, Copy, Default, PartialEq)]
pub struct Quantity(pub i64);

#[derive(Alias, Debug, Clone, Default, PartialEq)]
pub struct Tag(pub String);

#[derive(Record, Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Record, Debug, Clone, Default, PartialEq)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
}

#[derive(Record, Debug, Clone, Default, PartialEq)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub temperature: f64,
    pub tags: Vec<String>,
    pub nickname: Option<String>,
    pub address: Address,
}

#[derive(Record, Debug, Clone, Default, PartialEq)]
pub struct CustomerDto {
    pub age: u32,
    pub name: String,
    pub email: Email,
    pub temperature: Celsius,
    pub tags: Vec<Tag>,
    pub nickname: Option<Email>,
    pub address: Address,
}

fn customer() -> Customer {
    Customer {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        age: 36,
        temperature: 36.6,
        tags: vec!["vip".to_string(), "early".to_string()],
        nickname: Some("countess".to_string()),
        address: Address {
            street: "1 Analytical Way".to_string(),
            city: "London".to_string(),
        },
    }
}

#[test]
fn identity_copies_every_field() {
    let source = customer();
    let mapped = Config::<Customer, Customer>::new().map(&source).unwrap();
    assert_eq!(mapped, source);
}

#[test]
fn maps_into_aliased_fields() {
    let dto = automap::new::<Customer, CustomerDto>().map(&customer()).unwrap();

    assert_eq!(dto.name, "Ada");
    assert_eq!(dto.age, 36);
    assert_eq!(dto.email, Email("ada@example.com".to_string()));
    assert_eq!(dto.temperature, Celsius(36.6));
    assert_eq!(dto.tags, vec![Tag("vip".to_string()), Tag("early".to_string())]);
    assert_eq!(dto.nickname, Some(Email("countess".to_string())));
    assert_eq!(dto.address.city, "London");
}

#[test]
fn aliases_convert_back_to_plain_types() {
    let dto = automap::new::<Customer, CustomerDto>().map(&customer()).unwrap();
    let back = automap::new::<CustomerDto, Customer>().map(&dto).unwrap();
    assert_eq!(back, customer());
}

#[test]
fn absent_reference_stays_absent() {
    let source = Customer {
        nickname: None,
        ..customer()
    };
    let dto = automap::new::<Customer, CustomerDto>().map(&source).unwrap();
    assert_eq!(dto.nickname, None);
}

#[derive(Record, Debug, Clone, Default)]
pub struct Foo {
    pub foo: String,
}

#[derive(Record, Debug, Clone, Default)]
pub struct Missing {
    pub missing: bool,
}

#[test]
fn missing_source_field_is_an_error() {
    let err = Config::<Foo, Missing>::new()
        .map(&Foo {
            foo: "bar".to_string(),
        })
        .unwrap_err();

    assert_eq!(err.to_string(), "field 'missing' not found in source type 'Foo'");
    assert!(matches!(
        err,
        MapError::MissingField { field: "missing", .. }
    ));
}

#[test]
fn missing_field_fails_even_for_default_source() {
    let config = Config::<Foo, Missing>::new();
    assert!(config.map(&Foo::default()).is_err());
}

#[derive(Record, Debug, Clone, Default)]
pub struct Counter {
    pub count: i64,
}

#[derive(Record, Debug, Clone, Default)]
pub struct CounterText {
    pub count: String,
}

#[test]
fn primitive_kind_mismatch_is_incompatible() {
    let err = Config::<Counter, CounterText>::new()
        .map(&Counter { count: 3 })
        .unwrap_err();
    assert_eq!(err.to_string(), "destination type is String, source is i64");
    assert!(matches!(err, MapError::IncompatibleTypes { .. }));
}

#[derive(Record, Debug, Clone, Default)]
pub struct Readings {
    pub values: Vec<i64>,
}

#[derive(Record, Debug, Clone, Default)]
pub struct Flags {
    pub values: Vec<bool>,
}

#[derive(Record, Debug, Clone, Default)]
pub struct Quantities {
    pub values: Vec<Quantity>,
}

#[test]
fn sequence_element_kind_mismatch_is_incompatible() {
    let err = Config::<Readings, Flags>::new()
        .map(&Readings { values: vec![1, 0] })
        .unwrap_err();
    assert_eq!(err.to_string(), "destination type is Vec<bool>, source is Vec<i64>");
}

#[test]
fn sequence_of_alias_converts_element_wise() {
    let mapped = Config::<Readings, Quantities>::new()
        .map(&Readings {
            values: vec![5, -2, 9],
        })
        .unwrap();
    assert_eq!(mapped.values, vec![Quantity(5), Quantity(-2), Quantity(9)]);
}

#[test]
fn empty_sequence_maps_to_empty() {
    let mapped = Config::<Readings, Quantities>::new()
        .map(&Readings::default())
        .unwrap();
    assert!(mapped.values.is_empty());
}

#[test]
fn empty_sequence_with_mismatched_elements_is_incompatible() {
    let err = Config::<Readings, Flags>::new()
        .map(&Readings::default())
        .unwrap_err();
    assert!(matches!(err, MapError::IncompatibleTypes { .. }));
}

#[derive(Record, Debug, Clone, Default)]
pub struct Located {
    pub address: Address,
}

#[derive(Record, Debug, Clone, Default)]
pub struct LocatedDto {
    pub address: AddressDto,
}

#[test]
fn nested_record_of_other_type_is_incompatible() {
    let err = Config::<Located, LocatedDto>::new()
        .map(&Located::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "destination type is AddressDto, source is Address");
}

#[derive(Record, Debug, Clone, Default)]
pub struct MaybeCount {
    pub count: Option<i64>,
}

#[derive(Record, Debug, Clone, Default)]
pub struct MaybeLabel {
    pub count: Option<String>,
}

#[derive(Record, Debug, Clone, Default)]
pub struct MaybeQuantity {
    pub count: Option<Quantity>,
}

#[test]
fn reference_conversion_follows_referent_kind() {
    let config = Config::<MaybeCount, MaybeQuantity>::new();
    let mapped = config.map(&MaybeCount { count: Some(7) }).unwrap();
    assert_eq!(mapped.count, Some(Quantity(7)));

    let err = Config::<MaybeCount, MaybeLabel>::new()
        .map(&MaybeCount { count: Some(7) })
        .unwrap_err();
    assert_eq!(err.to_string(), "destination type is Option<String>, source is Option<i64>");
}

#[test]
fn absent_reference_skips_referent_check() {
    let mapped = Config::<MaybeCount, MaybeLabel>::new()
        .map(&MaybeCount { count: None })
        .unwrap();
    assert_eq!(mapped.count, None);
}

#[derive(Record, Debug, Clone, Default)]
pub struct Account {
    pub login: String,
    secret: String,
}

#[test]
fn unexported_destination_field_keeps_zero_value() {
    let mapped = Config::<Foo, Account>::new()
        .for_field_name("login", automap::ignore_field())
        .map(&Foo::default())
        .unwrap();
    assert_eq!(mapped.secret, "");
}

#[derive(Record, Debug, Clone, Default)]
pub struct TwoBad {
    pub first: Vec<bool>,
    pub second: String,
}

#[derive(Record, Debug, Clone, Default)]
pub struct TwoBadSource {
    pub second: i64,
    pub first: Vec<i64>,
}

#[test]
fn first_failing_destination_field_decides_the_error() {
    let err = Config::<TwoBadSource, TwoBad>::new()
        .map(&TwoBadSource {
            second: 1,
            first: vec![1],
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "destination type is Vec<bool>, source is Vec<i64>");
}

#[test]
fn map_slice_keeps_order() {
    let config = Config::<Readings, Quantities>::new();
    let mapped = config
        .map_slice(&[
            Readings { values: vec![1] },
            Readings { values: vec![2, 3] },
        ])
        .unwrap();
    assert_eq!(mapped.len(), 2);
    assert_eq!(mapped[1].values, vec![Quantity(2), Quantity(3)]);
}

#[test]
fn map_slice_of_nothing_is_empty() {
    let config = Config::<Readings, Quantities>::new();
    assert!(config.map_slice(&[]).unwrap().is_empty());
}

#[test]
fn map_slice_short_circuits_on_first_error() {
    let config = Config::<Readings, Flags>::new();
    let result = config.map_slice(&[
        Readings::default(),
        Readings { values: vec![1] },
        Readings::default(),
    ]);
    assert!(matches!(result, Err(MapError::IncompatibleTypes { .. })));
}

#[test]
fn config_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config<Customer, CustomerDto>>();

    let config = Arc::new(automap::new::<Customer, CustomerDto>());
    std::thread::scope(|s| {
        for age in 0..4 {
            let config = Arc::clone(&config);
            s.spawn(move || {
                let source = Customer { age, ..customer() };
                let dto = config.map(&source).unwrap();
                assert_eq!(dto.age, age);
            });
        }
    });
}
