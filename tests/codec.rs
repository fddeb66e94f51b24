use connect4::{
    decode, decode_fields, encode_value, record, resolve, DeclaredType, Describe, Error,
    FieldFilter, JsonSerializer, Mode, Presence, Record, Reflect, Serializable, Serializer,
    EnumValue, TupleOf, Value,
};
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};
use std::any::Any;
use std::collections::BTreeSet;
use std::path::PathBuf;

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Inner {
        pub path: PathBuf,
        pub weight: f64 = 1.0,
    }
}

impl Serializable for Inner {}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Outer {
        pub name: String,
        pub inner: Inner,
        pub note: Option<String> = None,
    }
}

impl Serializable for Outer {}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Mirror {
        pub name: String,
        pub inner: Inner,
        pub note: Option<String> = None,
    }
}

impl Serializable for Mirror {}

fn outer() -> Outer {
    Outer {
        name: "demo".into(),
        inner: Inner {
            path: PathBuf::from("/srv/data/"),
            weight: 0.5,
        },
        note: None,
    }
}

// ---- serializer -------------------------------------------------------------

#[test]
fn json_serializer_round_trip() {
    let ser = JsonSerializer::new();
    let bytes = ser.serialize(&outer()).unwrap();
    assert_eq!(
        String::from_utf8(bytes.clone()).unwrap(),
        r#"{"name":"demo","inner":{"path":"/srv/data","weight":0.5}}"#
    );
    let back: Outer = ser.deserialize(&bytes).unwrap();
    assert_eq!(back.inner.path, PathBuf::from("/srv/data"));
    assert_eq!(back, outer());
}

#[test]
fn pretty_serializer_indents() {
    let text = JsonSerializer::pretty().to_string(&outer()).unwrap();
    assert!(text.contains('\n'));
    let back: Outer = JsonSerializer::new().from_str(&text).unwrap();
    assert_eq!(back, outer());
}

#[test]
fn serializer_filter_and_mode() {
    let ser = JsonSerializer::new().with_filter(FieldFilter::KeepAll).strict();
    let text = ser.to_string(&outer()).unwrap();
    assert!(text.ends_with(r#""note":null}"#), "{text}");

    let err = ser
        .from_str::<Outer>(r#"{"name":"x","inner":{"path":"p"},"extra":true}"#)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField { .. }));

    let lenient: Outer = JsonSerializer::new()
        .from_str(r#"{"name":"x","inner":{"path":"p"},"extra":true}"#)
        .unwrap();
    assert_eq!(lenient.inner.weight, 1.0);
}

#[test]
fn serializer_reports_bad_input() {
    let ser = JsonSerializer::new();
    assert!(matches!(
        ser.from_str::<Outer>("{not json"),
        Err(Error::Deserialize(_))
    ));
    assert!(matches!(
        ser.from_str::<Outer>("[1, 2]"),
        Err(Error::NotARecord { .. })
    ));
}

// ---- coerce -----------------------------------------------------------------

struct Loose {
    name: String,
    inner: Inner,
}

impl Reflect for Loose {
    fn type_name(&self) -> String {
        "codec::Loose".into()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect_fields(&self) -> connect4::Result<Vec<(String, Value)>> {
        Ok(vec![
            ("name".into(), Value::Str(self.name.clone())),
            ("inner".into(), connect4::ToValue::to_value(&self.inner)),
        ])
    }
}

#[test]
fn coerce_none_and_null_give_none() {
    assert_eq!(Outer::coerce(None, Mode::Lenient).unwrap(), None);
    let null = JsonValue::Null;
    assert_eq!(Outer::coerce(Some(&null as &dyn Reflect), Mode::Lenient).unwrap(), None);
    assert_eq!(Outer::coerce(Some(&Value::None as &dyn Reflect), Mode::Lenient).unwrap(), None);
}

#[test]
fn coerce_same_type_is_identity() {
    let original = outer();
    let coerced = Outer::coerce(Some(&original as &dyn Reflect), Mode::Strict).unwrap();
    assert_eq!(coerced, Some(original));
}

#[test]
fn coerce_other_record_goes_through_its_encoding() {
    let original = outer();
    let mirror = Mirror::coerce(Some(&original as &dyn Reflect), Mode::Strict)
        .unwrap()
        .unwrap();
    assert_eq!(mirror.to_json(), original.to_json());
}

#[test]
fn coerce_plain_struct_by_its_fields() {
    let loose = Loose {
        name: "demo".into(),
        inner: outer().inner,
    };
    let coerced = Outer::coerce(Some(&loose as &dyn Reflect), Mode::Strict).unwrap();
    assert_eq!(coerced, Some(outer()));
}

#[test]
fn coerce_json_and_maps() {
    let raw = json!({"name": "demo", "inner": {"path": "/srv/data", "weight": 0.5}});
    let from_json = Outer::coerce(Some(&raw as &dyn Reflect), Mode::Strict).unwrap();
    assert_eq!(from_json, Some(outer()));

    let mut map: IndexMap<String, Value> = IndexMap::new();
    map.insert("name".into(), Value::Str("demo".into()));
    map.insert("inner".into(), Value::Json(raw["inner"].clone()));
    let from_map = Outer::coerce(Some(&map as &dyn Reflect), Mode::Strict).unwrap();
    assert_eq!(from_map, Some(outer()));

    let err = Outer::coerce(Some(&json!(3) as &dyn Reflect), Mode::Strict).unwrap_err();
    assert!(matches!(err, Error::NotARecord { .. }));
}

// ---- fields -----------------------------------------------------------------

#[test]
fn presence_separates_missing_from_null() {
    let schema = Outer::schema().unwrap();
    let raw = json!({"name": "n", "inner": {"path": "p"}, "note": null});
    let fields = decode_fields(schema, raw.as_object().unwrap(), Mode::Strict).unwrap();
    assert_eq!(fields.presence("note"), Presence::Null);
    assert!(matches!(fields.presence("name"), Presence::Value(Value::Str(_))));

    let raw = json!({"name": "n", "inner": {"path": "p"}});
    let fields = decode_fields(schema, raw.as_object().unwrap(), Mode::Strict).unwrap();
    assert_eq!(fields.presence("note"), Presence::Missing);
}

#[test]
fn nested_defaults_fill_in_on_construction() {
    let schema = Outer::schema().unwrap();
    let raw = json!({"inner": {"path": "p"}, "name": "n"});
    let fields = decode_fields(schema, raw.as_object().unwrap(), Mode::Strict).unwrap();
    let names: Vec<_> = fields.iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["name", "inner"]);

    let outer = Outer::from_fields(fields).unwrap();
    assert_eq!(outer.inner.weight, 1.0);
}

#[test]
fn missing_nested_required_field_names_the_nested_record() {
    let raw = json!({"name": "n", "inner": {"weight": 2}});
    let err = Outer::from_json_value(&raw, Mode::Lenient).unwrap_err();
    assert_eq!(
        err,
        Error::MissingRequiredField {
            field: "path".into(),
            type_name: "codec::Inner".into(),
        }
    );
}

// ---- values -----------------------------------------------------------------

#[test]
fn decode_by_descriptor() {
    let descriptor = resolve(&TupleOf::<i64>::declared_type()).unwrap();
    let value = decode(&descriptor, &json!([5, 4, 3, 2, 1]), Mode::Strict).unwrap();
    assert_eq!(
        value,
        Value::Tuple((1..=5).rev().map(Value::Int).collect())
    );

    let descriptor = resolve(&DeclaredType::Any).unwrap();
    let raw = json!({"anything": [1, "goes"]});
    assert_eq!(decode(&descriptor, &raw, Mode::Strict).unwrap(), Value::Json(raw));
}

#[test]
fn named_tuples_encode_as_sequences() {
    let point = Value::named([("x", Value::Int(1)), ("y", Value::Int(2))]);
    assert_eq!(encode_value(&point, &FieldFilter::default()), json!([1, 2]));
}

#[test]
fn containers_keep_null_elements() {
    let list = Value::List(vec![Value::Int(1), Value::None]);
    assert_eq!(encode_value(&list, &FieldFilter::default()), json!([1, null]));
}

#[test]
fn non_finite_floats_encode_as_null() {
    assert_eq!(
        encode_value(&Value::Float(f64::NAN), &FieldFilter::KeepAll),
        JsonValue::Null
    );
}

#[test]
fn paths_use_forward_slashes() {
    let path = Value::Path(PathBuf::from("a").join("b").join("c"));
    assert_eq!(encode_value(&path, &FieldFilter::KeepAll), json!("a/b/c"));
    let empty = Value::Path(PathBuf::new());
    assert_eq!(encode_value(&empty, &FieldFilter::KeepAll), json!("."));
}

#[test]
fn mixed_sets_order_numbers_numerically() {
    let set: BTreeSet<Value> =
        [Value::Float(2.5), Value::Int(3), Value::Int(1)].into_iter().collect();
    assert_eq!(
        encode_value(&Value::Set(set), &FieldFilter::KeepAll),
        json!([1, 2.5, 3])
    );
}

#[test]
fn opaque_number_sets_encode_in_numeric_order() {
    let descriptor = resolve(&BTreeSet::<EnumValue>::declared_type()).unwrap();
    let decoded = decode(&descriptor, &json!([10, 9, 100, 9]), Mode::Strict).unwrap();
    assert_eq!(
        encode_value(&decoded, &FieldFilter::KeepAll),
        json!([9, 10, 100])
    );

    let raw: BTreeSet<Value> = [json!(2.5), json!(-3), json!(u64::MAX), json!(20)]
        .into_iter()
        .map(Value::Json)
        .collect();
    assert_eq!(
        encode_value(&Value::Set(raw), &FieldFilter::KeepAll),
        json!([-3, 2.5, 20, u64::MAX])
    );
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Counters {
        pub total: u64,
        pub size: usize = 0,
        pub delta: isize = 0,
    }
}

impl Serializable for Counters {}

#[test]
fn unsigned_ints_above_i64_stay_exact() {
    let counters = Counters {
        total: u64::MAX,
        size: usize::MAX,
        delta: isize::MIN,
    };
    let encoded = counters.to_json();
    assert_eq!(encoded["total"], json!(u64::MAX));
    assert_eq!(
        serde_json::to_string(&encoded["total"]).unwrap(),
        "18446744073709551615"
    );
    assert_eq!(Counters::from_json(&encoded, Mode::Strict).unwrap(), counters);

    let text = JsonSerializer::new().to_string(&counters).unwrap();
    let back: Counters = JsonSerializer::new().from_str(&text).unwrap();
    assert_eq!(back, counters);

    let from_text = Counters::from_json_value(&json!({"total": "18446744073709551615"}), Mode::Strict)
        .unwrap();
    assert_eq!(from_text.total, u64::MAX);

    let err = Counters::from_json_value(&json!({"total": -1}), Mode::Strict).unwrap_err();
    assert!(matches!(err.root(), Error::InvalidValue { .. }), "{err}");
}
