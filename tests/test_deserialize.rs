use std::collections::{BTreeMap, HashMap};

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_railing::{Error, Value, Values};

#[derive(Debug, PartialEq, Deserialize)]
struct Address {
    city: String,
    postcode: String,
}

#[derive(Debug, PartialEq, Deserialize)]
struct QueryParams {
    id: u8,
    name: String,
    phone: u32,
    address: Address,
    user_ids: Vec<u8>,
}

fn query_params() -> QueryParams {
    QueryParams {
        id: 42,
        name: "Acme".to_string(),
        phone: 12345,
        address: Address {
            city: "Carrot City".to_string(),
            postcode: "12345".to_string(),
        },
        user_ids: vec![1, 2, 3, 4],
    }
}

#[test]
fn deserialize_struct() {
    let params: QueryParams = serde_railing::from_str(
        "name=Acme&id=42&phone=12345&address[postcode]=12345&\
         address[city]=Carrot+City&user_ids[]=1&user_ids[]=2&\
         user_ids[]=3&user_ids[]=4",
    )
    .unwrap();
    assert_eq!(params, query_params());

    let encoded: QueryParams = serde_railing::from_str(
        "?name=Acme&id=42&phone=12345&address%5Bpostcode%5D=12345&\
         address%5Bcity%5D=Carrot%20City&user_ids%5B%5D=1&user_ids%5B%5D=2&\
         user_ids%5B%5D=3&user_ids%5B%5D=4",
    )
    .unwrap();
    assert_eq!(encoded, query_params());

    let bytes: QueryParams = serde_railing::from_bytes(
        b"name=Acme&id=42&phone=12345&address[postcode]=12345&\
          address[city]=Carrot+City&user_ids=1&user_ids=2&user_ids=3&user_ids=4",
    )
    .unwrap();
    assert_eq!(bytes, query_params());
}

#[test]
fn deserialize_from_values() {
    let mut values = Values::new();
    values.set("name", "Acme");
    values.set("id", "42");
    values.set("phone", "12345");
    values.set("address[city]", "Carrot City");
    values.set("address[postcode]", "12345");
    values.insert("user_ids[]", vec!["1".into(), "2".into(), "3".into(), "4".into()]);

    let params: QueryParams = serde_railing::from_values(values).unwrap();
    assert_eq!(params, query_params());
}

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Rgba {
    #[serde(rename = "R")]
    r: u8,
    #[serde(rename = "G")]
    g: u8,
    #[serde(rename = "B")]
    b: u8,
    #[serde(rename = "A")]
    a: u8,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Image {
    #[serde(rename = "ID")]
    id: u32,
    #[serde(rename = "Palette")]
    palette: Vec<Rgba>,
}

#[test]
fn array_of_records() {
    let image: Image = serde_railing::from_str(
        "ID=1&Palette[][A]=0&Palette[][B]=0&Palette[][G]=0&Palette[][R]=255\
         &Palette[][A]=0&Palette[][B]=0&Palette[][G]=255&Palette[][R]=0",
    )
    .unwrap();

    assert_eq!(
        image,
        Image {
            id: 1,
            palette: vec![
                Rgba {
                    r: 255,
                    ..Rgba::default()
                },
                Rgba {
                    g: 255,
                    ..Rgba::default()
                },
            ],
        }
    );
}

#[test]
fn array_of_records_zips_by_index() {
    // keys of one group do not need to be interleaved
    let image: Image = serde_railing::from_str(
        "ID=7&Palette[][R]=1&Palette[][R]=2&Palette[][R]=3\
         &Palette[][G]=4&Palette[][G]=5&Palette[][G]=6",
    )
    .unwrap();

    let pairs: Vec<(u8, u8)> = image.palette.iter().map(|c| (c.r, c.g)).collect();
    assert_eq!(pairs, [(1, 4), (2, 5), (3, 6)]);
}

#[test]
fn array_of_records_needs_matching_cardinality() {
    let err = serde_railing::from_str::<Image>(
        "ID=1&Palette[][A]=1&Palette[][A]=2&Palette[][B]=1&Palette[][B]=2&Palette[][B]=3",
    )
    .unwrap_err();

    match err {
        Error::IncompleteArrayData {
            key,
            expected,
            found,
        } => {
            assert_eq!(key, "B");
            assert_eq!(expected, 2);
            assert_eq!(found, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn optional_records_in_arrays() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Tag {
        name: String,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        tags: Vec<Option<Tag>>,
    }

    let query: Query = serde_railing::from_str("tags[][name]=a&tags[][name]=b").unwrap();
    assert_eq!(
        query.tags,
        [
            Some(Tag {
                name: "a".to_owned()
            }),
            Some(Tag {
                name: "b".to_owned()
            })
        ]
    );
}

#[test]
fn fixed_arrays_truncate_and_pad() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Short {
        nums: [u8; 2],
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Long {
        nums: [u8; 4],
    }

    let input = "nums[]=1&nums[]=2&nums[]=3";
    assert_eq!(
        serde_railing::from_str::<Short>(input).unwrap(),
        Short { nums: [1, 2] }
    );
    assert_eq!(
        serde_railing::from_str::<Long>(input).unwrap(),
        Long {
            nums: [1, 2, 3, 0]
        }
    );

    #[derive(Debug, PartialEq, Deserialize)]
    struct Colors {
        #[serde(rename = "Palette")]
        palette: [Rgba; 3],
    }

    let colors: Colors =
        serde_railing::from_str("Palette[][R]=1&Palette[][R]=2").unwrap();
    assert_eq!(colors.palette[0].r, 1);
    assert_eq!(colors.palette[1].r, 2);
    assert_eq!(colors.palette[2], Rgba::default());
}

#[derive(Debug, PartialEq, Deserialize)]
struct Base {
    id: u32,
    note: String,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Extended {
    id: u32,
    #[serde(rename = ",embed")]
    base: Base,
    extra: bool,
}

#[test]
fn direct_fields_win_over_embedded() {
    let extended: Extended = serde_railing::from_str("id=1&note=hello&extra=true").unwrap();
    assert_eq!(
        extended,
        Extended {
            id: 1,
            base: Base {
                id: 0,
                note: "hello".to_owned(),
            },
            extra: true,
        }
    );
}

#[test]
fn embedded_fields_resolve_after_direct_ones() {
    // the embedded field is declared first but still only sees leftovers
    #[derive(Debug, PartialEq, Deserialize)]
    struct Leading {
        #[serde(rename = ",embed")]
        base: Base,
        note: String,
    }

    let leading: Leading = serde_railing::from_str("id=3&note=mine").unwrap();
    assert_eq!(leading.note, "mine");
    assert_eq!(
        leading.base,
        Base {
            id: 3,
            note: String::new(),
        }
    );
}

#[test]
fn comma_split_values() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        #[serde(rename = "ids,comma")]
        ids: Vec<u32>,
    }

    let query: Query = serde_railing::from_str("ids=1,2").unwrap();
    assert_eq!(query.ids, [1, 2]);

    let query: Query = serde_railing::from_str("ids=1,2&ids=3,4").unwrap();
    assert_eq!(query.ids, [1, 2, 3, 4]);

    let query: Query = serde_railing::from_str("ids=1%2C2").unwrap();
    assert_eq!(query.ids, [1, 2]);
}

#[test]
fn map_of_lists() {
    let map: HashMap<String, Vec<i32>> =
        serde_railing::from_str("first_array[]=1&first_array[]=2").unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["first_array"], [1, 2]);

    let encoded = serde_railing::Config::new()
        .use_form_encoding(false)
        .serialize_string(&map)
        .unwrap();
    assert_eq!(encoded, "first_array[]=1&first_array[]=2");
}

#[test]
fn nested_maps() {
    let map: BTreeMap<String, BTreeMap<String, u8>> =
        serde_railing::from_str("size[min]=1&size[max]=9&count[total]=3").unwrap();

    assert_eq!(map["size"]["min"], 1);
    assert_eq!(map["size"]["max"], 9);
    assert_eq!(map["count"]["total"], 3);
}

#[test]
fn map_keys_must_be_strings() {
    let err = serde_railing::from_str::<HashMap<u32, String>>("1=a").unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err}");
}

#[test]
fn nested_keys_win_over_flat_ones() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Inner {
        x: u8,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        a: Inner,
    }

    let query: Query = serde_railing::from_str("a=1&a[x]=2").unwrap();
    assert_eq!(query, Query { a: Inner { x: 2 } });
}

#[test]
fn absent_fields() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        name: Option<String>,
        tags: Vec<String>,
        address: Option<Address>,
        count: u32,
    }

    let query: Query = serde_railing::from_str("unrelated=1").unwrap();
    assert_eq!(
        query,
        Query {
            name: None,
            tags: vec![],
            address: None,
            count: 0,
        }
    );

    let query: Query =
        serde_railing::from_str("name=&address[city]=Rome&address[postcode]=00100").unwrap();
    assert_eq!(query.name.as_deref(), Some(""));
    assert_eq!(
        query.address,
        Some(Address {
            city: "Rome".to_owned(),
            postcode: "00100".to_owned(),
        })
    );

    let address: Address = serde_railing::from_str("city=Rome").unwrap();
    assert_eq!(
        address,
        Address {
            city: "Rome".to_owned(),
            postcode: String::new(),
        }
    );
}

#[test]
fn absent_fields_take_zero_values() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Inner {
        label: String,
        weights: [f32; 2],
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        flag: bool,
        letter: char,
        big: u128,
        pair: (u8, String),
        inner: Inner,
        lookup: HashMap<String, String>,
        value: Option<Value>,
    }

    let query: Query = serde_railing::from_str("").unwrap();
    assert_eq!(
        query,
        Query {
            flag: false,
            letter: '\0',
            big: 0,
            pair: (0, String::new()),
            inner: Inner {
                label: String::new(),
                weights: [0.0, 0.0],
            },
            lookup: HashMap::new(),
            value: None,
        }
    );

    // an absent field still overrides a `#[serde(default = ...)]` function
    fn seven() -> u32 {
        7
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Paged {
        #[serde(default = "seven")]
        per_page: u32,
    }

    let paged: Paged = serde_railing::from_str("").unwrap();
    assert_eq!(paged.per_page, 0);
}

#[test]
fn absent_enum_is_a_missing_field() {
    #[derive(Debug, PartialEq, Deserialize)]
    enum Mode {
        Fast,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Query {
        mode: Mode,
    }

    let err = serde_railing::from_str::<Query>("other=1").unwrap_err();
    assert!(err.to_string().contains("mode"), "{err}");
}

#[test]
fn ignored_fields() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        #[serde(rename = "-", default)]
        secret: String,
        visible: String,
    }

    let query: Query = serde_railing::from_str("-=leaked&visible=yes").unwrap();
    assert_eq!(
        query,
        Query {
            secret: String::new(),
            visible: "yes".to_owned(),
        }
    );
}

#[test]
fn unit_enums() {
    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Shape {
        Circle,
        Square,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        kind: Shape,
        kinds: Vec<Shape>,
    }

    let query: Query =
        serde_railing::from_str("kind=circle&kinds[]=square&kinds[]=circle").unwrap();
    assert_eq!(
        query,
        Query {
            kind: Shape::Circle,
            kinds: vec![Shape::Square, Shape::Circle],
        }
    );

    assert!(serde_railing::from_str::<Query>("kind=triangle").is_err());
}

#[test]
fn primitive_errors() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Small {
        n: u8,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Flag {
        on: bool,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Ratio {
        r: f32,
    }

    assert!(matches!(
        serde_railing::from_str::<Small>("n=300"),
        Err(Error::NumericOverflow { ty: "u8", .. })
    ));
    assert!(matches!(
        serde_railing::from_str::<Small>("n=-1"),
        Err(Error::Parse { ty: "u8", .. })
    ));
    assert!(matches!(
        serde_railing::from_str::<Small>("n=abc"),
        Err(Error::Parse { ty: "u8", .. })
    ));
    assert!(matches!(
        serde_railing::from_str::<Flag>("on=yes"),
        Err(Error::Parse { ty: "bool", .. })
    ));
    assert!(matches!(
        serde_railing::from_str::<Ratio>("r=1e39"),
        Err(Error::NumericOverflow { ty: "f32", .. })
    ));
}

#[test]
fn primitives() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        neg: i64,
        big: u64,
        ratio: f64,
        inf: f32,
        yes: bool,
        no: bool,
        letter: char,
        text: String,
    }

    let query: Query = serde_railing::from_str(
        "neg=-7&big=18446744073709551615&ratio=0.25&inf=-inf&yes=true&no=false\
         &letter=%26&text=a%3Db+c",
    )
    .unwrap();
    assert_eq!(
        query,
        Query {
            neg: -7,
            big: u64::MAX,
            ratio: 0.25,
            inf: f32::NEG_INFINITY,
            yes: true,
            no: false,
            letter: '&',
            text: "a=b c".to_owned(),
        }
    );
}

#[test]
fn record_where_list_expected() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Query {
        address: Address,
    }

    assert!(matches!(
        serde_railing::from_str::<Query>("address=Rome"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn invalid_top_level_targets() {
    assert!(matches!(
        serde_railing::from_str::<u32>("a=1"),
        Err(Error::InvalidTarget(_))
    ));
    assert!(matches!(
        serde_railing::from_str::<Vec<u32>>("a=1"),
        Err(Error::InvalidTarget(_))
    ));
    assert!(matches!(
        serde_railing::from_str::<(u8, u8)>("a=1"),
        Err(Error::InvalidTarget(_))
    ));
}

#[test]
fn invalid_utf8() {
    assert!(matches!(
        serde_railing::from_bytes::<HashMap<String, String>>(b"a=%FF"),
        Err(Error::Utf8(_))
    ));
}

#[test]
fn dynamic_values() {
    let value: Value = serde_railing::from_str("a[b][]=1&a[b][]=2&a[c]=x&d=3").unwrap();
    assert_eq!(value["a"]["b"].as_list().unwrap(), ["1", "2"]);
    assert_eq!(value["a"]["c"].as_list().unwrap(), ["x"]);
    assert_eq!(value["d"].as_list().unwrap(), ["3"]);

    let map: HashMap<String, Value> = serde_railing::from_str("x[y]=1&z=2").unwrap();
    assert_eq!(map["x"].get("y").and_then(Value::as_list).unwrap(), ["1"]);
    assert_eq!(map["z"], Value::List(vec!["2".to_owned()]));

    let empty: Value = serde_railing::from_str("").unwrap();
    assert_eq!(empty, Value::Map(Default::default()));
}

#[test]
fn json_values() {
    let value: serde_json::Value =
        serde_railing::from_str("user[name]=bob&user[roles][]=a&user[roles][]=b").unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "user": {
                "name": ["bob"],
                "roles": ["a", "b"],
            }
        })
    );
}
