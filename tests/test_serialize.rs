use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_railing::{Config, Error};

fn plain() -> Config {
    Config::new().use_form_encoding(false)
}

#[derive(Serialize)]
struct Address {
    city: String,
    postcode: String,
}

#[derive(Serialize)]
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
fn serialize_struct() {
    let params = query_params();

    insta::assert_snapshot!(
        plain().serialize_string(&params).unwrap(),
        @"address[city]=Carrot+City&address[postcode]=12345&id=42&name=Acme&phone=12345&user_ids[]=1&user_ids[]=2&user_ids[]=3&user_ids[]=4"
    );
    insta::assert_snapshot!(
        serde_railing::to_string(&params).unwrap(),
        @"address%5Bcity%5D=Carrot+City&address%5Bpostcode%5D=12345&id=42&name=Acme&phone=12345&user_ids%5B%5D=1&user_ids%5B%5D=2&user_ids%5B%5D=3&user_ids%5B%5D=4"
    );
}

#[test]
fn serialize_to_values() {
    let values = serde_railing::to_values(&query_params()).unwrap();

    assert_eq!(values.get("address[city]"), Some("Carrot City"));
    assert_eq!(values.get("phone"), Some("12345"));
    assert_eq!(
        values.get_all("user_ids[]").unwrap(),
        ["1", "2", "3", "4"]
    );
    assert_eq!(values.len(), 6);
}

#[derive(Serialize)]
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

#[derive(Serialize)]
struct Image {
    #[serde(rename = "ID")]
    id: u32,
    #[serde(rename = "Palette")]
    palette: Vec<Rgba>,
}

#[test]
fn records_keep_their_index_order() {
    let image = Image {
        id: 1,
        palette: vec![
            Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 0,
            },
            Rgba {
                r: 0,
                g: 255,
                b: 0,
                a: 0,
            },
        ],
    };

    let values = serde_railing::to_values(&image).unwrap();
    assert_eq!(values.get_all("Palette[][R]").unwrap(), ["255", "0"]);
    assert_eq!(values.get_all("Palette[][G]").unwrap(), ["0", "255"]);

    assert_eq!(
        plain().serialize_string(&image).unwrap(),
        "ID=1&Palette[][A]=0&Palette[][B]=0&Palette[][G]=0&Palette[][R]=255\
         &Palette[][A]=0&Palette[][B]=0&Palette[][G]=255&Palette[][R]=0"
    );
    assert_eq!(
        serde_railing::to_string(&image).unwrap(),
        "ID=1&Palette%5B%5D%5BA%5D=0&Palette%5B%5D%5BB%5D=0&Palette%5B%5D%5BG%5D=0\
         &Palette%5B%5D%5BR%5D=255&Palette%5B%5D%5BA%5D=0&Palette%5B%5D%5BB%5D=0\
         &Palette%5B%5D%5BG%5D=255&Palette%5B%5D%5BR%5D=0"
    );
}

#[test]
fn nested_records_in_arrays() {
    #[derive(Serialize)]
    struct Inner {
        x: u8,
    }

    #[derive(Serialize)]
    struct Item {
        name: String,
        inner: Inner,
    }

    #[derive(Serialize)]
    struct Query {
        items: Vec<Item>,
    }

    let query = Query {
        items: vec![
            Item {
                name: "a".to_owned(),
                inner: Inner { x: 1 },
            },
            Item {
                name: "b".to_owned(),
                inner: Inner { x: 2 },
            },
        ],
    };

    insta::assert_snapshot!(
        plain().serialize_string(&query).unwrap(),
        @"items[][inner][x]=1&items[][name]=a&items[][inner][x]=2&items[][name]=b"
    );
}

#[derive(Default, Serialize)]
struct Sparse {
    #[serde(rename = "name,omitempty")]
    name: String,
    #[serde(rename = "count,omitempty")]
    count: u32,
    #[serde(rename = "ratio,omitempty")]
    ratio: f64,
    #[serde(rename = "flag,omitempty")]
    flag: bool,
    #[serde(rename = "tags,omitempty")]
    tags: Vec<String>,
    #[serde(rename = "labels,omitempty")]
    labels: BTreeMap<String, String>,
    #[serde(rename = "maybe,omitempty")]
    maybe: Option<u8>,
    #[serde(rename = "-")]
    secret: String,
    kept: u8,
}

#[test]
fn omitempty_drops_zero_values() {
    let sparse = Sparse {
        secret: "hunter2".to_owned(),
        ..Sparse::default()
    };
    assert_eq!(plain().serialize_string(&sparse).unwrap(), "kept=0");
}

#[test]
fn omitempty_keeps_set_values() {
    let mut labels = BTreeMap::new();
    labels.insert("env".to_owned(), "prod".to_owned());
    let full = Sparse {
        name: "x".to_owned(),
        count: 3,
        ratio: 0.5,
        flag: true,
        tags: vec!["a".to_owned()],
        labels,
        maybe: Some(0),
        secret: "hunter2".to_owned(),
        kept: 7,
    };

    insta::assert_snapshot!(
        plain().serialize_string(&full).unwrap(),
        @"count=3&flag=true&kept=7&labels[env]=prod&maybe=0&name=x&ratio=0.5&tags[]=a"
    );
}

#[test]
fn skipped_fields() {
    #[derive(Serialize)]
    struct Query {
        visible: u8,
        #[serde(skip)]
        hidden: u8,
    }

    let query = Query {
        visible: 1,
        hidden: 2,
    };
    assert_eq!(serde_railing::to_string(&query).unwrap(), "visible=1");
}

#[derive(Serialize)]
struct Base {
    id: u32,
    note: String,
}

#[derive(Serialize)]
struct Extended {
    id: u32,
    #[serde(rename = ",embed")]
    base: Base,
    extra: bool,
}

#[test]
fn direct_fields_win_over_embedded() {
    let extended = Extended {
        id: 1,
        base: Base {
            id: 2,
            note: "hello world".to_owned(),
        },
        extra: false,
    };

    let values = serde_railing::to_values(&extended).unwrap();
    assert_eq!(values.get_all("id").unwrap(), ["1"]);
    assert_eq!(values.get("note"), Some("hello world"));
    assert_eq!(
        plain().serialize_string(&extended).unwrap(),
        "extra=false&id=1&note=hello+world"
    );
}

#[test]
fn first_embedded_writer_wins() {
    #[derive(Serialize)]
    struct Other {
        note: String,
        origin: String,
    }

    #[derive(Serialize)]
    struct Both {
        #[serde(rename = ",embed")]
        base: Base,
        #[serde(rename = ",embed")]
        other: Other,
    }

    let both = Both {
        base: Base {
            id: 2,
            note: "first".to_owned(),
        },
        other: Other {
            note: "second".to_owned(),
            origin: "there".to_owned(),
        },
    };
    assert_eq!(
        plain().serialize_string(&both).unwrap(),
        "id=2&note=first&origin=there"
    );
}

#[test]
fn comma_joined_sequences() {
    #[derive(Serialize)]
    struct Query {
        #[serde(rename = "ids,comma")]
        ids: Vec<u32>,
        #[serde(rename = "names,comma,omitempty")]
        names: Vec<String>,
    }

    let query = Query {
        ids: vec![1, 2],
        names: vec![],
    };
    let values = serde_railing::to_values(&query).unwrap();
    assert_eq!(values.get_all("ids").unwrap(), ["1,2"]);
    assert!(!values.contains_key("ids[]"));

    assert_eq!(plain().serialize_string(&query).unwrap(), "ids=1,2");
    assert_eq!(serde_railing::to_string(&query).unwrap(), "ids=1%2C2");
}

#[test]
fn serialize_map_of_lists() {
    let mut map = BTreeMap::new();
    map.insert("first_array", vec![1, 2]);
    map.insert("second", vec![3]);

    assert_eq!(
        plain().serialize_string(&map).unwrap(),
        "first_array[]=1&first_array[]=2&second[]=3"
    );
}

#[test]
fn serialize_nested_maps() {
    #[derive(Serialize)]
    struct Query {
        filter: BTreeMap<String, BTreeMap<String, u8>>,
    }

    let mut inner = BTreeMap::new();
    inner.insert("min".to_owned(), 1);
    inner.insert("max".to_owned(), 9);
    let mut filter = BTreeMap::new();
    filter.insert("size".to_owned(), inner);

    assert_eq!(
        plain().serialize_string(&Query { filter }).unwrap(),
        "filter[size][max]=9&filter[size][min]=1"
    );
}

#[test]
fn serialize_option() {
    #[derive(Serialize)]
    struct Query {
        vec: Option<Vec<u8>>,
        inner: Option<Address>,
        sparse: Vec<Option<u8>>,
    }

    let query = Query {
        vec: None,
        inner: None,
        sparse: vec![None],
    };
    assert_eq!(serde_railing::to_string(&query).unwrap(), "");

    let query = Query {
        vec: Some(vec![1, 2]),
        inner: Some(Address {
            city: "Rome".to_owned(),
            postcode: "00100".to_owned(),
        }),
        sparse: vec![Some(1), None, Some(3)],
    };
    assert_eq!(
        plain().serialize_string(&query).unwrap(),
        "inner[city]=Rome&inner[postcode]=00100&sparse[]=1&sparse[]=3&vec[]=1&vec[]=2"
    );
}

#[test]
fn serialize_unit_enum() {
    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Shape {
        Circle,
        Square,
    }

    #[derive(Serialize)]
    struct Query {
        kind: Shape,
        kinds: Vec<Shape>,
    }

    let query = Query {
        kind: Shape::Circle,
        kinds: vec![Shape::Square, Shape::Circle],
    };
    assert_eq!(
        plain().serialize_string(&query).unwrap(),
        "kind=circle&kinds[]=square&kinds[]=circle"
    );
}

#[test]
fn serialize_primitives() {
    #[derive(Serialize)]
    struct Query {
        neg: i64,
        big: u64,
        ratio: f32,
        whole: f64,
        yes: bool,
        letter: char,
        text: &'static str,
    }

    let query = Query {
        neg: -7,
        big: u64::MAX,
        ratio: 0.1,
        whole: 3.0,
        yes: true,
        letter: '&',
        text: "a=b c",
    };
    insta::assert_snapshot!(
        plain().serialize_string(&query).unwrap(),
        @"big=18446744073709551615&letter=%26&neg=-7&ratio=0.1&text=a%3Db+c&whole=3.0&yes=true"
    );
}

#[test]
fn serialize_to_writer() {
    let mut writer = Vec::new();
    serde_railing::to_writer(&query_params(), &mut writer).unwrap();
    assert_eq!(
        writer,
        serde_railing::to_string(&query_params()).unwrap().into_bytes()
    );
}

#[test]
fn unsupported_shapes() {
    let mut map = BTreeMap::new();
    map.insert(
        "home",
        Address {
            city: "Rome".to_owned(),
            postcode: "00100".to_owned(),
        },
    );
    assert!(matches!(
        serde_railing::to_values(&map),
        Err(Error::Unsupported(_))
    ));

    assert!(matches!(
        serde_railing::to_string(&vec![1, 2, 3]),
        Err(Error::Unsupported(_))
    ));
    assert!(matches!(
        serde_railing::to_string(&"text"),
        Err(Error::Unsupported(_))
    ));

    #[derive(Serialize)]
    enum Payload {
        Data(u8),
    }

    #[derive(Serialize)]
    struct Query {
        payload: Payload,
    }

    assert!(matches!(
        serde_railing::to_string(&Query {
            payload: Payload::Data(1)
        }),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn empty_directive_name_is_refused() {
    #[derive(Serialize)]
    struct Query {
        #[serde(rename = ",omitempty")]
        value: u8,
    }

    let err = serde_railing::to_string(&Query { value: 1 }).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err}");
    assert!(err.to_string().contains("renamed field"), "{err}");
}
