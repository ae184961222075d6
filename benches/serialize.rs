use criterion::{criterion_group, criterion_main, Criterion};
use metakit::{Key, LangAlt, MetadataStore, QualifiedName, SerializeOptions, Value, XmpStruct};
use std::hint::black_box;

fn create_simple_store() -> MetadataStore {
    let mut store = MetadataStore::new();
    store.set(Key::xmp("xmp", "CreatorTool"), "TestApp").unwrap();
    store
}

fn create_medium_store() -> MetadataStore {
    let mut store = create_simple_store();
    store
        .set(Key::xmp("xmp", "CreateDate"), Value::date("2019-07-04T16:24:35").unwrap())
        .unwrap();
    store.set(Key::xmp("exif", "PixelXDimension"), 4032i64).unwrap();
    store.set(Key::xmp("exif", "PixelYDimension"), 3024i64).unwrap();
    store
        .set(Key::xmp("dc", "subject"), Value::unordered(["fruit", "tree", "pears"]))
        .unwrap();
    store
}

fn create_complex_store() -> MetadataStore {
    let mut store = create_medium_store();
    store
        .set(
            Key::xmp("dc", "description"),
            LangAlt::new("A pair of pears on a tree")
                .with_language("fr-FR", "Deux poires sur un arbre")
                .with_language("de-DE", "Zwei Birnen an einem Baum"),
        )
        .unwrap();
    store
        .set(Key::xmp("dc", "creator"), Value::ordered(["Jane Doe", "John Roe"]))
        .unwrap();
    let contact = XmpStruct::new()
        .with_field(QualifiedName::new("Iptc4xmpCore", "CiAdrCity"), "Cupertino")
        .with_field(QualifiedName::new("Iptc4xmpCore", "CiAdrCtry"), "US")
        .with_field(
            QualifiedName::new("Iptc4xmpCore", "CiEmailWork"),
            "jane@example.com",
        );
    store
        .set(Key::xmp("Iptc4xmpCore", "CreatorContactInfo"), contact)
        .unwrap();
    store
        .set(
            Key::xmp("photoshop", "Headline"),
            r#"Fish & "Chips" <cheap>"#,
        )
        .unwrap();
    store
}

fn bench_serialize_simple(c: &mut Criterion) {
    let store = create_simple_store();
    let options = SerializeOptions::default().no_header();
    c.bench_function("serialize_simple", |b| {
        b.iter(|| {
            let _result = black_box(&store).to_xmp(&options).unwrap();
        });
    });
}

fn bench_serialize_medium(c: &mut Criterion) {
    let store = create_medium_store();
    let options = SerializeOptions::default().no_header();
    c.bench_function("serialize_medium", |b| {
        b.iter(|| {
            let _result = black_box(&store).to_xmp(&options).unwrap();
        });
    });
}

fn bench_serialize_complex(c: &mut Criterion) {
    let store = create_complex_store();
    let options = SerializeOptions::default().no_header();
    c.bench_function("serialize_complex", |b| {
        b.iter(|| {
            let _result = black_box(&store).to_xmp(&options).unwrap();
        });
    });
}

fn bench_serialize_packet_complex(c: &mut Criterion) {
    let store = create_complex_store();
    let options = SerializeOptions::default();
    c.bench_function("serialize_packet_complex", |b| {
        b.iter(|| {
            let _result = black_box(&store).to_xmp(&options).unwrap();
        });
    });
}

fn bench_serialize_compact(c: &mut Criterion) {
    let store = create_complex_store();
    let options = SerializeOptions::default().compact();
    c.bench_function("serialize_compact", |b| {
        b.iter(|| {
            let _result = black_box(&store).to_xmp(&options).unwrap();
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let store = create_complex_store();
    let options = SerializeOptions::default();
    c.bench_function("round_trip_complex", |b| {
        b.iter(|| {
            let text = black_box(&store).to_xmp(&options).unwrap();
            let _parsed = MetadataStore::from_xmp(&text).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_serialize_simple,
    bench_serialize_medium,
    bench_serialize_complex,
    bench_serialize_packet_complex,
    bench_serialize_compact,
    bench_round_trip
);
criterion_main!(benches);
