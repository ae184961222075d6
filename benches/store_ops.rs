use criterion::{criterion_group, criterion_main, Criterion};
use metakit::{
    ingest_all, FileFormat, Key, MetadataStore, Namespace, RawTree, RawValue, Value, WritePolicy,
};
use std::hint::black_box;

fn create_populated_store() -> MetadataStore {
    let mut store = MetadataStore::new();
    store.set(Key::xmp("xmp", "CreatorTool"), "TestApp").unwrap();
    store
        .set(Key::xmp("dc", "description"), Value::lang_alt("A pair of pears on a tree"))
        .unwrap();
    store
        .set(
            Key::xmp("dc", "subject"),
            Value::unordered((0..10).map(|i| format!("item{}", i))),
        )
        .unwrap();
    store
        .set(Key::xmp("dc", "creator"), Value::ordered(["Jane Doe", "John Roe"]))
        .unwrap();
    for i in 0..20 {
        store.set(Key::exif(format!("Tag{}", i)), i as i64).unwrap();
    }
    store.set(Key::iptc("Keywords"), Value::unordered(["fruit", "tree"])).unwrap();
    store
}

fn camera_trees() -> (RawTree, RawTree) {
    let exif = RawTree::new()
        .with("Make", "Apple")
        .with("Model", "iPhone 12 Pro")
        .with("FNumber", RawValue::rational(16, 10))
        .with("ExposureTime", RawValue::rational(1, 120))
        .with("ISOSpeedRatings", vec![32i64])
        .with("DateTimeOriginal", "2020:11:21 10:05:41")
        .with("DateTimeDigitized", "not-a-date");
    let iptc = RawTree::new()
        .with("Keywords", vec!["fruit", "tree", "pears"])
        .with("City", "Cupertino")
        .with("DateCreated", "20201121");
    (exif, iptc)
}

fn bench_set(c: &mut Criterion) {
    c.bench_function("set", |b| {
        b.iter(|| {
            let mut store = MetadataStore::new();
            store
                .set(
                    black_box(Key::xmp("xmp", "CreatorTool")),
                    black_box(Value::text("TestApp")),
                )
                .unwrap();
        });
    });
}

fn bench_get(c: &mut Criterion) {
    let store = create_populated_store();
    let key = Key::exif("Tag19");
    c.bench_function("get", |b| {
        b.iter(|| {
            let _value = black_box(&store).get(black_box(&key));
        });
    });
}

fn bench_get_path(c: &mut Criterion) {
    let store = create_populated_store();
    c.bench_function("get_path", |b| {
        b.iter(|| {
            let _value = black_box(&store).get_path(black_box("dc:creator[1]")).unwrap();
        });
    });
}

fn bench_partition(c: &mut Criterion) {
    let store = create_populated_store();
    c.bench_function("partition_exif", |b| {
        b.iter(|| {
            let _count = black_box(&store).partition(Namespace::Exif).count();
        });
    });
}

fn bench_merge(c: &mut Criterion) {
    let source = create_populated_store();
    c.bench_function("merge_xmp", |b| {
        b.iter(|| {
            let mut target = MetadataStore::new();
            target
                .merge(black_box(&source), Namespace::Xmp, true)
                .unwrap();
        });
    });
}

fn bench_ingest(c: &mut Criterion) {
    let (exif, iptc) = camera_trees();
    c.bench_function("ingest_camera", |b| {
        b.iter(|| {
            let _result = ingest_all(black_box(&exif), black_box(&iptc));
        });
    });
}

fn bench_validate_for_write(c: &mut Criterion) {
    let store = create_populated_store();
    let policy = WritePolicy::default_table();
    c.bench_function("validate_for_write", |b| {
        b.iter(|| {
            let _ok = policy.validate_for_write(black_box(&store), FileFormat::Jpeg);
        });
    });
}

fn bench_flat_dict(c: &mut Criterion) {
    let store = create_populated_store();
    c.bench_function("to_flat_dict", |b| {
        b.iter(|| {
            let _dict = black_box(&store).to_flat_dict();
        });
    });
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_get_path,
    bench_partition,
    bench_merge,
    bench_ingest,
    bench_validate_for_write,
    bench_flat_dict
);
criterion_main!(benches);
