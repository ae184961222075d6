use criterion::{criterion_group, criterion_main, Criterion};
use metakit::{MetadataStore, ParseOptions, XmpParser};
use std::hint::black_box;

// Attribute-form packet with a single property
const SIMPLE_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="Photos 9.0"/>
</rdf:RDF>
<?xpacket end="w"?>"#;

// Every value shape: Alt, Bag, Seq and a parseType="Resource" struct
const PEARS_XMP: &str = include_str!("../tests/fixtures/pears.xmp");

// exiftool style: single quotes, several Description elements
const EXIFTOOL_XMP: &str = include_str!("../tests/fixtures/pears_exiftool.xmp");

// No xpacket wrapper
const RDF_ONLY_XMP: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="Photos 9.0"/>
</rdf:RDF>"#;

/// Packet with `n` keywords and `n` localized titles
fn large_xmp(n: usize) -> String {
    let keywords: String = (0..n)
        .map(|i| format!("<rdf:li>keyword {}</rdf:li>", i))
        .collect();
    let titles: String = (0..n)
        .map(|i| format!(r#"<rdf:li xml:lang="x-l{}">title {}</rdf:li>"#, i, i))
        .collect();
    format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
<rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:subject><rdf:Bag>{}</rdf:Bag></dc:subject>
<dc:title><rdf:Alt><rdf:li xml:lang="x-default">title</rdf:li>{}</rdf:Alt></dc:title>
</rdf:Description></rdf:RDF></x:xmpmeta>"#,
        keywords, titles
    )
}

fn bench_parse_simple(c: &mut Criterion) {
    c.bench_function("parse_simple", |b| {
        b.iter(|| {
            let _store = MetadataStore::from_xmp(black_box(SIMPLE_XMP)).unwrap();
        });
    });
}

fn bench_parse_shapes(c: &mut Criterion) {
    c.bench_function("parse_shapes", |b| {
        b.iter(|| {
            let _store = MetadataStore::from_xmp(black_box(PEARS_XMP)).unwrap();
        });
    });
}

fn bench_parse_exiftool(c: &mut Criterion) {
    c.bench_function("parse_exiftool", |b| {
        b.iter(|| {
            let _store = MetadataStore::from_xmp(black_box(EXIFTOOL_XMP)).unwrap();
        });
    });
}

fn bench_parse_large(c: &mut Criterion) {
    let text = large_xmp(500);
    c.bench_function("parse_large", |b| {
        b.iter(|| {
            let _store = MetadataStore::from_xmp(black_box(&text)).unwrap();
        });
    });
}

fn bench_parse_rdf_only(c: &mut Criterion) {
    c.bench_function("parse_rdf_only", |b| {
        b.iter(|| {
            let _store = MetadataStore::from_xmp(black_box(RDF_ONLY_XMP)).unwrap();
        });
    });
}

fn bench_parse_packet_only(c: &mut Criterion) {
    let parser = XmpParser::with_options(ParseOptions::new().strict_packet());
    c.bench_function("parse_packet_only", |b| {
        b.iter(|| {
            let _packet = parser.parse(black_box(PEARS_XMP)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_shapes,
    bench_parse_exiftool,
    bench_parse_large,
    bench_parse_rdf_only,
    bench_parse_packet_only
);
criterion_main!(benches);
