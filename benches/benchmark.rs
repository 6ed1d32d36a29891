//! Performance benchmarks for markup-nav.
//!
//! Run with: `cargo bench`
//!
//! Compares the scoped search engine with the equivalent XPath queries on a
//! synthetic page, and measures parsing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use markup_nav::{Document, Query};

/// A page with `sections` sections of ten linked list items each.
fn synthetic_page(sections: usize) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Bench</title></head><body>");
    for s in 0..sections {
        html.push_str(&format!("<section id=\"s{s}\" class=\"section\"><h2>Section {s}</h2><ul>"));
        for i in 0..10 {
            let scheme = if i % 2 == 0 { "https" } else { "http" };
            html.push_str(&format!(
                "<li class=\"item\"><a href=\"{scheme}://example.com/{s}/{i}\">Item {i}</a></li>"
            ));
        }
        html.push_str("</ul></section>");
    }
    html.push_str("</body></html>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for sections in [10, 100] {
        let html = synthetic_page(sections);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &html, |b, html| {
            b.iter(|| Document::parse(black_box(html)));
        });
    }
    group.finish();
}

fn bench_engine_vs_xpath(c: &mut Criterion) {
    let html = synthetic_page(100);
    let Ok(doc) = Document::parse(&html) else {
        return;
    };
    let Some(root) = doc.root() else {
        return;
    };
    let Ok(query) = Query::compile(".//*[@href and starts-with(@href, 'https://')]") else {
        return;
    };

    let mut group = c.benchmark_group("begins_with_href");
    group.bench_function("engine", |b| {
        b.iter(|| root.descendants_with_attribute_value_begins_with(black_box("href"), black_box("https://")));
    });
    group.bench_function("xpath_compiled", |b| {
        b.iter(|| query.select(black_box(&root)));
    });
    group.bench_function("xpath_uncompiled", |b| {
        b.iter(|| root.nodes_for_query(black_box(".//*[@href and starts-with(@href, 'https://')]")));
    });
    group.finish();
}

fn bench_first_match(c: &mut Criterion) {
    let html = synthetic_page(100);
    let Ok(doc) = Document::parse(&html) else {
        return;
    };
    let Some(root) = doc.root() else {
        return;
    };

    c.bench_function("descendant_with_id_last", |b| {
        b.iter(|| root.descendant_with_id(black_box("s99")));
    });
    c.bench_function("descendant_with_id_first", |b| {
        b.iter(|| root.descendant_with_id(black_box("s0")));
    });
}

fn bench_wide_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_list");
    for items in [2_000, 8_000] {
        let lis: String = (0..items).map(|i| format!("<li>{i}</li>")).collect();
        let html = format!("<html><body><ul>{lis}</ul></body></html>");
        let Ok(doc) = Document::parse(&html) else {
            return;
        };
        let Some(root) = doc.root() else {
            return;
        };
        group.bench_with_input(BenchmarkId::new("engine", items), &root, |b, root| {
            b.iter(|| root.descendants_of_tag(black_box("li")));
        });
        group.bench_with_input(BenchmarkId::new("xpath", items), &root, |b, root| {
            b.iter(|| root.nodes_for_query(black_box("//li")));
        });
    }
    group.finish();
}

fn bench_text_content(c: &mut Criterion) {
    let html = synthetic_page(100);
    let Ok(doc) = Document::parse(&html) else {
        return;
    };
    let Some(body) = doc.body() else {
        return;
    };

    c.bench_function("text_content_of_descendants", |b| {
        b.iter(|| black_box(body).text_content_of_descendants());
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_engine_vs_xpath,
    bench_first_match,
    bench_wide_list,
    bench_text_content
);
criterion_main!(benches);
