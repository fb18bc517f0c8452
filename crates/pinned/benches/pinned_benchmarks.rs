use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pinned::prelude::*;
use pinned::DATE_FORMAT;
use serde_json::json;

fn date_string(offset: i64) -> String {
    let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    (base + Duration::days(offset)).format(DATE_FORMAT).to_string()
}

fn rename(from: &'static str, to: &'static str) -> impl Fn(FieldMap) -> FieldMap + Send + Sync {
    move |mut m| {
        if let Some(v) = m.remove(from) {
            m.insert(to.to_string(), v);
        }
        m
    }
}

fn catalog(n: i64) -> VersionManager {
    let mut vm = VersionManager::new();
    for i in 0..n {
        let (from, to) = if i % 2 == 0 { ("a", "b") } else { ("b", "a") };
        vm.add(
            Version::new(date_string(i))
                .change(Change::new("swap").action("Doc", rename(from, to)))
                .change(Change::new("unrelated").action("Other", rename("x", "y"))),
        )
        .unwrap();
    }
    vm
}

fn bench_add(c: &mut Criterion) {
    c.bench_function("VersionManager::add x1000 (ascending dates)", |b| {
        b.iter(|| black_box(catalog(1000)).len())
    });

    c.bench_function("VersionManager::add x1000 (descending dates)", |b| {
        b.iter(|| {
            let mut vm = VersionManager::new();
            for i in (0..1000).rev() {
                vm.add(Version::new(date_string(i))).unwrap();
            }
            black_box(vm.len())
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let vm = catalog(1000);
    let both = Candidates::both(date_string(10), date_string(900));

    c.bench_function("VersionManager::resolve query+header, 1000 versions", |b| {
        b.iter(|| black_box(vm.resolve(&both).unwrap().date().len()))
    });
}

fn bench_apply(c: &mut Criterion) {
    let vm = catalog(1000);
    let mut data = FieldMap::new();
    data.insert("a".into(), json!("payload"));

    let oldest = vm.get(&date_string(0)).unwrap();
    c.bench_function("VersionManager::apply_map across 999 versions", |b| {
        b.iter(|| black_box(vm.apply_map(oldest, "Doc", data.clone()).unwrap()))
    });

    let recent = vm.get(&date_string(989)).unwrap();
    c.bench_function("VersionManager::apply_map across 10 versions", |b| {
        b.iter(|| black_box(vm.apply_map(recent, "Doc", data.clone()).unwrap()))
    });
}

criterion_group!(benches, bench_add, bench_resolve, bench_apply);
criterion_main!(benches);
