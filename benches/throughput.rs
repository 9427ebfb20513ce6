use std::collections::BTreeSet;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use contactbook::{contact::Contact, core::store::ContactStore};

fn contact(i: u64) -> Contact {
    // Spread last names so inserts land all over the sequence.
    let last = format!("L{:05}", (i * 7919) % 10_000);
    Contact::new(&format!("F{i}"), &last, "614-555-0000", "")
}

fn filled(n: u64) -> ContactStore {
    let mut store = ContactStore::new();
    for i in 0..n {
        store.insert(contact(i)).expect("insert");
    }
    store
}

fn bench_inserts(c: &mut Criterion) {
    c.bench_function("store_insert_5k", |b| {
        b.iter(|| filled(5_000));
    });
}

fn bench_updates(c: &mut Criterion) {
    c.bench_function("store_update_1k", |b| {
        b.iter(|| {
            let mut store = filled(1_000);
            let ids: Vec<_> = store.iter().map(Contact::id).collect();
            for (i, id) in ids.into_iter().enumerate() {
                let mut edited = store.get(id).cloned().expect("get");
                edited.set_last_name(&format!("M{i:05}"));
                store.update(edited).expect("update");
            }
        });
    });
}

fn bench_save_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_round_trip");
    for n in [100u64, 1_000, 10_000] {
        let store = filled(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| {
                let bytes = store.to_json().expect("encode");
                ContactStore::from_json(&bytes).expect("decode")
            });
        });
    }
    group.finish();
}

fn bench_remove_at(c: &mut Criterion) {
    c.bench_function("store_remove_every_other_10k", |b| {
        b.iter(|| {
            let mut store = filled(10_000);
            let positions: BTreeSet<usize> = (0..store.len()).step_by(2).collect();
            store.remove_at(&positions).expect("remove")
        });
    });
}

criterion_group!(benches, bench_inserts, bench_updates, bench_save_load, bench_remove_at);
criterion_main!(benches);
