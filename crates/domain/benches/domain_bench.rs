use chrono::Utc;
use common::{BranchId, CustomerId, ProductId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{BranchRef, CustomerRef, DiscountPolicy, Money, Sale, SaleItemInput};
use std::hint::black_box;

fn item_inputs(count: usize) -> Vec<SaleItemInput> {
    (0..count)
        .map(|i| {
            SaleItemInput::new(
                ProductId::new(),
                format!("Product {i}"),
                (i % 20) as u32 + 1,
                Money::from_cents(199 + i as i64),
            )
        })
        .collect()
}

fn bench_price_line(c: &mut Criterion) {
    c.bench_function("domain/price_line", |b| {
        b.iter(|| {
            DiscountPolicy::price_line(
                black_box("Widget"),
                black_box(12),
                black_box(Money::from_cents(4_999)),
            )
            .unwrap()
        });
    });
}

fn bench_price_items_100(c: &mut Criterion) {
    let inputs = item_inputs(100);

    c.bench_function("domain/price_items_100", |b| {
        b.iter(|| Sale::price_items(black_box(&inputs)).unwrap());
    });
}

fn bench_replace_items_and_diff(c: &mut Criterion) {
    let inputs = item_inputs(50);
    let mut sale = Sale::new(
        "BENCH-1",
        Utc::now(),
        CustomerRef::new(CustomerId::new(), "Bench Customer"),
        BranchRef::new(BranchId::new(), "Bench Branch"),
    )
    .unwrap();
    sale.replace_items(Sale::price_items(&inputs).unwrap());
    let replacement = item_inputs(25);

    c.bench_function("domain/diff_and_replace_50", |b| {
        b.iter(|| {
            let mut sale = sale.clone();
            let removed = sale.removed_lines(black_box(&replacement));
            sale.replace_items(Sale::price_items(&replacement).unwrap());
            (removed, sale.total_amount())
        });
    });
}

criterion_group!(
    benches,
    bench_price_line,
    bench_price_items_100,
    bench_replace_items_and_diff,
);
criterion_main!(benches);
