//! Selector resolution benchmark suite.
//!
//! Measures command dispatch through the resolver at different section depths:
//! - Page-level `@name` references
//! - Section `@name` references (recursive chains)
//! - Section literals (implicit `[section, element]` chains)
//!
//! Run with: cargo bench --bench resolve
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use futures_util::future::BoxFuture;
use serde_json::Value;

use pageobject_core::{
    Client, CommandDefinition, CommandEntry, CommandMap, Page, Result, Section, SectionBuilder,
};

// ============================================================================
// Configuration
// ============================================================================

const SECTION_DEPTHS: &[usize] = &[1, 4, 16];

/// Client that never talks to a browser.
struct NullClient;

#[async_trait]
impl Client for NullClient {
    async fn send(&self, _method: &str, params: Value) -> Result<Value> {
        Ok(params)
    }

    fn enqueue(&self, _command: &str, _task: BoxFuture<'static, Result<Value>>) {}
}

/// Builds a page whose sections nest `depth` levels deep.
fn nested_page(depth: usize) -> Page {
    let mut section = SectionBuilder::new(format!(".level-{depth}")).element("target", "a.target");
    for level in (1..depth).rev() {
        section = SectionBuilder::new(format!(".level-{level}"))
            .element("target", "a.target")
            .section("child", section);
    }

    Page::builder("bench")
        .client(Arc::new(NullClient))
        .element("target", "#target")
        .section("child", section)
        .commands(|_| {
            let click = CommandDefinition::sync(|_, _| Ok(Value::Null));
            Ok(CommandMap::from([("click".to_string(), CommandEntry::from(click))]))
        })
        .build()
        .expect("Failed to build benchmark page")
}

fn deepest_section(page: &Page, depth: usize) -> Section {
    let mut section = page.section("child").expect("Missing top section");
    for _ in 1..depth {
        section = section.section("child").expect("Missing nested section");
    }
    section
}

// ============================================================================
// Benchmark: Page References
// ============================================================================

fn bench_page_reference(c: &mut Criterion) {
    let page = nested_page(1);

    c.bench_function("page_reference", |b| {
        b.iter(|| {
            page.call("click", black_box(vec!["@target".into()]))
                .expect("Resolution failed")
        });
    });
}

// ============================================================================
// Benchmark: Section References
// ============================================================================

fn bench_section_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("section_reference");

    for &depth in SECTION_DEPTHS {
        let page = nested_page(depth);
        let section = deepest_section(&page, depth);

        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| {
                section
                    .call("click", black_box(vec!["@target".into()]))
                    .expect("Resolution failed")
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Section Literals
// ============================================================================

fn bench_section_literal(c: &mut Criterion) {
    let mut group = c.benchmark_group("section_literal");

    for &depth in SECTION_DEPTHS {
        let page = nested_page(depth);
        let section = deepest_section(&page, depth);

        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| {
                section
                    .call("click", black_box(vec!["button.primary".into()]))
                    .expect("Resolution failed")
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_page_reference,
    bench_section_reference,
    bench_section_literal
);
criterion_main!(benches);
