//! Benchmarks for the commit path.
//!
//! Measures the per-invocation overhead of the engine itself: gate
//! evaluation, log assembly and dependent-action dispatch, with storage
//! reduced to a no-op sink so the numbers reflect engine work only.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use gavel_action::{Engine, Options, Registry};
use gavel_core::context::Context;
use gavel_core::error::Result;
use gavel_core::log::ActionLog;
use gavel_core::store::LogStore;
use gavel_core::target::{ChangeTracker, FieldChanges, Target};
use serde_json::{json, Value};
use std::sync::Arc;

struct NullStore;

impl LogStore for NullStore {
    fn save(&self, _log: &ActionLog) -> Result<()> {
        Ok(())
    }
}

struct Article {
    state: String,
    tracker: ChangeTracker,
}

impl Article {
    fn new() -> Self {
        Self {
            state: "draft".to_string(),
            tracker: ChangeTracker::new(),
        }
    }

    fn set_state(&mut self, state: &str) {
        self.tracker
            .record("state", json!(self.state), json!(state));
        self.state = state.to_string();
    }
}

impl Target for Article {
    fn kind(&self) -> &str {
        "article"
    }

    fn id(&self) -> String {
        "1".to_string()
    }

    fn snapshot(&self) -> Value {
        json!({ "state": self.state })
    }

    fn diff(&mut self) -> FieldChanges {
        self.tracker.drain()
    }
}

fn make_engine(configure: impl FnOnce(&mut Registry<Article>)) -> Engine<Article> {
    let mut registry = Registry::new();
    configure(&mut registry);
    Engine::new(registry, Arc::new(NullStore))
}

fn bench_commit_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    let finished = make_engine(|registry| {
        registry.define("publish", Options::new(), |action| {
            action
                .commitable(|_, _| true)
                .commit(|article, _| {
                    article.set_state("published");
                    Ok(())
                });
        });
    });
    let ctx = Context::for_actor("bench").with_data(json!({ "reason": "bench" }));

    group.bench_function("finished", |b| {
        let mut article = Article::new();
        b.iter(|| finished.commit("publish", &mut article, &ctx));
    });

    let gated = make_engine(|registry| {
        registry.define("publish", Options::new(), |action| {
            action.authorized(|_, _| false).commit(|article, _| {
                article.set_state("published");
                Ok(())
            });
        });
    });

    group.bench_function("gated_abort", |b| {
        let mut article = Article::new();
        b.iter(|| gated.commit("publish", &mut article, &ctx));
    });

    let chained = make_engine(|registry| {
        registry.define("audit", Options::new(), |_| {});
        registry.define("notify", Options::new(), |_| {});
        registry.define(
            "publish",
            Options::new()
                .execute_before("audit")
                .execute_after("notify"),
            |action| {
                action.commit(|article, _| {
                    article.set_state("published");
                    Ok(())
                });
            },
        );
    });

    group.bench_function("with_dependents", |b| {
        let mut article = Article::new();
        b.iter(|| chained.commit("publish", &mut article, &ctx));
    });

    group.finish();
}

fn bench_visible_listing(c: &mut Criterion) {
    let engine = make_engine(|registry| {
        for i in 0..32 {
            let code = format!("action_{:02}", i);
            registry.define(&code, Options::new().order(32 - i), |action| {
                action.show(move |article, _| article.state == "draft" || i % 2 == 0);
            });
        }
    });
    let article = Article::new();
    let ctx = Context::for_actor("bench");

    let mut group = c.benchmark_group("registry");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("visible_32_actions", |b| {
        b.iter(|| engine.visible(&article, &ctx));
    });

    group.finish();
}

criterion_group!(benches, bench_commit_paths, bench_visible_listing);
criterion_main!(benches);
