use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use unmarshal_filter::{FilterChain, Query};

const CLASSES: &[&str] = &[
    "java.lang.String",
    "java.lang.Runtime",
    "java.util.HashMap",
    "com.app.model.User",
    "org.other.Gadget",
];

fn build_shared_chain() -> Arc<FilterChain> {
    let mut elements = vec![
        "maxdepth=20".to_owned(),
        "maxrefs=1000".to_owned(),
        "!java.lang.Runtime".to_owned(),
    ];
    elements.extend((0..20).map(|i| format!("com.vendor{i}.**")));
    elements.push("java.lang.*".to_owned());
    elements.push("java.util.*".to_owned());
    elements.push("com.app.**".to_owned());
    elements.push("!*".to_owned());

    Arc::new(FilterChain::compile(&elements.join(";")).unwrap())
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let chain = build_shared_chain();

        group.bench_function(&format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let ch = Arc::clone(&chain);
                        thread::spawn(move || {
                            let start = Instant::now();
                            for i in 0..per_thread {
                                let class = CLASSES[i as usize % CLASSES.len()];
                                let _ = ch.evaluate(&Query::new().class(class).depth(4));
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
