use tracing_subscriber::EnvFilter;
use unmarshal_filter::{FilterChain, Query};

fn main() {
    // RUST_LOG=unmarshal_filter=trace shows every decision as it is made
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let filter = FilterChain::compile(
        "maxdepth=10;maxarray=1000;java.lang.Integer;java.lang.Long;!java.lang.Runtime;java.util.*",
    )
    .expect("failed to compile filter");

    for (i, rule) in filter.rules().iter().enumerate() {
        println!("#{i}: {rule}");
    }
    println!();

    let queries = [
        Query::new().class("java.lang.Long"),
        Query::new().class("java.lang.Runtime"),
        Query::new().class("java.util.HashMap").array_length(5000),
        Query::new().class("java.net.URL"),
    ];

    for query in &queries {
        let report = filter.explain(query);
        println!("{report}");
    }
}
