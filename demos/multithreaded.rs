use std::sync::Arc;
use std::thread;

use unmarshal_filter::{FilterChain, InputFilter, Query};

fn main() {
    let filter: Arc<dyn InputFilter> = Arc::new(
        FilterChain::compile("maxdepth=8;!org.apache.commons.collections.functors.**;java.**;com.app.**;!*")
            .expect("failed to compile filter"),
    );

    let streams = [
        "java.util.ArrayList",
        "com.app.model.Order",
        "org.apache.commons.collections.functors.InvokerTransformer",
        "org.springframework.Gadget",
    ];

    let handles: Vec<_> = streams
        .into_iter()
        .enumerate()
        .map(|(i, class)| {
            let f = Arc::clone(&filter);
            thread::spawn(move || {
                // Each thread decodes its own stream against the shared filter
                let depth = 2 + i as u64;
                let status = f.check_input(&Query::new().class(class).depth(depth));
                println!("Thread {i}: {class} at depth {depth} -> {status}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
