use unmarshal_filter::{FilterChain, FilterInfo, Query, Status};

fn main() {
    // Compile a specification
    let filter = FilterChain::compile("maxdepth=10;maxbytes=65536;!java.lang.Runtime;java.lang.*;java.util.**")
        .expect("failed to compile filter");

    println!("{filter}");

    // Evaluate a few decode positions
    let positions = [
        Query::new().class("java.lang.String").depth(1),
        Query::new().class("java.lang.Runtime").depth(1),
        Query::new().class("java.util.concurrent.ConcurrentHashMap").depth(2),
        Query::new().class("com.example.Gadget").depth(2),
        Query::new().depth(11),
    ];

    for query in &positions {
        let class = query.class_name().unwrap_or("<none>");
        match filter.evaluate(query) {
            Status::Allow => println!("{class}: allowed"),
            Status::Reject => println!("{class}: rejected"),
            Status::Undecided => println!("{class}: no rule matched"),
        }
    }
}
