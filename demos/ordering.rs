use unmarshal_filter::{FilterChain, Query};

fn main() {
    // The first rule with an opinion decides, so declaration order matters.
    let specs = [
        "!java.lang.Runtime;java.lang.*",
        "java.lang.*;!java.lang.Runtime",
    ];
    let runtime = Query::new().class("java.lang.Runtime");

    for spec in specs {
        let filter = FilterChain::compile(spec).expect("failed to compile filter");
        let report = filter.explain(&runtime);
        println!("{spec}");
        println!("  java.lang.Runtime -> {report}");
    }

    // Exact names of one polarity share a single rule placed where the first
    // of them appeared.
    let filter = FilterChain::compile("com.a.X;!com.a.*;com.a.Y").expect("failed to compile filter");
    println!();
    println!("compiled: {filter}");
    for class in ["com.a.X", "com.a.Y", "com.a.Z"] {
        println!("  {class} -> {}", filter.evaluate(&Query::new().class(class)));
    }
}
