use std::process::ExitCode;

use unmarshal_filter::{FilterChain, FilterError, Query};

const VAR: &str = "UNMARSHAL_FILTER";

fn main() -> ExitCode {
    let filter = match FilterChain::from_env(VAR) {
        Ok(filter) => filter,
        Err(FilterError::Spec(err)) => {
            eprintln!("{err}");
            eprintln!("try: {VAR}='maxdepth=10;java.lang.*;!*' cargo run --example from_env -- java.lang.String");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    println!("filter: {filter}");
    for class in std::env::args().skip(1) {
        let status = filter.evaluate(&Query::new().class(&class));
        println!("{class}: {status}");
    }
    ExitCode::SUCCESS
}
