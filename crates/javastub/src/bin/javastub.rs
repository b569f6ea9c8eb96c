//! Minimal CLI: reads a JSON [`javastub_core::Request`] from a file (or
//! stdin with `-`) and prints the resulting JSON [`javastub_core::Outcome`]
//! to stdout.

use std::io::Read;

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let request_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: javastub <request.json|->");
            std::process::exit(2);
        }
    };

    let text = if request_path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).expect("failed to read request from stdin");
        buf
    } else {
        std::fs::read_to_string(&request_path).unwrap_or_else(|err| {
            eprintln!("failed to read {request_path}: {err}");
            std::process::exit(2);
        })
    };

    let request: javastub_core::Request = serde_json::from_str(&text).unwrap_or_else(|err| {
        eprintln!("failed to parse request: {err}");
        std::process::exit(2);
    });

    let outcome = javastub::run(&request);
    let is_success = outcome.status.is_success();
    println!("{}", serde_json::to_string_pretty(&outcome).expect("outcome is always serializable"));
    std::process::exit(if is_success { 0 } else { 1 });
}
