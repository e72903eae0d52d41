// src/main.rs

use warden::{cli, run};

#[tokio::main]
async fn main() {
    match run(cli::parse()).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("warden error: {err:?}");
            std::process::exit(1);
        }
    }
}
