/// rhythm-proc CLI
///
/// Runs and checks scripted procedures from the command line.

use rhythm_proc::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
