use clap::Parser;
use docker_housekeeping::cli::{Args, Runner};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let runner = Runner::new(args);

    if let Err(e) = runner.run().await {
        runner.output().error(&e.to_string());
        std::process::exit(1);
    }
}
