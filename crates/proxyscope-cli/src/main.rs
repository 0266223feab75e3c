//! Binary entrypoint for the `proxyscope` command.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = proxyscope_cli::run().await;
    std::process::exit(code);
}
