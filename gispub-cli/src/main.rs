//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    gispub_cli::run().await?;
    Ok(())
}
