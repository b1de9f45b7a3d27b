use clap::Parser;
use pseudosap_lib::cli::CommonArgs;

/// Terminal entry point for PseudoSAP
///
/// This is a thin wrapper that delegates to the library crate.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    pseudosap_lib::run(args).await
}
