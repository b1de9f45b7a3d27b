use clap::Parser;
use std::net::SocketAddr;

use pseudosap_lib::cli::CommonArgs;

/// PseudoSAP web front end
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init_logging();

    let state = pseudosap_lib::build_state(&args.common)?;
    pseudosap_lib::web_server::serve(state, args.bind).await
}
