use anyhow::Result;
use clap::Parser;

use capsearch::cli::SubCommandExtend;
use capsearch::config::{Opts, SubCommand};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match &opts.subcmd {
        SubCommand::Search(cmd) => cmd.run(&opts).await,
        SubCommand::Server(cmd) => cmd.run(&opts).await,
        SubCommand::Describe(cmd) => cmd.run(&opts).await,
    }
}
