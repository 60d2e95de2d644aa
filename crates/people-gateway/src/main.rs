use anyhow::Context;
use args::Args;
use clap::crate_version;
use mimalloc::MiMalloc;
use people_server::ServeConfig;
use tokio::runtime;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod args;
mod config;
mod telemetry;

const THREAD_NAME: &str = "people-gateway";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    let config = args.config()?;

    if args.print_schema {
        let schema = config::schema(&config)?;
        println!("{}", schema.sdl());

        return Ok(());
    }

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()
        .context("building the tokio runtime")?;

    runtime.block_on(async move {
        telemetry::init(&args)?;

        let crate_version = crate_version!();
        tracing::info!("People Gateway {crate_version}");

        let schema = config::schema(&config)?;
        tracing::debug!("GraphQL schema:\n{}", schema.sdl());

        let config = ServeConfig {
            listen_address: args.listen_address(&config),
            config,
        };

        people_server::serve(config, schema).await?;

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
