use anyhow::Result;
use clap::Parser;
use facelog::{
    cli::{run_cli, Args},
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::enable_logging,
        runtime::single_thread_runtime,
    },
};
use tracing::{error, level_filters::LevelFilter};

fn main() -> Result<()> {
    let args = Args::parse();
    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(args.log_prefix(), &app_dir, logging_level, args.log)?;

    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(run_cli(args, app_dir));
    // A pending stdin read can't be cancelled and would keep the runtime alive.
    runtime.shutdown_background();

    result.inspect_err(|e| {
        error!("Error running cli {e:?}");
    })
}
