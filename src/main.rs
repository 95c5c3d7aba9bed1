use clap::Parser;
use fxlab::adapters::json_config_adapter::JsonConfigAdapter;
use fxlab::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        JsonConfigAdapter::new(&cli.config)
            .read()
            .map(|c| c.framework.log_level.to_lowercase())
            .unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fxlab={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    run(cli)
}
