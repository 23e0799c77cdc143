use crate::cmd::{Cli, Commands};

mod cmd;
mod commit;
mod config;
mod conventional;
mod engine;
mod gate_error;
mod output;
mod repo;
mod report;
mod rules;
mod spell;

/// Each -v widens the log filter by one level, starting from warnings.
/// RUST_LOG still wins when set.
fn init_logging(verbose: u8) {
    let level = [
        log::LevelFilter::Warn,
        log::LevelFilter::Info,
        log::LevelFilter::Debug,
        log::LevelFilter::Trace,
    ][usize::from(verbose).min(3)];

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn main() {
    let cli_instance_wrap = Cli::new();

    if let Some(cli_instance) = cli_instance_wrap {
        init_logging(cli_instance.verbose);

        let result = match &cli_instance.command {
            Some(Commands::Validate(args)) => cmd::validate::run(args),
            Some(Commands::InstallHook) => cmd::hook::install().map(|()| 0),
            Some(Commands::RemoveHook) => cmd::hook::remove().map(|()| 0),
            None => cmd::validate::run(&cmd::validate::ValidateArgs::default()),
        };

        match result {
            Ok(code) => std::process::exit(code),
            Err(err) => {
                err.print_error();
                std::process::exit(1);
            }
        }
    }
}
