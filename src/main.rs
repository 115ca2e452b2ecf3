use clap::Parser;
use meldseal::cli::commands::seal::SealArgs;
use meldseal::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `meldseal=debug`.
const LOG_ENV: &str = "MELDSEAL_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encrypt {
            ref text,
            ref hint,
            ref format,
        } => meldseal::cli::commands::encrypt::execute(
            &cli,
            text.as_deref(),
            hint.as_deref(),
            format.as_deref(),
        ),
        Commands::Decrypt { ref text } => {
            meldseal::cli::commands::decrypt::execute(&cli, text.as_deref())
        }
        Commands::Scan { ref file } => meldseal::cli::commands::scan::execute(file),
        Commands::Seal {
            ref file,
            ref find,
            ref hint,
            ref format,
            in_place,
        } => meldseal::cli::commands::seal::execute(
            &cli,
            SealArgs {
                file,
                find,
                hint: hint.as_deref(),
                format: format.as_deref(),
                in_place,
            },
        ),
        Commands::Reveal { ref file, in_place } => {
            meldseal::cli::commands::reveal::execute(&cli, file, in_place)
        }
        Commands::Version => meldseal::cli::commands::version::execute(),
        Commands::Completions { ref shell } => meldseal::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        meldseal::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr; `MELDSEAL_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "meldseal=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
