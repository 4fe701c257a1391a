//! IRRE CLI - disassembler and IL lifter

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, cli.silent))
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(commands::run_command(&cli));
}

/// `RUST_LOG` (default `irre=info`), with `--verbose`/`--silent` layered on top.
fn log_filter(verbose: bool, silent: bool) -> EnvFilter {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("irre=info"));
    let level = if verbose {
        Some("irre=debug")
    } else if silent {
        Some("irre=error")
    } else {
        None
    };
    let Some(directive) = level.and_then(|l| l.parse::<Directive>().ok()) else {
        return filter;
    };
    filter.add_directive(directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_flags() {
        assert!(log_filter(true, false).to_string().contains("irre=debug"));
        assert!(log_filter(false, true).to_string().contains("irre=error"));
    }
}
