mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use scriptcheck::config::Config;
use scriptcheck::runtime::{self, shellcheck};
use scriptcheck::{error::Error, output};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(if cli.verbose { "debug" } else { "warn" }))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            ref patterns,
            ref shell,
            ref format,
            output: ref output_path,
            ref flags,
        } => {
            let mut config = load_config(&cli, shell.as_deref());
            config.shellcheck.args.extend(flags.iter().cloned());

            let report = runtime::check(&config, patterns).unwrap_or_else(|e| fail(&e));
            let formatted = output::format_report(&report, format);

            if let Some(out_path) = output_path {
                std::fs::write(out_path, &formatted).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {e}");
                    std::process::exit(2);
                });
                eprintln!("Output written to {}", out_path.display());
            } else {
                print!("{formatted}");
            }

            let code = if !report.errors.is_empty() {
                2
            } else if report.passed {
                0
            } else {
                1
            };
            std::process::exit(code);
        }

        Commands::Extract {
            ref patterns,
            ref shell,
            output: ref output_dir,
        } => {
            let config = load_config(&cli, shell.as_deref());
            let summary =
                runtime::extract(&config, patterns, output_dir).unwrap_or_else(|e| fail(&e));

            for path in &summary.written {
                println!("{}", path.display());
            }
            for e in &summary.errors {
                eprintln!("Error: {}: {}", e.file, e.message);
            }
            eprintln!(
                "Extracted {} scripts from {} files into {}",
                summary.written.len(),
                summary.files,
                output_dir.display()
            );

            std::process::exit(if summary.errors.is_empty() { 0 } else { 2 });
        }

        Commands::CheckTools => {
            println!("{}", "Tool Availability".bold().underline());
            println!();

            let available = shellcheck::which_exists(shellcheck::SHELLCHECK);
            let status = if available {
                "READY".green().bold().to_string()
            } else {
                "NOT AVAILABLE".red().to_string()
            };
            println!(
                "  [{status}] {name:<20} {desc}",
                name = shellcheck::SHELLCHECK,
                desc = "Shell script linting (required by `check`)",
            );

            if !available {
                println!();
                println!("Install shellcheck: https://github.com/koalaman/shellcheck#installing");
            }
        }
    }
}

/// Loads the configuration file and applies the global and per-command
/// overrides.
fn load_config(cli: &Cli, shell: Option<&str>) -> Config {
    let mut config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| fail(&e));

    if let Some(pipeline) = cli.pipeline {
        config.pipeline = pipeline;
    }
    if cli.merge {
        config.merge = true;
    }
    if cli.strict {
        config.strict = true;
    }
    if let Some(shell) = shell {
        config.shell = shell.to_string();
    }
    config
}

fn fail(e: &Error) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(2);
}
