//! drupal-updater - Drupal maintenance helper
//!
//! Consolidates configuration, updates composer packages one by one with a
//! commit per package, and reports what is still outdated.

use clap::Parser;
use drupal_updater::cli::{Cli, Command, Format, UpdateArgs};
use drupal_updater::config::RunContext;
use drupal_updater::exec::SystemRunner;
use drupal_updater::orchestrator::Orchestrator;
use drupal_updater::output::{create_formatter, Console};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Update(args) => update(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn initialize_logger(args: &UpdateArgs) -> anyhow::Result<()> {
    let filter = if args.quiet {
        simplelog::LevelFilter::Error
    } else if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Warn
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("drupal_updater")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

/// Run the `update` subcommand
async fn update(args: UpdateArgs) -> anyhow::Result<()> {
    initialize_logger(&args)?;

    let ctx = RunContext::resolve(&args)?;
    ctx.check_project()?;
    log::debug!(
        "drupal-updater v{} in {}",
        env!("CARGO_PKG_VERSION"),
        ctx.project_dir.display()
    );

    let runner = SystemRunner::new(&ctx.project_dir)
        .with_timeout(ctx.command_timeout)
        .with_progress(!args.quiet && io::stderr().is_terminal());

    // JSON keeps stdout for the document alone.
    let (mut narration, narration_color): (Box<dyn Write>, bool) = match args.format {
        Format::Text => (Box::new(io::stdout()), io::stdout().is_terminal()),
        Format::Json => (Box::new(io::stderr()), io::stderr().is_terminal()),
    };
    let console = Console::new(narration.as_mut(), args.quiet).with_color(narration_color);
    let formatter = create_formatter(args.format, io::stdout().is_terminal());

    let mut orchestrator = Orchestrator::new(&ctx, &runner, console);
    let report = orchestrator.run(formatter.as_ref(), &mut io::stdout()).await?;

    let failed = report.failed().count();
    if failed > 0 {
        log::warn!("{} package(s) failed to update and were reverted", failed);
    }
    Ok(())
}
