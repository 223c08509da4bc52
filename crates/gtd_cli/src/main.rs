//! Terminal shell for the GTD client.
//!
//! # Responsibility
//! - Parse process flags, load configuration and initialise logging.
//! - Drive one `App` from line commands and print what changed.
//!
//! # Invariants
//! - Bootstrap failures print the full cause chain and exit non-zero.
//! - Confirmation prompts are answered from a preset, so a command never
//!   waits on a second line of input.

mod commands;

use clap::Parser;
use commands::{parse, Command, HELP};
use gtd_core::{
    bootstrap_error_report, default_log_level, init_logging, init_stderr_logging, App,
    AppConfig, AppSnapshot, FixedPrompter, InMemoryGtdApi, RouteError, SystemClock,
};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Debug, Parser)]
#[command(name = "gtd", version, about = "Capture and clarify things from the terminal")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL; overrides the configuration file.
    #[arg(long)]
    base_url: Option<String>,
    /// Use an in-process backend instead of HTTP.
    #[arg(long)]
    offline: bool,
    #[arg(long)]
    log_level: Option<String>,
    /// Write rolling log files here instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Initial fragment, e.g. `review` or `clarify?thingId=3`.
    #[arg(long, default_value = "")]
    route: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("gtd: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    if let Some(level) = args.log_level {
        config.logging.level = Some(level);
    }
    if let Some(dir) = args.log_dir {
        config.logging.dir = Some(dir);
    }
    start_logging(&config);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("gtd: failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run(config, args.offline, &args.route))
}

fn start_logging(config: &AppConfig) {
    let level = config
        .logging
        .level
        .as_deref()
        .unwrap_or(default_log_level());
    let result = match config.logging.dir.as_deref() {
        Some(dir) => init_logging(level, &dir.to_string_lossy()),
        None => init_stderr_logging(level),
    };
    if let Err(err) = result {
        eprintln!("gtd: logging disabled: {err}");
    }
}

async fn run(config: AppConfig, offline: bool, route: &str) -> ExitCode {
    let prompter = Rc::new(FixedPrompter::new(true));
    let clock = Rc::new(SystemClock);
    let built = if offline {
        App::bootstrap(
            &config,
            Rc::new(InMemoryGtdApi::new()),
            prompter.clone(),
            clock,
            route,
        )
    } else {
        App::connect(&config, prompter.clone(), clock, route)
    };
    let mut app = match built {
        Ok(app) => app,
        Err(err) => {
            eprintln!("gtd: {}", bootstrap_error_report(&err));
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = app.start().await {
        eprintln!("gtd: {}", bootstrap_error_report(&err.into()));
        return ExitCode::FAILURE;
    }
    info!("event=cli_start module=app status=ok offline={offline}");
    print_status(&app.snapshot());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("gtd> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let command = match parse(&line) {
            Ok(command) => command,
            Err(commands::ParseError::Empty) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(err) = execute(&mut app, &prompter, command).await {
            warn!("event=cli_command module=app status=error error={err}");
            println!("error: {err}");
        }
    }
    ExitCode::SUCCESS
}

async fn execute(
    app: &mut App,
    prompter: &FixedPrompter,
    command: Command,
) -> Result<(), RouteError> {
    match command {
        Command::Go(path) => {
            app.navigate(&path).await?;
        }
        Command::Hash(fragment) => {
            app.set_fragment(&fragment).await?;
        }
        Command::Back => {
            app.back().await?;
        }
        Command::Forward => {
            app.forward().await?;
        }
        Command::Click(id) => {
            app.click(&id).await?;
        }
        Command::Pick {
            container,
            class,
            index,
        } => {
            app.click_rendered(&container, &class, index).await?;
        }
        Command::Type { id, text } => {
            app.type_into(&id, &text).await?;
        }
        Command::Submit(form) => {
            app.submit(&form).await?;
        }
        Command::Key(key) => {
            app.key_down(key).await?;
        }
        Command::Confirm(answer) => {
            prompter.set_answer(answer);
            println!("confirmations will answer {}", if answer { "yes" } else { "no" });
            return Ok(());
        }
        Command::Tick => app.tick_now(),
        Command::Online(online) => app.on_connectivity_change(online),
        Command::Show => {
            println!("{}", app.snapshot().html);
            return Ok(());
        }
        Command::State => {
            match serde_json::to_string_pretty(&app.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("error: {err}"),
            }
            return Ok(());
        }
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }
    print_status(&app.snapshot());
    Ok(())
}

fn print_status(snapshot: &AppSnapshot) {
    let view = snapshot.visible_view.as_deref().unwrap_or("-");
    println!("[{view}] #{}", snapshot.fragment);
    if let (Some(kind), Some(message)) = (&snapshot.toast_kind, &snapshot.toast) {
        println!("  {kind}: {message}");
    }
    if !snapshot.announcement.is_empty() {
        println!("  {}", snapshot.announcement);
    }
}
