//! chatform - terminal host for the conversational form wizard

mod render;
mod sink;

use anyhow::{Context, Result};
use chatform_catalog::Route;
use chatform_core::{resolve, Wizard, WizardConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};
use sink::StdoutSink;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command {
    Command::new("chatform")
        .version(chatform_core::VERSION)
        .about("Conversational contact-form wizard")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a TOML wizard configuration"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Tracing filter, overrides RUST_LOG"),
        )
        .subcommand(Command::new("run").about("Hold a conversation in the terminal"))
        .subcommand(
            Command::new("script")
                .about("Feed answers from a file, one per line")
                .arg(
                    Arg::new("answers")
                        .long("answers")
                        .required(true)
                        .help("File with one answer per line"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the final view as JSON"),
                )
                .arg(
                    Arg::new("no-delay")
                        .long("no-delay")
                        .action(ArgAction::SetTrue)
                        .help("Walk closing statements without waiting"),
                ),
        )
        .subcommand(
            Command::new("catalog")
                .about("Print the resolved question list")
                .arg(
                    Arg::new("route")
                        .long("route")
                        .help("project, career or other; base only when omitted"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "chatform=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<WizardConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => WizardConfig::load(path).with_context(|| format!("loading config {path}")),
        None => Ok(WizardConfig::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log-level").map(String::as_str));
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("run", _)) => run(config).await,
        Some(("script", args)) => script(config, args).await,
        Some(("catalog", args)) => catalog(&config, args),
        _ => Ok(()),
    }
}

async fn run(config: WizardConfig) -> Result<()> {
    let wizard = Wizard::from_config(config)?;
    wizard.set_open(true);
    tracing::info!(generation = %wizard.session_generation(), "conversation started");
    println!("(type :reset to start over, :quit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        wizard.settled().await;
        let view = wizard.view();
        render::flush_new(&wizard, &view);

        if view.is_finished {
            wizard.deliver(&StdoutSink).await?;
            break;
        }
        let Some(active) = view.active_question else {
            tracing::warn!(step = wizard.inspect(|n| n.state().step_index()), "no question to ask");
            break;
        };
        if let Some(error) = &view.pending_validation_error {
            println!("! {error}");
        }
        render::print_active(&active);

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        match line.trim() {
            ":quit" => break,
            ":reset" => {
                wizard.reset();
                continue;
            }
            _ => {}
        }

        let answer = render::interpret(&line, Some(&active));
        if let Err(e) = wizard.submit(&answer) {
            tracing::debug!(answer = %answer, error = %e, "answer refused");
        }
    }

    wizard.set_open(false);
    Ok(())
}

async fn script(config: WizardConfig, args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<String>("answers")
        .context("--answers is required")?;
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading answers from {path}"))?;
    let config = if args.get_flag("no-delay") {
        config.with_chain_delay(Duration::ZERO)
    } else {
        config
    };

    let wizard = Wizard::from_config(config)?;
    wizard.set_open(true);

    for line in source.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let active = wizard.view().active_question;
        let answer = render::interpret(line, active.as_ref());
        if let Err(e) = wizard.submit(&answer) {
            tracing::warn!(answer = %answer, error = %e, "answer refused");
        }
        wizard.settled().await;
    }

    let view = wizard.view();
    if args.get_flag("json") {
        let output = serde_json::json!({
            "view": view,
            "submission": wizard.submission(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for entry in &view.history {
        render::print_entry(entry);
    }
    match &view.active_question {
        Some(active) => {
            println!();
            println!("(waiting on {})", active.key);
        }
        None if view.is_finished => {
            wizard.deliver(&StdoutSink).await?;
        }
        None => {}
    }
    Ok(())
}

fn catalog(config: &WizardConfig, args: &ArgMatches) -> Result<()> {
    let catalog = config.catalog()?;
    let route = match args.get_one::<String>("route") {
        Some(route) => route.parse::<Route>()?,
        None => Route::Unset,
    };
    let resolved = resolve(&catalog, route);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!("Route: {route}");
    for entry in &resolved {
        let label = entry.question.key().unwrap_or("(closing)");
        let text = entry
            .question
            .prompt()
            .or_else(|| entry.question.statement())
            .unwrap_or_default();
        println!("{:>3}  {:<8} {:<16} {}", entry.slot, entry.origin, label, text);
    }
    Ok(())
}
