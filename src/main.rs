mod cli;

use sidbroker::config::{self, persist};
use sidbroker::{engines, Broker, DispatchOutcome};
use sidbroker_common::EngineName;
use sidbroker_sid::Sid;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "sidbroker=trace,sidbroker_rules=trace,sidbroker_runner=trace,sidbroker_sid=debug"
                .to_string()
        } else {
            "sidbroker=info,sidbroker_rules=warn,sidbroker_runner=info".to_string()
        }
    });

    // Logs go to stderr so `--json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Actions { sid, engine } => {
            list_actions(&sid, engine.as_deref(), config_path, cli.json)
        }
        Commands::Jobs { sid, action } => list_jobs(&sid, &action, config_path, cli.json),
        Commands::Run {
            action,
            sid,
            engine,
            dry_run,
        } => run_action(&action, &sid, engine.as_deref(), config_path, dry_run, cli.json),
        Commands::Engine => show_engine(config_path),
        Commands::CheckTools => check_tools(config_path),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Init { path, force } => init_config(&path, force),
        Commands::Version => {
            println!("sidbroker {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn parse_sid(sid: &str) -> Result<Sid> {
    Sid::parse(sid).with_context(|| format!("Invalid sid: {sid:?}"))
}

fn load_broker(config_path: Option<&Path>) -> Result<(config::Config, Broker)> {
    let config = config::load_config_or_default(config_path)?;
    let engine = engines::select(config.broker.engine.as_ref(), &config.broker.sid_root)?;
    let broker = Broker::from_config(&config)?.with_engine(engine.as_ref());
    Ok((config, broker))
}

fn list_actions(sid: &str, engine: Option<&str>, config_path: Option<&Path>, json: bool) -> Result<()> {
    let sid = parse_sid(sid)?;
    let engine = engine.map(EngineName::new).transpose()?;
    let (_, broker) = load_broker(config_path)?;

    let actions = broker.get_actions(&sid, engine.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
        return Ok(());
    }

    if actions.is_empty() {
        println!("No actions for {sid}");
        return Ok(());
    }
    for action in actions {
        print!("{:<24} {:<20} [{}]", action.name, action.display_label(), action.tier.as_str());
        if !action.description.is_empty() {
            print!(" {}", action.description);
        }
        println!();
    }
    Ok(())
}

fn list_jobs(sid: &str, action: &str, config_path: Option<&Path>, json: bool) -> Result<()> {
    let sid = parse_sid(sid)?;
    let (_, broker) = load_broker(config_path)?;

    let jobs = broker.get_jobs(&sid, action)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No jobs for action '{action}' on {sid}");
        return Ok(());
    }
    for (i, job) in jobs.iter().enumerate() {
        let target = match (&job.call, &job.batch) {
            (Some(call), _) => format!("call {call}"),
            (None, Some(batch)) => format!("batch {}", batch.command),
            (None, None) => "no target".to_string(),
        };
        println!("  {}. {} ({})", i + 1, job.name, target);
    }
    Ok(())
}

fn run_action(
    action: &str,
    sid: &str,
    engine: Option<&str>,
    config_path: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let sid = parse_sid(sid)?;
    let engine = engine.map(EngineName::new).transpose()?;
    let (config, broker) = load_broker(config_path)?;
    let broker = broker.with_dry_run(dry_run || config.broker.dry_run);

    tracing::info!("Running action '{}' on {}", action, sid);
    let outcome = match &engine {
        Some(engine) => broker.run_action_for_engine(action, &sid, engine)?,
        None => broker.run_action(action, &sid)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        DispatchOutcome::NoJob { action, sid } => {
            println!("No job found for action '{action}' on {sid}. Nothing to do.");
        }
        DispatchOutcome::Succeeded { job, .. } => {
            println!("Job '{job}' completed");
        }
        DispatchOutcome::Launched { job, pid, command, .. } => {
            println!("Job '{job}' launched (pid {pid}): {command}");
        }
        DispatchOutcome::DryRun {
            job, description, ..
        } => {
            println!("[DRY RUN] Job '{job}' would run: {description}");
        }
    }
    Ok(())
}

fn show_engine(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let engine = engines::select(config.broker.engine.as_ref(), &config.broker.sid_root)?;
    let broker = Broker::from_config(&config)?.with_engine(engine.as_ref());

    println!("Engine: {} ({})", engine.display_name(), engine.name());
    println!(
        "Implements: {}",
        engine.implements().iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("Batch: {}", engine.is_batch());
    match engine.current_sid() {
        Some(sid) => println!("Current sid: {sid}"),
        None => println!("Current sid: -"),
    }
    println!(
        "Callables: {}",
        broker.registry().keys().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking batch job commands...\n");

    let config = config::load_config_or_default(config_path)?;
    let (_, jobs) = config.catalogs()?;
    let tools = sidbroker_runner::check_batch_tools(&jobs, &config.package_set());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {} (job '{}')", status, tool.command, tool.job);

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        if let Some(ref error) = tool.error {
            print!(" - {}", error);
        }

        println!();
    }

    println!();
    if tools.is_empty() {
        println!("No batch jobs configured.");
    } else if all_ok {
        println!("All batch tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all batch jobs.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    let (actions, jobs) = config.catalogs()?;
    println!("✓ Configuration is valid");
    println!("  Sid root: {}", config.broker.sid_root.display());
    match &config.broker.engine {
        Some(engine) => println!("  Engine: {engine}"),
        None => println!("  Engine: detected"),
    }
    println!("  Actions: {}", actions.len());
    for tier in [
        sidbroker_rules::Tier::Engine,
        sidbroker_rules::Tier::Global,
        sidbroker_rules::Tier::Universal,
    ] {
        println!("    {}: {}", tier.as_str(), actions.tier(tier).count());
    }
    println!("  Jobs: {}", jobs.len());
    println!("  Packages: {}", config.packages.len());

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    persist::save_config(path, &config::Config::default(), force)?;
    println!("Wrote built-in catalog to {}", path.display());
    Ok(())
}
