use std::io;
use std::path::Path;

use anyhow::Context;
use object_statics::demo::{DemoRunner, catalog};
use object_statics::{DemoConfig, OutputFormat};

fn main() {
    match run(std::env::args().skip(1).collect()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(2);
        }
    }
}

#[derive(Debug, Default)]
struct CliArgs {
    json: bool,
    events: bool,
    blocks: Vec<String>,
    config: Option<String>,
}

/// Returns whether every block passed.
fn run(args: Vec<String>) -> Result<bool, String> {
    let Some(cli) = parse_args(&args)? else {
        println!("{}", usage());
        return Ok(true);
    };

    let config = build_config(&cli).map_err(|error| format!("{error:#}"))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = DemoRunner::new()
        .run(&config, &mut out)
        .map_err(|error| format!("demo run failed: {error}"))?;
    Ok(report.passed())
}

/// `None` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<CliArgs>, String> {
    let mut cli = CliArgs::default();

    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--json" => cli.json = true,
            "--events" => cli.events = true,
            "--block" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| "--block requires a block name".to_string())?;
                cli.blocks.push(value.clone());
            }
            "--config" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| "--config requires a path".to_string())?;
                cli.config = Some(value.clone());
            }
            "help" | "--help" | "-h" => return Ok(None),
            flag => return Err(format!("unknown flag '{flag}'\n\n{}", usage())),
        }
        index += 1;
    }

    Ok(Some(cli))
}

fn build_config(cli: &CliArgs) -> anyhow::Result<DemoConfig> {
    let mut config = match &cli.config {
        Some(path) => DemoConfig::load(Path::new(path))
            .with_context(|| format!("failed to load demo config '{path}'"))?,
        None => DemoConfig::default(),
    };
    if cli.json {
        config.format = OutputFormat::Json;
    }
    if cli.events {
        config.emit_events = true;
    }
    if !cli.blocks.is_empty() {
        config.blocks = cli.blocks.clone();
    }
    Ok(config)
}

fn usage() -> String {
    let names: Vec<&str> = catalog().iter().map(|b| b.name).collect();
    [
        "object_statics_demo usage:".to_string(),
        "  object_statics_demo [--json] [--events] [--block <name>]... [--config <path>]".to_string(),
        String::new(),
        "  --json            print the full run report as one JSON document".to_string(),
        "  --events          append structured log events as JSON lines".to_string(),
        "  --block <name>    run only the named block (repeatable)".to_string(),
        "  --config <path>   JSON run configuration; flags override its values".to_string(),
        String::new(),
        format!("blocks: {}", names.join(", ")),
    ]
    .join("\n")
}
