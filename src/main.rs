use std::path::PathBuf;

use action_flow::{Flow, FlowResult};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use robot_runner::{
    cli::{emit, render_human, OutputFormat},
    config::{default_config_path, load_config, Config},
    params::{collect_params, parse_param},
    prepare_flow, quiz_flow, run_simulated, run_webdriver,
    scenario::load_flow_file,
    simulated_quiz_page,
};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Robot - scripted LMS quiz runs over WebDriver
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quiz scenario (or a flow file) against a WebDriver server
    Run(RunArgs),

    /// Run the quiz scenario against an in-memory page
    Demo(DemoArgs),

    /// Print the built-in flow as YAML
    Show,

    /// Show build and configuration details
    Info,
}

#[derive(Args)]
struct RunArgs {
    /// Flow document (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "FILE")]
    flow: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, value_name = "URL")]
    webdriver: Option<String>,

    /// Run Chrome headless
    #[arg(long)]
    headless: bool,

    /// Placeholder value, e.g. --param username=jdoe
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Wait timeout per element
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Poll interval while waiting
    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,
}

#[derive(Args)]
struct DemoArgs {
    /// Placeholder value, e.g. --param username=jdoe
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug)?;

    info!("Starting robot v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref()).await?;

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args, &config, cli.output).await,
        Commands::Demo(args) => cmd_demo(args, &config, cli.output).await,
        Commands::Show => cmd_show(&config).map(|_| true),
        Commands::Info => cmd_info(&config, cli.config.as_ref(), cli.output).map(|_| true),
    };

    match result {
        Ok(true) => {
            info!("Command completed successfully");
            Ok(())
        }
        Ok(false) => {
            error!("Flow failed");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

async fn cmd_run(args: RunArgs, config: &Config, output: OutputFormat) -> Result<bool> {
    let mut flow = match &args.flow {
        Some(path) => load_flow_file(path).await?,
        None => quiz_flow(config.wait.clone()),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        flow.wait = flow.wait.with_timeout_ms(timeout_ms);
    }
    if let Some(poll_ms) = args.poll_ms {
        flow.wait = flow.wait.with_poll_interval_ms(poll_ms);
    }
    let flow = prepare_flow(flow, &collect_params(args.params));

    let mut webdriver = config.webdriver.clone();
    if let Some(url) = args.webdriver {
        webdriver.url = url;
    }
    webdriver.headless |= args.headless;

    info!(flow = %flow.id, webdriver = %webdriver.url, "Running flow");
    let result = run_webdriver(&flow, &webdriver).await?;
    report(&result, output)
}

async fn cmd_demo(args: DemoArgs, config: &Config, output: OutputFormat) -> Result<bool> {
    let flow = prepare_flow(quiz_flow(config.wait.clone()), &collect_params(args.params));
    info!(flow = %flow.id, "Running flow against the simulated page");
    let result = run_simulated(&flow, simulated_quiz_page()).await?;
    report(&result, output)
}

fn cmd_show(config: &Config) -> Result<()> {
    let flow: Flow = quiz_flow(config.wait.clone());
    print!("{}", serde_yaml::to_string(&flow)?);
    Ok(())
}

fn cmd_info(config: &Config, config_path: Option<&PathBuf>, output: OutputFormat) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let info = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "build_date": env!("BUILD_DATE"),
        "git_hash": env!("GIT_HASH"),
        "git_branch": env!("GIT_BRANCH"),
        "config_path": config_path.display().to_string(),
        "webdriver_url": config.webdriver.url,
        "wait": config.wait,
    });

    emit(&info, output, || {
        format!(
            "robot {} ({} {}, built {})\nconfig:    {}\nwebdriver: {}\nwait:      {} ms timeout, {} ms poll\n",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_BRANCH"),
            env!("GIT_HASH"),
            env!("BUILD_DATE"),
            config_path.display(),
            config.webdriver.url,
            config.wait.timeout_ms,
            config.wait.poll_interval_ms,
        )
    })
}

fn report(result: &FlowResult, output: OutputFormat) -> Result<bool> {
    emit(result, output, || render_human(result))?;
    Ok(result.success)
}
