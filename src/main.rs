use clap::{Parser, Subcommand};
use speedtest_relay::config::RelayConfig;
use speedtest_relay::runner::{DeliveryOutcome, run_cycle};
use std::path::PathBuf;

#[derive(Parser, Clone)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Run one measurement cycle and deliver the result
    Run {
        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "speedtest-relay.toml")]
        config: PathBuf,

        /// Measure only - disable publishing and the backup spool for this run
        #[arg(long)]
        dry_run: bool,

        /// Quiet mode - minimal output, only show summary
        #[arg(short, long)]
        quiet: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Run {
            config,
            dry_run,
            quiet,
        } => {
            run_relay(config, dry_run, quiet).await?;
        }
    }
    Ok(())
}

async fn run_relay(config_path: PathBuf, dry_run: bool, quiet: bool) -> anyhow::Result<()> {
    // Initialize tracing based on quiet mode
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if quiet {
        EnvFilter::new("speedtest_relay=warn,rdkafka=off")
    } else {
        EnvFilter::new("speedtest_relay=info,rdkafka=warn")
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let mut config = RelayConfig::load(&config_path).await?;

    if dry_run {
        println!("DRY RUN MODE - the result will not be published or spooled");
        println!();
        config.kafka = None;
        config.backup = None;
    }

    if !quiet {
        println!("Speedtest Relay");
        println!("===============");
        println!("Config: {}", config_path.display());
        println!(
            "Command: {} {}",
            config.measurement.command,
            config.measurement.args.join(" ")
        );
        match &config.kafka {
            Some(kafka) => println!("Publish: '{}' via {}", kafka.topic, kafka.bootstrap_brokers),
            None => println!("Publish: disabled"),
        }
        match &config.backup {
            Some(path) => println!("Backup: {}", path.display()),
            None => println!("Backup: disabled"),
        }
        println!();
    }

    let report = run_cycle(&config).await?;

    println!();
    println!("Cycle Summary");
    println!("=============");
    println!("Outcome: {}", report.outcome);
    println!(
        "Payload: {} bytes{}",
        report.payload.len(),
        if report.augmented {
            ""
        } else {
            " (verbatim, not decoded)"
        }
    );
    println!("Duration: {:.2}s", report.duration.as_secs_f64());

    if let Some(reason) = &report.publish_failure {
        println!();
        println!("Publish failed! The result has been preserved for later retry:");
        for path in &report.spooled_to {
            println!("  {}", path.display());
        }
        println!("Reason: {}", reason);
    } else if !report.spooled_to.is_empty() {
        println!();
        println!("Spooled to:");
        for path in &report.spooled_to {
            println!("  {}", path.display());
        }
    }

    if dry_run && report.outcome == DeliveryOutcome::Skipped {
        println!();
        println!("Result:");
        println!("{}", report.payload);
    }

    Ok(())
}
