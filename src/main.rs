use clap::Parser;
use merge_user::config::toml_config::LogFormat;
use merge_user::utils::error::{ErrorSeverity, MergeUserError};
use merge_user::utils::{logger, validation::Validate};
use merge_user::{
    JsonFileAccountStore, MergeJob, SettingsFile, TimerEngine, TimerSchedule, TomlConfig,
};
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "merge-user")]
#[command(about = "Merge disabled users into an active user of the same organisation, then delete them")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "merge-user.toml")]
    config: String,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Show what would be merged without touching the account store
    #[arg(long)]
    dry_run: bool,

    /// Override schedule.interval_minutes from config
    #[arg(long)]
    interval: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines regardless of the config file
    #[arg(long)]
    json_logs: bool,
}

fn exit_code(e: &MergeUserError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &MergeUserError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌格式也在裡面，所以要先讀)
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let level = config.logging.as_ref().and_then(|l| l.level.as_deref());
    if args.json_logs || config.log_format() == LogFormat::Json {
        logger::init_json_logger(args.verbose, level);
    } else {
        logger::init_cli_logger(args.verbose, level);
    }

    tracing::info!("🚀 Starting {}", config.job.name);
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let schedule = args
        .interval
        .map(TimerSchedule::every_minutes)
        .unwrap_or_else(|| config.schedule());

    let store = JsonFileAccountStore::new(config.store_path());
    let job = MergeJob::new(store, SettingsFile::new(&args.config))
        .with_name(config.job.name.clone())
        .with_schedule(schedule);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the account store will not be modified");
        match job.dry_run().await {
            Ok(steps) if steps.is_empty() => println!("Nothing to merge"),
            Ok(steps) => {
                for step in steps {
                    println!("{}", step);
                }
            }
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    if args.once {
        match job.run_once().await {
            Ok(report) => {
                println!(
                    "✅ scanned {}, eligible {}, merged {}, failed {}, unresolved {}",
                    report.scanned,
                    report.eligible,
                    report.merged_count,
                    report.failed_count,
                    report.unresolved_count
                );
                if report.failed_count > 0 {
                    std::process::exit(2);
                }
            }
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("🛑 Shutdown requested, finishing current run");
            let _ = shutdown_tx.send(true);
        }
    });

    let engine = TimerEngine::new(job);
    engine.run_until(shutdown_rx).await;

    Ok(())
}
