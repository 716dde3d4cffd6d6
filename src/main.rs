use bulk_user_export::utils::error::ErrorSeverity;
use bulk_user_export::utils::progress::{ConsoleProgress, SilentProgress};
use bulk_user_export::utils::{logger, validation::Validate};
use bulk_user_export::{
    Batcher, CliArgs, ConfigPreconditions, DeliveryClient, ExportConfig, ExportError, ImportRun,
    JsonLinesSource, RunSummary,
};
use clap::Parser;

/// Number of rejected entries echoed to the console.
const FAILED_PREVIEW: usize = 10;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting bulk user export");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    match export(&args).await {
        Ok(summary) => {
            summary.log_summary();
            print_summary(&summary, args.dry_run);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn export(args: &CliArgs) -> Result<RunSummary, ExportError> {
    let config = ExportConfig::from_file(&args.config)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    // 前置條件由 ImportRun 在讀取來源前檢查；來源檔案延遲到第一頁才開啟
    let checks = ConfigPreconditions::new(&config);
    let source = JsonLinesSource::new(config.source.path.clone().unwrap_or_default());
    tracing::debug!("Record source: {}", source.path().display());

    let client = DeliveryClient::from_config(&config)?;
    let run = ImportRun::from_batcher(Batcher::with_page_size(source, config.page_size()), client);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no batches will be sent");
        return run.dry_run(&checks).await;
    }

    if args.no_progress {
        run.run(&checks, &mut SilentProgress).await
    } else {
        run.run(&checks, &mut ConsoleProgress::stdout()).await
    }
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    if dry_run {
        println!(
            "🔍 Would send {} records in {} batches ({} skipped)",
            summary.total_sent, summary.batches, summary.skipped
        );
        return;
    }

    println!("✅ Export completed in {:?}", summary.duration);
    println!("📤 Sent: {}", summary.total_sent);
    println!("⚠️  Failed: {}", summary.total_failed());
    if summary.skipped > 0 {
        println!("⏭️  Skipped (no user_id or email): {}", summary.skipped);
    }

    for entry in summary.failed.iter().take(FAILED_PREVIEW) {
        println!("   {}", entry);
    }
    if summary.total_failed() > FAILED_PREVIEW {
        println!("   ... and {} more", summary.total_failed() - FAILED_PREVIEW);
    }
}
