use anyhow::Context;
use clap::Parser;
use plan_quoter::app::form::QuoteForm;
use plan_quoter::app::QuoterApp;
use plan_quoter::config::{CliConfig, Command, QuoterConfig};
use plan_quoter::core::snapshot::PricingSnapshot;
use plan_quoter::core::store::PricingStore;
use plan_quoter::core::updater::UPDATE_SUCCESS_MESSAGE;
use plan_quoter::utils::error::{ErrorSeverity, QuoterError};
use plan_quoter::utils::{logger, validation};
use plan_quoter::utils::validation::Validate;
use plan_quoter::{GeminiExtractor, LocalStorage};

type App = QuoterApp<GeminiExtractor<plan_quoter::config::ExtractorConfig>, LocalStorage>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting plan-quoter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let storage = LocalStorage::new(".".to_string());
    let store = match seed_store(&cli, &config, &storage).await {
        Ok(store) => store,
        Err(e) => exit_with(&e),
    };

    if matches!(cli.command, Command::UpdatePrices { .. }) {
        if let Err(e) = config.extractor.validate_for_extraction() {
            exit_with(&e);
        }
    }

    let formatter = config
        .currency_format()
        .context("currency format was validated above")?;
    let extractor = GeminiExtractor::new(config.extractor.clone());
    let app: App = QuoterApp::new(store, extractor, storage, formatter);

    match cli.command {
        Command::Quote { aportes, edad, plan } => {
            let view = app.quote(&QuoteForm::new(&aportes, &edad, plan));
            println!("Aporte Total Calculado: {}", view.contribution_total);
            println!("{}", view.result);
        }
        Command::UpdatePrices { image, output } => {
            match app.update_prices(&image, output.as_deref()).await {
                Ok(report) => {
                    println!("{}", UPDATE_SUCCESS_MESSAGE);
                    if !report.missing_cells.is_empty() {
                        println!(
                            "Atención: {} precios no se pudieron leer de la imagen.",
                            report.missing_cells.len()
                        );
                    }
                    println!("{}", app.prices_report());
                    if let Some(path) = output {
                        println!("Tabla guardada en: {}", path);
                    }
                }
                Err(e) => exit_with(&e),
            }
        }
        Command::Prices => println!("{}", app.prices_report()),
        Command::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            app.run_session(stdin, &mut stdout)
                .await
                .context("interactive session failed")?;
        }
    }

    Ok(())
}

async fn seed_store(
    cli: &CliConfig,
    config: &QuoterConfig,
    storage: &LocalStorage,
) -> plan_quoter::Result<PricingStore> {
    let table = match &cli.prices {
        Some(path) => {
            let snapshot = PricingSnapshot::load(storage, path).await?;
            tracing::info!(
                "Using prices from {} (source: {}, updated {})",
                path,
                snapshot.source,
                snapshot.updated_at
            );
            snapshot.table
        }
        None => config.initial_table(),
    };

    validation::validate_prices("pricing", &table)?;
    Ok(PricingStore::new(table))
}

fn exit_with(e: &QuoterError) -> ! {
    tracing::error!(
        "plan-quoter failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
