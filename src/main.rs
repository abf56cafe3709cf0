use anyhow::Context;
use clap::Parser;
use gesture_plot::config::cli::Command;
use gesture_plot::config::toml_config::TomlConfig;
use gesture_plot::utils::error::ErrorSeverity;
use gesture_plot::utils::logger;
use gesture_plot::utils::validation::{validate_file_extensions, Validate};
use gesture_plot::{CliConfig, Hand, LocalStorage, PlotEngine, PlotError, PlotSettings};
use std::path::PathBuf;

fn load_settings(config: &CliConfig) -> anyhow::Result<PlotSettings> {
    let mut settings = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)
                .with_context(|| format!("Failed to load config file '{}'", path.display()))?
                .into_settings()
        }
        None => PlotSettings::default(),
    };

    if let Some(output) = &config.output {
        tracing::info!("🔧 Output root overridden to: {}", output.display());
        settings = settings.with_output_root(output.clone());
    }

    Ok(settings)
}

fn run(engine: &PlotEngine<LocalStorage, PlotSettings>, command: Command) -> Result<Vec<PathBuf>, PlotError> {
    match command {
        Command::Single { file, hand, range } => Ok(vec![engine.plot_single(&file, range, hand)?]),
        Command::Compare2 { first, second, hand, range } => {
            Ok(vec![engine.plot_2way_comparison(&first, &second, range, hand)?])
        }
        Command::Compare4 { files, hand, range } => {
            Ok(vec![engine.plot_4way_comparison(&files, range, hand)?])
        }
        Command::Batch { files, hand } => engine.batch_plot_all_ranges(&files, hand),
        Command::Fingers { file } => engine.plot_finger_overview(&file),
        Command::Export { file, hand } => {
            let hands = match hand {
                Some(hand) => vec![hand],
                None => Hand::ALL.to_vec(),
            };
            hands
                .into_iter()
                .map(|hand| engine.export_table_csv(&file, hand))
                .collect()
        }
    }
}

fn exit_with(e: &PlotError) -> ! {
    tracing::error!(
        "❌ Plotting failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting gesture-plot");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = load_settings(&config)?;

    // 驗證配置與輸入檔
    let inputs: Vec<String> = config
        .command
        .inputs()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    if let Err(e) = settings
        .validate()
        .and_then(|_| validate_file_extensions("inputs", &inputs, &["json"]))
    {
        exit_with(&e);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new();
    let engine = PlotEngine::new_with_monitoring(storage, settings, config.monitor);

    match run(&engine, config.command) {
        Ok(paths) => {
            tracing::info!("✅ Created {} file(s)", paths.len());
            for path in &paths {
                println!("📁 {}", path.display());
            }
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}
