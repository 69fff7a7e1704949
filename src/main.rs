use clap::Parser;
use reservation_hours::api::routes::{build_router, cors_layer, AppState};
use reservation_hours::api::service::{self, BulkSlotsRequest, SlotsPayload};
use reservation_hours::app::report::{self, Format};
use reservation_hours::app::{build_store, engine_with_store, load_rules_file};
use reservation_hours::config::cli::{Command, OutputFormat};
use reservation_hours::domain::ports::SharedStore;
use reservation_hours::utils::error::{ErrorSeverity, Result};
use reservation_hours::utils::{logger, validation::Validate};
use reservation_hours::{AvailabilityEngine, CliConfig, SlotOptions, TomlConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn format_of(format: OutputFormat) -> Format {
    match format {
        OutputFormat::Table => Format::Table,
        OutputFormat::Json => Format::Json,
        OutputFormat::Csv => Format::Csv,
    }
}

async fn execute(cli: &CliConfig, config: &TomlConfig) -> Result<()> {
    let store: SharedStore = match &cli.rules_file {
        Some(path) => Arc::new(load_rules_file(path)?),
        None => build_store(config),
    };
    let engine = engine_with_store(config, store)?;
    let now = cli.now.as_deref();

    match &cli.command {
        Command::Hours(output) => {
            let loaded = service::hours(&engine).await;
            print!("{}", report::render_hours(&loaded, format_of(output.format))?);
        }
        Command::Slots {
            date,
            staff,
            output,
        } => {
            let payload: SlotsPayload = if *staff {
                let date = reservation_hours::utils::validation::parse_date("date", date)?;
                let now = service::resolve_now(now)?;
                tracing::info!("staff mode: advance booking lead time ignored");
                engine
                    .available_slots_with(date, now, SlotOptions::staff())
                    .await
                    .into()
            } else {
                service::slots(&engine, Some(date), now).await?
            };
            print!("{}", report::render_slots(&[payload], format_of(output.format))?);
        }
        Command::Validate { date, time } => {
            let check = service::validate(&engine, Some(date), Some(time), now).await?;
            if check.valid {
                println!("✅ {date} {time} can be booked");
            } else {
                println!(
                    "❌ {date} {time} cannot be booked: {}",
                    check.reason.as_deref().unwrap_or_default()
                );
            }
        }
        Command::DateStatus { date } => {
            let payload = service::date_status(&engine, Some(date), now).await?;
            match payload.status.reason {
                Some(reason) if payload.status.disabled => println!("{date}: disabled ({reason})"),
                _ => println!("{date}: bookable"),
            }
        }
        Command::BulkSlots { dates, output } => {
            let request = BulkSlotsRequest {
                dates: dates.clone(),
                now: cli.now.clone(),
            };
            let days = service::bulk_slots(&engine, &request).await?;
            print!("{}", report::render_slots(&days, format_of(output.format))?);
        }
        Command::OpenNow => {
            let payload = service::open_now(&engine, now).await?;
            match payload.shift {
                Some(shift) => println!("open ({shift} service)"),
                None => println!("closed"),
            }
        }
        Command::Serve { .. } => serve(engine, config).await?,
    }
    Ok(())
}

async fn serve(engine: AvailabilityEngine<SharedStore>, config: &TomlConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    let engine = engine.with_cancellation(shutdown.child_token());
    let state = AppState::new(engine, config.restaurant.name.as_str());

    let origins = (!config.server.cors_origins.is_empty()).then_some(config.server.cors_origins.as_slice());
    let app = build_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
        cors_layer(origins),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, restaurant = %config.restaurant.name, "serving availability API");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("could not install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested");
            shutdown.cancel();
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.logging.json {
        logger::init_json_logger(&config.logging.level);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!(command = ?cli.command, timezone = %config.restaurant.timezone, "resolved configuration");

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = execute(&cli, &config).await {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
