use anyhow::Context;
use balance_scale_api::{config::Config, create_router, services::AppState};
use opentelemetry_sdk::trace::{SdkTracerProvider, Tracer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // OTLP export is opt-in via OTEL_EXPORTER_OTLP_ENDPOINT
    let telemetry = init_telemetry()?;
    let otel_layer = telemetry
        .as_ref()
        .map(|(_, tracer)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "balance_scale_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .with(otel_layer)
        .init();

    tracing::info!("Starting Balance Scale game API");

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded for environment: {}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
    );

    let bind_address = config.bind_address();
    let app_state = Arc::new(AppState::new(config));
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some((provider, _)) = telemetry {
        tracing::info!("Shutting down OpenTelemetry");
        if let Err(e) = provider.shutdown() {
            tracing::warn!("OpenTelemetry shutdown failed: {}", e);
        }
    }

    Ok(())
}

fn init_telemetry() -> anyhow::Result<Option<(SdkTracerProvider, Tracer)>> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::Resource;

    let Ok(otlp_endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(otlp_endpoint)
        .build()
        .context("Failed to create OTLP exporter")?;

    let resource = Resource::builder_empty()
        .with_service_name("balance-scale-api")
        .with_attributes(vec![KeyValue::new(
            "service.version",
            env!("CARGO_PKG_VERSION"),
        )])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer("balance-scale-api");
    opentelemetry::global::set_tracer_provider(provider.clone());

    Ok(Some((provider, tracer)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
