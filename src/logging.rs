
use opentelemetry_sdk::Resource;
use tracing::Level;
use tracing_subscriber::{FmtSubscriber, fmt::{format::FmtSpan, self}, filter::{Directive, LevelFilter}};

const SERVICE_NAME : &str = "Goal Storage";

fn dependency_directives(level:&Level) -> anyhow::Result<Vec<Directive>> {
    let raw = match *level {
        Level::TRACE => ["hyper=debug","warp=trace","sled=debug","reqwest=debug"],
        Level::DEBUG => ["hyper=info","warp=info","sled=info","reqwest=info"],
        Level::INFO => ["hyper=warn","warp=info","sled=warn","reqwest=warn"],
        Level::WARN => ["hyper=warn","warp=warn","sled=warn","reqwest=warn"],
        Level::ERROR => ["hyper=error","warp=error","sled=error","reqwest=error"],
    };
    raw.iter().map(|d| d.parse::<Directive>().map_err(anyhow::Error::new)).collect()
}

pub async fn init(level:Level,mut otel_tracing_endpoint:Option<String>) -> anyhow::Result<()> {

    let mut env_filter = tracing_subscriber::EnvFilter::new(LevelFilter::from_level(level).to_string());
    for directive in dependency_directives(&level)? {
        env_filter = env_filter.add_directive(directive);
    }

    if otel_tracing_endpoint.is_some()  {
        if let Ok(value) = std::env::var("OTEL_SDK_DISABLED") {
            if value.parse::<bool>().unwrap_or_default() {
                otel_tracing_endpoint = None;
            }
        }
    }

    if let Some(otel_addr) = &otel_tracing_endpoint {

        let resource = Resource::new(vec![opentelemetry::KeyValue::new("service.name", SERVICE_NAME)]);

        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::Registry;

        let exporter = opentelemetry_otlp::WithExportConfig::with_endpoint(opentelemetry_otlp::new_exporter().tonic(), otel_addr.clone());

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_trace_config(
                opentelemetry_sdk::trace::Config::default()
                    .with_sampler(opentelemetry_sdk::trace::Sampler::AlwaysOn)
                    .with_resource(resource)
            )
            .with_exporter(exporter).with_batch_config(opentelemetry_sdk::trace::BatchConfig::default())
            .install_batch(opentelemetry_sdk::runtime::Tokio)?;

        let otel_layer =
            tracing_opentelemetry::OpenTelemetryLayer::default()
            .with_tracer(tracer)
            .with_tracked_inactivity(true)
            .with_error_fields_to_exceptions(true)
            .with_error_records_to_exceptions(true)
            .with_location(true);


        let combo_subscriber = Registry::default()
            .with(env_filter)
            .with(otel_layer)
            .with(
                fmt::Layer::default()
                    .with_line_number(true)
                    .with_span_events(FmtSpan::NONE)
                    .log_internal_errors(false)
                    .pretty()
            );

        tracing::subscriber::set_global_default(combo_subscriber)?;

        tracing::info!("Logs will be sent to {}. Service name: {:?}. You can disable this using env:OTEL_SDK_DISABLED.",&otel_addr,SERVICE_NAME);

        return  Ok(())
    }

    let console_subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_line_number(true)
        .with_span_events(FmtSpan::NONE)
        .log_internal_errors(false)
        .pretty().finish();


    tracing::subscriber::set_global_default(console_subscriber)?;

    tracing::info!("No telemetry data will be sent from this application instance, only local logging is enabled.");

    Ok(())

}
