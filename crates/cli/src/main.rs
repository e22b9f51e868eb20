use clap::Parser;
use profit_quality_core::analyzer::DEFAULT_CFO_EBITDA_THRESHOLD;
use profit_quality_core::report::{self, AnalysisRequest, DEFAULT_YEARS};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "profit_quality_cli")]
struct Args {
    /// Company identifiers (tickers or provider IDs), analysed one after another.
    #[arg(default_value = "AAPL")]
    company_ids: Vec<String>,

    /// Number of most recent fiscal years to analyse.
    #[arg(long, default_value_t = DEFAULT_YEARS)]
    years: usize,

    /// Risk-free rate in percent (4.5 = 4.5%). Defaults to RISK_FREE_RATE_PCT, then the provider.
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Minimum acceptable average CFO / average EBITDA ratio.
    #[arg(long, default_value_t = DEFAULT_CFO_EBITDA_THRESHOLD)]
    cfo_ebitda_threshold: f64,

    /// Print the reports as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Skip the data provider and analyse the synthetic history.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = profit_quality_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let provider = profit_quality_core::build_provider(&settings, args.offline)?;
    let risk_free_rate = args.risk_free_rate.or(settings.risk_free_rate_pct);

    let mut reports = Vec::with_capacity(args.company_ids.len());
    for company_id in &args.company_ids {
        let request = AnalysisRequest {
            company_id: company_id.clone(),
            years: args.years,
            risk_free_rate,
            cfo_ebitda_threshold: args.cfo_ebitda_threshold,
        };

        let report = report::analyze_company(&provider, &request).await?;
        tracing::info!(
            company_id = %report.company_id,
            data_source = %report.data_source,
            years = report.years,
            "analysis complete"
        );

        if args.json {
            reports.push(report);
        } else {
            println!("{}\n", report.render_text());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn init_sentry(settings: &profit_quality_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
