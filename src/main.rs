use anketa::assistant::Assistant;
use anketa::chart::PlottersRenderer;
use anketa::cli::Args;
use anketa::config::BotConfig;
use anketa::dataset::Dataset;
#[cfg(feature = "http")]
use anketa::oracle::OpenAiOracle;
use anketa::oracle::{Oracle, UnconfiguredOracle};
use clap::Parser;
use color_eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let args = Args::parse();

    let config = BotConfig::load(args.config.as_deref())?;
    let dataset = Dataset::load(&args.path, args.sheet.as_deref())?;
    log::info!(
        "loaded {} responses across {} questions",
        dataset.len(),
        dataset.columns().len()
    );

    let renderer = PlottersRenderer::new(&args.charts_dir);
    let oracle = make_oracle(&config);
    let assistant = Assistant::new(&config, &renderer, oracle.as_ref());

    let reply = assistant.handle(&args.message(), &dataset);
    for message in &reply.messages {
        println!("{message}\n");
    }
    if let Some(chart) = &reply.chart {
        println!("[график сохранён: {}]", chart.path.display());
    }
    Ok(())
}

#[cfg(feature = "http")]
fn make_oracle(config: &BotConfig) -> Box<dyn Oracle> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Box::new(OpenAiOracle::new(key, config.oracle.clone())),
        _ => {
            log::warn!("OPENAI_API_KEY is not set; free-text questions are disabled");
            Box::new(UnconfiguredOracle)
        }
    }
}

#[cfg(not(feature = "http"))]
fn make_oracle(_config: &BotConfig) -> Box<dyn Oracle> {
    Box::new(UnconfiguredOracle)
}
