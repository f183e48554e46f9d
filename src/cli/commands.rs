use crate::cli::args::{Cli, Commands, FetchArgs};
use crate::cli::logging::init_logging;
use crate::error::{DatasetError, Result};
use crate::models::Place;
use crate::processors::{DatasetPipeline, PipelineOutput, RunSummary};
use crate::readers::{CacheStore, ObservationFetcher, WundergroundClient};
use crate::settings::{Credentials, Layout, Settings};
use crate::utils::dates::{date_window_until_yesterday, format_date};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvDatasetWriter, DatasetEmitter};
use std::fs;
use tracing::{error, info};

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.command.apply(&mut settings);
    if let Some(path) = &cli.log_file {
        settings.log_file = path.clone();
    }
    settings.check()?;

    init_logging(&settings.log_file, cli.verbose)?;
    settings.log_config();

    match cli.command {
        Commands::Generate {
            fetch,
            fail_on_partial,
            ..
        } => {
            println!("Generating dataset...");
            println!("Output directory: {}", settings.output_dir.display());
            println!(
                "Places: {}, days: {}",
                settings.places.len(),
                settings.days
            );

            let output = collect(&settings, &fetch, cli.quiet).await?;
            let mut summary = output.summary.clone();
            write_dataset(&settings, &output, &mut summary)?;

            println!("\n{}", summary.generate_summary());
            finish(&summary, fail_on_partial)?;
            println!("Dataset written to {}", settings.dataset_path().display());
        }

        Commands::Fetch {
            fetch,
            fail_on_partial,
        } => {
            println!("Fetching observations into {}", settings.output_dir.display());

            let output = collect(&settings, &fetch, cli.quiet).await?;

            println!("\n{}", output.summary.generate_summary());
            finish(&output.summary, fail_on_partial)?;
        }

        Commands::Info { .. } => {
            let cache = CacheStore::new(&settings.output_dir);
            println!("Cache directory: {}", cache.root().display());

            for place in settings.places()? {
                let inventory = cache.inventory(&place)?;
                let range = match (&inventory.first_date, &inventory.last_date) {
                    (Some(first), Some(last)) => format!("{} .. {}", first, last),
                    _ => "-".to_string(),
                };
                println!(
                    "  {:<24} {:>5} files  {}  ({} unreadable)",
                    place.id(),
                    inventory.files,
                    range,
                    inventory.unreadable
                );
            }
        }
    }

    Ok(())
}

/// Create the output directory and one cache directory per place.
fn prepare_output_dirs(settings: &Settings, places: &[Place]) -> Result<()> {
    let cache = CacheStore::new(&settings.output_dir);
    fs::create_dir_all(cache.root())
        .map_err(|e| DatasetError::OutputDir(cache.root().to_path_buf(), e))?;
    for place in places {
        let dir = cache.place_dir(place);
        fs::create_dir_all(&dir).map_err(|e| {
            error!("Unable to create output path {}, aborting!", dir.display());
            DatasetError::OutputDir(dir.clone(), e)
        })?;
    }
    Ok(())
}

/// Fetch every (place, date) pair of the configured window.
async fn collect(settings: &Settings, args: &FetchArgs, quiet: bool) -> Result<PipelineOutput> {
    let places = settings.places()?;
    prepare_output_dirs(settings, &places)?;

    let cache = CacheStore::new(&settings.output_dir);
    let fetcher = if args.offline {
        info!("Offline mode, using cached data only");
        ObservationFetcher::offline(cache)
    } else {
        let credentials = Credentials::from_env()?;
        let client = WundergroundClient::new(
            &settings.api_base_url,
            credentials.api_key(),
            &settings.api_product,
            settings.request_timeout(),
        )?;
        ObservationFetcher::new(cache, client)
            .with_rate_limit(settings.rate_limit())
            .with_cache_write_policy(settings.cache_write_policy)
    };

    let dates: Vec<String> = date_window_until_yesterday(settings.days)
        .into_iter()
        .map(format_date)
        .collect();
    info!(
        "Querying {} places for {} days ({} .. {})",
        places.len(),
        dates.len(),
        dates.first().map(String::as_str).unwrap_or("-"),
        dates.last().map(String::as_str).unwrap_or("-")
    );

    let mut pipeline =
        DatasetPipeline::new(places.clone(), settings.schema(), settings.sentinel_set());
    if settings.layout == Layout::Wide {
        if let Some(target) = settings.target_extractor()? {
            pipeline = pipeline.with_target(target);
        }
    }

    let progress = ProgressReporter::new(
        (places.len() * dates.len()) as u64,
        "Fetching observations...",
        quiet,
    );
    let output = pipeline.run(&fetcher, &dates, &progress).await;
    progress.finish_with_message(&format!(
        "Processed {} of {} place/date pairs",
        output.summary.succeeded(),
        output.summary.pairs_total
    ));

    Ok(output)
}

fn write_dataset(settings: &Settings, output: &PipelineOutput, summary: &mut RunSummary) -> Result<()> {
    let mut emitter = DatasetEmitter::new(settings.places()?, settings.schema());
    let writer = CsvDatasetWriter::new();

    match settings.layout {
        Layout::Wide => {
            let with_target = settings.target.enabled;
            if with_target {
                emitter = emitter.with_target_field(&settings.target.field);
            }

            let dataset = emitter.emit(&output.pivot, output.targets.as_ref());
            summary.rows_dropped = dataset.dropped;
            summary.rows_labeled =
                writer.write_rows(&settings.dataset_path(), &dataset.header, &dataset.labeled)?;

            if with_target {
                summary.rows_unlabeled = writer.write_rows(
                    &settings.unlabeled_path(),
                    &dataset.header,
                    &dataset.unlabeled,
                )?;
                println!(
                    "Unlabeled rows written to {}",
                    settings.unlabeled_path().display()
                );
            }
        }
        Layout::Long => {
            let dataset = emitter.emit_long(&output.pivot);
            summary.rows_labeled =
                writer.write_rows(&settings.dataset_path(), &dataset.header, &dataset.labeled)?;
        }
    }

    Ok(())
}

fn finish(summary: &RunSummary, fail_on_partial: bool) -> Result<()> {
    if summary.is_partial() {
        error!(
            "{} of {} place/date pairs failed, see the log for details",
            summary.failed(),
            summary.pairs_total
        );
        if fail_on_partial {
            return Err(DatasetError::PartialRun {
                failed: summary.failed(),
                total: summary.pairs_total,
            });
        }
    }
    Ok(())
}
