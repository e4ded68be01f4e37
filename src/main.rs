//! Curve Road Builder.
//!
//! Berechnet eine Trassierungs-Kurve aus einer Job-Datei und rastert die
//! Querschnitts-Vorlage in ein In-Memory-Voxel-Gitter.

use anyhow::Context;
use curve_road_builder::{
    compose, curve_summary, BuilderOptions, JobFile, RasterPath, RasterTask, TaskProgress,
    VoxelGrid,
};
use std::path::PathBuf;

const USAGE: &str = "Aufruf: curve-road-builder <job.toml> [--options <options.toml>] [--json <out.json>]";

fn main() -> anyhow::Result<()> {
    AppRunner::run()
}

/// Kommandozeilen-Argumente.
struct CliArgs {
    job: PathBuf,
    options: Option<PathBuf>,
    json: Option<PathBuf>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut job = None;
        let mut options = None;
        let mut json = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--options" => {
                    options = Some(PathBuf::from(
                        args.next().context("--options erwartet einen Pfad")?,
                    ))
                }
                "--json" => {
                    json = Some(PathBuf::from(
                        args.next().context("--json erwartet einen Pfad")?,
                    ))
                }
                "-h" | "--help" => anyhow::bail!("{USAGE}"),
                other if job.is_none() && !other.starts_with("--") => {
                    job = Some(PathBuf::from(other))
                }
                other => anyhow::bail!("Unbekanntes Argument `{other}`\n{USAGE}"),
            }
        }
        Ok(Self {
            job: job.with_context(|| format!("Job-Datei fehlt\n{USAGE}"))?,
            options,
            json,
        })
    }
}

struct AppRunner;

impl AppRunner {
    fn run() -> anyhow::Result<()> {
        // Logger initialisieren
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!(
            "Curve Road Builder v{} startet...",
            env!("CARGO_PKG_VERSION")
        );

        let args = CliArgs::parse(std::env::args().skip(1))?;
        let options_path = args.options.unwrap_or_else(BuilderOptions::config_path);
        let options = BuilderOptions::load_from_file(&options_path);
        let job = JobFile::load(&args.job)?;

        let result = compose(&job.request).context("Kurve konnte nicht berechnet werden")?;
        for warning in &result.warnings {
            println!("Warnung: {warning}");
        }
        println!("{}", curve_summary(&result.stats));

        if let Some(path) = &args.json {
            let content = serde_json::to_string_pretty(&result)?;
            std::fs::write(path, content)
                .with_context(|| format!("Ergebnis nicht schreibbar: {}", path.display()))?;
            log::info!("Ergebnis gespeichert nach: {}", path.display());
        }

        let mut settings = options.raster_settings();
        settings.policy = job.policy;
        let mut grid = VoxelGrid::new();
        let mut task = RasterTask::new(RasterPath::from(&result), job.template, settings);
        let budget = options.time_budget();
        let mut slices = 0usize;
        loop {
            slices += 1;
            let progress = task.advance(&mut grid, budget);
            for advisory in task.drain_advisories() {
                println!("{advisory}");
            }
            if progress == TaskProgress::Done {
                break;
            }
        }

        let summary = task.summary();
        log::info!(
            "Rasterung abgeschlossen: {} Zeitscheiben, {} Batches, {} Voxel im Gitter",
            slices,
            summary.batches,
            grid.filled_count()
        );
        Ok(())
    }
}
