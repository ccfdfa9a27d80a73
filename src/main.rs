use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use wedding_design::cli::Args;
use wedding_design::log::{self, ArtifactSink};
use wedding_design::{provider, ux};
use wedding_design::{Config, DesignError, DesignGenerator, GuardRails, JsonFileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log::init_logger(args.debug, args.json_logs);

    let mut cfg = match &args.config {
        Some(p) => Config::load(Path::new(p)).context("loading config")?,
        None => Config::default(),
    };
    cfg.apply_args(&args);
    cfg.validate()?;

    let store = JsonFileStore::new(&cfg.store_path);
    let mut generator = DesignGenerator::new(store)
        .with_guard_rails(GuardRails::new(cfg.contrast_repair))
        .with_timeout(Duration::from_secs(cfg.timeout_secs));
    if !cfg.guard_concurrent {
        generator = generator.with_in_flight(None);
    }

    let mut online = false;
    if args.offline {
        info!("offline: using keyword fallback");
    } else {
        match provider::make_provider(&cfg) {
            Ok(p) => {
                generator = generator.with_provider(p);
                online = true;
            }
            Err(e) => warn!(error = %e, "provider unavailable, using keyword fallback"),
        }
    }

    let sink = ArtifactSink::new(&cfg.artifacts_dir);
    if cfg.save_artifacts {
        generator = generator.with_artifacts(sink.clone());
    }

    let pb = ux::spinner(online && !args.no_progress, "designing wedding site...");
    let result = if args.dry_run {
        generator.preview(&args.wedding).await
    } else {
        generator.regenerate(&args.wedding).await
    };
    pb.finish_and_clear();

    let generation = match result {
        Ok(g) => g,
        Err(DesignError::Persistence { wedding_id, recipe, message }) => {
            // One more write with the recipe we already have; no new request.
            warn!(%wedding_id, %message, "write failed, retrying once");
            generator
                .persist(&wedding_id, &recipe)
                .await
                .with_context(|| format!("saving design for wedding {wedding_id}"))?;
            ux::show_recipe(&wedding_id, &recipe);
            return Ok(());
        }
        Err(e) => {
            error!(error = %e, "design generation failed");
            return Err(e).context("generating design");
        }
    };

    ux::show_generation(&generation);
    if cfg.save_artifacts {
        ux::show_artifacts(&sink.run_dir(generation.id));
    }
    Ok(())
}
