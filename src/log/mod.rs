use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::generator::Generation;

pub fn init_logger(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "wedding_design=debug,info" } else { "wedding_design=info,warn" })
    });

    let fmt = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt.compact()).init();
    }
}

/// Per-run record of what was asked, what came back and what we kept.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    root: PathBuf,
}

impl ArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn run_dir(&self, run: Uuid) -> PathBuf {
        self.root.join(run.to_string())
    }

    pub fn save(
        &self,
        generation: &Generation,
        prompt: Option<&str>,
        raw_response: Option<&str>,
    ) -> anyhow::Result<PathBuf> {
        let dir = self.run_dir(generation.id);
        fs::create_dir_all(&dir)?;

        if let Some(p) = prompt {
            fs::write(dir.join("prompt.txt"), p)?;
        }
        if let Some(r) = raw_response {
            fs::write(dir.join("response.txt"), r)?;
        }
        fs::write(dir.join("recipe.json"), to_string_pretty(&generation.recipe)?)?;

        let meta = json!({
            "id": generation.id,
            "wedding_id": generation.wedding_id,
            "saved_at": Utc::now(),
            "source": generation.source,
            "rejection": generation.rejection,
            "corrections": generation.corrections,
            "stages": generation.stages,
        });
        fs::write(dir.join("meta.json"), to_string_pretty(&meta)?)?;
        Ok(dir)
    }
}

pub fn artifact_paths(dir: &Path) -> [PathBuf; 4] {
    ["prompt.txt", "response.txt", "recipe.json", "meta.json"].map(|f| dir.join(f))
}
