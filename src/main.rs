use anyhow::Context;
use sandbox_core::{animate, AnimationConfig, DEFAULT_CONFIG_FILE};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AnimationConfig::load_or_default(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("failed to load {}", DEFAULT_CONFIG_FILE))?;

    let summary = animate(&config).with_context(|| {
        format!(
            "failed to animate {}",
            config.input.log_path.display()
        )
    })?;

    tracing::info!(
        frames = summary.frames,
        grid_size = summary.grid_size,
        "done"
    );
    Ok(())
}
