use anyhow::{bail, Result};
use pawplanet_core::{ContextKey, MediaTarget, UploadContext, UploadProgress};

const BAR_WIDTH: usize = 20;

/// One-line progress report, e.g. `[##########----------]  50% (512 B / 1.0 KiB)`.
pub fn format_progress(progress: &UploadProgress) -> String {
    let filled = ((progress.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {:>3.0}% ({} / {})",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percentage,
        format_bytes(progress.loaded),
        format_bytes(progress.total)
    )
}

/// Human-readable byte count with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Pick the identifier matching the context family from the CLI flags.
pub fn resolve_target(
    context: UploadContext,
    owner_id: Option<i64>,
    slug: Option<String>,
) -> Result<MediaTarget> {
    match (context.key_kind(), owner_id, slug) {
        (ContextKey::OwnerId, Some(id), None) => Ok(MediaTarget::Owner(id)),
        (ContextKey::Slug, None, Some(slug)) => Ok(MediaTarget::Slug(slug)),
        (kind, _, _) => bail!("{} requires exactly one --{} argument", context, flag_for(kind)),
    }
}

fn flag_for(kind: ContextKey) -> &'static str {
    match kind {
        ContextKey::OwnerId => "owner-id",
        ContextKey::Slug => "slug",
    }
}

/// Initialize tracing for the CLI. Logs go to stderr; stdout carries results.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
