use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

static MIGRATOR: Migrator = sqlx::migrate!();

/// reader init (plan-only without --apply)
#[derive(Args)]
pub struct InitCmd {
    #[arg(long, default_value_t = false)]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
struct MigrationInfo { version: i64, description: String, applied: bool }

#[derive(Serialize)]
struct InitPlan { pending: usize, migrations: Vec<MigrationInfo> }

#[derive(Serialize)]
struct InitResult { applied: usize, total: usize }

pub async fn connect(dsn: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(dsn)
        .await?;
    Ok(pool)
}

pub async fn run(pool: &PgPool, args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span_kv([("apply", args.apply.to_string())]).entered();

    let migrations = {
        let _s = log.span(&InitPhase::Inspect).entered();
        bundled_migrations(&applied_versions(pool).await?)
    };
    let pending = migrations.iter().filter(|m| !m.applied).count();

    if !args.apply {
        let _s = log.span(&InitPhase::Plan).entered();
        log.info(format!("📝 Init plan — {} of {} bundled migration(s) pending", pending, migrations.len()));
        for m in &migrations {
            log.info(format!("  {} {} {}", if m.applied { "✓" } else { "·" }, m.version, m.description));
        }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&InitPlan { pending, migrations })?;
        }
        return Ok(());
    }

    let _s = log.span_kv(&InitPhase::Migrate, [("pending", pending.to_string())]).entered();
    MIGRATOR.run(pool).await?;
    log.info(format!("✅ Database initialized ({} migration(s) applied)", pending));
    if telemetry::config::json_mode() {
        log.result(&InitResult { applied: pending, total: migrations.len() })?;
    }
    Ok(())
}

/// Versions recorded as successful; empty before the first migration run.
async fn applied_versions(pool: &PgPool) -> sqlx::Result<Vec<i64>> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;
    if !tracked { return Ok(Vec::new()); }
    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
        .fetch_all(pool)
        .await
}

fn bundled_migrations(applied: &[i64]) -> Vec<MigrationInfo> {
    MIGRATOR
        .iter()
        .map(|m| MigrationInfo { version: m.version, description: m.description.to_string(), applied: applied.contains(&m.version) })
        .collect()
}
