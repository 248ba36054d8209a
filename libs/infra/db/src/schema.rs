// [libs/infra/db/src/schema.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * Aplica el esquema completo de persistencia: originales direccionados
 * por contenido, proyectos, imágenes, trabajos, planes, suscripciones y
 * configuración de modelo. Toda sentencia es `CREATE TABLE IF NOT EXISTS`
 * o un índice idempotente, de modo que aplicar el esquema sobre una base
 * ya nivelada es un no-op seguro.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const BASE_TABLES: &[(&str, &str)] = &[
    ("TABLE_USERS", r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_PROJECTS", r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            owner_user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_ORIGINAL_IMAGES", r#"
        CREATE TABLE IF NOT EXISTS original_images (
            id TEXT PRIMARY KEY,
            storage_key TEXT NOT NULL,
            byte_size INTEGER NOT NULL,
            media_type TEXT NOT NULL,
            width INTEGER,
            height INTEGER,
            reference_count INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_IMAGES", r#"
        CREATE TABLE IF NOT EXISTS images (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            owner_user_id TEXT NOT NULL,
            original_id TEXT,
            source_url TEXT,
            room_type TEXT,
            style TEXT,
            prompt TEXT,
            seed INTEGER,
            status TEXT NOT NULL DEFAULT 'queued',
            staged_url TEXT,
            error TEXT,
            cost REAL,
            model_id TEXT,
            processing_ms INTEGER,
            provider_prediction_id TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            deleted_at DATETIME
        );
    "#),
    ("TABLE_JOBS", r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            image_id TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL DEFAULT 'run_staging_prediction',
            payload_json TEXT NOT NULL,
            attempt_count INTEGER NOT NULL DEFAULT 0,
            max_attempts INTEGER NOT NULL DEFAULT 5,
            next_attempt_after DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            visible INTEGER NOT NULL DEFAULT 1,
            disposition TEXT NOT NULL DEFAULT 'pending',
            claimed_by TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_PLANS", r#"
        CREATE TABLE IF NOT EXISTS plans (
            code TEXT PRIMARY KEY,
            price_id TEXT NOT NULL DEFAULT '',
            monthly_image_limit INTEGER NOT NULL
        );
    "#),
    ("TABLE_SUBSCRIPTIONS", r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            plan_code TEXT NOT NULL,
            status TEXT NOT NULL,
            current_period_start DATETIME NOT NULL,
            current_period_end DATETIME NOT NULL,
            UNIQUE(user_id)
        );
    "#),
    ("TABLE_MODEL_CONFIGS", r#"
        CREATE TABLE IF NOT EXISTS model_configs (
            model_id TEXT PRIMARY KEY,
            config_json TEXT NOT NULL,
            updated_by TEXT,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_SETTINGS", r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_SCHEMA_MIGRATIONS", r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_IMAGE_STATUS_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS image_status_events (
            id TEXT PRIMARY KEY,
            image_id TEXT NOT NULL,
            owner_user_id TEXT NOT NULL,
            status TEXT NOT NULL,
            staged_url TEXT,
            error TEXT,
            relayed INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_IMAGES_PROJECT", "CREATE INDEX IF NOT EXISTS idx_images_project ON images(project_id, deleted_at);"),
    ("IDX_IMAGES_OWNER_CREATED", "CREATE INDEX IF NOT EXISTS idx_images_owner_created ON images(owner_user_id, created_at);"),
    ("IDX_IMAGES_ORIGINAL", "CREATE INDEX IF NOT EXISTS idx_images_original ON images(original_id);"),
    ("IDX_ORIGINALS_REFCOUNT", "CREATE INDEX IF NOT EXISTS idx_originals_refcount ON original_images(reference_count, updated_at);"),
    ("IDX_JOBS_VISIBLE", "CREATE INDEX IF NOT EXISTS idx_jobs_visible ON jobs(visible, disposition, next_attempt_after);"),
    ("IDX_SUBSCRIPTIONS_USER", "CREATE INDEX IF NOT EXISTS idx_subscriptions_user ON subscriptions(user_id, status);"),
    ("IDX_PROJECTS_OWNER", "CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_user_id);"),
    ("IDX_EVENTS_UNRELAYED", "CREATE INDEX IF NOT EXISTS idx_events_unrelayed ON image_status_events(relayed, created_at);"),
];

/// Plan gratuito sembrado en migración; único registro con el que el
/// sistema puede arrancar sin intervención manual (spec §3 ModelConfig:
/// "default row inserted at migration" aplica igual al plan implícito).
const SEED_ROWS: &[(&str, &str)] = &[
    (
        "SEED_FREE_PLAN",
        "INSERT OR IGNORE INTO plans (code, price_id, monthly_image_limit) VALUES ('free', '', 10);",
    ),
    (
        "SEED_ACTIVE_MODEL",
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('active_model_id', 'black-forest-labs/flux-kontext-max');",
    ),
];

#[instrument(skip(database_connection))]
pub async fn apply_full_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Synchronizing structural layout...");
    solidify_base_tables(database_connection).await?;
    harden_access_layer(database_connection).await?;
    seed_defaults(database_connection).await?;
    info!("✅ [SCHEMA_ENGINE]: Schema level and certified.");
    Ok(())
}

async fn solidify_base_tables(db: &Connection) -> Result<()> {
    for (identifier, sql) in BASE_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ()).await.with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ()).await.with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn seed_defaults(db: &Connection) -> Result<()> {
    for (identifier, sql) in SEED_ROWS {
        debug!("  ↳ Seeding: {}", identifier);
        db.execute(*sql, ()).await.with_context(|| format!("CRITICAL_SEED_FAULT: {identifier}"))?;
    }
    Ok(())
}

/// Migración reversa: elimina toda tabla gobernada por este esquema, en
/// orden inverso de dependencia. No hay migraciones incrementales aquí
/// (cada `CREATE TABLE IF NOT EXISTS` es el esquema completo); "adelante"
/// y "atrás" son por tanto aplicar o tirar el esquema entero, lo cual
/// basta para la superficie admin del CLI.
#[instrument(skip(database_connection))]
pub async fn revert_full_schema(database_connection: &Connection) -> Result<()> {
    info!("🔙 [SCHEMA_ENGINE]: Reverting structural layout...");
    for (identifier, _) in BASE_TABLES.iter().rev() {
        let table_name = identifier.trim_start_matches("TABLE_").to_lowercase();
        debug!("  ↳ Dropping: {}", identifier);
        database_connection
            .execute(&format!("DROP TABLE IF EXISTS {table_name};"), ())
            .await
            .with_context(|| format!("CRITICAL_REVERSION_FAULT: {identifier}"))?;
    }
    info!("✅ [SCHEMA_ENGINE]: Schema reverted.");
    Ok(())
}
