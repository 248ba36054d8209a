// [apps/api/src/bin/admin.rs]
/*!
 * =================================================================
 * APARATO: ADMIN CLI (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: OPERACIONES DE MANTENIMIENTO FUERA DE BANDA (spec §6)
 *
 * Subcomandos: migraciones adelante/atrás, barrido de originales
 * huérfanos bajo demanda, y reencolado de jobs atascados. Código de
 * salida 0 en éxito, no-cero en cualquier fallo.
 * =================================================================
 */

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use realstage_infra_db::{schema, JobRepository, OriginalRepository, TursoClient};
use realstage_shared_telemetry::init_tracing;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Superficie administrativa fuera de banda de la plataforma de staging virtual."
)]
struct CommandArguments {
    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Aplica el esquema completo (idempotente) a la base de datos configurada.
    MigrateUp,
    /// Revierte el esquema completo, eliminando todas las tablas gobernadas.
    MigrateDown,
    /// Libera originales huérfanos cuyo reference_count lleva en cero más
    /// allá del período de gracia.
    SweepOrphans {
        #[arg(long, default_value_t = 1000)]
        limit: i64,
    },
    /// Reencola un job atascado para su reintento inmediato.
    RequeueJob {
        #[arg(long)]
        job_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing("realstage_admin");

    let arguments = CommandArguments::parse();

    let database_url = std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL not defined in runtime environment."))?;
    let database_access_token = std::env::var("TURSO_AUTH_TOKEN").ok();
    let database_client = TursoClient::connect(&database_url, database_access_token).await?;

    let outcome = match arguments.command {
        AdminCommand::MigrateUp => {
            let connection = database_client.get_connection()?;
            schema::apply_full_schema(&connection).await
        }
        AdminCommand::MigrateDown => {
            let connection = database_client.get_connection()?;
            schema::revert_full_schema(&connection).await
        }
        AdminCommand::SweepOrphans { limit } => {
            let originals = OriginalRepository::new(database_client.get_connection()?);
            let cutoff = chrono::Utc::now() - OriginalRepository::default_sweep_grace_period();
            match originals.sweep(cutoff, limit).await {
                Ok(reclaimed) => {
                    info!("🧹 [SWEEP_ORPHANS]: reclaimed {reclaimed} originals.");
                    Ok(())
                }
                Err(sweep_error) => Err(anyhow::Error::from(sweep_error)),
            }
        }
        AdminCommand::RequeueJob { job_id } => {
            let jobs = JobRepository::new(database_client.get_connection()?);
            match jobs.requeue(&job_id).await {
                Ok(()) => {
                    info!("🔁 [REQUEUE_JOB]: {job_id} re-armed for immediate retry.");
                    Ok(())
                }
                Err(requeue_error) => Err(anyhow::Error::from(requeue_error)),
            }
        }
    };

    if let Err(failure) = outcome {
        error!("❌ [ADMIN_COMMAND_FAILED]: {failure}");
        std::process::exit(1);
    }

    Ok(())
}
