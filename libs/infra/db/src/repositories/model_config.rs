// [libs/infra/db/src/repositories/model_config.rs]
/*!
 * =================================================================
 * APARATO: MODEL ADAPTER CONFIG REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE OVERRIDES DE CONFIGURACIÓN POR MODELO
 *
 * VISION HOLÍSTICA:
 * Cada fila sobrescribe los defaults del `ModelAdapter` correspondiente
 * (§4.6). No existe fila implica "usar el default puro del adaptador";
 * la fila solo se escribe a través de la superficie administrativa.
 * =================================================================
 */

use crate::errors::DbError;
use libsql::{params, Connection};
use realstage_core_models::ModelConfig;
use tracing::{info, instrument};

pub struct ModelConfigRepository {
    database_connection: Connection,
}

impl ModelConfigRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, model_id: &str) -> Result<Option<ModelConfig>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT model_id, config_json, updated_by, updated_at FROM model_configs WHERE model_id = ?1",
                params![model_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ModelConfig>, DbError> {
        let mut rows = self
            .database_connection
            .query("SELECT model_id, config_json, updated_by, updated_at FROM model_configs ORDER BY model_id", ())
            .await?;
        let mut configs = Vec::new();
        while let Some(row) = rows.next().await? {
            configs.push(map_row(row)?);
        }
        Ok(configs)
    }

    /// Reescritura administrativa total del override de un modelo;
    /// `config_json` debe haber sido validado contra el esquema del
    /// adaptador por el llamador antes de persistirse.
    #[instrument(skip(self, config_json))]
    pub async fn update(&self, model_id: &str, config_json: &serde_json::Value, updated_by: &str) -> Result<ModelConfig, DbError> {
        self.database_connection
            .execute(
                "INSERT INTO model_configs (model_id, config_json, updated_by, updated_at)
                 VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
                 ON CONFLICT(model_id) DO UPDATE SET
                    config_json = excluded.config_json,
                    updated_by = excluded.updated_by,
                    updated_at = CURRENT_TIMESTAMP",
                params![model_id, config_json.to_string(), updated_by],
            )
            .await?;

        info!("⚙️ [MODEL_CONFIG]: {} overridden by {}.", model_id, updated_by);
        self.get(model_id).await?.ok_or(DbError::MappingError(format!("config vanished after write: {model_id}")))
    }

    /// Identificador del modelo activo (spec §6 `settings`), con el
    /// compiled-in fallback aplicado por el llamador si la fila falta.
    #[instrument(skip(self))]
    pub async fn get_active_model_id(&self) -> Result<Option<String>, DbError> {
        let mut rows = self
            .database_connection
            .query("SELECT value FROM settings WHERE key = 'active_model_id'", ())
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_active_model_id(&self, model_id: &str) -> Result<(), DbError> {
        self.database_connection
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES ('active_model_id', ?1, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                params![model_id],
            )
            .await?;
        info!("⚙️ [SETTINGS]: active_model_id set to {}.", model_id);
        Ok(())
    }
}

fn map_row(row: libsql::Row) -> Result<ModelConfig, DbError> {
    let config_json: String = row.get(1)?;
    let config: serde_json::Value = serde_json::from_str(&config_json)
        .map_err(|e| DbError::MappingError(format!("invalid model config json: {e}")))?;

    Ok(ModelConfig {
        model_id: row.get(0)?,
        config,
        updated_by: row.get(2)?,
        updated_at: crate::repositories::original::parse_timestamp(row.get::<String>(3)?)?,
    })
}
