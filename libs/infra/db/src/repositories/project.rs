// [libs/infra/db/src/repositories/project.rs]
/*!
 * =================================================================
 * APARATO: PROJECT REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CONTENEDOR ADMINISTRATIVO DE IMAGES (spec §3 Project)
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::original::parse_timestamp;
use libsql::{params, Connection};
use realstage_core_models::Project;
use tracing::instrument;

pub struct ProjectRepository {
    database_connection: Connection,
}

impl ProjectRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self))]
    pub async fn insert(&self, id: &str, owner_user_id: &str, name: &str) -> Result<Project, DbError> {
        self.database_connection
            .execute(
                "INSERT INTO projects (id, owner_user_id, name, created_at, updated_at) VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
                params![id, owner_user_id, name],
            )
            .await?;
        self.get(id).await?.ok_or_else(|| DbError::MappingError("project vanished after insert".into()))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, project_id: &str) -> Result<Option<Project>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT id, owner_user_id, name, created_at, updated_at FROM projects WHERE id = ?1",
                params![project_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_by_owner(&self, owner_user_id: &str) -> Result<Vec<Project>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT id, owner_user_id, name, created_at, updated_at FROM projects WHERE owner_user_id = ?1 ORDER BY created_at DESC",
                params![owner_user_id],
            )
            .await?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(map_row(row)?);
        }
        Ok(projects)
    }

    /// Elimina la fila del proyecto. El borrado-suave en cascada de sus
    /// Images y la liberación de referencias en CAOS son responsabilidad
    /// del llamador (servicio de aplicación), no de este repositorio:
    /// un Project no conoce el esquema de las Images que contiene.
    #[instrument(skip(self))]
    pub async fn delete(&self, project_id: &str) -> Result<(), DbError> {
        let rows_affected = self
            .database_connection
            .execute("DELETE FROM projects WHERE id = ?1", params![project_id])
            .await?;
        if rows_affected == 0 {
            return Err(DbError::MappingError(format!("project not found: {project_id}")));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn cost_summary(&self, project_id: &str) -> Result<f64, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT COALESCE(SUM(cost), 0.0) FROM images WHERE project_id = ?1 AND deleted_at IS NULL",
                params![project_id],
            )
            .await?;
        let total: f64 = rows.next().await?.map(|row| row.get(0)).transpose()?.unwrap_or(0.0);
        Ok(total)
    }
}

fn map_row(row: libsql::Row) -> Result<Project, DbError> {
    Ok(Project {
        id: row.get(0)?,
        owner_user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_timestamp(row.get::<String>(3)?)?,
        updated_at: parse_timestamp(row.get::<String>(4)?)?,
    })
}
