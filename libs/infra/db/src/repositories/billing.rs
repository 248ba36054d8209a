// [libs/infra/db/src/repositories/billing.rs]
/*!
 * =================================================================
 * APARATO: QUOTA LEDGER REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CÓMPUTO DE CONSUMO Y RESOLUCIÓN DE PLAN VIGENTE
 *
 * VISION HOLÍSTICA:
 * `usage()` implementa el contrato de §4.2: resuelve la Suscripción
 * activa o trialing del usuario, recurre al plan "free" con un período
 * de calendario mensual cuando no existe una, y cuenta TODAS las Images
 * del período — incluidas las borradas-suave — para que la eliminación
 * nunca recupere cuota.
 * =================================================================
 */

use crate::errors::DbError;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use libsql::{params, Connection};
use realstage_domain_billing::{Plan, Subscription, SubscriptionStatus, UsageCounter};
use tracing::instrument;

pub struct BillingRepository {
    database_connection: Connection,
}

impl BillingRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self))]
    pub async fn usage(&self, user_id: &str) -> Result<UsageCounter, DbError> {
        let subscription = self.find_qualifying_subscription(user_id).await?;

        let (plan_code, period_start, period_end, has_subscription) = match &subscription {
            Some(sub) => (sub.plan_code.clone(), sub.current_period_start, sub.current_period_end, true),
            None => {
                let (start, end) = calendar_month_bounds(Utc::now());
                ("free".to_string(), start, end, false)
            }
        };

        let plan = self.get_plan(&plan_code).await?.unwrap_or_else(Plan::free);

        let mut rows = self
            .database_connection
            .query(
                "SELECT COUNT(*) FROM images WHERE owner_user_id = ?1 AND created_at >= ?2 AND created_at < ?3",
                params![user_id, period_start.to_rfc3339(), period_end.to_rfc3339()],
            )
            .await?;
        let used: i64 = rows.next().await?.map(|row| row.get(0)).transpose()?.unwrap_or(0);

        Ok(UsageCounter::new(used, plan.monthly_image_limit, period_start, period_end, plan.code, has_subscription))
    }

    async fn find_qualifying_subscription(&self, user_id: &str) -> Result<Option<Subscription>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT id, user_id, plan_code, status, current_period_start, current_period_end FROM subscriptions WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        let Some(row) = rows.next().await? else { return Ok(None) };

        let status_key: String = row.get(3)?;
        let status = parse_status(&status_key)?;
        let subscription = Subscription {
            id: row.get(0)?,
            user_id: row.get(1)?,
            plan_code: row.get(2)?,
            status,
            current_period_start: crate::repositories::original::parse_timestamp(row.get::<String>(4)?)?,
            current_period_end: crate::repositories::original::parse_timestamp(row.get::<String>(5)?)?,
        };

        if subscription.status.qualifies_for_plan_limit() {
            Ok(Some(subscription))
        } else {
            Ok(None)
        }
    }

    /// Suscripción cruda del usuario, sin filtrar por estado calificante;
    /// usada por la superficie de administración de facturación (spec §6
    /// `GET /billing/subscriptions`), que debe mostrar también estados
    /// `past_due`/`canceled`/`incomplete`.
    #[instrument(skip(self))]
    pub async fn get_subscription_for_user(&self, user_id: &str) -> Result<Option<Subscription>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT id, user_id, plan_code, status, current_period_start, current_period_end FROM subscriptions WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        let Some(row) = rows.next().await? else { return Ok(None) };
        let status_key: String = row.get(3)?;
        Ok(Some(Subscription {
            id: row.get(0)?,
            user_id: row.get(1)?,
            plan_code: row.get(2)?,
            status: parse_status(&status_key)?,
            current_period_start: crate::repositories::original::parse_timestamp(row.get::<String>(4)?)?,
            current_period_end: crate::repositories::original::parse_timestamp(row.get::<String>(5)?)?,
        }))
    }

    #[instrument(skip(self))]
    pub async fn get_plan(&self, code: &str) -> Result<Option<Plan>, DbError> {
        let mut rows = self
            .database_connection
            .query("SELECT code, price_id, monthly_image_limit FROM plans WHERE code = ?1", params![code])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Plan { code: row.get(0)?, price_id: row.get(1)?, monthly_image_limit: row.get(2)? })),
            None => Ok(None),
        }
    }

    /// Refleja una suscripción entrante del webhook del procesador de
    /// pagos; idempotente vía `UNIQUE(user_id)`.
    #[instrument(skip(self))]
    pub async fn upsert_subscription(&self, subscription: &Subscription) -> Result<(), DbError> {
        self.database_connection
            .execute(
                "INSERT INTO subscriptions (id, user_id, plan_code, status, current_period_start, current_period_end)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id) DO UPDATE SET
                    plan_code = excluded.plan_code,
                    status = excluded.status,
                    current_period_start = excluded.current_period_start,
                    current_period_end = excluded.current_period_end",
                params![
                    subscription.id.clone(),
                    subscription.user_id.clone(),
                    subscription.plan_code.clone(),
                    status_key(subscription.status),
                    subscription.current_period_start.to_rfc3339(),
                    subscription.current_period_end.to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }
}

fn status_key(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::Trialing => "trialing",
        SubscriptionStatus::PastDue => "past_due",
        SubscriptionStatus::Canceled => "canceled",
        SubscriptionStatus::Incomplete => "incomplete",
    }
}

fn parse_status(key: &str) -> Result<SubscriptionStatus, DbError> {
    match key {
        "active" => Ok(SubscriptionStatus::Active),
        "trialing" => Ok(SubscriptionStatus::Trialing),
        "past_due" => Ok(SubscriptionStatus::PastDue),
        "canceled" => Ok(SubscriptionStatus::Canceled),
        "incomplete" => Ok(SubscriptionStatus::Incomplete),
        other => Err(DbError::MappingError(format!("unknown subscription status: {other}"))),
    }
}

fn calendar_month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0).single().unwrap_or(now);
    let end = if now.month() == 12 {
        Utc.with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0).single().unwrap_or(start + Duration::days(31))
    } else {
        Utc.with_ymd_and_hms(now.year(), now.month() + 1, 1, 0, 0, 0).single().unwrap_or(start + Duration::days(31))
    };
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_month_bounds_rolls_over_december() {
        let december = Utc.with_ymd_and_hms(2026, 12, 15, 8, 0, 0).unwrap();
        let (start, end) = calendar_month_bounds(december);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }
}
