// [libs/domain/billing/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BILLING CORE ENGINE (V2.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GOBERNANZA FINANCIERA Y GESTIÓN DEL LIBRO MAYOR DE CUOTAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TYPESHARE ALIGNMENT: Sincronización absoluta con el Dashboard Zenith (L5)
 *    para la visualización de consumo de cuota en tiempo real.
 * 2. QUOTA LEDGER MODELS: Define la gramática de Planes y Suscripciones; el
 *    conteo de uso real se calcula contra el log inmutable de Images en
 *    `realstage-infra-db`, nunca contra un contador mutable independiente.
 * 3. NOMINAL PURITY: Erradicación total de abreviaciones.
 * 4. HYGIENE: Documentación técnica nivel MIT y rastro de tipos inmutable.
 *
 * # Mathematical Proof (Admisión de Cuota):
 * can_create(u) = used(u) < limit(plan(u)), evaluado en el momento de la
 * solicitud. La admisión de lotes satura en `remaining`, nunca revienta
 * por encima del límite contratado (spec de admisión en SPEC_FULL.md §5).
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Estado de una suscripción según el espejo local del webhook del
/// procesador de pagos (colaborador externo, no respecificado aquí).
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
}

impl SubscriptionStatus {
    /// Únicamente estos dos estados habilitan el límite de imágenes del
    /// plan contratado; cualquier otro estado degrada al operador al
    /// límite del plan gratuito implícito.
    pub fn qualifies_for_plan_limit(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// Catálogo de planes comerciales, sembrado en la tabla `plans`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub code: String,
    pub price_id: String,
    pub monthly_image_limit: i64,
}

impl Plan {
    /// Plan implícito para operadores sin suscripción calificada.
    pub fn free() -> Self {
        Self {
            code: "free".to_string(),
            price_id: String::new(),
            monthly_image_limit: 10,
        }
    }
}

/// Suscripción de un operador a un plan, reflejada del procesador de pagos.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan_code: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
}

/// Snapshot de consumo de cuota para un ciclo de facturación dado;
/// cuerpo de respuesta de `GET /billing/usage` y retorno del contrato
/// `usage(user_id)` del Libro Mayor de Cuotas.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageCounter {
    pub used: i64,
    pub limit: i64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub remaining: i64,
    pub plan_code: String,
    pub has_subscription: bool,
}

impl UsageCounter {
    pub fn new(
        used: i64,
        limit: i64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        plan_code: String,
        has_subscription: bool,
    ) -> Self {
        Self {
            used,
            limit,
            period_start,
            period_end,
            remaining: (limit - used).max(0),
            plan_code,
            has_subscription,
        }
    }

    /**
     * Evalúa si el operador puede crear al menos una Image más en el
     * ciclo actual.
     *
     * # Logic:
     * Estrictamente `used < limit`; un consumo igual al límite ya agota
     * la cuota (no admite la imagen número `limit + 1`... ni la `limit`-ésima
     * si ya fue contada).
     *
     * # Performance: O(1).
     */
    pub fn can_create(&self) -> bool {
        self.used < self.limit
    }

    /// Cuántas unidades de un lote de tamaño `requested` admitir sin
    /// exceder el remanente; el resto se rechaza explícitamente por el
    /// llamador (política de admisión parcial de SPEC_FULL.md §5).
    pub fn admit_up_to_remaining(&self, requested: usize) -> usize {
        requested.min(self.remaining.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(used: i64, limit: i64) -> UsageCounter {
        UsageCounter::new(used, limit, Utc::now(), Utc::now(), "free".into(), false)
    }

    #[test]
    fn can_create_is_strict_less_than() {
        assert!(counter(9, 10).can_create());
        assert!(!counter(10, 10).can_create());
        assert!(!counter(11, 10).can_create());
    }

    #[test]
    fn admission_saturates_at_remaining_for_oversized_batches() {
        let c = counter(8, 10);
        assert_eq!(c.admit_up_to_remaining(5), 2);
        assert_eq!(c.remaining, 2);
    }

    #[test]
    fn admission_never_admits_more_than_requested() {
        let c = counter(0, 10);
        assert_eq!(c.admit_up_to_remaining(3), 3);
    }

    #[test]
    fn exhausted_quota_admits_nothing() {
        let c = counter(10, 10);
        assert_eq!(c.admit_up_to_remaining(3), 0);
    }

    #[test]
    fn subscription_status_qualification_matches_spec() {
        assert!(SubscriptionStatus::Active.qualifies_for_plan_limit());
        assert!(SubscriptionStatus::Trialing.qualifies_for_plan_limit());
        assert!(!SubscriptionStatus::PastDue.qualifies_for_plan_limit());
        assert!(!SubscriptionStatus::Canceled.qualifies_for_plan_limit());
        assert!(!SubscriptionStatus::Incomplete.qualifies_for_plan_limit());
    }

    #[test]
    fn free_plan_matches_spec_default_limit() {
        let plan = Plan::free();
        assert_eq!(plan.code, "free");
        assert_eq!(plan.monthly_image_limit, 10);
    }
}
