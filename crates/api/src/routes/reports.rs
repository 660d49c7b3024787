//! Report endpoints (admin only).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::{NaiveDate, Utc};
use domain::{Actor, DomainError};
use reports::{Dashboard, DashboardParams, DreReport, Period, TeamParams, TeamReport};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::routes::orders::csv_response;
use crate::state::AppState;

/// `[from, to)` query; both absent selects the current month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PeriodQuery {
    fn period(&self) -> Result<Option<Period>, ApiError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Ok(Some(Period::new(from, to)?)),
            (None, None) => Ok(None),
            _ => Err(ApiError::BadRequest(
                "from and to must be given together".to_string(),
            )),
        }
    }

    fn period_or_current_month(&self) -> Result<Period, ApiError> {
        Ok(self
            .period()?
            .unwrap_or_else(|| Period::month_of(Utc::now().date_naive())))
    }
}

fn require_admin(actor: &Actor) -> Result<(), ApiError> {
    actor
        .require_admin("view reports")
        .map_err(|e| ApiError::Domain(DomainError::from(e)))
}

/// GET /reports/dre?from=&to=
#[tracing::instrument(skip(state, actor))]
pub async fn dre(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DreReport>, ApiError> {
    require_admin(&actor)?;
    let period = query.period_or_current_month()?;
    Ok(Json(state.reports.generate::<DreReport>(&period).await?))
}

/// GET /reports/dre.csv?from=&to=
#[tracing::instrument(skip(state, actor))]
pub async fn dre_csv(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;
    let period = query.period_or_current_month()?;
    let report = state.reports.generate::<DreReport>(&period).await?;
    let filename = format!("dre-{}.csv", period.from.format("%Y-%m"));
    Ok(csv_response(&filename, report.to_csv()))
}

/// GET /reports/team?from=&to=: all time without a period.
#[tracing::instrument(skip(state, actor))]
pub async fn team(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<TeamReport>, ApiError> {
    require_admin(&actor)?;
    let params = TeamParams {
        period: query.period()?,
    };
    Ok(Json(state.reports.generate::<TeamReport>(&params).await?))
}

/// GET /reports/dashboard
#[tracing::instrument(skip(state, actor))]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Dashboard>, ApiError> {
    require_admin(&actor)?;
    let params = DashboardParams { now: Utc::now() };
    Ok(Json(state.reports.generate::<Dashboard>(&params).await?))
}
