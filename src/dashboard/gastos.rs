//! Handlers for the flat ledger: table, submissions, summaries, export.

use crate::aggregate;
use crate::dashboard::DashboardState;
use crate::error::DashboardError;
use crate::model::{Amount, EntryForm, LedgerEntry, Month};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// One table row with its display strings.
#[derive(Debug, Serialize)]
pub struct RowView {
    pub categoria: String,
    pub item: String,
    pub valor: Amount,
    pub valor_formatado: String,
    pub mes: Month,
    pub data_atual: String,
}

impl From<&LedgerEntry> for RowView {
    fn from(entry: &LedgerEntry) -> Self {
        RowView {
            categoria: entry.categoria.clone(),
            item: entry.item.clone(),
            valor: entry.valor,
            valor_formatado: entry.valor.formatted(),
            mes: entry.mes,
            data_atual: entry.to_record()[4].clone(),
        }
    }
}

/// JSON view of the flat ledger table.
#[derive(Debug, Serialize)]
pub struct LedgerView {
    pub rows: Vec<RowView>,
    pub total: Amount,
    pub total_formatado: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aviso: Option<String>,
}

pub async fn table(
    State(state): State<DashboardState>,
) -> std::result::Result<Json<LedgerView>, DashboardError> {
    let loaded = state.ledger.load();
    let total = aggregate::grand_total(&loaded.table);
    Ok(Json(LedgerView {
        rows: loaded.table.iter().map(RowView::from).collect(),
        total,
        total_formatado: total.formatted(),
        aviso: loaded.warning,
    }))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub mensagem: &'static str,
    pub entry: RowView,
}

pub async fn submit(
    State(state): State<DashboardState>,
    Json(form): Json<EntryForm>,
) -> std::result::Result<(StatusCode, Json<SubmitResponse>), DashboardError> {
    let entry = form
        .normalize(Local::now().date_naive())
        .map_err(DashboardError::invalid)?;
    state.ledger.append(&entry)?;
    tracing::info!("gasto salvo: {} / {} ({})", entry.categoria, entry.item, entry.valor);
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            mensagem: "Gasto salvo com sucesso!",
            entry: RowView::from(&entry),
        }),
    ))
}

pub async fn export(
    State(state): State<DashboardState>,
) -> std::result::Result<impl IntoResponse, DashboardError> {
    let csv = state.ledger.export()?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}

/// A label → total pair for category and item summaries, largest first.
#[derive(Debug, Serialize)]
pub struct TotalView {
    pub label: String,
    pub total: Amount,
    pub total_formatado: String,
}

fn sorted_totals(totals: std::collections::HashMap<String, Amount>) -> Vec<TotalView> {
    let mut views: Vec<TotalView> = totals
        .into_iter()
        .map(|(label, total)| TotalView {
            label,
            total_formatado: total.formatted(),
            total,
        })
        .collect();
    views.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    views
}

pub async fn by_categoria(
    State(state): State<DashboardState>,
) -> std::result::Result<Json<Vec<TotalView>>, DashboardError> {
    let loaded = state.ledger.load();
    Ok(Json(sorted_totals(aggregate::total_by_category(&loaded.table))))
}

pub async fn by_item(
    State(state): State<DashboardState>,
) -> std::result::Result<Json<Vec<TotalView>>, DashboardError> {
    let loaded = state.ledger.load();
    Ok(Json(sorted_totals(aggregate::total_by_item(&loaded.table))))
}

#[derive(Debug, Deserialize)]
pub struct MesParams {
    pub categoria: Option<String>,
}

/// A month → total pair, in calendar order.
#[derive(Debug, Serialize)]
pub struct MesTotal {
    pub mes: Month,
    pub total: Amount,
    pub total_formatado: String,
}

pub async fn by_mes(
    State(state): State<DashboardState>,
    Query(params): Query<MesParams>,
) -> std::result::Result<Json<Vec<MesTotal>>, DashboardError> {
    let loaded = state.ledger.load();
    let totals = aggregate::total_by_month(&loaded.table, params.categoria.as_deref());
    Ok(Json(
        totals
            .into_iter()
            .map(|(mes, total)| MesTotal {
                mes,
                total_formatado: total.formatted(),
                total,
            })
            .collect(),
    ))
}
