//! Handlers for the category × month matrix: table with the totals row,
//! submissions, export.

use crate::aggregate;
use crate::dashboard::DashboardState;
use crate::error::DashboardError;
use crate::model::{Amount, MatrixForm, MatrixRow, Month};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// One matrix row with its display strings.
#[derive(Debug, Serialize)]
pub struct MatrixRowView {
    pub categoria: String,
    pub meses: [Amount; 12],
    pub meses_formatados: Vec<String>,
}

impl From<&MatrixRow> for MatrixRowView {
    fn from(row: &MatrixRow) -> Self {
        MatrixRowView {
            categoria: row.categoria.clone(),
            meses: row.meses,
            meses_formatados: row.meses.iter().map(Amount::formatted).collect(),
        }
    }
}

/// JSON view of the matrix, rows plus the display-only "Total" row.
#[derive(Debug, Serialize)]
pub struct MatrixView {
    /// Month names in calendar order, matching the cell positions.
    pub meses: Vec<&'static str>,
    pub rows: Vec<MatrixRowView>,
    /// Per-category totals across the year, for the category charts.
    pub totais_por_categoria: Vec<CategoriaTotal>,
    pub total: Amount,
    pub total_formatado: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aviso: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriaTotal {
    pub categoria: String,
    pub total: Amount,
    pub total_formatado: String,
}

pub async fn table(
    State(state): State<DashboardState>,
) -> std::result::Result<Json<MatrixView>, DashboardError> {
    let loaded = state.matrix.load();
    let total = aggregate::matrix_grand_total(&loaded.table);
    Ok(Json(MatrixView {
        meses: Month::ALL.iter().map(Month::as_str).collect(),
        rows: aggregate::with_totals_row(&loaded.table)
            .iter()
            .map(MatrixRowView::from)
            .collect(),
        totais_por_categoria: aggregate::row_totals(&loaded.table)
            .into_iter()
            .map(|(categoria, total)| CategoriaTotal {
                categoria,
                total_formatado: total.formatted(),
                total,
            })
            .collect(),
        total,
        total_formatado: total.formatted(),
        aviso: loaded.warning,
    }))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub mensagem: &'static str,
    pub row: MatrixRowView,
}

pub async fn submit(
    State(state): State<DashboardState>,
    Json(form): Json<MatrixForm>,
) -> std::result::Result<(StatusCode, Json<SubmitResponse>), DashboardError> {
    let (categoria, mes, valor) = form.normalize().map_err(DashboardError::invalid)?;
    let matrix = state.matrix.merge(&categoria, mes, valor)?;
    tracing::info!("despesa adicionada: {categoria} / {} ({valor})", mes.as_str());

    let row = matrix
        .rows()
        .iter()
        .find(|row| row.categoria == categoria)
        .map(MatrixRowView::from)
        .ok_or_else(|| anyhow::anyhow!("merged categoria '{categoria}' missing from matrix"))?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            mensagem: "Despesa adicionada com sucesso!",
            row,
        }),
    ))
}

pub async fn export(
    State(state): State<DashboardState>,
) -> std::result::Result<impl IntoResponse, DashboardError> {
    let csv = state.matrix.export()?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}
