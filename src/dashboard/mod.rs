//! Request handlers and router for the web dashboard.
//!
//! Every interaction is a full reload-compute-respond pass over the stores:
//! handlers hold no state of their own beyond the injected
//! [`DashboardState`], and every summary is recomputed per request. The
//! browser-side rendering (tables, charts, forms) consumes these endpoints
//! and is out of scope here.

mod despesas;
mod gastos;

use crate::model::{taxonomy, Month};
use anyhow::Context;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::store::{LedgerStore, MatrixStore};

/// Application state passed to every request handler.
#[derive(Clone)]
pub struct DashboardState {
    pub ledger: LedgerStore,
    pub matrix: MatrixStore,
}

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/gastos", get(gastos::table).post(gastos::submit))
        .route("/gastos/export", get(gastos::export))
        .route("/gastos/resumo/categorias", get(gastos::by_categoria))
        .route("/gastos/resumo/itens", get(gastos::by_item))
        .route("/gastos/resumo/meses", get(gastos::by_mes))
        .route("/despesas", get(despesas::table).post(despesas::submit))
        .route("/despesas/export", get(despesas::export))
        .route("/taxonomia", get(taxonomia))
        .with_state(state)
}

/// Binds the listener and serves the dashboard until the process exits.
pub async fn serve(state: DashboardState, addr: &str) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to bind dashboard listener on {addr}"))?;
    tracing::info!("dashboard listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .await
        .context("dashboard server failed")
}

#[derive(Debug, Serialize)]
struct CategoriaItens {
    categoria: &'static str,
    itens: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct TaxonomiaView {
    /// Category → item lists offered by the flat entry form.
    categorias: Vec<CategoriaItens>,
    /// Categories offered by the matrix entry form.
    categorias_matriz: [&'static str; 6],
    /// Month names in calendar order, for selectors and chart axes.
    meses: Vec<&'static str>,
}

/// The fixed selector contents for both entry forms.
async fn taxonomia() -> Json<TaxonomiaView> {
    Json(TaxonomiaView {
        categorias: taxonomy::CATEGORIAS
            .iter()
            .copied()
            .map(|(categoria, itens)| CategoriaItens { categoria, itens })
            .collect(),
        categorias_matriz: taxonomy::MATRIX_CATEGORIAS,
        meses: Month::ALL.iter().map(Month::as_str).collect(),
    })
}
