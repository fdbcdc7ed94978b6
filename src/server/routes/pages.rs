//! Static informational pages

use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::context;
use serde::Deserialize;

use crate::labels::plants;
use crate::server::render::Page;
use crate::server::state::SharedState;
use crate::utils::error::Result;

/// Query string shared by every page
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// GET / - Home page
pub async fn home(
    State(state): State<SharedState>,
    Query(query): Query<LangQuery>,
) -> Result<Html<String>> {
    let language = state.language(query.lang.as_deref());
    let html = state.pages.render(&state, Page::Home, language, context! {})?;
    Ok(Html(html))
}

/// GET /about - Dataset description
pub async fn about(
    State(state): State<SharedState>,
    Query(query): Query<LangQuery>,
) -> Result<Html<String>> {
    let language = state.language(query.lang.as_deref());
    let html = state
        .pages
        .render(&state, Page::About, language, context! { plants => plants() })?;
    Ok(Html(html))
}
