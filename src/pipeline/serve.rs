// src/pipeline/serve.rs

//! Catalog presentation server.
//!
//! - `GET /`          ordered episode list with a client-side search box
//! - `GET /files/*`   raw media and sidecar files from the data directory
//! - `GET /static/*`  static assets

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use crate::error::Result;
use crate::models::{Config, Episode};
use crate::utils::report;

/// Build the router for an already loaded catalog.
pub fn router(episodes: &[Episode], data_dir: &Path, static_dir: &Path) -> Router {
    let page = Arc::new(render_index(episodes));

    Router::new()
        .route("/", get(index))
        .nest_service("/files", ServeDir::new(data_dir))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(page)
}

async fn index(State(page): State<Arc<String>>) -> Html<String> {
    Html(page.as_ref().clone())
}

/// Serve `episodes` until `cancel` fires.
pub async fn run_server(
    config: &Config,
    episodes: &[Episode],
    cancel: CancellationToken,
) -> Result<()> {
    report::header("Serving episode catalog");

    let app = router(episodes, &config.paths.data_dir, &config.paths.static_dir);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    log::info!(
        "Serving {} episodes on http://{}",
        episodes.len(),
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    log::info!("Server stopped");
    Ok(())
}

/// Render the catalog page.
pub fn render_index(episodes: &[Episode]) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html lang="ca">
<head>
<meta charset="utf-8">
<title>Episodes</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<form id="search-form">
  <input id="search-term" type="search" placeholder="Search">
  <select id="search-by">
    <option value="title">Title</option>
    <option value="description">Description</option>
  </select>
  <button type="submit">Search</button>
</form>
<ul class="episodes">
"#,
    );

    for episode in episodes {
        let src = format!("/files/{}", urlencoding::encode(&episode.file));
        html.push_str(&format!(
            r#"<li class="episode">
  <img src="{image}" alt="" loading="lazy">
  <h2 class="episode-title">{title}</h2>
  <p class="episode-description">{description}</p>
  <audio controls preload="none" src="{src}"></audio>
</li>
"#,
            image = attr(&episode.image),
            title = text(&episode.title),
            description = text(&episode.description),
            src = attr(&src),
        ));
    }

    html.push_str("</ul>\n<script src=\"/static/search.js\"></script>\n</body>\n</html>\n");
    html
}
