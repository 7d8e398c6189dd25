//! Static page handlers

use axum::response::Html;

use crate::views;

pub async fn index() -> Html<String> {
    Html(views::index_page())
}

pub async fn about() -> Html<String> {
    Html(views::about_page())
}
