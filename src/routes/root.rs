use axum::{response::Html, routing::get, Json, Router};

use crate::{state::AppState, users::dto::Message};

const HELLO_PAGE: &str = r#"<html>
  <head>
    <title>Nosso olá mundo!</title>
  </head>
  <body>
    <h1> Olá Mundo </h1>
  </body>
</html>"#;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(read_root))
        .route("/exercicio-html", get(hello_html))
        .route("/health", get(|| async { "ok" }))
}

pub async fn read_root() -> Json<Message> {
    Json(Message {
        message: "Olá Mundo!".into(),
    })
}

pub async fn hello_html() -> Html<&'static str> {
    Html(HELLO_PAGE)
}
