use axum::{extract::State, response::Html, routing::get, Router};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let shares = state.registry.list();

    let mut links = String::new();
    for share in &shares {
        links.push_str(&format!(
            "<li><a href=\"/download/{}\">{}</a></li>",
            share.id,
            escape_html(&share.name)
        ));
    }

    Html(format!(
        "<!doctype html>\
         <html><head><title>handout</title></head>\
         <body><h1>Shared files</h1><ul>{links}</ul></body></html>"
    ))
}

/// Minimal escaping for file names interpolated into the listing page.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
