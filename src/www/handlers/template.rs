//! # HTML Templating and Response Helpers
//!
//! A single-layout HTML templating setup built on `handlebars`, plus helper
//! functions for turning handler results into `actix_web::HttpResponse`
//! objects.

use actix_web::{HttpResponse, Responder};
use anyhow::Result;
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;

/// A lazily-initialized, global instance of the Handlebars templating engine.
static ENGINE: Lazy<Handlebars> = Lazy::new(new_engine);

/// Creates and configures a new `Handlebars` engine instance.
///
/// A single template named "main" serves as the layout for every page; the
/// page-specific content is injected at the `{{{contents}}}` placeholder.
pub fn new_engine() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string(
            "main",
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1.0,user-scalable=yes">
<title>Timetabler</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table.table { border-collapse: collapse; }
table.table th, table.table td { border: 1px solid #ccc; padding: 0.3rem 0.6rem; text-align: left; }
nav ul { list-style: none; padding: 0; }
nav li { display: inline; margin-right: 1rem; }
</style>
</head>
<body>
<nav>
<ul>
<li><a href="/">Dashboard</a></li>
<li><a href="/schedules">Schedules</a></li>
</ul>
</nav>
<main>
<article>
{{{contents}}}
</article>
</main>
</body>
</html>"#,
        )
        .unwrap();
    handlebars
}

/// A simple utility to escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            '/' => "&#x2F;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Renders the given content string into the main HTML layout.
pub fn render(contents: &str) -> String {
    ENGINE
        .render(
            "main",
            &json!({
                "contents": contents,
            }),
        )
        .unwrap()
}

/// Creates an HTML response for displaying an `anyhow::Error`.
pub fn to_error_response(result: &anyhow::Error) -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/html")
        .body(render(&format!(
            "<h1>Error</h1><pre><code>{}</code></pre>",
            escape_html(&format!("{:?}", result))
        )))
}

/// Creates a standard HTML `Ok` response from a string slice.
pub fn to_html_response(result: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html")
        .body(render(result))
}

/// A generic helper that converts a `Result<String>` into an HTML response.
pub fn to_response(result: Result<String>) -> impl Responder {
    match result {
        Ok(x) => to_html_response(&x),
        Err(e) => to_error_response(&e),
    }
}
