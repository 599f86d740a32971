//! XML sitemap of published posts.

use std::fmt::Write;

use actix_web::{HttpRequest, HttpResponse, web};

use quill_core::service::SitemapEntry;

use super::posts::base_url;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /sitemap.xml
pub async fn sitemap(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let entries = state.blog.sitemap(&base_url(&req)).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(render(&entries)))
}

fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for entry in entries {
        // Writing into a String cannot fail.
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    \
             <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape(&entry.loc),
            entry.lastmod.format("%Y-%m-%d"),
            entry.changefreq,
            entry.priority,
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
