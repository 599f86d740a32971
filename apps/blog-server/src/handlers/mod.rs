//! HTTP handlers and route configuration.

mod health;
mod posts;
mod present;
mod sitemap;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/blog")
                    .route("/posts", web::get().to(posts::list_posts))
                    .route(
                        "/posts/{year}/{month}/{day}/{slug}",
                        web::get().to(posts::post_detail),
                    )
                    .route(
                        "/posts/{post_id}/comments",
                        web::post().to(posts::post_comment),
                    )
                    .route("/posts/{post_id}/share", web::post().to(posts::share_post))
                    .route("/search", web::get().to(posts::search)),
            ),
    )
    // Canonical post URL, as linked from share mails and the sitemap.
    .route(
        "/blog/{year}/{month}/{day}/{slug}/",
        web::get().to(posts::post_detail),
    )
    .route("/sitemap.xml", web::get().to(sitemap::sitemap));
}
