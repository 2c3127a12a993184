use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use log::{error, info};
use portal_csp::prelude::*;

/// Renders the demo portal page: insertion-point marker in the head, a
/// styled body, and the public-env script, all tied together by the
/// per-request nonce the middleware issued.
async fn index(
    req: HttpRequest,
    config: web::Data<PortalConfig>,
) -> actix_web::Result<HttpResponse> {
    let nonce = req.get_nonce().unwrap_or_default();

    let mut cache = StyleCache::new();
    cache.insert_rule("p0rt4l", ".css-p0rt4l{font-family:system-ui;margin:2rem;}");

    let env_script = public_env_script(&config.browser_environment(), &nonce)?;
    let html = format!(
        "<html><head>\
         <meta name=\"emotion-insertion-point\" content=\"emotion-insertion-point\"/>\
         <title>Portal</title></head>\
         <body><div class=\"css-p0rt4l\">Portal is up</div>{}</body></html>",
        env_script
    );
    let markup = render_critical_styles(&html, &cache, &nonce);

    Ok(HttpResponse::Ok()
        .content_type("text/html")
        .body(format!("<!DOCTYPE html>{}", markup)))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let environment = match GlobalEnvironment::from_process_env() {
        Ok(environment) => environment,
        Err(err) => {
            error!("refusing to start: {}", err);
            std::process::exit(1);
        }
    };

    let is_development = std::env::var("NODE_ENV")
        .map(|mode| mode == "development")
        .unwrap_or(false);
    let config = PortalConfig::new(environment, is_development);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    info!("Server listening on: http://localhost:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .wrap(csp_middleware(config.clone()))
            .route("/", web::get().to(index))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
