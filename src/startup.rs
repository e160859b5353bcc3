use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, Settings};
use crate::context::AppContext;
use crate::routes;
use crate::store::Store;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    port: u16,
    server: Server,
    ctx: Arc<AppContext>,
}

impl Application {
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;
        let port = listener.local_addr().unwrap().port();

        let pool = get_connection_pool(&cfg.database);
        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Store::new(pool);
        let ctx = Arc::new(AppContext::new(store, cfg)?);

        let server = run(listener, Arc::clone(&ctx))?;

        Ok(Self { port, server, ctx })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// The context is shared with the Scheduler and background workers, not
    /// just the HTTP server; `main` pulls it out before racing everything.
    pub fn context(&self) -> Arc<AppContext> {
        Arc::clone(&self.ctx)
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(db_cfg: &DatabaseSettings) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(20)
        .connect_lazy_with(db_cfg.connect_options())
}

/// Declares all `/api/*` endpoints. The server holds no session/cookie state:
/// every request is either unauthenticated (dashboard reads) or bears its own
/// bearer token / signed query string (admin routes, the feedback link).
pub fn run(listener: TcpListener, ctx: Arc<AppContext>) -> Result<Server, anyhow::Error> {
    let ctx_data = Data::from(ctx);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(routes::health_check))
                    .route("/opinions", web::get().to(routes::list_opinions))
                    .route("/opinions/{id}", web::get().to(routes::get_opinion))
                    .route("/search", web::get().to(routes::search_opinions))
                    .route("/stats", web::get().to(routes::get_stats))
                    .route("/stats/trend", web::get().to(routes::get_trend))
                    .route("/ai/summary", web::post().to(routes::ai_summary))
                    .route("/ai/insight", web::post().to(routes::ai_insight))
                    .route(
                        "/notification/suppress_keywords",
                        web::get().to(routes::get_suppress_keywords),
                    )
                    .route(
                        "/notification/suppress_keywords",
                        web::post().to(routes::set_suppress_keywords),
                    )
                    .route("/report/generate", web::post().to(routes::generate_report))
                    .route(
                        "/report/download/{filename}",
                        web::get().to(routes::download_report),
                    )
                    .route("/feedback", web::get().to(routes::feedback_endpoint))
                    .route("/feedback", web::post().to(routes::feedback_endpoint)),
            )
            .app_data(ctx_data.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
