use std::{net::SocketAddr, sync::Arc};

use courtside::{
    builtin_dashboards, dashboard_router, init_logging, load_table, log_app_bind, log_app_start,
    log_source_loaded, logging_config_from_env, scrape_client, AppSnapshot, Dashboard,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let addr: SocketAddr = std::env::var("COURTSIDE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;

    // Blocking startup scrape; the tables stay immutable for the process
    // lifetime, so the async runtime only ever reads them.
    let client = scrape_client()?;
    let dashboards: Vec<Dashboard> = builtin_dashboards()
        .into_iter()
        .map(|config| {
            let table = load_table(&client, &config);
            log_source_loaded(config.slug, table.rows.len(), table.columns.len());
            Dashboard { config, table }
        })
        .collect();

    let app = dashboard_router(Arc::new(AppSnapshot { dashboards }));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log_app_bind(listener.local_addr()?);
        axum::serve(listener, app).await
    })?;

    Ok(())
}
