use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Console logs go to stderr; stdout is reserved for rendered pages.
pub fn configure_logging(log_dir: &str) {
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(EnvFilter::new("info,web_request=warn,ui=warn,hyper=off"));

    let file_appender = rolling::daily(log_dir, "biaslens.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new("web_request=debug,ui=debug,info"));

    tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .init();
}
