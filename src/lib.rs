pub mod api;
pub mod dispatcher;
pub mod environment;
pub mod logging;
pub mod server;
pub mod ui;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_UI: &str = "ui";
