//! User agent headers
//!
//! `User-Agent` carries the binding name, version and any application info;
//! `X-Stripe-Client-User-Agent` carries the same plus platform details as
//! JSON. Both are computed once per backend.

use std::process::Command;

use once_cell::sync::Lazy;
use paywire_domain::constants::{CLIENT_VERSION, PUBLISHER, UNKNOWN_PLATFORM, USER_AGENT_PREFIX};
use paywire_domain::AppInfo;
use serde::Serialize;

/// Output of `uname -a`, read once per process.
static UNAME: Lazy<String> = Lazy::new(|| {
    Command::new("uname")
        .arg("-a")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|uname| !uname.is_empty())
        .unwrap_or_else(|| UNKNOWN_PLATFORM.to_string())
});

/// Compiler version recorded by the build script.
const RUSTC_VERSION: &str = env!("PAYWIRE_RUSTC_VERSION");

#[derive(Debug, Serialize)]
struct ClientUserAgent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    application: Option<&'a AppInfo>,
    bindings_version: &'static str,
    lang: &'static str,
    lang_version: &'static str,
    publisher: &'static str,
    uname: &'a str,
}

/// `Stripe/v1 RustBindings/<version>` plus the formatted app info.
#[must_use]
pub fn encoded_user_agent(app_info: Option<&AppInfo>) -> String {
    let mut agent = format!("{USER_AGENT_PREFIX}/{CLIENT_VERSION}");
    if let Some(info) = app_info {
        agent.push(' ');
        agent.push_str(&info.format_user_agent());
    }
    agent
}

/// JSON payload of `X-Stripe-Client-User-Agent`.
pub fn encoded_client_user_agent(app_info: Option<&AppInfo>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ClientUserAgent {
        application: app_info,
        bindings_version: CLIENT_VERSION,
        lang: "rust",
        lang_version: RUSTC_VERSION,
        publisher: PUBLISHER,
        uname: &UNAME,
    })
}
