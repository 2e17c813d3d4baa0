mod app;
mod auth;
mod completion;
mod config;
mod event;
mod notify;
mod prefs;
mod session;
mod theme;

use app::AriaApp;
use auth::{IdentityProvider, LocalIdentity};
use config::AppConfig;
use eframe::egui;
use event::AppEvent;
use prefs::PreferenceStore;
use session::coordinator::SendCoordinator;
use std::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aria=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load()?;
    let client = config.completion_client()?;
    info!(backend = client.name(), auth_required = config.auth.required, "starting ARIA");

    let prefs_store = AppConfig::project_dirs().map(|dirs| PreferenceStore::in_dir(dirs.data_dir()));
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("aria-runtime")
        .build()?;

    let mut identity = LocalIdentity::default();
    let auth_tx = tx.clone();
    identity.on_auth_state_change(Box::new(move |user| {
        let _ = auth_tx.send(AppEvent::AuthStateChanged(user.cloned()));
    }));

    let coordinator = SendCoordinator::new(client, runtime.handle().clone(), tx);
    let app = AriaApp::new(
        rx,
        coordinator,
        Box::new(identity),
        config.auth.required,
        prefs_store,
    );
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ARIA")
            .with_inner_size([1024.0, 760.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ARIA",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
