//! Flask mock app end to end.
//!
//! Demonstrates:
//! - Starting a Flask app with `mock_via_flask`
//! - Rebinding the app to a fresh control connection
//! - Attaching a handler and storing response data
//! - Detaching and stopping
//!
//! Expects a mock control server on 0.0.0.0:8080.
//!
//! Usage:
//!   cargo run --example mock_flask
//!   cargo run --example mock_flask -- --debug
//!   cargo run --example mock_flask -- --port 5001

// ============================================================================
// Imports
// ============================================================================

use httpmocker::{AppOptions, Client, HandlerOptions, Result, mock_via_flask};
use serde_json::json;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_APP_PORT: u16 = 5000;

const HANDLER_SOURCE: &str = r#"
def users(request):
    return data_for(request.path)
"#;

// ============================================================================
// Args
// ============================================================================

#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    port: u16,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let port = args
            .iter()
            .position(|a| a == "--port")
            .and_then(|i| args.get(i + 1))
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_APP_PORT);

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            port,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "httpmocker=debug"
    } else {
        "httpmocker=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== mock_flask ===\n");

    // ========================================================================
    // Start App
    // ========================================================================

    println!("[1] Starting flask app on port {}...", args.port);
    let mut app = mock_via_flask(args.port, AppOptions::new()).await?;
    println!("    ✓ {app}\n");

    // ========================================================================
    // Control Session
    // ========================================================================

    println!("[2] Reconnecting control session...");
    let mut client = Client::default();
    app.rebind(client.connect().await?);
    println!("    ✓ running: {}\n", app.running().await?);

    // ========================================================================
    // Handler
    // ========================================================================

    println!("[3] Attaching handler...");
    let mut handler = app.handler("users", HandlerOptions::new()).await?;
    handler.attach(HANDLER_SOURCE).await?;
    println!("    ✓ {handler} attached\n");

    println!("[4] Storing mock data...");
    handler
        .set_data("/api/users", &json!([{"id": 1, "name": "ada"}]))
        .await?;
    handler.remove_data("/api/users").await?;
    println!("    ✓ Data set and removed\n");

    handler.detach().await?;
    handler.close().await?;

    // ========================================================================
    // Teardown
    // ========================================================================

    println!("[5] Stopping app...");
    app.stop().await?;
    client.disconnect().await?;
    println!("    ✓ {app}\n");

    println!("=== Done ===");
    Ok(())
}
