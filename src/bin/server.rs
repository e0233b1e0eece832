//! SSE chat-room server with room codes and automatic expiry.
//!
//! Clients join a room over a long-lived SSE stream and receive presence
//! notifications and relayed messages; rooms expire 24 hours after creation.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hanare::{
    common::{logger::setup_logger, time::SystemClock},
    domain::DEFAULT_ROOM_TTL_HOURS,
    infrastructure::{
        presence::SsePresenceHub,
        repository::InMemoryRoomStore,
        scheduler::{DEFAULT_CLEANUP_INTERVAL_MINUTES, SchedulerService},
    },
    ui::{Server, state::AppState},
    usecase::{CloseSessionUseCase, OpenSessionUseCase, PostMessageUseCase},
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "SSE chat-room server with room expiry", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Room lifetime in hours from creation
    #[arg(long, default_value_t = DEFAULT_ROOM_TTL_HOURS)]
    room_ttl_hours: i64,

    /// Minutes between scheduled expiry sweeps
    #[arg(long, default_value_t = DEFAULT_CLEANUP_INTERVAL_MINUTES)]
    cleanup_interval_minutes: u64,

    /// Do not start the periodic expiry sweep (manual cleanup still works)
    #[arg(long)]
    no_scheduler: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Clock / Room Store
    // 2. PresenceHub
    // 3. UseCases
    // 4. Scheduler
    // 5. AppState / Server

    // 1. Create Room Store (in-memory database)
    let clock = Arc::new(SystemClock);
    let room_store = Arc::new(InMemoryRoomStore::new(clock.clone(), args.room_ttl_hours));

    // 2. Create PresenceHub (SSE implementation)
    let hub = Arc::new(SsePresenceHub::new());

    // 3. Create UseCases
    let open_session_usecase = Arc::new(OpenSessionUseCase::new(hub.clone()));
    let close_session_usecase = Arc::new(CloseSessionUseCase::new(hub.clone()));
    let post_message_usecase = Arc::new(PostMessageUseCase::new(hub.clone()));

    // 4. Spawn the expiry scheduler
    let scheduler = SchedulerService::new(
        room_store.clone(),
        clock.clone(),
        Duration::from_secs(args.cleanup_interval_minutes * 60),
    )
    .spawn();
    if args.no_scheduler {
        tracing::info!("Periodic expiry sweep disabled");
    } else if let Err(e) = scheduler.start_all_tasks().await {
        tracing::error!("Failed to start scheduler: {}", e);
        std::process::exit(1);
    }

    // 5. Create and run the server
    let state = Arc::new(AppState {
        open_session_usecase,
        close_session_usecase,
        post_message_usecase,
        room_store,
        hub,
        scheduler,
        clock,
    });
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
