use fileward_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration; missing storage credentials abort here
    let config = Config::from_env()?;

    // Initialize the application (storage backend, state, routes)
    let (state, router) = fileward_api::setup::initialize_app(config).await?;

    // Start the server
    fileward_api::setup::server::start_server(&state.config, router, state.shutdown.clone())
        .await?;

    Ok(())
}
