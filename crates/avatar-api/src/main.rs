use avatar_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Wire directory, storage and pipeline, then build the router
    let (_state, router) = avatar_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    avatar_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
