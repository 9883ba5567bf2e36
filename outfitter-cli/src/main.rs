//! Outfitter setup binary.
//!
//! Provisions the proxy engine and browser runtime into `resources/` under
//! the current working directory. No flags; all behavior is fixed by
//! [`SetupConfig::default`]. Exits 0 on success, 1 on any fatal error.

use anyhow::Result;
use outfitter_core::{
    build_client, native_extractor, pipeline, ChromeForTestingInstaller, PlatformProfile,
    SetupConfig,
};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("outfitter=info".parse().unwrap())
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    tracing::info!("Starting Outfitter v{}", outfitter_core::VERSION);

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    if let Err(error) = runtime.block_on(provision()) {
        tracing::error!("Setup failed: {:#}", error);
        eprintln!("Setup failed: {:#}", error);
        std::process::exit(1);
    }
}

async fn provision() -> Result<()> {
    let config = SetupConfig::default();

    // Unsupported platforms terminate here, before any filesystem work.
    let profile = PlatformProfile::detect()?;
    tracing::info!("Platform: {}", profile);

    let client = build_client()?;
    let extractor = native_extractor();
    let browser = ChromeForTestingInstaller::new(
        client.clone(),
        native_extractor(),
        profile,
        config.chrome_base_url.clone(),
        config.max_redirects,
    );

    pipeline::run(&config, &client, profile, extractor.as_ref(), &browser).await
}
