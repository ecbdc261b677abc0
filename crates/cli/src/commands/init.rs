//! `sortinghat init` — Write a default config file.

use sortinghat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("Config file already exists: {}", config_path.display());
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Wrote default config: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set issuer_did to your labeler account's DID");
    println!("  2. Set signing_key to a 32-byte hex seed (or SORTINGHAT_SIGNING_KEY)");
    println!("  3. Set the classifier API key (or OPENAI_API_KEY)");
    println!("  4. Run `sortinghat register-labels` once, then `sortinghat serve`");

    Ok(())
}
