use env_logger::{Builder, Env, Target};

/// Loads `.env` (if present) and initialises the logger.
///
/// Logs go to stderr: stdout belongs to the operator prompt.
pub fn setup_env() {
    dotenvy::dotenv().ok();
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();
}
