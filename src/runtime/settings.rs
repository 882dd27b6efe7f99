use crate::config;

pub fn load_settings() -> config::Settings {
    // Runs before the subscriber exists, so problems go straight to stderr.
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("audex: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("audex: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
