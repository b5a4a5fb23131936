use crate::core::config::data::Config;

fn or_unset<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(unset)".to_string())
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  theme: {}", self.theme_preference());
        println!("  model: {}", self.model_or_default());
        println!("  base-url: {}", self.base_url_or_default());
        println!("  request-timeout: {}s", self.request_timeout().as_secs());
        println!(
            "  reveal-chars-per-tick: {}",
            or_unset(self.reveal_chars_per_tick)
        );
        println!("  reveal-interval-ms: {}", or_unset(self.reveal_interval_ms));
        println!("  export-width: {}", self.export_width());
    }
}
