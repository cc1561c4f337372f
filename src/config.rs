use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Shared secret used to verify signed client requests (HMAC-SHA256)
    pub app_secret_key: String,
    /// Admin secret key; admin endpoints are disabled when unset
    pub admin_secret_key: Option<String>,

    // Payment gateway (QR aggregator)
    pub gateway_api_url: String,
    pub gateway_username: String,
    pub gateway_password: String,
    pub gateway_con_id: String,
    pub gateway_promptpay_id: String,
    /// Key the gateway signs webhook payloads with (MD5 of "<data>:<key>")
    pub gateway_api_key: String,

    // Supplier catalog (wholesale games / premium services)
    pub supplier_api_url: String,
    pub supplier_api_key: String,

    // Telegram admin notifications (optional)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let app_secret_key = env::var("APP_SECRET_KEY")
            .map_err(|_| "APP_SECRET_KEY must be set for signed request verification")?;

        let admin_secret_key = env::var("ADMIN_SECRET_KEY").ok();

        let gateway_api_url =
            env::var("GATEWAY_API_URL").map_err(|_| "GATEWAY_API_URL must be set")?;
        let gateway_username =
            env::var("GATEWAY_USERNAME").map_err(|_| "GATEWAY_USERNAME must be set")?;
        let gateway_password =
            env::var("GATEWAY_PASSWORD").map_err(|_| "GATEWAY_PASSWORD must be set")?;
        let gateway_con_id =
            env::var("GATEWAY_CON_ID").map_err(|_| "GATEWAY_CON_ID must be set")?;
        let gateway_promptpay_id =
            env::var("GATEWAY_PROMPTPAY_ID").map_err(|_| "GATEWAY_PROMPTPAY_ID must be set")?;
        let gateway_api_key =
            env::var("GATEWAY_API_KEY").map_err(|_| "GATEWAY_API_KEY must be set")?;

        let supplier_api_url =
            env::var("SUPPLIER_API_URL").map_err(|_| "SUPPLIER_API_URL must be set")?;
        let supplier_api_key =
            env::var("SUPPLIER_API_KEY").map_err(|_| "SUPPLIER_API_KEY must be set")?;

        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN").ok();
        let telegram_chat_id = env::var("TELEGRAM_CHAT_ID").ok();

        Ok(Config {
            server_host,
            server_port,
            database_url,
            allowed_origins,
            environment,
            app_secret_key,
            admin_secret_key,
            gateway_api_url,
            gateway_username,
            gateway_password,
            gateway_con_id,
            gateway_promptpay_id,
            gateway_api_key,
            supplier_api_url,
            supplier_api_key,
            telegram_bot_token,
            telegram_chat_id,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
