use std::env;
use std::path::PathBuf;

/// Member accounts whose documents never count towards sales figures.
pub const DEFAULT_EXCLUDED_MEMBERS: &[&str] = &["陈思", "郭霏"];

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    pub static_path: PathBuf,
    pub pool_size: u32,
    pub excluded_members: Vec<String>,
    pub top_n: usize,
    /// Propagate store failures instead of degrading to an empty result.
    pub strict_store: bool,
    /// Font file for chart text, e.g. a CJK face for Chinese titles.
    pub chart_font: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("SALESDASH_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("SALESDASH_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("SALESDASH_DATABASE_URL")
                .map(|v| parse_database_path(&v))
                .unwrap_or_else(|_| PathBuf::from("data/salesdash.db")),
            migrations_path: env::var("SALESDASH_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            static_path: env::var("SALESDASH_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            pool_size: env::var("SALESDASH_DB_POOL_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10),
            excluded_members: env::var("SALESDASH_EXCLUDED_MEMBERS")
                .map(|v| parse_member_list(&v))
                .unwrap_or_else(|_| default_excluded_members()),
            top_n: env::var("SALESDASH_TOP_N")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_TOP_N),
            strict_store: env::var("SALESDASH_STRICT_STORE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            chart_font: env::var("SALESDASH_CHART_FONT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            database_path: PathBuf::from("data/salesdash.db"),
            migrations_path: PathBuf::from("migrations"),
            static_path: PathBuf::from("static"),
            pool_size: 10,
            excluded_members: default_excluded_members(),
            top_n: DEFAULT_TOP_N,
            strict_store: false,
            chart_font: None,
        }
    }
}

pub fn default_excluded_members() -> Vec<String> {
    DEFAULT_EXCLUDED_MEMBERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn parse_database_path(value: &str) -> PathBuf {
    PathBuf::from(
        value
            .strip_prefix("sqlite://")
            .or_else(|| value.strip_prefix("sqlite:"))
            .unwrap_or(value),
    )
}

/// Comma separated, accepting the full-width comma as well.
fn parse_member_list(value: &str) -> Vec<String> {
    value
        .split([',', '，'])
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
