// src/config/credentials.rs
//! Store and mail credentials resolved from the environment.
use std::env;

pub const DEFAULT_NOTION_DATABASE_ID: &str = "04e8ee4a-9d2a-4830-9086-4ab02669a118";
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Read an env var, treating blank values as unset.
fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionSettings {
    /// `None` disables the storage stage.
    pub api_key: Option<String>,
    pub database_id: String,
}

impl NotionSettings {
    pub fn from_env() -> Self {
        Self {
            api_key: env_nonempty("NOTION_API_KEY"),
            database_id: env_nonempty("NOTION_DATABASE_ID")
                .unwrap_or_else(|| DEFAULT_NOTION_DATABASE_ID.to_string()),
        }
    }

    /// Browser link to the database, used in the digest footer.
    pub fn page_link(&self) -> String {
        format!("https://www.notion.so/{}", self.database_id.replace('-', ""))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub from: String,
    pub to: String,
    pub password: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

impl EmailSettings {
    /// Returns the names of the missing variables when the set is incomplete.
    pub fn from_env() -> Result<Self, Vec<&'static str>> {
        let from = env_nonempty("EMAIL_FROM");
        let to = env_nonempty("EMAIL_TO");
        let password = env_nonempty("EMAIL_PASSWORD");

        match (from, to, password) {
            (Some(from), Some(to), Some(password)) => Ok(Self {
                from,
                to,
                password,
                smtp_server: env_nonempty("SMTP_SERVER")
                    .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                smtp_port: env_nonempty("SMTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_SMTP_PORT),
            }),
            (from, to, password) => {
                let mut missing = Vec::new();
                if from.is_none() {
                    missing.push("EMAIL_FROM");
                }
                if to.is_none() {
                    missing.push("EMAIL_TO");
                }
                if password.is_none() {
                    missing.push("EMAIL_PASSWORD");
                }
                Err(missing)
            }
        }
    }
}
