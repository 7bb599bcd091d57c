use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PushSettings {
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
    pub project_id: String,
    pub access_token: String,
    #[serde(default = "default_push_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LimitSettings {
    #[serde(default = "default_guest_max_reminders")]
    pub guest_max_reminders: u64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            guest_max_reminders: default_guest_max_reminders(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    pub push: PushSettings,
    #[serde(default)]
    pub limits: LimitSettings,
}

fn default_database_url() -> String {
    "sqlite://remindme.db".to_string()
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_push_timeout_secs() -> u64 {
    10
}

fn default_guest_max_reminders() -> u64 {
    5
}
