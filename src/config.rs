use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub allowed_origins: Vec<String>,
    pub client_ip_header: String,
    pub store: StoreConfig,
    pub mail: Option<MailConfig>,
    pub notify_failure_policy: NotifyFailurePolicy,
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Firestore(FirestoreConfig),
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    pub database_url: String,
    pub database_id: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub notification_address: String,
    /// Prefix of the deep link to a stored record; the document id is appended.
    pub record_url: String,
}

/// What a request reports when the record was saved but the staff email failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotifyFailurePolicy {
    /// Report 500, as if the whole submission failed.
    Fatal,
    /// Log a warning and report success.
    Warn,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env = Env(&lookup);

        let host: IpAddr = env.or("INTAKE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_HOST: {e}"))?;

        let port: u16 = env.or("INTAKE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_PORT: {e}"))?;

        let log_level = env.or("INTAKE_LOG_LEVEL", "info");

        let max_body_size: usize = env.or("INTAKE_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_MAX_BODY_SIZE: {e}"))?;

        let allowed_origins = split_list(&env.or("INTAKE_ALLOWED_ORIGINS", ""));
        let client_ip_header = env.or("INTAKE_CLIENT_IP_HEADER", "client-ip").to_lowercase();

        let store = match env.or("INTAKE_STORE", "firestore").as_str() {
            "firestore" => StoreConfig::Firestore(firestore_from_env(&env)?),
            "postgres" => StoreConfig::Postgres {
                database_url: env.required("DATABASE_URL")?,
            },
            "memory" => StoreConfig::Memory,
            other => return Err(format!("Invalid INTAKE_STORE: {other}")),
        };

        let mail = mail_from_env(&env, &store)?;

        let notify_failure_policy = match env.or("NOTIFY_FAILURE_POLICY", "fatal").as_str() {
            "fatal" => NotifyFailurePolicy::Fatal,
            "warn" => NotifyFailurePolicy::Warn,
            other => return Err(format!("Invalid NOTIFY_FAILURE_POLICY: {other}")),
        };

        Ok(Config {
            host,
            port,
            log_level,
            max_body_size,
            allowed_origins,
            client_ip_header,
            store,
            mail,
            notify_failure_policy,
        })
    }
}

fn firestore_from_env(env: &Env<'_>) -> Result<FirestoreConfig, String> {
    Ok(FirestoreConfig {
        project_id: env.required("FIREBASE_PROJECT_ID")?,
        client_email: env.required("FIREBASE_CLIENT_EMAIL")?,
        // Keys pasted into env files usually carry escaped newlines
        private_key: env.required("FIREBASE_PRIVATE_KEY")?.replace("\\n", "\n"),
        // Not needed to reach Firestore; still required so deployments keep one credential set
        database_url: env.required("FIREBASE_DATABASE_URL")?,
        database_id: env.or("FIRESTORE_DATABASE_ID", "(default)"),
        collection: env.or("FIREBASE_COLLECTION", "registrations"),
    })
}

fn mail_from_env(env: &Env<'_>, store: &StoreConfig) -> Result<Option<MailConfig>, String> {
    let (user, password, notification_address) = match (
        env.optional("MAIL_USER"),
        env.optional("MAIL_PASSWORD"),
        env.optional("NOTIFICATION_ADDRESS"),
    ) {
        (None, None, None) => return Ok(None),
        (Some(user), Some(password), Some(address)) => (user, password, address),
        (user, password, address) => {
            let missing: Vec<&str> = [
                ("MAIL_USER", user.is_none()),
                ("MAIL_PASSWORD", password.is_none()),
                ("NOTIFICATION_ADDRESS", address.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(key, _)| *key)
            .collect();
            return Err(format!(
                "Incomplete mail configuration, missing: {}",
                missing.join(", ")
            ));
        }
    };

    let port: u16 = env.or("MAIL_PORT", "587")
        .parse()
        .map_err(|e| format!("Invalid MAIL_PORT: {e}"))?;

    let record_url = env.optional("CONSOLE_RECORD_URL").unwrap_or_else(|| match store {
        StoreConfig::Firestore(fs) => default_console_url(fs),
        _ => String::new(),
    });

    Ok(Some(MailConfig {
        host: env.or("MAIL_HOST", "smtp.gmail.com"),
        port,
        from: env.optional("MAIL_FROM").unwrap_or_else(|| user.clone()),
        user,
        password,
        notification_address,
        record_url,
    }))
}

/// Firebase console path of a document in the configured collection, minus the id.
pub fn default_console_url(fs: &FirestoreConfig) -> String {
    format!(
        "https://console.firebase.google.com/project/{}/firestore/data/~2F{}~2F",
        fs.project_id, fs.collection
    )
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn required(&self, key: &str) -> Result<String, String> {
        self.optional(key)
            .ok_or_else(|| format!("Missing required environment variable: {key}"))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }
}
