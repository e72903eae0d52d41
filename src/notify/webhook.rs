// src/notify/webhook.rs

//! Chat-style webhook provider (Slack / Mattermost / Discord compatible
//! `{"text": ...}` payload).

use reqwest::{Client, Url};
use serde_json::{Map, Value, json};

use crate::config::PluginConfig;
use crate::errors::{Result, WardenError};
use crate::types::BoxFuture;

use super::{AlertContext, NotificationChannel, render_alert};

#[derive(Debug)]
pub struct WebhookChannel {
    url: Url,
    username: Option<String>,
    client: Option<Client>,
}

impl WebhookChannel {
    pub fn new(url: &str, username: Option<String>) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| WardenError::init("notification 'webhook'", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WardenError::init(
                "notification 'webhook'",
                format!("url scheme must be http or https (got '{}')", url.scheme()),
            ));
        }
        Ok(Self {
            url,
            username,
            client: None,
        })
    }

    pub fn from_config(cfg: &PluginConfig) -> Result<Box<dyn NotificationChannel>> {
        let url = cfg.str_option("url").ok_or_else(|| {
            WardenError::init("notification 'webhook'", "missing required option `url`")
        })?;
        let username = cfg.str_option("username").map(str::to_string);
        Ok(Box::new(WebhookChannel::new(url, username)?))
    }

    /// JSON body posted for `alert`.
    pub fn payload(&self, alert: &AlertContext) -> Value {
        let mut body = Map::new();
        body.insert("text".to_string(), Value::String(render_alert(alert)));
        if let Some(username) = &self.username {
            body.insert("username".to_string(), Value::String(username.clone()));
        }
        body.insert(
            "notificationType".to_string(),
            json!(alert.notification_type),
        );
        body.insert("app".to_string(), json!(alert.app));
        body.insert(
            "restartCount".to_string(),
            Value::String(alert.restart_count.clone()),
        );
        Value::Object(body)
    }
}

impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    fn init(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let client = Client::builder()
                .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| WardenError::init("notification 'webhook'", e))?;
            self.client = Some(client);
            Ok(())
        })
    }

    fn send<'a>(&'a mut self, alert: &'a AlertContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let client = self
                .client
                .as_ref()
                .ok_or_else(|| WardenError::send("webhook", "channel used before init"))?;

            let response = client
                .post(self.url.clone())
                .json(&self.payload(alert))
                .send()
                .await
                .map_err(|e| WardenError::send("webhook", e))?;

            response
                .error_for_status()
                .map_err(|e| WardenError::send("webhook", e))?;
            Ok(())
        })
    }
}
