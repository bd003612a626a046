use crate::{config::CliConfig, widget::AuthorList, Result, TEMPLATES_DIR};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// A mounted widget together with the time it was last used.
#[derive(Debug)]
pub struct WidgetInstance {
    pub widget: AuthorList,
    last_access: i64,
}

impl WidgetInstance {
    pub fn new(widget: AuthorList) -> Self {
        Self {
            widget,
            last_access: Utc::now().timestamp(),
        }
    }

    pub fn touch(&mut self) {
        self.last_access = Utc::now().timestamp();
    }
}

/// Create the template environment with all embedded templates.
pub fn create_templates(url_prefix: &str) -> minijinja::Environment<'static> {
    let mut templates = minijinja::Environment::new();

    // Define any global variables
    templates.add_global("url_prefix", url_prefix.to_string());

    // Load templates by name from the included templates folder
    templates.set_loader(|name| {
        if let Some(file) = TEMPLATES_DIR.get_file(name) {
            Ok(file.contents_utf8().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    });
    templates
}

pub struct GlobalAppState {
    pub service_url: Url,
    pub default_formatting: String,
    pub templates: minijinja::Environment<'static>,
    pub instances: DashMap<String, WidgetInstance>,
    pub client: reqwest::Client,
    instance_timeout: Duration,
    instance_counter: AtomicU64,
}

impl GlobalAppState {
    pub fn new(config: &CliConfig) -> Result<Self> {
        let templates = create_templates(&config.frontend_prefix);

        // Relative joins only keep the last path segment if it ends with a slash
        let mut service_url = Url::parse(&config.service_url)?;
        if !service_url.path().ends_with('/') {
            let path = format!("{}/", service_url.path());
            service_url.set_path(&path);
        }

        let client = reqwest::ClientBuilder::new().build()?;
        let result = Self {
            service_url,
            default_formatting: config.default_formatting.clone(),
            templates,
            instances: DashMap::new(),
            client,
            instance_timeout: Duration::minutes(config.instance_timeout),
            instance_counter: AtomicU64::new(0),
        };
        Ok(result)
    }

    /// Store a new widget instance and return its key.
    pub fn register(&self, widget: AuthorList) -> String {
        let n = self.instance_counter.fetch_add(1, Ordering::Relaxed);
        let key = format!("{:x}-{}", Utc::now().timestamp_millis(), n);
        self.instances
            .insert(key.clone(), WidgetInstance::new(widget));
        key
    }

    /// Removes widget instances that have not been used for longer than the
    /// configured timeout.
    pub async fn cleanup(&self) {
        let oldest_allowed = Utc::now().timestamp() - self.instance_timeout.num_seconds();
        self.instances
            .retain(|_key, instance| instance.last_access >= oldest_allowed);
    }
}
