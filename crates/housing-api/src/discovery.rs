// API module discovery
//
// Loading an API module means fetching its discovery document and recording
// which methods it exposes. The method set is what the rest of the client
// treats as the capabilities of that module.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::handle_response;
use crate::error::Error;

/// A remote API module, identified by name and version, served from `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiModule {
    pub name: String,
    pub version: String,
    pub root: Url,
}

impl ApiModule {
    pub fn new(name: impl Into<String>, version: impl Into<String>, root: Url) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            root,
        }
    }

    /// `{root}/discovery/v1/apis/{name}/{version}/rest`
    pub fn discovery_url(&self) -> Result<Url, Error> {
        let base = self.root.as_str().trim_end_matches('/');
        let full = format!(
            "{base}/discovery/v1/apis/{}/{}/rest",
            self.name, self.version
        );
        Ok(Url::parse(&full)?)
    }
}

impl fmt::Display for ApiModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A module whose discovery document was fetched successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub name: String,
    pub version: String,
    /// Fully qualified method ids, e.g. `housing.housing.rooms`.
    pub methods: BTreeSet<String>,
}

impl LoadedModule {
    /// Build from a discovery document, collecting every `id` found under
    /// `methods`, recursing through nested `resources`.
    pub fn from_discovery(module: &ApiModule, doc: &Value) -> Self {
        let mut methods = BTreeSet::new();
        collect_methods(doc, &mut methods);
        Self {
            name: module.name.clone(),
            version: module.version.clone(),
            methods,
        }
    }

    pub fn has_method(&self, id: &str) -> bool {
        self.methods.contains(id)
    }
}

fn collect_methods(node: &Value, out: &mut BTreeSet<String>) {
    if let Some(methods) = node.get("methods").and_then(Value::as_object) {
        for method in methods.values() {
            if let Some(id) = method.get("id").and_then(Value::as_str) {
                out.insert(id.to_owned());
            }
        }
    }
    if let Some(resources) = node.get("resources").and_then(Value::as_object) {
        for resource in resources.values() {
            collect_methods(resource, out);
        }
    }
}

/// Fetches discovery documents.
pub struct DiscoveryLoader {
    http: reqwest::Client,
}

impl DiscoveryLoader {
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn load(&self, module: &ApiModule) -> Result<LoadedModule, Error> {
        let url = module.discovery_url()?;
        debug!(%module, "GET {url}");

        let resp = self.http.get(url).send().await?;
        let doc: Value = handle_response(resp).await?;
        let loaded = LoadedModule::from_discovery(module, &doc);

        debug!(%module, methods = loaded.methods.len(), "module loaded");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn module() -> ApiModule {
        ApiModule::new(
            "housing",
            "v1",
            Url::parse("https://example.test/_ah/api/").expect("url"),
        )
    }

    #[test]
    fn discovery_url_is_versioned() {
        assert_eq!(
            module().discovery_url().expect("url").as_str(),
            "https://example.test/_ah/api/discovery/v1/apis/housing/v1/rest"
        );
    }

    #[test]
    fn methods_are_collected_from_nested_resources() {
        let doc = json!({
            "methods": { "ping": { "id": "housing.ping" } },
            "resources": {
                "housing": {
                    "methods": {
                        "rooms": { "id": "housing.housing.rooms" },
                        "current": { "id": "housing.housing.current" }
                    },
                    "resources": {
                        "admin": { "methods": { "isOpen": { "id": "housing.housing.admin.isOpen" } } }
                    }
                }
            }
        });
        let loaded = LoadedModule::from_discovery(&module(), &doc);
        assert_eq!(loaded.methods.len(), 4);
        assert!(loaded.has_method("housing.housing.rooms"));
        assert!(loaded.has_method("housing.housing.admin.isOpen"));
        assert!(!loaded.has_method("housing.housing.reserve"));
    }
}
