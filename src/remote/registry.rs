use std::collections::HashMap;
use std::sync::Arc;

use super::CollectionSource;
use super::demo::DemoSource;
use super::http::ScriptEndpoint;
use crate::config::Config;
use crate::error::AppResult;

pub const DEMO_SOURCE: &str = "demo";

/// Build the map of configured endpoints, keyed by endpoint name, plus the
/// built-in demo source.
pub fn build_source_registry(
    config: &Config,
) -> AppResult<HashMap<String, Arc<dyn CollectionSource>>> {
    let mut map: HashMap<String, Arc<dyn CollectionSource>> = HashMap::new();

    for (name, url) in &config.endpoints {
        let endpoint = ScriptEndpoint::new(name, url, config.relay_url.as_deref())?;
        map.insert(name.clone(), Arc::new(endpoint));
    }

    map.insert(DEMO_SOURCE.to_string(), Arc::new(DemoSource));

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_source_registry() {
        let mut config = Config::default();
        config
            .endpoints
            .insert("blog".into(), "https://example.com/blog/exec".into());

        let reg = build_source_registry(&config).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg["blog"].id(), "blog");
        assert!(!reg["blog"].is_demo());
        assert!(reg[DEMO_SOURCE].is_demo());
    }
}
