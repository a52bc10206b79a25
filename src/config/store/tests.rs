use super::*;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn no_env() -> impl Fn(&str) -> Option<String> {
    |_: &str| None
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, body).unwrap();
    path
}

fn value_for(i: usize, key: ConfigKey, source: &str) -> Option<String> {
    if i == 1 {
        Some(format!("{}-{}", source, key))
    } else {
        None
    }
}

#[test]
fn precedence_is_user_then_env_then_file_per_property() {
    // Every present/absent combination of the three sources, per property.
    for key in ConfigKey::ALL {
        for mask in 0..8usize {
            let (file_on, env_on, user_on) = (mask & 1, (mask >> 1) & 1, (mask >> 2) & 1);

            let mut store = ConfigStore::new("/nonexistent/config.json");
            let mut file_overlay = ConfigFile::default();
            match key {
                ConfigKey::Endpoint => file_overlay.endpoint = value_for(file_on, key, "file"),
                ConfigKey::ApiToken => file_overlay.api_token = value_for(file_on, key, "file"),
                ConfigKey::Group => {
                    file_overlay.group = value_for(file_on, key, "file").map(GroupRecord::named)
                }
            }
            store.apply_file(file_overlay);

            let env_value = value_for(env_on, key, "env");
            let var = key.env_var();
            store.load_from_env(|name: &str| if name == var { env_value.clone() } else { None });

            if let Some(v) = value_for(user_on, key, "user") {
                store.set(key, v);
            }

            let expected = value_for(user_on, key, "user")
                .or_else(|| value_for(env_on, key, "env"))
                .or_else(|| value_for(file_on, key, "file"));
            assert_eq!(
                store.resolve(key).map(str::to_string),
                expected,
                "key {} mask {:03b}",
                key,
                mask
            );
        }
    }
}

#[test]
fn properties_resolve_from_different_sources_in_one_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"endpoint":"https://a","api-token":"t1","group":{"name":"g1"}}"#,
    );

    let store = ConfigStore::bootstrap(&path, env_from(&[("PLEXUS_GROUP", "g2")]), Overlay::default());

    assert_eq!(store.group_name(), Some("g2"));
    assert_eq!(store.endpoint(), Some("https://a"));
    assert_eq!(store.api_token(), Some("t1"));
}

#[test]
fn empty_env_values_do_not_override_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"endpoint":"https://file"}"#);

    let store = ConfigStore::bootstrap(
        &path,
        env_from(&[("PLEXUS_API_ENDPOINT", "")]),
        Overlay::default(),
    );

    assert_eq!(store.endpoint(), Some("https://file"));
}

#[test]
fn set_only_touches_user_overlay() {
    let mut store = ConfigStore::new("/tmp/unused.json");
    store.load_from_env(env_from(&[("PLEXUS_API_TOKEN", "env-token")]));

    store.set(ConfigKey::ApiToken, "user-token");
    assert_eq!(store.api_token(), Some("user-token"));
    assert_eq!(store.from_env.api_token.as_deref(), Some("env-token"));
    assert!(store.from_file.is_empty());
}

#[test]
fn missing_file_collapses_to_defaults_at_bootstrap() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::bootstrap(dir.path().join("absent.json"), no_env(), Overlay::default());
    assert!(store.endpoint().is_none());
    assert!(store.group_name().is_none());
}

#[test]
fn malformed_file_collapses_to_defaults_at_bootstrap() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "{ not json");
    let store = ConfigStore::bootstrap(&path, no_env(), Overlay::default());
    assert!(store.endpoint().is_none());
}

#[test]
fn loader_distinguishes_missing_from_malformed() {
    let dir = TempDir::new().unwrap();
    let missing = file::load_from_file(&dir.path().join("absent.json"));
    assert!(matches!(missing, Err(LoadError::NotFound(_))));

    let path = write_config(&dir, "[1, 2");
    assert!(matches!(
        file::load_from_file(&path),
        Err(LoadError::Parse { .. })
    ));
}

#[test]
fn save_then_reload_round_trips_user_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let user = Overlay {
        endpoint: Some("https://api.example.test/graphql".to_string()),
        api_token: Some("secret".to_string()),
        group: Some("research".to_string()),
    };
    let store = ConfigStore::bootstrap(&path, no_env(), user);
    store.save().unwrap();

    let reloaded = ConfigStore::bootstrap(&path, no_env(), Overlay::default());
    assert_eq!(reloaded.endpoint(), store.endpoint());
    assert_eq!(reloaded.api_token(), store.api_token());
    assert_eq!(reloaded.group_name(), store.group_name());
}

#[test]
fn save_is_byte_identical_when_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::new(&path);
    store.set(ConfigKey::Endpoint, "https://a");
    store.set(ConfigKey::Group, "g1");
    store.remember_group(GroupRecord {
        display_name: Some("Group One".to_string()),
        id: Some("42".to_string()),
        name: "g1".to_string(),
    });

    store.save().unwrap();
    let first = fs::read(&path).unwrap();
    store.save().unwrap();
    let second = fs::read(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn saved_file_has_sorted_keys_and_two_space_indent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::new(&path);
    store.set(ConfigKey::Endpoint, "https://a");
    store.set(ConfigKey::ApiToken, "t");
    store.set(ConfigKey::Group, "g1");
    store.remember_group(GroupRecord {
        display_name: Some("G".to_string()),
        id: Some("7".to_string()),
        name: "g1".to_string(),
    });
    store.save().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let expected = "{\n  \"api-token\": \"t\",\n  \"endpoint\": \"https://a\",\n  \"group\": {\n    \"displayName\": \"G\",\n    \"id\": \"7\",\n    \"name\": \"g1\"\n  }\n}\n";
    assert_eq!(content, expected);
}

#[test]
fn save_writes_computed_values_not_sources() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"endpoint":"https://file","api-token":"file-token"}"#);

    let store = ConfigStore::bootstrap(
        &path,
        env_from(&[("PLEXUS_API_TOKEN", "env-token")]),
        Overlay::default(),
    );
    store.save().unwrap();

    let saved = file::load_from_file(&path).unwrap();
    assert_eq!(saved.api_token.as_deref(), Some("env-token"));
    assert_eq!(saved.endpoint.as_deref(), Some("https://file"));
}

#[test]
fn file_group_record_only_applies_to_matching_name() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"group":{"name":"g1","id":"11","displayName":"Group 1"}}"#,
    );

    let store = ConfigStore::bootstrap(&path, no_env(), Overlay::default());
    assert_eq!(store.active_group().unwrap().id.as_deref(), Some("11"));

    let overridden =
        ConfigStore::bootstrap(&path, env_from(&[("PLEXUS_GROUP", "g2")]), Overlay::default());
    let current = overridden.current_group().unwrap();
    assert_eq!(current.name, "g2");
    assert!(current.id.is_none());
    assert!(matches!(
        overridden.active_group(),
        Err(PlexusError::MissingGroup { name: Some(ref n) }) if n == "g2"
    ));
}

#[test]
fn setting_group_updates_name_mirror_and_drops_stale_id() {
    let mut store = ConfigStore::new("/tmp/unused.json");
    store.set(ConfigKey::Group, "g1");
    store.remember_group(GroupRecord {
        display_name: Some("Group 1".to_string()),
        id: Some("11".to_string()),
        name: "g1".to_string(),
    });

    store.set(ConfigKey::Group, "g2");
    assert_eq!(store.known_group.as_ref().map(|g| g.name.as_str()), Some("g2"));
    assert!(!store.current_group().unwrap().is_resolved());
}

#[test]
fn resolve_current_group_enriches_record() {
    let mut store = ConfigStore::new("/tmp/unused.json");
    store.set(ConfigKey::Group, "vision");

    let resolver = |name: &str| -> Result<GroupRecord> {
        Ok(GroupRecord {
            display_name: Some("Vision Team".to_string()),
            id: Some("g-9".to_string()),
            name: name.to_string(),
        })
    };

    let record = store.resolve_current_group(&resolver).unwrap();
    assert_eq!(record.id.as_deref(), Some("g-9"));
    assert_eq!(store.active_group().unwrap().display_name.as_deref(), Some("Vision Team"));
}

#[test]
fn failed_group_lookup_leaves_group_name_only() {
    let mut store = ConfigStore::new("/tmp/unused.json");
    store.set(ConfigKey::Group, "ghost");

    let resolver = |name: &str| -> Result<GroupRecord> {
        Err(PlexusError::not_found("Group", name, "name"))
    };

    let err = store.resolve_current_group(&resolver).unwrap_err();
    assert!(matches!(err, PlexusError::MissingGroup { name: Some(ref n) } if n == "ghost"));
    assert_eq!(store.current_group().unwrap(), GroupRecord::named("ghost"));
    assert!(store.active_group().is_err());
}

#[test]
fn no_group_configured_is_missing_group() {
    let store = ConfigStore::new("/tmp/unused.json");
    assert!(matches!(
        store.active_group(),
        Err(PlexusError::MissingGroup { name: None })
    ));
}
