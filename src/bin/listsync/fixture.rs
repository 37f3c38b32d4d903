use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize};

use listsync::{EntityKind, Query, RefreshEvent, SyncConfig, SyncError, Target};

/// A recorded listing plus the events to replay against it.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub kind: EntityKind,
    #[serde(default = "default_account")]
    pub account_id: i64,
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub search: Option<String>,
    /// Overrides the configured page size.
    #[serde(default)]
    pub page_size: Option<u32>,
    items: serde_json::Value,
    #[serde(default)]
    events: Option<Vec<RefreshEvent>>,
}

fn default_account() -> i64 {
    1
}

impl Fixture {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        Self::parse(&contents, yaml)
            .with_context(|| format!("Invalid fixture {}", path.display()))
    }

    pub fn parse(contents: &str, yaml: bool) -> anyhow::Result<Self> {
        // YAML goes through a JSON value so enums keep their `{variant: value}` form.
        let value: serde_json::Value = if yaml {
            serde_yaml::from_str(contents)?
        } else {
            serde_json::from_str(contents)?
        };
        Ok(serde_json::from_value(value)?)
    }

    pub fn query(&self, config: &SyncConfig) -> Result<Query, SyncError> {
        let mut builder = Query::builder(self.kind, self.account_id)
            .page_size(self.page_size.unwrap_or(config.page_size));
        if let Some(target) = &self.target {
            builder = builder.target(target.clone());
        }
        if let Some(search) = &self.search {
            builder = builder.search(search.clone());
        }
        builder.build()
    }

    pub fn items<T: DeserializeOwned>(&self) -> anyhow::Result<Vec<T>> {
        serde_json::from_value(self.items.clone()).context("Fixture items do not match the kind")
    }

    /// The recorded events, or a pull-to-refresh followed by `pages - 1` gap hits.
    pub fn script(&self, pages: usize) -> Vec<RefreshEvent> {
        if let Some(events) = &self.events {
            return events.clone();
        }
        std::iter::once(RefreshEvent::PullToRefresh)
            .chain(std::iter::repeat(RefreshEvent::NearTrailingGap).take(pages.saturating_sub(1)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listsync::entities::{Status, User};

    const YAML: &str = r#"
kind: favorites
target:
  user_id: 42
page_size: 2
items:
  - {id: 3, text: "c", user_id: 42, user_screen_name: bob}
  - {id: 1, text: "a", user_id: 42, user_screen_name: bob}
events:
  - event: pull_to_refresh
  - event: item_removed
    kind: favorites
    target: {user_id: 42}
    id: 3
"#;

    #[test]
    fn yaml_fixture_carries_query_and_script() {
        let fixture = Fixture::parse(YAML, true).expect("fixture");
        let query = fixture.query(&SyncConfig::default()).expect("query");
        assert_eq!(query.target, Some(Target::UserId(42)));
        assert_eq!(query.page_size, 2);

        let items: Vec<Status> = fixture.items().expect("statuses");
        assert_eq!(items.len(), 2);
        assert_eq!(
            fixture.script(5),
            vec![
                RefreshEvent::PullToRefresh,
                RefreshEvent::ItemRemoved {
                    kind: EntityKind::Favorites,
                    target: Some(Target::UserId(42)),
                    id: 3
                },
            ]
        );
    }

    #[test]
    fn json_fixture_defaults_to_paging_script() {
        let fixture = Fixture::parse(
            r#"{"kind": "blocks", "items": [{"id": 5, "screen_name": "e", "name": "E"}]}"#,
            false,
        )
        .expect("fixture");
        let query = fixture.query(&SyncConfig::default()).expect("query");
        assert_eq!(query.page_size, 20);

        let items: Vec<User> = fixture.items().expect("users");
        assert_eq!(items[0].screen_name, "e");
        assert_eq!(
            fixture.script(3),
            vec![
                RefreshEvent::PullToRefresh,
                RefreshEvent::NearTrailingGap,
                RefreshEvent::NearTrailingGap,
            ]
        );
    }

    #[test]
    fn missing_target_is_rejected() {
        let fixture = Fixture::parse(r#"{"kind": "followers", "items": []}"#, false)
            .expect("fixture");
        assert!(matches!(
            fixture.query(&SyncConfig::default()),
            Err(SyncError::InvalidRequest(_))
        ));
    }
}
