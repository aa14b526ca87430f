//! In-memory region lookup for offline runs and tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::AppError;
use crate::lookup::traits::{LookupError, RegionLookup};
use crate::model::region_list::{CountryId, Region};

const FIXTURE_ENDPOINT: &str = "fixture";

#[derive(Debug, Clone, Default)]
pub struct FixtureRegionLookup {
    regions: HashMap<String, Vec<Region>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl FixtureRegionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `{"<country>": [{"id": .., "name": ..}, ..], ..}`.
    pub async fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = tokio::fs::read_to_string(path).await?;
        let regions: HashMap<String, Vec<Region>> = serde_json::from_str(&text)?;
        info!(
            marker = "REGION_LOOKUP",
            operation_type = "fixture_loaded",
            path = %path.display(),
            countries = regions.len(),
            "Loaded region fixture"
        );
        Ok(Self {
            regions,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_regions(mut self, country: &str, regions: Vec<Region>) -> Self {
        self.regions.insert(country.to_string(), regions);
        self
    }

    /// Lookups for `country` fail with a 500 status.
    #[must_use]
    pub fn with_failure(mut self, country: &str) -> Self {
        self.failing.insert(country.to_string());
        self
    }

    /// Lookups for `country` resolve only after `delay`.
    #[must_use]
    pub fn with_delay(mut self, country: &str, delay: Duration) -> Self {
        self.delays.insert(country.to_string(), delay);
        self
    }
}

#[async_trait]
impl RegionLookup for FixtureRegionLookup {
    async fn regions(&self, country: &CountryId) -> Result<Vec<Region>, LookupError> {
        if let Some(delay) = self.delays.get(country.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(country.as_str()) {
            return Err(LookupError::Status {
                endpoint: FIXTURE_ENDPOINT.to_string(),
                status: 500,
            });
        }

        // Unknown countries answer with an empty list, like the backend.
        Ok(self.regions.get(country.as_str()).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_answers() {
        let lookup = FixtureRegionLookup::new()
            .with_regions("UA", vec![Region::new("1", "North")])
            .with_failure("ZZ");

        let ua = CountryId::parse(Some("UA")).unwrap();
        let zz = CountryId::parse(Some("ZZ")).unwrap();
        let xx = CountryId::parse(Some("XX")).unwrap();

        assert_eq!(lookup.regions(&ua).await.unwrap().len(), 1);
        assert!(lookup.regions(&xx).await.unwrap().is_empty());
        assert!(matches!(
            lookup.regions(&zz).await,
            Err(LookupError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        tokio::fs::write(&path, r#"{"UA": [{"id": 1, "name": "North"}, {"id": 2, "name": "South"}]}"#)
            .await
            .unwrap();

        let lookup = FixtureRegionLookup::from_file(&path).await.unwrap();
        let regions = lookup.regions(&CountryId::parse(Some("UA")).unwrap()).await.unwrap();
        assert_eq!(regions, vec![Region::new("1", "North"), Region::new("2", "South")]);
    }
}
