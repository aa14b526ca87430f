//! src/model/region_list.rs
//! ============================================================================
//! # Region List: cascading country -> region selection state
//!
//! The region list is replaced wholesale on every country change and is
//! always in exactly one of five states. The state alone decides which
//! option entries get rendered and whether the selector is enabled.

use std::fmt;

use compact_str::{CompactString, ToCompactString};
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;

use crate::config::RegionLabels;
use crate::lookup::LookupError;

/// Opaque country identifier as submitted by the country selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(CompactString);

impl CountryId {
    /// Returns `None` for an absent or blank selector value.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(CompactString::new(raw)))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One region as returned by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: CompactString,
    pub name: CompactString,
}

impl Region {
    pub fn new(id: impl Into<CompactString>, name: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Backends serialize primary keys as numbers; fixtures may use strings.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<CompactString, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Uint(u64),
        Text(CompactString),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_compact_string(),
        RawId::Uint(n) => n.to_compact_string(),
        RawId::Text(s) => s,
    })
}

/// A single `<option>`; placeholders carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: CompactString,
    pub label: CompactString,
}

impl SelectOption {
    pub fn placeholder(label: impl Into<CompactString>) -> Self {
        Self {
            value: CompactString::default(),
            label: label.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<&Region> for SelectOption {
    fn from(region: &Region) -> Self {
        Self {
            value: region.id.clone(),
            label: region.name.clone(),
        }
    }
}

/// Rendered option entries; most countries fit inline.
pub type OptionList = SmallVec<[SelectOption; 8]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionListState {
    /// No country chosen.
    #[default]
    Unselected,

    /// Lookup issued for this country, not yet answered.
    Loading { country: CountryId },

    /// Non-empty list, in the order received.
    Populated {
        country: CountryId,
        regions: Vec<Region>,
    },

    /// Lookup succeeded with no regions.
    Empty { country: CountryId },

    /// Lookup failed.
    Error {
        country: CountryId,
        error: LookupError,
    },
}

impl RegionListState {
    /// Build the terminal state for a completed lookup.
    pub fn from_lookup(country: CountryId, result: Result<Vec<Region>, LookupError>) -> Self {
        match result {
            Ok(regions) if regions.is_empty() => Self::Empty { country },
            Ok(regions) => Self::Populated { country, regions },
            Err(error) => Self::Error { country, error },
        }
    }

    /// Only a populated list may be interacted with.
    pub fn selector_enabled(&self) -> bool {
        matches!(self, Self::Populated { .. })
    }

    /// `Loading` is the only transient state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading { .. })
    }

    pub fn country(&self) -> Option<&CountryId> {
        match self {
            Self::Unselected => None,
            Self::Loading { country }
            | Self::Populated { country, .. }
            | Self::Empty { country }
            | Self::Error { country, .. } => Some(country),
        }
    }

    pub fn regions(&self) -> &[Region] {
        match self {
            Self::Populated { regions, .. } => regions,
            _ => &[],
        }
    }

    pub fn contains(&self, region_id: &str) -> bool {
        self.regions().iter().any(|r| r.id == region_id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unselected => "unselected",
            Self::Loading { .. } => "loading",
            Self::Populated { .. } => "populated",
            Self::Empty { .. } => "empty",
            Self::Error { .. } => "error",
        }
    }

    /// Option entries the region selector should show for this state.
    pub fn options(&self, labels: &RegionLabels) -> OptionList {
        let mut out = OptionList::new();
        match self {
            Self::Unselected => out.push(SelectOption::placeholder(labels.choose_country_first.as_str())),
            Self::Loading { .. } => out.push(SelectOption::placeholder(labels.loading.as_str())),
            Self::Empty { .. } => out.push(SelectOption::placeholder(labels.no_regions.as_str())),
            Self::Error { .. } => out.push(SelectOption::placeholder(labels.load_failed.as_str())),
            Self::Populated { regions, .. } => {
                out.reserve(regions.len() + 1);
                out.push(SelectOption::placeholder(labels.choose_region.as_str()));
                out.extend(regions.iter().map(SelectOption::from));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ua() -> CountryId {
        CountryId::parse(Some("UA")).unwrap()
    }

    #[test]
    fn test_blank_country_is_none() {
        assert!(CountryId::parse(None).is_none());
        assert!(CountryId::parse(Some("")).is_none());
        assert!(CountryId::parse(Some("   ")).is_none());
        assert_eq!(CountryId::parse(Some(" 42 ")).unwrap().as_str(), "42");
    }

    #[test]
    fn test_region_ids_accept_numbers_and_strings() {
        let regions: Vec<Region> =
            serde_json::from_str(r#"[{"id": 1, "name": "North"}, {"id": "s-2", "name": "South"}]"#)
                .unwrap();
        assert_eq!(regions[0].id, "1");
        assert_eq!(regions[1].id, "s-2");
    }

    #[test]
    fn test_populated_options_start_with_placeholder() {
        let labels = RegionLabels::default();
        let state = RegionListState::from_lookup(
            ua(),
            Ok(vec![Region::new("1", "North"), Region::new("2", "South")]),
        );

        let options = state.options(&labels);
        let rendered: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(rendered, [labels.choose_region.as_str(), "North", "South"]);
        assert!(options[0].is_placeholder());
        assert!(state.selector_enabled());
    }

    #[test]
    fn test_non_populated_states_render_single_disabled_placeholder() {
        let labels = RegionLabels::default();
        let states = [
            RegionListState::Unselected,
            RegionListState::Loading { country: ua() },
            RegionListState::from_lookup(ua(), Ok(Vec::new())),
            RegionListState::from_lookup(
                ua(),
                Err(LookupError::Status {
                    endpoint: "/users/api/regions".into(),
                    status: 500,
                }),
            ),
        ];

        for state in &states {
            let options = state.options(&labels);
            assert_eq!(options.len(), 1, "{}", state.name());
            assert!(options[0].is_placeholder());
            assert!(!state.selector_enabled());
        }
        assert_eq!(states[2].name(), "empty");
        assert_eq!(states[3].name(), "error");
    }
}
