//! Registration type derivation.
//!
//! The registration type is never stored on its own: it is computed from the
//! active tab and the FOP checkbox. The legal tab always wins over the
//! checkbox.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationTab {
    #[default]
    Legal,
    Individual,
}

impl RegistrationTab {
    pub const ALL: [Self; 2] = [Self::Legal, Self::Individual];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legal => "legal",
            Self::Individual => "individual",
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Legal => Self::Individual,
            Self::Individual => Self::Legal,
        }
    }
}

/// Value submitted in the hidden user-type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    Legal,
    Fop,
    Physical,
}

impl RegistrationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legal => "legal",
            Self::Fop => "fop",
            Self::Physical => "physical",
        }
    }
}

/// Fields inside the requisites block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    CompanyName,
    Okpo,
}

impl FormField {
    pub const REQUISITES: [Self; 2] = [Self::CompanyName, Self::Okpo];
}

/// Everything the view needs to know about the current registration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRequirements {
    pub registration_type: RegistrationType,
    pub requisites_visible: bool,
    pub company_required: bool,
    pub okpo_required: bool,
    pub fop_block_visible: bool,
}

impl FieldRequirements {
    pub const fn is_required(&self, field: FormField) -> bool {
        match field {
            FormField::CompanyName => self.company_required,
            FormField::Okpo => self.okpo_required,
        }
    }
}

/// User-controlled inputs of the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormState {
    pub active_tab: RegistrationTab,
    pub fop_checked: bool,
}

impl FormState {
    pub const fn new(active_tab: RegistrationTab, fop_checked: bool) -> Self {
        Self {
            active_tab,
            fop_checked,
        }
    }

    pub const fn registration_type(&self) -> RegistrationType {
        match (self.active_tab, self.fop_checked) {
            (RegistrationTab::Legal, _) => RegistrationType::Legal,
            (RegistrationTab::Individual, true) => RegistrationType::Fop,
            (RegistrationTab::Individual, false) => RegistrationType::Physical,
        }
    }

    pub const fn requirements(&self) -> FieldRequirements {
        let registration_type = self.registration_type();
        let legal = matches!(registration_type, RegistrationType::Legal);
        FieldRequirements {
            registration_type,
            requisites_visible: legal,
            company_required: legal,
            okpo_required: legal,
            fop_block_visible: !legal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_table() {
        let rows = [
            (RegistrationTab::Legal, false, RegistrationType::Legal, true),
            (RegistrationTab::Legal, true, RegistrationType::Legal, true),
            (RegistrationTab::Individual, true, RegistrationType::Fop, false),
            (RegistrationTab::Individual, false, RegistrationType::Physical, false),
        ];

        for (tab, fop, expected, legal) in rows {
            let req = FormState::new(tab, fop).requirements();
            assert_eq!(req.registration_type, expected, "{tab:?}/{fop}");
            assert_eq!(req.requisites_visible, legal);
            assert_eq!(req.company_required, legal);
            assert_eq!(req.okpo_required, legal);
            assert_eq!(req.fop_block_visible, !legal);
        }
    }

    #[test]
    fn test_tab_other() {
        assert_eq!(RegistrationTab::Legal.other(), RegistrationTab::Individual);
        assert_eq!(RegistrationTab::Individual.other(), RegistrationTab::Legal);
    }

    #[test]
    fn test_tab_parses_from_config_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            tab: RegistrationTab,
        }
        let parsed: Wrapper = toml::from_str("tab = \"individual\"").unwrap();
        assert_eq!(parsed.tab, RegistrationTab::Individual);
    }
}
