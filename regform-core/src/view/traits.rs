//! DOM-binding capability injected into the form controller.
//!
//! Reads describe the page as the user left it; writes are the only way the
//! controller changes what is shown. Implementations must treat every write
//! as "set to this value" so repeated writes are harmless.

use crate::model::form_state::{FormField, RegistrationTab, RegistrationType};
use crate::model::region_list::SelectOption;

pub trait FormView: Send {
    /// Tab marked active in the page markup.
    fn active_tab(&self) -> RegistrationTab;

    fn fop_checked(&self) -> bool;

    /// Raw country selector value; blank means "none chosen".
    fn country_value(&self) -> Option<String>;

    fn region_value(&self) -> Option<String>;

    /// Replaces every region option.
    fn set_region_options(&mut self, options: &[SelectOption]);

    fn set_region_enabled(&mut self, enabled: bool);

    fn set_region_value(&mut self, value: Option<&str>);

    fn set_tab_active(&mut self, tab: RegistrationTab, active: bool);

    /// Hidden user-type field.
    fn set_user_type(&mut self, registration_type: RegistrationType);

    fn set_fop_block_visible(&mut self, visible: bool);

    fn set_requisites_visible(&mut self, visible: bool);

    fn set_field_required(&mut self, field: FormField, required: bool);

    /// `None` hides the preview image.
    fn set_avatar_preview(&mut self, src: Option<&str>);

    fn set_avatar_placeholder_visible(&mut self, visible: bool);
}
