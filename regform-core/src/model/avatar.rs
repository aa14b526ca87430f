//! Avatar preview state.

use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AvatarPreview {
    /// Nothing chosen yet; the placeholder graphic is shown.
    #[default]
    Placeholder,

    /// A file is being read.
    Loading { path: PathBuf },

    /// Preview image source as a `data:` URL.
    Ready { path: PathBuf, data_url: String },

    /// The chosen file could not be previewed; falls back to the placeholder.
    ReadError { path: PathBuf, reason: String },
}

impl AvatarPreview {
    /// Source for the preview `<img>`, if it should be visible.
    pub fn image_src(&self) -> Option<&str> {
        match self {
            Self::Ready { data_url, .. } => Some(data_url),
            _ => None,
        }
    }

    pub fn placeholder_visible(&self) -> bool {
        self.image_src().is_none()
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Placeholder => None,
            Self::Loading { path } | Self::Ready { path, .. } | Self::ReadError { path, .. } => {
                Some(path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ready_hides_placeholder() {
        let path = PathBuf::from("me.png");
        assert!(AvatarPreview::Placeholder.placeholder_visible());
        assert!(AvatarPreview::Loading { path: path.clone() }.placeholder_visible());
        assert!(
            AvatarPreview::ReadError {
                path: path.clone(),
                reason: "denied".into()
            }
            .placeholder_visible()
        );

        let ready = AvatarPreview::Ready {
            path,
            data_url: "data:image/png;base64,AA==".into(),
        };
        assert!(!ready.placeholder_visible());
        assert_eq!(ready.image_src(), Some("data:image/png;base64,AA=="));
    }
}
