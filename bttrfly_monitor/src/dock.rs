use serde::Serialize;

pub const NOTE_APP: &str = "Bttrfly";
pub const PROFILE_APP: &str = "Profile";

/// Apps pinned to the dock, left to right.
pub const DOCK_APPS: [&str; 3] = [NOTE_APP, "Updates here", "$0. On the house"];

/// What a dock click asks the monitor to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DockAction {
    /// Open the note window, or raise it when already open.
    ShowNoteWindow,
    /// Hand the URL to the host; the monitor only logs it.
    OpenLink { url: String },
    Ignore,
}

impl DockAction {
    pub fn for_app(name: &str) -> Self {
        match name {
            NOTE_APP => DockAction::ShowNoteWindow,
            "Updates here" => DockAction::OpenLink {
                url: "https://bttrflynote.substack.com/".to_string(),
            },
            PROFILE_APP => DockAction::OpenLink {
                url: "https://x.com/imwilliamjung".to_string(),
            },
            _ => DockAction::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_note_app_opens_a_window() {
        assert_eq!(DockAction::for_app(NOTE_APP), DockAction::ShowNoteWindow);
        assert!(matches!(
            DockAction::for_app("Updates here"),
            DockAction::OpenLink { .. }
        ));
        assert_eq!(DockAction::for_app(DOCK_APPS[2]), DockAction::Ignore);
        assert_eq!(DockAction::for_app("bttrfly"), DockAction::Ignore);
    }
}
