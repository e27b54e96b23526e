use crate::menu::{menu_items, COMMAND_ADD_HOVERED_LINK, MENU_ADD_LINK, MENU_ADD_PAGE};
use crate::TabId;

/// Payload of a context-menu click as delivered by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuClick {
    pub menu_item_id: String,
    pub page_url: Option<String>,
    pub link_url: Option<String>,
    pub tab_id: Option<TabId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    MenuAddPage,
    MenuAddLink,
    HoverShortcut,
    PopupAddUrl,
}

impl TriggerKind {
    pub fn label(self) -> &'static str {
        match self {
            TriggerKind::MenuAddPage => "menu:add-page",
            TriggerKind::MenuAddLink => "menu:add-link",
            TriggerKind::HoverShortcut => "shortcut:add-hovered-link",
            TriggerKind::PopupAddUrl => "popup:add-url",
        }
    }
}

/// A user action that starts the add-to-queue flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    MenuAddPage { page_url: String, tab_id: Option<TabId> },
    MenuAddLink { link_url: String, tab_id: Option<TabId> },
    HoverShortcut,
    /// Popup "add current" or "add manual"; the popup supplies the URL.
    PopupAddUrl { url: String },
}

impl Trigger {
    /// Unknown menu items, clicks without the expected URL and clicks outside
    /// the item's URL patterns are not triggers.
    pub fn from_menu_click(click: &MenuClick) -> Option<Self> {
        let item = menu_items()
            .into_iter()
            .find(|item| item.id == click.menu_item_id)?;
        let page_url = click.page_url.as_deref().unwrap_or_default();
        if !item.applies_to(page_url, click.link_url.as_deref()) {
            return None;
        }

        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
        };
        match click.menu_item_id.as_str() {
            MENU_ADD_PAGE => non_empty(&click.page_url).map(|page_url| Trigger::MenuAddPage {
                page_url,
                tab_id: click.tab_id,
            }),
            MENU_ADD_LINK => non_empty(&click.link_url).map(|link_url| Trigger::MenuAddLink {
                link_url,
                tab_id: click.tab_id,
            }),
            _ => None,
        }
    }

    pub fn from_command(command: &str) -> Option<Self> {
        (command == COMMAND_ADD_HOVERED_LINK).then_some(Trigger::HoverShortcut)
    }

    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::MenuAddPage { .. } => TriggerKind::MenuAddPage,
            Trigger::MenuAddLink { .. } => TriggerKind::MenuAddLink,
            Trigger::HoverShortcut => TriggerKind::HoverShortcut,
            Trigger::PopupAddUrl { .. } => TriggerKind::PopupAddUrl,
        }
    }
}
