use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::FALLBACK_TYPE_LABEL;
use crate::error::UploadError;

/// Kind of record an image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Actor,
    Item,
    Scene,
    JournalEntry,
    RollTable,
    Cards,
    Macro,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Actor,
        EntityKind::Item,
        EntityKind::Scene,
        EntityKind::JournalEntry,
        EntityKind::RollTable,
        EntityKind::Cards,
        EntityKind::Macro,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Actor => "Actor",
            EntityKind::Item => "Item",
            EntityKind::Scene => "Scene",
            EntityKind::JournalEntry => "JournalEntry",
            EntityKind::RollTable => "RollTable",
            EntityKind::Cards => "Cards",
            EntityKind::Macro => "Macro",
        }
    }
}

impl FromStr for EntityKind {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UploadError::invalid_input(format!("Unknown entity kind: {}", s)))
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A known (entity-kind, field) pair with its own base path and type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    ActorPortrait,
    ActorToken,
    Item,
    SceneBackground,
    SceneForeground,
    Journal,
    RollTable,
    Cards,
    Macro,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 9] = [
        AssetSlot::ActorPortrait,
        AssetSlot::ActorToken,
        AssetSlot::Item,
        AssetSlot::SceneBackground,
        AssetSlot::SceneForeground,
        AssetSlot::Journal,
        AssetSlot::RollTable,
        AssetSlot::Cards,
        AssetSlot::Macro,
    ];

    /// Look up the slot for a pair. Field names are matched exactly.
    pub fn lookup(kind: EntityKind, field: &str) -> Option<AssetSlot> {
        match (kind, field) {
            (EntityKind::Actor, "portrait") => Some(AssetSlot::ActorPortrait),
            (EntityKind::Actor, "token") => Some(AssetSlot::ActorToken),
            (EntityKind::Item, "image") => Some(AssetSlot::Item),
            (EntityKind::Scene, "background") => Some(AssetSlot::SceneBackground),
            (EntityKind::Scene, "foreground") => Some(AssetSlot::SceneForeground),
            (EntityKind::JournalEntry, "image") => Some(AssetSlot::Journal),
            (EntityKind::RollTable, "image") => Some(AssetSlot::RollTable),
            (EntityKind::Cards, "image") => Some(AssetSlot::Cards),
            (EntityKind::Macro, "image") => Some(AssetSlot::Macro),
            _ => None,
        }
    }

    /// Slot whose base path unmapped pairs fall back to.
    pub fn fallback() -> AssetSlot {
        AssetSlot::Item
    }

    /// Short label substituted for `{type}` in the naming template.
    pub fn type_label(self) -> &'static str {
        match self {
            AssetSlot::ActorPortrait => "portrait",
            AssetSlot::ActorToken => "token",
            AssetSlot::Item => "item",
            AssetSlot::SceneBackground => "bg",
            AssetSlot::SceneForeground => "fg",
            AssetSlot::Journal => "journal",
            AssetSlot::RollTable => "table",
            AssetSlot::Cards => "card",
            AssetSlot::Macro => "macro",
        }
    }

    pub fn default_path(self) -> &'static str {
        match self {
            AssetSlot::ActorPortrait => "images/actors/portraits",
            AssetSlot::ActorToken => "images/actors/tokens",
            AssetSlot::Item => "images/items",
            AssetSlot::SceneBackground => "images/scenes/backgrounds",
            AssetSlot::SceneForeground => "images/scenes/foregrounds",
            AssetSlot::Journal => "images/journals",
            AssetSlot::RollTable => "images/tables",
            AssetSlot::Cards => "images/cards",
            AssetSlot::Macro => "images/macros",
        }
    }

    /// Environment-variable suffix for the slot's base path override.
    pub fn env_key(self) -> &'static str {
        match self {
            AssetSlot::ActorPortrait => "PATH_ACTOR_PORTRAIT",
            AssetSlot::ActorToken => "PATH_ACTOR_TOKEN",
            AssetSlot::Item => "PATH_ITEM",
            AssetSlot::SceneBackground => "PATH_SCENE_BACKGROUND",
            AssetSlot::SceneForeground => "PATH_SCENE_FOREGROUND",
            AssetSlot::Journal => "PATH_JOURNAL",
            AssetSlot::RollTable => "PATH_ROLL_TABLE",
            AssetSlot::Cards => "PATH_CARDS",
            AssetSlot::Macro => "PATH_MACRO",
        }
    }
}

/// Type label for any pair, falling back to `img` for unmapped pairs.
pub fn type_label_for(kind: EntityKind, field: &str) -> &'static str {
    AssetSlot::lookup(kind, field)
        .map(AssetSlot::type_label)
        .unwrap_or(FALLBACK_TYPE_LABEL)
}
