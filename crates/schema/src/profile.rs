use std::{collections::BTreeMap, sync::Arc};

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumSetType, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
#[enumset(serialize_repr = "list")]
pub enum TextureType {
    Skin,
    Cape,
    Elytra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub url: Arc<str>,
    #[serde(default, deserialize_with = "crate::try_deserialize")]
    pub metadata: BTreeMap<Arc<str>, Arc<str>>,
}

impl Texture {
    pub fn is_slim(&self) -> bool {
        self.metadata.get("model").is_some_and(|model| model.as_ref() == "slim")
    }
}

/// Profile as returned by a Yggdrasil-compatible session server, with textures already decoded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompleteGameProfile {
    pub id: Uuid,
    pub name: Arc<str>,
    #[serde(default, deserialize_with = "crate::try_deserialize")]
    pub properties: BTreeMap<Arc<str>, Arc<str>>,
    #[serde(default, deserialize_with = "crate::try_deserialize")]
    pub textures: BTreeMap<TextureType, Texture>,
}

impl CompleteGameProfile {
    pub const UPLOADABLE_TEXTURES: &'static str = "uploadableTextures";

    /// Textures the authority accepts uploads for, from the comma separated `uploadableTextures`
    /// property. Absent property means nothing is uploadable.
    pub fn uploadable_textures(&self) -> EnumSet<TextureType> {
        let Some(value) = self.properties.get(Self::UPLOADABLE_TEXTURES) else {
            return EnumSet::empty();
        };
        value
            .split(',')
            .filter_map(|name| name.trim().parse::<TextureType>().ok())
            .collect()
    }
}

/// Cape entry of a Minecraft services profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MinecraftCape {
    pub id: Arc<str>,
    #[serde(default)]
    pub state: Arc<str>,
    #[serde(default)]
    pub url: Arc<str>,
    pub alias: Arc<str>,
}

impl MinecraftCape {
    pub fn is_active(&self) -> bool {
        self.state.as_ref() == "ACTIVE"
    }
}
