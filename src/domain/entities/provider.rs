//! Third-party texture providers, in priority order.

use uuid::Uuid;

/// Form of player identity a provider expects in its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Player name.
    Username,
    /// Hyphenated UUID.
    UuidDashed,
    /// UUID without hyphens.
    UuidCompact,
}

impl KeyKind {
    /// Renders the player identity in this form.
    #[must_use]
    pub fn key_for(self, uuid: Uuid, username: &str) -> String {
        match self {
            Self::Username => username.to_string(),
            Self::UuidDashed => uuid.hyphenated().to_string(),
            Self::UuidCompact => uuid.simple().to_string(),
        }
    }
}

/// How a provider encodes the texture in its response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// The body is the image itself.
    #[default]
    Image,
    /// The body is a JSON object whose `d` field holds a base64 image.
    Base64Json,
}

/// URL template and key form of one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Template with a single `{}` slot.
    pub url_template: &'static str,
    /// Key form substituted into the slot.
    pub key_kind: KeyKind,
    /// Response body encoding.
    pub format: ResponseFormat,
}

impl ProviderDescriptor {
    /// Builds the request URL for a player.
    #[must_use]
    pub fn url_for(&self, uuid: Uuid, username: &str) -> String {
        self.url_template
            .replacen("{}", &self.key_kind.key_for(uuid, username), 1)
    }
}

/// Cape sources. `Minecraft` is the official source and takes direct URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapeProvider {
    Minecraft,
    Optifine,
    LabyMod,
    FiveZig,
    MinecraftCapes,
}

impl CapeProvider {
    /// Third-party providers, highest priority first.
    pub const THIRD_PARTY: [Self; 4] = [
        Self::Optifine,
        Self::LabyMod,
        Self::FiveZig,
        Self::MinecraftCapes,
    ];

    /// Returns the URL template of a third-party provider.
    #[must_use]
    pub const fn descriptor(self) -> Option<ProviderDescriptor> {
        let (url_template, key_kind, format) = match self {
            Self::Minecraft => return None,
            Self::Optifine => (
                "https://optifine.net/capes/{}.png",
                KeyKind::Username,
                ResponseFormat::Image,
            ),
            Self::LabyMod => (
                "https://dl.labymod.net/capes/{}",
                KeyKind::UuidDashed,
                ResponseFormat::Image,
            ),
            Self::FiveZig => (
                "https://textures.5zigreborn.eu/profile/{}",
                KeyKind::UuidDashed,
                ResponseFormat::Base64Json,
            ),
            Self::MinecraftCapes => (
                "https://minecraftcapes.net/profile/{}/cape",
                KeyKind::UuidCompact,
                ResponseFormat::Image,
            ),
        };
        Some(ProviderDescriptor {
            url_template,
            key_kind,
            format,
        })
    }

    /// Builds the cape URL for a player, or `None` for the official source.
    #[must_use]
    pub fn url_for(self, uuid: Uuid, username: &str) -> Option<String> {
        self.descriptor().map(|d| d.url_for(uuid, username))
    }

    /// Response encoding used by this provider.
    #[must_use]
    pub fn format(self) -> ResponseFormat {
        self.descriptor().map_or(ResponseFormat::Image, |d| d.format)
    }
}

impl std::fmt::Display for CapeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minecraft => write!(f, "minecraft"),
            Self::Optifine => write!(f, "optifine"),
            Self::LabyMod => write!(f, "labymod"),
            Self::FiveZig => write!(f, "5zig"),
            Self::MinecraftCapes => write!(f, "minecraftcapes"),
        }
    }
}

/// Ears texture sources, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EarsProvider {
    MinecraftCapes,
}

impl EarsProvider {
    /// All providers in priority order.
    pub const ALL: [Self; 1] = [Self::MinecraftCapes];

    #[must_use]
    pub const fn descriptor(self) -> ProviderDescriptor {
        match self {
            Self::MinecraftCapes => ProviderDescriptor {
                url_template: "https://minecraftcapes.net/profile/{}/ears",
                key_kind: KeyKind::UuidCompact,
                format: ResponseFormat::Image,
            },
        }
    }

    #[must_use]
    pub fn url_for(self, uuid: Uuid, username: &str) -> String {
        self.descriptor().url_for(uuid, username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const NOTCH: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";

    #[test_case(CapeProvider::Optifine, "https://optifine.net/capes/Notch.png" ; "optifine_username")]
    #[test_case(CapeProvider::LabyMod, "https://dl.labymod.net/capes/069a79f4-44e9-4726-a5be-fca90e38aaf5" ; "labymod_dashed")]
    #[test_case(CapeProvider::FiveZig, "https://textures.5zigreborn.eu/profile/069a79f4-44e9-4726-a5be-fca90e38aaf5" ; "fivezig_dashed")]
    #[test_case(CapeProvider::MinecraftCapes, "https://minecraftcapes.net/profile/069a79f4444e4726a5befca90e38aaf5/cape" ; "minecraftcapes_compact")]
    fn test_cape_urls(provider: CapeProvider, expected: &str) {
        let uuid = Uuid::parse_str(NOTCH).unwrap();
        assert_eq!(provider.url_for(uuid, "Notch").as_deref(), Some(expected));
    }

    #[test]
    fn test_official_has_no_template() {
        assert!(CapeProvider::Minecraft.url_for(Uuid::nil(), "x").is_none());
        assert!(!CapeProvider::THIRD_PARTY.contains(&CapeProvider::Minecraft));
    }

    #[test]
    fn test_ears_url() {
        let uuid = Uuid::parse_str(NOTCH).unwrap();
        assert_eq!(
            EarsProvider::MinecraftCapes.url_for(uuid, "Notch"),
            "https://minecraftcapes.net/profile/069a79f4444e4726a5befca90e38aaf5/ears"
        );
    }

    #[test]
    fn test_only_fivezig_wraps_json() {
        for provider in CapeProvider::THIRD_PARTY {
            let expected = if provider == CapeProvider::FiveZig {
                ResponseFormat::Base64Json
            } else {
                ResponseFormat::Image
            };
            assert_eq!(provider.format(), expected);
        }
    }
}
