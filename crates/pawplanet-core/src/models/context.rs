use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SLUG_LENGTH;
use crate::error::{MediaError, MediaResult};

/// Marker shared by every slug-keyed context name.
const SLUG_KEYED_PREFIX: &str = "ENCYCLOPEDIA_";

/// Semantic category of an uploaded asset.
///
/// Owner-keyed contexts identify the asset by the integer id of the entity it
/// belongs to (user, pet, post). Encyclopedia contexts identify it by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadContext {
    UserAvatar,
    PetAvatar,
    PetGallery,
    PostMedia,
    EncyclopediaClass,
    EncyclopediaSpecies,
    EncyclopediaBreed,
}

/// Which identifying field a context requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    OwnerId,
    Slug,
}

impl UploadContext {
    pub fn all() -> &'static [UploadContext] {
        &[
            UploadContext::UserAvatar,
            UploadContext::PetAvatar,
            UploadContext::PetGallery,
            UploadContext::PostMedia,
            UploadContext::EncyclopediaClass,
            UploadContext::EncyclopediaSpecies,
            UploadContext::EncyclopediaBreed,
        ]
    }

    /// Wire name, as sent to the signing endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadContext::UserAvatar => "USER_AVATAR",
            UploadContext::PetAvatar => "PET_AVATAR",
            UploadContext::PetGallery => "PET_GALLERY",
            UploadContext::PostMedia => "POST_MEDIA",
            UploadContext::EncyclopediaClass => "ENCYCLOPEDIA_CLASS",
            UploadContext::EncyclopediaSpecies => "ENCYCLOPEDIA_SPECIES",
            UploadContext::EncyclopediaBreed => "ENCYCLOPEDIA_BREED",
        }
    }

    pub fn is_slug_keyed(&self) -> bool {
        self.as_str().starts_with(SLUG_KEYED_PREFIX)
    }

    pub fn key_kind(&self) -> ContextKey {
        if self.is_slug_keyed() {
            ContextKey::Slug
        } else {
            ContextKey::OwnerId
        }
    }

    /// Profile pictures of users and pets.
    pub fn is_avatar(&self) -> bool {
        matches!(self, UploadContext::UserAvatar | UploadContext::PetAvatar)
    }
}

impl FromStr for UploadContext {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        UploadContext::all()
            .iter()
            .copied()
            .find(|context| context.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Invalid upload context: {}", s))
    }
}

impl Display for UploadContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Display for ContextKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContextKey::OwnerId => write!(f, "ownerId"),
            ContextKey::Slug => write!(f, "slug"),
        }
    }
}

/// The caller's "owner id or slug" argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTarget {
    Owner(i64),
    Slug(String),
}

impl From<i64> for MediaTarget {
    fn from(owner_id: i64) -> Self {
        MediaTarget::Owner(owner_id)
    }
}

impl From<&str> for MediaTarget {
    fn from(slug: &str) -> Self {
        MediaTarget::Slug(slug.to_string())
    }
}

impl From<String> for MediaTarget {
    fn from(slug: String) -> Self {
        MediaTarget::Slug(slug)
    }
}

impl Display for MediaTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaTarget::Owner(id) => write!(f, "owner {}", id),
            MediaTarget::Slug(slug) => write!(f, "slug '{}'", slug),
        }
    }
}

/// Request body for the signing endpoint.
///
/// Exactly one of `owner_id` and `slug` is set, chosen by the context family.
/// The only way to build one is [`SignRequest::new`], which enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    context: UploadContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
}

impl SignRequest {
    pub fn new(context: UploadContext, target: impl Into<MediaTarget>) -> MediaResult<Self> {
        match (context.key_kind(), target.into()) {
            (ContextKey::OwnerId, MediaTarget::Owner(owner_id)) => {
                if owner_id <= 0 {
                    return Err(MediaError::Routing(format!(
                        "{} requires a positive owner id, got {}",
                        context, owner_id
                    )));
                }
                Ok(Self {
                    context,
                    owner_id: Some(owner_id),
                    slug: None,
                })
            }
            (ContextKey::Slug, MediaTarget::Slug(slug)) => {
                validate_slug(&slug)?;
                Ok(Self {
                    context,
                    owner_id: None,
                    slug: Some(slug),
                })
            }
            (expected, target) => Err(MediaError::Routing(format!(
                "{} is identified by {}, got {}",
                context, expected, target
            ))),
        }
    }

    pub fn context(&self) -> UploadContext {
        self.context
    }

    pub fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }
}

fn validate_slug(slug: &str) -> MediaResult<()> {
    if slug.is_empty() {
        return Err(MediaError::Routing("slug must not be empty".to_string()));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(MediaError::Routing(format!(
            "slug must be at most {} characters",
            MAX_SLUG_LENGTH
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(MediaError::Routing(format!(
            "slug '{}' may only contain lowercase letters, digits, '-' and '_'",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_keyed_contexts_are_exactly_encyclopedia() {
        let slug_keyed: Vec<_> = UploadContext::all()
            .iter()
            .filter(|c| c.is_slug_keyed())
            .copied()
            .collect();
        assert_eq!(
            slug_keyed,
            vec![
                UploadContext::EncyclopediaClass,
                UploadContext::EncyclopediaSpecies,
                UploadContext::EncyclopediaBreed,
            ]
        );
    }

    #[test]
    fn test_only_user_and_pet_avatars_are_avatars() {
        let avatars: Vec<_> = UploadContext::all()
            .iter()
            .filter(|c| c.is_avatar())
            .copied()
            .collect();
        assert_eq!(avatars, vec![UploadContext::UserAvatar, UploadContext::PetAvatar]);
    }

    #[test]
    fn test_every_context_populates_exactly_one_field() {
        for context in UploadContext::all() {
            let request = match context.key_kind() {
                ContextKey::OwnerId => SignRequest::new(*context, 7_i64).unwrap(),
                ContextKey::Slug => SignRequest::new(*context, "mammalia").unwrap(),
            };
            assert!(request.owner_id().is_some() ^ request.slug().is_some());
            assert_eq!(request.owner_id().is_some(), !context.is_slug_keyed());
        }
    }

    #[test]
    fn test_owner_keyed_request_serializes_without_slug() {
        let request = SignRequest::new(UploadContext::UserAvatar, 42_i64).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "context": "USER_AVATAR", "ownerId": 42 })
        );
    }

    #[test]
    fn test_slug_keyed_request_serializes_without_owner() {
        let request = SignRequest::new(UploadContext::EncyclopediaBreed, "golden-retriever").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "context": "ENCYCLOPEDIA_BREED", "slug": "golden-retriever" })
        );
    }

    #[test]
    fn test_mismatched_target_is_a_routing_error() {
        let err = SignRequest::new(UploadContext::PetAvatar, "rex").unwrap_err();
        assert!(matches!(err, MediaError::Routing(_)));

        let err = SignRequest::new(UploadContext::EncyclopediaSpecies, 12_i64).unwrap_err();
        assert!(matches!(err, MediaError::Routing(_)));
        assert!(err.to_string().contains("slug"));
    }

    #[test]
    fn test_invalid_owner_and_slug_values() {
        assert!(SignRequest::new(UploadContext::PostMedia, 0_i64).is_err());
        assert!(SignRequest::new(UploadContext::EncyclopediaClass, "").is_err());
        assert!(SignRequest::new(UploadContext::EncyclopediaClass, "Canis Lupus").is_err());
        assert!(SignRequest::new(UploadContext::EncyclopediaClass, "a".repeat(129)).is_err());
    }

    #[test]
    fn test_context_from_str() {
        assert_eq!(
            "USER_AVATAR".parse::<UploadContext>().unwrap(),
            UploadContext::UserAvatar
        );
        assert_eq!(
            "encyclopedia-breed".parse::<UploadContext>().unwrap(),
            UploadContext::EncyclopediaBreed
        );
        assert!("BANNER".parse::<UploadContext>().is_err());
    }

    #[test]
    fn test_context_wire_names_match_serde() {
        for context in UploadContext::all() {
            let json = serde_json::to_value(context).unwrap();
            assert_eq!(json, serde_json::Value::String(context.as_str().to_string()));
        }
    }
}
