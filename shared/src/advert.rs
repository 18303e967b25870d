use crate::{Entity, Owned, Viewer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdCategory {
    University,
    LearningPlatform,
    Youtube,
}

impl AdCategory {
    pub const ALL: [AdCategory; 3] = [
        AdCategory::University,
        AdCategory::LearningPlatform,
        AdCategory::Youtube,
    ];

    /// 与后端一致的枚举值（也用作 `<select>` 的 value）
    pub fn as_str(&self) -> &'static str {
        match self {
            AdCategory::University => "UNIVERSITY",
            AdCategory::LearningPlatform => "LEARNING_PLATFORM",
            AdCategory::Youtube => "YOUTUBE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdCategory::University => "University",
            AdCategory::LearningPlatform => "Learning Platform",
            AdCategory::Youtube => "YouTube",
        }
    }
}

impl FromStr for AdCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: AdCategory,
    #[serde(default)]
    pub reference_name: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Entity for Advertisement {
    fn id(&self) -> i64 {
        self.id
    }
}

/// 广告以创建者邮箱标识所有者
impl Owned for Advertisement {
    const ADMIN_MODERATED: bool = true;

    fn is_owned_by(&self, viewer: &Viewer) -> bool {
        self.created_by
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(&viewer.email))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementRequest {
    pub title: String,
    pub description: String,
    pub category: AdCategory,
    pub reference_name: String,
    pub link: String,
}

impl From<&Advertisement> for AdvertisementRequest {
    fn from(ad: &Advertisement) -> Self {
        Self {
            title: ad.title.clone(),
            description: ad.description.clone(),
            category: ad.category,
            reference_name: ad.reference_name.clone(),
            link: ad.link.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn category_wire_format() {
        assert_eq!(
            serde_json::to_string(&AdCategory::LearningPlatform).unwrap(),
            "\"LEARNING_PLATFORM\""
        );
        assert_eq!("youtube".parse::<AdCategory>(), Ok(AdCategory::Youtube));
        assert!("TV".parse::<AdCategory>().is_err());
    }

    #[test]
    fn ownership_by_creator_email() {
        let ad = Advertisement {
            id: 1,
            title: "Learn Rust".into(),
            description: "d".into(),
            category: AdCategory::Youtube,
            reference_name: "ch".into(),
            link: String::new(),
            created_by: Some("Ada@TechNest.dev".into()),
        };
        let me = Viewer {
            id: None,
            email: "ada@technest.dev".into(),
            role: Role::User,
        };
        let other = Viewer {
            email: "bob@technest.dev".into(),
            ..me.clone()
        };
        let admin = Viewer {
            role: Role::Admin,
            ..other.clone()
        };
        assert!(ad.can_modify(&me));
        assert!(!ad.can_modify(&other));
        assert!(ad.can_modify(&admin));
    }
}
