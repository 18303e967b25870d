//! 帖子与社区问答
//!
//! "帖子"（个人动态，含点赞/分享/媒体）与 "社区帖子"（问答板）结构相近，
//! 但属于后端两个独立的领域，这里保持分开建模。

use crate::{Entity, Owned, Viewer, same_user};
use serde::{Deserialize, Serialize};

// =========================================================
// 个人动态 (Posts)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub id: i64,
    pub content: String,
    #[serde(default, alias = "authorId")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default, alias = "userId")]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub share_count: u64,
    #[serde(default)]
    pub comments: Vec<PostComment>,
}

impl Post {
    /// 头像上显示的首字母
    pub fn initial(&self) -> char {
        self.username
            .as_deref()
            .and_then(|u| u.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

impl Entity for Post {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for PostComment {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Owned for Post {
    const ADMIN_MODERATED: bool = false;

    fn is_owned_by(&self, viewer: &Viewer) -> bool {
        same_user(self.author_id, viewer)
    }
}

impl Owned for PostComment {
    const ADMIN_MODERATED: bool = false;

    fn is_owned_by(&self, viewer: &Viewer) -> bool {
        same_user(self.user_id, viewer)
    }
}

/// 帖子的文本部分；媒体文件由前端以 multipart 附加
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

// =========================================================
// 社区问答 (Community)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityComment {
    pub id: i64,
    pub content: String,
    #[serde(default, alias = "userid", alias = "user_id", alias = "authorId")]
    pub user_id: Option<i64>,
    #[serde(
        default,
        alias = "userEmail",
        alias = "email",
        alias = "authorEmail"
    )]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "authorId")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommunityComment>,
}

impl Entity for CommunityPost {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for CommunityComment {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Owned for CommunityPost {
    const ADMIN_MODERATED: bool = true;

    fn is_owned_by(&self, viewer: &Viewer) -> bool {
        same_user(self.user_id, viewer)
    }
}

impl Owned for CommunityComment {
    const ADMIN_MODERATED: bool = true;

    fn is_owned_by(&self, viewer: &Viewer) -> bool {
        same_user(self.user_id, viewer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityPostRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityCommentRequest {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn viewer(id: Option<i64>, role: Role) -> Viewer {
        Viewer {
            id,
            email: "me@technest.dev".into(),
            role,
        }
    }

    fn post(author_id: Option<i64>) -> Post {
        Post {
            id: 1,
            title: "Hello".into(),
            description: String::new(),
            media_urls: Vec::new(),
            author_id,
            username: Some("ada".into()),
            created_at: None,
            like_count: 0,
            share_count: 0,
            comments: Vec::new(),
        }
    }

    #[test]
    fn posts_are_mutable_only_by_author() {
        let p = post(Some(5));
        assert!(p.can_modify(&viewer(Some(5), Role::User)));
        assert!(!p.can_modify(&viewer(Some(6), Role::User)));
        assert!(!p.can_modify(&viewer(Some(6), Role::Admin)));
    }

    #[test]
    fn unknown_identities_never_match() {
        assert!(!post(None).can_modify(&viewer(None, Role::User)));
        assert!(!post(Some(5)).can_modify(&viewer(None, Role::User)));
    }

    #[test]
    fn admins_moderate_community_content() {
        let c = CommunityComment {
            id: 1,
            content: "hi".into(),
            user_id: Some(2),
            username: None,
            created_at: None,
        };
        assert!(c.can_modify(&viewer(Some(9), Role::Admin)));
        assert!(!c.can_modify(&viewer(Some(9), Role::User)));
        assert!(c.can_modify(&viewer(Some(2), Role::User)));
    }

    #[test]
    fn community_comment_accepts_legacy_keys() {
        let c: CommunityComment =
            serde_json::from_str(r#"{"id":1,"content":"x","user_id":4,"userEmail":"a@b.co"}"#)
                .unwrap();
        assert_eq!(c.user_id, Some(4));
        assert_eq!(c.username.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn post_defaults_missing_counters() {
        let p: Post = serde_json::from_str(r#"{"id":3,"title":"t"}"#).unwrap();
        assert_eq!(p.like_count, 0);
        assert!(p.media_urls.is_empty());
        assert_eq!(p.initial(), '?');
    }
}
