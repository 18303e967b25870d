//! 后端接口协议
//!
//! 每个接口对应一个实现了 [`ApiRequest`] 的请求类型，集中声明
//! 方法、路径、查询参数、请求体与响应类型。前端只需一个泛型发送函数。
//!
//! 帖子的创建与更新使用 multipart 表单上传媒体文件，不走此 trait，
//! 路径由 [`posts_path`] / [`post_path`] 提供。

use crate::advert::{Advertisement, AdvertisementRequest};
use crate::profile::{AdminUserSummary, ProfileUpdate, RegistrationRecord, UserProfile};
use crate::quiz::{AnswerRequest, AnswerResult, Mcq, McqRequest, Tutorial, TutorialProgress, TutorialRequest};
use crate::social::{
    CommentRequest, CommunityComment, CommunityCommentRequest, CommunityPost,
    CommunityPostRequest, Post, PostComment,
};
use crate::{
    ListScope, LoginRequest, LoginResponse, OAuthLoginRequest, OAuthLoginResponse, PageOrList,
    PageRequest, PasswordResetConfirmRequest, PasswordResetRequest, RegisterAdminRequest,
    RegisterUserRequest, Role,
};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 空 JSON 对象 `{}`，用于只需要触发动作的 POST
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmptyBody {}

/// 点赞、分享请求体 `{"postId": ..}`
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRef {
    pub post_id: i64,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// 请求体类型，无请求体时为 `()`
    type Body: Serialize;
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// 响应体为空或为纯文本提示时置为 `false`，客户端不解析响应体。
    /// 此时 `Response` 必须能从 JSON `null` 反序列化（通常为 `()`）。
    const DECODE_RESPONSE: bool = true;

    /// The URL path, starting with `/api`.
    fn path(&self) -> String;

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<&Self::Body> {
        None
    }
}

fn page_query(page: &PageRequest) -> Vec<(&'static str, String)> {
    vec![("page", page.page.to_string()), ("size", page.size.to_string())]
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for LoginRequest {
    type Body = Self;
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/auth/login".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

impl ApiRequest for OAuthLoginRequest {
    type Body = Self;
    type Response = OAuthLoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/auth/oauth/google".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

impl ApiRequest for RegisterUserRequest {
    type Body = Self;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        "/api/auth/register/user".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

impl ApiRequest for RegisterAdminRequest {
    type Body = Self;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        "/api/auth/register/admin".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

impl ApiRequest for PasswordResetRequest {
    type Body = Self;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        "/api/auth/password/reset".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

impl ApiRequest for PasswordResetConfirmRequest {
    type Body = Self;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        "/api/auth/password/reset/confirm".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

/// 管理员：注册活动
#[derive(Debug, Clone, Copy)]
pub struct ListRegistrationActivity;

impl ApiRequest for ListRegistrationActivity {
    type Body = ();
    type Response = Vec<RegistrationRecord>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/auth/admin/registration-activity".into()
    }
}

/// 管理员：所有用户
#[derive(Debug, Clone, Copy)]
pub struct ListUsers;

impl ApiRequest for ListUsers {
    type Body = ();
    type Response = Vec<AdminUserSummary>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/auth/admin/users".into()
    }
}

// =========================================================
// Quizzes
// =========================================================

fn quiz_root(role: Role) -> &'static str {
    match role {
        Role::User => "/api/user/quizzes",
        Role::Admin => "/api/admin/quizzes",
    }
}

/// 教程列表，管理员与普通用户使用不同的接口
#[derive(Debug, Clone, Copy)]
pub struct ListTutorials {
    pub role: Role,
}

impl ApiRequest for ListTutorials {
    type Body = ();
    type Response = Vec<Tutorial>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/tutorials", quiz_root(self.role))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetTutorial {
    pub role: Role,
    pub id: i64,
}

impl ApiRequest for GetTutorial {
    type Body = ();
    type Response = Tutorial;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/tutorials/{}", quiz_root(self.role), self.id)
    }
}

impl ApiRequest for TutorialRequest {
    type Body = Self;
    type Response = Tutorial;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/admin/quizzes/tutorials".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateTutorial {
    pub id: i64,
    pub body: TutorialRequest,
}

impl ApiRequest for UpdateTutorial {
    type Body = TutorialRequest;
    type Response = Tutorial;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/admin/quizzes/tutorials/{}", self.id)
    }

    fn body(&self) -> Option<&TutorialRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteTutorial {
    pub id: i64,
}

impl ApiRequest for DeleteTutorial {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/admin/quizzes/tutorials/{}", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct CreateMcq {
    pub tutorial_id: i64,
    pub body: McqRequest,
}

impl ApiRequest for CreateMcq {
    type Body = McqRequest;
    type Response = Mcq;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/api/admin/quizzes/tutorials/{}/mcqs", self.tutorial_id)
    }

    fn body(&self) -> Option<&McqRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateMcq {
    pub id: i64,
    pub body: McqRequest,
}

impl ApiRequest for UpdateMcq {
    type Body = McqRequest;
    type Response = Mcq;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/admin/quizzes/mcqs/{}", self.id)
    }

    fn body(&self) -> Option<&McqRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteMcq {
    pub tutorial_id: i64,
    pub id: i64,
}

impl ApiRequest for DeleteMcq {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!(
            "/api/admin/quizzes/tutorials/{}/mcqs/{}",
            self.tutorial_id, self.id
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnrollTutorial {
    pub id: i64,
}

impl ApiRequest for EnrollTutorial {
    type Body = EmptyBody;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/user/quizzes/tutorials/{}/enroll", self.id)
    }

    fn body(&self) -> Option<&EmptyBody> {
        Some(&EmptyBody {})
    }
}

/// 当前用户的选课与进度
#[derive(Debug, Clone, Copy)]
pub struct ListProgress;

impl ApiRequest for ListProgress {
    type Body = ();
    type Response = Vec<TutorialProgress>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/user/quizzes/dashboard".into()
    }
}

impl ApiRequest for AnswerRequest {
    type Body = Self;
    type Response = Option<AnswerResult>;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/api/user/quizzes/mcqs/{}/answer", self.mcq_id)
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

// =========================================================
// Posts
// =========================================================

pub fn posts_path() -> String {
    "/api/posts".into()
}

pub fn post_path(id: i64) -> String {
    format!("/api/posts/{}", id)
}

#[derive(Debug, Clone, Copy)]
pub struct ListPosts {
    pub scope: ListScope,
    pub page: PageRequest,
}

impl ApiRequest for ListPosts {
    type Body = ();
    type Response = PageOrList<Post>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.scope {
            ListScope::All => posts_path(),
            ListScope::Mine => "/api/posts/user".into(),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        page_query(&self.page)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeletePost {
    pub id: i64,
}

impl ApiRequest for DeletePost {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        post_path(self.id)
    }
}

/// 当前用户是否已点赞
#[derive(Debug, Clone, Copy)]
pub struct LikeStatus {
    pub id: i64,
}

impl ApiRequest for LikeStatus {
    type Body = ();
    type Response = bool;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/posts/{}/like", self.id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LikePost {
    pub body: PostRef,
}

impl LikePost {
    pub fn new(id: i64) -> Self {
        Self {
            body: PostRef { post_id: id },
        }
    }
}

impl ApiRequest for LikePost {
    type Body = PostRef;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/posts/{}/like", self.body.post_id)
    }

    fn body(&self) -> Option<&PostRef> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnlikePost {
    pub id: i64,
}

impl ApiRequest for UnlikePost {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/posts/{}/like", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct CommentOnPost {
    pub id: i64,
    pub body: CommentRequest,
}

impl ApiRequest for CommentOnPost {
    type Body = CommentRequest;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/posts/{}/comment", self.id)
    }

    fn body(&self) -> Option<&CommentRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SharePost {
    pub body: PostRef,
}

impl SharePost {
    pub fn new(id: i64) -> Self {
        Self {
            body: PostRef { post_id: id },
        }
    }
}

impl ApiRequest for SharePost {
    type Body = PostRef;
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/posts/{}/share", self.body.post_id)
    }

    fn body(&self) -> Option<&PostRef> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListPostComments {
    pub id: i64,
}

impl ApiRequest for ListPostComments {
    type Body = ();
    type Response = Vec<PostComment>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/posts/{}/comments", self.id)
    }
}

// =========================================================
// Community
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct ListCommunityPosts {
    pub scope: ListScope,
    pub page: PageRequest,
}

impl ApiRequest for ListCommunityPosts {
    type Body = ();
    type Response = PageOrList<CommunityPost>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.scope {
            ListScope::All => "/api/community/posts".into(),
            ListScope::Mine => "/api/community/posts/user".into(),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        page_query(&self.page)
    }
}

impl ApiRequest for CommunityPostRequest {
    type Body = Self;
    type Response = CommunityPost;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/community/posts".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCommunityPost {
    pub id: i64,
    pub body: CommunityPostRequest,
}

impl ApiRequest for UpdateCommunityPost {
    type Body = CommunityPostRequest;
    type Response = CommunityPost;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/community/posts/{}", self.id)
    }

    fn body(&self) -> Option<&CommunityPostRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteCommunityPost {
    pub id: i64,
}

impl ApiRequest for DeleteCommunityPost {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/community/posts/{}", self.id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListCommunityComments {
    pub post_id: i64,
}

impl ApiRequest for ListCommunityComments {
    type Body = ();
    type Response = Vec<CommunityComment>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/community/posts/{}/comments", self.post_id)
    }
}

#[derive(Debug, Clone)]
pub struct AddCommunityComment {
    pub post_id: i64,
    pub body: CommunityCommentRequest,
}

impl ApiRequest for AddCommunityComment {
    type Body = CommunityCommentRequest;
    type Response = CommunityComment;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/api/community/posts/{}/comments", self.post_id)
    }

    fn body(&self) -> Option<&CommunityCommentRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCommunityComment {
    pub id: i64,
    pub body: CommunityCommentRequest,
}

impl ApiRequest for UpdateCommunityComment {
    type Body = CommunityCommentRequest;
    type Response = CommunityComment;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/community/comments/{}", self.id)
    }

    fn body(&self) -> Option<&CommunityCommentRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteCommunityComment {
    pub id: i64,
}

impl ApiRequest for DeleteCommunityComment {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/community/comments/{}", self.id)
    }
}

// =========================================================
// Advertisements
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct ListAdvertisements {
    pub scope: ListScope,
}

impl ApiRequest for ListAdvertisements {
    type Body = ();
    type Response = Vec<Advertisement>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.scope {
            ListScope::All => "/api/advertisements".into(),
            ListScope::Mine => "/api/advertisements/my-ads".into(),
        }
    }
}

impl ApiRequest for AdvertisementRequest {
    type Body = Self;
    type Response = Advertisement;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/advertisements".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAdvertisement {
    pub id: i64,
    pub body: AdvertisementRequest,
}

impl ApiRequest for UpdateAdvertisement {
    type Body = AdvertisementRequest;
    type Response = Advertisement;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/advertisements/{}", self.id)
    }

    fn body(&self) -> Option<&AdvertisementRequest> {
        Some(&self.body)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteAdvertisement {
    pub id: i64,
}

impl ApiRequest for DeleteAdvertisement {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        format!("/api/advertisements/{}", self.id)
    }
}

// =========================================================
// Profile
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct GetProfile;

impl ApiRequest for GetProfile {
    type Body = ();
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/profile".into()
    }
}

impl ApiRequest for ProfileUpdate {
    type Body = Self;
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        "/api/profile".into()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteProfile;

impl ApiRequest for DeleteProfile {
    type Body = ();
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const DECODE_RESPONSE: bool = false;

    fn path(&self) -> String {
        "/api/profile".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_paths_follow_role() {
        assert_eq!(
            ListTutorials { role: Role::Admin }.path(),
            "/api/admin/quizzes/tutorials"
        );
        assert_eq!(
            GetTutorial {
                role: Role::User,
                id: 4
            }
            .path(),
            "/api/user/quizzes/tutorials/4"
        );
        assert_eq!(
            DeleteMcq {
                tutorial_id: 4,
                id: 9
            }
            .path(),
            "/api/admin/quizzes/tutorials/4/mcqs/9"
        );
    }

    #[test]
    fn answer_posts_to_mcq_endpoint() {
        let req = AnswerRequest {
            mcq_id: 12,
            user_answer: "B".into(),
        };
        assert_eq!(req.path(), "/api/user/quizzes/mcqs/12/answer");
        assert_eq!(AnswerRequest::METHOD, HttpMethod::Post);
        let body = serde_json::to_value(req.body().unwrap()).unwrap();
        assert_eq!(body["mcqId"], 12);
        assert_eq!(body["userAnswer"], "B");
    }

    #[test]
    fn scoped_lists_pick_their_endpoint() {
        let page = PageRequest::first(10);
        assert_eq!(
            ListPosts {
                scope: ListScope::Mine,
                page
            }
            .path(),
            "/api/posts/user"
        );
        assert_eq!(
            ListCommunityPosts {
                scope: ListScope::All,
                page: page.next()
            }
            .query(),
            vec![("page", "1".to_string()), ("size", "10".to_string())]
        );
        assert_eq!(
            ListAdvertisements {
                scope: ListScope::Mine
            }
            .path(),
            "/api/advertisements/my-ads"
        );
    }

    #[test]
    fn action_posts_send_empty_object() {
        let body = serde_json::to_string(EnrollTutorial { id: 1 }.body().unwrap()).unwrap();
        assert_eq!(body, "{}");
        assert_eq!(LikePost::new(2).path(), UnlikePost { id: 2 }.path());
        let like = serde_json::to_string(LikePost::new(2).body().unwrap()).unwrap();
        assert_eq!(like, r#"{"postId":2}"#);
    }

    #[test]
    fn fire_and_forget_responses_decode_from_null() {
        let unit: serde_json::Result<<DeletePost as ApiRequest>::Response> =
            serde_json::from_str("null");
        assert!(unit.is_ok());
        let none: <AnswerRequest as ApiRequest>::Response = serde_json::from_str("null").unwrap();
        assert!(none.is_none());
    }
}
