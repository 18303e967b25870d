//! 个人资料与管理员用户目录

use crate::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// `PUT /api/profile` 的请求体，空字段不发送
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(p: &UserProfile) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            mobile: p.mobile.clone(),
            birthday: p.birthday.clone(),
            full_name: p.full_name.clone(),
        }
    }
}

// =========================================================
// 管理员视图 (Admin)
// =========================================================

/// 注册活动记录，用于注册趋势图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminUserSummary {
    /// 管理员显示全名，普通用户显示 "名 姓"，缺失字段以 `-` 占位
    pub fn display_name(&self) -> String {
        match self.role {
            Role::Admin => self.full_name.clone().unwrap_or_else(|| "-".to_string()),
            Role::User => format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or("-"),
                self.last_name.as_deref().unwrap_or("-")
            ),
        }
    }
}

/// 用户目录筛选条件：角色页签 + 邮箱/姓名搜索（不区分大小写）
#[derive(Debug, Clone, PartialEq)]
pub struct UserFilter {
    pub role: Role,
    pub email_query: String,
    pub name_query: String,
}

impl UserFilter {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            email_query: String::new(),
            name_query: String::new(),
        }
    }

    pub fn matches(&self, user: &AdminUserSummary) -> bool {
        if user.role != self.role {
            return false;
        }
        let email_query = self.email_query.trim().to_lowercase();
        let name_query = self.name_query.trim().to_lowercase();

        let email_ok = email_query.is_empty() || user.email.to_lowercase().contains(&email_query);
        let name_ok = name_query.is_empty() || {
            let fields = [&user.first_name, &user.last_name, &user.full_name];
            fields
                .iter()
                .filter_map(|f| f.as_deref())
                .any(|f| f.to_lowercase().contains(&name_query))
        };
        email_ok && name_ok
    }

    pub fn apply<'a>(&self, users: &'a [AdminUserSummary]) -> Vec<&'a AdminUserSummary> {
        users.iter().filter(|u| self.matches(u)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, email: &str, first: &str, role: Role) -> AdminUserSummary {
        AdminUserSummary {
            id,
            email: email.to_string(),
            role,
            first_name: Some(first.to_string()),
            last_name: Some("Doe".to_string()),
            full_name: None,
            mobile: None,
            created_at: None,
        }
    }

    #[test]
    fn filter_by_role_tab_and_queries() {
        let users = vec![
            user(1, "jane@x.io", "Jane", Role::User),
            user(2, "john@x.io", "John", Role::User),
            user(3, "root@x.io", "Root", Role::Admin),
        ];

        let mut filter = UserFilter::new(Role::User);
        assert_eq!(filter.apply(&users).len(), 2);

        filter.email_query = "JANE".into();
        let hits = filter.apply(&users);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        filter.email_query.clear();
        filter.name_query = "doe".into();
        assert_eq!(filter.apply(&users).len(), 2);

        filter.name_query = "nobody".into();
        assert!(filter.apply(&users).is_empty());

        assert_eq!(UserFilter::new(Role::Admin).apply(&users)[0].id, 3);
    }

    #[test]
    fn display_name_per_role() {
        let mut u = user(1, "a@x.io", "Jane", Role::User);
        assert_eq!(u.display_name(), "Jane Doe");
        u.role = Role::Admin;
        assert_eq!(u.display_name(), "-");
    }

    #[test]
    fn profile_update_skips_empty_fields() {
        let update = ProfileUpdate {
            mobile: Some("0123456789".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"mobile":"0123456789"}"#);
    }
}
