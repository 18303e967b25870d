//! 客户端表单校验
//!
//! 每个表单对应一个原始输入结构体，`validate` 成功时产出可直接发送的请求体，
//! 失败时返回 [`ValidationError`]，调用方据此阻止提交，不发起任何网络请求。
//! 服务端仍是最终的校验方。

use crate::advert::{AdCategory, AdvertisementRequest};
use crate::profile::{ProfileUpdate, UserProfile};
use crate::quiz::{McqRequest, TutorialRequest};
use crate::social::{CommunityPostRequest, PostDraft};
use crate::{
    PLACEHOLDER_AD_LINK, PasswordResetConfirmRequest, RegisterAdminRequest, RegisterUserRequest,
    Role,
};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid name regex"));
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid mobile regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MCQ_OPTION_COUNT: usize = 4;
pub const COMMUNITY_TITLE_LEN: std::ops::RangeInclusive<usize> = 5..=100;
pub const COMMUNITY_DESCRIPTION_MIN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must contain only letters")]
    LettersOnly(&'static str),
    #[error("Mobile number must be 10 digits")]
    Mobile,
    #[error("Birthday must be a valid date")]
    BirthdayFormat,
    #[error("Birthday must be before today")]
    BirthdayNotPast,
    #[error("Invalid email format")]
    Email,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("All fields are required and options cannot be empty")]
    McqIncomplete,
    #[error("A question needs exactly 4 options")]
    McqOptionCount,
    #[error("Correct answer must be one of the options")]
    McqAnswerNotAnOption,
    #[error("Title must be between 5 and 100 characters")]
    CommunityTitleLength,
    #[error("Description must be at least 10 characters long")]
    CommunityDescriptionLength,
    #[error("Please choose a category")]
    Category,
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if EMAIL_RE.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(ValidationError::Email)
    }
}

pub fn validate_mobile(mobile: &str) -> Result<String, ValidationError> {
    let mobile = mobile.trim();
    if MOBILE_RE.is_match(mobile) {
        Ok(mobile.to_string())
    } else {
        Err(ValidationError::Mobile)
    }
}

fn validate_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// 生日可以为空；填写时必须早于今天
pub fn validate_birthday(
    birthday: &str,
    today: NaiveDate,
) -> Result<Option<String>, ValidationError> {
    let birthday = birthday.trim();
    if birthday.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(birthday, "%Y-%m-%d")
        .map_err(|_| ValidationError::BirthdayFormat)?;
    if date >= today {
        return Err(ValidationError::BirthdayNotPast);
    }
    Ok(Some(birthday.to_string()))
}

// =========================================================
// 密码强度 (Password Strength)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    /// 按长度、大写、小写、数字、符号五项计分
    pub fn of(password: &str) -> Self {
        let checks = [
            password.chars().count() >= MIN_PASSWORD_LEN,
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_lowercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        match checks.iter().filter(|&&ok| ok).count() {
            0 | 1 => PasswordStrength::Weak,
            2 | 3 => PasswordStrength::Moderate,
            4 => PasswordStrength::Strong,
            _ => PasswordStrength::VeryStrong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Moderate => "Moderate",
            PasswordStrength::Strong => "Strong",
            PasswordStrength::VeryStrong => "Very Strong",
        }
    }
}

// =========================================================
// 注册与找回密码 (Registration & Password Reset)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub birthday: String,
}

impl UserRegistrationForm {
    pub fn validate(&self, today: NaiveDate) -> Result<RegisterUserRequest, ValidationError> {
        let first_name = self.first_name.trim();
        if !NAME_RE.is_match(first_name) {
            return Err(ValidationError::LettersOnly("First Name"));
        }
        let last_name = self.last_name.trim();
        if !NAME_RE.is_match(last_name) {
            return Err(ValidationError::LettersOnly("Last Name"));
        }
        let mobile = validate_mobile(&self.mobile)?;
        let birthday = validate_birthday(&self.birthday, today)?;
        let email = validate_email(&self.email)?;
        validate_password(&self.password, &self.confirm_password)?;

        Ok(RegisterUserRequest {
            email,
            password: self.password.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            mobile,
            birthday,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminRegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
}

impl AdminRegistrationForm {
    pub fn validate(&self) -> Result<RegisterAdminRequest, ValidationError> {
        let full_name = self.full_name.trim();
        let compact: String = full_name.chars().filter(|c| !c.is_whitespace()).collect();
        if !NAME_RE.is_match(&compact) {
            return Err(ValidationError::LettersOnly("Full Name"));
        }
        let email = validate_email(&self.email)?;
        validate_password(&self.password, &self.confirm_password)?;

        Ok(RegisterAdminRequest {
            email,
            password: self.password.clone(),
            full_name: full_name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordResetForm {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<PasswordResetConfirmRequest, ValidationError> {
        let email = validate_email(&self.email)?;
        let otp = required(&self.otp, "OTP")?;
        validate_password(&self.new_password, &self.confirm_password)?;
        Ok(PasswordResetConfirmRequest {
            email,
            otp,
            new_password: self.new_password.clone(),
        })
    }
}

// =========================================================
// 内容表单 (Content Forms)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TutorialForm {
    pub title: String,
    pub description: String,
}

impl TutorialForm {
    pub fn validate(&self) -> Result<TutorialRequest, ValidationError> {
        Ok(TutorialRequest {
            title: required(&self.title, "Title")?,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct McqForm {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Default for McqForm {
    fn default() -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(); MCQ_OPTION_COUNT],
            correct_answer: String::new(),
        }
    }
}

impl McqForm {
    pub fn validate(&self) -> Result<McqRequest, ValidationError> {
        if self.options.len() != MCQ_OPTION_COUNT {
            return Err(ValidationError::McqOptionCount);
        }
        if self.question.trim().is_empty()
            || self.options.iter().any(|o| o.trim().is_empty())
            || self.correct_answer.trim().is_empty()
        {
            return Err(ValidationError::McqIncomplete);
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(ValidationError::McqAnswerNotAnOption);
        }
        Ok(McqRequest {
            question: self.question.trim().to_string(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub description: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<PostDraft, ValidationError> {
        Ok(PostDraft {
            title: required(&self.title, "Title")?,
            description: required(&self.description, "Description")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityPostForm {
    pub title: String,
    pub description: String,
}

impl CommunityPostForm {
    pub fn validate(&self) -> Result<CommunityPostRequest, ValidationError> {
        let title = self.title.trim();
        if !COMMUNITY_TITLE_LEN.contains(&title.chars().count()) {
            return Err(ValidationError::CommunityTitleLength);
        }
        let description = self.description.trim();
        if description.chars().count() < COMMUNITY_DESCRIPTION_MIN {
            return Err(ValidationError::CommunityDescriptionLength);
        }
        Ok(CommunityPostRequest {
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvertisementForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub reference_name: String,
    pub link: String,
}

impl AdvertisementForm {
    pub fn validate(&self) -> Result<AdvertisementRequest, ValidationError> {
        let title = required(&self.title, "Title")?;
        let description = required(&self.description, "Description")?;
        let category = required(&self.category, "Category")?
            .parse::<AdCategory>()
            .map_err(|_| ValidationError::Category)?;
        let reference_name = required(&self.reference_name, "Reference name")?;
        let link = match self.link.trim() {
            "" => PLACEHOLDER_AD_LINK.to_string(),
            link => link.to_string(),
        };
        Ok(AdvertisementRequest {
            title,
            description,
            category,
            reference_name,
            link,
        })
    }
}

// =========================================================
// 个人资料 (Profile)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub mobile: String,
    pub birthday: String,
}

impl From<&UserProfile> for ProfileForm {
    fn from(p: &UserProfile) -> Self {
        Self {
            first_name: p.first_name.clone().unwrap_or_default(),
            last_name: p.last_name.clone().unwrap_or_default(),
            full_name: p.full_name.clone().unwrap_or_default(),
            mobile: p.mobile.clone().unwrap_or_default(),
            birthday: p.birthday.clone().unwrap_or_default(),
        }
    }
}

fn optional_name(value: &str, field: &'static str) -> Result<Option<String>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if !NAME_RE.is_match(&compact) {
        return Err(ValidationError::LettersOnly(field));
    }
    Ok(Some(value.to_string()))
}

impl ProfileForm {
    /// 只校验当前角色可编辑的字段，空字段不进入请求体
    pub fn validate(&self, role: Role, today: NaiveDate) -> Result<ProfileUpdate, ValidationError> {
        match role {
            Role::Admin => Ok(ProfileUpdate {
                full_name: optional_name(&self.full_name, "Full Name")?,
                ..Default::default()
            }),
            Role::User => {
                let mobile = match self.mobile.trim() {
                    "" => None,
                    mobile => Some(validate_mobile(mobile)?),
                };
                Ok(ProfileUpdate {
                    first_name: optional_name(&self.first_name, "First Name")?,
                    last_name: optional_name(&self.last_name, "Last Name")?,
                    mobile,
                    birthday: validate_birthday(&self.birthday, today)?,
                    full_name: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests;
