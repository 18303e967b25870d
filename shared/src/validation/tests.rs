use super::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn user_form() -> UserRegistrationForm {
    UserRegistrationForm {
        email: "ada@technest.dev".into(),
        password: "Secret123!".into(),
        confirm_password: "Secret123!".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        mobile: "0712345678".into(),
        birthday: "1990-12-10".into(),
    }
}

// =========================================================
// Registration
// =========================================================

#[test]
fn valid_user_registration_produces_request() {
    let req = user_form().validate(today()).unwrap();
    assert_eq!(req.email, "ada@technest.dev");
    assert_eq!(req.birthday.as_deref(), Some("1990-12-10"));
}

#[test]
fn mobile_must_be_exactly_ten_digits() {
    for mobile in ["071234567", "07123456789", "07123x5678", ""] {
        let form = UserRegistrationForm {
            mobile: mobile.into(),
            ..user_form()
        };
        assert_eq!(form.validate(today()), Err(ValidationError::Mobile), "{mobile}");
    }
}

#[test]
fn short_password_is_rejected() {
    let form = UserRegistrationForm {
        password: "short1!".into(),
        confirm_password: "short1!".into(),
        ..user_form()
    };
    assert_eq!(form.validate(today()), Err(ValidationError::PasswordTooShort));
}

#[test]
fn password_confirmation_must_match() {
    let form = UserRegistrationForm {
        confirm_password: "Secret123?".into(),
        ..user_form()
    };
    assert_eq!(form.validate(today()), Err(ValidationError::PasswordMismatch));
}

#[test]
fn names_are_letters_only() {
    let form = UserRegistrationForm {
        first_name: "Ada2".into(),
        ..user_form()
    };
    assert_eq!(
        form.validate(today()),
        Err(ValidationError::LettersOnly("First Name"))
    );
}

#[test]
fn birthday_must_be_in_the_past() {
    let form = UserRegistrationForm {
        birthday: "2025-06-15".into(),
        ..user_form()
    };
    assert_eq!(form.validate(today()), Err(ValidationError::BirthdayNotPast));

    let form = UserRegistrationForm {
        birthday: String::new(),
        ..user_form()
    };
    assert_eq!(form.validate(today()).unwrap().birthday, None);
}

#[test]
fn email_format_is_checked() {
    for email in ["plain", "a@b", "a b@c.de", "@c.de"] {
        assert_eq!(validate_email(email), Err(ValidationError::Email), "{email}");
    }
    assert!(validate_email(" x@y.io ").is_ok());
}

#[test]
fn admin_full_name_allows_spaces() {
    let form = AdminRegistrationForm {
        email: "root@technest.dev".into(),
        password: "Adminpass1".into(),
        confirm_password: "Adminpass1".into(),
        full_name: "Grace Hopper".into(),
    };
    assert_eq!(form.validate().unwrap().full_name, "Grace Hopper");

    let form = AdminRegistrationForm {
        full_name: "Grace_Hopper".into(),
        ..form
    };
    assert_eq!(
        form.validate(),
        Err(ValidationError::LettersOnly("Full Name"))
    );
}

#[test]
fn password_strength_levels() {
    assert_eq!(PasswordStrength::of("abc"), PasswordStrength::Weak);
    assert_eq!(PasswordStrength::of("abcdefgh1"), PasswordStrength::Moderate);
    assert_eq!(PasswordStrength::of("Abcdefgh1"), PasswordStrength::Strong);
    assert_eq!(PasswordStrength::of("Abcdefgh1!"), PasswordStrength::VeryStrong);
}

#[test]
fn password_reset_requires_otp() {
    let form = PasswordResetForm {
        email: "a@b.io".into(),
        otp: " ".into(),
        new_password: "newpass123".into(),
        confirm_password: "newpass123".into(),
    };
    assert_eq!(form.validate(), Err(ValidationError::Required("OTP")));
}

// =========================================================
// Content forms
// =========================================================

fn mcq_form() -> McqForm {
    McqForm {
        question: "2 + 2?".into(),
        options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
        correct_answer: "4".into(),
    }
}

#[test]
fn mcq_correct_answer_must_be_an_option() {
    assert!(mcq_form().validate().is_ok());

    let form = McqForm {
        correct_answer: "four".into(),
        ..mcq_form()
    };
    assert_eq!(form.validate(), Err(ValidationError::McqAnswerNotAnOption));
}

#[test]
fn mcq_needs_four_filled_options() {
    let mut form = mcq_form();
    form.options[2] = "  ".into();
    assert_eq!(form.validate(), Err(ValidationError::McqIncomplete));

    let mut form = mcq_form();
    form.options.pop();
    assert_eq!(form.validate(), Err(ValidationError::McqOptionCount));

    assert_eq!(McqForm::default().validate(), Err(ValidationError::McqIncomplete));
}

#[test]
fn tutorial_title_required() {
    let form = TutorialForm::default();
    assert_eq!(form.validate(), Err(ValidationError::Required("Title")));
}

#[test]
fn community_post_length_rules() {
    let ok = CommunityPostForm {
        title: "Borrow checker".into(),
        description: "Why does this not compile?".into(),
    };
    assert!(ok.validate().is_ok());

    let short_title = CommunityPostForm {
        title: "Why".into(),
        ..ok.clone()
    };
    assert_eq!(
        short_title.validate(),
        Err(ValidationError::CommunityTitleLength)
    );

    let short_body = CommunityPostForm {
        description: "help".into(),
        ..ok
    };
    assert_eq!(
        short_body.validate(),
        Err(ValidationError::CommunityDescriptionLength)
    );
}

#[test]
fn advertisement_defaults_link_and_parses_category() {
    let form = AdvertisementForm {
        title: "Rust Uni".into(),
        description: "Learn".into(),
        category: "UNIVERSITY".into(),
        reference_name: "RU".into(),
        link: String::new(),
    };
    let req = form.validate().unwrap();
    assert_eq!(req.link, PLACEHOLDER_AD_LINK);
    assert_eq!(req.category, AdCategory::University);

    let form = AdvertisementForm {
        category: "RADIO".into(),
        ..form
    };
    assert_eq!(form.validate(), Err(ValidationError::Category));
}

#[test]
fn post_form_requires_both_fields() {
    let form = PostForm {
        title: "t".into(),
        description: String::new(),
    };
    assert_eq!(form.validate(), Err(ValidationError::Required("Description")));
}

// =========================================================
// Profile
// =========================================================

#[test]
fn user_profile_update_omits_blank_fields() {
    let form = ProfileForm {
        first_name: "Grace".into(),
        mobile: "  ".into(),
        full_name: "ignored for users".into(),
        ..Default::default()
    };
    let update = form.validate(Role::User, today()).unwrap();
    assert_eq!(update.first_name.as_deref(), Some("Grace"));
    assert_eq!(update.mobile, None);
    assert_eq!(update.full_name, None);
}

#[test]
fn user_profile_rejects_bad_mobile_and_future_birthday() {
    let form = ProfileForm {
        mobile: "12345".into(),
        ..Default::default()
    };
    assert_eq!(form.validate(Role::User, today()), Err(ValidationError::Mobile));

    let form = ProfileForm {
        birthday: "2025-06-15".into(),
        ..Default::default()
    };
    assert_eq!(
        form.validate(Role::User, today()),
        Err(ValidationError::BirthdayNotPast)
    );
}

#[test]
fn admin_profile_only_sends_full_name() {
    let form = ProfileForm {
        full_name: "Ada King".into(),
        mobile: "bad".into(),
        ..Default::default()
    };
    let update = form.validate(Role::Admin, today()).unwrap();
    assert_eq!(update.full_name.as_deref(), Some("Ada King"));
    assert_eq!(update.mobile, None);
}
