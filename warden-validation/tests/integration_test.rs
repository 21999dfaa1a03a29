//! Integration tests for warden-validation

use serde_json::{Map, Value, json};
use std::fs;
use std::sync::Arc;
use warden_config::Settings;
use warden_i18n::{I18n, Messages};
use warden_validation::*;

fn data(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn login(username: &str, password: &str, repeat: &str) -> Validation {
    Validation::factory(data(json!({
        "username": username,
        "password": password,
        "password_repeat": repeat,
    })))
    .rule("username", "notEmpty")
    .rule("password", "notEmpty")
    .rule_with("password", "minLength", params![":value", 6])
    .rule_with("password", "matches", params![":validation", ":field", "password_repeat"])
}

struct Inventory;

impl RuleTarget for Inventory {
    fn call(&self, method: &str, args: &[Arg]) -> Option<bool> {
        match method {
            "inStock" => Some(args.first().and_then(Arg::as_str) == Some("apple")),
            _ => None,
        }
    }
}

// ========== Checking ==========

#[test]
fn test_no_rules_passes() {
    let mut validation = Validation::factory(data(json!({"a": 1, "b": ""})));
    assert!(validation.check().unwrap());
    assert!(validation.error_entries().is_empty());
}

#[test]
fn test_empty_values_skip_ordinary_rules() {
    let mut validation = Validation::factory(data(json!({"email": "", "site": null})))
        .rule("email", "email")
        .rule("site", "url");

    assert!(validation.check().unwrap());
}

#[test]
fn test_empty_rules_still_apply() {
    let mut validation = Validation::factory(data(json!({"email": ""})))
        .rule("email", "notEmpty")
        .rule("email", "email");

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("email").unwrap().kind, "notEmpty");
}

#[test]
fn test_empty_rule_set_is_configurable() {
    let mut validation = Validation::factory(data(json!({"email": ""}))).rule("email", "notEmpty");
    validation.set_empty_rules(Vec::<String>::new());

    assert!(validation.check().unwrap());
}

#[test]
fn test_first_failure_stops_the_field() {
    let mut validation = Validation::factory(data(json!({"code": "abc"})))
        .rule("code", "notEmpty")
        .rule_with("code", "minLength", params![":value", 10])
        .rule("code", "email");

    assert!(!validation.check().unwrap());

    let error = validation.field_error("code").unwrap();
    assert_eq!(error.kind, "minLength");
    assert_eq!(error.params, vec![Arg::from("abc"), Arg::from(10)]);
    assert_eq!(validation.error_entries().len(), 1);
}

#[test]
fn test_check_leaves_data_untouched() {
    let original = data(json!({"name": "x"}));
    let mut validation = Validation::factory(original.clone())
        .label("nickname", "Nickname")
        .rule(Field::Global, "notEmpty");

    assert!(!validation.check().unwrap());
    assert_eq!(validation.data(), &original);
    assert!(!validation.exists("nickname"));
    assert_eq!(validation["nickname"], Value::Null);
}

#[test]
fn test_global_rules_cover_data_and_labels() {
    let mut validation = Validation::factory(data(json!({"a": "x", "b": ""})))
        .label("c", "C")
        .rule(Field::Global, "notEmpty");

    assert!(!validation.check().unwrap());

    let fields: Vec<&str> = validation.error_entries().keys().map(String::as_str).collect();
    assert_eq!(fields, vec!["b", "c"]);
}

#[test]
fn test_global_rules_follow_field_rules() {
    let mut validation = Validation::factory(data(json!({"age": "abc"})))
        .rule(Field::Global, "notEmpty")
        .rule("age", "digit");

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("age").unwrap().kind, "digit");
}

#[test]
fn test_check_resets_errors() {
    let mut validation = Validation::factory(data(json!({"name": ""}))).rule("name", "notEmpty");
    assert!(!validation.check().unwrap());

    validation.set_data(data(json!({"name": "Ann"})));
    assert!(validation.check().unwrap());
    assert!(validation.field_error("name").is_none());
}

#[test]
fn test_rebinding_before_check_changes_outcome() {
    let registry = RuleRegistry::default().method("Warehouse", "inStock", |_: &[Arg]| true);
    let mut validation = Validation::factory(data(json!({"code": "abcd", "fruit": "apple"})))
        .with_registry(Arc::new(registry))
        .bind(":min", 3)
        .bind(":stock", "Warehouse")
        .rule_with("code", "minLength", params![":value", ":min"])
        .rule("fruit", (":stock", "inStock"));
    assert!(validation.check().unwrap());

    let mut rebound = validation
        .clone()
        .bind(":min", 10)
        .bind(":stock", Arg::object(Inventory));
    assert!(!rebound.check().unwrap());
    assert_eq!(rebound.field_error("code").unwrap().kind, "minLength");
    assert!(rebound.field_error("fruit").is_none());

    let mut out_of_stock = rebound.copy(data(json!({"code": "abcdefghijk", "fruit": "pear"})));
    assert!(!out_of_stock.check().unwrap());
    assert_eq!(out_of_stock.field_error("fruit").unwrap().kind, "inStock");
}

#[test]
fn test_matches_across_fields() {
    let mut ok = login("john", "secret1", "secret1");
    assert!(ok.check().unwrap());

    let mut mismatch = login("john", "secret1", "secret2");
    assert!(!mismatch.check().unwrap());
    assert_eq!(mismatch.field_error("password").unwrap().kind, "matches");
}

#[test]
fn test_matches_runs_on_empty_values() {
    let mut validation = Validation::factory(data(json!({"password": "", "password_repeat": "x"})))
        .rule_with("password", "matches", params![":data", ":field", "password_repeat"]);

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("password").unwrap().kind, "matches");
}

#[test]
fn test_copy_is_independent() {
    let mut original = login("", "secret1", "secret1");
    assert!(!original.check().unwrap());

    let mut copy = original.copy(data(json!({
        "username": "john",
        "password": "secret1",
        "password_repeat": "secret1",
    })));
    assert!(copy.error_entries().is_empty());
    assert!(copy.check().unwrap());

    assert_eq!(original.field_error("username").unwrap().kind, "notEmpty");
    assert_eq!(original["username"], json!(""));
}

// ========== Rule resolution ==========

#[test]
fn test_unknown_rule_is_an_error() {
    let mut validation = Validation::factory(data(json!({"x": "1"}))).rule("x", "noSuchRule");

    let err = validation.check().unwrap_err();
    assert!(matches!(err, ValidationError::RuleResolution { ref rule, .. } if rule == "noSuchRule"));
    assert!(validation.error_entries().is_empty());
}

#[test]
fn test_unknown_class_and_method_are_errors() {
    let mut unknown_class = Validation::factory(data(json!({"x": "1"}))).rule("x", ("Nope", "email"));
    assert!(unknown_class.check().is_err());

    let mut unknown_method = Validation::factory(data(json!({"x": "1"}))).rule("x", "Valid::nope");
    assert!(unknown_method.check().is_err());

    let mut unknown_object_method = Validation::factory(data(json!({"x": "1"})))
        .bind(":inventory", Arg::object(Inventory))
        .rule("x", (":inventory", "restock"));
    assert!(unknown_object_method.check().is_err());
}

#[test]
fn test_class_method_rules() {
    let mut validation = Validation::factory(data(json!({"a": "bad", "b": "bad", "c": "bad"})))
        .bind(":helpers", "Valid")
        .rule("a", ("Valid", "email"))
        .rule("b", "Valid::email")
        .rule("c", (":helpers", "email"));

    assert!(!validation.check().unwrap());
    for field in ["a", "b", "c"] {
        assert_eq!(validation.field_error(field).unwrap().kind, "email");
    }
}

#[test]
fn test_bound_object_rules() {
    let mut validation = Validation::factory(data(json!({"fruit": "pear", "snack": "apple"})))
        .bind(":inventory", Arg::object(Inventory))
        .rule("fruit", (":inventory", "inStock"))
        .rule("snack", (":inventory", "inStock"));

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("fruit").unwrap().kind, "inStock");
    assert!(validation.field_error("snack").is_none());
}

#[test]
fn test_functions_and_helper_class() {
    let registry = RuleRegistry::default()
        .function("shout", |args: &[Arg]| {
            args.first()
                .and_then(Arg::as_str)
                .is_some_and(|s| s.chars().all(|c| !c.is_lowercase()))
        })
        .method("Strict", "notEmpty", |args: &[Arg]| {
            args.first()
                .and_then(Arg::as_str)
                .is_some_and(|s| !s.trim().is_empty())
        });

    let mut validation = Validation::factory(data(json!({"title": "Hello", "body": "   "})))
        .with_registry(Arc::new(registry))
        .rule("title", RuleSpec::function("shout"))
        .rule("body", "notEmpty");

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("title").unwrap().kind, "shout");
    assert!(validation.field_error("body").is_none());

    validation.set_helper_class("Strict");
    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("body").unwrap().kind, "notEmpty");
}

#[test]
fn test_inline_rules_record_errors_manually() {
    let mut validation = Validation::factory(data(json!({"index": 8, "other": "x"})))
        .rule_with(
            "index",
            RuleSpec::inline(|ctx, args| {
                let n = args[0].as_f64().unwrap_or(0.0);
                if n > 6.0 && n < 10.0 {
                    let field = args[1].as_str().unwrap_or_default().to_string();
                    ctx.error(&field, "custom", vec![]);
                }
                false
            }),
            params![":value", ":field"],
        )
        .rule("index", "email");

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("index").unwrap().kind, "custom");
    assert!(validation.field_error("other").is_none());
}

#[test]
fn test_inline_error_on_empty_field_is_kept() {
    let mut validation = Validation::factory(data(json!({"note": ""}))).rule(
        "note",
        RuleSpec::inline(|ctx, _| {
            ctx.error("note", "blank", vec![]);
            true
        }),
    );

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("note").unwrap().kind, "blank");
}

#[test]
fn test_rules_bulk_registration() {
    let mut validation = Validation::factory(data(json!({"zip": "12a"})))
        .rules("zip", [("notEmpty", None), ("exactLength", Some(params![":value", 5]))]);

    assert!(!validation.check().unwrap());
    assert_eq!(validation.field_error("zip").unwrap().kind, "exactLength");
    assert_eq!(validation.labels_map().get("zip").map(String::as_str), Some("zip"));
}

// ========== Error messages ==========

#[test]
fn test_raw_errors_without_file() {
    let mut validation = login("", "abc", "abc");
    validation.check().unwrap();

    let report = validation.errors(None, true);
    let raw = report.raw("password").unwrap();
    assert_eq!(raw.kind, "minLength");
    assert_eq!(raw.params, vec![Arg::from("abc"), Arg::from(6)]);
    assert_eq!(report.fields(), vec!["username", "password"]);
}

#[test]
fn test_missing_messages_fall_back_to_path() {
    let mut validation = login("", "secret1", "secret1");
    validation.check().unwrap();

    let report = validation.errors(Some("forms/login"), false);
    assert_eq!(report.message("username"), Some("forms/login.username.notEmpty"));
    assert_eq!(report.len(), 1);
}

#[test]
fn test_login_form_without_message_files() {
    let mut validation = Validation::factory(data(json!({
        "username": "",
        "password": "abc",
        "password_repeat": "abd",
    })))
    .rule("username", "notEmpty")
    .rule("password", "notEmpty")
    .rule_with("password", "matches", params![":validation", ":field", "password_repeat"]);

    assert!(!validation.check().unwrap());

    let report = validation.errors(Some("forms/login"), false);
    assert_eq!(report.len(), 2);
    assert_eq!(report.message("username"), Some("forms/login.username.notEmpty"));
    assert_eq!(report.message("password"), Some("forms/login.password.matches"));
}

#[test]
fn test_configured_error_file_is_used() {
    let mut validation = login("", "secret1", "secret1").with_error_file("forms/login");
    validation.check().unwrap();

    let report = validation.errors(None, false);
    assert_eq!(report.message("username"), Some("forms/login.username.notEmpty"));
}

#[test]
fn test_message_lookup_order() {
    let messages = Messages::new();
    messages.insert(
        "forms/login",
        json!({
            "username": {"notEmpty": "A", "default": "B"},
            "password": {"default": {"nested": "not a message"}, "matches": ""},
            "minLength": "C",
        }),
    );
    messages.insert("validation", json!({"email": "D", "matches": "E"}));

    let mut validation = Validation::default().with_messages(Arc::new(messages));
    validation
        .error("username", "notEmpty", None)
        .error("nickname", "taken", None)
        .error("password", "minLength", None)
        .error("email", "email", None)
        .error("password_repeat", "matches", None)
        .error("zip", "unknown", None);

    // username with any other kind uses its default
    let mut other = validation.clone();
    other.error("username", "taken", None);

    let report = validation.errors(Some("forms/login"), false);
    assert_eq!(report.message("username"), Some("A"));
    assert_eq!(report.message("nickname"), Some("forms/login.nickname.taken"));
    assert_eq!(report.message("password"), Some("C"));
    assert_eq!(report.message("email"), Some("D"));
    assert_eq!(report.message("password_repeat"), Some("E"));
    assert_eq!(report.message("zip"), Some("forms/login.zip.unknown"));

    let report = other.errors(Some("forms/login"), false);
    assert_eq!(report.message("username"), Some("B"));
}

#[test]
fn test_empty_message_is_skipped() {
    let messages = Messages::new();
    messages.insert("forms", json!({"password": {"matches": ""}, "matches": "fields differ"}));

    let mut validation = Validation::default().with_messages(Arc::new(messages));
    validation.error("password", "matches", None);

    let report = validation.errors(Some("forms"), false);
    assert_eq!(report.message("password"), Some("fields differ"));
}

#[test]
fn test_placeholders_and_labels_in_messages() {
    let messages = Messages::new();
    messages.insert(
        "forms/login",
        json!({
            "password": {"matches": ":field must match :param3 [:param1|:param2]"},
            "minLength": ":field ':value' needs :param2 characters",
        }),
    );

    let mut validation = login("john", "secret1", "secret2")
        .label("password_repeat", "Password again")
        .with_messages(Arc::new(messages));
    validation.check().unwrap();

    let report = validation.errors(Some("forms/login"), false);
    assert_eq!(
        report.message("password"),
        Some("password must match Password again [:param1|password]")
    );

    let mut short = validation.copy(data(json!({
        "username": "john",
        "password": "abc",
        "password_repeat": "abc",
    })));
    short.check().unwrap();
    assert_eq!(
        short.errors(Some("forms/login"), false).message("password"),
        Some("password 'abc' needs 6 characters")
    );
}

#[test]
fn test_array_values_are_flattened() {
    let messages = Messages::new();
    messages.insert("validation", json!({"tooMany": ":field has :value"}));

    let mut validation = Validation::factory(data(json!({"tags": ["a", ["b", "c"]]})))
        .label("tags", "Tags")
        .with_messages(Arc::new(messages));
    validation.error("tags", "tooMany", Some(vec![Arg::from(json!(["x", "y"]))]));

    let report = validation.errors(Some("forms/post"), false);
    assert_eq!(report.message("tags"), Some("Tags has a, b, c"));
}

#[test]
fn test_translated_messages() {
    let messages = Messages::new();
    messages.insert("validation", json!({"notEmpty": ":field must not be empty"}));

    let i18n = I18n::new();
    i18n.insert_table(
        "zh-cn",
        [(":field must not be empty", ":field不能为空"), ("username", "用户名")],
    );

    let mut validation = login("", "secret1", "secret1")
        .with_messages(Arc::new(messages))
        .with_translator(Arc::new(i18n));
    validation.check().unwrap();

    assert_eq!(
        validation.errors(Some("forms/login"), "zh_CN").message("username"),
        Some("用户名不能为空")
    );
    assert_eq!(
        validation.errors(Some("forms/login"), true).message("username"),
        Some("username must not be empty")
    );
    assert_eq!(
        validation
            .errors(Some("forms/login"), Translate::No)
            .message("username"),
        Some("username must not be empty")
    );
}

#[test]
fn test_messages_from_settings_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("forms")).unwrap();
    fs::write(
        dir.path().join("forms/login.json"),
        r#"{"username": {"notEmpty": "Please enter :field"}}"#,
    )
    .unwrap();

    let mut settings = Settings::default();
    settings.validation.error_file = Some("forms/login".to_string());
    settings.i18n.message_paths = vec![dir.path().display().to_string()];

    let mut validation = login("", "secret1", "secret1")
        .label("username", "your user name")
        .with_settings(&settings);
    validation.check().unwrap();

    let report = validation.errors(None, false);
    assert_eq!(report.message("username"), Some("Please enter your user name"));
    assert_eq!(
        report.to_json()["errors"][0],
        json!({"field": "username", "message": "Please enter your user name"})
    );
}
