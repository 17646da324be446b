use super::*;

#[test]
fn test_builtin_templates_present() {
    let set = PromptSet::builtin();
    for kind in PromptKind::ALL {
        assert!(!set.template(kind).trim().is_empty(), "{} empty", kind.name());
        assert!(!set.is_overridden(kind));
    }
}

#[test]
fn test_render_classify() {
    let set = PromptSet::builtin();
    let prompt = set
        .render(PromptKind::Classify, &[("user_query", "vivah garne umer kati ho?")])
        .unwrap();

    assert!(prompt.contains("\"vivah garne umer kati ho?\""));
    assert!(!prompt.contains("{user_query}"));
    // JSON braces in the template survive untouched.
    assert!(prompt.contains("{\"language\":"));
}

#[test]
fn test_render_missing_variable() {
    let set = PromptSet::builtin();
    let err = set
        .render(PromptKind::Answer, &[("user_query", "q"), ("translated_query", "q")])
        .unwrap_err();

    match err {
        PromptError::MissingVariable { template, name } => {
            assert_eq!(template, "answer");
            assert!(name == "language" || name == "context");
        }
        other => panic!("expected MissingVariable, got {other:?}"),
    }
}

#[test]
fn test_values_are_not_rescanned() {
    let out = render_template("t", "Q: {a}", &[("a", "{b}")]).unwrap();
    assert_eq!(out, "Q: {b}");
}

#[test]
fn test_literal_braces_kept() {
    let out = render_template("t", "{} {\"k\": 1} {x}", &[("x", "v")]).unwrap();
    assert_eq!(out, "{} {\"k\": 1} v");
}

#[test]
fn test_unterminated_placeholder() {
    assert!(matches!(
        render_template("t", "hello {name", &[("name", "x")]),
        Err(PromptError::Unterminated { .. })
    ));
}

#[test]
fn test_every_builtin_renders_with_its_variables() {
    let set = PromptSet::builtin();
    let vars = [
        ("user_query", "q"),
        ("translated_query", "q"),
        ("context", "c"),
        ("language", "english"),
        ("broken_output", "b"),
        ("trusted_domains", "lawcommission.gov.np"),
    ];
    for kind in PromptKind::ALL {
        assert!(set.render(kind, &vars).is_ok(), "{} failed", kind.name());
    }
}

#[test]
fn test_load_without_dir_is_builtin() {
    let set = PromptSet::load(None).unwrap();
    assert_eq!(
        set.template(PromptKind::WebSearch),
        PromptSet::builtin().template(PromptKind::WebSearch)
    );
}

#[test]
fn test_load_overrides_single_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("classify.txt"), "Classify: {user_query}").unwrap();

    let set = PromptSet::load(Some(dir.path())).unwrap();
    assert!(set.is_overridden(PromptKind::Classify));
    assert!(!set.is_overridden(PromptKind::Answer));
    assert_eq!(
        set.render(PromptKind::Classify, &[("user_query", "hi")])
            .unwrap(),
        "Classify: hi"
    );
}

#[test]
fn test_load_rejects_empty_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("answer.txt"), "  \n").unwrap();

    assert!(matches!(
        PromptSet::load(Some(dir.path())),
        Err(PromptError::EmptyOverride { .. })
    ));
}
