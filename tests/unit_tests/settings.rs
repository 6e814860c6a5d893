use fenris_kernel::settings::KernelSettings;

#[test]
fn default_settings_declare_static_inline_void() {
    let settings = KernelSettings::default();
    assert_eq!(settings.function_qualifiers, vec!["static", "inline"]);
    assert_eq!(settings.return_type, "void");
    assert_eq!(KernelSettings::new(), settings);
}

#[test]
fn builder_methods_replace_fields() {
    let settings = KernelSettings::new()
        .with_function_qualifiers(["extern"])
        .with_return_type("int");
    assert_eq!(settings.function_qualifiers, vec!["extern"]);
    assert_eq!(settings.return_type, "int");

    let unqualified = KernelSettings::new().with_function_qualifiers(Vec::<String>::new());
    assert!(unqualified.function_qualifiers.is_empty());
}

#[test]
fn settings_deserialize_with_defaults_for_missing_fields() {
    let settings: KernelSettings = serde_json::from_str(r#"{ "function_qualifiers": [] }"#).unwrap();
    assert!(settings.function_qualifiers.is_empty());
    assert_eq!(settings.return_type, "void");

    let settings: KernelSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, KernelSettings::default());

    let json = serde_json::to_string(&KernelSettings::default()).unwrap();
    assert_eq!(json, r#"{"function_qualifiers":["static","inline"],"return_type":"void"}"#);
}
