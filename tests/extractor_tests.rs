mod common;

use common::write_about;
use tempfile::TempDir;
use theme_manager::about::{ExtractError, MAX_NESTING, MetaValue, get_field, scan_about_file};

const FULL_ABOUT: &str = r#"<?php if (!defined('APPLICATION')) exit();
/*
 * Ocean theme. Copyright (c) the Ocean authors.
 */

// Theme definition
$ThemeInfo['ocean'] = array(
   'Name' => 'Ocean',
   'Description' => "A calm, \"blue\" theme.",
   'Version' => '2.0.3',
   'Author' => "Jane Doe", # primary author
   'AuthorEmail' => 'jane@example.com',
   'AuthorUrl' => 'https://example.com/jane',
   'RequiredApplications' => array('Forum' => '>=2.0'),
   'Options' => array(
      'Description' => 'Choose a mood.',
      'Styles' => array(
         'Default' => '%s_default',
         'Night' => array('Basename' => '%s_night', 'Description' => 'Dark waters'),
      ),
      'Text' => array(
         'Banner' => array('Type' => 'textbox', 'Default' => 'Welcome aboard'),
      ),
   ),
   'Priority' => -5,
   'Opacity' => 0.75,
   'Mobile' => FALSE,
);

class OceanThemeHooks implements Gdn_IPlugin {
   public function Setup() { return true; }
}
"#;

#[test]
fn test_full_about_file() {
    let temp = TempDir::new().unwrap();
    let dir = write_about(temp.path(), "ocean", FULL_ABOUT);

    let declaration = scan_about_file(&dir.join("about.php")).unwrap().unwrap();
    assert_eq!(declaration.identifier, "ocean");
    let fields = &declaration.fields;
    assert_eq!(
        get_field(fields, "description").and_then(MetaValue::as_str),
        Some("A calm, \"blue\" theme.")
    );
    assert_eq!(get_field(fields, "priority"), Some(&MetaValue::Integer(-5)));
    assert_eq!(get_field(fields, "opacity"), Some(&MetaValue::Float(0.75)));
    assert_eq!(get_field(fields, "mobile"), Some(&MetaValue::Bool(false)));

    let styles = get_field(fields, "Options")
        .and_then(MetaValue::as_map)
        .and_then(|o| get_field(o, "Styles"))
        .and_then(MetaValue::as_map)
        .unwrap();
    assert_eq!(styles.len(), 2);
}

#[test]
fn test_short_array_syntax() {
    let temp = TempDir::new().unwrap();
    let dir = write_about(
        temp.path(),
        "reef",
        "<?php\n$ThemeInfo['reef'] = [\n   'Name' => 'Reef',\n   'Tags' => ['coral', 'fish'],\n];\n",
    );

    let declaration = scan_about_file(&dir.join("about.php")).unwrap().unwrap();
    assert_eq!(
        declaration.fields.get("Tags"),
        Some(&MetaValue::List(vec![
            MetaValue::String("coral".into()),
            MetaValue::String("fish".into()),
        ]))
    );
}

#[test]
fn test_function_call_is_never_executed() {
    let temp = TempDir::new().unwrap();
    let dir = write_about(
        temp.path(),
        "evil",
        "<?php\n\n$ThemeInfo['evil'] = array(\n   'Name' => file_get_contents('/etc/passwd'),\n);\n",
    );

    match scan_about_file(&dir.join("about.php")).unwrap_err() {
        ExtractError::Syntax { line, .. } => assert_eq!(line, 4),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_concatenation_and_constants_rejected() {
    let temp = TempDir::new().unwrap();
    for (folder, body) in [
        ("concat", "<?php\n$ThemeInfo['concat'] = array('Name' => 'a' . 'b');\n"),
        ("constant", "<?php\n$ThemeInfo['constant'] = array('Name' => APPLICATION_VERSION);\n"),
        ("variable", "<?php\n$ThemeInfo['variable'] = array('Name' => $Name);\n"),
    ] {
        let dir = write_about(temp.path(), folder, body);
        let err = scan_about_file(&dir.join("about.php")).unwrap_err();
        assert!(matches!(err, ExtractError::Syntax { .. }), "{folder}: {err:?}");
    }
}

#[test]
fn test_nesting_limit() {
    // The indexed key and the theme's own array use two of the levels.
    let nested = |levels: usize| {
        let mut value = "'leaf'".to_string();
        for _ in 0..levels {
            value = format!("array({value})");
        }
        value
    };
    let temp = TempDir::new().unwrap();

    let within = format!(
        "<?php\n$ThemeInfo['deep'] = array('Key' => {});\n",
        nested(MAX_NESTING - 2)
    );
    let dir = write_about(temp.path(), "deep", &within);
    assert!(scan_about_file(&dir.join("about.php")).is_ok());

    let beyond = format!(
        "<?php\n$ThemeInfo['deeper'] = array('Key' => {});\n",
        nested(MAX_NESTING - 1)
    );
    let dir = write_about(temp.path(), "deeper", &beyond);
    assert!(matches!(
        scan_about_file(&dir.join("about.php")),
        Err(ExtractError::TooDeep { .. })
    ));
}

#[test]
fn test_invalid_utf8_is_tolerated() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("latin");
    std::fs::create_dir_all(&dir).unwrap();
    let mut bytes = b"<?php\n$ThemeInfo['latin'] = array('Name' => 'Caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"');\n");
    std::fs::write(dir.join("about.php"), bytes).unwrap();

    let declaration = scan_about_file(&dir.join("about.php")).unwrap().unwrap();
    let name = declaration.fields["Name"].as_str().unwrap();
    assert!(name.starts_with("Caf"));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        scan_about_file(&temp.path().join("about.php")),
        Err(ExtractError::Io(_))
    ));
}
