//! Key names accepted by [`ChromePage::press_key`](crate::ChromePage).

/// DevTools key event fields for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyDefinition {
    pub key: String,
    pub code: String,
    pub key_code: i64,
    pub text: Option<String>,
}

const NAMED: &[(&str, i64, Option<&str>)] = &[
    ("Backspace", 8, None),
    ("Tab", 9, None),
    ("Enter", 13, Some("\r")),
    ("Escape", 27, None),
    ("ArrowLeft", 37, None),
    ("ArrowUp", 38, None),
    ("ArrowRight", 39, None),
    ("ArrowDown", 40, None),
];

/// Look up a named key or a single printable character.
pub(crate) fn key_definition(name: &str) -> Option<KeyDefinition> {
    if let Some(&(key, key_code, text)) = NAMED.iter().find(|(key, _, _)| *key == name) {
        return Some(KeyDefinition {
            key: key.to_owned(),
            code: key.to_owned(),
            key_code,
            text: text.map(str::to_owned),
        });
    }

    let mut chars = name.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let upper = ch.to_ascii_uppercase();
    let code = match upper {
        'A'..='Z' => format!("Key{upper}"),
        '0'..='9' => format!("Digit{upper}"),
        ' ' => "Space".to_owned(),
        _ => String::new(),
    };
    let key_code = if upper.is_ascii_alphanumeric() || upper == ' ' {
        i64::from(u32::from(upper))
    } else {
        0
    };
    Some(KeyDefinition {
        key: ch.to_string(),
        code,
        key_code,
        text: Some(ch.to_string()),
    })
}
