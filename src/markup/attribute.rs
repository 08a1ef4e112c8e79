use crate::{color::Color, style::StyleOverride, style::clamp_font_size};

/// Attribute keys understood inside a `<f ...>` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttributeKey {
    Font,
    FontSize,
    FontColor,
}

impl AttributeKey {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "font" => Some(Self::Font),
            "font_size" | "fs" => Some(Self::FontSize),
            "font_color" | "fc" => Some(Self::FontColor),
            _ => None,
        }
    }
}

/// An attribute whose value could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedAttribute {
    pub key: String,
    pub value: String,
}

/// Result of tokenizing a tag's attribute string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub style: StyleOverride,
    pub rejected: Vec<RejectedAttribute>,
}

/// Tokenizes `key=value` pairs separated by whitespace into a [`StyleOverride`].
///
/// Unknown keys and tokens without `=` are ignored. When a key appears more
/// than once the last occurrence wins. A value that fails to parse leaves
/// the field unset and is reported in [`Attributes::rejected`].
pub fn parse_attributes(source: &str) -> Attributes {
    let mut attrs = Attributes::default();

    for token in source.split_whitespace() {
        let Some((name, raw_value)) = token.split_once('=') else {
            continue;
        };
        let Some(key) = AttributeKey::from_name(name) else {
            log::debug!("ignoring unknown tag attribute `{name}`");
            continue;
        };
        let value = unquote(raw_value);

        match key {
            AttributeKey::Font => {
                attrs.style.font = (!value.is_empty()).then(|| value.to_string());
            }
            AttributeKey::FontSize => match value.parse::<i64>() {
                Ok(size) => attrs.style.font_size = Some(clamp_font_size(size)),
                Err(_) => {
                    attrs.style.font_size = None;
                    attrs.reject(name, value);
                }
            },
            AttributeKey::FontColor => match value.parse::<Color>() {
                Ok(color) => attrs.style.font_color = Some(color),
                Err(_) => {
                    attrs.style.font_color = None;
                    attrs.reject(name, value);
                }
            },
        }
    }

    attrs
}

impl Attributes {
    fn reject(&mut self, key: &str, value: &str) {
        log::warn!("tag attribute {key}={value} is not usable, falling back to the base style");
        self.rejected.push(RejectedAttribute {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
