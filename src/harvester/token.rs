use base64::{Engine as _, engine::general_purpose};

/// Display form of a resumption token.
///
/// Many servers hand out Base64 encoded state as their token, so showing the
/// decoded text makes a harvest easier to follow. Decoding is cosmetic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedToken {
    Decoded { raw: String, text: String },
    Raw(String),
}

impl DecodedToken {
    pub fn decode(raw: &str) -> Self {
        let text = general_purpose::STANDARD
            .decode(raw.trim())
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        match text {
            Some(text) => DecodedToken::Decoded {
                raw: raw.to_string(),
                text,
            },
            None => DecodedToken::Raw(raw.to_string()),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            DecodedToken::Decoded { raw, .. } | DecodedToken::Raw(raw) => raw,
        }
    }
}
