// One-shot form state carried across a redirect in a cookie

use std::collections::BTreeMap;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::errors::ValidationError;
use common::models::RepositoryInput;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

// Browsers cap a cookie at about 4KB including its attributes
const MAX_COOKIE_VALUE_BYTES: usize = 3500;

/// Field errors plus the input that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
    #[serde(default)]
    pub old: Option<RepositoryInput>,
}

impl Flash {
    pub fn from_validation(errors: ValidationError, old: RepositoryInput) -> Self {
        Self {
            errors: errors.into_map(),
            old: Some(old),
        }
    }

    /// Previously submitted value for `field`, if any
    pub fn old_value(&self, field: &str) -> Option<&str> {
        let old = self.old.as_ref()?;
        match field {
            "url" => old.url.as_deref(),
            "description" => old.description.as_deref(),
            _ => None,
        }
    }

    fn encode(&self) -> Option<String> {
        let json = serde_json::to_vec(self).ok()?;
        Some(hex::encode(json))
    }

    fn decode(value: &str) -> Option<Self> {
        let json = hex::decode(value).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Store `flash` for the next request. Old input is dropped if the cookie
/// would be too large; errors are always kept.
pub fn put(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut value = flash.encode();

    if value.as_ref().map_or(false, |v| v.len() > MAX_COOKIE_VALUE_BYTES) {
        tracing::debug!("Flash too large, dropping old input");
        value = Flash {
            errors: flash.errors,
            old: None,
        }
        .encode();
    }

    match value {
        Some(value) => jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(time::Duration::minutes(5)),
        ),
        None => {
            tracing::warn!("Failed to encode flash cookie");
            jar
        }
    }
}

/// Read and clear the flash. A missing or unreadable cookie yields an empty flash.
pub fn take(jar: CookieJar) -> (CookieJar, Flash) {
    let Some(value) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, Flash::default());
    };

    let flash = Flash::decode(&value).unwrap_or_else(|| {
        tracing::debug!("Discarding unreadable flash cookie");
        Flash::default()
    });

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}
