//! QR code links.
//!
//! Links point at the app's signup page. The QR image itself is rendered by an
//! external service: we only build the image URL with the link as its `data`
//! parameter. Nothing is persisted.

use serde::Serialize;
use url::Url;

use loyalty_core::{BusinessId, ClassId};

use crate::config::QrConfig;

/// Referral codes are 4 to 32 characters from `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_referral_code(code: &str) -> bool {
    (4..=32).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// A link and the URL of its rendered QR image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub link: String,
    pub image_url: String,
}

/// Builds signup links and QR image URLs.
#[derive(Debug, Clone)]
pub struct QrLinkService {
    signup_url: Url,
    service_url: Url,
    image_size: u32,
}

impl QrLinkService {
    /// Create a service for the given app base URL.
    #[must_use]
    pub fn new(app_base_url: &Url, qr: &QrConfig) -> Self {
        let mut signup_url = app_base_url.clone();
        let path = format!("{}/signup", app_base_url.path().trim_end_matches('/'));
        signup_url.set_path(&path);
        signup_url.set_query(None);
        signup_url.set_fragment(None);

        Self {
            signup_url,
            service_url: qr.service_url.clone(),
            image_size: qr.image_size,
        }
    }

    /// Signup link that enrolls the new user into a class.
    #[must_use]
    pub fn class_signup(&self, business_id: &BusinessId, class_id: &ClassId) -> QrCode {
        let mut link = self.signup_url.clone();
        link.query_pairs_mut()
            .append_pair("businessId", business_id.as_str())
            .append_pair("classId", class_id.as_str());
        self.code_for(&link)
    }

    /// Signup link carrying a referral code. The code must already be validated.
    #[must_use]
    pub fn referral(&self, code: &str) -> QrCode {
        let mut link = self.signup_url.clone();
        link.query_pairs_mut().append_pair("ref", code);
        self.code_for(&link)
    }

    /// URL of the rendered QR image for `link`.
    #[must_use]
    pub fn image_url(&self, link: &Url) -> Url {
        let mut url = self.service_url.clone();
        url.query_pairs_mut()
            .append_pair("size", &format!("{0}x{0}", self.image_size))
            .append_pair("data", link.as_str());
        url
    }

    fn code_for(&self, link: &Url) -> QrCode {
        QrCode {
            link: link.to_string(),
            image_url: self.image_url(link).to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(base: &str) -> QrLinkService {
        QrLinkService::new(
            &Url::parse(base).unwrap(),
            &QrConfig {
                service_url: Url::parse("https://api.qrserver.com/v1/create-qr-code/").unwrap(),
                image_size: 300,
            },
        )
    }

    #[test]
    fn test_class_signup_link() {
        let code = service("https://app.example.com").class_signup(
            &BusinessId::parse("BIZ0001").unwrap(),
            &ClassId::parse("CLASS000042").unwrap(),
        );

        assert_eq!(
            code.link,
            "https://app.example.com/signup?businessId=BIZ0001&classId=CLASS000042"
        );
        assert_eq!(
            code.image_url,
            "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data=\
             https%3A%2F%2Fapp.example.com%2Fsignup%3FbusinessId%3DBIZ0001%26classId%3DCLASS000042"
        );
    }

    #[test]
    fn test_referral_link() {
        let code = service("https://app.example.com/").referral("friend_2024");
        assert_eq!(code.link, "https://app.example.com/signup?ref=friend_2024");
        assert!(code.image_url.contains("data=https%3A%2F%2Fapp.example.com%2Fsignup%3Fref%3Dfriend_2024"));
    }

    #[test]
    fn test_base_path_is_kept() {
        let code = service("https://example.com/loyalty/?utm=x#top").referral("abcd");
        assert_eq!(code.link, "https://example.com/loyalty/signup?ref=abcd");
    }

    #[test]
    fn test_referral_code_rules() {
        assert!(is_valid_referral_code("abcd"));
        assert!(is_valid_referral_code("A-b_9"));
        assert!(is_valid_referral_code(&"x".repeat(32)));
        assert!(!is_valid_referral_code("abc"));
        assert!(!is_valid_referral_code(&"x".repeat(33)));
        assert!(!is_valid_referral_code("has space"));
        assert!(!is_valid_referral_code("caf\u{e9}1"));
    }
}
