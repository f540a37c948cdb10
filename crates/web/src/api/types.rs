//! Request and response bodies of the vendor service.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use street_bite_core::{Role, User, VendorId};

/// Sign-up payload for `POST /users/register`.
#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub role: Role,
}

/// Sign-in payload for `POST /users/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Returned by both login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    /// Registration may not issue a token.
    #[serde(default)]
    pub token: Option<String>,
}

/// A vendor registration as echoed back by the vendor service.
///
/// Only the fields the owner typed in are guaranteed; the listing fields
/// (menu, ratings, schedules) are filled in later on the service side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    #[serde(default, alias = "_id")]
    pub id: Option<VendorId>,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub menu_image: Option<String>,
}

impl VendorSummary {
    /// "123 Main St, Austin, TX 78701", skipping blank parts.
    #[must_use]
    pub fn full_address(&self) -> String {
        let state_zip = [self.state.trim(), self.zip_code.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [self.address.trim(), self.city.trim(), state_zip.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Error body the service sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}

/// Some endpoints answer with a bare object, others with an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_serialize_password_but_debug_hides_it() {
        let credentials = LoginCredentials {
            email: "sarah.j@example.com".to_string(),
            password: SecretString::from("hunter22"),
        };
        let json = serde_json::to_value(&credentials).unwrap();
        assert_eq!(json["password"], "hunter22");
        assert!(!format!("{credentials:?}").contains("hunter22"));
    }

    #[test]
    fn test_user_data_role_is_lowercase() {
        let data = UserData {
            name: "Mike Peterson".to_string(),
            email: "mike.p@example.com".to_string(),
            password: SecretString::from("pw"),
            role: Role::Vendor,
        };
        assert_eq!(serde_json::to_value(&data).unwrap()["role"], "vendor");
    }

    #[test]
    fn test_summary_accepts_mongo_ids_and_missing_fields() {
        let summary: VendorSummary = serde_json::from_str(
            r#"{"_id":"64f0","businessName":"Taco Loco","city":"Austin","state":"TX","zipCode":"78701"}"#,
        )
        .unwrap();
        assert_eq!(summary.id.as_ref().unwrap().as_str(), "64f0");
        assert_eq!(summary.full_address(), "Austin, TX 78701");
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<VendorSummary> = serde_json::from_str(r#"{"businessName":"A"}"#).unwrap();
        assert_eq!(one.into_vec().len(), 1);
        let many: OneOrMany<VendorSummary> =
            serde_json::from_str(r#"[{"businessName":"A"},{"businessName":"B"}]"#).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }
}
