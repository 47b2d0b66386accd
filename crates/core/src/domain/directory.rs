//! Directory records as returned to the agent. Field names mirror the directory
//! service so the agent sees the same keys it would from the service itself.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRecord {
    #[serde(rename = "SAMAccountName")]
    pub sam_account_name: String,
    #[serde(rename = "SID", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(rename = "SAMAccountName")]
    pub sam_account_name: String,
    #[serde(rename = "SID", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinguished_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupRecord {
    #[serde(rename = "SAMAccountName")]
    pub sam_account_name: String,
    #[serde(rename = "SID", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{GroupRecord, UserRecord};

    #[test]
    fn user_record_uses_directory_field_names() {
        let record = UserRecord {
            sam_account_name: "jdoe".to_string(),
            sid: Some("S-1-5-21-1000".to_string()),
            given_name: Some("Jane".to_string()),
            surname: None,
            enabled: Some(true),
        };

        assert_eq!(
            serde_json::to_value(&record).expect("record should serialize"),
            json!({
                "SAMAccountName": "jdoe",
                "SID": "S-1-5-21-1000",
                "GivenName": "Jane",
                "Enabled": true
            })
        );
    }

    #[test]
    fn group_record_omits_unknown_scope() {
        let record = GroupRecord {
            sam_account_name: "Domain Admins".to_string(),
            sid: None,
            group_type: Some("Security".to_string()),
            group_scope: None,
        };

        assert_eq!(
            serde_json::to_string(&record).expect("record should serialize"),
            r#"{"SAMAccountName":"Domain Admins","GroupType":"Security"}"#
        );
    }
}
