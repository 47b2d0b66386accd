use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_directoryservicedata::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_directoryservicedata::Client;

use adbridge_adapters::backend::DirectoryService;
use adbridge_core::domain::directory::{GroupRecord, UserDetails, UserRecord};
use adbridge_core::errors::DirectoryServiceError;

use crate::fields::{FieldFlag, FieldText};

/// Reads directory users and groups through Directory Service Data. Only the first
/// page of each listing is returned.
#[derive(Clone, Debug)]
pub struct DirectoryDataService {
    client: Client,
}

impl DirectoryDataService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl DirectoryService for DirectoryDataService {
    async fn list_users(
        &self,
        directory_id: &str,
    ) -> Result<Vec<UserRecord>, DirectoryServiceError> {
        let output = self
            .client
            .list_users()
            .directory_id(directory_id)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output
            .users()
            .iter()
            .map(|user| UserRecord {
                sam_account_name: user.sam_account_name().text().unwrap_or_default(),
                sid: user.sid().text(),
                given_name: user.given_name().text(),
                surname: user.surname().text(),
                enabled: user.enabled().flag(),
            })
            .collect())
    }

    async fn describe_user(
        &self,
        directory_id: &str,
        account_name: &str,
    ) -> Result<UserDetails, DirectoryServiceError> {
        let output = self
            .client
            .describe_user()
            .directory_id(directory_id)
            .sam_account_name(account_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(UserDetails {
            directory_id: output.directory_id().text(),
            realm: output.realm().text(),
            sam_account_name: output
                .sam_account_name()
                .text()
                .unwrap_or_else(|| account_name.to_string()),
            sid: output.sid().text(),
            distinguished_name: output.distinguished_name().text(),
            user_principal_name: output.user_principal_name().text(),
            email_address: output.email_address().text(),
            given_name: output.given_name().text(),
            surname: output.surname().text(),
            enabled: output.enabled().flag(),
        })
    }

    async fn list_groups_for_member(
        &self,
        directory_id: &str,
        account_name: &str,
    ) -> Result<Vec<GroupRecord>, DirectoryServiceError> {
        let output = self
            .client
            .list_groups_for_member()
            .directory_id(directory_id)
            .sam_account_name(account_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output
            .groups()
            .iter()
            .map(|group| GroupRecord {
                sam_account_name: group.sam_account_name().text().unwrap_or_default(),
                sid: group.sid().text(),
                group_type: group.group_type().text(),
                group_scope: group.group_scope().text(),
            })
            .collect())
    }
}

/// Modeled service responses keep their message; anything that never produced a
/// service response is a transport failure.
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> DirectoryServiceError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug + 'static,
{
    match err {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            DirectoryServiceError::Service {
                code: service_error.code().map(str::to_string),
                message: service_error.message().unwrap_or_default().to_string(),
            }
        }
        other => DirectoryServiceError::Transport(DisplayErrorContext(&other).to_string()),
    }
}
