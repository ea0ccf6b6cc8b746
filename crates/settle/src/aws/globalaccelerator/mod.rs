//! Global Accelerator: accelerators, their attributes and endpoint groups
//!
//! The control plane is global and served from `us-west-2`; see
//! [`AwsContext::globalaccelerator_client`].

pub mod accelerator;
mod finder;
mod operations;
pub mod sweep;
mod types;
mod wait;

pub use finder::{find_accelerator_attributes_by_arn, find_accelerator_by_arn, find_endpoint_group_by_arn};
pub use operations::GlobalAcceleratorOperations;
pub use types::{
    Accelerator, AcceleratorAttributes, CreateAcceleratorInput, EndpointGroup, IpSet, ListPage,
    UpdateAcceleratorInput,
};
pub use wait::{status_accelerator, wait_accelerator_deployed};

use crate::aws::context::AwsContext;
use crate::aws::error::{AwsError, classify_sdk_error};
use aws_sdk_globalaccelerator::Client;
use aws_sdk_globalaccelerator::types::{IpAddressType, Tag};
use tracing::{debug, info};

/// Page size for list calls
const LIST_PAGE_SIZE: i32 = 100;

/// Global Accelerator client wrapper
#[derive(Clone)]
pub struct GlobalAcceleratorClient {
    pub(crate) client: Client,
}

impl GlobalAcceleratorClient {
    /// Create a Global Accelerator client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.globalaccelerator_client(),
        }
    }

    pub async fn describe_accelerator(&self, arn: &str) -> Result<Option<Accelerator>, AwsError> {
        let output = self
            .client
            .describe_accelerator()
            .accelerator_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.accelerator().map(Accelerator::from))
    }

    pub async fn describe_accelerator_attributes(
        &self,
        arn: &str,
    ) -> Result<Option<AcceleratorAttributes>, AwsError> {
        let output = self
            .client
            .describe_accelerator_attributes()
            .accelerator_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output
            .accelerator_attributes()
            .map(AcceleratorAttributes::from))
    }

    pub async fn describe_endpoint_group(&self, arn: &str) -> Result<Option<EndpointGroup>, AwsError> {
        let output = self
            .client
            .describe_endpoint_group()
            .endpoint_group_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.endpoint_group().map(EndpointGroup::from))
    }

    pub async fn create_accelerator(
        &self,
        input: &CreateAcceleratorInput,
    ) -> Result<Accelerator, AwsError> {
        let tags = input
            .tags
            .iter()
            .map(|(k, v)| Tag::builder().key(k).value(v).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AwsError::invalid_input(e.to_string()))?;

        info!(name = %input.name, enabled = input.enabled, "Creating Global Accelerator accelerator");

        let output = self
            .client
            .create_accelerator()
            .name(&input.name)
            .set_ip_address_type(input.ip_address_type.as_deref().map(IpAddressType::from))
            .enabled(input.enabled)
            .idempotency_token(uuid::Uuid::now_v7().to_string())
            .set_tags((!tags.is_empty()).then_some(tags))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        output
            .accelerator()
            .map(Accelerator::from)
            .ok_or_else(|| AwsError::Sdk {
                code: None,
                message: format!("CreateAccelerator returned no accelerator for {}", input.name),
            })
    }

    pub async fn update_accelerator(
        &self,
        input: &UpdateAcceleratorInput,
    ) -> Result<Accelerator, AwsError> {
        info!(arn = %input.arn, enabled = input.enabled, "Updating Global Accelerator accelerator");

        let output = self
            .client
            .update_accelerator()
            .accelerator_arn(&input.arn)
            .name(&input.name)
            .set_ip_address_type(input.ip_address_type.as_deref().map(IpAddressType::from))
            .enabled(input.enabled)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        output
            .accelerator()
            .map(Accelerator::from)
            .ok_or_else(|| AwsError::Sdk {
                code: None,
                message: format!("UpdateAccelerator returned no accelerator for {}", input.arn),
            })
    }

    pub async fn update_accelerator_attributes(
        &self,
        arn: &str,
        attributes: &AcceleratorAttributes,
    ) -> Result<AcceleratorAttributes, AwsError> {
        info!(
            arn = %arn,
            flow_logs_enabled = attributes.flow_logs_enabled,
            "Updating Global Accelerator accelerator attributes"
        );

        let output = self
            .client
            .update_accelerator_attributes()
            .accelerator_arn(arn)
            .flow_logs_enabled(attributes.flow_logs_enabled)
            .set_flow_logs_s3_bucket(attributes.flow_logs_s3_bucket.clone())
            .set_flow_logs_s3_prefix(attributes.flow_logs_s3_prefix.clone())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output
            .accelerator_attributes()
            .map(AcceleratorAttributes::from)
            .unwrap_or_else(|| attributes.clone()))
    }

    pub async fn delete_accelerator(&self, arn: &str) -> Result<(), AwsError> {
        info!(arn = %arn, "Deleting Global Accelerator accelerator");

        self.client
            .delete_accelerator()
            .accelerator_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }

    pub async fn list_accelerators(
        &self,
        next_token: Option<String>,
    ) -> Result<ListPage<Accelerator>, AwsError> {
        let output = self
            .client
            .list_accelerators()
            .max_results(LIST_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(ListPage {
            items: output.accelerators().iter().map(Accelerator::from).collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    pub async fn list_listeners(&self, accelerator_arn: &str) -> Result<Vec<String>, AwsError> {
        let mut listeners = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .client
                .list_listeners()
                .accelerator_arn(accelerator_arn)
                .max_results(LIST_PAGE_SIZE)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| classify_sdk_error(&e))?;

            listeners.extend(
                output
                    .listeners()
                    .iter()
                    .filter_map(|l| l.listener_arn().map(str::to_string)),
            );

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(accelerator = %accelerator_arn, count = listeners.len(), "Listed listeners");
        Ok(listeners)
    }

    pub async fn list_endpoint_groups(
        &self,
        listener_arn: &str,
    ) -> Result<Vec<EndpointGroup>, AwsError> {
        let mut groups = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .client
                .list_endpoint_groups()
                .listener_arn(listener_arn)
                .max_results(LIST_PAGE_SIZE)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| classify_sdk_error(&e))?;

            groups.extend(output.endpoint_groups().iter().map(EndpointGroup::from));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(groups)
    }

    pub async fn delete_listener(&self, arn: &str) -> Result<(), AwsError> {
        info!(arn = %arn, "Deleting Global Accelerator listener");

        self.client
            .delete_listener()
            .listener_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }

    pub async fn delete_endpoint_group(&self, arn: &str) -> Result<(), AwsError> {
        info!(arn = %arn, "Deleting Global Accelerator endpoint group");

        self.client
            .delete_endpoint_group()
            .endpoint_group_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }
}
