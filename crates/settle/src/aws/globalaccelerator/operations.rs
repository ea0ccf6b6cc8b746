//! Global Accelerator operations trait for testing

use super::GlobalAcceleratorClient;
use super::types::{
    Accelerator, AcceleratorAttributes, CreateAcceleratorInput, EndpointGroup, ListPage,
    UpdateAcceleratorInput,
};
use crate::aws::error::AwsError;
use std::future::Future;

/// Trait for Global Accelerator operations that can be mocked in tests.
pub trait GlobalAcceleratorOperations: Send + Sync {
    fn describe_accelerator(
        &self,
        arn: &str,
    ) -> impl Future<Output = Result<Option<Accelerator>, AwsError>> + Send;

    fn describe_accelerator_attributes(
        &self,
        arn: &str,
    ) -> impl Future<Output = Result<Option<AcceleratorAttributes>, AwsError>> + Send;

    fn describe_endpoint_group(
        &self,
        arn: &str,
    ) -> impl Future<Output = Result<Option<EndpointGroup>, AwsError>> + Send;

    fn create_accelerator(
        &self,
        input: &CreateAcceleratorInput,
    ) -> impl Future<Output = Result<Accelerator, AwsError>> + Send;

    fn update_accelerator(
        &self,
        input: &UpdateAcceleratorInput,
    ) -> impl Future<Output = Result<Accelerator, AwsError>> + Send;

    fn update_accelerator_attributes(
        &self,
        arn: &str,
        attributes: &AcceleratorAttributes,
    ) -> impl Future<Output = Result<AcceleratorAttributes, AwsError>> + Send;

    fn delete_accelerator(&self, arn: &str) -> impl Future<Output = Result<(), AwsError>> + Send;

    /// One page of accelerators; pass the previous page's token to continue
    fn list_accelerators(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<ListPage<Accelerator>, AwsError>> + Send;

    /// ARNs of every listener of an accelerator
    fn list_listeners(
        &self,
        accelerator_arn: &str,
    ) -> impl Future<Output = Result<Vec<String>, AwsError>> + Send;

    fn list_endpoint_groups(
        &self,
        listener_arn: &str,
    ) -> impl Future<Output = Result<Vec<EndpointGroup>, AwsError>> + Send;

    fn delete_listener(&self, arn: &str) -> impl Future<Output = Result<(), AwsError>> + Send;

    fn delete_endpoint_group(&self, arn: &str)
    -> impl Future<Output = Result<(), AwsError>> + Send;
}

impl GlobalAcceleratorOperations for GlobalAcceleratorClient {
    async fn describe_accelerator(&self, arn: &str) -> Result<Option<Accelerator>, AwsError> {
        GlobalAcceleratorClient::describe_accelerator(self, arn).await
    }

    async fn describe_accelerator_attributes(
        &self,
        arn: &str,
    ) -> Result<Option<AcceleratorAttributes>, AwsError> {
        GlobalAcceleratorClient::describe_accelerator_attributes(self, arn).await
    }

    async fn describe_endpoint_group(&self, arn: &str) -> Result<Option<EndpointGroup>, AwsError> {
        GlobalAcceleratorClient::describe_endpoint_group(self, arn).await
    }

    async fn create_accelerator(
        &self,
        input: &CreateAcceleratorInput,
    ) -> Result<Accelerator, AwsError> {
        GlobalAcceleratorClient::create_accelerator(self, input).await
    }

    async fn update_accelerator(
        &self,
        input: &UpdateAcceleratorInput,
    ) -> Result<Accelerator, AwsError> {
        GlobalAcceleratorClient::update_accelerator(self, input).await
    }

    async fn update_accelerator_attributes(
        &self,
        arn: &str,
        attributes: &AcceleratorAttributes,
    ) -> Result<AcceleratorAttributes, AwsError> {
        GlobalAcceleratorClient::update_accelerator_attributes(self, arn, attributes).await
    }

    async fn delete_accelerator(&self, arn: &str) -> Result<(), AwsError> {
        GlobalAcceleratorClient::delete_accelerator(self, arn).await
    }

    async fn list_accelerators(
        &self,
        next_token: Option<String>,
    ) -> Result<ListPage<Accelerator>, AwsError> {
        GlobalAcceleratorClient::list_accelerators(self, next_token).await
    }

    async fn list_listeners(&self, accelerator_arn: &str) -> Result<Vec<String>, AwsError> {
        GlobalAcceleratorClient::list_listeners(self, accelerator_arn).await
    }

    async fn list_endpoint_groups(&self, listener_arn: &str) -> Result<Vec<EndpointGroup>, AwsError> {
        GlobalAcceleratorClient::list_endpoint_groups(self, listener_arn).await
    }

    async fn delete_listener(&self, arn: &str) -> Result<(), AwsError> {
        GlobalAcceleratorClient::delete_listener(self, arn).await
    }

    async fn delete_endpoint_group(&self, arn: &str) -> Result<(), AwsError> {
        GlobalAcceleratorClient::delete_endpoint_group(self, arn).await
    }
}
