//! Global Accelerator lookups by ARN

use super::operations::GlobalAcceleratorOperations;
use super::types::{Accelerator, AcceleratorAttributes, EndpointGroup};
use crate::finder::{normalize_lookup, require_id};
use crate::outcome::FindError;

/// Returns [`FindError::NotFound`] if no accelerator has this ARN.
pub async fn find_accelerator_by_arn<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
) -> Result<Accelerator, FindError> {
    require_id(arn)?;
    normalize_lookup(
        ops.describe_accelerator(arn).await,
        format!("DescribeAccelerator(accelerator_arn={arn})"),
    )
}

/// Returns [`FindError::NotFound`] if no accelerator has this ARN.
pub async fn find_accelerator_attributes_by_arn<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
) -> Result<AcceleratorAttributes, FindError> {
    require_id(arn)?;
    normalize_lookup(
        ops.describe_accelerator_attributes(arn).await,
        format!("DescribeAcceleratorAttributes(accelerator_arn={arn})"),
    )
}

/// Returns [`FindError::NotFound`] if no endpoint group has this ARN, the
/// same way the accelerator finders do.
pub async fn find_endpoint_group_by_arn<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
) -> Result<EndpointGroup, FindError> {
    require_id(arn)?;
    normalize_lookup(
        ops.describe_endpoint_group(arn).await,
        format!("DescribeEndpointGroup(endpoint_group_arn={arn})"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::classify_aws_error;
    use crate::testing::{MockGlobalAccelerator, accelerator_fixture};

    const ARN: &str = "arn:aws:globalaccelerator::123456789012:accelerator/1234abcd";

    #[tokio::test]
    async fn test_accelerator_found() {
        let mock = MockGlobalAccelerator::default();
        mock.put_accelerator(accelerator_fixture(ARN, "DEPLOYED", true));

        let accelerator = find_accelerator_by_arn(&mock, ARN).await.unwrap();
        assert_eq!(accelerator.arn, ARN);
        assert!(accelerator.enabled);
    }

    #[tokio::test]
    async fn test_accelerator_not_found_keeps_error_and_request() {
        let mock = MockGlobalAccelerator::default();

        let err = find_accelerator_by_arn(&mock, ARN).await.unwrap_err();
        match err {
            FindError::NotFound(nf) => {
                assert!(nf.last_error.unwrap().is_not_found());
                assert!(nf.last_request.unwrap().starts_with("DescribeAccelerator("));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attributes_empty_payload() {
        let mock = MockGlobalAccelerator::default();
        mock.put_accelerator(accelerator_fixture(ARN, "DEPLOYED", true));
        mock.set_empty_attributes(ARN);

        let err = find_accelerator_attributes_by_arn(&mock, ARN).await.unwrap_err();
        assert_eq!(err.to_string(), "Empty result");
    }

    #[tokio::test]
    async fn test_endpoint_group_not_found_is_normalised() {
        let mock = MockGlobalAccelerator::default();
        mock.fail_next(classify_aws_error(
            Some("EndpointGroupNotFoundException"),
            Some("no such group"),
        ));

        let err = find_endpoint_group_by_arn(&mock, "arn:eg").await.unwrap_err();
        assert!(matches!(err, FindError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_access_denied_passes_through() {
        let mock = MockGlobalAccelerator::default();
        mock.fail_next(classify_aws_error(Some("AccessDeniedException"), Some("denied")));

        let err = find_accelerator_by_arn(&mock, ARN).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(!err.is_transient());
    }
}
