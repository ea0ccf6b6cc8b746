//! Global Accelerator resource snapshots and request parameters

use aws_sdk_globalaccelerator::types as sdk;
use serde::Serialize;
use std::collections::BTreeMap;

/// Static IP addresses of one address family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpSet {
    pub ip_family: Option<String>,
    pub ip_addresses: Vec<String>,
}

/// A Global Accelerator accelerator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accelerator {
    pub arn: String,
    pub name: String,
    pub enabled: bool,
    /// `IPV4` or `DUAL_STACK`
    pub ip_address_type: Option<String>,
    pub dns_name: Option<String>,
    pub status: Option<String>,
    pub ip_sets: Vec<IpSet>,
}

impl From<&sdk::Accelerator> for Accelerator {
    fn from(a: &sdk::Accelerator) -> Self {
        Self {
            arn: a.accelerator_arn().unwrap_or_default().to_string(),
            name: a.name().unwrap_or_default().to_string(),
            enabled: a.enabled().unwrap_or(false),
            ip_address_type: a.ip_address_type().map(|t| t.as_str().to_string()),
            dns_name: a.dns_name().map(str::to_string),
            status: a.status().map(|s| s.as_str().to_string()),
            ip_sets: a
                .ip_sets()
                .iter()
                .map(|set| IpSet {
                    ip_family: set.ip_address_family().map(|f| f.as_str().to_string()),
                    ip_addresses: set.ip_addresses().to_vec(),
                })
                .collect(),
        }
    }
}

/// Flow log settings of an accelerator
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcceleratorAttributes {
    pub flow_logs_enabled: bool,
    pub flow_logs_s3_bucket: Option<String>,
    pub flow_logs_s3_prefix: Option<String>,
}

impl From<&sdk::AcceleratorAttributes> for AcceleratorAttributes {
    fn from(a: &sdk::AcceleratorAttributes) -> Self {
        Self {
            flow_logs_enabled: a.flow_logs_enabled().unwrap_or(false),
            flow_logs_s3_bucket: a.flow_logs_s3_bucket().map(str::to_string),
            flow_logs_s3_prefix: a.flow_logs_s3_prefix().map(str::to_string),
        }
    }
}

/// An endpoint group of a listener, pinned to one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointGroup {
    pub arn: String,
    pub region: Option<String>,
    pub traffic_dial_percentage: Option<f32>,
    pub health_check_port: Option<i32>,
    pub health_check_protocol: Option<String>,
    pub health_check_path: Option<String>,
    pub health_check_interval_seconds: Option<i32>,
    pub threshold_count: Option<i32>,
    pub endpoint_ids: Vec<String>,
}

impl From<&sdk::EndpointGroup> for EndpointGroup {
    fn from(g: &sdk::EndpointGroup) -> Self {
        Self {
            arn: g.endpoint_group_arn().unwrap_or_default().to_string(),
            region: g.endpoint_group_region().map(str::to_string),
            traffic_dial_percentage: g.traffic_dial_percentage(),
            health_check_port: g.health_check_port(),
            health_check_protocol: g.health_check_protocol().map(|p| p.as_str().to_string()),
            health_check_path: g.health_check_path().map(str::to_string),
            health_check_interval_seconds: g.health_check_interval_seconds(),
            threshold_count: g.threshold_count(),
            endpoint_ids: g
                .endpoint_descriptions()
                .iter()
                .filter_map(|e| e.endpoint_id().map(str::to_string))
                .collect(),
        }
    }
}

/// One page of a list call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Parameters for creating an accelerator
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAcceleratorInput {
    pub name: String,
    pub ip_address_type: Option<String>,
    pub enabled: bool,
    /// Applied with a separate call once the accelerator is deployed
    pub attributes: Option<AcceleratorAttributes>,
    pub tags: BTreeMap<String, String>,
}

impl CreateAcceleratorInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip_address_type: Some("IPV4".to_string()),
            enabled: true,
            attributes: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_ip_address_type(mut self, ip_address_type: impl Into<String>) -> Self {
        self.ip_address_type = Some(ip_address_type.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_attributes(mut self, attributes: AcceleratorAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Parameters for updating an accelerator in place
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAcceleratorInput {
    pub arn: String,
    pub name: String,
    pub ip_address_type: Option<String>,
    pub enabled: bool,
}

impl UpdateAcceleratorInput {
    /// Start from the accelerator's current settings
    pub fn from_current(accelerator: &Accelerator) -> Self {
        Self {
            arn: accelerator.arn.clone(),
            name: accelerator.name.clone(),
            ip_address_type: accelerator.ip_address_type.clone(),
            enabled: accelerator.enabled,
        }
    }
}
