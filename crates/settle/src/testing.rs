//! Test support: scripted poll outcomes and in-memory service mocks
//!
//! Available to unit tests and, with the `testing` feature, to integration
//! tests of downstream crates.

use crate::aws::classify_aws_error;
use crate::aws::error::AwsError;
use crate::aws::globalaccelerator::{
    Accelerator, AcceleratorAttributes, CreateAcceleratorInput, EndpointGroup,
    GlobalAcceleratorOperations, ListPage, UpdateAcceleratorInput,
};
use crate::aws::memorydb::{
    Acl, Cluster, ClusterConfiguration, CreateSnapshotInput, MemoryDbOperations, Snapshot, User,
};
use crate::aws::xray::{EncryptionConfig, EncryptionType, XRayOperations};
use crate::outcome::PollOutcome;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::{Future, ready};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

type Factory<S, G> = Box<dyn Fn() -> PollOutcome<S, G> + Send + Sync>;

/// Replays a fixed sequence of poll outcomes and counts how often it was asked.
///
/// Panics when the script runs out, so a test fails loudly if the waiter
/// polls more often than expected.
pub struct ScriptedFinder<S, G> {
    script: Mutex<VecDeque<PollOutcome<S, G>>>,
    fallback: Option<Factory<S, G>>,
    calls: AtomicU32,
}

impl<S, G> ScriptedFinder<S, G> {
    pub fn new(outcomes: impl IntoIterator<Item = PollOutcome<S, G>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            fallback: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Produce a fresh outcome on every call, forever
    pub fn repeating(factory: impl Fn() -> PollOutcome<S, G> + Send + Sync + 'static) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(Box::new(factory)),
            calls: AtomicU32::new(0),
        }
    }

    /// The next outcome
    pub fn next(&self) -> impl Future<Output = PollOutcome<S, G>> + use<S, G> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let scripted = self.script.lock().unwrap().pop_front();
        let outcome = match (scripted, &self.fallback) {
            (Some(outcome), _) => outcome,
            (None, Some(factory)) => factory(),
            (None, None) => panic!("scripted finder exhausted at call {call}"),
        };
        ready(outcome)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Scripted outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

/// A resource's observable states over time.
///
/// Each describe consumes the front entry; the last entry repeats forever.
/// `None` means the resource does not exist.
#[derive(Debug)]
struct Timeline<T>(VecDeque<Option<T>>);

impl<T: Clone> Timeline<T> {
    fn steady(value: Option<T>) -> Self {
        Self(VecDeque::from([value]))
    }

    fn scripted(states: impl IntoIterator<Item = Option<T>>) -> Self {
        let states: VecDeque<_> = states.into_iter().collect();
        assert!(!states.is_empty(), "timeline needs at least one state");
        Self(states)
    }

    fn observe(&mut self) -> Option<T> {
        if self.0.len() > 1 {
            self.0.pop_front().flatten()
        } else {
            self.0.front().cloned().flatten()
        }
    }

    /// The state the resource settles into
    fn settled(&self) -> Option<&T> {
        self.0.back().and_then(Option::as_ref)
    }
}

fn timeline_observe<T: Clone>(timelines: &mut HashMap<String, Timeline<T>>, key: &str) -> Option<T> {
    timelines.get_mut(key).and_then(Timeline::observe)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn acl_fixture(name: &str, status: &str) -> Acl {
    Acl {
        name: name.to_string(),
        arn: Some(format!("arn:aws:memorydb:us-east-1:123456789012:acl/{name}")),
        status: Some(status.to_string()),
        user_names: vec!["default".to_string()],
        clusters: Vec::new(),
        minimum_engine_version: Some("6.2".to_string()),
    }
}

pub fn cluster_fixture(name: &str, status: &str) -> Cluster {
    Cluster {
        name: name.to_string(),
        arn: Some(format!("arn:aws:memorydb:us-east-1:123456789012:cluster/{name}")),
        status: Some(status.to_string()),
        node_type: Some("db.t4g.small".to_string()),
        engine_version: Some("7.0".to_string()),
        acl_name: Some("open-access".to_string()),
        number_of_shards: Some(1),
        parameter_group_name: Some("default.memorydb-redis7".to_string()),
        parameter_group_status: Some("in-sync".to_string()),
        security_groups: Vec::new(),
        shards: Vec::new(),
        sns_topic_arn: None,
        sns_topic_status: None,
    }
}

pub fn snapshot_fixture(name: &str, status: &str) -> Snapshot {
    Snapshot {
        name: name.to_string(),
        arn: Some(format!("arn:aws:memorydb:us-east-1:123456789012:snapshot/{name}")),
        status: Some(status.to_string()),
        source: Some("manual".to_string()),
        kms_key_id: None,
        cluster_configuration: Some(ClusterConfiguration {
            name: Some("cluster-1".to_string()),
            node_type: Some("db.t4g.small".to_string()),
            engine_version: Some("7.0".to_string()),
            num_shards: Some(1),
            port: Some(6379),
            ..Default::default()
        }),
    }
}

pub fn user_fixture(name: &str, status: &str) -> User {
    User {
        name: name.to_string(),
        arn: Some(format!("arn:aws:memorydb:us-east-1:123456789012:user/{name}")),
        status: Some(status.to_string()),
        access_string: Some("on ~* &* +@all".to_string()),
        acl_names: Vec::new(),
        minimum_engine_version: Some("6.2".to_string()),
    }
}

pub fn accelerator_fixture(arn: &str, status: &str, enabled: bool) -> Accelerator {
    Accelerator {
        arn: arn.to_string(),
        name: arn.rsplit('/').next().unwrap_or(arn).to_string(),
        enabled,
        ip_address_type: Some("IPV4".to_string()),
        dns_name: Some("a1234567890abcdef.awsglobalaccelerator.com".to_string()),
        status: Some(status.to_string()),
        ip_sets: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// MemoryDB
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryDbState {
    acls: HashMap<String, Timeline<Acl>>,
    clusters: HashMap<String, Timeline<Cluster>>,
    snapshots: HashMap<String, Timeline<Snapshot>>,
    users: HashMap<String, Timeline<User>>,
    failures: VecDeque<AwsError>,
    describe_calls: u32,
    created: Vec<CreateSnapshotInput>,
    deleted: Vec<String>,
}

/// In-memory MemoryDB.
///
/// Unknown names describe as an empty list. New snapshots go `creating`
/// then `available`; deleted ones go `deleting` then disappear.
#[derive(Debug, Default)]
pub struct MockMemoryDb {
    state: Mutex<MemoryDbState>,
}

impl MockMemoryDb {
    pub fn put_acl(&self, acl: Acl) {
        let mut state = self.state.lock().unwrap();
        state.acls.insert(acl.name.clone(), Timeline::steady(Some(acl)));
    }

    pub fn put_cluster(&self, cluster: Cluster) {
        let mut state = self.state.lock().unwrap();
        state
            .clusters
            .insert(cluster.name.clone(), Timeline::steady(Some(cluster)));
    }

    pub fn put_snapshot(&self, snapshot: Snapshot) {
        let mut state = self.state.lock().unwrap();
        state
            .snapshots
            .insert(snapshot.name.clone(), Timeline::steady(Some(snapshot)));
    }

    pub fn put_user(&self, user: User) {
        let mut state = self.state.lock().unwrap();
        state.users.insert(user.name.clone(), Timeline::steady(Some(user)));
    }

    pub fn script_cluster(&self, name: &str, states: impl IntoIterator<Item = Option<Cluster>>) {
        let mut state = self.state.lock().unwrap();
        state
            .clusters
            .insert(name.to_string(), Timeline::scripted(states));
    }

    pub fn script_snapshot(&self, name: &str, states: impl IntoIterator<Item = Option<Snapshot>>) {
        let mut state = self.state.lock().unwrap();
        state
            .snapshots
            .insert(name.to_string(), Timeline::scripted(states));
    }

    /// Fail the next call, whatever it is
    pub fn fail_next(&self, err: AwsError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    pub fn describe_calls(&self) -> u32 {
        self.state.lock().unwrap().describe_calls
    }

    pub fn created(&self) -> Vec<CreateSnapshotInput> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    fn describe<T: Clone>(
        &self,
        name: &str,
        select: impl FnOnce(&mut MemoryDbState) -> &mut HashMap<String, Timeline<T>>,
    ) -> Result<Option<T>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.describe_calls += 1;
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        Ok(timeline_observe(select(&mut *state), name))
    }
}

impl MemoryDbOperations for MockMemoryDb {
    async fn describe_acl(&self, name: &str) -> Result<Option<Acl>, AwsError> {
        self.describe(name, |s| &mut s.acls)
    }

    async fn describe_cluster(&self, name: &str) -> Result<Option<Cluster>, AwsError> {
        self.describe(name, |s| &mut s.clusters)
    }

    async fn describe_snapshot(&self, name: &str) -> Result<Option<Snapshot>, AwsError> {
        self.describe(name, |s| &mut s.snapshots)
    }

    async fn describe_user(&self, name: &str) -> Result<Option<User>, AwsError> {
        self.describe(name, |s| &mut s.users)
    }

    async fn create_snapshot(&self, input: CreateSnapshotInput) -> Result<Snapshot, AwsError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }

        let snapshot_for = |status: &str| {
            let mut snapshot = snapshot_fixture(&input.snapshot_name, status);
            snapshot.kms_key_id = input.kms_key_id.clone();
            if let Some(config) = snapshot.cluster_configuration.as_mut() {
                config.name = Some(input.cluster_name.clone());
            }
            snapshot
        };
        let creating = snapshot_for("creating");
        let available = snapshot_for("available");

        state.snapshots.insert(
            input.snapshot_name.clone(),
            Timeline::scripted([Some(creating.clone()), Some(available)]),
        );
        state.created.push(input);
        Ok(creating)
    }

    async fn delete_snapshot(&self, name: &str) -> Result<(), AwsError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }

        let Some(current) = state.snapshots.get(name).and_then(|t| t.settled().cloned()) else {
            return Err(classify_aws_error(
                Some("SnapshotNotFoundFault"),
                Some(&format!("Snapshot {name} not found")),
            ));
        };

        let mut deleting = current;
        deleting.status = Some("deleting".to_string());
        state
            .snapshots
            .insert(name.to_string(), Timeline::scripted([Some(deleting), None]));
        state.deleted.push(name.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Global Accelerator
// ---------------------------------------------------------------------------

/// Page size of [`MockGlobalAccelerator::list_accelerators`], small to exercise pagination
const MOCK_PAGE_SIZE: usize = 2;

#[derive(Debug, Default)]
struct GlobalAcceleratorState {
    accelerators: BTreeMap<String, Timeline<Accelerator>>,
    /// `None` means the service answers with an empty payload
    attributes: HashMap<String, Option<AcceleratorAttributes>>,
    listeners: HashMap<String, Vec<String>>,
    endpoint_groups: HashMap<String, Vec<EndpointGroup>>,
    failures: VecDeque<AwsError>,
    /// One-shot failures keyed by the ARN the call targets
    failures_on: HashMap<String, AwsError>,
    calls: Vec<&'static str>,
}

impl GlobalAcceleratorState {
    fn take_failure(&mut self) -> Result<(), AwsError> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn take_failure_on(&mut self, arn: &str) -> Result<(), AwsError> {
        self.take_failure()?;
        match self.failures_on.remove(arn) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn settled(&self, arn: &str) -> Result<Accelerator, AwsError> {
        self.accelerators
            .get(arn)
            .and_then(|t| t.settled().cloned())
            .ok_or_else(|| not_found("AcceleratorNotFoundException", arn))
    }

    /// Record a change: the accelerator reports `IN_PROGRESS` once, then `DEPLOYED`
    fn propagate(&mut self, accelerator: Accelerator) {
        let mut in_progress = accelerator.clone();
        in_progress.status = Some("IN_PROGRESS".to_string());
        let mut deployed = accelerator;
        deployed.status = Some("DEPLOYED".to_string());
        self.accelerators.insert(
            deployed.arn.clone(),
            Timeline::scripted([Some(in_progress), Some(deployed)]),
        );
    }
}

fn not_found(code: &str, arn: &str) -> AwsError {
    classify_aws_error(Some(code), Some(&format!("{arn} not found")))
}

/// In-memory Global Accelerator that enforces the service's deletion
/// preconditions: no listeners, disabled.
#[derive(Debug, Default)]
pub struct MockGlobalAccelerator {
    state: Mutex<GlobalAcceleratorState>,
}

impl MockGlobalAccelerator {
    pub fn put_accelerator(&self, accelerator: Accelerator) {
        let mut state = self.state.lock().unwrap();
        state
            .attributes
            .insert(accelerator.arn.clone(), Some(AcceleratorAttributes::default()));
        state
            .accelerators
            .insert(accelerator.arn.clone(), Timeline::steady(Some(accelerator)));
    }

    pub fn script_accelerator(
        &self,
        arn: &str,
        states: impl IntoIterator<Item = Option<Accelerator>>,
    ) {
        let mut state = self.state.lock().unwrap();
        state
            .attributes
            .insert(arn.to_string(), Some(AcceleratorAttributes::default()));
        state
            .accelerators
            .insert(arn.to_string(), Timeline::scripted(states));
    }

    /// Make attribute lookups succeed with no payload
    pub fn set_empty_attributes(&self, arn: &str) {
        self.state
            .lock()
            .unwrap()
            .attributes
            .insert(arn.to_string(), None);
    }

    pub fn add_listener(&self, accelerator_arn: &str, listener_arn: &str, endpoint_groups: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state
            .listeners
            .entry(accelerator_arn.to_string())
            .or_default()
            .push(listener_arn.to_string());
        state.endpoint_groups.insert(
            listener_arn.to_string(),
            endpoint_groups
                .iter()
                .map(|arn| EndpointGroup {
                    arn: arn.to_string(),
                    region: Some("us-east-1".to_string()),
                    traffic_dial_percentage: Some(100.0),
                    health_check_port: Some(80),
                    health_check_protocol: Some("TCP".to_string()),
                    health_check_path: None,
                    health_check_interval_seconds: Some(30),
                    threshold_count: Some(3),
                    endpoint_ids: Vec::new(),
                })
                .collect(),
        );
    }

    pub fn fail_next(&self, err: AwsError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    /// Fail the next call that targets `arn`
    pub fn fail_on(&self, arn: &str, err: AwsError) {
        self.state
            .lock()
            .unwrap()
            .failures_on
            .insert(arn.to_string(), err);
    }

    /// Mutating calls, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn accelerator_count(&self) -> usize {
        self.state.lock().unwrap().accelerators.len()
    }
}

impl GlobalAcceleratorOperations for MockGlobalAccelerator {
    async fn describe_accelerator(&self, arn: &str) -> Result<Option<Accelerator>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;
        match state.accelerators.get_mut(arn).map(Timeline::observe) {
            Some(Some(accelerator)) => Ok(Some(accelerator)),
            _ => Err(not_found("AcceleratorNotFoundException", arn)),
        }
    }

    async fn describe_accelerator_attributes(
        &self,
        arn: &str,
    ) -> Result<Option<AcceleratorAttributes>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;
        state.settled(arn)?;
        Ok(state.attributes.get(arn).cloned().flatten())
    }

    async fn describe_endpoint_group(&self, arn: &str) -> Result<Option<EndpointGroup>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;
        state
            .endpoint_groups
            .values()
            .flatten()
            .find(|g| g.arn == arn)
            .cloned()
            .map(Some)
            .ok_or_else(|| not_found("EndpointGroupNotFoundException", arn))
    }

    async fn create_accelerator(
        &self,
        input: &CreateAcceleratorInput,
    ) -> Result<Accelerator, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;
        state.calls.push("create");

        let arn = format!(
            "arn:aws:globalaccelerator::123456789012:accelerator/{}",
            input.name
        );
        let mut accelerator = accelerator_fixture(&arn, "IN_PROGRESS", input.enabled);
        accelerator.name = input.name.clone();
        accelerator.ip_address_type = input.ip_address_type.clone();

        state
            .attributes
            .insert(arn.clone(), Some(AcceleratorAttributes::default()));
        state.propagate(accelerator.clone());
        Ok(accelerator)
    }

    async fn update_accelerator(
        &self,
        input: &UpdateAcceleratorInput,
    ) -> Result<Accelerator, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure_on(&input.arn)?;
        let mut accelerator = state.settled(&input.arn)?;
        state.calls.push("update");

        accelerator.name = input.name.clone();
        accelerator.ip_address_type = input.ip_address_type.clone();
        accelerator.enabled = input.enabled;
        state.propagate(accelerator.clone());
        accelerator.status = Some("IN_PROGRESS".to_string());
        Ok(accelerator)
    }

    async fn update_accelerator_attributes(
        &self,
        arn: &str,
        attributes: &AcceleratorAttributes,
    ) -> Result<AcceleratorAttributes, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;
        let accelerator = state.settled(arn)?;
        state.calls.push("update_attributes");

        state
            .attributes
            .insert(arn.to_string(), Some(attributes.clone()));
        state.propagate(accelerator);
        Ok(attributes.clone())
    }

    async fn delete_accelerator(&self, arn: &str) -> Result<(), AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure_on(arn)?;
        let accelerator = state.settled(arn)?;

        if accelerator.enabled {
            return Err(classify_aws_error(
                Some("AcceleratorNotDisabledException"),
                Some("The accelerator must be disabled"),
            ));
        }
        if state.listeners.get(arn).is_some_and(|l| !l.is_empty()) {
            return Err(classify_aws_error(
                Some("AssociatedListenerFoundException"),
                Some("The accelerator has listeners"),
            ));
        }

        state.calls.push("delete");
        state.accelerators.remove(arn);
        state.attributes.remove(arn);
        Ok(())
    }

    async fn list_accelerators(
        &self,
        next_token: Option<String>,
    ) -> Result<ListPage<Accelerator>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;

        let start: usize = next_token.as_deref().map_or(0, |t| t.parse().unwrap_or(0));
        let all: Vec<Accelerator> = state
            .accelerators
            .values()
            .filter_map(|t| t.settled().cloned())
            .collect();
        let end = (start + MOCK_PAGE_SIZE).min(all.len());

        Ok(ListPage {
            items: all.get(start..end).map(<[_]>::to_vec).unwrap_or_default(),
            next_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn list_listeners(&self, accelerator_arn: &str) -> Result<Vec<String>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure()?;
        Ok(state.listeners.get(accelerator_arn).cloned().unwrap_or_default())
    }

    async fn list_endpoint_groups(&self, listener_arn: &str) -> Result<Vec<EndpointGroup>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure_on(listener_arn)?;
        Ok(state
            .endpoint_groups
            .get(listener_arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_listener(&self, arn: &str) -> Result<(), AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure_on(arn)?;

        if state.endpoint_groups.get(arn).is_some_and(|g| !g.is_empty()) {
            return Err(classify_aws_error(
                Some("AssociatedEndpointGroupFoundException"),
                Some("The listener has endpoint groups"),
            ));
        }

        let mut found = false;
        for listeners in state.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|l| l != arn);
            found |= listeners.len() != before;
        }
        if !found {
            return Err(not_found("ListenerNotFoundException", arn));
        }

        state.calls.push("delete_listener");
        state.endpoint_groups.remove(arn);
        Ok(())
    }

    async fn delete_endpoint_group(&self, arn: &str) -> Result<(), AwsError> {
        let mut state = self.state.lock().unwrap();
        state.take_failure_on(arn)?;

        let mut found = false;
        for groups in state.endpoint_groups.values_mut() {
            let before = groups.len();
            groups.retain(|g| g.arn != arn);
            found |= groups.len() != before;
        }
        if !found {
            return Err(not_found("EndpointGroupNotFoundException", arn));
        }

        state.calls.push("delete_endpoint_group");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// X-Ray
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct XRayState {
    config: Timeline<EncryptionConfig>,
    stuck: bool,
    gets: u32,
    puts: u32,
}

/// In-memory X-Ray encryption configuration, starting as `NONE`/`ACTIVE`.
///
/// A put reports `UPDATING` once before settling on `ACTIVE`.
#[derive(Debug)]
pub struct MockXRay {
    state: Mutex<XRayState>,
}

impl Default for MockXRay {
    fn default() -> Self {
        Self {
            state: Mutex::new(XRayState {
                config: Timeline::steady(Some(EncryptionConfig {
                    key_id: None,
                    status: Some("ACTIVE".to_string()),
                    encryption_type: Some(EncryptionType::None),
                })),
                stuck: false,
                gets: 0,
                puts: 0,
            }),
        }
    }
}

impl MockXRay {
    /// Answer gets with an empty payload
    pub fn set_empty(&self) {
        self.state.lock().unwrap().config = Timeline::steady(None);
    }

    /// Never leave `UPDATING`
    pub fn set_stuck_updating(&self) {
        let mut state = self.state.lock().unwrap();
        state.stuck = true;
        state.config = Timeline::steady(Some(EncryptionConfig {
            key_id: None,
            status: Some("UPDATING".to_string()),
            encryption_type: Some(EncryptionType::Kms),
        }));
    }

    pub fn gets(&self) -> u32 {
        self.state.lock().unwrap().gets
    }

    pub fn puts(&self) -> u32 {
        self.state.lock().unwrap().puts
    }
}

impl XRayOperations for MockXRay {
    async fn get_encryption_config(&self) -> Result<Option<EncryptionConfig>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.gets += 1;
        Ok(state.config.observe())
    }

    async fn put_encryption_config(
        &self,
        encryption_type: EncryptionType,
        key_id: Option<&str>,
    ) -> Result<Option<EncryptionConfig>, AwsError> {
        let mut state = self.state.lock().unwrap();
        state.puts += 1;

        let updating = EncryptionConfig {
            key_id: key_id.map(str::to_string),
            status: Some("UPDATING".to_string()),
            encryption_type: Some(encryption_type),
        };
        let settled = if state.stuck {
            updating.clone()
        } else {
            EncryptionConfig {
                status: Some("ACTIVE".to_string()),
                ..updating.clone()
            }
        };
        state.config = Timeline::scripted([Some(updating.clone()), Some(settled)]);
        Ok(Some(updating))
    }
}
