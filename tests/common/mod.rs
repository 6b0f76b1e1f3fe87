//! Shared test fixtures
//!
//! Two concrete kinds exercise the generic layers: `SandboxPolicy` is
//! cluster-scoped with a composite `runAs` field (nested sub-builder),
//! `Workload` is namespaced with a spec/status split. Both keep unknown
//! fields in a flattened map, like any kind implementing [`Resource`].

// Each test binary uses its own subset of the fixtures.
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skiff::model::{Editable, MetadataBuilder, MetadataNested, Resource};
use skiff::ObjectMeta;

/// Cluster-scoped policy kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxPolicy {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_privileged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as: Option<RunAsRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_capabilities: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How sandboxed processes may pick their user id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_max: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for SandboxPolicy {
    const KIND: &'static str = "SandboxPolicy";
    const API_GROUP_VERSION: &'static str = "policy.skiff.dev/v1";
    const PLURAL: &'static str = "sandboxpolicies";
    const NAMESPACED: bool = false;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Chainable builder for [`SandboxPolicy`].
#[derive(Debug, Clone, Default)]
pub struct SandboxPolicyBuilder {
    policy: SandboxPolicy,
}

impl SandboxPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_metadata(self) -> MetadataNested<Self> {
        MetadataNested::wrap(self, |mut parent, meta| {
            parent.policy.metadata = meta;
            parent
        })
    }

    pub fn edit_metadata(self) -> MetadataNested<Self> {
        let meta = self.policy.metadata.clone();
        MetadataNested::wrap_existing(
            self,
            |mut parent, meta| {
                parent.policy.metadata = meta;
                parent
            },
            meta,
        )
    }

    pub fn allow_privileged(mut self, allowed: bool) -> Self {
        self.policy.allow_privileged = Some(allowed);
        self
    }

    pub fn new_run_as(self) -> RunAsNested {
        RunAsNested {
            rule: self.policy.run_as.clone().unwrap_or_default(),
            parent: self,
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.policy.users.push(user.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.policy.groups.push(group.into());
        self
    }

    pub fn allowed_capability(mut self, capability: impl Into<String>) -> Self {
        self.policy
            .allowed_capabilities
            .get_or_insert_with(Vec::new)
            .push(capability.into());
        self
    }

    pub fn build(self) -> SandboxPolicy {
        self.policy
    }
}

impl From<SandboxPolicy> for SandboxPolicyBuilder {
    fn from(policy: SandboxPolicy) -> Self {
        Self { policy }
    }
}

impl Editable for SandboxPolicy {
    type Builder = SandboxPolicyBuilder;

    fn edit(&self) -> SandboxPolicyBuilder {
        SandboxPolicyBuilder::from(self.clone())
    }
}

/// Sub-builder for the composite `runAs` field; merges on `end_run_as`.
pub struct RunAsNested {
    parent: SandboxPolicyBuilder,
    rule: RunAsRule,
}

impl RunAsNested {
    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rule.rule = Some(rule.into());
        self
    }

    pub fn uid_min(mut self, uid: i64) -> Self {
        self.rule.uid_min = Some(uid);
        self
    }

    pub fn uid_max(mut self, uid: i64) -> Self {
        self.rule.uid_max = Some(uid);
        self
    }

    pub fn end_run_as(mut self) -> SandboxPolicyBuilder {
        self.parent.policy.run_as = Some(self.rule);
        self.parent
    }
}

/// Namespaced workload kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<WorkloadSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkloadStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Workload {
    const KIND: &'static str = "Workload";
    const API_GROUP_VERSION: &'static str = "apps.skiff.dev/v1";
    const PLURAL: &'static str = "workloads";
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Workload with a name, namespace, and spec, for tests that need one fast.
pub fn workload(name: &str, namespace: &str, replicas: u32) -> Workload {
    Workload {
        metadata: MetadataBuilder::new()
            .name(name)
            .namespace(namespace)
            .build(),
        spec: Some(WorkloadSpec {
            image: Some("registry.skiff.dev/echo:1".into()),
            replicas: Some(replicas),
            ..WorkloadSpec::default()
        }),
        status: None,
        extra: Map::new(),
    }
}

/// Minimal restricted policy used across the mock DSL tests.
pub fn restricted_policy() -> SandboxPolicy {
    SandboxPolicyBuilder::new()
        .new_metadata()
        .name("restricted")
        .end_metadata()
        .allow_privileged(false)
        .new_run_as()
        .rule("MustRunAsRange")
        .uid_min(1000)
        .uid_max(2000)
        .end_run_as()
        .user("system:sandbox:default")
        .group("system:authenticated")
        .build()
}

/// Opt-in log output for debugging test runs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
