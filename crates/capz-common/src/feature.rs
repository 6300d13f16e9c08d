//! Feature gates
//!
//! A registry of named boolean capability flags. Every registry knows a fixed
//! table of features with their defaults; callers may override individual
//! features at startup (`FEATURE_GATES=MachinePool=true`) or for the duration
//! of a test with [`FeatureGate::set_during_test`].
//!
//! Overrides live in a `DashMap`, so each feature's state is individually
//! coherent under concurrent reads. No ordering is promised across different
//! feature names.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::{Error, Result};

/// Gates the AzureManagedCluster and AzureManagedMachinePool resources
pub const MACHINE_POOL: &str = "MachinePool";

/// Enables the ClusterResourceSet controller
pub const CLUSTER_RESOURCE_SET: &str = "ClusterResourceSet";

/// Enables ClusterClass based cluster topologies
pub const CLUSTER_TOPOLOGY: &str = "ClusterTopology";

/// Enables AKS resource health reporting on managed clusters
pub const AKS_RESOURCE_HEALTH: &str = "AKSResourceHealth";

/// Enables Azure edge zone placement
pub const EDGE_ZONE: &str = "EdgeZone";

/// Maturity stage of a feature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prerelease {
    /// Experimental, off by default
    Alpha,
    /// Well tested, usually on by default
    Beta,
    /// Generally available
    Ga,
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerelease::Alpha => write!(f, "ALPHA"),
            Prerelease::Beta => write!(f, "BETA"),
            Prerelease::Ga => write!(f, "GA"),
        }
    }
}

/// Default state and stage of a known feature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Enabled state when no override is set
    pub default: bool,
    /// Maturity stage
    pub prerelease: Prerelease,
}

impl FeatureSpec {
    /// Create a feature spec
    pub const fn new(default: bool, prerelease: Prerelease) -> Self {
        Self {
            default,
            prerelease,
        }
    }
}

/// Built-in features known to every default registry
pub const DEFAULT_FEATURES: &[(&str, FeatureSpec)] = &[
    (MACHINE_POOL, FeatureSpec::new(false, Prerelease::Alpha)),
    (
        CLUSTER_RESOURCE_SET,
        FeatureSpec::new(true, Prerelease::Beta),
    ),
    (CLUSTER_TOPOLOGY, FeatureSpec::new(false, Prerelease::Alpha)),
    (
        AKS_RESOURCE_HEALTH,
        FeatureSpec::new(false, Prerelease::Alpha),
    ),
    (EDGE_ZONE, FeatureSpec::new(false, Prerelease::Alpha)),
];

static GATES: LazyLock<Arc<FeatureGate>> = LazyLock::new(|| Arc::new(FeatureGate::with_defaults()));

/// The process-wide feature gate registry
pub fn gates() -> Arc<FeatureGate> {
    Arc::clone(&GATES)
}

/// Registry of feature names to enabled state
#[derive(Debug)]
pub struct FeatureGate {
    known: BTreeMap<String, FeatureSpec>,
    overrides: DashMap<String, bool>,
}

impl Default for FeatureGate {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FeatureGate {
    /// Create a registry that knows the given features
    pub fn new<'a>(known: impl IntoIterator<Item = (&'a str, FeatureSpec)>) -> Self {
        Self {
            known: known
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
            overrides: DashMap::new(),
        }
    }

    /// Create a registry with the built-in feature table
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FEATURES.iter().copied())
    }

    /// Returns the current state of a feature. Unknown names are disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        if let Some(value) = self.overrides.get(name) {
            return *value;
        }
        self.known.get(name).is_some_and(|spec| spec.default)
    }

    /// Returns true if the feature is registered
    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains_key(name)
    }

    /// Override a known feature
    pub fn set(&self, name: &str, value: bool) -> Result<()> {
        self.ensure_known(name)?;
        self.overrides.insert(name.to_string(), value);
        Ok(())
    }

    /// Apply a `name=bool,name=bool` list of overrides
    ///
    /// Nothing is applied unless every entry parses and names a known feature.
    pub fn set_from_spec(&self, spec: &str) -> Result<()> {
        let mut parsed = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((name, value)) = entry.split_once('=') else {
                return Err(Error::MalformedFeatureSpec {
                    entry: entry.to_string(),
                });
            };
            let name = name.trim();
            let value = value.trim();
            self.ensure_known(name)?;
            let Ok(enabled) = value.parse::<bool>() else {
                return Err(Error::InvalidFeatureValue {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            };
            parsed.push((name.to_string(), enabled));
        }

        for (name, enabled) in parsed {
            self.overrides.insert(name, enabled);
        }
        Ok(())
    }

    /// Override a feature until the returned guard is dropped or restored
    ///
    /// Intended for serial use within a test; concurrent guards on the same
    /// feature restore in drop order, not acquisition order.
    pub fn set_during_test(&self, name: &str, value: bool) -> Result<FeatureGateGuard<'_>> {
        self.ensure_known(name)?;
        let previous = self.overrides.insert(name.to_string(), value);
        Ok(FeatureGateGuard {
            gate: self,
            name: name.to_string(),
            previous,
            restored: false,
        })
    }

    /// Describe every known feature, sorted by name
    ///
    /// Each line reads `Name=true|false (ALPHA - default=false)`.
    pub fn known_features(&self) -> Vec<String> {
        self.known
            .iter()
            .map(|(name, spec)| {
                format!(
                    "{}=true|false ({} - default={})",
                    name, spec.prerelease, spec.default
                )
            })
            .collect()
    }

    fn ensure_known(&self, name: &str) -> Result<()> {
        if self.is_known(name) {
            Ok(())
        } else {
            Err(Error::unknown_feature(name))
        }
    }

    fn restore_override(&self, name: &str, previous: Option<bool>) {
        match previous {
            Some(value) => {
                self.overrides.insert(name.to_string(), value);
            }
            None => {
                self.overrides.remove(name);
            }
        }
    }
}

/// Restores a feature's previous state when dropped
#[must_use = "the override is reverted as soon as the guard is dropped"]
#[derive(Debug)]
pub struct FeatureGateGuard<'a> {
    gate: &'a FeatureGate,
    name: String,
    previous: Option<bool>,
    restored: bool,
}

impl FeatureGateGuard<'_> {
    /// Restore the previous state now
    pub fn restore(mut self) {
        self.restore_once();
    }

    fn restore_once(&mut self) {
        if !self.restored {
            self.gate.restore_override(&self.name, self.previous);
            self.restored = true;
        }
    }
}

impl Drop for FeatureGateGuard<'_> {
    fn drop(&mut self) {
        self.restore_once();
    }
}
