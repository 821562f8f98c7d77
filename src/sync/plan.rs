// sitesync/src/sync/plan.rs
use std::collections::HashSet;

use crate::config::{CampaignConfig, SyncConfig};

/// Which part of the site a run deploys.
#[derive(Debug, Clone, Copy)]
pub enum DeployScope<'a> {
    FullSite,
    Campaign { name: &'a str, campaign: &'a CampaignConfig },
}

impl DeployScope<'_> {
    /// Partial deploys must never remove files outside their scope.
    pub fn allows_deletion(&self) -> bool {
        matches!(self, DeployScope::FullSite)
    }
}

/// Resolves the requested campaign name against the configuration.
pub fn resolve_scope<'a>(config: &'a SyncConfig, campaign: Option<&'a str>) -> Option<DeployScope<'a>> {
    match campaign {
        None => Some(DeployScope::FullSite),
        Some(name) => config
            .campaigns
            .get(name)
            .map(|campaign| DeployScope::Campaign { name, campaign }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Every matching local file, in enumeration order. Unchanged files are re-uploaded.
    pub upload: Vec<String>,
    /// Remote keys with no local counterpart, in listing order.
    pub delete: Vec<String>,
}

pub fn compute_plan(local: Vec<String>, remote: &[String], scope: DeployScope<'_>) -> SyncPlan {
    let delete = if scope.allows_deletion() {
        let local_set: HashSet<&str> = local.iter().map(String::as_str).collect();
        remote
            .iter()
            .filter(|key| !local_set.contains(key.as_str()))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    SyncPlan { upload: local, delete }
}
