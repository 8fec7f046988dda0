//! Built-in placement and compute resource defaults per daemon role.
//!
//! The [`StorageCluster`](crate::crd::StorageCluster) may override both per role, see
//! [`placement_for_role`] and [`resources_for_role`].

use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{
        NodeAffinity, NodeSelector, NodeSelectorRequirement, NodeSelectorTerm, PodAffinityTerm,
        PodAntiAffinity, ResourceRequirements, Toleration, WeightedPodAffinityTerm,
    },
    apimachinery::pkg::{api::resource::Quantity, apis::meta::v1::LabelSelector},
};

use crate::{
    constants::{
        RGW_APP_LABEL_VALUE, RGW_ROLE, STORAGE_NODE_LABEL_KEY, STORAGE_NODE_TAINT_KEY,
        TOPOLOGY_KEY_HOSTNAME,
    },
    crd::{Placement, StorageCluster},
};

/// Resolves the placement of the daemon with the given `role`.
///
/// An explicit placement on the cluster wins over the built-in default. When neither carries a
/// node affinity and the cluster has no label selector, the default storage node affinity is
/// applied. A label selector on the cluster is appended to every required node selector term.
pub fn placement_for_role(cluster: &StorageCluster, role: &str) -> Placement {
    let mut placement = cluster
        .spec
        .placement
        .get(role)
        .cloned()
        .unwrap_or_else(|| default_placement(role));

    match &cluster.spec.label_selector {
        Some(label_selector) => {
            append_node_requirements(&mut placement, label_selector_requirements(label_selector));
        }
        None => {
            if placement.node_affinity.is_none() {
                placement.node_affinity = Some(default_node_affinity());
            }
        }
    }

    placement
}

/// Resolves the compute resources of the daemon with the given `role`.
pub fn resources_for_role(cluster: &StorageCluster, role: &str) -> ResourceRequirements {
    cluster
        .spec
        .resources
        .get(role)
        .cloned()
        .unwrap_or_else(|| default_resources(role))
}

pub fn default_placement(role: &str) -> Placement {
    match role {
        RGW_ROLE => Placement {
            tolerations: Some(vec![storage_node_toleration()]),
            pod_anti_affinity: Some(PodAntiAffinity {
                preferred_during_scheduling_ignored_during_execution: Some(vec![
                    anti_affinity_between_app_pods(RGW_APP_LABEL_VALUE, 100),
                ]),
                required_during_scheduling_ignored_during_execution: None,
            }),
            ..Placement::default()
        },
        _ => Placement {
            tolerations: Some(vec![storage_node_toleration()]),
            ..Placement::default()
        },
    }
}

pub fn default_resources(role: &str) -> ResourceRequirements {
    match role {
        RGW_ROLE => {
            let quantities = BTreeMap::from([
                ("cpu".to_string(), Quantity("2".to_string())),
                ("memory".to_string(), Quantity("4Gi".to_string())),
            ]);
            ResourceRequirements {
                limits: Some(quantities.clone()),
                requests: Some(quantities),
                ..ResourceRequirements::default()
            }
        }
        _ => ResourceRequirements::default(),
    }
}

/// Requires nodes to carry the storage node label.
pub fn default_node_affinity() -> NodeAffinity {
    NodeAffinity {
        required_during_scheduling_ignored_during_execution: Some(NodeSelector {
            node_selector_terms: vec![NodeSelectorTerm {
                match_expressions: Some(vec![NodeSelectorRequirement {
                    key: STORAGE_NODE_LABEL_KEY.to_string(),
                    operator: "Exists".to_string(),
                    values: None,
                }]),
                match_fields: None,
            }],
        }),
        preferred_during_scheduling_ignored_during_execution: None,
    }
}

/// Tolerates the taint on dedicated storage nodes.
pub fn storage_node_toleration() -> Toleration {
    Toleration {
        key: Some(STORAGE_NODE_TAINT_KEY.to_string()),
        operator: Some("Equal".to_string()),
        value: Some("true".to_string()),
        effect: Some("NoSchedule".to_string()),
        ..Toleration::default()
    }
}

/// Creates a `WeightedPodAffinityTerm` that spreads the pods labelled `app=<app>` across hosts
/// when used as anti-affinity.
fn anti_affinity_between_app_pods(app: &str, weight: i32) -> WeightedPodAffinityTerm {
    WeightedPodAffinityTerm {
        pod_affinity_term: PodAffinityTerm {
            label_selector: Some(LabelSelector {
                match_expressions: None,
                match_labels: Some(BTreeMap::from([("app".to_string(), app.to_string())])),
            }),
            topology_key: TOPOLOGY_KEY_HOSTNAME.to_string(),
            ..PodAffinityTerm::default()
        },
        weight,
    }
}

fn label_selector_requirements(label_selector: &LabelSelector) -> Vec<NodeSelectorRequirement> {
    label_selector
        .match_labels
        .iter()
        .flatten()
        .map(|(key, value)| NodeSelectorRequirement {
            key: key.clone(),
            operator: "In".to_string(),
            values: Some(vec![value.clone()]),
        })
        .collect()
}

/// Adds `requirements` to every required node selector term of the placement, creating the node
/// affinity and a single term if necessary.
fn append_node_requirements(placement: &mut Placement, requirements: Vec<NodeSelectorRequirement>) {
    if requirements.is_empty() {
        return;
    }

    let node_selector = placement
        .node_affinity
        .get_or_insert_with(NodeAffinity::default)
        .required_during_scheduling_ignored_during_execution
        .get_or_insert_with(NodeSelector::default);

    if node_selector.node_selector_terms.is_empty() {
        node_selector
            .node_selector_terms
            .push(NodeSelectorTerm::default());
    }

    for term in &mut node_selector.node_selector_terms {
        term.match_expressions
            .get_or_insert_with(Vec::new)
            .extend(requirements.iter().cloned());
    }
}
