// src/registry/resolve.rs

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::engine::TaskName;
use crate::registry::model::{TaskRegistry, TaskSpec};

/// Run basic semantic validation against a registry.
///
/// This checks:
/// - the registry is non-empty
/// - all declared dependencies refer to existing tasks
/// - no task depends on itself
/// - the dependency graph has no cycles
pub fn validate_registry(registry: &TaskRegistry) -> Result<()> {
    if registry.is_empty() {
        return Err(anyhow!("task registry must contain at least one task"));
    }

    for spec in registry.specs() {
        for dep in spec.deps.iter() {
            if !registry.contains(dep) {
                return Err(anyhow!(
                    "task '{}' has unknown dependency '{}'",
                    spec.name,
                    dep
                ));
            }
            if dep == &spec.name {
                return Err(anyhow!("task '{}' cannot depend on itself", spec.name));
            }
        }
    }

    validate_dag(registry)
}

fn validate_dag(registry: &TaskRegistry) -> Result<()> {
    // Edge direction: dep -> task. A topological sort fails on cycles.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in registry.names() {
        graph.add_node(name);
    }

    for spec in registry.specs() {
        for dep in spec.deps.iter() {
            graph.add_edge(dep.as_str(), spec.name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(anyhow!(
                "cycle detected in task dependencies involving task '{}'",
                node
            ))
        }
    }
}

/// Compute the launch plan for a named task: its dependency closure in
/// dependencies-first order, each task exactly once, the requested task last.
///
/// All tasks in the plan are launched concurrently; the ordering only
/// guarantees that a task's dependencies have been *started* before it is.
pub fn resolve_plan<'a>(registry: &'a TaskRegistry, task: &str) -> Result<Vec<&'a TaskSpec>> {
    validate_registry(registry)?;

    if !registry.contains(task) {
        let known: Vec<&str> = registry.names().collect();
        return Err(anyhow!(
            "unknown task '{}'; known tasks: {}",
            task,
            known.join(", ")
        ));
    }

    let mut plan: Vec<&TaskSpec> = Vec::new();
    let mut visited: HashSet<TaskName> = HashSet::new();
    visit(registry, task, &mut visited, &mut plan);
    Ok(plan)
}

fn visit<'a>(
    registry: &'a TaskRegistry,
    name: &str,
    visited: &mut HashSet<TaskName>,
    plan: &mut Vec<&'a TaskSpec>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }

    // Deps exist and the graph is acyclic; both were validated above.
    if let Some(spec) = registry.get(name) {
        for dep in spec.deps.iter() {
            visit(registry, dep, visited, plan);
        }
        plan.push(spec);
    }
}
