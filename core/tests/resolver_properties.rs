use std::collections::HashMap;

use genius_core::api::{resolve, Task, TaskGraph, TaskKind};

/// Small deterministic generator so the graphs are reproducible without extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

/// Tasks named t0..tn where each task may only depend on lower-numbered ones.
fn acyclic_tasks(rng: &mut Lcg, n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| {
            let deps: Vec<String> = (0..i)
                .filter(|_| rng.below(3) == 0)
                .map(|j| format!("t{}", j))
                .collect();
            Task::new(
                format!("t{}", i),
                TaskKind::Refactor,
                1 + rng.below(5) as u32,
                "",
            )
            .with_dependencies(deps)
        })
        .collect()
}

#[test]
fn acyclic_order_respects_every_dependency() {
    let mut rng = Lcg(7);
    for round in 0..200 {
        let n = 1 + (round % 12);
        let mut tasks = acyclic_tasks(&mut rng, n);
        // Shuffle emission order so dependencies may be emitted after dependents.
        for i in (1..tasks.len()).rev() {
            let j = rng.below(i as u64 + 1) as usize;
            tasks.swap(i, j);
        }

        let graph = TaskGraph::from_tasks(tasks).unwrap();
        let resolution = resolve(&graph);

        assert!(resolution.forced.is_empty(), "round {}", round);
        assert_eq!(resolution.order.len(), n);

        let position: HashMap<&str, usize> = resolution
            .order
            .iter()
            .enumerate()
            .map(|(pos, id)| (graph.get(*id).name.as_str(), pos))
            .collect();
        for (id, task) in graph.iter() {
            let me = position[task.name.as_str()];
            for dep in &task.dependencies {
                assert!(
                    position[dep.as_str()] < me,
                    "round {}: {} placed before its dependency {}",
                    round,
                    graph.get(id).name,
                    dep
                );
            }
        }
    }
}

#[test]
fn cyclic_graphs_terminate_with_total_order() {
    let mut rng = Lcg(42);
    for round in 0..200 {
        let n = 2 + (round % 10);
        let mut tasks = acyclic_tasks(&mut rng, n);
        // Close a cycle: the first task now depends on the last one, which
        // (transitively or directly) is made to depend on the first.
        let last = format!("t{}", n - 1);
        tasks[0].dependencies.push(last);
        if !tasks[n - 1].dependencies.iter().any(|d| d == "t0") {
            tasks[n - 1].dependencies.push("t0".to_string());
        }
        // Plus an occasional dependency on a task that does not exist.
        if round % 3 == 0 {
            tasks[n / 2].dependencies.push("ghost".to_string());
        }

        let graph = TaskGraph::from_tasks(tasks).unwrap();
        let resolution = resolve(&graph);

        assert!(resolution.passes <= n, "round {}: {} passes", round, resolution.passes);
        assert!(!resolution.forced.is_empty());

        let mut seen: Vec<usize> = resolution.order.iter().map(|id| id.index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>(), "round {}", round);

        // A forced task only skips dependencies that had not been ordered yet.
        let position: HashMap<&str, usize> = resolution
            .order
            .iter()
            .enumerate()
            .map(|(pos, id)| (graph.get(*id).name.as_str(), pos))
            .collect();
        for forced in &resolution.forced {
            let task = graph.get(forced.id);
            let me = position[task.name.as_str()];
            for dep in &task.dependencies {
                let ordered_before = position.get(dep.as_str()).is_some_and(|p| *p < me);
                assert_eq!(
                    forced.waived.contains(dep),
                    !ordered_before,
                    "round {}: {} / {}",
                    round,
                    task.name,
                    dep
                );
            }
        }
    }
}

#[test]
fn resolution_is_reproducible() {
    let mut rng = Lcg(99);
    let tasks = acyclic_tasks(&mut rng, 10);
    let a = resolve(&TaskGraph::from_tasks(tasks.clone()).unwrap());
    let b = resolve(&TaskGraph::from_tasks(tasks).unwrap());
    assert_eq!(a, b);
}
