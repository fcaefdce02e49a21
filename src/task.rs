//! Task polling utilities
//!
//! The dashboard runs on egui's frame loop, so spawned tokio tasks are never
//! awaited. Instead each frame checks which handles have finished and takes
//! their results with `now_or_never()`.

use futures::FutureExt;
use tokio::task::{JoinError, JoinHandle};

/// Remove every finished task from `tasks`, returning their keys and results
/// in completion-check order. Unfinished tasks stay in place.
pub fn drain_finished<K, T>(tasks: &mut Vec<(K, JoinHandle<T>)>) -> Vec<(K, Result<T, JoinError>)> {
    let mut finished = Vec::new();
    let mut index = 0;

    while index < tasks.len() {
        if !tasks[index].1.is_finished() {
            index += 1;
            continue;
        }
        let (key, mut handle) = tasks.remove(index);
        match (&mut handle).now_or_never() {
            Some(result) => finished.push((key, result)),
            None => {
                tracing::warn!("Task not ready despite is_finished()");
                tasks.insert(index, (key, handle));
                index += 1;
            }
        }
    }

    finished
}
