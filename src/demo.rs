//! Linked-list demo driven purely through the collector's public operations.
//!
//! Each list is built under a root variable, printed, and then dropped from
//! scope so a later allocation can reclaim it.

use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

use crate::config::{CollectorConfig, ConfigError, ListSpec, ReportFormat};
use crate::gc::{Address, CollectionReport, Collector, GcError, GcStats};

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("runtime error: {0}")]
    Gc(#[from] GcError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to render report: {0}")]
    Json(#[from] serde_json::Error),
}

/// The lists the demo builds when the config names none.
pub fn default_lists() -> Vec<ListSpec> {
    vec![
        ListSpec::new("myList", &[1, 2, 3, 4, 5]),
        ListSpec::new("myList2", &[6, 7, 8, 9, 10, 11, 12]),
    ]
}

/// Build a linked list of `values` rooted at `name`.
///
/// An empty list binds `name` to null. Each new node is linked in right after
/// it is allocated, so it is reachable before the next allocation can collect.
pub fn create_list(gc: &mut Collector, name: &str, values: &[i32]) -> Result<Address, GcError> {
    let Some((first, rest)) = values.split_first() else {
        gc.bind_variable(name, Address::NULL)?;
        return Ok(Address::NULL);
    };

    let head = gc.allocate()?;
    gc.bind_variable(name, head)?;
    gc.write_value(head, *first)?;

    let mut tail = head;
    for &value in rest {
        let node = gc.allocate()?;
        gc.write_link(tail, node)?;
        gc.write_value(node, value)?;
        tail = node;
    }

    Ok(head)
}

/// Values of the list rooted at `name`, following links until null.
pub fn read_list(gc: &Collector, name: &str) -> Result<Vec<i32>, GcError> {
    let mut values = Vec::new();
    let mut current = gc.lookup_variable(name)?;
    while !current.is_null() {
        values.push(gc.read_value(current)?);
        current = gc.read_link(current)?;
    }
    Ok(values)
}

/// `name: v1 v2 ...`
pub fn format_list(name: &str, values: &[i32]) -> String {
    let mut line = format!("{}:", name);
    for value in values {
        let _ = write!(line, " {}", value);
    }
    line
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOutput {
    pub name: String,
    pub values: Vec<i32>,
}

/// Everything a demo run produced.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub heap_size: usize,
    pub lists: Vec<ListOutput>,
    /// Printed transcript, including reclamation events in the order they
    /// happened
    pub transcript: Vec<String>,
    pub collections: Vec<CollectionReport>,
    pub stats: GcStats,
}

/// Build, print and drop each list in turn on a fresh collector.
pub fn run_demo(config: &CollectorConfig, lists: &[ListSpec]) -> Result<DemoReport, DemoError> {
    let mut gc = Collector::with_config(config)?;
    let mut transcript = Vec::new();
    let mut collections = Vec::new();
    let mut outputs = Vec::with_capacity(lists.len());

    for list in lists {
        let before = gc.stats().collections;
        create_list(&mut gc, &list.name, &list.values)?;
        if gc.stats().collections != before {
            // One allocation collects at most once, but a list spans many
            let new = gc.collections().filter(|r| r.cycle > before).cloned();
            for report in new {
                for address in &report.reclaimed {
                    transcript.push(format!("Deallocating address {} !", address));
                }
                collections.push(report);
            }
        }

        let values = read_list(&gc, &list.name)?;
        transcript.push(format_list(&list.name, &values));
        outputs.push(ListOutput {
            name: list.name.clone(),
            values,
        });

        gc.unbind_variable(&list.name);
        transcript.push(format!("Removed {} from scope...", list.name));
    }

    Ok(DemoReport {
        heap_size: gc.heap_size(),
        lists: outputs,
        transcript,
        collections,
        stats: gc.stats(),
    })
}

/// Render a report in the requested format.
pub fn render(report: &DemoReport, format: ReportFormat, gc_stats: bool) -> Result<String, DemoError> {
    match format {
        ReportFormat::Human => Ok(render_human(report, gc_stats)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
    }
}

fn render_human(report: &DemoReport, gc_stats: bool) -> String {
    let mut out = String::new();
    for line in &report.transcript {
        out.push_str(line);
        out.push('\n');
    }
    if gc_stats {
        let s = &report.stats;
        let _ = writeln!(
            out,
            "[gc] heap={} allocations={} collections={} reclaimed={} live={}",
            report.heap_size, s.allocations, s.collections, s.reclaimed, s.live
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_read_list() {
        let mut gc = Collector::default();
        let head = create_list(&mut gc, "list", &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(gc.lookup_variable("list").unwrap(), head);
        assert_eq!(read_list(&gc, "list").unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(gc.live_count(), 5);
    }

    #[test]
    fn test_empty_list_binds_null() {
        let mut gc = Collector::default();
        assert_eq!(create_list(&mut gc, "e", &[]).unwrap(), Address::NULL);
        assert_eq!(read_list(&gc, "e").unwrap(), Vec::<i32>::new());
        assert_eq!(gc.live_count(), 0);
    }

    #[test]
    fn test_read_unbound_list() {
        let gc = Collector::default();
        assert!(matches!(
            read_list(&gc, "missing"),
            Err(GcError::UnboundVariable(_))
        ));
    }

    #[test]
    fn test_list_too_long_for_heap() {
        let mut gc = Collector::new(8).unwrap();
        assert!(matches!(
            create_list(&mut gc, "xs", &[1, 2, 3, 4]),
            Err(GcError::OutOfMemory { heap_size: 8 })
        ));
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list("myList", &[1, 2, 3]), "myList: 1 2 3");
        assert_eq!(format_list("e", &[]), "e:");
    }

    #[test]
    fn test_default_demo_transcript() {
        let report = run_demo(&CollectorConfig::default(), &default_lists()).unwrap();
        assert_eq!(
            report.transcript,
            vec![
                "myList: 1 2 3 4 5",
                "Removed myList from scope...",
                "Deallocating address 2 !",
                "Deallocating address 4 !",
                "Deallocating address 6 !",
                "Deallocating address 8 !",
                "Deallocating address 10 !",
                "myList2: 6 7 8 9 10 11 12",
                "Removed myList2 from scope...",
            ]
        );
        assert_eq!(report.collections.len(), 1);
        assert_eq!(report.stats.allocations, 12);
        assert_eq!(report.stats.live, 7);
    }

    #[test]
    fn test_render_json() {
        let report = run_demo(&CollectorConfig::default(), &default_lists()).unwrap();
        let json = render(&report, ReportFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["heap_size"], 20);
        assert_eq!(value["lists"][1]["values"][6], 12);
        assert_eq!(
            value["collections"][0]["reclaimed"],
            serde_json::json!([2, 4, 6, 8, 10])
        );
    }

    #[test]
    fn test_render_human_with_stats() {
        let report = run_demo(&CollectorConfig::default(), &default_lists()).unwrap();
        let text = render(&report, ReportFormat::Human, true).unwrap();
        assert!(text.starts_with("myList: 1 2 3 4 5\n"));
        assert!(text.ends_with(
            "[gc] heap=20 allocations=12 collections=1 reclaimed=5 live=7\n"
        ));
    }
}
