use std::collections::HashSet;
use std::path::PathBuf;

use tempfile::tempdir;
use toolshed::libdeps::{find_static_libs, DepGraph, SymbolTable};

fn table(defined: &[&str], undefined: &[&str]) -> SymbolTable {
    SymbolTable {
        defined: defined.iter().map(|s| s.to_string()).collect(),
        undefined: undefined.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn archives_are_discovered_recursively_and_sorted() -> toolshed::Result<()> {
    let dir = tempdir()?;
    let nested = dir.path().join("third_party/vendor");
    std::fs::create_dir_all(&nested)?;
    std::fs::write(dir.path().join("libz.a"), "")?;
    std::fs::write(nested.join("liba.a"), "")?;
    std::fs::write(dir.path().join("libshared.so"), "")?;
    std::fs::write(dir.path().join("notes.txt"), "")?;

    let libs = find_static_libs(dir.path())?;
    assert_eq!(libs.len(), 2);
    assert_eq!(libs[0].file_name().unwrap(), "liba.a");
    assert_eq!(libs[1].file_name().unwrap(), "libz.a");
    Ok(())
}

#[test]
fn diamond_graph_orders_every_layer() {
    // app needs left and right, both need base
    let libraries: Vec<PathBuf> = ["libapp.a", "libleft.a", "libright.a", "libbase.a"]
        .iter()
        .map(PathBuf::from)
        .collect();
    let tables = vec![
        table(&["app_main"], &["left_fn", "right_fn"]),
        table(&["left_fn"], &["base_fn"]),
        table(&["right_fn"], &["base_fn"]),
        table(&["base_fn"], &[]),
    ];
    let graph = DepGraph::build(libraries, &tables, &HashSet::new());
    let report = graph.ordered();

    assert!(report.cycles.is_empty());
    assert_eq!(report.order.len(), 4);
    let position = |name: &str| {
        report
            .order
            .iter()
            .position(|lib| lib == &PathBuf::from(name))
            .unwrap()
    };
    assert!(position("libbase.a") < position("libleft.a"));
    assert!(position("libbase.a") < position("libright.a"));
    assert!(position("libleft.a") < position("libapp.a"));
    assert!(position("libright.a") < position("libapp.a"));
}
