//! Shared fixtures for integration tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A representative application routes file.
#[allow(dead_code)]
pub const APP_ROUTES: &str = r#"
# Application routes
GET     /                               Application.Index
GET     /app/:id                        Application.Show
POST(csrf) /app                         Application.Create
GET     /app/:id/comments/:cid          Application.Comment
GET     /favicon.ico                    Static.Serve("public","favicon.ico")
GET     /public/*filepath               Static.Serve("public")
*       /hooks/:name                    Hooks.Receive
GET     /admin/:ctrl                    Admin:ctrl.Index
GET     /old                            404

module:testrunner

GET     /:controller/:action            :controller.:action
"#;

/// Write `text` to `<dir>/conf/routes` and return the path.
pub fn write_routes(dir: &Path, text: &str) -> PathBuf {
    let conf = dir.join("conf");
    fs::create_dir_all(&conf).unwrap();
    let path = conf.join("routes");
    fs::write(&path, text).unwrap();
    path
}

/// An application dir with routes, plus a `testrunner` module root.
#[allow(dead_code)]
pub fn app_with_module() -> (TempDir, PathBuf, BTreeMap<String, PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let routes = write_routes(dir.path(), APP_ROUTES);

    let module_root = dir.path().join("modules").join("testrunner");
    write_routes(&module_root, "GET /@tests TestRunner.Index\n");

    let mut modules = BTreeMap::new();
    modules.insert("testrunner".to_string(), module_root);
    (dir, routes, modules)
}

#[allow(dead_code)]
pub fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
