//! Route file grammar.
//!
//! ```text
//! # comment
//! GET         /                       Application.Index
//! GET         /app/:id                Application.Show
//! POST(csrf)  /app                    Application.Create
//! *           /public/*filepath       Static.Serve("public")
//! GET         /old                    404
//! module:testrunner
//! ```
//!
//! # Design Decisions
//! - Lenient: lines that do not look like a route are skipped, not rejected.
//!   A typo therefore silently drops a route; `route-dispatch check` lists
//!   what was actually compiled.
//! - The parenthesised constraint after the method is consumed and ignored
//! - `module:<name>` expands in place, preserving declaration order

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::registry::{HandlerRegistry, ModuleResolver, RouteSource};
use crate::routing::error::{source_snippet, RouteError, SourceLocation};
use crate::routing::method::Method;
use crate::routing::route::Route;

/// Include directive prefix.
pub const MODULE_DIRECTIVE: &str = "module:";

// 1: method, 2: constraint, 4: path, 5: action, 6: fixed args
static ROUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(GET|POST|PUT|DELETE|PATCH|OPTIONS|HEAD|WS|\*)",
        r"[(]?([^)]*)(\))?[ \t]+",
        r"(.*/[^ \t]*)[ \t]+([^ \t(]+)",
        r"\(?([^)]*)\)?[ \t]*$",
    ))
    .unwrap()
});

/// The pieces of one route line, borrowed from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteLine<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub action: &'a str,
    pub fixed_args: &'a str,
}

/// Split a trimmed line into its route fields, or `None` if it is not a route.
pub fn parse_route_line(line: &str) -> Option<RouteLine<'_>> {
    let caps = ROUTE_PATTERN.captures(line)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    Some(RouteLine {
        method: field(1),
        path: field(4),
        action: field(5),
        fixed_args: field(6),
    })
}

/// Read a routes file.
pub fn read_routes_file(path: &Path) -> Result<RouteSource, RouteError> {
    let text = std::fs::read_to_string(path).map_err(|source| RouteError::MissingRouteFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RouteSource::new(path.display().to_string(), text))
}

/// Parses route text into descriptors, expanding module includes.
pub struct RouteParser<'a> {
    modules: &'a dyn ModuleResolver,
    registry: Option<&'a dyn HandlerRegistry>,
    include_stack: Vec<String>,
}

impl<'a> RouteParser<'a> {
    pub fn new(modules: &'a dyn ModuleResolver) -> Self {
        Self {
            modules,
            registry: None,
            include_stack: Vec::new(),
        }
    }

    /// Check every concrete target against `registry` while parsing.
    pub fn validating(mut self, registry: &'a dyn HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn parse(&mut self, source: &RouteSource) -> Result<Vec<Route>, RouteError> {
        let mut routes = Vec::new();

        for (n, raw) in source.text.lines().enumerate() {
            let line_no = n + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix(MODULE_DIRECTIVE) {
                let location = SourceLocation::new(source.origin.as_str(), line_no);
                routes.extend(self.include(name.trim(), location)?);
                continue;
            }

            let Some(fields) = parse_route_line(line) else {
                tracing::debug!(origin = %source.origin, line = line_no, "Skipping unrecognized route line");
                continue;
            };
            let Ok(method) = fields.method.parse::<Method>() else {
                continue;
            };

            let location = SourceLocation::new(source.origin.as_str(), line_no);
            let route = Route::new(method, fields.path, fields.action, fields.fixed_args, location)?;

            if let Some(registry) = self.registry {
                if let Err(e) = route.validate(registry) {
                    return Err(RouteError::Validation {
                        message: e.to_string(),
                        location: route.location,
                        snippet: source_snippet(&source.text, line_no),
                    });
                }
            }
            routes.push(route);
        }

        Ok(routes)
    }

    fn include(&mut self, name: &str, location: SourceLocation) -> Result<Vec<Route>, RouteError> {
        if self.include_stack.iter().any(|active| active == name) {
            let mut chain = self.include_stack.clone();
            chain.push(name.to_string());
            return Err(RouteError::IncludeCycle {
                chain: chain.join(" -> "),
                location,
            });
        }

        let Some(source) = self.modules.find_module(name)? else {
            tracing::info!(module = %name, "Skipping routes for inactive module");
            return Ok(Vec::new());
        };

        self.include_stack.push(name.to_string());
        let routes = self.parse(&source);
        self.include_stack.pop();
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ActionTable, NoModules, StaticModules};

    fn parse(text: &str) -> Vec<Route> {
        RouteParser::new(&NoModules)
            .parse(&RouteSource::new("routes", text))
            .unwrap()
    }

    #[test]
    fn test_route_line_fields() {
        let line = parse_route_line(r#"GET /x/y App.Foo(bar,"a,b")"#).unwrap();
        assert_eq!(line.method, "GET");
        assert_eq!(line.path, "/x/y");
        assert_eq!(line.action, "App.Foo");
        assert_eq!(line.fixed_args, r#"bar,"a,b""#);
    }

    #[test]
    fn test_route_line_constraint_and_case() {
        let line = parse_route_line("post(csrf)\t/app/:id\tApplication.Update").unwrap();
        assert_eq!(line.method, "post");
        assert_eq!(line.path, "/app/:id");
        assert_eq!(line.action, "Application.Update");
        assert_eq!(line.fixed_args, "");

        let line = parse_route_line("*   /public/*filepath   Static.Serve(\"public\")").unwrap();
        assert_eq!(line.method, "*");
        assert_eq!(line.fixed_args, "\"public\"");
    }

    #[test]
    fn test_non_routes() {
        assert!(parse_route_line("FETCH /x App.X").is_none());
        assert!(parse_route_line("GET App.X").is_none());
        assert!(parse_route_line("just some text").is_none());
    }

    #[test]
    fn test_skips_comments_blanks_and_garbage() {
        let routes = parse(
            "# routes\n\
             \n\
             GET / Application.Index\n\
             this is not a route\n\
             \t# indented comment\n\
             GET /old 404\n",
        );
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].location.line, 3);
        assert_eq!(routes[1].action, "404");
        assert_eq!(routes[1].location.line, 6);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "GET /a A.B\nPOST /c/:d C.D(x,y)\n* /e E.F\n";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn test_relative_path_is_fatal() {
        let err = RouteParser::new(&NoModules)
            .parse(&RouteSource::new("routes", "GET /ok A.B\nGET app/x A.C\n"))
            .unwrap_err();
        match err {
            RouteError::RelativePath { path, location } => {
                assert_eq!(path, "app/x");
                assert_eq!(location.line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_module_include_in_order() {
        let modules = StaticModules::new().with("admin", "GET /admin Admin.Index\nGET /admin/users Admin.Users");
        let routes = RouteParser::new(&modules)
            .parse(&RouteSource::new("routes", "GET / A.Index\nmodule:admin\nGET /z A.Z"))
            .unwrap();

        let actions: Vec<_> = routes.iter().map(|r| r.action.as_str()).collect();
        assert_eq!(actions, vec!["A.Index", "Admin.Index", "Admin.Users", "A.Z"]);
        assert_eq!(routes[1].location.origin, "module:admin");
    }

    #[test]
    fn test_inactive_module_contributes_nothing() {
        let routes = parse("GET / A.Index\nmodule:testrunner\n");
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_include_cycle() {
        let modules = StaticModules::new()
            .with("a", "module:b")
            .with("b", "GET /b B.Index\nmodule:a");
        let err = RouteParser::new(&modules)
            .parse(&RouteSource::new("routes", "module:a"))
            .unwrap_err();
        match err {
            RouteError::IncludeCycle { chain, .. } => assert_eq!(chain, "a -> b -> a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_error_carries_context() {
        let mut actions = ActionTable::new();
        actions.declare("Application", "Index", &[]);

        let text = "GET / Application.Index\nGET /:ns/x :ns.X\nGET /missing Application.Missing\n";
        let err = RouteParser::new(&NoModules)
            .validating(&actions)
            .parse(&RouteSource::new("conf/routes", text))
            .unwrap_err();

        match err {
            RouteError::Validation {
                message,
                location,
                snippet,
            } => {
                assert!(message.contains("Application.Missing"));
                assert_eq!(location, SourceLocation::new("conf/routes", 3));
                assert_eq!(snippet.len(), 3);
                assert!(snippet[2].contains("Application.Missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_skipped_without_registry() {
        let routes = parse("GET /missing Application.Missing");
        assert_eq!(routes.len(), 1);
    }
}
