//! Route table mapping paths to views

use std::fmt;

use kubedash_types::TabDescriptor;
use thiserror::Error;

/// Where the root path redirects to
pub const DEFAULT_PATH: &str = "/KubernetesDashboard";

/// One entry of the static route table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteRecord {
    /// Path pattern; `:name` segments capture a parameter
    pub path: &'static str,
    pub name: &'static str,
    /// Title shown in tabs and headers
    pub title: &'static str,
    /// Parameters are forwarded to the view as props
    pub props: bool,
}

/// Children of the root layout, in match order
pub const ROUTES: &[RouteRecord] = &[
    RouteRecord {
        path: "/KubernetesDashboard",
        name: "KubernetesDashboard",
        title: "Kubernetes Dashboard",
        props: false,
    },
    RouteRecord {
        path: "/ElasticScaling",
        name: "ElasticScaling",
        title: "ElasticScaling",
        props: false,
    },
    RouteRecord {
        path: "/ServiceDetail/:namespace/:serviceName",
        name: "ServiceDetail",
        title: "Pods Details",
        props: true,
    },
];

/// Inputs of the service detail view
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceProps {
    pub namespace: String,
    pub service_name: String,
}

/// A resolved leaf view
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    KubernetesDashboard,
    ElasticScaling,
    ServiceDetail(ServiceProps),
}

impl Route {
    pub fn service_detail(namespace: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self::ServiceDetail(ServiceProps {
            namespace: namespace.into(),
            service_name: service_name.into(),
        })
    }

    fn record(&self) -> &'static RouteRecord {
        match self {
            Self::KubernetesDashboard => &ROUTES[0],
            Self::ElasticScaling => &ROUTES[1],
            Self::ServiceDetail(_) => &ROUTES[2],
        }
    }

    pub fn name(&self) -> &'static str {
        self.record().name
    }

    pub fn title(&self) -> &'static str {
        self.record().title
    }

    pub fn props(&self) -> Option<&ServiceProps> {
        match self {
            Self::ServiceDetail(props) => Some(props),
            _ => None,
        }
    }

    /// Canonical path with parameters percent-encoded
    pub fn path(&self) -> String {
        match self {
            Self::ServiceDetail(props) => format!(
                "/ServiceDetail/{}/{}",
                urlencoding::encode(&props.namespace),
                urlencoding::encode(&props.service_name)
            ),
            _ => self.record().path.to_string(),
        }
    }

    /// Tab descriptor opened when navigating here
    pub fn tab(&self) -> TabDescriptor {
        TabDescriptor::new(self.path(), self.name(), self.title())
    }

    /// Sidebar entry this route lives under
    pub fn menu_root(&self) -> Route {
        match self {
            Self::ElasticScaling => Self::ElasticScaling,
            _ => Self::KubernetesDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route matches '{0}'")]
    NotFound(String),

    #[error("route parameter '{param}' is not valid UTF-8: {value}")]
    InvalidEncoding { param: &'static str, value: String },
}

/// Result of resolving a path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    /// Original path when a redirect was followed
    pub redirected_from: Option<String>,
}

/// Resolves paths against the route table
#[derive(Clone, Copy, Debug)]
pub struct Router {
    routes: &'static [RouteRecord],
    redirect_to: &'static str,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: ROUTES,
            redirect_to: DEFAULT_PATH,
        }
    }

    pub fn routes(&self) -> &'static [RouteRecord] {
        self.routes
    }

    /// Resolve a path to exactly one leaf view
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, RouteError> {
        let clean = normalize(path);

        if clean.is_empty() {
            let route = self.match_path(self.redirect_to)?;
            tracing::debug!(from = path, to = self.redirect_to, "route redirect");
            return Ok(ResolvedRoute {
                route,
                redirected_from: Some(path.to_string()),
            });
        }

        Ok(ResolvedRoute {
            route: self.match_path(clean)?,
            redirected_from: None,
        })
    }

    fn match_path(&self, path: &str) -> Result<Route, RouteError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        'records: for record in self.routes {
            let pattern: Vec<&'static str> = record.path.trim_matches('/').split('/').collect();
            if pattern.len() != segments.len() {
                continue;
            }

            let mut params = Vec::new();
            for (expected, actual) in pattern.iter().copied().zip(segments.iter().copied()) {
                if let Some(param) = expected.strip_prefix(':') {
                    if actual.is_empty() {
                        continue 'records;
                    }
                    let value = urlencoding::decode(actual).map_err(|_| {
                        RouteError::InvalidEncoding {
                            param,
                            value: actual.to_string(),
                        }
                    })?;
                    params.push((param, value.into_owned()));
                } else if !expected.eq_ignore_ascii_case(actual) {
                    continue 'records;
                }
            }

            return Self::build(record, params, path);
        }

        Err(RouteError::NotFound(format!("/{}", path.trim_matches('/'))))
    }

    fn build(
        record: &RouteRecord,
        params: Vec<(&'static str, String)>,
        path: &str,
    ) -> Result<Route, RouteError> {
        let mut namespace = None;
        let mut service_name = None;
        for (name, value) in params {
            match name {
                "namespace" => namespace = Some(value),
                "serviceName" => service_name = Some(value),
                _ => {}
            }
        }

        match (record.name, namespace, service_name) {
            ("KubernetesDashboard", _, _) => Ok(Route::KubernetesDashboard),
            ("ElasticScaling", _, _) => Ok(Route::ElasticScaling),
            ("ServiceDetail", Some(namespace), Some(service_name)) => {
                Ok(Route::ServiceDetail(ServiceProps {
                    namespace,
                    service_name,
                }))
            }
            _ => Err(RouteError::NotFound(format!("/{}", path.trim_matches('/')))),
        }
    }
}

/// Drop query string, fragment and surrounding slashes
fn normalize(path: &str) -> &str {
    let path = path.trim();
    // hash-mode links ("#/ElasticScaling") carry the route in the fragment
    let path = path.strip_prefix('#').unwrap_or(path);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_redirects_to_dashboard() {
        let router = Router::new();
        let resolved = router.resolve("/").unwrap();
        assert_eq!(resolved.route, Route::KubernetesDashboard);
        assert_eq!(resolved.redirected_from.as_deref(), Some("/"));

        let resolved = router.resolve("").unwrap();
        assert_eq!(resolved.route.path(), DEFAULT_PATH);
    }

    #[test]
    fn test_service_detail_props() {
        let resolved = Router::new().resolve("/ServiceDetail/ns1/svc1").unwrap();
        assert_eq!(
            resolved.route.props(),
            Some(&ServiceProps {
                namespace: "ns1".to_string(),
                service_name: "svc1".to_string(),
            })
        );
        assert_eq!(resolved.route.title(), "Pods Details");
        assert!(resolved.redirected_from.is_none());
    }

    #[test]
    fn test_static_routes() {
        let router = Router::new();
        assert_eq!(
            router.resolve("/ElasticScaling").unwrap().route,
            Route::ElasticScaling
        );
        assert_eq!(
            router.resolve("/ElasticScaling/").unwrap().route,
            Route::ElasticScaling
        );
        assert_eq!(
            router.resolve("/kubernetesdashboard?refresh=1").unwrap().route,
            Route::KubernetesDashboard
        );
        assert_eq!(
            router.resolve("#/ElasticScaling").unwrap().route,
            Route::ElasticScaling
        );
    }

    #[test]
    fn test_unknown_paths() {
        let router = Router::new();
        assert_eq!(
            router.resolve("/Nodes"),
            Err(RouteError::NotFound("/Nodes".to_string()))
        );
        assert!(router.resolve("/ServiceDetail/ns1").is_err());
        assert!(router.resolve("/ServiceDetail/ns1/svc1/extra").is_err());
        assert!(router.resolve("/ServiceDetail//svc1").is_err());
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let route = Router::new()
            .resolve("/ServiceDetail/team%20a/web%2Fv2")
            .unwrap()
            .route;
        let props = route.props().unwrap();
        assert_eq!(props.namespace, "team a");
        assert_eq!(props.service_name, "web/v2");
        assert_eq!(route.path(), "/ServiceDetail/team%20a/web%2Fv2");
    }

    #[test]
    fn test_tab_descriptor() {
        let tab = Route::ElasticScaling.tab();
        assert_eq!(tab, TabDescriptor::new("/ElasticScaling", "ElasticScaling", "ElasticScaling"));

        let tab = Route::service_detail("sockshop", "carts").tab();
        assert_eq!(tab.name, "ServiceDetail");
        assert_eq!(tab.path, "/ServiceDetail/sockshop/carts");
    }

    #[test]
    fn test_every_route_resolves_to_itself() {
        let router = Router::new();
        for route in [
            Route::KubernetesDashboard,
            Route::ElasticScaling,
            Route::service_detail("default", "frontend"),
        ] {
            assert_eq!(router.resolve(&route.path()).unwrap().route, route);
        }
        assert_eq!(router.routes().len(), 3);
    }
}
