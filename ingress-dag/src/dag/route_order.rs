//! Route ordering comparator. Applied to the DAG's routes
//! before translation so wire-level representation never influences order.

use std::cmp::Ordering;

use super::entities::Route;

fn header_key(h: &super::entities::HeaderMatch) -> (&str, super::entities::HeaderMatchKind, Option<&str>, bool) {
    (h.name.as_str(), h.kind, h.value.as_deref(), h.invert)
}

fn query_key(q: &super::entities::QueryMatch) -> (&str, super::entities::HeaderMatchKind, Option<&str>) {
    (q.name.as_str(), q.kind, q.value.as_deref())
}

/// Total order, descending specificity. `sort_by` is stable so equal-rank
/// routes retain their insertion order.
pub fn compare(a: &Route, b: &Route) -> Ordering {
    a.path_match
        .specificity_rank()
        .cmp(&b.path_match.specificity_rank())
        .then_with(|| b.path_match.value().len().cmp(&a.path_match.value().len()))
        .then_with(|| a.path_match.value().cmp(b.path_match.value()))
        .then_with(|| b.header_matches.len().cmp(&a.header_matches.len()))
        .then_with(|| {
            a.header_matches
                .iter()
                .map(header_key)
                .cmp(b.header_matches.iter().map(header_key))
        })
        .then_with(|| b.query_matches.len().cmp(&a.query_matches.len()))
        .then_with(|| a.query_matches.iter().map(query_key).cmp(b.query_matches.iter().map(query_key)))
}

pub fn sort_routes(routes: &mut [Route]) {
    routes.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::entities::{PathMatch, RoutePolicies};

    fn route(path: PathMatch) -> Route {
        Route { path_match: path, header_matches: vec![], query_matches: vec![], clusters: vec![], policies: RoutePolicies::default() }
    }

    #[test]
    fn exact_sorts_before_prefix() {
        let mut routes = vec![route(PathMatch::Prefix("/".into())), route(PathMatch::Exact("/foo".into()))];
        sort_routes(&mut routes);
        assert!(matches!(routes[0].path_match, PathMatch::Exact(_)));
    }

    #[test]
    fn longer_prefix_sorts_first() {
        let mut routes = vec![route(PathMatch::Prefix("/a".into())), route(PathMatch::Prefix("/a/b".into()))];
        sort_routes(&mut routes);
        assert_eq!(routes[0].path_match.value(), "/a/b");
    }

    #[test]
    fn sort_is_idempotent() {
        let mut routes = vec![
            route(PathMatch::Prefix("/a".into())),
            route(PathMatch::Exact("/a".into())),
            route(PathMatch::Regex("/a.*".into())),
        ];
        sort_routes(&mut routes);
        let once = routes.clone();
        sort_routes(&mut routes);
        assert_eq!(once, routes);
    }
}
