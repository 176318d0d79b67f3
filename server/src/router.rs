//! Path-template router.
//!
//! # Design
//! Templates are `/`-delimited sequences of literal segments and `{name}`
//! placeholders. A request path matches a template when both split into the
//! same number of segments and every literal segment is equal (exact,
//! case-sensitive). There is no prefix matching.
//!
//! Templates are tried in registration order and the first match wins, so a
//! literal route like `/todo/lists/new` must be registered before an
//! overlapping placeholder route like `/todo/lists/{id}`.
//!
//! A match also yields the placeholder values as [`PathParams`], handed to the
//! handler next to the untouched request.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed path template such as `/todo/lists/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .map(|part| match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => Segment::Placeholder(name.to_string()),
                None => Segment::Literal(part.to_string()),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match `path` against this template, capturing placeholder values.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Placeholder(name) => {
                    params.values.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

/// Placeholder values captured by a successful match, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type ResponseFuture = Pin<Box<dyn Future<Output = Response> + Send>>;
type BoxedHandler<S> = Arc<dyn Fn(S, Request, PathParams) -> ResponseFuture + Send + Sync>;

/// Ordered table of templates and their handlers.
pub struct PatternRouter<S> {
    routes: Vec<(Template, BoxedHandler<S>)>,
}

impl<S> Default for PatternRouter<S> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<S> PatternRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `template`.
    ///
    /// Re-registering a template keeps the earlier entry in front, so the
    /// first registration stays the one that dispatches.
    pub fn route<F, Fut, R>(mut self, template: &str, handler: F) -> Self
    where
        F: Fn(S, Request, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        let handler: BoxedHandler<S> = Arc::new(move |state, req, params| {
            let fut = handler(state, req, params);
            Box::pin(async move { fut.await.into_response() })
        });
        self.routes.push((Template::parse(template), handler));
        self
    }

    /// The first template matching `path`, its handler and captured values.
    fn lookup(&self, path: &str) -> Option<(&Template, &BoxedHandler<S>, PathParams)> {
        self.routes.iter().find_map(|(template, handler)| {
            template
                .matches(path)
                .map(|params| (template, handler, params))
        })
    }

    /// Route `req` to the first matching handler, or answer 404.
    pub async fn dispatch(&self, state: S, req: Request) -> Response {
        match self.lookup(req.uri().path()) {
            Some((template, handler, params)) => {
                debug!(
                    method = %req.method(),
                    path = req.uri().path(),
                    template = template.as_str(),
                    "dispatch"
                );
                handler(state, req, params).await
            }
            None => {
                debug!(method = %req.method(), path = req.uri().path(), "no route");
                (StatusCode::NOT_FOUND, "404 page not found").into_response()
            }
        }
    }

    /// Mount the table as an axum router that sends every request through
    /// [`PatternRouter::dispatch`].
    pub fn with_state(self, state: S) -> axum::Router {
        let table = Arc::new(self);
        axum::Router::new().fallback(move |req: Request| {
            let table = Arc::clone(&table);
            let state = state.clone();
            async move { table.dispatch(state, req).await }
        })
    }
}
