//! The explicit route table: every admin endpoint is one
//! `(method, path, access, handler)` entry, turned into a Salvo router with
//! its own [`AccessGuard`].

use std::sync::Arc;

use salvo::routing::filters;
use salvo::{Handler, Router, async_trait};

use crate::middleware::auth::{Access, AccessGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RouteMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn filter(self) -> filters::MethodFilter {
        match self {
            Self::Get => filters::get(),
            Self::Post => filters::post(),
            Self::Put => filters::put(),
            Self::Delete => filters::delete(),
        }
    }
}

pub struct RouteEntry {
    pub method: RouteMethod,
    pub path: String,
    pub access: Access,
    handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

impl RouteEntry {
    #[must_use]
    pub fn new(
        method: RouteMethod,
        path: impl Into<String>,
        access: Access,
        handler: impl Handler,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            access,
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>, access: Access, handler: impl Handler) -> Self {
        Self::new(RouteMethod::Get, path, access, handler)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, access: Access, handler: impl Handler) -> Self {
        Self::new(RouteMethod::Post, path, access, handler)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, access: Access, handler: impl Handler) -> Self {
        Self::new(RouteMethod::Put, path, access, handler)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>, access: Access, handler: impl Handler) -> Self {
        Self::new(RouteMethod::Delete, path, access, handler)
    }

    #[must_use]
    pub fn into_router(self) -> Router {
        tracing::trace!(method = self.method.as_str(), path = %self.path, access = ?self.access, "Registering route");

        Router::with_path(self.path.trim_start_matches('/'))
            .filter(self.method.filter())
            .hoop(AccessGuard::new(self.access))
            .goal(SharedHandler(self.handler))
    }
}

struct SharedHandler(Arc<dyn Handler>);

#[async_trait]
impl Handler for SharedHandler {
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        self.0.handle(req, depot, res, ctrl).await;
    }
}
