//! Load state shared by every page view-model.

use async_trait::async_trait;

use crate::backend::{ApiError, ApiResult};

/// What a page shows for one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState<T> {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    /// The request succeeded with no items.
    Empty,
    Ready(T),
    /// The alert text shown to the user.
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> ViewState<Vec<T>> {
    /// `Empty` for an empty collection, `Ready` otherwise.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Ready(items)
        }
    }

    /// Items on display; empty unless `Ready`.
    pub fn items(&self) -> &[T] {
        match self {
            ViewState::Ready(items) => items,
            _ => &[],
        }
    }
}

impl<T> ViewState<T> {
    pub fn failed(error: &ApiError) -> Self {
        ViewState::Failed(error.user_message())
    }
}

/// Store a collection result, or the alert on failure. Errors pass through.
pub(crate) fn settle_items<T>(
    state: &mut ViewState<Vec<T>>,
    result: ApiResult<Vec<T>>,
) -> ApiResult<()> {
    match result {
        Ok(items) => {
            *state = ViewState::from_items(items);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Refresh failed");
            *state = ViewState::failed(&e);
            Err(e)
        }
    }
}

/// Store a single-value result, or the alert on failure.
pub(crate) fn settle<T>(state: &mut ViewState<T>, result: ApiResult<T>) -> ApiResult<()> {
    match result {
        Ok(value) => {
            *state = ViewState::Ready(value);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Refresh failed");
            *state = ViewState::failed(&e);
            Err(e)
        }
    }
}

/// A view-model backed by server-owned data.
///
/// Mutations never patch local state; they call the backend and then
/// `refresh`. Taking `&mut self` keeps one request in flight per instance.
#[async_trait]
pub trait Refresh: Send {
    async fn refresh(&mut self) -> ApiResult<()>;
}
