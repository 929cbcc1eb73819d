use serde_derive::{Deserialize, Serialize};

/// One page of a paginated listing.
///
/// Pages are not uniformly sized: the service may return fewer elements than requested
/// even when more pages follow. `next_page_token` is `None` once the listing is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub elements: Vec<T>,
    /// An opaque token that allows clients to fetch the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> PagedList<T> {
    #[must_use]
    pub fn new(elements: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            elements,
            next_page_token,
        }
    }

    #[must_use]
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    #[must_use]
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.elements, self.next_page_token)
    }
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}
